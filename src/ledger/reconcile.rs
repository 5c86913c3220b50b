use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{money::{in_range, PaymentStatus}, LedgerError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentSummary {
    pub total_paid_amount: Decimal,
    pub remaining_amount: Decimal,
    pub payment_status: PaymentStatus,
}

/// Sums `payments` against `payable`.
///
/// Over-payment is reported as-is: the total may exceed `payable` and the remaining amount
/// goes negative. A negative `payable` is settled from the start.
pub fn reconcile<I>(payable: Decimal, payments: I) -> Result<PaymentSummary, LedgerError>
where
    I: IntoIterator<Item = Decimal>,
{
    let total_paid_amount = payments.into_iter()
        .try_fold(Decimal::ZERO, |total, amount| in_range(total.checked_add(amount), "paymentAmount"))?;
    let remaining_amount = in_range(payable.checked_sub(total_paid_amount), "totalPayableAmount")?;

    Ok(PaymentSummary {
        total_paid_amount,
        remaining_amount,
        payment_status: PaymentStatus::classify(total_paid_amount, remaining_amount),
    })
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn test_reconcile_paid_exactly() {
        let summary = reconcile(dec!(26500), [dec!(12000), dec!(14500)]).unwrap();

        assert_eq!(summary.total_paid_amount, dec!(26500));
        assert_eq!(summary.remaining_amount, dec!(0));
        assert_eq!(summary.payment_status, PaymentStatus::Paid);
    }

    #[test]
    fn test_reconcile_without_payments() {
        let summary = reconcile(dec!(26500), []).unwrap();

        assert_eq!(summary.total_paid_amount, dec!(0));
        assert_eq!(summary.remaining_amount, dec!(26500));
        assert_eq!(summary.payment_status, PaymentStatus::Unpaid);
    }

    #[test]
    fn test_reconcile_partial() {
        let summary = reconcile(dec!(4500), vec![dec!(3000)]).unwrap();

        assert_eq!(summary.remaining_amount, dec!(1500));
        assert_eq!(summary.payment_status, PaymentStatus::Partial);
    }

    #[test]
    fn test_reconcile_negative_payable() {
        let summary = reconcile(dec!(-250.5), []).unwrap();

        assert_eq!(summary.total_paid_amount, dec!(0));
        assert_eq!(summary.remaining_amount, dec!(-250.5));
        assert_eq!(summary.payment_status, PaymentStatus::Paid);
    }

    #[test]
    fn test_reconcile_overflow() {
        let huge = dec!(70000000000000000000000000000);

        assert!(matches!(reconcile(dec!(1), [huge, huge]), Err(LedgerError::InvalidInput { field: "paymentAmount", .. })));
        assert!(matches!(reconcile(Decimal::MIN, [dec!(1)]), Err(LedgerError::InvalidInput { field: "totalPayableAmount", .. })));
    }

    #[test]
    fn test_reconcile_overpaid() {
        let summary = reconcile(dec!(1000), [dec!(600), dec!(600)]).unwrap();

        assert_eq!(summary.total_paid_amount, dec!(1200));
        assert_eq!(summary.remaining_amount, dec!(-200));
        assert_eq!(summary.payment_status, PaymentStatus::Paid);
    }
}
