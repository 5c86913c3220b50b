use std::collections::BTreeMap;

use rust_decimal::Decimal;

use crate::ledger::{AttendanceInput, FeeItem, FeeRecord, LedgerError, MonthRange, YearMonth};

use super::*;

/// Attendance counters as the payslip form sends them
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SalaryRequest {
    pub(crate) base_salary: Option<Decimal>,
    pub(crate) working_days: Option<u32>,
    pub(crate) absent_days: Option<u32>,
    pub(crate) casual_leave: Option<u32>,
    pub(crate) half_days: Option<u32>,
    pub(crate) deductions: Option<Decimal>,
}

impl TryFrom<SalaryRequest> for AttendanceInput {
    type Error = LedgerError;

    fn try_from(req: SalaryRequest) -> Result<Self, Self::Error> {
        let input = AttendanceInput {
            base_salary: req.base_salary.ok_or_else(|| LedgerError::invalid("baseSalary", "is required"))?,
            working_days: req.working_days,
            absent_days: req.absent_days.ok_or_else(|| LedgerError::invalid("absentDays", "is required"))?,
            casual_leave: req.casual_leave.unwrap_or_default(),
            half_days: req.half_days.ok_or_else(|| LedgerError::invalid("halfDays", "is required"))?,
            deductions: req.deductions.ok_or_else(|| LedgerError::invalid("deductions", "is required"))?,
        };

        input.validate()?;

        Ok(input)
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ReconcileRequest {
    pub(super) total_payable_amount: Option<Decimal>,
    #[serde(default)]
    pub(super) payments: Vec<PaymentAmount>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct PaymentAmount {
    pub(super) payment_amount: Option<Decimal>,
}

impl ReconcileRequest {
    pub(super) fn into_parts(self) -> Result<(Decimal, Vec<Decimal>), LedgerError> {
        // a negative payable, like an over-deducted net salary, is already settled
        let payable = self.total_payable_amount
            .ok_or_else(|| LedgerError::invalid("totalPayableAmount", "is required"))?;

        let amounts = self.payments.into_iter().enumerate().map(|(i, payment)| {
            match payment.payment_amount {
                Some(amount) if amount < Decimal::ZERO => Err(LedgerError::invalid("paymentAmount", format!("payment #{} is negative", i + 1))),
                Some(amount) => Ok(amount),
                None => Err(LedgerError::invalid("paymentAmount", format!("payment #{} has no amount", i + 1))),
            }
        }).collect::<Result<Vec<_>, _>>()?;

        Ok((payable, amounts))
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct TimelineRequest {
    pub(super) from: YearMonth,
    pub(super) to: YearMonth,
    #[serde(default)]
    pub(super) fees: Vec<MonthFee>,
    #[serde(default)]
    pub(super) payments: Vec<MonthPayment>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct MonthFee {
    pub(super) month: YearMonth,
    #[serde(default)]
    pub(super) discount: Decimal,
    pub(super) items: Vec<FeeItem>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct MonthPayment {
    pub(super) month: YearMonth,
    pub(super) amount: Decimal,
}

/// Range plus records grouped by month, ready for `build_timeline`
pub(super) type TimelineParts = (MonthRange, BTreeMap<YearMonth, FeeRecord>, BTreeMap<YearMonth, Vec<Decimal>>);

impl TimelineRequest {
    pub(super) fn into_parts(self) -> Result<TimelineParts, LedgerError> {
        let range = MonthRange::new(self.from, self.to)?;

        let mut fees = BTreeMap::new();
        for fee in self.fees {
            let negative = fee.items.iter().position(|item| item.amount.is_some_and(|amount| amount < Decimal::ZERO));
            if let Some(position) = negative {
                return Err(LedgerError::invalid("amount", format!("fee item #{} for {} is negative", position + 1, fee.month)));
            }

            let record = FeeRecord { discount: fee.discount, items: fee.items };

            if fees.insert(fee.month, record).is_some() {
                return Err(LedgerError::DataInconsistency {
                    month: fee.month,
                    reason: "more than one fee record".to_string(),
                });
            }
        }

        let mut payments: BTreeMap<YearMonth, Vec<Decimal>> = BTreeMap::new();
        for payment in self.payments {
            if payment.amount < Decimal::ZERO {
                return Err(LedgerError::invalid("amount", format!("payment for {} is negative", payment.month)));
            }

            payments.entry(payment.month).or_default().push(payment.amount);
        }

        Ok((range, fees, payments))
    }
}
