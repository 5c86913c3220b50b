use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use super::LedgerError;

const CURRENCY_PLACES: u32 = 2;
const DAY_PLACES: u32 = 1;

/// Half-up to 2 decimal places
pub fn round_currency(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(CURRENCY_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// Half-up to 1 decimal place
pub fn round_days(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DAY_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// Unwraps a checked operation, blaming `field` when it overflowed
pub fn in_range(value: Option<Decimal>, field: &'static str) -> Result<Decimal, LedgerError> {
    value.ok_or_else(|| LedgerError::invalid(field, "amount is out of range"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Unpaid,
    Partial,
    Paid,
}

impl PaymentStatus {
    /// Settled once nothing remains, even when over-paid
    pub fn classify(total_paid: Decimal, remaining: Decimal) -> Self {
        if remaining <= Decimal::ZERO {
            PaymentStatus::Paid
        } else if total_paid > Decimal::ZERO {
            PaymentStatus::Partial
        } else {
            PaymentStatus::Unpaid
        }
    }
}
