use crate::{consts::MAX_AMOUNT, entity::sea_orm_active_enums::FeeType};

use super::*;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct GenerateFee {
    pub(super) month: YearMonth,
    #[serde(default)]
    pub(super) discount: Decimal,
    pub(super) items: Vec<GenerateFeeItem>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct GenerateFeeItem {
    pub(super) fee_type: FeeType,
    pub(super) amount: Decimal,
}

impl GenerateFee {
    pub(super) fn validate(&self) -> Result<(), LedgerError> {
        if self.items.is_empty() {
            return Err(LedgerError::invalid("items", "at least one fee item is required"));
        }

        if let Some(item) = self.items.iter().find(|item| item.amount < Decimal::ZERO) {
            return Err(LedgerError::invalid("amount", format!("{:?} fee is negative", item.fee_type)));
        }

        if let Some(item) = self.items.iter().find(|item| item.amount > MAX_AMOUNT) {
            return Err(LedgerError::invalid("amount", format!("{:?} fee is more than {MAX_AMOUNT}", item.fee_type)));
        }

        // bounded above, so the total fits a Decimal
        let configured: Decimal = self.items.iter().map(|item| item.amount).sum();

        if self.discount < Decimal::ZERO {
            return Err(LedgerError::invalid("discount", "must not be negative"));
        }

        if self.discount > configured {
            return Err(LedgerError::invalid("discount", format!("{} is more than the configured {}", self.discount, configured)));
        }

        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct TimelineQuery {
    pub(super) from: YearMonth,
    pub(super) to: YearMonth,
}

/// A ledger row plus the fee it was built from, so the month can be paid
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct FeeRow {
    pub(super) fee_id: Option<Uuid>,
    #[serde(flatten)]
    pub(super) entry: FeeTimelineEntry,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct StudentTimeline {
    pub(super) student: student::Model,
    pub(super) entries: Vec<FeeRow>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct RecordedFeePayment {
    pub(super) payment: fee_payment::Model,
    pub(super) fee: FeeRow,
}
