use std::{collections::BTreeMap, fmt, str::FromStr};

use chrono::{Datelike as _, Months, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{consts::MAX_TIMELINE_MONTHS, entity::sea_orm_active_enums::FeeType};

use super::{money::{in_range, PaymentStatus}, reconcile, LedgerError};

/// A calendar month, written as `YYYY-MM`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    first_day: NaiveDate,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Result<Self, LedgerError> {
        NaiveDate::from_ymd_opt(year, month, 1)
            .map(|first_day| Self { first_day })
            .ok_or_else(|| LedgerError::invalid("month", format!("{year}-{month:02} is not a calendar month")))
    }

    /// The month containing `date`
    pub fn containing(date: NaiveDate) -> Self {
        Self { first_day: date.with_day(1).unwrap_or(date) }
    }

    pub fn year(&self) -> i32 {
        self.first_day.year()
    }

    pub fn month(&self) -> u32 {
        self.first_day.month()
    }

    pub fn first_day(&self) -> NaiveDate {
        self.first_day
    }

    /// Human readable name, e.g. `April 2025`
    pub fn label(&self) -> String {
        self.first_day.format("%B %Y").to_string()
    }

    fn succ(&self) -> Option<Self> {
        self.first_day
            .checked_add_months(Months::new(1))
            .map(|first_day| Self { first_day })
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year(), self.month())
    }
}

impl FromStr for YearMonth {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some((year, month)) = s.trim().split_once('-') else {
            return Err(LedgerError::invalid("month", format!("`{s}` is not in YYYY-MM format")));
        };

        let (Ok(year), Ok(month)) = (year.parse::<i32>(), month.parse::<u32>()) else {
            return Err(LedgerError::invalid("month", format!("`{s}` is not in YYYY-MM format")));
        };

        Self::new(year, month)
    }
}

impl Serialize for YearMonth {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for YearMonth {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Inclusive span of months, walked in chronological order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthRange {
    from: YearMonth,
    to: YearMonth,
}

impl MonthRange {
    pub fn new(from: YearMonth, to: YearMonth) -> Result<Self, LedgerError> {
        if to < from {
            return Err(LedgerError::invalid("to", format!("{to} is before {from}")));
        }

        let range = Self { from, to };
        if range.iter().nth(MAX_TIMELINE_MONTHS).is_some() {
            return Err(LedgerError::invalid("to", format!("a timeline covers at most {MAX_TIMELINE_MONTHS} months")));
        }

        Ok(range)
    }

    pub fn from(&self) -> YearMonth {
        self.from
    }

    pub fn to(&self) -> YearMonth {
        self.to
    }

    pub fn iter(&self) -> impl Iterator<Item = YearMonth> {
        let to = self.to;
        std::iter::successors(Some(self.from), YearMonth::succ).take_while(move |month| *month <= to)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeItem {
    pub fee_type: FeeType,
    /// Records imported from elsewhere may lack an amount
    pub amount: Option<Decimal>,
}

/// A generated monthly fee with its items in insertion order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeRecord {
    #[serde(default)]
    pub discount: Decimal,
    pub items: Vec<FeeItem>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimelineStatus {
    NotGenerated,
    Unpaid,
    Partial,
    Paid,
}

impl From<PaymentStatus> for TimelineStatus {
    fn from(status: PaymentStatus) -> Self {
        match status {
            PaymentStatus::Unpaid => TimelineStatus::Unpaid,
            PaymentStatus::Partial => TimelineStatus::Partial,
            PaymentStatus::Paid => TimelineStatus::Paid,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineFeeItem {
    pub fee_type: FeeType,
    pub amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeTimelineEntry {
    pub month: u32,
    pub year: i32,
    pub label: String,
    pub status: TimelineStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub configured_amount: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payable_amount: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paid_amount: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_amount: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fee_items: Vec<TimelineFeeItem>,
}

impl FeeTimelineEntry {
    fn not_generated(month: YearMonth) -> Self {
        Self {
            month: month.month(),
            year: month.year(),
            label: month.label(),
            status: TimelineStatus::NotGenerated,
            configured_amount: None,
            discount: None,
            payable_amount: None,
            paid_amount: None,
            due_amount: None,
            fee_items: Vec::new(),
        }
    }
}

/// Builds one ledger row per month of `range`, oldest first.
///
/// Months without a fee record are reported as not generated. Fee items keep the order they
/// were recorded in. Records and payments outside `range` are ignored.
pub fn build_timeline(
    range: &MonthRange,
    fees: &BTreeMap<YearMonth, FeeRecord>,
    payments: &BTreeMap<YearMonth, Vec<Decimal>>,
) -> Result<Vec<FeeTimelineEntry>, LedgerError> {
    range.iter().map(|month| {
        let month_payments = payments.get(&month).map(Vec::as_slice).unwrap_or_default();

        let Some(fee) = fees.get(&month) else {
            if !month_payments.is_empty() {
                return Err(LedgerError::DataInconsistency {
                    month,
                    reason: format!("{} payment(s) recorded but no fee has been generated", month_payments.len()),
                });
            }

            return Ok(FeeTimelineEntry::not_generated(month));
        };

        if fee.discount < Decimal::ZERO {
            return Err(LedgerError::invalid("discount", format!("negative discount for {month}")));
        }

        let fee_items = fee.items.iter().enumerate().map(|(position, item)| {
            match item.amount {
                Some(amount) => Ok(TimelineFeeItem { fee_type: item.fee_type, amount }),
                None => Err(LedgerError::invalid(
                    "amount",
                    format!("fee item #{} ({:?}) for {month} has no amount", position + 1, item.fee_type),
                )),
            }
        }).collect::<Result<Vec<_>, _>>()?;

        let configured_amount = fee_items.iter()
            .try_fold(Decimal::ZERO, |total, item| in_range(total.checked_add(item.amount), "amount"))?;
        let payable_amount = in_range(configured_amount.checked_sub(fee.discount), "discount")?;
        let summary = reconcile(payable_amount, month_payments.iter().copied())?;

        Ok(FeeTimelineEntry {
            month: month.month(),
            year: month.year(),
            label: month.label(),
            status: summary.payment_status.into(),
            configured_amount: Some(configured_amount),
            discount: Some(fee.discount),
            payable_amount: Some(payable_amount),
            paid_amount: Some(summary.total_paid_amount),
            due_amount: Some(summary.remaining_amount),
            fee_items,
        })
    }).collect()
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    fn month(s: &str) -> YearMonth {
        s.parse().unwrap()
    }

    fn tuition(amount: Decimal) -> FeeItem {
        FeeItem { fee_type: FeeType::Tuition, amount: Some(amount) }
    }

    #[test]
    fn test_year_month_parse() {
        let april = month("2025-04");

        assert_eq!(april.year(), 2025);
        assert_eq!(april.month(), 4);
        assert_eq!(april.to_string(), "2025-04");
        assert_eq!(april.label(), "April 2025");

        assert!("2025-13".parse::<YearMonth>().is_err());
        assert!("April".parse::<YearMonth>().is_err());
        assert_eq!(YearMonth::containing(NaiveDate::from_ymd_opt(2025, 4, 17).unwrap()), april);
    }

    #[test]
    fn test_month_range() {
        let range = MonthRange::new(month("2025-11"), month("2026-02")).unwrap();
        let months = range.iter().map(|m| m.to_string()).collect::<Vec<_>>();

        assert_eq!(months, ["2025-11", "2025-12", "2026-01", "2026-02"]);
        assert!(MonthRange::new(month("2026-02"), month("2025-11")).is_err());
        assert!(MonthRange::new(month("2020-01"), month("2024-12")).is_ok());
        assert!(MonthRange::new(month("2020-01"), month("2025-01")).is_err());
    }

    #[test]
    fn test_build_timeline() {
        let range = MonthRange::new(month("2025-04"), month("2025-06")).unwrap();

        let fees = BTreeMap::from([
            (month("2025-04"), FeeRecord { discount: dec!(500), items: vec![tuition(dec!(5000))] }),
            (month("2025-05"), FeeRecord {
                discount: dec!(0),
                items: vec![
                    tuition(dec!(5000)),
                    FeeItem { fee_type: FeeType::Transport, amount: Some(dec!(800)) },
                ],
            }),
        ]);
        let payments = BTreeMap::from([
            (month("2025-04"), vec![dec!(3000)]),
            (month("2025-05"), vec![dec!(5000), dec!(800)]),
        ]);

        let timeline = build_timeline(&range, &fees, &payments).unwrap();
        assert_eq!(timeline.len(), 3);

        let april = &timeline[0];
        assert_eq!(april.label, "April 2025");
        assert_eq!(april.configured_amount, Some(dec!(5000)));
        assert_eq!(april.payable_amount, Some(dec!(4500)));
        assert_eq!(april.paid_amount, Some(dec!(3000)));
        assert_eq!(april.due_amount, Some(dec!(1500)));
        assert_eq!(april.status, TimelineStatus::Partial);

        let may = &timeline[1];
        assert_eq!(may.status, TimelineStatus::Paid);
        assert_eq!(may.fee_items.iter().map(|i| i.fee_type).collect::<Vec<_>>(), [FeeType::Tuition, FeeType::Transport]);

        let june = &timeline[2];
        assert_eq!(june.status, TimelineStatus::NotGenerated);
        assert_eq!(june.label, "June 2025");
        assert_eq!(june.payable_amount, None);
        assert!(june.fee_items.is_empty());
    }

    #[test]
    fn test_build_timeline_unpaid_month() {
        let range = MonthRange::new(month("2025-04"), month("2025-04")).unwrap();
        let fees = BTreeMap::from([(month("2025-04"), FeeRecord { discount: dec!(0), items: vec![tuition(dec!(1200))] })]);

        let timeline = build_timeline(&range, &fees, &BTreeMap::new()).unwrap();

        assert_eq!(timeline[0].status, TimelineStatus::Unpaid);
        assert_eq!(timeline[0].due_amount, Some(dec!(1200)));
    }

    #[test]
    fn test_build_timeline_missing_amount() {
        let range = MonthRange::new(month("2025-04"), month("2025-04")).unwrap();
        let fees = BTreeMap::from([(month("2025-04"), FeeRecord {
            discount: dec!(0),
            items: vec![tuition(dec!(1200)), FeeItem { fee_type: FeeType::Hostel, amount: None }],
        })]);

        let err = build_timeline(&range, &fees, &BTreeMap::new()).unwrap_err();

        assert!(matches!(err, LedgerError::InvalidInput { field: "amount", .. }));
    }

    #[test]
    fn test_build_timeline_overflow() {
        let huge = dec!(70000000000000000000000000000);
        let range = MonthRange::new(month("2025-04"), month("2025-04")).unwrap();

        let fees = BTreeMap::from([(month("2025-04"), FeeRecord { discount: dec!(0), items: vec![tuition(huge), tuition(huge)] })]);
        let err = build_timeline(&range, &fees, &BTreeMap::new()).unwrap_err();
        assert!(matches!(err, LedgerError::InvalidInput { field: "amount", .. }));

        let fees = BTreeMap::from([(month("2025-04"), FeeRecord { discount: dec!(0), items: vec![tuition(dec!(1200))] })]);
        let payments = BTreeMap::from([(month("2025-04"), vec![huge, huge])]);
        let err = build_timeline(&range, &fees, &payments).unwrap_err();
        assert!(matches!(err, LedgerError::InvalidInput { field: "paymentAmount", .. }));
    }

    #[test]
    fn test_build_timeline_payment_without_fee() {
        let range = MonthRange::new(month("2025-04"), month("2025-05")).unwrap();
        let payments = BTreeMap::from([(month("2025-05"), vec![dec!(100)])]);

        let err = build_timeline(&range, &BTreeMap::new(), &payments).unwrap_err();

        assert_eq!(err, LedgerError::DataInconsistency {
            month: month("2025-05"),
            reason: "1 payment(s) recorded but no fee has been generated".to_string(),
        });
    }

    #[test]
    fn test_build_timeline_ignores_out_of_range() {
        let range = MonthRange::new(month("2025-04"), month("2025-04")).unwrap();
        let payments = BTreeMap::from([(month("2025-03"), vec![dec!(100)])]);

        let timeline = build_timeline(&range, &BTreeMap::new(), &payments).unwrap();

        assert_eq!(timeline.len(), 1);
        assert_eq!(timeline[0].status, TimelineStatus::NotGenerated);
    }
}
