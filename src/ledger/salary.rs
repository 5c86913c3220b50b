use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::consts::{MAX_AMOUNT, STANDARD_MONTH_DAYS, WORKING_DAYS_RANGE};

use super::{money::{in_range, round_currency, round_days}, LedgerError};

/// Attendance counters for one staff member over one month
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttendanceInput {
    pub base_salary: Decimal,
    /// Collected for the payslip but never part of the formula
    pub working_days: Option<u32>,
    pub absent_days: u32,
    pub casual_leave: u32,
    pub half_days: u32,
    pub deductions: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalaryBreakdown {
    pub per_day_salary: Decimal,
    pub total_days: u32,
    /// Effective salary days
    pub present_days: Decimal,
    pub gross_salary: Decimal,
    pub net_salary: Decimal,
}

/// Prorates `base_salary` over a 30 day month.
///
/// The divisor stays at 30 whatever the month's declared working days are. Counters are not
/// validated here, inconsistent ones simply produce negative figures. Only amounts too large
/// for a `Decimal` are refused.
pub fn calculate(base_salary: Decimal, absent_days: u32, half_days: u32, deductions: Decimal) -> Result<SalaryBreakdown, LedgerError> {
    let month_days = Decimal::from(STANDARD_MONTH_DAYS);

    let per_day_salary = round_currency(in_range(base_salary.checked_div(month_days), "baseSalary")?);
    // u32 counters stay far inside Decimal's range
    let present_days = round_days(month_days - Decimal::from(absent_days) - Decimal::from(half_days) * dec!(0.5));
    let gross_salary = round_currency(in_range(per_day_salary.checked_mul(present_days), "baseSalary")?);
    let net_salary = round_currency(in_range(gross_salary.checked_sub(deductions), "deductions")?);

    Ok(SalaryBreakdown {
        per_day_salary,
        total_days: STANDARD_MONTH_DAYS,
        present_days,
        gross_salary,
        net_salary,
    })
}

impl AttendanceInput {
    pub fn validate(&self) -> Result<(), LedgerError> {
        if self.base_salary < Decimal::ZERO {
            return Err(LedgerError::invalid("baseSalary", "must not be negative"));
        }

        if self.deductions < Decimal::ZERO {
            return Err(LedgerError::invalid("deductions", "must not be negative"));
        }

        if self.base_salary > MAX_AMOUNT {
            return Err(LedgerError::invalid("baseSalary", format!("must be at most {MAX_AMOUNT}")));
        }

        if self.deductions > MAX_AMOUNT {
            return Err(LedgerError::invalid("deductions", format!("must be at most {MAX_AMOUNT}")));
        }

        if self.absent_days > STANDARD_MONTH_DAYS {
            return Err(LedgerError::invalid("absentDays", format!("must be at most {STANDARD_MONTH_DAYS}")));
        }

        if self.half_days > STANDARD_MONTH_DAYS {
            return Err(LedgerError::invalid("halfDays", format!("must be at most {STANDARD_MONTH_DAYS}")));
        }

        if let Some(working_days) = self.working_days {
            if !WORKING_DAYS_RANGE.contains(&working_days) {
                return Err(LedgerError::invalid(
                    "workingDays",
                    format!("must be between {} and {}", WORKING_DAYS_RANGE.start(), WORKING_DAYS_RANGE.end()),
                ));
            }

            let away = self.absent_days.saturating_add(self.casual_leave).saturating_add(self.half_days);
            if away > working_days {
                return Err(LedgerError::invalid(
                    "workingDays",
                    format!("absent, casual leave and half days add up to {away}, more than {working_days} working days"),
                ));
            }
        }

        Ok(())
    }

    pub fn calculate(&self) -> Result<SalaryBreakdown, LedgerError> {
        calculate(self.base_salary, self.absent_days, self.half_days, self.deductions)
    }
}
