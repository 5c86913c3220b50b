use std::ops::RangeInclusive;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Salary is always prorated over a fictional 30 day month
pub const STANDARD_MONTH_DAYS: u32 = 30;

/// Working days a payslip may declare for its month
pub const WORKING_DAYS_RANGE: RangeInclusive<u32> = 20..=31;

/// Longest span a fee timeline may cover
pub const MAX_TIMELINE_MONTHS: usize = 60;

/// Category used for the expense row booked alongside a salary payment
pub const SALARY_EXPENSE_CATEGORY: &str = "Salary";

/// Largest amount a `decimal(12, 2)` money column holds
pub const MAX_AMOUNT: Decimal = dec!(9999999999.99);
