use crate::{ledger::LedgerError, pages::ledger::model::SalaryRequest};

use super::*;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct GeneratePayslip {
    pub(super) staff_id: Uuid,
    pub(super) month: YearMonth,
    /// `baseSalary` falls back to the staff record when left out
    #[serde(flatten)]
    pub(super) attendance: SalaryRequest,
}

impl GeneratePayslip {
    /// Payslips always record the month's working days, unlike the bare calculator
    pub(super) fn attendance(self, base_salary: Decimal) -> Result<AttendanceInput, LedgerError> {
        if self.attendance.working_days.is_none() {
            return Err(LedgerError::invalid("workingDays", "is required"));
        }

        AttendanceInput::try_from(SalaryRequest {
            base_salary: self.attendance.base_salary.or(Some(base_salary)),
            ..self.attendance
        })
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct PayslipDetail {
    pub(super) payslip: payslip::Model,
    pub(super) payments: Vec<payslip_payment::Model>,
    pub(super) summary: PaymentSummary,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct PayslipPayments {
    pub(super) payments: Vec<payslip_payment::Model>,
    pub(super) summary: PaymentSummary,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct RecordedPayslipPayment {
    pub(super) payment: payslip_payment::Model,
    pub(super) expense: expense::Model,
    pub(super) summary: PaymentSummary,
}
