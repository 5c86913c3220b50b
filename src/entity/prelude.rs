pub use super::expense::Entity as Expense;
pub use super::fee_payment::Entity as FeePayment;
pub use super::monthly_fee::Entity as MonthlyFee;
pub use super::monthly_fee_item::Entity as MonthlyFeeItem;
pub use super::payslip::Entity as Payslip;
pub use super::payslip_payment::Entity as PayslipPayment;
pub use super::staff::Entity as Staff;
pub use super::student::Entity as Student;
