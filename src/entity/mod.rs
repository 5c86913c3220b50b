pub mod prelude;

pub mod expense;
pub mod fee_payment;
pub mod monthly_fee;
pub mod monthly_fee_item;
pub mod payslip;
pub mod payslip_payment;
pub mod sea_orm_active_enums;
pub mod staff;
pub mod student;
