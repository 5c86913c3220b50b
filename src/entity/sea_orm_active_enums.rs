use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "role_type")]
#[serde(rename_all = "lowercase")]
pub enum RoleType {
    #[sea_orm(string_value = "admin")]
    Admin,
    #[sea_orm(string_value = "staff")]
    Staff,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "payment_method")]
pub enum PaymentMethod {
    #[sea_orm(string_value = "cash")]
    Cash,
    #[sea_orm(string_value = "upi")]
    #[serde(rename = "UPI")]
    Upi,
    #[sea_orm(string_value = "bank_transfer")]
    BankTransfer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "fee_type")]
#[serde(rename_all = "lowercase")]
pub enum FeeType {
    #[sea_orm(string_value = "tuition")]
    Tuition,
    #[sea_orm(string_value = "hostel")]
    Hostel,
    #[sea_orm(string_value = "transport")]
    Transport,
    #[sea_orm(string_value = "admission")]
    Admission,
}
