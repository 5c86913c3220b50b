use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A month's salary for one staff member, with staff details and the breakdown snapshotted
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "payslip")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
    pub created_by: Option<Uuid>,
    pub updated_by: Option<Uuid>,
    pub staff_id: Uuid,
    /// First day of the month
    pub period: Date,
    #[sea_orm(column_type = "Text")]
    pub staff_name: String,
    #[sea_orm(column_type = "Text")]
    pub designation: String,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub base_salary: Decimal,
    pub working_days: i32,
    pub absent_days: i32,
    pub casual_leave: i32,
    pub half_days: i32,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub per_day_salary: Decimal,
    #[sea_orm(column_type = "Decimal(Some((4, 1)))")]
    pub present_days: Decimal,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub gross_salary: Decimal,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub deductions: Decimal,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub net_salary: Decimal,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::staff::Entity",
        from = "Column::StaffId",
        to = "super::staff::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Staff,
    #[sea_orm(has_many = "super::payslip_payment::Entity")]
    PayslipPayment,
}

impl Related<super::staff::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Staff.def()
    }
}

impl Related<super::payslip_payment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PayslipPayment.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
