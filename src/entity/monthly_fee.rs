use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A generated, month-scoped bill for one student
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "monthly_fee")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
    pub created_by: Option<Uuid>,
    pub updated_by: Option<Uuid>,
    pub student_id: Uuid,
    /// First day of the month
    pub period: Date,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub discount: Decimal,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::student::Entity",
        from = "Column::StudentId",
        to = "super::student::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Student,
    #[sea_orm(has_many = "super::monthly_fee_item::Entity")]
    MonthlyFeeItem,
    #[sea_orm(has_many = "super::fee_payment::Entity")]
    FeePayment,
}

impl Related<super::student::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Student.def()
    }
}

impl Related<super::monthly_fee_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MonthlyFeeItem.def()
    }
}

impl Related<super::fee_payment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FeePayment.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
