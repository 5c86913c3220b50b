use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::PaymentMethod;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "fee_payment")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
    pub created_by: Option<Uuid>,
    pub updated_by: Option<Uuid>,
    pub monthly_fee_id: Uuid,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub amount: Decimal,
    pub paid_on: Date,
    pub method: PaymentMethod,
    #[sea_orm(column_type = "Text", nullable)]
    pub note: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::monthly_fee::Entity",
        from = "Column::MonthlyFeeId",
        to = "super::monthly_fee::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    MonthlyFee,
}

impl Related<super::monthly_fee::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MonthlyFee.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
