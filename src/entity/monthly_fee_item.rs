use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::FeeType;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "monthly_fee_item")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
    pub monthly_fee_id: Uuid,
    pub fee_type: FeeType,
    /// Nullable for rows carried over from the legacy system
    #[sea_orm(column_type = "Decimal(Some((12, 2)))", nullable)]
    pub amount: Option<Decimal>,
    /// Insertion order within the fee
    pub position: i32,
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
