use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "purchase_request_items")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub purchase_request_id: i64,
    pub goods_id: i64,
    pub quantity: i32,
    pub measurement_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::purchase_request::Entity",
        from = "Column::PurchaseRequestId",
        to = "super::purchase_request::Column::Id"
    )]
    PurchaseRequest,
    #[sea_orm(
        belongs_to = "super::goods::Entity",
        from = "Column::GoodsId",
        to = "super::goods::Column::Id"
    )]
    Goods,
    #[sea_orm(
        belongs_to = "super::measurement_unit::Entity",
        from = "Column::MeasurementId",
        to = "super::measurement_unit::Column::Id"
    )]
    MeasurementUnit,
}

impl Related<super::purchase_request::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PurchaseRequest.def()
    }
}

impl Related<super::goods::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Goods.def()
    }
}

impl Related<super::measurement_unit::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MeasurementUnit.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
