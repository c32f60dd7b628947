use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "goods")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
    pub category_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::goods_category::Entity",
        from = "Column::CategoryId",
        to = "super::goods_category::Column::Id"
    )]
    GoodsCategory,
    #[sea_orm(has_many = "super::purchase_request_item::Entity")]
    PurchaseRequestItems,
}

impl Related<super::goods_category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::GoodsCategory.def()
    }
}

impl Related<super::purchase_request_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PurchaseRequestItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
