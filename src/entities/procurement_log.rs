use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Append-only audit record of purchase-request lifecycle events. Rows are
/// never updated or deleted, and `purchase_request_id` carries no foreign key
/// so the trail outlives the request it describes.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "procurement_logs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub purchase_request_id: i64,
    pub log_name: String,
    pub log_description: String,
    pub actor: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
