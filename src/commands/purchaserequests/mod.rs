pub mod create_purchase_request_command;
pub mod delete_purchase_request_command;
pub mod follow_up_purchase_request_command;
pub mod update_purchase_request_command;
pub mod update_purchase_request_status_command;

pub use create_purchase_request_command::CreatePurchaseRequestCommand;
pub use delete_purchase_request_command::DeletePurchaseRequestCommand;
pub use follow_up_purchase_request_command::FollowUpPurchaseRequestCommand;
pub use update_purchase_request_command::UpdatePurchaseRequestCommand;
pub use update_purchase_request_status_command::UpdatePurchaseRequestStatusCommand;

use std::collections::BTreeSet;

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::entities::{department, goods, measurement_unit, procurement_log};
use crate::errors::ServiceError;

/// Prometheus counters for lifecycle command outcomes, registered in the
/// default registry and exposed through `/metrics`.
pub mod metrics {
    use lazy_static::lazy_static;
    use prometheus::{register_int_counter, IntCounter};

    lazy_static! {
        pub static ref PURCHASE_REQUEST_CREATIONS: IntCounter = register_int_counter!(
            "purchase_request_creations_total",
            "Total number of purchase requests created"
        )
        .expect("metric can be created");
        pub static ref PURCHASE_REQUEST_CREATION_FAILURES: IntCounter = register_int_counter!(
            "purchase_request_creation_failures_total",
            "Total number of failed purchase request creations"
        )
        .expect("metric can be created");
        pub static ref PURCHASE_REQUEST_FOLLOW_UPS: IntCounter = register_int_counter!(
            "purchase_request_follow_ups_total",
            "Total number of purchase request follow-ups"
        )
        .expect("metric can be created");
        pub static ref PURCHASE_REQUEST_STATUS_UPDATES: IntCounter = register_int_counter!(
            "purchase_request_status_updates_total",
            "Total number of purchase request status transitions"
        )
        .expect("metric can be created");
    }
}

/// One line item submitted with a create or update command.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PurchaseRequestItemInput {
    pub goods_id: i64,
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: i32,
    pub measurement_id: i64,
}

/// Appends one audit-log row. Callers pass the transaction connection so the
/// row commits or rolls back together with the state change it describes.
pub(crate) async fn append_log<C: ConnectionTrait>(
    conn: &C,
    purchase_request_id: i64,
    log_name: &str,
    log_description: &str,
    actor: Option<&str>,
) -> Result<(), ServiceError> {
    let entry = procurement_log::ActiveModel {
        purchase_request_id: Set(purchase_request_id),
        log_name: Set(log_name.to_string()),
        log_description: Set(log_description.to_string()),
        actor: Set(actor.map(|a| a.to_string())),
        created_at: Set(Utc::now()),
        ..Default::default()
    };
    entry.insert(conn).await?;
    Ok(())
}

pub(crate) async fn ensure_department_exists<C: ConnectionTrait>(
    conn: &C,
    department_id: i64,
) -> Result<(), ServiceError> {
    let found = department::Entity::find_by_id(department_id)
        .one(conn)
        .await?;
    if found.is_none() {
        return Err(ServiceError::ValidationError(format!(
            "Department {} does not exist",
            department_id
        )));
    }
    Ok(())
}

/// Verifies every goods and measurement-unit reference in `items` resolves.
pub(crate) async fn ensure_item_references_exist<C: ConnectionTrait>(
    conn: &C,
    items: &[PurchaseRequestItemInput],
) -> Result<(), ServiceError> {
    let goods_ids: BTreeSet<i64> = items.iter().map(|i| i.goods_id).collect();
    let measurement_ids: BTreeSet<i64> = items.iter().map(|i| i.measurement_id).collect();

    let found_goods: BTreeSet<i64> = goods::Entity::find()
        .filter(goods::Column::Id.is_in(goods_ids.iter().copied().collect::<Vec<_>>()))
        .all(conn)
        .await?
        .into_iter()
        .map(|g| g.id)
        .collect();
    let missing: Vec<i64> = goods_ids.difference(&found_goods).copied().collect();
    if !missing.is_empty() {
        return Err(ServiceError::ValidationError(format!(
            "Unknown goods ids: {:?}",
            missing
        )));
    }

    let found_units: BTreeSet<i64> = measurement_unit::Entity::find()
        .filter(
            measurement_unit::Column::Id
                .is_in(measurement_ids.iter().copied().collect::<Vec<_>>()),
        )
        .all(conn)
        .await?
        .into_iter()
        .map(|m| m.id)
        .collect();
    let missing: Vec<i64> = measurement_ids.difference(&found_units).copied().collect();
    if !missing.is_empty() {
        return Err(ServiceError::ValidationError(format!(
            "Unknown measurement unit ids: {:?}",
            missing
        )));
    }

    Ok(())
}
