use crate::{
    commands::purchaserequests::{ensure_item_references_exist, PurchaseRequestItemInput},
    commands::Command,
    db::DbPool,
    entities::{purchase_request, purchase_request_item},
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set, TransactionError,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use validator::Validate;

use crate::entities::purchase_request::RequestType;

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct UpdatePurchaseRequestCommand {
    pub id: i64,
    pub request_type: Option<RequestType>,
    #[validate(length(max = 255))]
    pub buyer: Option<String>,
    #[validate(length(max = 255))]
    pub purchase_reason: Option<String>,
    #[validate(length(max = 255))]
    pub purchase_reason_detail: Option<String>,
    pub notes: Option<String>,
    #[validate(length(max = 255))]
    pub updated_by: Option<String>,
    /// When present, the prior items are replaced wholesale (delete-all then
    /// insert-all) and `total_items` is recomputed.
    pub items: Option<Vec<PurchaseRequestItemInput>>,
}

#[async_trait::async_trait]
impl Command for UpdatePurchaseRequestCommand {
    type Result = (
        purchase_request::Model,
        Vec<purchase_request_item::Model>,
    );

    #[instrument(skip(self, db_pool, event_sender), fields(purchase_request_id = %self.id))]
    async fn execute(
        &self,
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
    ) -> Result<Self::Result, ServiceError> {
        self.validate()
            .map_err(|e| ServiceError::ValidationError(format!("Invalid input: {}", e)))?;
        if let Some(items) = &self.items {
            for item in items {
                item.validate()
                    .map_err(|e| ServiceError::ValidationError(format!("Invalid item: {}", e)))?;
            }
        }

        let db = db_pool.as_ref();
        if let Some(items) = &self.items {
            ensure_item_references_exist(db, items).await?;
        }

        let (updated, items) = self.persist(db).await?;

        info!(purchase_request_id = %updated.id, "Purchase request updated successfully");

        if let Err(e) = event_sender
            .send(Event::PurchaseRequestUpdated(updated.id))
            .await
        {
            warn!(purchase_request_id = %updated.id, error = %e, "Failed to publish update event");
        }

        Ok((updated, items))
    }
}

impl UpdatePurchaseRequestCommand {
    async fn persist(
        &self,
        db: &DbPool,
    ) -> Result<(purchase_request::Model, Vec<purchase_request_item::Model>), ServiceError> {
        let id = self.id;
        let request_type = self.request_type;
        let buyer = self.buyer.clone();
        let purchase_reason = self.purchase_reason.clone();
        let purchase_reason_detail = self.purchase_reason_detail.clone();
        let notes = self.notes.clone();
        let updated_by = self.updated_by.clone();
        let new_items = self.items.clone();

        db.transaction::<_, (purchase_request::Model, Vec<purchase_request_item::Model>), ServiceError>(
            move |txn| {
                Box::pin(async move {
                    let existing = purchase_request::Entity::find_by_id(id)
                        .one(txn)
                        .await?
                        .ok_or_else(|| {
                            ServiceError::NotFound(format!("Purchase request {} not found", id))
                        })?;

                    let now = Utc::now();
                    let mut active: purchase_request::ActiveModel = existing.into();

                    if let Some(request_type) = request_type {
                        active.request_type = Set(request_type.to_string());
                    }
                    if let Some(buyer) = buyer {
                        active.buyer = Set(Some(buyer));
                    }
                    if let Some(reason) = purchase_reason {
                        active.purchase_reason = Set(Some(reason));
                    }
                    if let Some(detail) = purchase_reason_detail {
                        active.purchase_reason_detail = Set(Some(detail));
                    }
                    if let Some(notes) = notes {
                        active.notes = Set(Some(notes));
                    }
                    active.updated_by = Set(Some(updated_by.unwrap_or_else(|| "System".to_string())));
                    active.updated_at = Set(Some(now));

                    let items = if let Some(new_items) = new_items {
                        purchase_request_item::Entity::delete_many()
                            .filter(purchase_request_item::Column::PurchaseRequestId.eq(id))
                            .exec(txn)
                            .await
                            .map_err(|e| {
                                error!("Failed to clear items for purchase request {}: {}", id, e);
                                ServiceError::DatabaseError(e)
                            })?;

                        let mut saved_items = Vec::with_capacity(new_items.len());
                        for item in &new_items {
                            let new_item = purchase_request_item::ActiveModel {
                                purchase_request_id: Set(id),
                                goods_id: Set(item.goods_id),
                                quantity: Set(item.quantity),
                                measurement_id: Set(item.measurement_id),
                                created_at: Set(now),
                                updated_at: Set(Some(now)),
                                ..Default::default()
                            };
                            saved_items.push(new_item.insert(txn).await.map_err(|e| {
                                error!(
                                    "Failed to insert replacement item for purchase request {}: {}",
                                    id, e
                                );
                                ServiceError::DatabaseError(e)
                            })?);
                        }

                        active.total_items = Set(saved_items.len() as i32);
                        saved_items
                    } else {
                        purchase_request_item::Entity::find()
                            .filter(purchase_request_item::Column::PurchaseRequestId.eq(id))
                            .all(txn)
                            .await?
                    };

                    // Field edits are not lifecycle events; no audit row here.
                    let updated = active.update(txn).await.map_err(|e| {
                        error!("Failed to update purchase request {}: {}", id, e);
                        ServiceError::DatabaseError(e)
                    })?;

                    Ok((updated, items))
                })
            },
        )
        .await
        .map_err(|e| match e {
            TransactionError::Connection(db_err) => ServiceError::DatabaseError(db_err),
            TransactionError::Transaction(service_err) => service_err,
        })
    }
}
