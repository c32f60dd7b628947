use crate::{
    commands::purchaserequests::{
        append_log, ensure_department_exists, ensure_item_references_exist,
        metrics::{PURCHASE_REQUEST_CREATIONS, PURCHASE_REQUEST_CREATION_FAILURES},
        PurchaseRequestItemInput,
    },
    commands::Command,
    db::DbPool,
    entities::{
        purchase_request::{self, PurchaseRequestStatus, RequestType},
        purchase_request_item,
    },
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, Set, TransactionError, TransactionTrait};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct CreatePurchaseRequestCommand {
    pub request_type: RequestType,
    #[validate(length(max = 255))]
    pub buyer: Option<String>,
    #[validate(length(max = 255))]
    pub purchase_reason: Option<String>,
    #[validate(length(max = 255))]
    pub purchase_reason_detail: Option<String>,
    pub department_id: i64,
    pub notes: Option<String>,
    #[validate(length(min = 1, max = 255, message = "created_by is required"))]
    pub created_by: String,
    #[validate(length(min = 1, message = "At least one item is required"))]
    pub items: Vec<PurchaseRequestItemInput>,
}

#[async_trait::async_trait]
impl Command for CreatePurchaseRequestCommand {
    type Result = (
        purchase_request::Model,
        Vec<purchase_request_item::Model>,
    );

    #[instrument(skip(self, db_pool, event_sender), fields(department_id = %self.department_id, items = %self.items.len()))]
    async fn execute(
        &self,
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
    ) -> Result<Self::Result, ServiceError> {
        self.validate().map_err(|e| {
            PURCHASE_REQUEST_CREATION_FAILURES.inc();
            let msg = format!("Invalid input: {}", e);
            error!("{}", msg);
            ServiceError::ValidationError(msg)
        })?;
        for item in &self.items {
            item.validate().map_err(|e| {
                PURCHASE_REQUEST_CREATION_FAILURES.inc();
                ServiceError::ValidationError(format!("Invalid item: {}", e))
            })?;
        }

        let db = db_pool.as_ref();
        ensure_department_exists(db, self.department_id).await?;
        ensure_item_references_exist(db, &self.items).await?;

        let (saved, saved_items) = self.persist(db).await.map_err(|e| {
            PURCHASE_REQUEST_CREATION_FAILURES.inc();
            e
        })?;

        info!(
            purchase_request_id = %saved.id,
            total_items = %saved.total_items,
            created_by = %saved.created_by,
            "Purchase request created successfully"
        );
        PURCHASE_REQUEST_CREATIONS.inc();

        if let Err(e) = event_sender
            .send(Event::PurchaseRequestCreated(saved.id))
            .await
        {
            warn!(purchase_request_id = %saved.id, error = %e, "Failed to publish creation event");
        }

        Ok((saved, saved_items))
    }
}

impl CreatePurchaseRequestCommand {
    async fn persist(
        &self,
        db: &DbPool,
    ) -> Result<(purchase_request::Model, Vec<purchase_request_item::Model>), ServiceError> {
        let request_type = self.request_type;
        let buyer = self.buyer.clone();
        let purchase_reason = self.purchase_reason.clone();
        let purchase_reason_detail = self.purchase_reason_detail.clone();
        let department_id = self.department_id;
        let notes = self.notes.clone();
        let created_by = self.created_by.clone();
        let items = self.items.clone();

        db.transaction::<_, (purchase_request::Model, Vec<purchase_request_item::Model>), ServiceError>(
            move |txn| {
                Box::pin(async move {
                    let now = Utc::now();

                    let new_request = purchase_request::ActiveModel {
                        request_type: Set(request_type.to_string()),
                        request_date: Set(now),
                        status: Set(PurchaseRequestStatus::Pending.to_string()),
                        buyer: Set(buyer),
                        department_id: Set(department_id),
                        purchase_reason: Set(purchase_reason),
                        purchase_reason_detail: Set(purchase_reason_detail),
                        total_items: Set(items.len() as i32),
                        notes: Set(notes),
                        created_by: Set(created_by),
                        created_at: Set(now),
                        updated_at: Set(Some(now)),
                        ..Default::default()
                    };

                    let saved = new_request.insert(txn).await.map_err(|e| {
                        error!("Failed to create purchase request: {}", e);
                        ServiceError::DatabaseError(e)
                    })?;

                    let mut saved_items = Vec::with_capacity(items.len());
                    for item in &items {
                        let new_item = purchase_request_item::ActiveModel {
                            purchase_request_id: Set(saved.id),
                            goods_id: Set(item.goods_id),
                            quantity: Set(item.quantity),
                            measurement_id: Set(item.measurement_id),
                            created_at: Set(now),
                            updated_at: Set(Some(now)),
                            ..Default::default()
                        };
                        let saved_item = new_item.insert(txn).await.map_err(|e| {
                            error!(
                                "Failed to create item for purchase request {} (goods {}): {}",
                                saved.id, item.goods_id, e
                            );
                            ServiceError::DatabaseError(e)
                        })?;
                        saved_items.push(saved_item);
                    }

                    append_log(
                        txn,
                        saved.id,
                        "Purchase Request Created",
                        "Request created",
                        None,
                    )
                    .await?;
                    append_log(
                        txn,
                        saved.id,
                        "Waiting for Approval",
                        PurchaseRequestStatus::Pending.audit_description(),
                        None,
                    )
                    .await?;

                    Ok((saved, saved_items))
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
