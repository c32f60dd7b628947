use crate::{
    commands::purchaserequests::{append_log, metrics::PURCHASE_REQUEST_FOLLOW_UPS},
    commands::Command,
    db::DbPool,
    entities::purchase_request,
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::Utc;
use sea_orm::{
    sea_query::Expr, ColumnTrait, EntityTrait, QueryFilter, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use validator::Validate;

/// One-time buyer assignment. The update is conditional on `buyer IS NULL` so
/// two racing follow-ups cannot both succeed.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct FollowUpPurchaseRequestCommand {
    pub id: i64,
    #[validate(length(min = 1, max = 255, message = "buyer is required"))]
    pub buyer: String,
    #[validate(length(min = 1, max = 255, message = "followed_by is required"))]
    pub followed_by: String,
    #[validate(length(max = 255))]
    pub purchase_reason: Option<String>,
    #[validate(length(max = 255))]
    pub purchase_reason_detail: Option<String>,
}

#[async_trait::async_trait]
impl Command for FollowUpPurchaseRequestCommand {
    type Result = purchase_request::Model;

    #[instrument(skip(self, db_pool, event_sender), fields(purchase_request_id = %self.id, buyer = %self.buyer))]
    async fn execute(
        &self,
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
    ) -> Result<Self::Result, ServiceError> {
        self.validate()
            .map_err(|e| ServiceError::ValidationError(format!("Invalid input: {}", e)))?;

        let db = db_pool.as_ref();
        let now = Utc::now();

        let txn = db.begin().await.map_err(|e| {
            error!("Failed to start follow-up transaction: {}", e);
            ServiceError::DatabaseError(e)
        })?;

        let mut update = purchase_request::Entity::update_many()
            .col_expr(
                purchase_request::Column::Buyer,
                Expr::value(Some(self.buyer.clone())),
            )
            .col_expr(
                purchase_request::Column::FollowedBy,
                Expr::value(Some(self.followed_by.clone())),
            )
            .col_expr(purchase_request::Column::UpdatedAt, Expr::value(Some(now)))
            .filter(purchase_request::Column::Id.eq(self.id))
            .filter(purchase_request::Column::Buyer.is_null());
        if let Some(reason) = &self.purchase_reason {
            update = update.col_expr(
                purchase_request::Column::PurchaseReason,
                Expr::value(Some(reason.clone())),
            );
        }
        if let Some(detail) = &self.purchase_reason_detail {
            update = update.col_expr(
                purchase_request::Column::PurchaseReasonDetail,
                Expr::value(Some(detail.clone())),
            );
        }

        let result = update.exec(&txn).await?;

        if result.rows_affected == 0 {
            // Distinguish a missing request from one that already has a buyer.
            let existing = purchase_request::Entity::find_by_id(self.id)
                .one(&txn)
                .await?;
            return Err(match existing {
                Some(_) => ServiceError::Conflict(format!(
                    "Purchase request {} already has a buyer",
                    self.id
                )),
                None => {
                    ServiceError::NotFound(format!("Purchase request {} not found", self.id))
                }
            });
        }

        append_log(
            &txn,
            self.id,
            "Follow Up Purchase Request",
            "Follow Up",
            Some(&self.followed_by),
        )
        .await?;

        let followed_up = purchase_request::Entity::find_by_id(self.id)
            .one(&txn)
            .await?
            .ok_or_else(|| {
                ServiceError::InternalError(format!(
                    "Purchase request {} disappeared during follow-up",
                    self.id
                ))
            })?;

        txn.commit().await.map_err(|e| {
            error!("Failed to commit follow-up transaction: {}", e);
            ServiceError::DatabaseError(e)
        })?;

        info!(
            purchase_request_id = %followed_up.id,
            followed_by = %self.followed_by,
            "Purchase request followed up successfully"
        );
        PURCHASE_REQUEST_FOLLOW_UPS.inc();

        if let Err(e) = event_sender
            .send(Event::PurchaseRequestFollowedUp {
                purchase_request_id: followed_up.id,
                buyer: self.buyer.clone(),
            })
            .await
        {
            warn!(purchase_request_id = %followed_up.id, error = %e, "Failed to publish follow-up event");
        }

        Ok(followed_up)
    }
}
