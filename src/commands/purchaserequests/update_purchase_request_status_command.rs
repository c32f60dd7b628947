use crate::{
    commands::purchaserequests::{append_log, metrics::PURCHASE_REQUEST_STATUS_UPDATES},
    commands::Command,
    db::DbPool,
    entities::purchase_request::{self, PurchaseRequestStatus},
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, EntityTrait, Set, TransactionTrait};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct UpdatePurchaseRequestStatusCommand {
    pub id: i64,
    pub status: PurchaseRequestStatus,
    #[validate(length(max = 1000))]
    pub update_status_reason: Option<String>,
    #[validate(length(min = 1, max = 255, message = "update_status_by is required"))]
    pub update_status_by: String,
}

#[async_trait::async_trait]
impl Command for UpdatePurchaseRequestStatusCommand {
    type Result = purchase_request::Model;

    #[instrument(skip(self, db_pool, event_sender), fields(purchase_request_id = %self.id, status = %self.status))]
    async fn execute(
        &self,
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
    ) -> Result<Self::Result, ServiceError> {
        self.validate()
            .map_err(|e| ServiceError::ValidationError(format!("Invalid input: {}", e)))?;

        if self.status == PurchaseRequestStatus::Pending {
            return Err(ServiceError::ValidationError(
                "Status must be one of: approved, revised, rejected".to_string(),
            ));
        }

        // The reason rule is checked before any write so a rejected request
        // leaves no audit row behind.
        let reason = self
            .update_status_reason
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty());
        if self.status.requires_reason() && reason.is_none() {
            return Err(ServiceError::ValidationError(
                "Reason is required when the status is \"revised\" or \"rejected\"".to_string(),
            ));
        }

        let db = db_pool.as_ref();
        let now = Utc::now();

        let txn = db.begin().await.map_err(|e| {
            error!("Failed to start status-update transaction: {}", e);
            ServiceError::DatabaseError(e)
        })?;

        let existing = purchase_request::Entity::find_by_id(self.id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Purchase request {} not found", self.id)))?;

        let current = PurchaseRequestStatus::from_str(&existing.status).map_err(|_| {
            ServiceError::InternalError(format!(
                "Purchase request {} carries unknown status '{}'",
                existing.id, existing.status
            ))
        })?;
        if !current.can_transition_to(self.status) {
            return Err(ServiceError::InvalidOperation(format!(
                "Cannot transition purchase request {} from {} to {}",
                self.id, current, self.status
            )));
        }

        let old_status = existing.status.clone();
        let mut active: purchase_request::ActiveModel = existing.into();
        active.status = Set(self.status.to_string());
        active.update_status_by = Set(Some(self.update_status_by.clone()));
        if let Some(reason) = reason {
            active.update_status_reason = Set(Some(reason.to_string()));
        }
        if self.status == PurchaseRequestStatus::Approved {
            active.approval_date = Set(Some(now));
        }
        active.updated_at = Set(Some(now));

        let updated = active.update(&txn).await.map_err(|e| {
            error!("Failed to update status of purchase request {}: {}", self.id, e);
            ServiceError::DatabaseError(e)
        })?;

        append_log(
            &txn,
            updated.id,
            &format!("{} Purchase Request", self.status),
            self.status.audit_description(),
            Some(&self.update_status_by),
        )
        .await?;

        txn.commit().await.map_err(|e| {
            error!("Failed to commit status-update transaction: {}", e);
            ServiceError::DatabaseError(e)
        })?;

        info!(
            purchase_request_id = %updated.id,
            old_status = %old_status,
            new_status = %updated.status,
            "Purchase request status updated successfully"
        );
        PURCHASE_REQUEST_STATUS_UPDATES.inc();

        if let Err(e) = event_sender
            .send(Event::PurchaseRequestStatusChanged {
                purchase_request_id: updated.id,
                old_status,
                new_status: updated.status.clone(),
            })
            .await
        {
            warn!(purchase_request_id = %updated.id, error = %e, "Failed to publish status-change event");
        }

        Ok(updated)
    }
}
