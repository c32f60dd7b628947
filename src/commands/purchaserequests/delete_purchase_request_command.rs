use crate::{
    commands::Command,
    db::DbPool,
    entities::purchase_request,
    errors::ServiceError,
    events::{Event, EventSender},
};
use sea_orm::EntityTrait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Deletes a purchase request. Line items go with it via the cascade foreign
/// key; audit rows are deliberately left in place.
#[derive(Debug, Serialize, Deserialize)]
pub struct DeletePurchaseRequestCommand {
    pub id: i64,
}

#[async_trait::async_trait]
impl Command for DeletePurchaseRequestCommand {
    type Result = ();

    #[instrument(skip(self, db_pool, event_sender), fields(purchase_request_id = %self.id))]
    async fn execute(
        &self,
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
    ) -> Result<Self::Result, ServiceError> {
        let db = db_pool.as_ref();

        let result = purchase_request::Entity::delete_by_id(self.id)
            .exec(db)
            .await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound(format!(
                "Purchase request {} not found",
                self.id
            )));
        }

        info!(purchase_request_id = %self.id, "Purchase request deleted successfully");

        if let Err(e) = event_sender
            .send(Event::PurchaseRequestDeleted(self.id))
            .await
        {
            warn!(purchase_request_id = %self.id, error = %e, "Failed to publish deletion event");
        }

        Ok(())
    }
}
