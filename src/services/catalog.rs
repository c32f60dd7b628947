use crate::{
    db::DbPool,
    entities::goods_category,
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, EntityTrait, PaginatorTrait, QueryOrder, Set};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument, warn};

#[derive(Debug, Serialize)]
pub struct GoodsCategoryListResponse {
    pub categories: Vec<goods_category::Model>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
}

/// Service for the goods catalog reference data.
#[derive(Clone)]
pub struct CatalogService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl CatalogService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    #[instrument(skip(self))]
    pub async fn list_categories(
        &self,
        page: u64,
        per_page: u64,
    ) -> Result<GoodsCategoryListResponse, ServiceError> {
        let db = &*self.db_pool;

        let paginator = goods_category::Entity::find()
            .order_by_asc(goods_category::Column::Id)
            .paginate(db, per_page);
        let total = paginator.num_items().await?;
        let categories = paginator.fetch_page(page.saturating_sub(1)).await?;

        Ok(GoodsCategoryListResponse {
            categories,
            total,
            page,
            per_page,
        })
    }

    #[instrument(skip(self))]
    pub async fn create_category(
        &self,
        name: String,
    ) -> Result<goods_category::Model, ServiceError> {
        let db = &*self.db_pool;
        let now = Utc::now();

        let created = goods_category::ActiveModel {
            name: Set(name),
            created_at: Set(now),
            updated_at: Set(Some(now)),
            ..Default::default()
        }
        .insert(db)
        .await?;

        info!(category_id = %created.id, "Goods category created");

        if let Err(e) = self
            .event_sender
            .send(Event::GoodsCategoryCreated(created.id))
            .await
        {
            warn!(category_id = %created.id, error = %e, "Failed to publish category event");
        }

        Ok(created)
    }

    #[instrument(skip(self))]
    pub async fn get_category(
        &self,
        id: i64,
    ) -> Result<Option<goods_category::Model>, ServiceError> {
        let db = &*self.db_pool;
        Ok(goods_category::Entity::find_by_id(id).one(db).await?)
    }

    #[instrument(skip(self))]
    pub async fn update_category(
        &self,
        id: i64,
        name: String,
    ) -> Result<goods_category::Model, ServiceError> {
        let db = &*self.db_pool;

        let existing = goods_category::Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Goods category {} not found", id)))?;

        let mut active: goods_category::ActiveModel = existing.into();
        active.name = Set(name);
        active.updated_at = Set(Some(Utc::now()));
        let updated = active.update(db).await?;

        info!(category_id = %updated.id, "Goods category updated");

        if let Err(e) = self
            .event_sender
            .send(Event::GoodsCategoryUpdated(updated.id))
            .await
        {
            warn!(category_id = %updated.id, error = %e, "Failed to publish category event");
        }

        Ok(updated)
    }

    #[instrument(skip(self))]
    pub async fn delete_category(&self, id: i64) -> Result<(), ServiceError> {
        let db = &*self.db_pool;

        let result = goods_category::Entity::delete_by_id(id).exec(db).await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound(format!(
                "Goods category {} not found",
                id
            )));
        }

        info!(category_id = %id, "Goods category deleted");

        if let Err(e) = self.event_sender.send(Event::GoodsCategoryDeleted(id)).await {
            warn!(category_id = %id, error = %e, "Failed to publish category event");
        }

        Ok(())
    }
}
