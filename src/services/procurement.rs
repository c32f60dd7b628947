use crate::{
    commands::purchaserequests::{
        CreatePurchaseRequestCommand, DeletePurchaseRequestCommand,
        FollowUpPurchaseRequestCommand, UpdatePurchaseRequestCommand,
        UpdatePurchaseRequestStatusCommand,
    },
    commands::Command,
    db::DbPool,
    entities::{
        goods, goods_category, measurement_unit,
        purchase_request::{self, PurchaseRequestStatus, RequestType},
        purchase_request_item,
    },
    errors::ServiceError,
    events::EventSender,
};
use chrono::{DateTime, Utc};
use sea_orm::{
    ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::instrument;

/// A purchase request aggregate with its owned line items.
#[derive(Debug, Serialize)]
pub struct PurchaseRequestWithItems {
    #[serde(flatten)]
    pub request: purchase_request::Model,
    pub items: Vec<purchase_request_item::Model>,
}

/// Denormalized line item for the detail view.
#[derive(Debug, Serialize)]
pub struct PurchaseRequestItemDetail {
    pub id: i64,
    pub goods_id: i64,
    pub goods_name: Option<String>,
    pub goods_category_name: Option<String>,
    pub quantity: i32,
    pub measurement_id: i64,
    pub measurement: Option<String>,
}

/// Detail view of a purchase request with goods, category, and measurement
/// names resolved per item.
#[derive(Debug, Serialize)]
pub struct PurchaseRequestDetail {
    pub id: i64,
    pub request_type: String,
    pub request_date: DateTime<Utc>,
    pub approval_date: Option<DateTime<Utc>>,
    pub status: String,
    pub buyer: Option<String>,
    pub department_id: i64,
    pub purchase_reason: Option<String>,
    pub purchase_reason_detail: Option<String>,
    pub total_items: i32,
    pub notes: Option<String>,
    pub created_by: String,
    pub updated_by: Option<String>,
    pub followed_by: Option<String>,
    pub update_status_by: Option<String>,
    pub update_status_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub items: Vec<PurchaseRequestItemDetail>,
}

/// One flattened record of the purchase history for a goods/department pair.
#[derive(Debug, Serialize)]
pub struct PurchaseHistoryRecord {
    pub id: i64,
    pub purchase_request_id: i64,
    pub goods_id: i64,
    pub goods_name: Option<String>,
    pub category_name: Option<String>,
    pub quantity: i32,
    pub measurement_id: i64,
    pub measurement: Option<String>,
    pub purchase_request: purchase_request::Model,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct PurchaseRequestListResponse {
    pub requests: Vec<PurchaseRequestWithItems>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
}

/// Optional filters for the list endpoint.
#[derive(Debug, Default, Clone, Copy)]
pub struct PurchaseRequestFilter {
    pub request_type: Option<RequestType>,
    pub status: Option<PurchaseRequestStatus>,
}

/// Service for managing the purchase-request lifecycle.
#[derive(Clone)]
pub struct ProcurementService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl ProcurementService {
    /// Creates a new procurement service instance
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Creates a new purchase request with its items and opening audit rows
    #[instrument(skip(self, command))]
    pub async fn create_purchase_request(
        &self,
        command: CreatePurchaseRequestCommand,
    ) -> Result<PurchaseRequestWithItems, ServiceError> {
        let (request, items) = command
            .execute(self.db_pool.clone(), self.event_sender.clone())
            .await?;
        Ok(PurchaseRequestWithItems { request, items })
    }

    /// Updates an existing purchase request, replacing items wholesale when provided
    #[instrument(skip(self, command))]
    pub async fn update_purchase_request(
        &self,
        command: UpdatePurchaseRequestCommand,
    ) -> Result<PurchaseRequestWithItems, ServiceError> {
        let (request, items) = command
            .execute(self.db_pool.clone(), self.event_sender.clone())
            .await?;
        Ok(PurchaseRequestWithItems { request, items })
    }

    /// Assigns a buyer exactly once
    #[instrument(skip(self, command))]
    pub async fn follow_up_purchase_request(
        &self,
        command: FollowUpPurchaseRequestCommand,
    ) -> Result<purchase_request::Model, ServiceError> {
        command
            .execute(self.db_pool.clone(), self.event_sender.clone())
            .await
    }

    /// Transitions a pending request to approved, revised, or rejected
    #[instrument(skip(self, command))]
    pub async fn update_purchase_request_status(
        &self,
        command: UpdatePurchaseRequestStatusCommand,
    ) -> Result<purchase_request::Model, ServiceError> {
        command
            .execute(self.db_pool.clone(), self.event_sender.clone())
            .await
    }

    /// Deletes a purchase request; items cascade, audit rows stay
    #[instrument(skip(self, command))]
    pub async fn delete_purchase_request(
        &self,
        command: DeletePurchaseRequestCommand,
    ) -> Result<(), ServiceError> {
        command
            .execute(self.db_pool.clone(), self.event_sender.clone())
            .await
    }

    /// Gets a purchase request with denormalized goods/category/measurement names
    #[instrument(skip(self))]
    pub async fn get_purchase_request(
        &self,
        id: i64,
    ) -> Result<Option<PurchaseRequestDetail>, ServiceError> {
        let db = &*self.db_pool;

        let request = match purchase_request::Entity::find_by_id(id).one(db).await? {
            Some(request) => request,
            None => return Ok(None),
        };

        let items = purchase_request_item::Entity::find()
            .filter(purchase_request_item::Column::PurchaseRequestId.eq(id))
            .all(db)
            .await?;

        let goods_ids: Vec<i64> = items.iter().map(|i| i.goods_id).collect();
        let unit_ids: Vec<i64> = items.iter().map(|i| i.measurement_id).collect();

        let goods_with_categories: HashMap<i64, (String, Option<String>)> = goods::Entity::find()
            .filter(goods::Column::Id.is_in(goods_ids))
            .find_also_related(goods_category::Entity)
            .all(db)
            .await?
            .into_iter()
            .map(|(g, category)| (g.id, (g.name, category.map(|c| c.name))))
            .collect();

        let unit_names: HashMap<i64, String> = measurement_unit::Entity::find()
            .filter(measurement_unit::Column::Id.is_in(unit_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|u| (u.id, u.name))
            .collect();

        let items = items
            .into_iter()
            .map(|item| {
                let goods = goods_with_categories.get(&item.goods_id);
                PurchaseRequestItemDetail {
                    id: item.id,
                    goods_id: item.goods_id,
                    goods_name: goods.map(|(name, _)| name.clone()),
                    goods_category_name: goods.and_then(|(_, category)| category.clone()),
                    quantity: item.quantity,
                    measurement_id: item.measurement_id,
                    measurement: unit_names.get(&item.measurement_id).cloned(),
                }
            })
            .collect();

        Ok(Some(PurchaseRequestDetail {
            id: request.id,
            request_type: request.request_type,
            request_date: request.request_date,
            approval_date: request.approval_date,
            status: request.status,
            buyer: request.buyer,
            department_id: request.department_id,
            purchase_reason: request.purchase_reason,
            purchase_reason_detail: request.purchase_reason_detail,
            total_items: request.total_items,
            notes: request.notes,
            created_by: request.created_by,
            updated_by: request.updated_by,
            followed_by: request.followed_by,
            update_status_by: request.update_status_by,
            update_status_reason: request.update_status_reason,
            created_at: request.created_at,
            updated_at: request.updated_at,
            items,
        }))
    }

    /// Lists purchase requests with optional type/status filters, newest first
    #[instrument(skip(self))]
    pub async fn list_purchase_requests(
        &self,
        filter: PurchaseRequestFilter,
        page: u64,
        per_page: u64,
    ) -> Result<PurchaseRequestListResponse, ServiceError> {
        let db = &*self.db_pool;

        let mut query = purchase_request::Entity::find();
        if let Some(request_type) = filter.request_type {
            query = query
                .filter(purchase_request::Column::RequestType.eq(request_type.to_string()));
        }
        if let Some(status) = filter.status {
            query = query.filter(purchase_request::Column::Status.eq(status.to_string()));
        }

        let paginator = query
            .order_by_desc(purchase_request::Column::CreatedAt)
            .paginate(db, per_page);
        let total = paginator.num_items().await?;
        let requests = paginator.fetch_page(page.saturating_sub(1)).await?;

        let ids: Vec<i64> = requests.iter().map(|r| r.id).collect();
        let mut items_by_request: HashMap<i64, Vec<purchase_request_item::Model>> = HashMap::new();
        if !ids.is_empty() {
            for item in purchase_request_item::Entity::find()
                .filter(purchase_request_item::Column::PurchaseRequestId.is_in(ids))
                .all(db)
                .await?
            {
                items_by_request
                    .entry(item.purchase_request_id)
                    .or_default()
                    .push(item);
            }
        }

        let requests = requests
            .into_iter()
            .map(|request| {
                let items = items_by_request.remove(&request.id).unwrap_or_default();
                PurchaseRequestWithItems { request, items }
            })
            .collect();

        Ok(PurchaseRequestListResponse {
            requests,
            total,
            page,
            per_page,
        })
    }

    /// Flattened purchase history of one goods for one department
    #[instrument(skip(self))]
    pub async fn get_purchase_history(
        &self,
        goods_id: i64,
        department_id: i64,
    ) -> Result<Vec<PurchaseHistoryRecord>, ServiceError> {
        let db = &*self.db_pool;

        let rows = purchase_request_item::Entity::find()
            .filter(purchase_request_item::Column::GoodsId.eq(goods_id))
            .find_also_related(purchase_request::Entity)
            .filter(purchase_request::Column::DepartmentId.eq(department_id))
            .all(db)
            .await?;

        let (goods_name, category_name) = match goods::Entity::find_by_id(goods_id)
            .find_also_related(goods_category::Entity)
            .one(db)
            .await?
        {
            Some((g, category)) => (Some(g.name), category.map(|c| c.name)),
            None => (None, None),
        };

        let unit_ids: Vec<i64> = rows
            .iter()
            .map(|(item, _)| item.measurement_id)
            .collect();
        let unit_names: HashMap<i64, String> = measurement_unit::Entity::find()
            .filter(measurement_unit::Column::Id.is_in(unit_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|u| (u.id, u.name))
            .collect();

        let history = rows
            .into_iter()
            .filter_map(|(item, request)| request.map(|request| (item, request)))
            .map(|(item, request)| PurchaseHistoryRecord {
                id: item.id,
                purchase_request_id: item.purchase_request_id,
                goods_id: item.goods_id,
                goods_name: goods_name.clone(),
                category_name: category_name.clone(),
                quantity: item.quantity,
                measurement_id: item.measurement_id,
                measurement: unit_names.get(&item.measurement_id).cloned(),
                purchase_request: request,
                created_at: item.created_at,
                updated_at: item.updated_at,
            })
            .collect();

        Ok(history)
    }
}
