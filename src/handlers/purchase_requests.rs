use super::common::{
    created_response, default_page, default_per_page, map_service_error, success_response,
    validate_input,
};
use crate::{
    commands::purchaserequests::{
        CreatePurchaseRequestCommand, DeletePurchaseRequestCommand,
        FollowUpPurchaseRequestCommand, PurchaseRequestItemInput, UpdatePurchaseRequestCommand,
        UpdatePurchaseRequestStatusCommand,
    },
    entities::purchase_request::{PurchaseRequestStatus, RequestType},
    errors::ApiError,
    handlers::AppState,
    services::procurement::PurchaseRequestFilter,
};
use axum::{
    extract::{Json, Path, Query, State},
    routing::{delete, get, post, put},
    Router,
};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::info;
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError};

// Request and response DTOs

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreatePurchaseRequestRequest {
    /// One of "material" or "non-material"
    #[validate(custom = "validate_request_type")]
    pub request_type: String,
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
    pub items: Vec<PurchaseRequestItemRequest>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct PurchaseRequestItemRequest {
    pub goods_id: i64,
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: i32,
    pub measurement_id: i64,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdatePurchaseRequestRequest {
    #[validate(custom = "validate_request_type")]
    pub request_type: Option<String>,
    #[validate(length(max = 255))]
    pub buyer: Option<String>,
    #[validate(length(max = 255))]
    pub purchase_reason: Option<String>,
    #[validate(length(max = 255))]
    pub purchase_reason_detail: Option<String>,
    pub notes: Option<String>,
    #[validate(length(max = 255))]
    pub updated_by: Option<String>,
    pub items: Option<Vec<PurchaseRequestItemRequest>>,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct FollowUpPurchaseRequestRequest {
    #[validate(length(min = 1, max = 255, message = "buyer is required"))]
    pub buyer: String,
    #[validate(length(min = 1, max = 255, message = "followed_by is required"))]
    pub followed_by: String,
    #[validate(length(max = 255))]
    pub purchase_reason: Option<String>,
    #[validate(length(max = 255))]
    pub purchase_reason_detail: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdatePurchaseRequestStatusRequest {
    /// One of "approved", "revised", or "rejected"
    #[validate(custom = "validate_transition_status")]
    pub status: String,
    #[validate(length(max = 1000))]
    pub update_status_reason: Option<String>,
    #[validate(length(min = 1, max = 255, message = "update_status_by is required"))]
    pub update_status_by: String,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct PurchaseRequestListQuery {
    pub request_type: Option<String>,
    pub status: Option<String>,
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_per_page")]
    pub per_page: u64,
}

fn validate_request_type(value: &str) -> Result<(), ValidationError> {
    RequestType::from_str(value)
        .map(|_| ())
        .map_err(|_| ValidationError::new("invalid_request_type"))
}

fn validate_transition_status(value: &str) -> Result<(), ValidationError> {
    match PurchaseRequestStatus::from_str(value) {
        Ok(status) if status.is_terminal() => Ok(()),
        _ => Err(ValidationError::new("invalid_status")),
    }
}

fn parse_request_type(value: &str) -> Result<RequestType, ApiError> {
    RequestType::from_str(value).map_err(|_| {
        ApiError::ValidationError(format!(
            "Invalid request_type '{}': expected material or non-material",
            value
        ))
    })
}

fn map_items(items: Vec<PurchaseRequestItemRequest>) -> Vec<PurchaseRequestItemInput> {
    items
        .into_iter()
        .map(|item| PurchaseRequestItemInput {
            goods_id: item.goods_id,
            quantity: item.quantity,
            measurement_id: item.measurement_id,
        })
        .collect()
}

// Handler functions

/// List purchase requests with optional type/status filters
#[utoipa::path(
    get,
    path = "/api/v1/purchase-requests",
    params(PurchaseRequestListQuery),
    responses(
        (status = 200, description = "Paginated purchase requests", body = serde_json::Value),
        (status = 422, description = "Invalid filter", body = crate::errors::ErrorResponse)
    ),
    tag = "purchase-requests"
)]
pub async fn list_purchase_requests(
    State(state): State<AppState>,
    Query(query): Query<PurchaseRequestListQuery>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let mut filter = PurchaseRequestFilter::default();
    if let Some(request_type) = &query.request_type {
        filter.request_type = Some(parse_request_type(request_type)?);
    }
    if let Some(status) = &query.status {
        filter.status = Some(PurchaseRequestStatus::from_str(status).map_err(|_| {
            ApiError::ValidationError(format!(
                "Invalid status '{}': expected pending, approved, revised, or rejected",
                status
            ))
        })?);
    }

    let list = state
        .services
        .procurement
        .list_purchase_requests(filter, query.page, query.per_page)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(list))
}

/// Create a new purchase request
#[utoipa::path(
    post,
    path = "/api/v1/purchase-requests",
    request_body = CreatePurchaseRequestRequest,
    responses(
        (status = 201, description = "Purchase request created", body = serde_json::Value),
        (status = 422, description = "Invalid request", body = crate::errors::ErrorResponse)
    ),
    tag = "purchase-requests"
)]
pub async fn create_purchase_request(
    State(state): State<AppState>,
    Json(payload): Json<CreatePurchaseRequestRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    validate_input(&payload)?;

    let command = CreatePurchaseRequestCommand {
        request_type: parse_request_type(&payload.request_type)?,
        buyer: payload.buyer,
        purchase_reason: payload.purchase_reason,
        purchase_reason_detail: payload.purchase_reason_detail,
        department_id: payload.department_id,
        notes: payload.notes,
        created_by: payload.created_by,
        items: map_items(payload.items),
    };

    let created = state
        .services
        .procurement
        .create_purchase_request(command)
        .await
        .map_err(map_service_error)?;

    info!("Purchase request created: {}", created.request.id);

    Ok(created_response(created))
}

/// Get a purchase request with denormalized item details
#[utoipa::path(
    get,
    path = "/api/v1/purchase-requests/{id}",
    params(("id" = i64, Path, description = "Purchase request ID")),
    responses(
        (status = 200, description = "Purchase request detail", body = serde_json::Value),
        (status = 404, description = "Purchase request not found", body = crate::errors::ErrorResponse)
    ),
    tag = "purchase-requests"
)]
pub async fn get_purchase_request(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let detail = state
        .services
        .procurement
        .get_purchase_request(id)
        .await
        .map_err(map_service_error)?
        .ok_or_else(|| ApiError::NotFound(format!("Purchase request {} not found", id)))?;

    Ok(success_response(detail))
}

/// Update a purchase request, replacing items wholesale when provided
#[utoipa::path(
    put,
    path = "/api/v1/purchase-requests/{id}",
    request_body = UpdatePurchaseRequestRequest,
    params(("id" = i64, Path, description = "Purchase request ID")),
    responses(
        (status = 200, description = "Purchase request updated", body = serde_json::Value),
        (status = 404, description = "Purchase request not found", body = crate::errors::ErrorResponse),
        (status = 422, description = "Invalid request", body = crate::errors::ErrorResponse)
    ),
    tag = "purchase-requests"
)]
pub async fn update_purchase_request(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdatePurchaseRequestRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    validate_input(&payload)?;

    let request_type = payload
        .request_type
        .as_deref()
        .map(parse_request_type)
        .transpose()?;

    let command = UpdatePurchaseRequestCommand {
        id,
        request_type,
        buyer: payload.buyer,
        purchase_reason: payload.purchase_reason,
        purchase_reason_detail: payload.purchase_reason_detail,
        notes: payload.notes,
        updated_by: payload.updated_by,
        items: payload.items.map(map_items),
    };

    let updated = state
        .services
        .procurement
        .update_purchase_request(command)
        .await
        .map_err(map_service_error)?;

    info!("Purchase request updated: {}", id);

    Ok(success_response(updated))
}

/// Assign a buyer to a pending purchase request (one-time)
#[utoipa::path(
    post,
    path = "/api/v1/purchase-requests/{id}/follow-up",
    request_body = FollowUpPurchaseRequestRequest,
    params(("id" = i64, Path, description = "Purchase request ID")),
    responses(
        (status = 200, description = "Buyer assigned", body = serde_json::Value),
        (status = 400, description = "Buyer already assigned", body = crate::errors::ErrorResponse),
        (status = 404, description = "Purchase request not found", body = crate::errors::ErrorResponse)
    ),
    tag = "purchase-requests"
)]
pub async fn follow_up_purchase_request(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<FollowUpPurchaseRequestRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    validate_input(&payload)?;

    let command = FollowUpPurchaseRequestCommand {
        id,
        buyer: payload.buyer,
        followed_by: payload.followed_by,
        purchase_reason: payload.purchase_reason,
        purchase_reason_detail: payload.purchase_reason_detail,
    };

    let followed_up = state
        .services
        .procurement
        .follow_up_purchase_request(command)
        .await
        .map_err(map_service_error)?;

    info!("Purchase request followed up: {}", id);

    Ok(success_response(followed_up))
}

/// Transition a purchase request to approved, revised, or rejected
#[utoipa::path(
    post,
    path = "/api/v1/purchase-requests/{id}/status",
    request_body = UpdatePurchaseRequestStatusRequest,
    params(("id" = i64, Path, description = "Purchase request ID")),
    responses(
        (status = 200, description = "Status updated", body = serde_json::Value),
        (status = 404, description = "Purchase request not found", body = crate::errors::ErrorResponse),
        (status = 422, description = "Missing reason or invalid status", body = crate::errors::ErrorResponse)
    ),
    tag = "purchase-requests"
)]
pub async fn update_purchase_request_status(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdatePurchaseRequestStatusRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    validate_input(&payload)?;

    let status = PurchaseRequestStatus::from_str(&payload.status).map_err(|_| {
        ApiError::ValidationError(format!(
            "Invalid status '{}': expected approved, revised, or rejected",
            payload.status
        ))
    })?;

    let command = UpdatePurchaseRequestStatusCommand {
        id,
        status,
        update_status_reason: payload.update_status_reason,
        update_status_by: payload.update_status_by,
    };

    let updated = state
        .services
        .procurement
        .update_purchase_request_status(command)
        .await
        .map_err(map_service_error)?;

    info!("Purchase request status updated: {} ({})", id, updated.status);

    Ok(success_response(updated))
}

/// Flattened purchase history of one goods for one department
#[utoipa::path(
    get,
    path = "/api/v1/purchase-requests/history/{goods_id}/{department_id}",
    params(
        ("goods_id" = i64, Path, description = "Goods ID"),
        ("department_id" = i64, Path, description = "Department ID")
    ),
    responses(
        (status = 200, description = "Purchase history", body = serde_json::Value)
    ),
    tag = "purchase-requests"
)]
pub async fn get_purchase_history(
    State(state): State<AppState>,
    Path((goods_id, department_id)): Path<(i64, i64)>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let history = state
        .services
        .procurement
        .get_purchase_history(goods_id, department_id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(history))
}

/// Delete a purchase request; items cascade, audit rows stay
#[utoipa::path(
    delete,
    path = "/api/v1/purchase-requests/{id}",
    params(("id" = i64, Path, description = "Purchase request ID")),
    responses(
        (status = 200, description = "Purchase request deleted", body = serde_json::Value),
        (status = 404, description = "Purchase request not found", body = crate::errors::ErrorResponse)
    ),
    tag = "purchase-requests"
)]
pub async fn delete_purchase_request(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    state
        .services
        .procurement
        .delete_purchase_request(DeletePurchaseRequestCommand { id })
        .await
        .map_err(map_service_error)?;

    info!("Purchase request deleted: {}", id);

    Ok(success_response(serde_json::json!({
        "message": "Purchase request deleted successfully."
    })))
}

/// Creates the router for purchase request endpoints
pub fn purchase_request_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_purchase_requests))
        .route("/", post(create_purchase_request))
        .route("/:id", get(get_purchase_request))
        .route(
            "/:id",
            put(update_purchase_request).patch(update_purchase_request),
        )
        .route("/:id", delete(delete_purchase_request))
        .route("/:id/follow-up", post(follow_up_purchase_request))
        .route("/:id/status", post(update_purchase_request_status))
        .route(
            "/history/:goods_id/:department_id",
            get(get_purchase_history),
        )
}
