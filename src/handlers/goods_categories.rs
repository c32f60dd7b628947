use super::common::{
    created_response, map_service_error, no_content_response, success_response, validate_input,
    PaginationParams,
};
use crate::{errors::ApiError, handlers::AppState};
use axum::{
    extract::{Json, Path, Query, State},
    routing::{delete, get, post, put},
    Router,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateGoodsCategoryRequest {
    #[validate(length(min = 1, max = 255, message = "name is required"))]
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateGoodsCategoryRequest {
    #[validate(length(min = 1, max = 255, message = "name is required"))]
    pub name: String,
}

/// List goods categories
#[utoipa::path(
    get,
    path = "/api/v1/goods-categories",
    params(PaginationParams),
    responses(
        (status = 200, description = "Paginated goods categories", body = serde_json::Value)
    ),
    tag = "goods-categories"
)]
pub async fn list_goods_categories(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let list = state
        .services
        .catalog
        .list_categories(params.page, params.per_page)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(list))
}

/// Create a goods category
#[utoipa::path(
    post,
    path = "/api/v1/goods-categories",
    request_body = CreateGoodsCategoryRequest,
    responses(
        (status = 201, description = "Goods category created", body = serde_json::Value),
        (status = 422, description = "Invalid request", body = crate::errors::ErrorResponse)
    ),
    tag = "goods-categories"
)]
pub async fn create_goods_category(
    State(state): State<AppState>,
    Json(payload): Json<CreateGoodsCategoryRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    validate_input(&payload)?;

    let created = state
        .services
        .catalog
        .create_category(payload.name)
        .await
        .map_err(map_service_error)?;

    info!("Goods category created: {}", created.id);

    Ok(created_response(created))
}

/// Get a goods category by ID
#[utoipa::path(
    get,
    path = "/api/v1/goods-categories/{id}",
    params(("id" = i64, Path, description = "Goods category ID")),
    responses(
        (status = 200, description = "Goods category", body = serde_json::Value),
        (status = 404, description = "Goods category not found", body = crate::errors::ErrorResponse)
    ),
    tag = "goods-categories"
)]
pub async fn get_goods_category(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let category = state
        .services
        .catalog
        .get_category(id)
        .await
        .map_err(map_service_error)?
        .ok_or_else(|| ApiError::NotFound(format!("Goods category {} not found", id)))?;

    Ok(success_response(category))
}

/// Update a goods category
#[utoipa::path(
    put,
    path = "/api/v1/goods-categories/{id}",
    request_body = UpdateGoodsCategoryRequest,
    params(("id" = i64, Path, description = "Goods category ID")),
    responses(
        (status = 200, description = "Goods category updated", body = serde_json::Value),
        (status = 404, description = "Goods category not found", body = crate::errors::ErrorResponse),
        (status = 422, description = "Invalid request", body = crate::errors::ErrorResponse)
    ),
    tag = "goods-categories"
)]
pub async fn update_goods_category(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateGoodsCategoryRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    validate_input(&payload)?;

    let updated = state
        .services
        .catalog
        .update_category(id, payload.name)
        .await
        .map_err(map_service_error)?;

    info!("Goods category updated: {}", id);

    Ok(success_response(updated))
}

/// Delete a goods category
#[utoipa::path(
    delete,
    path = "/api/v1/goods-categories/{id}",
    params(("id" = i64, Path, description = "Goods category ID")),
    responses(
        (status = 204, description = "Goods category deleted"),
        (status = 404, description = "Goods category not found", body = crate::errors::ErrorResponse)
    ),
    tag = "goods-categories"
)]
pub async fn delete_goods_category(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    state
        .services
        .catalog
        .delete_category(id)
        .await
        .map_err(map_service_error)?;

    info!("Goods category deleted: {}", id);

    Ok(no_content_response())
}

/// Creates the router for goods category endpoints
pub fn goods_category_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_goods_categories))
        .route("/", post(create_goods_category))
        .route("/:id", get(get_goods_category))
        .route("/:id", put(update_goods_category))
        .route("/:id", delete(delete_goods_category))
}
