use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Procurement API",
        version = "0.1.0",
        description = r#"
REST backend for procurement management.

Purchase requests move through a small lifecycle: they are created as
`pending`, optionally followed up with a one-time buyer assignment, and then
approved, revised, or rejected. Every lifecycle event is recorded in an
append-only audit log that survives deletion of the request itself.

Goods categories are plain reference-data CRUD.
        "#,
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development")
    ),
    tags(
        (name = "purchase-requests", description = "Purchase request lifecycle endpoints"),
        (name = "goods-categories", description = "Goods category reference data")
    ),
    paths(
        crate::handlers::purchase_requests::list_purchase_requests,
        crate::handlers::purchase_requests::create_purchase_request,
        crate::handlers::purchase_requests::get_purchase_request,
        crate::handlers::purchase_requests::update_purchase_request,
        crate::handlers::purchase_requests::follow_up_purchase_request,
        crate::handlers::purchase_requests::update_purchase_request_status,
        crate::handlers::purchase_requests::get_purchase_history,
        crate::handlers::purchase_requests::delete_purchase_request,
        crate::handlers::goods_categories::list_goods_categories,
        crate::handlers::goods_categories::create_goods_category,
        crate::handlers::goods_categories::get_goods_category,
        crate::handlers::goods_categories::update_goods_category,
        crate::handlers::goods_categories::delete_goods_category,
    ),
    components(schemas(
        crate::handlers::purchase_requests::CreatePurchaseRequestRequest,
        crate::handlers::purchase_requests::PurchaseRequestItemRequest,
        crate::handlers::purchase_requests::UpdatePurchaseRequestRequest,
        crate::handlers::purchase_requests::FollowUpPurchaseRequestRequest,
        crate::handlers::purchase_requests::UpdatePurchaseRequestStatusRequest,
        crate::handlers::goods_categories::CreateGoodsCategoryRequest,
        crate::handlers::goods_categories::UpdateGoodsCategoryRequest,
        crate::errors::ErrorResponse,
    ))
)]
pub struct ApiDoc;

/// Swagger UI served at `/docs`, backed by `/api-docs/openapi.json`.
pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi())
}
