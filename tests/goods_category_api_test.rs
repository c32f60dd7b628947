mod common;

use axum::http::{Method, StatusCode};
use common::TestApp;
use serde_json::json;

#[tokio::test]
async fn goods_category_crud_round_trip() {
    let app = TestApp::new().await;

    // one category is seeded by the harness
    let (status, body) = app
        .request_json(Method::GET, "/api/v1/goods-categories", None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);
    assert_eq!(body["per_page"], 10);

    let (status, body) = app
        .request_json(
            Method::POST,
            "/api/v1/goods-categories",
            Some(json!({"name": "Electronics"})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "body: {}", body);
    let id = body["id"].as_i64().unwrap();
    assert_eq!(body["name"], "Electronics");

    let (status, body) = app
        .request_json(
            Method::GET,
            &format!("/api/v1/goods-categories/{}", id),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Electronics");

    let (status, body) = app
        .request_json(
            Method::PUT,
            &format!("/api/v1/goods-categories/{}", id),
            Some(json!({"name": "Consumer Electronics"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Consumer Electronics");

    let response = app
        .request(
            Method::DELETE,
            &format!("/api/v1/goods-categories/{}", id),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let (status, _) = app
        .request_json(
            Method::GET,
            &format!("/api/v1/goods-categories/{}", id),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn goods_category_validation_and_missing_ids() {
    let app = TestApp::new().await;

    let (status, _) = app
        .request_json(
            Method::POST,
            "/api/v1/goods-categories",
            Some(json!({"name": ""})),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = app
        .request_json(Method::GET, "/api/v1/goods-categories/424242", None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .request_json(
            Method::PUT,
            "/api/v1/goods-categories/424242",
            Some(json!({"name": "Ghost"})),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .request_json(Method::DELETE, "/api/v1/goods-categories/424242", None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
