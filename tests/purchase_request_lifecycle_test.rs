mod common;

use axum::http::{Method, StatusCode};
use common::TestApp;
use procurement_api::entities::{procurement_log, purchase_request_item};
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};
use serde_json::{json, Value};

async fn create_purchase_request(app: &TestApp, items: Value) -> Value {
    let (status, body) = app
        .request_json(
            Method::POST,
            "/api/v1/purchase-requests",
            Some(json!({
                "request_type": "material",
                "department_id": app.seed.department_id,
                "purchase_reason": "Restock",
                "created_by": "Requester",
                "items": items,
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "create failed: {}", body);
    body
}

fn default_items(app: &TestApp) -> Value {
    json!([{
        "goods_id": app.seed.goods_id,
        "quantity": 3,
        "measurement_id": app.seed.measurement_id,
    }])
}

async fn audit_rows(app: &TestApp, purchase_request_id: i64) -> Vec<procurement_log::Model> {
    procurement_log::Entity::find()
        .filter(procurement_log::Column::PurchaseRequestId.eq(purchase_request_id))
        .all(app.state.db.as_ref())
        .await
        .expect("query audit rows")
}

async fn item_count(app: &TestApp, purchase_request_id: i64) -> u64 {
    purchase_request_item::Entity::find()
        .filter(purchase_request_item::Column::PurchaseRequestId.eq(purchase_request_id))
        .count(app.state.db.as_ref())
        .await
        .expect("count items")
}

#[tokio::test]
async fn create_computes_total_items_and_writes_two_audit_rows() {
    let app = TestApp::new().await;

    let body = create_purchase_request(
        &app,
        json!([
            {"goods_id": app.seed.goods_id, "quantity": 3, "measurement_id": app.seed.measurement_id},
            {"goods_id": app.seed.second_goods_id, "quantity": 1, "measurement_id": app.seed.second_measurement_id},
        ]),
    )
    .await;

    assert_eq!(body["total_items"], 2);
    assert_eq!(body["status"], "pending");
    assert_eq!(body["items"].as_array().unwrap().len(), 2);
    assert!(body["buyer"].is_null());

    let id = body["id"].as_i64().unwrap();
    let logs = audit_rows(&app, id).await;
    assert_eq!(logs.len(), 2);
    let names: Vec<&str> = logs.iter().map(|log| log.log_name.as_str()).collect();
    assert!(names.contains(&"Purchase Request Created"));
    assert!(names.contains(&"Waiting for Approval"));
}

#[tokio::test]
async fn create_rejects_unknown_goods_reference() {
    let app = TestApp::new().await;

    let (status, body) = app
        .request_json(
            Method::POST,
            "/api/v1/purchase-requests",
            Some(json!({
                "request_type": "material",
                "department_id": app.seed.department_id,
                "created_by": "Requester",
                "items": [{"goods_id": 9999, "quantity": 1, "measurement_id": app.seed.measurement_id}],
            })),
        )
        .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "body: {}", body);
}

#[tokio::test]
async fn create_rejects_empty_item_list_and_bad_request_type() {
    let app = TestApp::new().await;

    let (status, _) = app
        .request_json(
            Method::POST,
            "/api/v1/purchase-requests",
            Some(json!({
                "request_type": "material",
                "department_id": app.seed.department_id,
                "created_by": "Requester",
                "items": [],
            })),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = app
        .request_json(
            Method::POST,
            "/api/v1/purchase-requests",
            Some(json!({
                "request_type": "equipment",
                "department_id": app.seed.department_id,
                "created_by": "Requester",
                "items": [{"goods_id": app.seed.goods_id, "quantity": 1, "measurement_id": app.seed.measurement_id}],
            })),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn full_lifecycle_scenario() {
    let app = TestApp::new().await;

    // create → 201, total_items=1, status=pending
    let body = create_purchase_request(&app, default_items(&app)).await;
    let id = body["id"].as_i64().unwrap();
    assert_eq!(body["total_items"], 1);
    assert_eq!(body["status"], "pending");

    // updateStatus(approved) → approval_date set, status=approved
    let (status, body) = app
        .request_json(
            Method::POST,
            &format!("/api/v1/purchase-requests/{}/status", id),
            Some(json!({"status": "approved", "update_status_by": "Head of Department"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "body: {}", body);
    assert_eq!(body["status"], "approved");
    assert!(body["approval_date"].is_string());

    // followUp(buyer=X) → 200, buyer=X
    let (status, body) = app
        .request_json(
            Method::POST,
            &format!("/api/v1/purchase-requests/{}/follow-up", id),
            Some(json!({"buyer": "X", "followed_by": "Procurement Staff"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "body: {}", body);
    assert_eq!(body["buyer"], "X");
    assert_eq!(body["followed_by"], "Procurement Staff");

    // followUp(buyer=Y) again → 400 conflict, state unchanged
    let (status, body) = app
        .request_json(
            Method::POST,
            &format!("/api/v1/purchase-requests/{}/follow-up", id),
            Some(json!({"buyer": "Y", "followed_by": "Someone Else"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "body: {}", body);
    assert!(body["message"]
        .as_str()
        .unwrap()
        .contains("already has a buyer"));

    let (status, body) = app
        .request_json(
            Method::GET,
            &format!("/api/v1/purchase-requests/{}", id),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["buyer"], "X");

    // two creation rows + one status row + one follow-up row
    let logs = audit_rows(&app, id).await;
    assert_eq!(logs.len(), 4);
}

#[tokio::test]
async fn update_status_without_reason_is_rejected_and_writes_no_audit_row() {
    let app = TestApp::new().await;

    let body = create_purchase_request(&app, default_items(&app)).await;
    let id = body["id"].as_i64().unwrap();

    for target in ["revised", "rejected"] {
        let (status, body) = app
            .request_json(
                Method::POST,
                &format!("/api/v1/purchase-requests/{}/status", id),
                Some(json!({"status": target, "update_status_by": "Head of Department"})),
            )
            .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "body: {}", body);
    }

    // still only the two creation rows, and still pending
    assert_eq!(audit_rows(&app, id).await.len(), 2);
    let (_, body) = app
        .request_json(
            Method::GET,
            &format!("/api/v1/purchase-requests/{}", id),
            None,
        )
        .await;
    assert_eq!(body["status"], "pending");
}

#[tokio::test]
async fn approve_writes_exactly_one_approved_audit_row() {
    let app = TestApp::new().await;

    let body = create_purchase_request(&app, default_items(&app)).await;
    let id = body["id"].as_i64().unwrap();

    let (status, body) = app
        .request_json(
            Method::POST,
            &format!("/api/v1/purchase-requests/{}/status", id),
            Some(json!({"status": "approved", "update_status_by": "Head of Department"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "body: {}", body);
    assert!(body["approval_date"].is_string());

    let approved_rows: Vec<_> = audit_rows(&app, id)
        .await
        .into_iter()
        .filter(|log| log.log_description == "Approved")
        .collect();
    assert_eq!(approved_rows.len(), 1);
    assert_eq!(approved_rows[0].actor.as_deref(), Some("Head of Department"));
}

#[tokio::test]
async fn revise_with_reason_records_it() {
    let app = TestApp::new().await;

    let body = create_purchase_request(&app, default_items(&app)).await;
    let id = body["id"].as_i64().unwrap();

    let (status, body) = app
        .request_json(
            Method::POST,
            &format!("/api/v1/purchase-requests/{}/status", id),
            Some(json!({
                "status": "revised",
                "update_status_reason": "Quantities exceed the quarterly budget",
                "update_status_by": "Head of Department",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "body: {}", body);
    assert_eq!(body["status"], "revised");
    assert_eq!(
        body["update_status_reason"],
        "Quantities exceed the quarterly budget"
    );
    assert!(body["approval_date"].is_null());
}

#[tokio::test]
async fn terminal_states_reject_further_transitions() {
    let app = TestApp::new().await;

    let body = create_purchase_request(&app, default_items(&app)).await;
    let id = body["id"].as_i64().unwrap();

    let (status, _) = app
        .request_json(
            Method::POST,
            &format!("/api/v1/purchase-requests/{}/status", id),
            Some(json!({"status": "approved", "update_status_by": "Head of Department"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .request_json(
            Method::POST,
            &format!("/api/v1/purchase-requests/{}/status", id),
            Some(json!({
                "status": "rejected",
                "update_status_reason": "Changed my mind",
                "update_status_by": "Head of Department",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "body: {}", body);
}

#[tokio::test]
async fn update_replaces_items_wholesale() {
    let app = TestApp::new().await;

    let body = create_purchase_request(&app, default_items(&app)).await;
    let id = body["id"].as_i64().unwrap();
    let old_item_id = body["items"][0]["id"].as_i64().unwrap();

    let (status, body) = app
        .request_json(
            Method::PUT,
            &format!("/api/v1/purchase-requests/{}", id),
            Some(json!({
                "notes": "Replaced the whole list",
                "updated_by": "Requester",
                "items": [
                    {"goods_id": app.seed.goods_id, "quantity": 10, "measurement_id": app.seed.measurement_id},
                    {"goods_id": app.seed.second_goods_id, "quantity": 2, "measurement_id": app.seed.second_measurement_id},
                ],
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "body: {}", body);
    assert_eq!(body["total_items"], 2);
    assert_eq!(body["notes"], "Replaced the whole list");

    let new_ids: Vec<i64> = body["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["id"].as_i64().unwrap())
        .collect();
    assert_eq!(new_ids.len(), 2);
    assert!(!new_ids.contains(&old_item_id));
    assert_eq!(item_count(&app, id).await, 2);
}

#[tokio::test]
async fn update_without_items_keeps_existing_items() {
    let app = TestApp::new().await;

    let body = create_purchase_request(&app, default_items(&app)).await;
    let id = body["id"].as_i64().unwrap();

    let (status, body) = app
        .request_json(
            Method::PUT,
            &format!("/api/v1/purchase-requests/{}", id),
            Some(json!({"notes": "Only the notes changed"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "body: {}", body);
    assert_eq!(body["total_items"], 1);
    assert_eq!(body["updated_by"], "System");
    assert_eq!(item_count(&app, id).await, 1);
}

#[tokio::test]
async fn destroy_removes_items_but_keeps_audit_rows() {
    let app = TestApp::new().await;

    let body = create_purchase_request(&app, default_items(&app)).await;
    let id = body["id"].as_i64().unwrap();
    assert_eq!(audit_rows(&app, id).await.len(), 2);

    let (status, _) = app
        .request_json(
            Method::DELETE,
            &format!("/api/v1/purchase-requests/{}", id),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .request_json(
            Method::GET,
            &format!("/api/v1/purchase-requests/{}", id),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    assert_eq!(item_count(&app, id).await, 0);
    assert_eq!(audit_rows(&app, id).await.len(), 2);
}

#[tokio::test]
async fn unknown_ids_return_not_found() {
    let app = TestApp::new().await;

    let (status, _) = app
        .request_json(Method::GET, "/api/v1/purchase-requests/424242", None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .request_json(
            Method::DELETE,
            "/api/v1/purchase-requests/424242",
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .request_json(
            Method::POST,
            "/api/v1/purchase-requests/424242/follow-up",
            Some(json!({"buyer": "X", "followed_by": "Staff"})),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .request_json(
            Method::POST,
            "/api/v1/purchase-requests/424242/status",
            Some(json!({"status": "approved", "update_status_by": "Head"})),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn list_filters_by_status_and_request_type() {
    let app = TestApp::new().await;

    let first = create_purchase_request(&app, default_items(&app)).await;
    let first_id = first["id"].as_i64().unwrap();
    create_purchase_request(&app, default_items(&app)).await;

    let (status, _) = app
        .request_json(
            Method::POST,
            &format!("/api/v1/purchase-requests/{}/status", first_id),
            Some(json!({"status": "approved", "update_status_by": "Head"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .request_json(
            Method::GET,
            "/api/v1/purchase-requests?status=approved",
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);
    assert_eq!(body["requests"][0]["id"].as_i64().unwrap(), first_id);

    let (status, body) = app
        .request_json(
            Method::GET,
            "/api/v1/purchase-requests?request_type=material",
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 2);

    let (status, body) = app
        .request_json(
            Method::GET,
            "/api/v1/purchase-requests?request_type=non-material",
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 0);

    // items are eager-loaded on the list
    assert!(body["requests"].as_array().unwrap().is_empty());
    let (_, body) = app
        .request_json(Method::GET, "/api/v1/purchase-requests", None)
        .await;
    assert_eq!(body["requests"][0]["items"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn detail_view_denormalizes_names() {
    let app = TestApp::new().await;

    let body = create_purchase_request(&app, default_items(&app)).await;
    let id = body["id"].as_i64().unwrap();

    let (status, body) = app
        .request_json(
            Method::GET,
            &format!("/api/v1/purchase-requests/{}", id),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let item = &body["items"][0];
    assert_eq!(item["goods_name"], "Laptop");
    assert_eq!(item["goods_category_name"], "Office Supplies");
    assert_eq!(item["measurement"], "Unit");
    assert_eq!(item["quantity"], 3);
}

#[tokio::test]
async fn purchase_history_flattens_matching_items() {
    let app = TestApp::new().await;

    let body = create_purchase_request(&app, default_items(&app)).await;
    let id = body["id"].as_i64().unwrap();

    let (status, body) = app
        .request_json(
            Method::GET,
            &format!(
                "/api/v1/purchase-requests/history/{}/{}",
                app.seed.goods_id, app.seed.department_id
            ),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let records = body.as_array().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["goods_name"], "Laptop");
    assert_eq!(records[0]["category_name"], "Office Supplies");
    assert_eq!(records[0]["purchase_request"]["id"].as_i64().unwrap(), id);

    // other department sees nothing
    let (status, body) = app
        .request_json(
            Method::GET,
            &format!(
                "/api/v1/purchase-requests/history/{}/{}",
                app.seed.goods_id, 9999
            ),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.as_array().unwrap().is_empty());
}
