use std::sync::Arc;

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use chrono::Utc;
use http_body_util::BodyExt;
use procurement_api::{
    config::AppConfig,
    db,
    entities::{department, goods, goods_category, measurement_unit},
    events::{self, EventSender},
    handlers::AppServices,
    AppState,
};
use sea_orm::{ActiveModelTrait, Set};
use serde_json::Value;
use tokio::sync::mpsc;
use tower::ServiceExt;

/// Reference rows every lifecycle test needs: a department, a category, two
/// goods, and two measurement units.
#[allow(dead_code)]
pub struct SeedData {
    pub department_id: i64,
    pub category_id: i64,
    pub goods_id: i64,
    pub second_goods_id: i64,
    pub measurement_id: i64,
    pub second_measurement_id: i64,
}

/// Helper harness for spinning up an application state backed by an
/// in-memory SQLite database.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    pub seed: SeedData,
    _event_task: tokio::task::JoinHandle<()>,
}

impl TestApp {
    /// Construct a new test application with fresh database state.
    pub async fn new() -> Self {
        let mut cfg = AppConfig::new("sqlite::memory:", "127.0.0.1", 18_080, "test");
        cfg.db_max_connections = 1;
        cfg.db_min_connections = 1;

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");

        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let db_arc = Arc::new(pool);
        let (event_tx, event_rx) = mpsc::channel(64);
        let event_sender = EventSender::new(event_tx);
        let event_task = tokio::spawn(events::process_events(event_rx));

        let seed = seed_reference_data(&db_arc).await;

        let services = AppServices::new(db_arc.clone(), Arc::new(event_sender.clone()));

        let state = AppState {
            db: db_arc,
            config: cfg,
            event_sender,
            services,
        };

        let router = Router::new()
            .nest("/api/v1", procurement_api::api_v1_routes())
            .with_state(state.clone());

        Self {
            router,
            state,
            seed,
            _event_task: event_task,
        }
    }

    /// Send a JSON request against the router.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> axum::response::Response {
        let mut builder = Request::builder().method(method).uri(uri);

        let body = if let Some(json) = body {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&json).expect("failed to serialize json request body"))
        } else {
            Body::empty()
        };

        let request = builder.body(body).expect("failed to build request");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }

    /// Send a request and decode the JSON response body.
    pub async fn request_json(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let response = self.request(method, uri, body).await;
        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("failed to read response body")
            .to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("response body is not valid json")
        };
        (status, json)
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        self._event_task.abort();
    }
}

async fn seed_reference_data(db: &Arc<sea_orm::DatabaseConnection>) -> SeedData {
    let now = Utc::now();
    let db = db.as_ref();

    let dept = department::ActiveModel {
        name: Set("General Affairs".to_string()),
        created_at: Set(now),
        updated_at: Set(Some(now)),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("seed department");

    let category = goods_category::ActiveModel {
        name: Set("Office Supplies".to_string()),
        created_at: Set(now),
        updated_at: Set(Some(now)),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("seed goods category");

    let laptop = goods::ActiveModel {
        name: Set("Laptop".to_string()),
        category_id: Set(category.id),
        created_at: Set(now),
        updated_at: Set(Some(now)),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("seed goods");

    let printer = goods::ActiveModel {
        name: Set("Printer".to_string()),
        category_id: Set(category.id),
        created_at: Set(now),
        updated_at: Set(Some(now)),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("seed goods");

    let unit = measurement_unit::ActiveModel {
        name: Set("Unit".to_string()),
        created_at: Set(now),
        updated_at: Set(Some(now)),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("seed measurement unit");

    let boxes = measurement_unit::ActiveModel {
        name: Set("Box".to_string()),
        created_at: Set(now),
        updated_at: Set(Some(now)),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("seed measurement unit");

    SeedData {
        department_id: dept.id,
        category_id: category.id,
        goods_id: laptop.id,
        second_goods_id: printer.id,
        measurement_id: unit.id,
        second_measurement_id: boxes.id,
    }
}
