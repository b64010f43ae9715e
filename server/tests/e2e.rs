use axum::{
    body::Body,
    http::{header::CONTENT_TYPE, Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use mercado_backend_api::{build_router, AppState, OutboundEvent};
use mercado_backend_runtime::BackendServices;
use mercado_config::AppConfig;
use serde_json::{json, Value};
use sqlx::SqlitePool;
use tempfile::TempDir;
use tower::ServiceExt;

struct TestApp {
    router: Router,
    state: AppState,
    pool: SqlitePool,
    _db_dir: TempDir,
}

impl TestApp {
    async fn new() -> Self {
        let db_dir = TempDir::new().expect("create temp dir");
        let db_path = db_dir.path().join("mercado-test.db");

        let mut config = AppConfig::default();
        config.database.url = format!("sqlite://{}", db_path.to_string_lossy());
        config.database.max_connections = 5;
        config.uploads.public_dir = db_dir.path().join("public").to_string_lossy().into_owned();

        let services = BackendServices::initialise(&config)
            .await
            .expect("initialise backend services");

        let state = AppState::new(services.catalog.clone(), services.messages.clone(), &config);
        let router = build_router(state.clone());

        Self {
            router,
            state,
            pool: services.db_pool.clone(),
            _db_dir: db_dir,
        }
    }

    async fn request(&self, method: Method, uri: &str, body: Option<Value>) -> TestResponse {
        let app = self.router.clone();
        let mut builder = Request::builder().method(method).uri(uri);

        let body = if let Some(json_body) = body {
            let bytes = serde_json::to_vec(&json_body).expect("serialize request body");
            builder = builder.header(CONTENT_TYPE, "application/json");
            Body::from(bytes)
        } else {
            Body::empty()
        };

        let response = app
            .oneshot(builder.body(body).expect("build request"))
            .await
            .expect("router response");

        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("read body")
            .to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };

        TestResponse { status, body }
    }
}

struct TestResponse {
    status: StatusCode,
    body: Value,
}

#[tokio::test]
async fn health_check_returns_ok() {
    let app = TestApp::new().await;

    let response = app.request(Method::GET, "/health", None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "ok");
    assert_eq!(response.body["connections"], 0);
    assert!(response.body["timestamp"].is_string());
}

#[tokio::test]
async fn product_lifecycle_is_persisted_and_broadcast() {
    let app = TestApp::new().await;
    let mut subscription = app.state.hub().connect().await;

    let created = app
        .request(
            Method::POST,
            "/api/products",
            Some(json!({"title": "Empanada", "price": 450, "category": "comida"})),
        )
        .await;
    assert_eq!(created.status, StatusCode::OK);
    let id = created.body["id"].as_i64().expect("assigned id");

    let stored: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
        .fetch_one(&app.pool)
        .await
        .expect("count products");
    assert_eq!(stored, 1);

    let event = subscription.events.recv().await.expect("product update");
    match event.as_ref() {
        OutboundEvent::ProductUpdate(product) => {
            assert_eq!(product.id, id);
            assert_eq!(product.field("category"), Some(&json!("comida")));
        }
        other => panic!("unexpected event {other:?}"),
    }

    let removed = app
        .request(Method::POST, &format!("/api/products/delete/{id}"), None)
        .await;
    assert_eq!(removed.status, StatusCode::OK);
    assert_eq!(removed.body["message"], "Producto eliminado correctamente");

    let event = subscription.events.recv().await.expect("product removal");
    assert_eq!(event.as_ref(), &OutboundEvent::ProductRemoval(id));

    let missing = app
        .request(Method::GET, &format!("/api/products/{id}"), None)
        .await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn chat_history_round_trips_through_rest_and_hub() {
    let app = TestApp::new().await;
    let subscription = app.state.hub().connect().await;

    app.state
        .hub()
        .on_chat_message(subscription.id, json!({"user": "ana", "message": "por socket"}))
        .await;

    let created = app
        .request(
            Method::POST,
            "/api/messages",
            Some(json!({"user": "luis", "message": "por REST"})),
        )
        .await;
    assert_eq!(created.status, StatusCode::CREATED);

    let listing = app.request(Method::GET, "/api/messages", None).await;
    assert_eq!(listing.status, StatusCode::OK);

    let messages = listing.body.as_array().expect("message list");
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0]["message"], "por socket");
    assert!(messages[0].get("timestamp").is_none());
    assert_eq!(messages[1]["message"], "por REST");
    assert!(messages[1]["timestamp"].is_i64());
}

#[tokio::test]
async fn unknown_routes_fall_through_to_static_files() {
    let app = TestApp::new().await;

    let response = app.request(Method::GET, "/no-such-page.html", None).await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
}
