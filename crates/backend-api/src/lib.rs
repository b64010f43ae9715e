//! HTTP and realtime surface of the Mercado backend.
//!
//! Product mutations and socket chat messages flow through the
//! [`BroadcastHub`], which fans events out to every connected WebSocket client.

mod error;
mod state;

pub mod docs;
pub mod hub;
pub mod routes;

pub use error::{ApiError, ErrorResponse};
pub use hub::{BroadcastHub, ConnectionId, InboundEvent, OutboundEvent, Subscription};
pub use state::AppState;

use std::any::Any;

use axum::{
    http::{header::CONTENT_TYPE, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{Any as AnyOrigin, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing::error;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub fn build_router(state: AppState) -> Router {
    let public = ServeDir::new(state.public_dir());
    let uploads = ServeDir::new(state.uploads_dir());

    Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/loggertest", get(routes::diagnostics::logger_test))
        .route(
            "/api/products",
            get(routes::products::list_products).post(routes::products::create_product),
        )
        .route("/api/products/:pid", get(routes::products::get_product))
        .route(
            "/api/products/delete/:pid",
            post(routes::products::delete_product),
        )
        .route(
            "/api/messages",
            get(routes::messages::list_messages).post(routes::messages::create_message),
        )
        .route("/api/upload", post(routes::uploads::upload_files))
        .route("/ws", get(routes::websocket::websocket_handler))
        .merge(SwaggerUi::new("/apidocs").url("/api-docs/openapi.json", docs::ApiDoc::openapi()))
        .nest_service("/uploads", uploads)
        .fallback_service(public)
        .with_state(state)
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer())
}

fn handle_panic(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    error!(panic = detail, "request handler panicked");

    internal_failure()
}

/// Catch-all 500 for failures with no route-specific body.
pub(crate) fn internal_failure() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, "¡Algo salió mal!").into_response()
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AnyOrigin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
}
