use axum::{
    extract::{rejection::JsonRejection, Path, State},
    response::{IntoResponse, Response},
    Json,
};
use mercado_database::Product;
use serde::Serialize;
use serde_json::Value;
use tracing::{error, info};
use utoipa::ToSchema;

use crate::{internal_failure, ApiError, AppState};

pub const SERVER_ERROR: &str = "Error interno del servidor";
pub const PRODUCT_REMOVED: &str = "Producto eliminado correctamente";
pub const PRODUCT_NOT_FOUND: &str = "Producto no encontrado";

#[derive(Debug, Serialize, ToSchema)]
pub struct ConfirmationResponse {
    pub message: String,
}

/// Integer-prefix parse of a path identifier: leading whitespace, an optional
/// sign, then the leading run of digits. `"12abc"` is 12; no digits is `None`.
pub fn parse_product_id(raw: &str) -> Option<i64> {
    let trimmed = raw.trim_start();
    let (sign, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => ("-", &trimmed[1..]),
        Some(b'+') => ("", &trimmed[1..]),
        _ => ("", trimmed),
    };

    let digits_len = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits_len == 0 {
        return None;
    }

    format!("{sign}{}", &rest[..digits_len]).parse().ok()
}

#[utoipa::path(
    post,
    path = "/api/products",
    tag = "Products",
    request_body = serde_json::Value,
    responses(
        (status = 200, description = "Created product with its assigned id", body = serde_json::Value),
        (status = 500, description = "Catalog store failure, or a body that is not JSON", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_product(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Product>, Response> {
    let Json(payload) = payload.map_err(|rejection| {
        error!(error = %rejection, "unreadable product body");
        internal_failure()
    })?;

    let product = state.catalog().create(payload).await.map_err(|error| {
        error!(error = ?error, "failed to add product");
        ApiError::internal_server_error(SERVER_ERROR).into_response()
    })?;

    let delivered = state.hub().broadcast_product_added(&product).await;
    info!(product_id = product.id, delivered, "product added");

    Ok(Json(product))
}

#[utoipa::path(
    post,
    path = "/api/products/delete/{pid}",
    tag = "Products",
    params(("pid" = String, Path, description = "Numeric product id")),
    responses(
        (status = 200, description = "Product removed, or nothing matched", body = ConfirmationResponse),
        (status = 500, description = "Catalog store failure", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_product(
    State(state): State<AppState>,
    Path(pid): Path<String>,
) -> Result<Json<ConfirmationResponse>, ApiError> {
    let removed = match parse_product_id(&pid) {
        Some(product_id) => {
            let removed = state.catalog().delete(product_id).await.map_err(|error| {
                error!(product_id, error = ?error, "failed to delete product");
                ApiError::internal_server_error(SERVER_ERROR)
            })?;
            removed.then_some(product_id)
        }
        None => None,
    };

    match removed {
        Some(product_id) => {
            let delivered = state.hub().broadcast_product_removed(product_id).await;
            info!(product_id, delivered, "product removed");
        }
        None => info!(pid = %pid, "delete matched no product"),
    }

    Ok(Json(ConfirmationResponse {
        message: PRODUCT_REMOVED.to_string(),
    }))
}

#[utoipa::path(
    get,
    path = "/api/products",
    tag = "Products",
    responses(
        (status = 200, description = "Every product ordered by id", body = [serde_json::Value]),
        (status = 500, description = "Catalog store failure", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_products(State(state): State<AppState>) -> Result<Json<Vec<Product>>, ApiError> {
    let products = state.catalog().list().await.map_err(|error| {
        error!(error = ?error, "failed to list products");
        ApiError::internal_server_error(SERVER_ERROR)
    })?;
    Ok(Json(products))
}

#[utoipa::path(
    get,
    path = "/api/products/{pid}",
    tag = "Products",
    params(("pid" = String, Path, description = "Numeric product id")),
    responses(
        (status = 200, description = "The product", body = serde_json::Value),
        (status = 404, description = "No product with that id", body = crate::error::ErrorResponse),
        (status = 500, description = "Catalog store failure", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_product(
    State(state): State<AppState>,
    Path(pid): Path<String>,
) -> Result<Json<Product>, ApiError> {
    let product_id = parse_product_id(&pid).ok_or_else(|| ApiError::not_found(PRODUCT_NOT_FOUND))?;

    state
        .catalog()
        .find(product_id)
        .await
        .map_err(|error| {
            error!(product_id, error = ?error, "failed to load product");
            ApiError::internal_server_error(SERVER_ERROR)
        })?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(PRODUCT_NOT_FOUND))
}
