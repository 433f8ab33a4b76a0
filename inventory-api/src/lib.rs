pub mod config;
pub mod error;
pub mod extract;
pub mod inventory_handlers;
pub mod model;
pub mod query;
pub mod repository;
pub mod restock;

pub use crate::error::{InventoryError, InventoryResult};
pub use crate::model::{Condition, InventoryItem, ItemPayload};
pub use crate::repository::{InventoryRepository, MemoryInventoryRepository, PgInventoryRepository};

use axum::{
    extract::Request,
    http::{header::ALLOW, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, put},
    Router,
};
use common_http_errors::{http_error_metrics_layer, ApiError, ERROR_CODE_HEADER};
use common_observability::InventoryMetrics;
use inventory_handlers::{
    create_item, delete_all_items, delete_item, get_item, health, index, list_items,
    metrics_endpoint, restock_item, route_not_found, update_item,
};
use std::sync::Arc;
use tracing::{info_span, warn, Instrument};

pub const SERVICE_NAME: &str = "inventory-api";
pub const INVENTORY_PATH: &str = "/api/inventory";

#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<dyn InventoryRepository>,
    /// Gates `DELETE /api/inventory`.
    pub test_mode: bool,
    pub metrics: Arc<InventoryMetrics>,
}

impl AppState {
    pub fn new(repo: Arc<dyn InventoryRepository>, test_mode: bool) -> Self {
        Self { repo, test_mode, metrics: Arc::new(InventoryMetrics::new()) }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/metrics", get(metrics_endpoint))
        .route(
            INVENTORY_PATH,
            get(list_items).post(create_item).delete(delete_all_items),
        )
        .route(
            "/api/inventory/:id",
            get(get_item).put(update_item).delete(delete_item),
        )
        .route("/api/inventory/:id/restock", put(restock_item))
        .fallback(route_not_found)
        .with_state(state)
        .layer(middleware::from_fn(structured_method_not_allowed))
        .layer(middleware::from_fn(http_error_metrics_layer(SERVICE_NAME)))
        .layer(middleware::from_fn(request_span))
}

/// One span per request; `trace_id` is filled in by the [`extract::TraceId`] extractor.
async fn request_span(req: Request, next: Next) -> Response {
    let span = info_span!(
        "request",
        method = %req.method(),
        path = %req.uri().path(),
        trace_id = tracing::field::Empty,
    );
    next.run(req).instrument(span).await
}

/// Replaces the router's empty 405 with the structured error body. `Allow` is kept.
async fn structured_method_not_allowed(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let trace_id = extract::trace_id_from_headers(req.headers());
    let resp = next.run(req).await;
    if resp.status() != StatusCode::METHOD_NOT_ALLOWED || resp.headers().contains_key(ERROR_CODE_HEADER) {
        return resp;
    }
    warn!(trace_id = trace_id.map(tracing::field::display), %method, path = %path, "Method not allowed");
    let allow = resp.headers().get(ALLOW).cloned();
    let err = ApiError::MethodNotAllowed {
        trace_id,
        message: Some(format!("Method {method} is not allowed on {path}")),
    };
    let mut structured = err.into_response();
    if let Some(allow) = allow {
        structured.headers_mut().insert(ALLOW, allow);
    }
    structured
}
