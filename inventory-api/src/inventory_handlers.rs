use crate::error::InventoryError;
use crate::extract::{JsonBody, TraceId};
use crate::model::{InventoryItem, ItemPayload};
use crate::query::SearchCriteria;
use crate::{AppState, INVENTORY_PATH, SERVICE_NAME};
use axum::extract::rejection::{PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::{header::LOCATION, StatusCode, Uri};
use axum::response::IntoResponse;
use axum::Json;
use common_http_errors::{ApiError, ApiResult};
use serde_json::{json, Value};
use tracing::{info, warn};

fn item_id(trace: &TraceId, id: Result<Path<i32>, PathRejection>) -> ApiResult<i32> {
    id.map(|Path(id)| id).map_err(|rejection| {
        warn!(trace_id = %trace.0, error = %rejection.body_text(), "Rejected item id");
        ApiError::bad_request("invalid_item_id", rejection.body_text()).with_trace_id(trace.0)
    })
}

async fn load(state: &AppState, trace: &TraceId, id: i32) -> ApiResult<InventoryItem> {
    match state.repo.find(id).await {
        Ok(Some(item)) => Ok(item),
        Ok(None) => Err(trace.reject(InventoryError::NotFound(id))),
        Err(err) => Err(trace.reject(err)),
    }
}

pub async fn get_item(
    State(state): State<AppState>,
    trace: TraceId,
    id: Result<Path<i32>, PathRejection>,
) -> ApiResult<Json<InventoryItem>> {
    let id = item_id(&trace, id)?;
    info!(item_id = id, "Request to retrieve an inventory item");
    let item = load(&state, &trace, id).await?;
    info!(item_id = id, "Returning item: {}", item.name);
    Ok(Json(item))
}

pub async fn list_items(
    State(state): State<AppState>,
    trace: TraceId,
    criteria: Result<Query<SearchCriteria>, QueryRejection>,
) -> ApiResult<Json<Vec<InventoryItem>>> {
    let Query(criteria) = criteria.map_err(|rejection| {
        warn!(trace_id = %trace.0, error = %rejection.body_text(), "Rejected inventory query");
        ApiError::bad_request("invalid_query", rejection.body_text()).with_trace_id(trace.0)
    })?;
    info!(?criteria, "Request for inventory list");
    let items = state.repo.search(&criteria).await.map_err(|err| trace.reject(err))?;
    info!(count = items.len(), "Returning inventory items");
    Ok(Json(items))
}

pub async fn create_item(
    State(state): State<AppState>,
    trace: TraceId,
    JsonBody(body): JsonBody,
) -> ApiResult<impl IntoResponse> {
    info!("Request to create an inventory item");
    let payload = ItemPayload::from_json(&body).map_err(|err| trace.reject(err))?;
    let created = state
        .repo
        .create(&InventoryItem::new(payload))
        .await
        .map_err(|err| trace.reject(err))?;
    state.metrics.items_created.inc();
    let id = created.id.unwrap_or_default();
    info!(item_id = id, "Inventory item created");
    let location = format!("{INVENTORY_PATH}/{id}");
    Ok((StatusCode::CREATED, [(LOCATION, location)], Json(created)))
}

pub async fn update_item(
    State(state): State<AppState>,
    trace: TraceId,
    id: Result<Path<i32>, PathRejection>,
    JsonBody(body): JsonBody,
) -> ApiResult<Json<InventoryItem>> {
    let id = item_id(&trace, id)?;
    info!(item_id = id, "Request to update an inventory item");
    let mut item = load(&state, &trace, id).await?;
    let payload = ItemPayload::from_json(&body).map_err(|err| trace.reject(err))?;
    item.apply(payload);
    let saved = state.repo.update(&item).await.map_err(|err| trace.reject(err))?;
    state.metrics.items_updated.inc();
    info!(item_id = id, "Inventory item updated");
    Ok(Json(saved))
}

/// Idempotent: deleting an absent id is still a 204.
pub async fn delete_item(
    State(state): State<AppState>,
    trace: TraceId,
    id: Result<Path<i32>, PathRejection>,
) -> ApiResult<StatusCode> {
    let id = item_id(&trace, id)?;
    info!(item_id = id, "Request to delete an inventory item");
    let removed = state.repo.delete(id).await.map_err(|err| trace.reject(err))?;
    if removed {
        state.metrics.items_deleted.inc();
    }
    info!(item_id = id, removed, "Inventory item delete complete");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn restock_item(
    State(state): State<AppState>,
    trace: TraceId,
    id: Result<Path<i32>, PathRejection>,
) -> ApiResult<Json<InventoryItem>> {
    let id = item_id(&trace, id)?;
    info!(item_id = id, "Request to restock an inventory item");
    let mut item = load(&state, &trace, id).await?;
    if let Err(err) = item.restock() {
        if matches!(err, InventoryError::RestockNotNeeded { .. }) {
            state.metrics.restocks_refused.inc();
        }
        return Err(trace.reject(err));
    }
    let saved = state.repo.update(&item).await.map_err(|err| trace.reject(err))?;
    state.metrics.restocks.inc();
    state.metrics.items_updated.inc();
    info!(item_id = id, quantity = saved.quantity, "Inventory item restocked");
    Ok(Json(saved))
}

/// Purges the table only when test mode is enabled; otherwise a logged no-op.
pub async fn delete_all_items(State(state): State<AppState>, trace: TraceId) -> ApiResult<StatusCode> {
    if !state.test_mode {
        state.metrics.bulk_delete_blocked.inc();
        warn!(trace_id = %trace.0, "Request to clear inventory ignored outside test mode");
        return Ok(StatusCode::NO_CONTENT);
    }
    info!("Request to clear inventory");
    let removed = state.repo.remove_all().await.map_err(|err| trace.reject(err))?;
    info!(removed, "Inventory cleared");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn route_not_found(trace: TraceId, uri: Uri) -> ApiError {
    warn!(trace_id = %trace.0, path = %uri.path(), "No route");
    ApiError::not_found("route_not_found", format!("No resource at {}", uri.path())).with_trace_id(trace.0)
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": 200, "message": "Healthy" }))
}

pub async fn index() -> Json<Value> {
    Json(json!({
        "name": "Inventory REST API Service",
        "service": SERVICE_NAME,
        "version": env!("CARGO_PKG_VERSION"),
        "paths": {
            "inventory": INVENTORY_PATH,
            "health": "/health",
            "metrics": "/metrics",
        },
    }))
}

pub async fn metrics_endpoint(State(state): State<AppState>) -> (StatusCode, String) {
    match state.metrics.render() {
        Ok(body) => (StatusCode::OK, body),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("metrics encode error: {e}"),
        ),
    }
}
