
use axum::http::StatusCode;
use test_utils::{create_items, memory_app, send};

#[tokio::test]
async fn restock_below_level_persists_new_quantity() {
    let app = memory_app(false);
    // quantity 20, restock level 100
    let id = create_items(&app.router, 1).await[0];
    let uri = format!("/api/inventory/{id}/restock");

    let resp = send(&app.router, "PUT", &uri, None).await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body["quantity"], 180);
    assert_eq!(resp.body["restock_level"], 100);

    let fetched = send(&app.router, "GET", &format!("/api/inventory/{id}"), None).await;
    assert_eq!(fetched.body["quantity"], 180);
    assert_eq!(app.state.metrics.restocks.get(), 1);
}

#[tokio::test]
async fn restock_above_level_is_refused() {
    let app = memory_app(false);
    // second factory item: quantity 90, restock level 70
    let id = create_items(&app.router, 2).await[1];

    let resp = send(&app.router, "PUT", &format!("/api/inventory/{id}/restock"), None).await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.error_code(), Some("restock_not_needed"));
    assert_eq!(
        resp.body["message"],
        "No need to restock: quantity [90] greater than restock level [70]"
    );

    let fetched = send(&app.router, "GET", &format!("/api/inventory/{id}"), None).await;
    assert_eq!(fetched.body["quantity"], 90);
    assert_eq!(app.state.metrics.restocks_refused.get(), 1);
}

#[tokio::test]
async fn restock_after_restock_is_refused_once_above_level() {
    let app = memory_app(false);
    let id = create_items(&app.router, 1).await[0];
    let uri = format!("/api/inventory/{id}/restock");
    assert_eq!(send(&app.router, "PUT", &uri, None).await.status, StatusCode::OK);
    let second = send(&app.router, "PUT", &uri, None).await;
    assert_eq!(second.status, StatusCode::BAD_REQUEST);
    assert_eq!(second.error_code(), Some("restock_not_needed"));
}

#[tokio::test]
async fn restock_missing_item_is_404() {
    let app = memory_app(false);
    let resp = send(&app.router, "PUT", "/api/inventory/77/restock", None).await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
    assert_eq!(resp.error_code(), Some("item_not_found"));
}
