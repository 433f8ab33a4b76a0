
use axum::body::Body;
use axum::http::{header::CONTENT_TYPE, Request, StatusCode};
use serde_json::json;
use test_utils::{create_items, item_json, memory_app, send, send_request};
use uuid::Uuid;

#[tokio::test]
async fn create_without_json_content_type_is_415() {
    let app = memory_app(false);
    for content_type in [None, Some("text/plain")] {
        let mut builder = Request::builder().method("POST").uri("/api/inventory");
        if let Some(ct) = content_type {
            builder = builder.header(CONTENT_TYPE, ct);
        }
        let req = builder.body(Body::from(item_json(0).to_string())).unwrap();
        let resp = send_request(&app.router, req).await;
        assert_eq!(resp.status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert_eq!(resp.error_code(), Some("unsupported_media_type"));
        assert_eq!(resp.body["code"], "unsupported_media_type");
        assert_eq!(resp.body["message"], "Content-Type must be application/json");
    }
    assert!(app.repo.is_empty());
}

#[tokio::test]
async fn update_without_json_content_type_is_415() {
    let app = memory_app(false);
    let id = create_items(&app.router, 1).await[0];
    let req = Request::builder()
        .method("PUT")
        .uri(format!("/api/inventory/{id}"))
        .header(CONTENT_TYPE, "application/xml")
        .body(Body::from("<item/>"))
        .unwrap();
    let resp = send_request(&app.router, req).await;
    assert_eq!(resp.status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
}

#[tokio::test]
async fn malformed_json_is_400() {
    let app = memory_app(false);
    let req = Request::builder()
        .method("POST")
        .uri("/api/inventory")
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from("{\"name\": \"Apple\""))
        .unwrap();
    let resp = send_request(&app.router, req).await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.error_code(), Some("malformed_json"));
}

#[tokio::test]
async fn trace_id_header_is_echoed_in_error_body() {
    let app = memory_app(false);
    let trace_id = Uuid::new_v4();
    let req = Request::builder()
        .method("GET")
        .uri("/api/inventory/5")
        .header("X-Trace-ID", trace_id.to_string())
        .body(Body::empty())
        .unwrap();
    let resp = send_request(&app.router, req).await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
    assert_eq!(resp.body["trace_id"], json!(trace_id.to_string()));
}

#[tokio::test]
async fn persistence_failure_is_generic_400_and_leaves_store_unchanged() {
    let app = memory_app(false);
    let id = create_items(&app.router, 1).await[0];
    app.repo.fail_writes(true);

    let resp = send(&app.router, "POST", "/api/inventory", Some(&item_json(1))).await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.error_code(), Some("persistence_error"));
    let message = resp.body["message"].as_str().unwrap();
    assert!(!message.contains("simulated"), "cause leaked: {message}");

    let mut payload = item_json(0);
    payload["quantity"] = json!(1);
    let resp = send(&app.router, "PUT", &format!("/api/inventory/{id}"), Some(&payload)).await;
    assert_eq!(resp.error_code(), Some("persistence_error"));

    let resp = send(&app.router, "PUT", &format!("/api/inventory/{id}/restock"), None).await;
    assert_eq!(resp.error_code(), Some("persistence_error"));

    app.repo.fail_writes(false);
    assert_eq!(app.repo.len(), 1);
    let fetched = send(&app.router, "GET", &format!("/api/inventory/{id}"), None).await;
    assert_eq!(fetched.body["quantity"], 20);
}

#[tokio::test]
async fn every_error_response_carries_code_header_and_body() {
    let app = memory_app(false);
    let mut missing = item_json(0);
    missing.as_object_mut().unwrap().remove("name");
    let responses = [
        send(&app.router, "GET", "/api/inventory/1", None).await,
        send(&app.router, "GET", "/api/inventory/x", None).await,
        send(&app.router, "GET", "/api/inventory?quantity=x", None).await,
        send(&app.router, "POST", "/api/inventory", Some(&missing)).await,
    ];
    for resp in responses {
        assert!(resp.status.is_client_error());
        let header = resp.error_code().expect("X-Error-Code header");
        assert_eq!(resp.body["code"], header);
    }
}

#[tokio::test]
async fn unknown_route_is_structured_404() {
    let app = memory_app(false);
    let resp = send(&app.router, "GET", "/api/nope", None).await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
    assert_eq!(resp.error_code(), Some("route_not_found"));
    assert_eq!(resp.body["code"], "route_not_found");
    assert!(resp.body["message"].as_str().unwrap().contains("/api/nope"));
}

#[tokio::test]
async fn wrong_method_is_structured_405_with_allow_header() {
    let app = memory_app(false);
    let trace_id = Uuid::new_v4();
    for method in ["PATCH", "POST"] {
        let req = Request::builder()
            .method(method)
            .uri("/api/inventory/1")
            .header("X-Trace-ID", trace_id.to_string())
            .body(Body::empty())
            .unwrap();
        let resp = send_request(&app.router, req).await;
        assert_eq!(resp.status, StatusCode::METHOD_NOT_ALLOWED, "{method}");
        assert_eq!(resp.error_code(), Some("method_not_allowed"));
        assert_eq!(resp.body["code"], "method_not_allowed");
        assert_eq!(resp.body["trace_id"], json!(trace_id.to_string()));
        let allow = resp.headers.get("allow").unwrap().to_str().unwrap();
        assert!(allow.contains("GET"), "allow: {allow}");
    }
}
