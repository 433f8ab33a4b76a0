use common_http_errors::{ApiError, http_error_metrics_layer};
use axum::{Router, routing::get, http::StatusCode};
use axum::middleware;
use std::sync::atomic::{AtomicUsize, Ordering};
use once_cell::sync::Lazy;
use tower::ServiceExt; // for oneshot

static DYNAMIC_COUNTER: Lazy<AtomicUsize> = Lazy::new(|| AtomicUsize::new(0));

// Emits a different error code on every call.
async fn dyn_error() -> Result<&'static str, ApiError> {
    let n = DYNAMIC_COUNTER.fetch_add(1, Ordering::Relaxed);
    let code = format!("dyn_code_{}", n);
    Err(ApiError::BadRequest { code: Box::leak(code.into_boxed_str()), trace_id: None, message: None })
}

#[tokio::test]
async fn error_code_cardinality_guard_caps_labels() {
    let app = Router::new()
        .route("/err", get(dyn_error))
        .layer(middleware::from_fn(http_error_metrics_layer("test-svc")));

    // More requests than MAX_ERROR_CODES (40) so the overflow label is used.
    for _ in 0..50 {
        let resp = app.clone().oneshot(axum::http::Request::builder().uri("/err").body(axum::body::Body::empty()).unwrap()).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    let families = prometheus::gather();
    let errors = families
        .iter()
        .find(|f| f.get_name() == "http_errors_total")
        .expect("http_errors_total registered");
    let labels: Vec<String> = errors
        .get_metric()
        .iter()
        .filter_map(|m| m.get_label().iter().find(|l| l.get_name() == "code").map(|l| l.get_value().to_string()))
        .collect();
    assert!(labels.len() <= common_http_errors::MAX_ERROR_CODES + 1);
    assert!(labels.iter().any(|l| l == common_http_errors::OVERFLOW_CODE));
}

#[tokio::test]
async fn successful_responses_are_not_counted() {
    let app = Router::new()
        .route("/ok", get(|| async { "ok" }))
        .layer(middleware::from_fn(http_error_metrics_layer("ok-svc")));
    let resp = app.oneshot(axum::http::Request::builder().uri("/ok").body(axum::body::Body::empty()).unwrap()).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let counted = prometheus::gather()
        .iter()
        .filter(|f| f.get_name() == "http_errors_total")
        .flat_map(|f| f.get_metric().iter())
        .any(|m| m.get_label().iter().any(|l| l.get_name() == "service" && l.get_value() == "ok-svc"));
    assert!(!counted);
}
