use common_http_errors::ApiError;
use axum::response::IntoResponse;
use axum::http::StatusCode;
use http_body_util::BodyExt;
use uuid::Uuid;

async fn body_json(resp: axum::response::Response) -> serde_json::Value {
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn bad_request_variant() {
    let err = ApiError::BadRequest { code: "data_validation_error", trace_id: None, message: Some("Invalid Inventory: missing name".into()) };
    let resp = err.into_response();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(resp.headers().get("X-Error-Code").unwrap(), "data_validation_error");
    let body = body_json(resp).await;
    assert_eq!(body["code"], "data_validation_error");
    assert_eq!(body["message"], "Invalid Inventory: missing name");
    assert!(body.get("trace_id").is_none());
}

#[tokio::test]
async fn not_found_variant() {
    let err = ApiError::not_found("item_not_found", "Item with id '7' was not found.");
    let resp = err.into_response();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(resp.headers().get("X-Error-Code").unwrap(), "item_not_found");
    let body = body_json(resp).await;
    assert_eq!(body["message"], "Item with id '7' was not found.");
}

#[tokio::test]
async fn unsupported_media_type_variant_has_default_message() {
    let err = ApiError::UnsupportedMediaType { trace_id: None, message: None };
    let resp = err.into_response();
    assert_eq!(resp.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert_eq!(resp.headers().get("X-Error-Code").unwrap(), "unsupported_media_type");
    let body = body_json(resp).await;
    assert_eq!(body["message"], "Content-Type must be application/json");
}

#[tokio::test]
async fn method_not_allowed_variant() {
    let err = ApiError::MethodNotAllowed { trace_id: None, message: Some("Method PATCH is not allowed".into()) };
    let resp = err.into_response();
    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(resp.headers().get("X-Error-Code").unwrap(), "method_not_allowed");
    let body = body_json(resp).await;
    assert_eq!(body["code"], "method_not_allowed");
    assert_eq!(body["message"], "Method PATCH is not allowed");
}

#[tokio::test]
async fn internal_variant() {
    let trace = Uuid::new_v4();
    let err = ApiError::Internal { trace_id: Some(trace), message: Some("boom".into()) };
    let resp = err.into_response();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(resp.headers().get("X-Error-Code").unwrap(), "internal_error");
    let body = body_json(resp).await;
    assert_eq!(body["trace_id"], trace.to_string());
}

#[test]
fn with_trace_id_keeps_existing_id() {
    let first = Uuid::new_v4();
    let second = Uuid::new_v4();
    let err = ApiError::Internal { trace_id: Some(first), message: None }.with_trace_id(second);
    match err {
        ApiError::Internal { trace_id, .. } => assert_eq!(trace_id, Some(first)),
        other => panic!("unexpected variant {other:?}"),
    }
    let err = ApiError::bad_request("invalid_query", "bad").with_trace_id(second);
    match err {
        ApiError::BadRequest { trace_id, .. } => assert_eq!(trace_id, Some(second)),
        other => panic!("unexpected variant {other:?}"),
    }
}
