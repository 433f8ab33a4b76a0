use crate::error::InventoryError;
use axum::async_trait;
use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, FromRequestParts, Request};
use axum::http::{request::Parts, HeaderMap};
use axum::Json;
use common_http_errors::ApiError;
use serde_json::Value;
use std::convert::Infallible;
use tracing::{warn, Span};
use uuid::Uuid;

pub const TRACE_ID_HEADER: &str = "X-Trace-ID";

pub(crate) fn trace_id_from_headers(headers: &HeaderMap) -> Option<Uuid> {
    headers
        .get(TRACE_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| Uuid::parse_str(s).ok())
}

/// Per-request correlation id: the caller's `X-Trace-ID`, or a fresh one.
#[derive(Debug, Clone, Copy)]
pub struct TraceId(pub Uuid);

impl TraceId {
    /// Log a domain fault and convert it into its response, tagged with this trace id.
    pub fn reject(&self, err: InventoryError) -> ApiError {
        match &err {
            InventoryError::Persistence(cause) | InventoryError::Query(cause) => {
                warn!(trace_id = %self.0, code = err.code(), error = %cause, "Inventory request failed");
            }
            _ => warn!(trace_id = %self.0, code = err.code(), "{err}"),
        }
        ApiError::from(err).with_trace_id(self.0)
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for TraceId
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let trace_id = trace_id_from_headers(&parts.headers).unwrap_or_else(Uuid::new_v4);
        Span::current().record("trace_id", tracing::field::display(trace_id));
        Ok(TraceId(trace_id))
    }
}

/// Untyped JSON request body.
///
/// Content-Type is checked before the body is parsed: a missing or non-JSON
/// media type is a 415, unparseable JSON is a 400. Field validation is left
/// to [`crate::model::ItemPayload::from_json`].
#[derive(Debug, Clone)]
pub struct JsonBody(pub Value);

#[async_trait]
impl<S> FromRequest<S> for JsonBody
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let trace_id = trace_id_from_headers(req.headers());
        match Json::<Value>::from_request(req, state).await {
            Ok(Json(value)) => Ok(JsonBody(value)),
            Err(rejection) => {
                let err = match rejection {
                    JsonRejection::MissingJsonContentType(_) => {
                        warn!(
                            trace_id = trace_id.map(tracing::field::display),
                            "Request rejected: Content-Type must be application/json"
                        );
                        ApiError::UnsupportedMediaType {
                            trace_id: None,
                            message: Some("Content-Type must be application/json".into()),
                        }
                    }
                    other => {
                        warn!(
                            trace_id = trace_id.map(tracing::field::display),
                            error = %other.body_text(),
                            "Request rejected: malformed JSON body"
                        );
                        ApiError::bad_request("malformed_json", other.body_text())
                    }
                };
                Err(match trace_id {
                    Some(id) => err.with_trace_id(id),
                    None => err,
                })
            }
        }
    }
}
