use axum::{
    extract::Request,
    http::{HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use once_cell::sync::Lazy;
use prometheus::{IntCounter, IntCounterVec, IntGauge, Opts};
use serde::Serialize;
use std::collections::HashSet;
use std::future::Future;
use std::pin::Pin;
use std::sync::Mutex;
use uuid::Uuid;

pub const ERROR_CODE_HEADER: &str = "X-Error-Code";

/// Distinct `code` label values tracked before folding into [`OVERFLOW_CODE`].
pub const MAX_ERROR_CODES: usize = 40;
pub const OVERFLOW_CODE: &str = "other";

#[derive(Serialize, Debug)]
pub struct ErrorBody {
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")] pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")] pub trace_id: Option<Uuid>,
}

#[derive(Debug)]
pub enum ApiError {
    BadRequest { code: &'static str, trace_id: Option<Uuid>, message: Option<String> },
    NotFound { code: &'static str, trace_id: Option<Uuid>, message: Option<String> },
    MethodNotAllowed { trace_id: Option<Uuid>, message: Option<String> },
    UnsupportedMediaType { trace_id: Option<Uuid>, message: Option<String> },
    Internal { trace_id: Option<Uuid>, message: Option<String> },
}

impl ApiError {
    pub fn bad_request(code: &'static str, message: impl Into<String>) -> Self { Self::BadRequest { code, trace_id: None, message: Some(message.into()) } }
    pub fn not_found(code: &'static str, message: impl Into<String>) -> Self { Self::NotFound { code, trace_id: None, message: Some(message.into()) } }

    /// Attach a trace id unless one is already set.
    pub fn with_trace_id(mut self, id: Uuid) -> Self {
        match &mut self {
            ApiError::BadRequest { trace_id, .. }
            | ApiError::NotFound { trace_id, .. }
            | ApiError::MethodNotAllowed { trace_id, .. }
            | ApiError::UnsupportedMediaType { trace_id, .. }
            | ApiError::Internal { trace_id, .. } => {
                trace_id.get_or_insert(id);
            }
        }
        self
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::UnsupportedMediaType { .. } => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::BadRequest { code, .. } | ApiError::NotFound { code, .. } => code,
            ApiError::MethodNotAllowed { .. } => "method_not_allowed",
            ApiError::UnsupportedMediaType { .. } => "unsupported_media_type",
            ApiError::Internal { .. } => "internal_error",
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.code(), self.status())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error_code = self.code();
        let body = match self {
            ApiError::BadRequest { code, trace_id, message } | ApiError::NotFound { code, trace_id, message } => {
                ErrorBody { code: code.into(), message, trace_id }
            }
            ApiError::MethodNotAllowed { trace_id, message } => ErrorBody { code: error_code.into(), message, trace_id },
            ApiError::UnsupportedMediaType { trace_id, message } => ErrorBody {
                code: error_code.into(),
                message: message.or_else(|| Some("Content-Type must be application/json".into())),
                trace_id,
            },
            ApiError::Internal { trace_id, message } => ErrorBody { code: error_code.into(), message, trace_id },
        };
        let mut resp = (status, Json(body)).into_response();
        if let Ok(val) = HeaderValue::from_str(error_code) {
            resp.headers_mut().insert(ERROR_CODE_HEADER, val);
        }
        resp
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

static HTTP_ERRORS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    let counter = IntCounterVec::new(
        Opts::new("http_errors_total", "Count of HTTP error responses emitted (status >= 400)"),
        &["service", "code", "status"],
    )
    .expect("valid http_errors_total metric definition");
    let _ = prometheus::register(Box::new(counter.clone()));
    counter
});

static HTTP_ERROR_CODES_DISTINCT: Lazy<IntGauge> = Lazy::new(|| {
    let gauge = IntGauge::new("http_error_codes_distinct", "Distinct error codes seen as metric labels")
        .expect("valid http_error_codes_distinct metric definition");
    let _ = prometheus::register(Box::new(gauge.clone()));
    gauge
});

static HTTP_ERROR_CODE_OVERFLOW_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    let counter = IntCounter::new(
        "http_error_code_overflow_total",
        "Error responses whose code was folded into the overflow label",
    )
    .expect("valid http_error_code_overflow_total metric definition");
    let _ = prometheus::register(Box::new(counter.clone()));
    counter
});

static SEEN_CODES: Lazy<Mutex<HashSet<String>>> = Lazy::new(|| Mutex::new(HashSet::new()));

/// Maps an error code to its metric label, capping the label set at [`MAX_ERROR_CODES`].
pub fn error_code_label(code: &str) -> String {
    let mut seen = match SEEN_CODES.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };
    if seen.contains(code) {
        return code.to_string();
    }
    if seen.len() >= MAX_ERROR_CODES {
        HTTP_ERROR_CODE_OVERFLOW_TOTAL.inc();
        return OVERFLOW_CODE.to_string();
    }
    seen.insert(code.to_string());
    HTTP_ERROR_CODES_DISTINCT.set(seen.len() as i64);
    code.to_string()
}

pub fn record_http_error(service: &str, code: &str, status: StatusCode) {
    let label = error_code_label(code);
    HTTP_ERRORS_TOTAL
        .with_label_values(&[service, label.as_str(), status.as_str()])
        .inc();
}

type MiddlewareFuture = Pin<Box<dyn Future<Output = Response> + Send>>;

/// Middleware for `axum::middleware::from_fn` counting every response with status >= 400.
pub fn http_error_metrics_layer(
    service: &'static str,
) -> impl Fn(Request, Next) -> MiddlewareFuture + Clone + Send + Sync + 'static {
    move |req: Request, next: Next| {
        Box::pin(async move {
            let resp = next.run(req).await;
            let status = resp.status();
            if status.as_u16() >= 400 {
                let code = resp
                    .headers()
                    .get(ERROR_CODE_HEADER)
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("unknown")
                    .to_string();
                record_http_error(service, &code, status);
            }
            resp
        }) as MiddlewareFuture
    }
}

#[doc(hidden)]
pub mod test_helpers {
    use super::*;

    pub fn simulate_error_code(code: &str) {
        record_http_error("test", code, StatusCode::BAD_REQUEST);
    }

    pub fn distinct_gauge() -> i64 { HTTP_ERROR_CODES_DISTINCT.get() }

    pub fn overflow_count() -> u64 { HTTP_ERROR_CODE_OVERFLOW_TOTAL.get() }
}
