use common_http_errors::ApiError;
use thiserror::Error;

pub type InventoryResult<T> = Result<T, InventoryError>;

#[derive(Debug, Error)]
pub enum InventoryError {
    /// Payload or entity state rejected before any write.
    #[error("{0}")]
    Validation(String),
    #[error("Item with id '{0}' was not found.")]
    NotFound(i32),
    /// A write failed; the transaction has already been rolled back.
    #[error("persistence failure: {0}")]
    Persistence(#[source] sqlx::Error),
    /// A read failed.
    #[error("query failure: {0}")]
    Query(#[source] sqlx::Error),
    #[error("No need to restock: quantity [{quantity}] greater than restock level [{restock_level}]")]
    RestockNotNeeded { quantity: i32, restock_level: i32 },
}

impl InventoryError {
    pub fn validation(message: impl Into<String>) -> Self {
        InventoryError::Validation(message.into())
    }

    /// Stable code carried in the `X-Error-Code` header and the error body.
    pub fn code(&self) -> &'static str {
        match self {
            InventoryError::Validation(_) => "data_validation_error",
            InventoryError::NotFound(_) => "item_not_found",
            InventoryError::Persistence(_) => "persistence_error",
            InventoryError::Query(_) => "internal_error",
            InventoryError::RestockNotNeeded { .. } => "restock_not_needed",
        }
    }
}

impl From<InventoryError> for ApiError {
    fn from(err: InventoryError) -> Self {
        let code = err.code();
        let text = err.to_string();
        match err {
            InventoryError::Validation(message) => ApiError::BadRequest { code, trace_id: None, message: Some(message) },
            InventoryError::NotFound(_) => ApiError::NotFound { code, trace_id: None, message: Some(text) },
            InventoryError::RestockNotNeeded { .. } => ApiError::BadRequest { code, trace_id: None, message: Some(text) },
            // Database detail stays in the logs.
            InventoryError::Persistence(_) => ApiError::BadRequest {
                code,
                trace_id: None,
                message: Some("The inventory change could not be saved".into()),
            },
            InventoryError::Query(_) => ApiError::Internal { trace_id: None, message: None },
        }
    }
}
