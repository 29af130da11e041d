use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

use crate::services::storage::StoreError;

/// Error taxonomy for the form lifecycle engine.
///
/// `Validation` and `NotFound` are expected operator-facing outcomes.
/// `StorageExhausted` means a write failed even after eviction and must be
/// surfaced as a blocking error, distinct from transient faults.
/// `IndexOutOfRange` is a contract violation in reorder operations and is
/// logged as a defect rather than swallowed.
#[derive(Debug, Error)]
pub enum FormError {
    #[error("validation failed: {message}")]
    Validation { message: String, fields: Vec<String> },

    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: String },

    #[error("storage capacity exhausted and no definitions left to evict")]
    StorageExhausted,

    #[error("index {index} out of range for sequence of length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("storage backend error: {0}")]
    Storage(String),

    #[error("document export failed: {0}")]
    Export(String),
}

impl FormError {
    pub fn validation_fields(message: impl Into<String>, fields: Vec<String>) -> Self {
        FormError::Validation {
            message: message.into(),
            fields,
        }
    }

    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        FormError::NotFound {
            kind,
            id: id.into(),
        }
    }
}

impl From<StoreError> for FormError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::CapacityExceeded => FormError::StorageExhausted,
            StoreError::Backend(msg) => FormError::Storage(msg),
        }
    }
}

impl IntoResponse for FormError {
    fn into_response(self) -> Response {
        let status = match &self {
            FormError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            FormError::NotFound { .. } => StatusCode::NOT_FOUND,
            FormError::StorageExhausted => StatusCode::INSUFFICIENT_STORAGE,
            FormError::IndexOutOfRange { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            FormError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            FormError::Export(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        match &self {
            FormError::Validation { .. } | FormError::NotFound { .. } => {
                warn!("request rejected: {}", self)
            }
            _ => error!("request failed: {}", self),
        }

        let fields = match &self {
            FormError::Validation { fields, .. } => fields.clone(),
            _ => Vec::new(),
        };

        let body = Json(json!({
            "error": error_tag(&self),
            "message": self.to_string(),
            "fields": fields,
        }));

        (status, body).into_response()
    }
}

fn error_tag(err: &FormError) -> &'static str {
    match err {
        FormError::Validation { .. } => "validation_error",
        FormError::NotFound { .. } => "not_found",
        FormError::StorageExhausted => "storage_exhausted",
        FormError::IndexOutOfRange { .. } => "index_out_of_range",
        FormError::Storage(_) => "storage_error",
        FormError::Export(_) => "export_error",
    }
}
