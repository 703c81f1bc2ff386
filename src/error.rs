//! Error Taxonomy
//!
//! One error type is shared by the splitter, the status store and the HTTP layer.
//! Each variant maps to a single HTTP status code when it crosses the API boundary.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    /// Rejected before any state is mutated (empty ids, bad batch size, unknown priority).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// An ingestion id was registered twice. Only reachable through an id generator bug.
    #[error("ingestion {0} already exists")]
    DuplicateId(String),

    #[error("ingestion {0} not found")]
    NotFound(String),

    /// A queued task points at a batch the status store does not know about.
    #[error("batch {batch_id} of ingestion {ingestion_id} has no status record")]
    InconsistentState {
        ingestion_id: String,
        batch_id: String,
    },

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, IngestError>;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl IngestError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            IngestError::InvalidInput(_) => StatusCode::UNPROCESSABLE_ENTITY,
            IngestError::NotFound(_) => StatusCode::NOT_FOUND,
            IngestError::DuplicateId(_)
            | IngestError::InconsistentState { .. }
            | IngestError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for IngestError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Internal faults are logged here and replaced with a generic message.
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("Internal error: {}", self);
            "internal server error".to_string()
        } else {
            match &self {
                IngestError::NotFound(_) => "Ingestion ID not found".to_string(),
                other => other.to_string(),
            }
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}
