/// Error types for gallery-service
///
/// Every fatal error carries a stage tag identifying which store or bucket
/// operation failed, and the HTTP layer pairs it with the request's run id so
/// a single log search reconstructs the failure. Only the conditional-write
/// conflict is ever recovered locally (inside the counter guard); it never
/// appears here.
use crate::store::{BlobError, StoreError};
use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use std::fmt;
use uuid::Uuid;

/// Result type for gallery-service operations
pub type Result<T> = std::result::Result<T, AppError>;

/// The store/bucket operation that failed. Serialized into error bodies as
/// the `error_stage` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    PostFetch,
    PostsTableUpdate,
    CommentFetch,
    CommentTableUpdate,
    CommentDeletion,
    ImageFetch,
    ImageUpload,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::PostFetch => "post_fetching",
            Stage::PostsTableUpdate => "posts_table_update",
            Stage::CommentFetch => "comment_fetching",
            Stage::CommentTableUpdate => "comment_table_update",
            Stage::CommentDeletion => "comment_deletion",
            Stage::ImageFetch => "image_fetching",
            Stage::ImageUpload => "image_upload",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Application error types
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Referenced post or comment does not exist. Fatal, never retried.
    #[error("not found: {0}")]
    NotFound(String),

    /// Malformed request input (bad cursor, bad limit, undecodable image).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The counter guard gave up after the configured retry bound.
    #[error("version conflict on post {post_id} unresolved after {attempts} attempts")]
    ConcurrencyExhausted { post_id: String, attempts: u32 },

    /// Document store failure outside the conditional-check class.
    #[error("store error during {stage}: {source}")]
    Store { stage: Stage, source: StoreError },

    /// Image bucket failure.
    #[error("image store error during {stage}: {source}")]
    Blob { stage: Stage, source: BlobError },
}

impl AppError {
    /// Stage tag for the failed operation, when one applies.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            AppError::Store { stage, .. } | AppError::Blob { stage, .. } => Some(*stage),
            AppError::ConcurrencyExhausted { .. } => Some(Stage::PostsTableUpdate),
            _ => None,
        }
    }

    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::ConcurrencyExhausted { .. } => StatusCode::CONFLICT,
            AppError::Store { .. } | AppError::Blob { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// An application error tied to the request's run id, so the response body
/// carries both the stage tag and the correlation id.
#[derive(Debug)]
pub struct RequestError {
    pub run_id: Uuid,
    pub error: AppError,
}

impl RequestError {
    pub fn new(run_id: Uuid, error: AppError) -> Self {
        Self { run_id, error }
    }
}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.run_id, self.error)
    }
}

impl ResponseError for RequestError {
    fn status_code(&self) -> StatusCode {
        self.error.status_code()
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let mut body = serde_json::json!({
            "run_id": self.run_id.to_string(),
            "error": self.error.to_string(),
            "status": status.as_u16(),
        });
        if let Some(stage) = self.error.stage() {
            body["error_stage"] = serde_json::Value::String(stage.as_str().to_string());
        }

        HttpResponse::build(status).json(body)
    }
}
