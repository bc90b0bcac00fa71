/// Storage abstractions for gallery-service
///
/// The document store and the image bucket are external collaborators; the
/// service consumes them only through these traits, constructed once at
/// startup and injected as `Arc<dyn _>`. That keeps the concurrency and
/// pagination logic testable against the in-memory implementations.
///
/// - `dynamodb`: DynamoDB-backed posts and comments tables
/// - `s3`: S3-backed image bucket
/// - `memory`: dashmap-backed fakes for tests and local runs
use crate::models::{Comment, Post};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub mod dynamodb;
pub mod memory;
pub mod s3;

pub use dynamodb::{DynamoCommentStore, DynamoPostStore};
pub use memory::{MemoryCommentStore, MemoryImageStore, MemoryPostStore};
pub use s3::S3ImageStore;

/// Document store failure classes. Absence on point lookups is expressed as
/// `Option::None` by the trait methods, not as an error.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The conditional-write predicate did not match the stored version.
    /// Transient; recovered inside the counter guard, never surfaced.
    #[error("conditional check failed")]
    ConditionFailed,

    /// A stored item could not be decoded into its record type.
    #[error("malformed record: {0}")]
    Malformed(String),

    /// Infrastructure failure reported by the store.
    #[error("{0}")]
    Service(String),
}

/// Image bucket failure classes.
#[derive(Debug, thiserror::Error)]
pub enum BlobError {
    #[error("object not found: {0}")]
    NotFound(String),

    #[error("{0}")]
    Service(String),
}

/// The store's native resume position for the feed scan: the composite of
/// the secondary-index keys and the table primary key. This is what the
/// opaque client cursor encodes; `timestamp` is always normalized to an
/// integer before it round-trips.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedPosition {
    pub post_id: String,
    pub status: String,
    pub timestamp: i64,
}

/// Posts table access.
#[async_trait]
pub trait PostStore: Send + Sync {
    /// Point lookup by primary key.
    async fn get_post(&self, post_id: &str) -> Result<Option<Post>, StoreError>;

    /// Unconditional put; used only at post creation.
    async fn put_post(&self, post: &Post) -> Result<(), StoreError>;

    /// Conditional put accepted only if the stored version still equals
    /// `expected_version` at the instant of the write. A missing record also
    /// fails the condition.
    async fn put_post_if_version(
        &self,
        post: &Post,
        expected_version: i64,
    ) -> Result<(), StoreError>;

    /// Ordered scan of visible posts (status "ok"), newest first, resuming
    /// strictly after `start_after` when given. Returns at most `limit`
    /// posts plus the resume position for the next page, absent when the
    /// scan is exhausted.
    async fn query_feed(
        &self,
        limit: i64,
        start_after: Option<FeedPosition>,
    ) -> Result<(Vec<Post>, Option<FeedPosition>), StoreError>;
}

/// Comments table access.
#[async_trait]
pub trait CommentStore: Send + Sync {
    async fn get_comment(&self, comment_id: &str) -> Result<Option<Comment>, StoreError>;

    async fn put_comment(&self, comment: &Comment) -> Result<(), StoreError>;

    /// Delete by full primary key (comment id plus creation timestamp).
    async fn delete_comment(&self, comment_id: &str, timestamp: i64) -> Result<(), StoreError>;

    /// The `limit` most recent comments for a post, newest first.
    async fn latest_comments(&self, post_id: &str, limit: i64)
        -> Result<Vec<Comment>, StoreError>;
}

/// Image bucket access.
#[async_trait]
pub trait ImageStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Vec<u8>, BlobError>;

    async fn put(&self, key: &str, bytes: Vec<u8>) -> Result<(), BlobError>;
}

/// Coerce a wire-format number into an integer. DynamoDB returns `N`
/// attributes as decimal strings, occasionally in float form after
/// arithmetic updates; both must survive the cursor round-trip exactly.
pub(crate) fn coerce_int(raw: &str) -> Result<i64, StoreError> {
    if let Ok(n) = raw.parse::<i64>() {
        return Ok(n);
    }
    raw.parse::<f64>()
        .map(|f| f as i64)
        .map_err(|_| StoreError::Malformed(format!("not a number: {raw}")))
}
