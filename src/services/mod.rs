/// Business logic layer
///
/// - `counter`: compare-and-swap protocol for the denormalized comment count
/// - `feed`: cursor pagination and per-post enrichment
/// - `posts`: post creation
/// - `comments`: comment create/delete sagas
pub mod comments;
pub mod counter;
pub mod feed;
pub mod posts;

pub use comments::CommentService;
pub use counter::{CounterConfig, CounterGuard};
pub use feed::{CursorCodec, FeedService, COMMENT_PREVIEW_LIMIT, DEFAULT_PAGE_SIZE};
pub use posts::PostService;
