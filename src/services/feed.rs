/// Feed listing: cursor pagination plus per-post enrichment
///
/// A page is fetched in three steps: decode the opaque cursor into the
/// store's resume position, scan the visible-posts index newest first, then
/// enrich each returned post independently with its two most recent comments
/// and its base64-encoded image. Any enrichment failure aborts the whole
/// page; no partial page is ever returned.
use crate::error::{AppError, Result, Stage};
use crate::models::{FeedItem, FeedPage, Post};
use crate::store::{CommentStore, FeedPosition, ImageStore, PostStore};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use std::sync::Arc;
use tracing::debug;

/// Default page size when the caller does not supply a limit.
pub const DEFAULT_PAGE_SIZE: i64 = 5;

/// Number of recent comments attached to each feed item.
pub const COMMENT_PREVIEW_LIMIT: i64 = 2;

/// Opaque-cursor codec for the feed scan. The token is base64 over the JSON
/// form of the store's resume position, so it can evolve without clients
/// ever parsing it.
pub struct CursorCodec;

impl CursorCodec {
    pub fn encode(position: &FeedPosition) -> String {
        // Serializing a plain struct of strings and ints cannot fail.
        let json = serde_json::to_vec(position).expect("cursor serialization");
        BASE64.encode(json)
    }

    pub fn decode(cursor: &str) -> Result<FeedPosition> {
        let bytes = BASE64
            .decode(cursor)
            .map_err(|err| AppError::BadRequest(format!("invalid cursor: {err}")))?;
        serde_json::from_slice(&bytes)
            .map_err(|err| AppError::BadRequest(format!("invalid cursor: {err}")))
    }
}

/// Object key of a post's image attachment.
pub fn image_key(post_id: &str) -> String {
    format!("{post_id}.jpg")
}

pub struct FeedService {
    posts: Arc<dyn PostStore>,
    comments: Arc<dyn CommentStore>,
    images: Arc<dyn ImageStore>,
}

impl FeedService {
    pub fn new(
        posts: Arc<dyn PostStore>,
        comments: Arc<dyn CommentStore>,
        images: Arc<dyn ImageStore>,
    ) -> Self {
        Self {
            posts,
            comments,
            images,
        }
    }

    /// Return one page of visible posts, newest first, each enriched with
    /// its comment preview and image. `cursor` is a token from a previous
    /// page; the returned `next_page` is `None` once the scan is exhausted.
    pub async fn list(&self, cursor: Option<&str>, limit: Option<i64>) -> Result<FeedPage> {
        let limit = match limit {
            Some(n) if n <= 0 => {
                return Err(AppError::BadRequest(format!("limit must be positive: {n}")));
            }
            Some(n) => n,
            None => DEFAULT_PAGE_SIZE,
        };

        let start_after = cursor.map(CursorCodec::decode).transpose()?;
        debug!(limit, resumed = start_after.is_some(), "fetching feed page");

        let (posts, next) = self
            .posts
            .query_feed(limit, start_after)
            .await
            .map_err(|source| AppError::Store {
                stage: Stage::PostFetch,
                source,
            })?;

        let mut items = Vec::with_capacity(posts.len());
        for post in posts {
            items.push(self.enrich(post).await?);
        }

        Ok(FeedPage {
            next_page: next.as_ref().map(CursorCodec::encode),
            posts: items,
        })
    }

    /// Fan-out reads for a single post. Depends on nothing but this post's
    /// own records; output order is decided by the caller.
    async fn enrich(&self, post: Post) -> Result<FeedItem> {
        let last_comments = self
            .comments
            .latest_comments(&post.post_id, COMMENT_PREVIEW_LIMIT)
            .await
            .map_err(|source| AppError::Store {
                stage: Stage::CommentFetch,
                source,
            })?;

        let bytes = self
            .images
            .get(&image_key(&post.post_id))
            .await
            .map_err(|source| AppError::Blob {
                stage: Stage::ImageFetch,
                source,
            })?;

        Ok(FeedItem {
            post,
            last_comments,
            image: BASE64.encode(bytes),
        })
    }
}
