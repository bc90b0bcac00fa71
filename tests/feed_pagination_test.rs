//! Integration Tests: Feed Pagination
//!
//! Exercises the cursor contract over the visible-posts index and the
//! per-item enrichment of each returned page.
//!
//! Coverage:
//! - A fresh post lists with zero count, version, and comments
//! - 7 posts paged 5+2 through the returned cursor, terminating null
//! - Concatenated pages cover the index exactly once, strictly descending
//! - Cursor encode/decode round-trips integers exactly
//! - Hidden posts never appear in any page
//! - Bad limits and malformed cursors are rejected up front

use gallery_service::error::AppError;
use gallery_service::models::{Post, PostStatus};
use gallery_service::services::{CursorCodec, FeedService};
use gallery_service::store::{
    FeedPosition, ImageStore, MemoryCommentStore, MemoryImageStore, MemoryPostStore, PostStore,
};
use std::collections::HashSet;
use std::sync::Arc;

struct Fixture {
    posts: Arc<MemoryPostStore>,
    comments: Arc<MemoryCommentStore>,
    images: Arc<MemoryImageStore>,
}

impl Fixture {
    fn new() -> Self {
        Self {
            posts: Arc::new(MemoryPostStore::new()),
            comments: Arc::new(MemoryCommentStore::new()),
            images: Arc::new(MemoryImageStore::new()),
        }
    }

    fn feed(&self) -> FeedService {
        FeedService::new(
            self.posts.clone(),
            self.comments.clone(),
            self.images.clone(),
        )
    }

    /// Seed a visible post with its image attachment in place.
    async fn seed_post(&self, id: &str, timestamp: i64) {
        self.posts
            .put_post(&Post {
                post_id: id.to_string(),
                timestamp,
                author: "ann".to_string(),
                body: format!("post {id}"),
                status: PostStatus::Ok,
                comment_count: 0,
                version: 0,
            })
            .await
            .unwrap();
        self.images
            .put(&format!("{id}.jpg"), id.as_bytes().to_vec())
            .await
            .unwrap();
    }
}

#[tokio::test]
async fn fresh_post_lists_with_empty_enrichment() {
    let fx = Fixture::new();
    fx.seed_post("p1", 100).await;

    let page = fx.feed().list(None, Some(5)).await.unwrap();
    assert_eq!(page.posts.len(), 1);
    assert!(page.next_page.is_none());

    let item = &page.posts[0];
    assert_eq!(item.post.post_id, "p1");
    assert_eq!(item.post.comment_count, 0);
    assert_eq!(item.post.version, 0);
    assert!(item.last_comments.is_empty());
    // Image round-trips through its base64 transfer form.
    assert_eq!(item.image, "cDE=");
}

#[tokio::test]
async fn seven_posts_page_as_five_then_two() {
    let fx = Fixture::new();
    for i in 0..7 {
        fx.seed_post(&format!("p{i}"), 100 + i as i64).await;
    }

    let first = fx.feed().list(None, Some(5)).await.unwrap();
    assert_eq!(first.posts.len(), 5);
    let cursor = first.next_page.clone().expect("first page has a cursor");

    let second = fx.feed().list(Some(&cursor), Some(5)).await.unwrap();
    assert_eq!(second.posts.len(), 2);
    assert!(second.next_page.is_none());

    let mut seen: HashSet<String> = HashSet::new();
    for item in first.posts.iter().chain(second.posts.iter()) {
        assert!(seen.insert(item.post.post_id.clone()), "no duplicates");
    }
    assert_eq!(seen.len(), 7);
}

#[tokio::test]
async fn concatenated_pages_cover_the_index_in_strict_descending_order() {
    let fx = Fixture::new();
    const TOTAL: usize = 11;
    for i in 0..TOTAL {
        fx.seed_post(&format!("p{i:02}"), 1000 + i as i64).await;
    }

    let mut collected: Vec<i64> = Vec::new();
    let mut cursor: Option<String> = None;
    let mut pages = 0;
    loop {
        let page = fx.feed().list(cursor.as_deref(), Some(3)).await.unwrap();
        pages += 1;
        assert!(pages <= TOTAL, "pagination must terminate");
        collected.extend(page.posts.iter().map(|item| item.post.timestamp));
        match page.next_page {
            Some(next) => cursor = Some(next),
            None => break,
        }
    }

    assert_eq!(collected.len(), TOTAL);
    for window in collected.windows(2) {
        assert!(window[0] > window[1], "strictly descending sort keys");
    }
}

#[tokio::test]
async fn default_page_size_is_five() {
    let fx = Fixture::new();
    for i in 0..9 {
        fx.seed_post(&format!("p{i}"), i as i64).await;
    }

    let page = fx.feed().list(None, None).await.unwrap();
    assert_eq!(page.posts.len(), 5);
    assert!(page.next_page.is_some());
}

#[tokio::test]
async fn hidden_posts_never_appear() {
    let fx = Fixture::new();
    fx.seed_post("visible", 10).await;
    fx.posts
        .put_post(&Post {
            post_id: "soft-deleted".to_string(),
            timestamp: 20,
            author: "ann".to_string(),
            body: "gone".to_string(),
            status: PostStatus::Hidden,
            comment_count: 0,
            version: 3,
        })
        .await
        .unwrap();

    let page = fx.feed().list(None, Some(5)).await.unwrap();
    assert_eq!(page.posts.len(), 1);
    assert_eq!(page.posts[0].post.post_id, "visible");
}

#[tokio::test]
async fn returned_cursor_decodes_to_the_page_boundary() {
    let fx = Fixture::new();
    for i in 0..4 {
        fx.seed_post(&format!("p{i}"), 100 + i as i64).await;
    }

    let page = fx.feed().list(None, Some(2)).await.unwrap();
    let token = page.next_page.expect("cursor present");

    let position = CursorCodec::decode(&token).unwrap();
    // Last item of the page is (p2, 102); the cursor resumes strictly after it.
    assert_eq!(
        position,
        FeedPosition {
            post_id: "p2".to_string(),
            status: "ok".to_string(),
            timestamp: 102,
        }
    );
}

#[tokio::test]
async fn non_positive_limit_is_a_bad_request() {
    let fx = Fixture::new();
    for bad in [0, -1] {
        let err = fx.feed().list(None, Some(bad)).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }
}

#[tokio::test]
async fn malformed_cursor_is_a_bad_request() {
    let fx = Fixture::new();
    fx.seed_post("p1", 1).await;

    let err = fx.feed().list(Some("@@not-a-cursor@@"), Some(5)).await;
    assert!(matches!(err, Err(AppError::BadRequest(_))));
}
