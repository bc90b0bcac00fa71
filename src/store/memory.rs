/// In-memory store implementations
///
/// Concurrency-faithful stand-ins for the DynamoDB tables and the S3 bucket:
/// the conditional put checks the stored version under the shard lock of the
/// entry, so racing writers observe real compare-and-swap semantics. Used by
/// the integration tests and for running the service without AWS access.
use crate::models::{Comment, Post, PostStatus};
use crate::store::{
    BlobError, CommentStore, FeedPosition, ImageStore, PostStore, StoreError,
};
use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

#[derive(Default)]
pub struct MemoryPostStore {
    posts: DashMap<String, Post>,
}

impl MemoryPostStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sort key of a post within the descending feed index.
    fn feed_key(post: &Post) -> (i64, String) {
        (post.timestamp, post.post_id.clone())
    }
}

#[async_trait]
impl PostStore for MemoryPostStore {
    async fn get_post(&self, post_id: &str) -> Result<Option<Post>, StoreError> {
        Ok(self.posts.get(post_id).map(|entry| entry.value().clone()))
    }

    async fn put_post(&self, post: &Post) -> Result<(), StoreError> {
        self.posts.insert(post.post_id.clone(), post.clone());
        Ok(())
    }

    async fn put_post_if_version(
        &self,
        post: &Post,
        expected_version: i64,
    ) -> Result<(), StoreError> {
        match self.posts.entry(post.post_id.clone()) {
            Entry::Occupied(mut entry) => {
                if entry.get().version == expected_version {
                    entry.insert(post.clone());
                    Ok(())
                } else {
                    Err(StoreError::ConditionFailed)
                }
            }
            // A missing record cannot match any expected version.
            Entry::Vacant(_) => Err(StoreError::ConditionFailed),
        }
    }

    async fn query_feed(
        &self,
        limit: i64,
        start_after: Option<FeedPosition>,
    ) -> Result<(Vec<Post>, Option<FeedPosition>), StoreError> {
        let after_key = start_after.map(|pos| (pos.timestamp, pos.post_id));

        let mut visible: Vec<Post> = self
            .posts
            .iter()
            .filter(|entry| entry.value().status == PostStatus::Ok)
            .map(|entry| entry.value().clone())
            .filter(|post| match &after_key {
                Some(key) => Self::feed_key(post) < *key,
                None => true,
            })
            .collect();

        // Descending (timestamp, post id) order, newest first.
        visible.sort_by(|a, b| Self::feed_key(b).cmp(&Self::feed_key(a)));

        let limit = limit.max(0) as usize;
        let has_more = visible.len() > limit;
        visible.truncate(limit);

        let next = if has_more {
            visible.last().map(|post| FeedPosition {
                post_id: post.post_id.clone(),
                status: post.status.as_str().to_string(),
                timestamp: post.timestamp,
            })
        } else {
            None
        };

        Ok((visible, next))
    }
}

#[derive(Default)]
pub struct MemoryCommentStore {
    comments: DashMap<String, Comment>,
}

impl MemoryCommentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CommentStore for MemoryCommentStore {
    async fn get_comment(&self, comment_id: &str) -> Result<Option<Comment>, StoreError> {
        Ok(self.comments.get(comment_id).map(|entry| entry.value().clone()))
    }

    async fn put_comment(&self, comment: &Comment) -> Result<(), StoreError> {
        self.comments
            .insert(comment.comment_id.clone(), comment.clone());
        Ok(())
    }

    async fn delete_comment(&self, comment_id: &str, timestamp: i64) -> Result<(), StoreError> {
        self.comments
            .remove_if(comment_id, |_, comment| comment.timestamp == timestamp);
        Ok(())
    }

    async fn latest_comments(
        &self,
        post_id: &str,
        limit: i64,
    ) -> Result<Vec<Comment>, StoreError> {
        let mut matching: Vec<Comment> = self
            .comments
            .iter()
            .filter(|entry| entry.value().post_id == post_id)
            .map(|entry| entry.value().clone())
            .collect();

        matching.sort_by(|a, b| {
            (b.timestamp, b.comment_id.clone()).cmp(&(a.timestamp, a.comment_id.clone()))
        });
        matching.truncate(limit.max(0) as usize);

        Ok(matching)
    }
}

#[derive(Default)]
pub struct MemoryImageStore {
    objects: DashMap<String, Vec<u8>>,
}

impl MemoryImageStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ImageStore for MemoryImageStore {
    async fn get(&self, key: &str) -> Result<Vec<u8>, BlobError> {
        self.objects
            .get(key)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| BlobError::NotFound(key.to_string()))
    }

    async fn put(&self, key: &str, bytes: Vec<u8>) -> Result<(), BlobError> {
        self.objects.insert(key.to_string(), bytes);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post(id: &str, timestamp: i64) -> Post {
        Post {
            post_id: id.to_string(),
            timestamp,
            author: "ann".to_string(),
            body: "body".to_string(),
            status: PostStatus::Ok,
            comment_count: 0,
            version: 0,
        }
    }

    #[tokio::test]
    async fn conditional_put_rejects_stale_version() {
        let store = MemoryPostStore::new();
        store.put_post(&post("p1", 10)).await.unwrap();

        let mut next = post("p1", 10);
        next.version = 1;
        store.put_post_if_version(&next, 0).await.unwrap();

        // Same expected version again: the stored record moved on.
        let mut rival = post("p1", 10);
        rival.version = 1;
        assert!(matches!(
            store.put_post_if_version(&rival, 0).await,
            Err(StoreError::ConditionFailed)
        ));
    }

    #[tokio::test]
    async fn conditional_put_on_missing_record_fails_condition() {
        let store = MemoryPostStore::new();
        assert!(matches!(
            store.put_post_if_version(&post("ghost", 1), 0).await,
            Err(StoreError::ConditionFailed)
        ));
    }

    #[tokio::test]
    async fn query_feed_orders_newest_first_and_hides_hidden() {
        let store = MemoryPostStore::new();
        store.put_post(&post("p1", 10)).await.unwrap();
        store.put_post(&post("p2", 20)).await.unwrap();
        let mut hidden = post("p3", 30);
        hidden.status = PostStatus::Hidden;
        store.put_post(&hidden).await.unwrap();

        let (page, next) = store.query_feed(5, None).await.unwrap();
        let ids: Vec<&str> = page.iter().map(|p| p.post_id.as_str()).collect();
        assert_eq!(ids, vec!["p2", "p1"]);
        assert!(next.is_none());
    }

    #[tokio::test]
    async fn query_feed_resumes_strictly_after_position() {
        let store = MemoryPostStore::new();
        for i in 0..4 {
            store.put_post(&post(&format!("p{i}"), i)).await.unwrap();
        }

        let (first, next) = store.query_feed(2, None).await.unwrap();
        assert_eq!(first.len(), 2);
        let next = next.expect("more pages remain");

        let (second, _) = store.query_feed(2, Some(next)).await.unwrap();
        let first_ids: Vec<&str> = first.iter().map(|p| p.post_id.as_str()).collect();
        let second_ids: Vec<&str> = second.iter().map(|p| p.post_id.as_str()).collect();
        assert_eq!(first_ids, vec!["p3", "p2"]);
        assert_eq!(second_ids, vec!["p1", "p0"]);
    }

    #[tokio::test]
    async fn latest_comments_bounded_and_newest_first() {
        let store = MemoryCommentStore::new();
        for i in 0..3 {
            store
                .put_comment(&Comment {
                    comment_id: format!("c{i}"),
                    post_id: "p1".to_string(),
                    timestamp: i,
                    author: "bo".to_string(),
                    body: "text".to_string(),
                })
                .await
                .unwrap();
        }

        let latest = store.latest_comments("p1", 2).await.unwrap();
        let ids: Vec<&str> = latest.iter().map(|c| c.comment_id.as_str()).collect();
        assert_eq!(ids, vec!["c2", "c1"]);
    }
}
