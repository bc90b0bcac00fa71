/// Post service - post creation
use crate::error::{AppError, Result, Stage};
use crate::models::{Post, PostStatus};
use crate::services::feed::image_key;
use crate::store::{ImageStore, PostStore};
use chrono::Utc;
use std::sync::Arc;
use tracing::info;

pub struct PostService {
    posts: Arc<dyn PostStore>,
    images: Arc<dyn ImageStore>,
}

impl PostService {
    pub fn new(posts: Arc<dyn PostStore>, images: Arc<dyn ImageStore>) -> Self {
        Self { posts, images }
    }

    /// Create a new post: upload the image first, then put the record with a
    /// fresh counter and version. The image key is derived from the post id,
    /// so the record never stores a path.
    pub async fn create_post(
        &self,
        post_id: &str,
        author: &str,
        body: &str,
        image: Vec<u8>,
    ) -> Result<Post> {
        self.images
            .put(&image_key(post_id), image)
            .await
            .map_err(|source| AppError::Blob {
                stage: Stage::ImageUpload,
                source,
            })?;

        let post = Post {
            post_id: post_id.to_string(),
            timestamp: Utc::now().timestamp(),
            author: author.to_string(),
            body: body.to_string(),
            status: PostStatus::Ok,
            comment_count: 0,
            version: 0,
        };

        self.posts
            .put_post(&post)
            .await
            .map_err(|source| AppError::Store {
                stage: Stage::PostsTableUpdate,
                source,
            })?;

        info!(post_id, "created post");
        Ok(post)
    }
}
