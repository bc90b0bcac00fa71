/// Comment service - comment create/delete sagas
///
/// Each operation is a two-step saga: mutate the comment collection, then
/// adjust the parent post's denormalized counter through the version guard.
/// There is no atomicity across the steps and no compensating action: when
/// the counter step fails after the comment write succeeded, the count is
/// off until a later adjustment lands, and the failure is surfaced.
use crate::error::{AppError, Result, Stage};
use crate::models::Comment;
use crate::services::counter::CounterGuard;
use crate::store::CommentStore;
use chrono::Utc;
use std::sync::Arc;
use tracing::{error, info};

pub struct CommentService {
    comments: Arc<dyn CommentStore>,
    counter: Arc<CounterGuard>,
}

impl CommentService {
    pub fn new(comments: Arc<dyn CommentStore>, counter: Arc<CounterGuard>) -> Self {
        Self { comments, counter }
    }

    /// Write the comment record, then increment the parent's counter. A
    /// missing parent surfaces as `NotFound` from the guard, after the
    /// comment record already exists.
    pub async fn create_comment(
        &self,
        comment_id: &str,
        post_id: &str,
        author: &str,
        body: &str,
    ) -> Result<Comment> {
        let comment = Comment {
            comment_id: comment_id.to_string(),
            post_id: post_id.to_string(),
            timestamp: Utc::now().timestamp(),
            author: author.to_string(),
            body: body.to_string(),
        };

        self.comments
            .put_comment(&comment)
            .await
            .map_err(|source| AppError::Store {
                stage: Stage::CommentTableUpdate,
                source,
            })?;

        if let Err(err) = self.counter.adjust_comment_count(post_id, 1).await {
            error!(
                post_id,
                comment_id,
                %err,
                "comment stored but counter increment failed; count is stale until the next adjustment"
            );
            return Err(err);
        }

        info!(post_id, comment_id, "created comment");
        Ok(comment)
    }

    /// Delete the comment record, then decrement the parent's counter.
    /// Returns the deleted comment.
    pub async fn delete_comment(&self, post_id: &str, comment_id: &str) -> Result<Comment> {
        let comment = self
            .comments
            .get_comment(comment_id)
            .await
            .map_err(|source| AppError::Store {
                stage: Stage::CommentFetch,
                source,
            })?
            .ok_or_else(|| AppError::NotFound(format!("comment {comment_id}")))?;

        self.comments
            .delete_comment(comment_id, comment.timestamp)
            .await
            .map_err(|source| AppError::Store {
                stage: Stage::CommentDeletion,
                source,
            })?;

        if let Err(err) = self.counter.adjust_comment_count(post_id, -1).await {
            error!(
                post_id,
                comment_id,
                %err,
                "comment deleted but counter decrement failed; count is stale until the next adjustment"
            );
            return Err(err);
        }

        info!(post_id, comment_id, "deleted comment");
        Ok(comment)
    }
}
