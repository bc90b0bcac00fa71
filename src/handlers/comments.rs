/// Comment handlers - HTTP endpoints for comment operations
use crate::error::RequestError;
use crate::services::{CommentService, CounterGuard};
use crate::store::CommentStore;
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use tracing::Instrument;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct CreateCommentRequest {
    pub author: String,
    pub body: String,
}

/// Create a comment on a post. The request's run id becomes the comment id.
pub async fn create_comment(
    comments: web::Data<dyn CommentStore>,
    counter: web::Data<CounterGuard>,
    post_id: web::Path<String>,
    req: web::Json<CreateCommentRequest>,
) -> Result<HttpResponse, RequestError> {
    let run_id = Uuid::new_v4();
    let post_id = post_id.into_inner();
    let span = tracing::info_span!("create_comment", run_id = %run_id, post_id = %post_id);

    let service = CommentService::new(comments.into_inner(), counter.into_inner());
    let comment = service
        .create_comment(&run_id.to_string(), &post_id, &req.author, &req.body)
        .instrument(span)
        .await
        .map_err(|err| RequestError::new(run_id, err))?;

    Ok(HttpResponse::Created().json(comment))
}

/// Delete a comment and decrement the post's counter.
pub async fn delete_comment(
    comments: web::Data<dyn CommentStore>,
    counter: web::Data<CounterGuard>,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse, RequestError> {
    let run_id = Uuid::new_v4();
    let (post_id, comment_id) = path.into_inner();
    let span = tracing::info_span!(
        "delete_comment",
        run_id = %run_id,
        post_id = %post_id,
        comment_id = %comment_id
    );

    let service = CommentService::new(comments.into_inner(), counter.into_inner());
    service
        .delete_comment(&post_id, &comment_id)
        .instrument(span)
        .await
        .map_err(|err| RequestError::new(run_id, err))?;

    Ok(HttpResponse::Ok().json(format!("Deleted comment {comment_id} for post {post_id}")))
}
