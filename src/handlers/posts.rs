/// Post handlers - HTTP endpoints for post operations
use crate::error::{AppError, RequestError};
use crate::services::{FeedService, PostService};
use crate::store::{CommentStore, ImageStore, PostStore};
use actix_web::{web, HttpResponse};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::Deserialize;
use tracing::Instrument;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct ListPostsQuery {
    #[serde(rename = "nextPage")]
    pub next_page: Option<String>,
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct CreatePostRequest {
    pub author: String,
    pub body: String,
    /// Base64-encoded image payload.
    pub image_contents: Option<String>,
}

/// List visible posts, newest first, with comment previews and images.
pub async fn list_posts(
    posts: web::Data<dyn PostStore>,
    comments: web::Data<dyn CommentStore>,
    images: web::Data<dyn ImageStore>,
    query: web::Query<ListPostsQuery>,
) -> Result<HttpResponse, RequestError> {
    let run_id = Uuid::new_v4();
    let span = tracing::info_span!("list_posts", run_id = %run_id);

    let service = FeedService::new(
        posts.into_inner(),
        comments.into_inner(),
        images.into_inner(),
    );
    let page = service
        .list(query.next_page.as_deref(), query.limit)
        .instrument(span)
        .await
        .map_err(|err| RequestError::new(run_id, err))?;

    Ok(HttpResponse::Ok().json(page))
}

/// Create a new post. The request's run id becomes the post id.
pub async fn create_post(
    posts: web::Data<dyn PostStore>,
    images: web::Data<dyn ImageStore>,
    req: web::Json<CreatePostRequest>,
) -> Result<HttpResponse, RequestError> {
    let run_id = Uuid::new_v4();
    let span = tracing::info_span!("create_post", run_id = %run_id);

    let image = decode_image(&req).map_err(|err| RequestError::new(run_id, err))?;

    let service = PostService::new(posts.into_inner(), images.into_inner());
    let post = service
        .create_post(&run_id.to_string(), &req.author, &req.body, image)
        .instrument(span)
        .await
        .map_err(|err| RequestError::new(run_id, err))?;

    Ok(HttpResponse::Created().json(post))
}

fn decode_image(req: &CreatePostRequest) -> Result<Vec<u8>, AppError> {
    let encoded = req
        .image_contents
        .as_deref()
        .ok_or_else(|| AppError::BadRequest("no image in the request body".to_string()))?;

    BASE64
        .decode(encoded)
        .map_err(|err| AppError::BadRequest(format!("undecodable image: {err}")))
}
