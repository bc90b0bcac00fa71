/// HTTP handlers for gallery endpoints
///
/// - Posts: list the enriched feed, create a post
/// - Comments: create and delete comments under a post
///
/// Handlers are thin: they mint the request's run id, build the service
/// against the injected stores, and translate errors into responses that
/// carry the run id and stage tag.
use actix_web::web;

pub mod comments;
pub mod posts;

pub use comments::{create_comment, delete_comment};
pub use posts::{create_post, list_posts};

/// Route table, shared by the server and the HTTP tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/posts")
            .route("", web::get().to(list_posts))
            .route("", web::post().to(create_post))
            .route("/{post_id}/comments", web::post().to(create_comment))
            .route(
                "/{post_id}/comments/{comment_id}",
                web::delete().to(delete_comment),
            ),
    );
}
