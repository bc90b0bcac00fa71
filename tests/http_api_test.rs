//! Integration Tests: HTTP API
//!
//! Drives the actix handlers end to end against the in-memory stores.
//!
//! Coverage:
//! - Post creation returns the stored record with a fresh counter
//! - The feed lists created posts with previews and base64 images
//! - Comment create/delete round-trip through the denormalized counter
//! - Missing image payloads are rejected with a run id in the body

use actix_web::{test, web, App};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use gallery_service::handlers;
use gallery_service::services::{CounterConfig, CounterGuard};
use gallery_service::store::{
    CommentStore, ImageStore, MemoryCommentStore, MemoryImageStore, MemoryPostStore, PostStore,
};
use serde_json::{json, Value};
use std::sync::Arc;

fn stores() -> (Arc<dyn PostStore>, Arc<dyn CommentStore>, Arc<dyn ImageStore>) {
    (
        Arc::new(MemoryPostStore::new()),
        Arc::new(MemoryCommentStore::new()),
        Arc::new(MemoryImageStore::new()),
    )
}

macro_rules! app {
    ($posts:expr, $comments:expr, $images:expr) => {{
        let counter = Arc::new(CounterGuard::new($posts.clone(), CounterConfig::default()));
        test::init_service(
            App::new()
                .app_data(web::Data::from($posts.clone()))
                .app_data(web::Data::from($comments.clone()))
                .app_data(web::Data::from($images.clone()))
                .app_data(web::Data::from(counter))
                .configure(handlers::configure),
        )
        .await
    }};
}

#[actix_web::test]
async fn create_post_then_list_feed() {
    let (posts, comments, images) = stores();
    let app = app!(posts, comments, images);

    let image_b64 = BASE64.encode(b"fake jpeg bytes");
    let req = test::TestRequest::post()
        .uri("/posts")
        .set_json(json!({
            "author": "ann",
            "body": "first post",
            "image_contents": image_b64,
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 201);

    let created: Value = test::read_body_json(resp).await;
    assert_eq!(created["Author"], "ann");
    assert_eq!(created["CommentCount"], 0);
    assert_eq!(created["Version"], 0);
    let post_id = created["PostID"].as_str().unwrap().to_string();

    let req = test::TestRequest::get().uri("/posts?limit=5").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);

    let page: Value = test::read_body_json(resp).await;
    assert!(page["nextPage"].is_null());
    let items = page["posts"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["PostID"], post_id.as_str());
    assert_eq!(items[0]["Image"], image_b64.as_str());
    assert!(items[0]["LastComments"].as_array().unwrap().is_empty());
}

#[actix_web::test]
async fn comment_round_trip_moves_the_counter() {
    let (posts, comments, images) = stores();
    let app = app!(posts, comments, images);

    let req = test::TestRequest::post()
        .uri("/posts")
        .set_json(json!({
            "author": "ann",
            "body": "commented soon",
            "image_contents": BASE64.encode(b"img"),
        }))
        .to_request();
    let created: Value = test::call_and_read_body_json(&app, req).await;
    let post_id = created["PostID"].as_str().unwrap().to_string();

    let req = test::TestRequest::post()
        .uri(&format!("/posts/{post_id}/comments"))
        .set_json(json!({"author": "bo", "body": "nice"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 201);
    let comment: Value = test::read_body_json(resp).await;
    assert_eq!(comment["PostID"], post_id.as_str());
    let comment_id = comment["CommentID"].as_str().unwrap().to_string();

    let req = test::TestRequest::get().uri("/posts").to_request();
    let page: Value = test::call_and_read_body_json(&app, req).await;
    let item = &page["posts"][0];
    assert_eq!(item["CommentCount"], 1);
    assert_eq!(item["Version"], 1);
    assert_eq!(item["LastComments"][0]["CommentID"], comment_id.as_str());

    let req = test::TestRequest::delete()
        .uri(&format!("/posts/{post_id}/comments/{comment_id}"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);

    let req = test::TestRequest::get().uri("/posts").to_request();
    let page: Value = test::call_and_read_body_json(&app, req).await;
    let item = &page["posts"][0];
    assert_eq!(item["CommentCount"], 0);
    assert_eq!(item["Version"], 2);
}

#[actix_web::test]
async fn post_without_image_is_rejected_with_run_id() {
    let (posts, comments, images) = stores();
    let app = app!(posts, comments, images);

    let req = test::TestRequest::post()
        .uri("/posts")
        .set_json(json!({"author": "ann", "body": "no image"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);

    let body: Value = test::read_body_json(resp).await;
    assert!(body["run_id"].is_string());
    assert!(body["error"].as_str().unwrap().contains("no image"));
}

#[actix_web::test]
async fn deleting_unknown_comment_returns_404_with_stage_free_body() {
    let (posts, comments, images) = stores();
    let app = app!(posts, comments, images);

    let req = test::TestRequest::delete()
        .uri("/posts/p1/comments/c404")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404);

    let body: Value = test::read_body_json(resp).await;
    assert!(body["run_id"].is_string());
    assert!(body.get("error_stage").is_none());
}
