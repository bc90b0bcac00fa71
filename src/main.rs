use actix_cors::Cors;
use actix_web::{web, App, HttpResponse, HttpServer};
use anyhow::Context;
use gallery_service::services::CounterGuard;
use gallery_service::store::{
    CommentStore, DynamoCommentStore, DynamoPostStore, ImageStore, PostStore, S3ImageStore,
};
use gallery_service::{handlers, Config};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

async fn health() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "service": "gallery-service",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            tracing_subscriber::EnvFilter::new("info,gallery_service=debug")
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()
        .map_err(anyhow::Error::msg)
        .context("loading configuration")?;

    let aws_config = aws_config::load_from_env().await;
    let dynamo = Arc::new(aws_sdk_dynamodb::Client::new(&aws_config));
    let s3 = Arc::new(aws_sdk_s3::Client::new(&aws_config));

    let posts: Arc<dyn PostStore> = Arc::new(DynamoPostStore::new(
        dynamo.clone(),
        config.store.posts_table.clone(),
        config.store.posts_feed_index.clone(),
    ));
    let comments: Arc<dyn CommentStore> = Arc::new(DynamoCommentStore::new(
        dynamo,
        config.store.comments_table.clone(),
        config.store.comments_post_index.clone(),
    ));
    let images: Arc<dyn ImageStore> =
        Arc::new(S3ImageStore::new(s3, config.images.bucket.clone()));
    let counter = Arc::new(CounterGuard::new(
        posts.clone(),
        config.counter.to_counter_config(),
    ));

    let bind_addr = (config.app.host.clone(), config.app.port);
    let allowed_origins = config.cors.allowed_origins.clone();
    tracing::info!(
        host = %config.app.host,
        port = config.app.port,
        posts_table = %config.store.posts_table,
        comments_table = %config.store.comments_table,
        bucket = %config.images.bucket,
        "starting gallery-service"
    );

    HttpServer::new(move || {
        let mut cors = Cors::default()
            .allowed_methods(vec!["GET", "POST", "DELETE"])
            .allow_any_header()
            .max_age(3600);
        for origin in allowed_origins.split(',').map(str::trim) {
            if origin == "*" {
                cors = cors.allow_any_origin();
            } else if !origin.is_empty() {
                cors = cors.allowed_origin(origin);
            }
        }

        App::new()
            .wrap(cors)
            .wrap(tracing_actix_web::TracingLogger::default())
            .app_data(web::Data::from(posts.clone()))
            .app_data(web::Data::from(comments.clone()))
            .app_data(web::Data::from(images.clone()))
            .app_data(web::Data::from(counter.clone()))
            .route("/health", web::get().to(health))
            .configure(handlers::configure)
    })
    .bind(bind_addr)
    .context("binding server socket")?
    .run()
    .await
    .context("running server")
}
