/// Gallery Service Library
///
/// A small posting service: clients create text+image posts and attach
/// comments. The load-bearing pieces live in `services`: the
/// compare-and-swap counter guard keeping each post's denormalized comment
/// count honest under concurrent writers, the cursor paginator over the
/// visible-posts index, and the feed assembler that enriches each page
/// entry with comment previews and its image attachment.
///
/// # Modules
///
/// - `handlers`: HTTP request handlers
/// - `models`: Post, Comment, and feed response shapes
/// - `services`: business logic (counter guard, feed, posts, comments)
/// - `store`: document-store and image-bucket abstractions + backends
/// - `error`: error taxonomy and HTTP mapping
/// - `config`: configuration management
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod services;
pub mod store;

pub use config::Config;
pub use error::{AppError, RequestError, Result, Stage};
