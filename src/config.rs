/// Configuration management for gallery-service
///
/// Loaded from environment variables with development defaults; production
/// deployments set everything explicitly.
use crate::services::CounterConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub cors: CorsConfig,
    pub store: StoreConfig,
    pub images: ImageBucketConfig,
    pub counter: CounterRetryConfig,
}

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application environment (dev, staging, prod)
    pub env: String,
    /// Server host to bind to
    pub host: String,
    /// Server port to bind to
    pub port: u16,
}

/// CORS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Comma-separated list of allowed origins
    pub allowed_origins: String,
}

/// DynamoDB table and index names
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    pub posts_table: String,
    pub comments_table: String,
    /// Secondary index over (Status, Timestamp) used by the feed scan
    pub posts_feed_index: String,
    /// Secondary index over (PostID, Timestamp) used by comment previews
    pub comments_post_index: String,
}

/// S3 bucket holding post images
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageBucketConfig {
    pub bucket: String,
}

/// Retry policy for the counter's compare-and-swap loop
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CounterRetryConfig {
    pub max_retries: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
    pub backoff_multiplier: f64,
    pub jitter: bool,
}

impl CounterRetryConfig {
    pub fn to_counter_config(&self) -> CounterConfig {
        CounterConfig {
            max_retries: self.max_retries,
            initial_backoff: Duration::from_millis(self.initial_backoff_ms),
            max_backoff: Duration::from_millis(self.max_backoff_ms),
            backoff_multiplier: self.backoff_multiplier,
            jitter: self.jitter,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, String> {
        let app_env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

        Ok(Config {
            app: AppConfig {
                env: app_env.clone(),
                host: std::env::var("GALLERY_SERVICE_HOST")
                    .unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: std::env::var("GALLERY_SERVICE_PORT")
                    .ok()
                    .and_then(|p| p.parse().ok())
                    .unwrap_or(8080),
            },
            cors: {
                let allowed_origins = match std::env::var("CORS_ALLOWED_ORIGINS") {
                    Ok(value) => value,
                    Err(_) if app_env.eq_ignore_ascii_case("production") => {
                        return Err("CORS_ALLOWED_ORIGINS must be set in production".to_string())
                    }
                    Err(_) => "http://localhost:3000".to_string(),
                };

                if app_env.eq_ignore_ascii_case("production") && allowed_origins.trim() == "*" {
                    return Err("CORS_ALLOWED_ORIGINS cannot be '*' in production".to_string());
                }

                CorsConfig { allowed_origins }
            },
            store: StoreConfig {
                posts_table: std::env::var("POSTS_TABLE")
                    .unwrap_or_else(|_| "gallery_posts".to_string()),
                comments_table: std::env::var("COMMENTS_TABLE")
                    .unwrap_or_else(|_| "gallery_comments".to_string()),
                posts_feed_index: std::env::var("POSTS_FEED_INDEX")
                    .unwrap_or_else(|_| "Status-Timestamp-index".to_string()),
                comments_post_index: std::env::var("COMMENTS_POST_INDEX")
                    .unwrap_or_else(|_| "PostID-Timestamp-index".to_string()),
            },
            images: ImageBucketConfig {
                bucket: std::env::var("IMAGES_BUCKET")
                    .unwrap_or_else(|_| "gallery-images".to_string()),
            },
            counter: CounterRetryConfig {
                max_retries: std::env::var("COUNTER_MAX_RETRIES")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(8),
                initial_backoff_ms: std::env::var("COUNTER_INITIAL_BACKOFF_MS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(25),
                max_backoff_ms: std::env::var("COUNTER_MAX_BACKOFF_MS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(1_000),
                backoff_multiplier: std::env::var("COUNTER_BACKOFF_MULTIPLIER")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(2.0),
                jitter: std::env::var("COUNTER_BACKOFF_JITTER")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(true),
            },
        })
    }
}
