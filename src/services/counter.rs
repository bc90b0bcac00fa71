/// Optimistic-concurrency guard for the denormalized post counter
///
/// The store's conditional write is the only synchronization point between
/// racing workers: each attempt reads the current post, recomputes the
/// mutation against that snapshot, and writes back conditioned on the
/// snapshot's version. A lost race re-reads and retries with exponential
/// backoff; the loop is bounded so sustained contention surfaces as
/// `ConcurrencyExhausted` instead of livelock.
use crate::error::{AppError, Result, Stage};
use crate::models::Post;
use crate::store::{PostStore, StoreError};
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

/// Retry policy for the compare-and-swap loop.
#[derive(Debug, Clone)]
pub struct CounterConfig {
    /// Retries allowed after the first attempt loses its race.
    pub max_retries: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
    pub backoff_multiplier: f64,
    /// Add random jitter to backoff (±30%)
    pub jitter: bool,
}

impl Default for CounterConfig {
    fn default() -> Self {
        Self {
            max_retries: 8,
            initial_backoff: Duration::from_millis(25),
            max_backoff: Duration::from_secs(1),
            backoff_multiplier: 2.0,
            jitter: true,
        }
    }
}

pub struct CounterGuard {
    posts: Arc<dyn PostStore>,
    config: CounterConfig,
}

impl CounterGuard {
    pub fn new(posts: Arc<dyn PostStore>, config: CounterConfig) -> Self {
        Self { posts, config }
    }

    /// Apply `mutate` to the current post state and write the result back,
    /// accepted only if no other writer touched the record in between.
    ///
    /// `mutate` must return the desired next state with `version` exactly one
    /// above the state it was derived from; it is re-invoked against fresh
    /// state after every lost race, so the delta always lands on the value
    /// current at the moment of acceptance, never a stale snapshot. A missing
    /// post is fatal and never retried.
    pub async fn apply<F>(&self, post_id: &str, mutate: F) -> Result<Post>
    where
        F: Fn(&Post) -> Post,
    {
        let mut backoff = self.config.initial_backoff;
        let mut attempts: u32 = 0;

        loop {
            let current = self
                .posts
                .get_post(post_id)
                .await
                .map_err(|source| AppError::Store {
                    stage: Stage::PostFetch,
                    source,
                })?
                .ok_or_else(|| AppError::NotFound(format!("post {post_id}")))?;

            let expected = current.version;
            let next = mutate(&current);
            debug_assert_eq!(next.version, expected + 1);

            match self.posts.put_post_if_version(&next, expected).await {
                Ok(()) => return Ok(next),
                Err(StoreError::ConditionFailed) => {
                    attempts += 1;
                    if attempts > self.config.max_retries {
                        warn!(
                            post_id,
                            attempts, "counter update exhausted its retry budget"
                        );
                        return Err(AppError::ConcurrencyExhausted {
                            post_id: post_id.to_string(),
                            attempts,
                        });
                    }

                    let delay = jittered(backoff, self.config.jitter);
                    warn!(
                        post_id,
                        attempt = attempts,
                        max = self.config.max_retries,
                        delay_ms = delay.as_millis() as u64,
                        "version conflict on conditional write, retrying"
                    );
                    tokio::time::sleep(delay).await;

                    backoff = Duration::from_millis(
                        ((backoff.as_millis() as f64 * self.config.backoff_multiplier)
                            .min(self.config.max_backoff.as_millis() as f64))
                            as u64,
                    );
                }
                Err(source) => {
                    return Err(AppError::Store {
                        stage: Stage::PostsTableUpdate,
                        source,
                    });
                }
            }
        }
    }

    /// Adjust the denormalized comment count by `delta`, clamped at zero,
    /// bumping the version by one.
    pub async fn adjust_comment_count(&self, post_id: &str, delta: i64) -> Result<Post> {
        self.apply(post_id, |current| {
            let mut next = current.clone();
            next.comment_count = (next.comment_count + delta).max(0);
            next.version += 1;
            next
        })
        .await
    }
}

fn jittered(base: Duration, jitter: bool) -> Duration {
    if jitter {
        let mut rng = rand::thread_rng();
        let factor = 1.0 + rng.gen_range(-0.3..0.3);
        Duration::from_millis((base.as_millis() as f64 * factor) as u64)
    } else {
        base
    }
}
