//! Read-after-write reconciliation
//!
//! App Mesh is eventually consistent: an entity that was just created can
//! answer NotFound for a short while. Reads of new resources therefore poll
//! until the entity shows up; reads of existing resources treat NotFound as
//! the resource being gone.

use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tfplug::Context;
use tokio::time::Instant;
use tracing::debug;

use crate::api::ApiError;

/// How long a new resource may stay invisible
pub const PROPAGATION_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Error)]
pub enum ReadError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("{arn} has been deleted")]
    SoftDeleted { arn: String },

    #[error("empty result")]
    EmptyResult,

    #[error("timeout while waiting for the resource to become visible: {last}")]
    Timeout { last: Box<ReadError> },

    #[error(transparent)]
    Api(ApiError),
}

impl From<ApiError> for ReadError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::NotFound { message } => ReadError::NotFound(message),
            other => ReadError::Api(other),
        }
    }
}

impl ReadError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ReadError::NotFound(_))
    }

    /// NotFound or deleted: the resource no longer exists remotely
    pub fn is_gone(&self) -> bool {
        matches!(self, ReadError::NotFound(_) | ReadError::SoftDeleted { .. })
    }
}

/// Result of a reconciled read
#[derive(Debug)]
pub enum ReadOutcome<T> {
    Visible(T),
    Gone,
}

impl<T> ReadOutcome<T> {
    pub fn into_option(self) -> Option<T> {
        match self {
            ReadOutcome::Visible(value) => Some(value),
            ReadOutcome::Gone => None,
        }
    }
}

/// Polling window and backoff for new resources
#[derive(Debug, Clone)]
pub struct PropagationWait {
    pub timeout: Duration,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for PropagationWait {
    fn default() -> Self {
        Self {
            timeout: PROPAGATION_TIMEOUT,
            initial_backoff: Duration::from_secs(1),
            max_backoff: Duration::from_secs(10),
        }
    }
}

enum Attempt<T> {
    Done(Result<ReadOutcome<T>, ReadError>),
    Pending(ReadError),
}

fn classify<T>(result: Result<T, ReadError>, is_new: bool) -> Attempt<T> {
    match result {
        Ok(value) => Attempt::Done(Ok(ReadOutcome::Visible(value))),
        Err(err) if !is_new && err.is_gone() => Attempt::Done(Ok(ReadOutcome::Gone)),
        Err(err) if is_new && err.is_not_found() => Attempt::Pending(err),
        Err(err) => Attempt::Done(Err(err)),
    }
}

/// Runs `f` until the resource is visible or definitively gone
///
/// For a new resource NotFound is retried with exponential backoff inside the
/// propagation window (bounded by the context deadline too); once the window
/// closes or the context is cancelled one last attempt decides. A deleted
/// status on a new resource fails at once. For an existing resource both
/// NotFound and a deleted status yield [`ReadOutcome::Gone`] without retrying.
pub async fn retry_when_new_resource_not_found<T, F, Fut>(
    ctx: &Context,
    wait: &PropagationWait,
    is_new: bool,
    mut f: F,
) -> Result<ReadOutcome<T>, ReadError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ReadError>>,
{
    let deadline = Instant::now() + wait.timeout;
    let mut backoff = wait.initial_backoff;
    let mut attempt = 0u32;

    loop {
        attempt += 1;
        if let Attempt::Done(result) = classify(f().await, is_new) {
            return result;
        }

        let mut remaining = deadline.saturating_duration_since(Instant::now());
        if let Some(ctx_remaining) = ctx.remaining() {
            remaining = remaining.min(ctx_remaining);
        }
        if remaining.is_zero() || ctx.is_cancelled() {
            break;
        }

        let delay = backoff.min(remaining);
        debug!(
            "Resource not visible yet (attempt {}), retrying in {:?}",
            attempt, delay
        );
        if !ctx.sleep(delay).await {
            break;
        }
        backoff = (backoff * 2).min(wait.max_backoff);
    }

    debug!("Propagation window closed after {} attempts", attempt);
    match classify(f().await, is_new) {
        Attempt::Done(result) => result,
        Attempt::Pending(last) => Err(ReadError::Timeout {
            last: Box::new(last),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn fast_wait(timeout_ms: u64) -> PropagationWait {
        PropagationWait {
            timeout: Duration::from_millis(timeout_ms),
            initial_backoff: Duration::from_millis(1),
            max_backoff: Duration::from_millis(4),
        }
    }

    fn not_found() -> ReadError {
        ReadError::from(ApiError::NotFound {
            message: "Mesh not found".to_string(),
        })
    }

    #[tokio::test]
    async fn new_resource_becomes_visible_after_two_not_founds() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();

        let outcome = retry_when_new_resource_not_found(
            &Context::new(),
            &fast_wait(5_000),
            true,
            || {
                let n = counter.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n < 2 {
                        Err(not_found())
                    } else {
                        Ok("visible")
                    }
                }
            },
        )
        .await
        .unwrap();

        assert!(matches!(outcome, ReadOutcome::Visible("visible")));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn existing_resource_not_found_is_gone_without_retry() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();

        let outcome: ReadOutcome<()> = retry_when_new_resource_not_found(
            &Context::new(),
            &fast_wait(5_000),
            false,
            || {
                counter.fetch_add(1, Ordering::SeqCst);
                async { Err(not_found()) }
            },
        )
        .await
        .unwrap();

        assert!(outcome.into_option().is_none());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn soft_deleted_is_gone_for_existing_but_fatal_for_new() {
        let deleted = || async {
            Err::<(), _>(ReadError::SoftDeleted {
                arn: "arn:aws:appmesh:us-west-2:123456789012:mesh/demo".to_string(),
            })
        };

        let existing =
            retry_when_new_resource_not_found(&Context::new(), &fast_wait(5_000), false, deleted)
                .await
                .unwrap();
        assert!(matches!(existing, ReadOutcome::Gone));

        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let err = retry_when_new_resource_not_found(&Context::new(), &fast_wait(5_000), true, || {
            counter.fetch_add(1, Ordering::SeqCst);
            deleted()
        })
        .await
        .unwrap_err();
        assert!(matches!(err, ReadError::SoftDeleted { .. }));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn other_errors_surface_immediately() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();

        let err = retry_when_new_resource_not_found::<(), _, _>(
            &Context::new(),
            &fast_wait(5_000),
            true,
            || {
                counter.fetch_add(1, Ordering::SeqCst);
                async {
                    Err(ReadError::from(ApiError::AuthError(
                        "The security token included in the request is invalid".to_string(),
                    )))
                }
            },
        )
        .await
        .unwrap_err();

        assert!(matches!(err, ReadError::Api(ApiError::AuthError(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn window_elapsed_runs_one_final_attempt() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();

        let err = retry_when_new_resource_not_found::<(), _, _>(
            &Context::new(),
            &fast_wait(20),
            true,
            || {
                counter.fetch_add(1, Ordering::SeqCst);
                async { Err(not_found()) }
            },
        )
        .await
        .unwrap_err();

        assert!(matches!(err, ReadError::Timeout { .. }));
        assert!(calls.load(Ordering::SeqCst) >= 2);
    }

    #[tokio::test]
    async fn cancelled_context_goes_straight_to_final_attempt() {
        let ctx = Context::new();
        ctx.cancel();

        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let err = retry_when_new_resource_not_found::<(), _, _>(
            &ctx,
            &fast_wait(60_000),
            true,
            || {
                counter.fetch_add(1, Ordering::SeqCst);
                async { Err(not_found()) }
            },
        )
        .await
        .unwrap_err();

        assert!(matches!(err, ReadError::Timeout { .. }));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn api_not_found_maps_to_read_not_found() {
        assert!(not_found().is_not_found());
        assert!(!ReadError::EmptyResult.is_gone());
        assert!(ReadError::from(ApiError::RateLimited).to_string().contains("rate limited"));
    }
}
