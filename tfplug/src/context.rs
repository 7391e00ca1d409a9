//! Request context: deadline and cancellation
//!
//! Every provider, resource and data source call receives a [`Context`].
//! Long-running work such as polling for eventual consistency checks it
//! between attempts and stops early once the context is cancelled or its
//! deadline passes.

use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tokio::time;

/// Cancellation signal plus an optional deadline, cheap to clone
#[derive(Clone)]
pub struct Context {
    inner: Arc<ContextInner>,
}

struct ContextInner {
    deadline: Option<Instant>,
    done: watch::Receiver<bool>,
    done_tx: watch::Sender<bool>,
}

impl Context {
    pub fn new() -> Self {
        let (done_tx, done) = watch::channel(false);

        Self {
            inner: Arc::new(ContextInner {
                deadline: None,
                done,
                done_tx,
            }),
        }
    }

    /// A fresh context cancelled automatically once `timeout` elapses
    pub fn with_timeout(self, timeout: Duration) -> Self {
        let deadline = Instant::now() + timeout;
        let (done_tx, done) = watch::channel(false);

        let timer = done_tx.clone();
        tokio::spawn(async move {
            time::sleep_until(deadline.into()).await;
            let _ = timer.send(true);
        });

        Self {
            inner: Arc::new(ContextInner {
                deadline: Some(deadline),
                done,
                done_tx,
            }),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        *self.inner.done.borrow()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.inner.deadline
    }

    /// Receiver that flips to `true` on cancellation
    pub fn done(&self) -> watch::Receiver<bool> {
        self.inner.done.clone()
    }

    pub fn cancel(&self) {
        let _ = self.inner.done_tx.send(true);
    }

    /// Time left before the deadline, `None` when the context has no deadline
    pub fn remaining(&self) -> Option<Duration> {
        self.inner
            .deadline
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }

    /// Sleeps for `duration` unless the context is cancelled first.
    ///
    /// Returns `false` when the sleep was cut short by cancellation.
    pub async fn sleep(&self, duration: Duration) -> bool {
        if self.is_cancelled() {
            return false;
        }

        let mut done = self.done();
        tokio::select! {
            _ = time::sleep(duration) => true,
            _ = done.wait_for(|cancelled| *cancelled) => false,
        }
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::sleep;

    #[tokio::test]
    async fn timeout_cancels() {
        let ctx = Context::new().with_timeout(Duration::from_millis(100));
        assert!(!ctx.is_cancelled());

        sleep(Duration::from_millis(150)).await;
        assert!(ctx.is_cancelled());
    }

    #[tokio::test]
    async fn manual_cancel() {
        let ctx = Context::new();
        assert!(!ctx.is_cancelled());

        ctx.cancel();
        assert!(ctx.is_cancelled());
    }

    #[tokio::test]
    async fn sleep_completes_without_cancel() {
        let ctx = Context::new();
        assert!(ctx.sleep(Duration::from_millis(10)).await);
    }

    #[tokio::test]
    async fn sleep_stops_on_cancel() {
        let ctx = Context::new();
        let canceller = ctx.clone();
        tokio::spawn(async move {
            sleep(Duration::from_millis(20)).await;
            canceller.cancel();
        });

        let started = Instant::now();
        assert!(!ctx.sleep(Duration::from_secs(5)).await);
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn remaining_shrinks_toward_the_deadline() {
        let ctx = Context::new().with_timeout(Duration::from_secs(2));
        let remaining = ctx.remaining().unwrap();
        assert!(remaining <= Duration::from_secs(2));
        assert!(ctx.deadline().is_some());
        assert!(Context::new().remaining().is_none());
        assert!(Context::new().deadline().is_none());
    }
}
