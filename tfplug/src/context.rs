//! Request-scoped context with deadline and cancellation
//!
//! Every async trait method takes a [`Context`] as its first parameter so
//! the host can bound and cancel in-flight operations.

use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tokio::time;

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
        let (done_tx, done_rx) = watch::channel(false);

        Self {
            inner: Arc::new(ContextInner {
                deadline: None,
                done: done_rx,
                done_tx,
            }),
        }
    }

    pub fn with_timeout(self, timeout: Duration) -> Self {
        let deadline = Instant::now() + timeout;
        let (done_tx, done_rx) = watch::channel(false);

        let expiry_tx = done_tx.clone();
        tokio::spawn(async move {
            time::sleep_until(deadline.into()).await;
            let _ = expiry_tx.send(true);
        });

        Self {
            inner: Arc::new(ContextInner {
                deadline: Some(deadline),
                done: done_rx,
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

    /// A channel that flips to `true` when work done on behalf of this
    /// context should stop.
    pub fn done(&self) -> watch::Receiver<bool> {
        self.inner.done.clone()
    }

    pub fn cancel(&self) {
        let _ = self.inner.done_tx.send(true);
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}
