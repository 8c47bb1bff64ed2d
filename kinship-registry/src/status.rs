//! Transient status notices
//!
//! Surfaces human-readable progress/success/error notifications driven by
//! orchestrator transitions. Ephemeral: one notice visible at a time, a
//! new notice replaces the prior one immediately, success and error
//! notices auto-dismiss after a fixed interval. No durable state.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::debug;

/// Kind of a status notice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    /// An operation is in progress; persists until replaced
    Pending,
    /// An operation completed; auto-dismissed after 2s
    Success,
    /// An operation failed; auto-dismissed after 3s
    Error,
}

/// A single transient notice
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusNotice {
    pub kind: StatusKind,
    pub message: String,
}

/// Publisher of transient status notices
///
/// Observers subscribe through a `watch` channel and see `None` when no
/// notice is visible. Dismissal is generation-checked so a stale timer
/// from a replaced notice never clears a newer one.
#[derive(Clone)]
pub struct StatusReporter {
    tx: watch::Sender<Option<StatusNotice>>,
    generation: Arc<AtomicU64>,
    success_dismiss: Duration,
    error_dismiss: Duration,
}

impl StatusReporter {
    /// Create a reporter with the default dismiss intervals
    pub fn new() -> Self {
        Self::with_dismiss(Duration::from_secs(2), Duration::from_secs(3))
    }

    /// Create a reporter with custom dismiss intervals (tests shorten them)
    pub fn with_dismiss(success_dismiss: Duration, error_dismiss: Duration) -> Self {
        let (tx, _rx) = watch::channel(None);
        Self {
            tx,
            generation: Arc::new(AtomicU64::new(0)),
            success_dismiss,
            error_dismiss,
        }
    }

    /// Subscribe to notice changes
    pub fn subscribe(&self) -> watch::Receiver<Option<StatusNotice>> {
        self.tx.subscribe()
    }

    /// The currently visible notice, if any
    pub fn current(&self) -> Option<StatusNotice> {
        self.tx.borrow().clone()
    }

    /// Show a pending notice; stays visible until replaced
    pub fn pending(&self, message: impl Into<String>) {
        self.publish(StatusKind::Pending, message.into());
    }

    /// Show a success notice, auto-dismissed
    pub fn success(&self, message: impl Into<String>) {
        self.publish(StatusKind::Success, message.into());
    }

    /// Show an error notice, auto-dismissed
    pub fn error(&self, message: impl Into<String>) {
        self.publish(StatusKind::Error, message.into());
    }

    fn publish(&self, kind: StatusKind, message: String) {
        debug!(?kind, %message, "Status notice");
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.tx.send_replace(Some(StatusNotice { kind, message }));

        let dismiss_after = match kind {
            StatusKind::Pending => return,
            StatusKind::Success => self.success_dismiss,
            StatusKind::Error => self.error_dismiss,
        };

        let tx = self.tx.clone();
        let generations = Arc::clone(&self.generation);
        tokio::spawn(async move {
            tokio::time::sleep(dismiss_after).await;
            // Only dismiss if no newer notice replaced this one
            if generations.load(Ordering::SeqCst) == generation {
                tx.send_replace(None);
            }
        });
    }
}

impl Default for StatusReporter {
    fn default() -> Self {
        Self::new()
    }
}
