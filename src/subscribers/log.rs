//! # LogWriter: events as `tracing` records
//!
//! A subscriber that forwards every [`Event`] to `tracing` with structured
//! fields. Install any `tracing` subscriber (e.g. `tracing-subscriber`'s `fmt`)
//! to see the output.
//!
//! ## Levels
//! - `error`: circuit open
//! - `warn`: failure counted, handler failed, poll failed
//! - `info`: backoff, counter reset, shutdown
//! - `debug`: task starting/exited, batches, checkpoint

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Tracing-backed event writer.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let task = e.task.as_deref().unwrap_or("-");
        let reason = e.reason.as_deref();
        match e.kind {
            EventKind::TaskStarting => {
                tracing::debug!(task, iteration = ?e.iteration, "task starting");
            }
            EventKind::TaskExited => {
                tracing::debug!(task, iteration = ?e.iteration, elapsed = ?e.elapsed, reason, "task exited");
            }
            EventKind::FailureCounted => {
                tracing::warn!(task, iteration = ?e.iteration, failures = ?e.failures, "run classified as failure");
            }
            EventKind::BackoffScheduled => {
                tracing::info!(task, delay = ?e.delay, failures = ?e.failures, "delaying restart");
            }
            EventKind::FailureCounterReset => {
                tracing::info!(task, iteration = ?e.iteration, "failure counter reset");
            }
            EventKind::CircuitOpen => {
                tracing::error!(task, failures = ?e.failures, "circuit open, giving up");
            }
            EventKind::ShutdownRequested => {
                tracing::info!(task, iteration = ?e.iteration, "shutdown requested");
            }
            EventKind::BatchReceived => {
                tracing::debug!(task, offset = ?e.offset, count = ?e.count, "batch received");
            }
            EventKind::CheckpointAdvanced => {
                tracing::debug!(task, offset = ?e.offset, "checkpoint advanced");
            }
            EventKind::HandlerFailed => {
                tracing::warn!(task, update_id = ?e.update_id, reason, "handler failed");
            }
            EventKind::PollFailed => {
                tracing::warn!(task, offset = ?e.offset, reason, "poll failed");
            }
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
