//! # Events emitted by the supervisor and the poll loop.
//!
//! The [`EventKind`] enum classifies event types across three categories:
//! - **Supervision events**: task runs, failure accounting, backoff, circuit breaker
//! - **Polling events**: batches, checkpoint movement, handler and transport failures
//! - **Shutdown events**: cancellation observed
//!
//! The [`Event`] struct carries additional metadata such as timestamps, task
//! name, durations and offsets. [`Event::message`] renders a one-line
//! human-readable description (used by the debug callback).
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use pollvisor::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::BackoffScheduled)
//!     .with_task("poll-loop")
//!     .with_iteration(2)
//!     .with_delay(Duration::from_secs(1));
//!
//! assert_eq!(ev.kind, EventKind::BackoffScheduled);
//! assert_eq!(ev.message(), "[poll-loop] delaying restart by 1s");
//! ```

use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Supervision events ===
    /// Task invocation is starting.
    ///
    /// Sets: `task`, `iteration`
    TaskStarting,

    /// Task invocation returned (for any reason).
    ///
    /// Sets: `task`, `iteration`, `elapsed`, `reason` (error, if any)
    TaskExited,

    /// Run was classified as a failure and counted.
    ///
    /// Sets: `task`, `iteration`, `failures` (consecutive, after increment)
    FailureCounted,

    /// Restart delayed after a failure.
    ///
    /// Sets: `task`, `iteration`, `delay`, `failures`
    BackoffScheduled,

    /// A successful run cleared a non-zero failure counter.
    ///
    /// Sets: `task`, `iteration`
    FailureCounterReset,

    /// Consecutive failures reached the threshold; the supervisor gives up.
    ///
    /// Sets: `task`, `iteration`, `failures`
    CircuitOpen,

    // === Shutdown events ===
    /// Cancellation observed; the supervisor stops without counting a failure.
    ///
    /// Sets: `task`, `iteration` (last started, if any)
    ShutdownRequested,

    // === Polling events ===
    /// A batch arrived from the transport.
    ///
    /// Sets: `task`, `offset` (requested offset), `count`
    BatchReceived,

    /// The consumption offset moved forward after a batch.
    ///
    /// Sets: `task`, `offset` (new last consumed id)
    CheckpointAdvanced,

    /// A handler returned an error for one update.
    ///
    /// Sets: `task`, `update_id`, `reason`
    HandlerFailed,

    /// Fetch or decode failed; the poll loop stops.
    ///
    /// Sets: `task`, `offset` (requested offset), `reason`
    PollFailed,
}

/// Runtime event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Name of the task, if applicable.
    pub task: Option<Arc<str>>,
    /// Supervised iteration (starting from 1).
    pub iteration: Option<u64>,
    /// How long the task invocation ran.
    pub elapsed: Option<Duration>,
    /// Restart delay.
    pub delay: Option<Duration>,
    /// Consecutive failure count.
    pub failures: Option<u32>,
    /// Consumption offset (requested or reached, depending on the kind).
    pub offset: Option<i64>,
    /// Id of the update concerned.
    pub update_id: Option<i64>,
    /// Number of items (batch size).
    pub count: Option<usize>,
    /// Human-readable reason (errors, etc.).
    pub reason: Option<Arc<str>>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            task: None,
            iteration: None,
            elapsed: None,
            delay: None,
            failures: None,
            offset: None,
            update_id: None,
            count: None,
            reason: None,
        }
    }

    /// Attaches a task name.
    #[inline]
    pub fn with_task(mut self, task: impl Into<Arc<str>>) -> Self {
        self.task = Some(task.into());
        self
    }

    /// Attaches an iteration number.
    #[inline]
    pub fn with_iteration(mut self, n: u64) -> Self {
        self.iteration = Some(n);
        self
    }

    /// Attaches the run duration.
    #[inline]
    pub fn with_elapsed(mut self, d: Duration) -> Self {
        self.elapsed = Some(d);
        self
    }

    /// Attaches a restart delay.
    #[inline]
    pub fn with_delay(mut self, d: Duration) -> Self {
        self.delay = Some(d);
        self
    }

    /// Attaches a consecutive failure count.
    #[inline]
    pub fn with_failures(mut self, n: u32) -> Self {
        self.failures = Some(n);
        self
    }

    /// Attaches an offset.
    #[inline]
    pub fn with_offset(mut self, offset: i64) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Attaches an update id.
    #[inline]
    pub fn with_update(mut self, id: i64) -> Self {
        self.update_id = Some(id);
        self
    }

    /// Attaches an item count.
    #[inline]
    pub fn with_count(mut self, n: usize) -> Self {
        self.count = Some(n);
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Renders the event as a single debug line, prefixed with the task name.
    pub fn message(&self) -> String {
        let body = match self.kind {
            EventKind::TaskStarting => match self.iteration {
                Some(n) => format!("task starting (iteration {n})"),
                None => "task starting".to_string(),
            },
            EventKind::TaskExited => {
                let elapsed = self.elapsed.unwrap_or_default();
                match &self.reason {
                    Some(r) => format!("task exited: {elapsed:?} elapsed ({r})"),
                    None => format!("task exited: {elapsed:?} elapsed"),
                }
            }
            EventKind::FailureCounted => {
                format!("failure counter: {}", self.failures.unwrap_or_default())
            }
            EventKind::BackoffScheduled => {
                format!("delaying restart by {:?}", self.delay.unwrap_or_default())
            }
            EventKind::FailureCounterReset => "failure counter reset".to_string(),
            EventKind::CircuitOpen => format!(
                "general failure after {} consecutive failures, exiting the loop",
                self.failures.unwrap_or_default()
            ),
            EventKind::ShutdownRequested => "shutdown requested".to_string(),
            EventKind::BatchReceived => format!(
                "received {} updates (offset {})",
                self.count.unwrap_or_default(),
                self.offset.unwrap_or_default()
            ),
            EventKind::CheckpointAdvanced => {
                format!("checkpoint advanced to {}", self.offset.unwrap_or_default())
            }
            EventKind::HandlerFailed => format!(
                "handler failed on update {}: {}",
                self.update_id.unwrap_or_default(),
                self.reason.as_deref().unwrap_or("unknown")
            ),
            EventKind::PollFailed => format!(
                "poll failed at offset {}: {}",
                self.offset.unwrap_or_default(),
                self.reason.as_deref().unwrap_or("unknown")
            ),
        };
        match &self.task {
            Some(task) => format!("[{task}] {body}"),
            None => body,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_numbers_increase() {
        let a = Event::new(EventKind::TaskStarting);
        let b = Event::new(EventKind::TaskStarting);
        assert!(b.seq > a.seq);
    }

    #[test]
    fn messages_render_metadata() {
        let ev = Event::new(EventKind::TaskExited)
            .with_elapsed(Duration::from_millis(1500))
            .with_reason("execution failed: refused");
        assert_eq!(
            ev.message(),
            "task exited: 1.5s elapsed (execution failed: refused)"
        );

        let ev = Event::new(EventKind::CircuitOpen)
            .with_task("poller")
            .with_failures(3);
        assert_eq!(
            ev.message(),
            "[poller] general failure after 3 consecutive failures, exiting the loop"
        );

        let ev = Event::new(EventKind::HandlerFailed)
            .with_update(9)
            .with_reason("bad payload");
        assert_eq!(ev.message(), "handler failed on update 9: bad payload");
    }
}
