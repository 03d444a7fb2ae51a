//! Error types used by the supervisor, the poll loop and tasks.
//!
//! - [`RuntimeError`]: terminal result of the supervisor itself (circuit breaker tripped).
//! - [`TaskError`]: how a single task invocation ended.
//! - [`PollError`]: why a poll loop invocation stopped.
//! - [`TransportError`]: fetch/send/decode failures of the remote transport.
//! - [`HandlerError`]: failures inside per-update processing.
//!
//! Every enum provides `as_label` (stable snake_case for logs/metrics).

use thiserror::Error;

/// # Terminal errors produced by the supervisor.
///
/// The supervisor only returns an error when it gives up. Cancellation is
/// not an error (see [`Stopped`](crate::Stopped)).
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuntimeError {
    /// Consecutive failures reached the configured threshold; the task will not be restarted.
    #[error("circuit open after {failures} consecutive failures ({iterations} iterations)")]
    CircuitOpen {
        /// Consecutive failures counted when the breaker tripped.
        failures: u32,
        /// Total number of task invocations in this run.
        iterations: u64,
    },
}

impl RuntimeError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use pollvisor::RuntimeError;
    ///
    /// let err = RuntimeError::CircuitOpen { failures: 3, iterations: 6 };
    /// assert_eq!(err.as_label(), "runtime_circuit_open");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::CircuitOpen { .. } => "runtime_circuit_open",
        }
    }
}

/// # How a task invocation ended.
///
/// The supervisor classifies runs by duration only; the variant matters just
/// for [`TaskError::Canceled`], which is never counted as a failure.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TaskError {
    /// Task execution ended with an error.
    #[error("execution failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// Task panicked; the panic was caught by the runner.
    #[error("task panicked: {reason}")]
    Panicked {
        /// Panic payload, when it was a string.
        reason: String,
    },

    /// Task was cancelled due to parent context shutdown.
    #[error("context cancelled")]
    Canceled,
}

impl TaskError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use pollvisor::TaskError;
    ///
    /// let err = TaskError::Fail { error: "boom".into() };
    /// assert_eq!(err.as_label(), "task_failed");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            TaskError::Fail { .. } => "task_failed",
            TaskError::Panicked { .. } => "task_panicked",
            TaskError::Canceled => "task_canceled",
        }
    }
}

/// # Errors produced by the remote transport.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum TransportError {
    /// The request could not be performed (connection, TLS, HTTP status...).
    #[error("request failed: {reason}")]
    Request {
        /// Transport-specific description.
        reason: String,
    },

    /// The response did not match the expected shape.
    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),

    /// The remote answered with `ok: false`.
    #[error("remote rejected request: {description}")]
    Rejected {
        /// Description supplied by the remote, if any.
        description: String,
    },
}

impl TransportError {
    /// Shorthand for [`TransportError::Request`].
    pub fn request(reason: impl Into<String>) -> Self {
        TransportError::Request {
            reason: reason.into(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            TransportError::Request { .. } => "transport_request",
            TransportError::Decode(_) => "transport_decode",
            TransportError::Rejected { .. } => "transport_rejected",
        }
    }
}

/// # Errors produced by update handlers.
///
/// [`HandlerError::Failed`] is swallowed by the poll loop (the update is still
/// consumed); [`HandlerError::Fatal`] ends the current task invocation.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HandlerError {
    /// Processing failed; the loop moves on to the next update.
    #[error("handler failed: {reason}")]
    Failed {
        /// The underlying error message.
        reason: String,
    },

    /// Unrecoverable fault; the loop stops processing the batch.
    #[error("handler fault: {reason}")]
    Fatal {
        /// The underlying error message.
        reason: String,
    },
}

impl HandlerError {
    /// Shorthand for [`HandlerError::Failed`].
    pub fn failed(reason: impl Into<String>) -> Self {
        HandlerError::Failed {
            reason: reason.into(),
        }
    }

    /// Shorthand for [`HandlerError::Fatal`].
    pub fn fatal(reason: impl Into<String>) -> Self {
        HandlerError::Fatal {
            reason: reason.into(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            HandlerError::Failed { .. } => "handler_failed",
            HandlerError::Fatal { .. } => "handler_fatal",
        }
    }
}

/// # Why a poll loop invocation stopped.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum PollError {
    /// Fetch or decode failed; the offset was left unchanged.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A handler reported an unrecoverable fault.
    #[error("handler fault on update {update_id}: {reason}")]
    HandlerFault {
        /// Id of the update being processed.
        update_id: i64,
        /// The underlying error message.
        reason: String,
    },

    /// The cancellation token fired during the long-poll wait.
    #[error("poll cancelled")]
    Cancelled,
}

impl PollError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            PollError::Transport(e) => e.as_label(),
            PollError::HandlerFault { .. } => "poll_handler_fault",
            PollError::Cancelled => "poll_cancelled",
        }
    }
}

impl From<PollError> for TaskError {
    fn from(err: PollError) -> Self {
        match err {
            PollError::Cancelled => TaskError::Canceled,
            other => TaskError::Fail {
                error: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn poll_cancellation_maps_to_task_canceled() {
        assert_eq!(TaskError::from(PollError::Cancelled), TaskError::Canceled);
    }

    #[test]
    fn poll_failures_map_to_task_fail() {
        let err = TaskError::from(PollError::Transport(TransportError::request("refused")));
        assert_eq!(
            err,
            TaskError::Fail {
                error: "request failed: refused".to_string()
            }
        );

        let err = TaskError::from(PollError::HandlerFault {
            update_id: 9,
            reason: "boom".into(),
        });
        assert_eq!(err.as_label(), "task_failed");
    }

    #[test]
    fn labels_follow_inner_transport_error() {
        let err = PollError::from(TransportError::Rejected {
            description: "Unauthorized".into(),
        });
        assert_eq!(err.as_label(), "transport_rejected");
        assert_eq!(HandlerError::fatal("x").as_label(), "handler_fatal");
        assert_eq!(HandlerError::failed("x").as_label(), "handler_failed");
    }
}
