//! # Task abstraction.
//!
//! A [`Task`] is the unit of work the [`Supervisor`](crate::Supervisor) times and
//! restarts. The supervisor borrows it mutably for its whole run, so state kept
//! inside the task (such as a poll checkpoint) survives restarts without locks.
//!
//! A task receives a [`CancellationToken`] and should exit promptly once it fires,
//! returning [`TaskError::Canceled`].

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::TaskError;

/// # Asynchronous, cancelable unit of work.
///
/// # Example
/// ```
/// use tokio_util::sync::CancellationToken;
/// use async_trait::async_trait;
/// use pollvisor::{Task, TaskError};
///
/// struct Counter {
///     runs: u32,
/// }
///
/// #[async_trait]
/// impl Task for Counter {
///     fn name(&self) -> &str { "counter" }
///
///     async fn run(&mut self, ctx: CancellationToken) -> Result<(), TaskError> {
///         if ctx.is_cancelled() {
///             return Err(TaskError::Canceled);
///         }
///         self.runs += 1;
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Task: Send {
    /// Returns a stable, human-readable task name.
    fn name(&self) -> &str;

    /// Runs one invocation of the task until it decides to return.
    ///
    /// The supervisor never calls `run` concurrently with itself.
    async fn run(&mut self, ctx: CancellationToken) -> Result<(), TaskError>;
}
