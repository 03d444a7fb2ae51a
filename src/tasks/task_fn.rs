//! # Closure-backed task (`TaskFn`)
//!
//! [`TaskFn`] wraps a closure `F: FnMut(CancellationToken) -> Fut`, producing a
//! fresh future per invocation. The closure may keep state between invocations
//! (the supervisor holds it exclusively).
//!
//! ## Example
//! ```rust
//! use tokio_util::sync::CancellationToken;
//! use pollvisor::{Task, TaskError, TaskFn};
//!
//! let t = TaskFn::new("worker", |ctx: CancellationToken| async move {
//!     if ctx.is_cancelled() {
//!         return Err(TaskError::Canceled);
//!     }
//!     Ok(())
//! });
//!
//! assert_eq!(t.name(), "worker");
//! ```

use std::borrow::Cow;
use std::future::Future;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::TaskError;
use crate::tasks::task::Task;

/// Function-backed task implementation.
pub struct TaskFn<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F> TaskFn<F> {
    /// Creates a new function-backed task.
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }
}

#[async_trait]
impl<F, Fut> Task for TaskFn<F>
where
    F: FnMut(CancellationToken) -> Fut + Send + 'static,
    Fut: Future<Output = Result<(), TaskError>> + Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&mut self, ctx: CancellationToken) -> Result<(), TaskError> {
        (self.f)(ctx).await
    }
}
