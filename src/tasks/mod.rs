//! # Task abstractions.
//!
//! - [`Task`] - trait for implementing async cancelable units the supervisor restarts
//! - [`TaskFn`] - closure-backed task implementation

mod task;
mod task_fn;

pub use task::Task;
pub use task_fn::TaskFn;
