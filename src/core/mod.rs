//! Runtime core: supervision loop.
//!
//! The public API from this module is [`Supervisor`] (with its builder and
//! the [`Stopped`] result).
//!
//! Internal modules:
//! - [`runner`]: executes one invocation, measures it, catches panics;
//! - [`supervisor`]: classification, circuit breaker, fixed backoff, cancellation;
//! - [`builder`]: subscriber wiring.

mod builder;
mod runner;
mod supervisor;

pub use builder::SupervisorBuilder;
pub use supervisor::{Stopped, Supervisor};
