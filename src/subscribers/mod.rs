//! # Event subscribers.
//!
//! This module provides the [`Subscribe`] trait and built-in implementations
//! for handling events broadcast through the [`Bus`](crate::events::Bus).
//!
//! ## Architecture
//! ```text
//! Event flow:
//!   Supervisor / PollLoop ── publish(Event) ──► Bus ──► listener ──► SubscriberSet::emit
//!                                                                      │
//!                                                        ┌─────────────┼─────────────┐
//!                                                        ▼             ▼             ▼
//!                                                    LogWriter      DebugFn       Custom
//! ```
//!
//! ## Built-in subscribers
//! - [`LogWriter`] renders events through `tracing`
//! - [`DebugFn`] forwards [`Event::message`](crate::Event::message) to a plain callback
//!
//! ## Implementing custom subscribers
//! ```no_run
//! use pollvisor::{Event, EventKind, Subscribe};
//! use async_trait::async_trait;
//!
//! struct FailureCounter;
//!
//! #[async_trait]
//! impl Subscribe for FailureCounter {
//!     async fn on_event(&self, event: &Event) {
//!         if event.kind == EventKind::FailureCounted {
//!             // increment a metric
//!         }
//!     }
//!
//!     fn name(&self) -> &'static str {
//!         "failure-counter"
//!     }
//! }
//! ```

mod debug;
mod log;
mod set;
mod subscribe;

pub use debug::DebugFn;
pub use log::LogWriter;
pub(crate) use set::panic_message;
pub use set::SubscriberSet;
pub use subscribe::Subscribe;
