//! # Checkpointed long polling.
//!
//! The poll loop repeatedly asks a [`Transport`] for updates newer than the
//! last consumed offset, hands each one to a [`Handler`] and moves the
//! [`Checkpoint`] forward.
//!
//! ```text
//!   PollLoop::poll_once
//!     ├─► FetchRequest { offset: last + 1, timeout }  ──► Transport::fetch_batch (cancellable)
//!     │        └─ Err ──► PollFailed, Err(PollError::Transport)   (offset unchanged)
//!     └─► for update in batch (arrival order):
//!            ├─► checkpoint.observe(update.id)      (unconditional, max)
//!            ├─► Handler::handle(&update)
//!            └─► Failed → HandlerFailed, continue │ Fatal → Err(PollError::HandlerFault)
//! ```
//!
//! Delivery is at-least-once from the transport's point of view, but a failed
//! update is still consumed: there is no redelivery and no dead-letter path.
//!
//! ## Contents
//! - [`Update`], [`Batch`] data model
//! - [`Transport`], [`FetchRequest`], [`Outbound`] remote capabilities
//! - [`Handler`], [`HandlerFn`] per-update processing
//! - [`Checkpoint`] forward-only offset
//! - [`PollLoop`] the loop itself (also a [`Task`](crate::Task))
//! - [`decode`] schema-checked response decoding

mod checkpoint;
pub mod decode;
mod handler;
mod poll_loop;
mod transport;
mod update;

pub use checkpoint::Checkpoint;
pub use handler::{Handler, HandlerFn};
pub use poll_loop::{PollLoop, PollReport};
pub use transport::{FetchRequest, Outbound, Transport};
pub use update::{Batch, Update};
