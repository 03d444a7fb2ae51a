//! # pollvisor
//!
//! **Pollvisor** keeps a long-polling ingestion loop alive.
//!
//! It provides two cooperating pieces: a [`Supervisor`] that restarts a task
//! with a fixed delay and gives up through a consecutive-failure circuit
//! breaker, and a checkpointed [`PollLoop`] that fetches update batches from a
//! remote [`Transport`] and hands each update to a [`Handler`].
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌───────────────┐        ┌───────────────┐
//!     │   Transport   │        │    Handler    │
//!     │ (fetch_batch) │        │   (handle)    │
//!     └───────┬───────┘        └───────┬───────┘
//!             ▼                        ▼
//!     ┌─────────────────────────────────────────┐
//!     │  PollLoop (Task)                        │
//!     │  - Checkpoint (highest consumed id)     │
//!     │  - publishes BatchReceived, HandlerFailed,
//!     │    CheckpointAdvanced, PollFailed       │
//!     └───────────────────┬─────────────────────┘
//!                         │ &mut borrow, one invocation at a time
//!                         ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Supervisor                                                       │
//! │  - HealthPolicy (duration-based success/failure)                  │
//! │  - CircuitBreaker (consecutive failures vs threshold)             │
//! │  - publishes TaskStarting, TaskExited, FailureCounted,            │
//! │    BackoffScheduled, FailureCounterReset, CircuitOpen, Shutdown   │
//! └─────────────────────────────────┬─────────────────────────────────┘
//!                                   ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │                        Bus (broadcast channel)                    │
//! │              (capacity: SupervisorConfig::bus_capacity)           │
//! └─────────────────────────────────┬─────────────────────────────────┘
//!                                   ▼
//!                       ┌────────────────────────┐
//!                       │  subscriber_listener   │
//!                       │   (in Supervisor)      │
//!                       └───────────┬────────────┘
//!                                   ▼
//!                             SubscriberSet
//!                            (per-sub queues)
//!                         ┌─────────┼─────────┐
//!                         ▼         ▼         ▼
//!                     LogWriter  DebugFn    Custom
//! ```
//!
//! ### Lifecycle
//! ```text
//! loop {
//!   ├─► token cancelled? ─► ShutdownRequested, Ok(Stopped)
//!   ├─► publish TaskStarting{ iteration }
//!   ├─► run_once(poll_loop)
//!   │     └─ loop { fetch(offset = last + 1) ─► handle each update ─► advance checkpoint }
//!   │        until transport error, fatal handler error, panic or cancellation
//!   ├─► publish TaskExited{ elapsed }
//!   └─► elapsed ≥ minimum_success ?
//!         ├─ yes ─► reset failure counter
//!         └─ no  ─► failures += 1
//!                   ├─ failures ≥ threshold ─► CircuitOpen, Err(RuntimeError::CircuitOpen)
//!                   └─ otherwise            ─► sleep(restart_delay) (cancellable)
//! }
//! ```
//!
//! A zero `minimum_success` makes every run a failure, so the supervisor
//! always ends in [`RuntimeError::CircuitOpen`] unless cancelled.
//!
//! ## Features
//! | Area              | Description                                                  | Key types / traits                          |
//! |-------------------|--------------------------------------------------------------|---------------------------------------------|
//! | **Supervision**   | Restart a task, count short runs, trip a breaker.            | [`Supervisor`], [`SupervisorBuilder`]       |
//! | **Polling**       | Checkpointed long polling with ordered dispatch.             | [`PollLoop`], [`Transport`], [`Handler`]    |
//! | **Policies**      | Duration classification and consecutive-failure breaker.     | [`HealthPolicy`], [`CircuitBreaker`]        |
//! | **Subscriber API**| Hook into runtime events (logging, debug lines, custom).     | [`Subscribe`], [`LogWriter`], [`DebugFn`]   |
//! | **Errors**        | Typed errors for every layer.                                | [`RuntimeError`], [`PollError`], ...        |
//! | **Configuration** | In-process settings with defaults.                           | [`SupervisorConfig`], [`PollConfig`]        |
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use tokio_util::sync::CancellationToken;
//! use pollvisor::{Supervisor, SupervisorConfig, RuntimeError, TaskError, TaskFn};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let cfg = SupervisorConfig {
//!         minimum_success: Duration::from_secs(5),
//!         restart_delay: Duration::ZERO,
//!         failure_threshold: 2,
//!         ..SupervisorConfig::default()
//!     };
//!     let sup = Supervisor::builder(cfg)
//!         .with_debug(|line: &str| println!("{line}"))
//!         .build();
//!
//!     // Exits immediately: every run is too short to count as a success.
//!     let mut task = TaskFn::new("flaky", |_ctx: CancellationToken| async {
//!         Err::<(), _>(TaskError::Fail { error: "boom".into() })
//!     });
//!
//!     let res = sup.run(&mut task, &CancellationToken::new()).await;
//!     assert_eq!(res, Err(RuntimeError::CircuitOpen { failures: 2, iterations: 2 }));
//!     sup.shutdown().await;
//! }
//! ```
mod config;
mod core;
mod error;
mod events;
mod policies;
pub mod poll;
mod subscribers;
mod tasks;

// ---- Public re-exports ----

pub use config::{PollConfig, SupervisorConfig};
pub use core::{Stopped, Supervisor, SupervisorBuilder};
pub use error::{HandlerError, PollError, RuntimeError, TaskError, TransportError};
pub use events::{Bus, Event, EventKind};
pub use policies::{BreakerDecision, CircuitBreaker, HealthPolicy, RunVerdict};
pub use poll::{
    decode, Batch, Checkpoint, FetchRequest, Handler, HandlerFn, Outbound, PollLoop, PollReport,
    Transport, Update,
};
pub use subscribers::{DebugFn, LogWriter, Subscribe, SubscriberSet};
pub use tasks::{Task, TaskFn};
