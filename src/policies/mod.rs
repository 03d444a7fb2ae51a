//! Supervision policies.
//!
//! This module groups the knobs that decide **whether** a finished run was
//! healthy and **when** the supervisor gives up.
//!
//! ## Contents
//! - [`HealthPolicy`] classifies a run by how long it lasted
//! - [`CircuitBreaker`] counts consecutive failures and trips at a threshold
//!
//! ## Quick wiring
//! ```text
//! SupervisorConfig { minimum_success, restart_delay, failure_threshold }
//!      └─► core::Supervisor::run uses:
//!           - HealthPolicy::classify(elapsed) → Success / Failure
//!           - CircuitBreaker::record_failure() → Retry (sleep restart_delay) / Trip
//!           - CircuitBreaker::record_success() → reset
//! ```

mod breaker;
mod health;

pub use breaker::{BreakerDecision, CircuitBreaker};
pub use health::{HealthPolicy, RunVerdict};
