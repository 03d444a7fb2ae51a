//! # Runtime configuration.
//!
//! [`SupervisorConfig`] drives the restart/circuit-breaker policy of the
//! [`Supervisor`](crate::Supervisor); [`PollConfig`] drives the long-poll
//! request of the [`PollLoop`](crate::PollLoop).
//!
//! Both are plain in-process structs: nothing here is read from files,
//! the environment or the command line.
//!
//! ## Sentinel values
//! - `minimum_success = 0s` → **no run is ever a success** (see below)
//! - `restart_delay = 0s` → restart immediately after a failure
//! - `failure_threshold = 0` → trip on the first failure
//!
//! ## Zero success floor
//! A zero `minimum_success` does **not** mean "every run succeeds": it makes the
//! success branch unreachable, so every exit counts toward the circuit breaker.
//! Callers that want "always healthy" must set a tiny positive floor instead.

use std::time::Duration;

/// Configuration of the execution supervisor.
///
/// ## Field semantics
/// - `minimum_success`: a run counts as a success only if it lasted at least this long (`0s` = never)
/// - `restart_delay`: fixed delay between a failed run and the next start (`0s` = no delay)
/// - `failure_threshold`: consecutive failures that trip the breaker (`0` behaves like `1`)
/// - `bus_capacity`: event bus ring buffer size (min 1; clamped by Bus)
#[derive(Clone, Debug)]
pub struct SupervisorConfig {
    /// Minimum run time for a task exit to be classified as a success.
    pub minimum_success: Duration,

    /// Fixed delay before restarting the task after a failure.
    pub restart_delay: Duration,

    /// This many failures in a row terminate the supervisor.
    pub failure_threshold: u32,

    /// Capacity of the event bus broadcast channel ring buffer.
    ///
    /// Slow receivers that lag behind more than `bus_capacity` events skip
    /// the oldest ones.
    pub bus_capacity: usize,
}

impl SupervisorConfig {
    /// Returns the success floor as an `Option`.
    ///
    /// - `None` → every run is classified as a failure
    /// - `Some(d)` → runs lasting at least `d` are successes
    #[inline]
    pub fn success_floor(&self) -> Option<Duration> {
        if self.minimum_success.is_zero() {
            None
        } else {
            Some(self.minimum_success)
        }
    }

    /// Returns the restart delay as an `Option` (`None` = restart immediately).
    #[inline]
    pub fn restart_delay(&self) -> Option<Duration> {
        if self.restart_delay.is_zero() {
            None
        } else {
            Some(self.restart_delay)
        }
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for SupervisorConfig {
    /// Default configuration:
    ///
    /// - `minimum_success = 60s`
    /// - `restart_delay = 5s`
    /// - `failure_threshold = 3`
    /// - `bus_capacity = 1024`
    fn default() -> Self {
        Self {
            minimum_success: Duration::from_secs(60),
            restart_delay: Duration::from_secs(5),
            failure_threshold: 3,
            bus_capacity: 1024,
        }
    }
}

/// Configuration of the long-polling loop.
#[derive(Clone, Debug)]
pub struct PollConfig {
    /// Server-side wait bound sent with every fetch.
    ///
    /// The transport is expected to return an empty batch once it elapses.
    pub wait_timeout: Duration,
}

impl PollConfig {
    /// Wait bound in whole seconds, as carried on the wire.
    #[inline]
    pub fn wait_timeout_secs(&self) -> u64 {
        self.wait_timeout.as_secs()
    }
}

impl Default for PollConfig {
    /// `wait_timeout = 30s`.
    fn default() -> Self {
        Self {
            wait_timeout: Duration::from_secs(30),
        }
    }
}
