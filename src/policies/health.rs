//! # Run classification by duration.
//!
//! A run is **healthy** only if it lasted long enough: a task that exits
//! quickly (transport outage, crash loop) is treated as a failure no matter
//! what it returned.
//!
//! ## Zero floor
//! With `minimum_success = 0` every run is a failure, including very long
//! ones. This is intentional and kept as-is; see
//! [`SupervisorConfig`](crate::SupervisorConfig).

use std::time::Duration;

use crate::config::SupervisorConfig;

/// Classification of one finished run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunVerdict {
    /// Ran at least `minimum_success`.
    Success,
    /// Exited too quickly (or the floor is zero).
    Failure,
    /// Ended by cancellation; neither success nor failure.
    Cancelled,
}

/// Duration-based health policy.
#[derive(Clone, Copy, Debug)]
pub struct HealthPolicy {
    floor: Option<Duration>,
}

impl HealthPolicy {
    /// Creates a policy with the given success floor (`0s` = nothing succeeds).
    pub fn new(minimum_success: Duration) -> Self {
        Self {
            floor: (!minimum_success.is_zero()).then_some(minimum_success),
        }
    }

    /// Classifies a non-cancelled run by its duration.
    ///
    /// # Example
    /// ```
    /// use std::time::Duration;
    /// use pollvisor::{HealthPolicy, RunVerdict};
    ///
    /// let policy = HealthPolicy::new(Duration::from_secs(5));
    /// assert_eq!(policy.classify(Duration::from_secs(6)), RunVerdict::Success);
    /// assert_eq!(policy.classify(Duration::from_secs(1)), RunVerdict::Failure);
    ///
    /// // a zero floor never yields success
    /// let policy = HealthPolicy::new(Duration::ZERO);
    /// assert_eq!(policy.classify(Duration::from_secs(3600)), RunVerdict::Failure);
    /// ```
    pub fn classify(&self, elapsed: Duration) -> RunVerdict {
        match self.floor {
            Some(floor) if elapsed >= floor => RunVerdict::Success,
            _ => RunVerdict::Failure,
        }
    }
}

impl From<&SupervisorConfig> for HealthPolicy {
    fn from(cfg: &SupervisorConfig) -> Self {
        Self::new(cfg.minimum_success)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn floor_is_inclusive() {
        let policy = HealthPolicy::new(Duration::from_secs(5));
        assert_eq!(policy.classify(Duration::from_secs(5)), RunVerdict::Success);
        assert_eq!(
            policy.classify(Duration::from_millis(4_999)),
            RunVerdict::Failure
        );
    }

    #[test]
    fn zero_floor_classifies_everything_as_failure() {
        let policy = HealthPolicy::from(&SupervisorConfig {
            minimum_success: Duration::ZERO,
            ..SupervisorConfig::default()
        });
        assert_eq!(policy.classify(Duration::ZERO), RunVerdict::Failure);
        assert_eq!(policy.classify(Duration::MAX), RunVerdict::Failure);
    }
}
