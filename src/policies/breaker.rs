//! # Consecutive-failure circuit breaker.
//!
//! [`CircuitBreaker`] counts failures in a row. Once the count reaches the
//! threshold it reports [`BreakerDecision::Trip`]; a single success resets the
//! count, so non-consecutive failures never accumulate.
//!
//! A threshold of `0` trips on the first failure (`1 >= 0`).

/// What to do after a failure was recorded.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BreakerDecision {
    /// Below threshold: back off and restart.
    Retry {
        /// Consecutive failures so far.
        failures: u32,
    },
    /// Threshold reached: stop permanently.
    Trip {
        /// Consecutive failures so far.
        failures: u32,
    },
}

/// Consecutive failure counter with a fixed threshold.
#[derive(Clone, Debug)]
pub struct CircuitBreaker {
    threshold: u32,
    consecutive: u32,
}

impl CircuitBreaker {
    /// Creates a closed breaker.
    pub fn new(threshold: u32) -> Self {
        Self {
            threshold,
            consecutive: 0,
        }
    }

    /// Current consecutive failure count.
    pub fn failures(&self) -> u32 {
        self.consecutive
    }

    /// Records a failure and decides whether to retry.
    ///
    /// # Example
    /// ```
    /// use pollvisor::{BreakerDecision, CircuitBreaker};
    ///
    /// let mut breaker = CircuitBreaker::new(2);
    /// assert_eq!(breaker.record_failure(), BreakerDecision::Retry { failures: 1 });
    /// assert_eq!(breaker.record_failure(), BreakerDecision::Trip { failures: 2 });
    /// ```
    pub fn record_failure(&mut self) -> BreakerDecision {
        self.consecutive = self.consecutive.saturating_add(1);
        if self.consecutive >= self.threshold {
            BreakerDecision::Trip {
                failures: self.consecutive,
            }
        } else {
            BreakerDecision::Retry {
                failures: self.consecutive,
            }
        }
    }

    /// Records a success. Returns `true` if a non-zero counter was cleared.
    pub fn record_success(&mut self) -> bool {
        let had_failures = self.consecutive > 0;
        self.consecutive = 0;
        had_failures
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_threshold_trips_on_first_failure() {
        let mut breaker = CircuitBreaker::new(0);
        assert_eq!(breaker.record_failure(), BreakerDecision::Trip { failures: 1 });
    }

    #[test]
    fn success_resets_the_count() {
        let mut breaker = CircuitBreaker::new(3);
        assert!(!breaker.record_success());
        breaker.record_failure();
        breaker.record_failure();
        assert!(breaker.record_success());
        assert_eq!(breaker.failures(), 0);
        assert_eq!(breaker.record_failure(), BreakerDecision::Retry { failures: 1 });
        assert_eq!(breaker.record_failure(), BreakerDecision::Retry { failures: 2 });
        assert_eq!(breaker.record_failure(), BreakerDecision::Trip { failures: 3 });
    }
}
