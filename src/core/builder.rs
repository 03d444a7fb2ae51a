//! # SupervisorBuilder
//!
//! Collects subscribers (including a plain debug callback) before the
//! [`Supervisor`] is created, so observability is a constructor-level
//! decision rather than a field poked in afterwards.

use std::sync::Arc;

use crate::{
    config::SupervisorConfig,
    subscribers::{DebugFn, LogWriter, Subscribe, SubscriberSet},
};

use super::supervisor::Supervisor;

/// Builder for constructing a [`Supervisor`] with optional subscribers.
pub struct SupervisorBuilder {
    cfg: SupervisorConfig,
    subscribers: Vec<Arc<dyn Subscribe>>,
}

impl SupervisorBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: SupervisorConfig) -> Self {
        Self {
            cfg,
            subscribers: Vec::new(),
        }
    }

    /// Replaces the subscriber list.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Adds one subscriber.
    pub fn with_subscriber<S: Subscribe>(mut self, subscriber: Arc<S>) -> Self {
        self.subscribers.push(subscriber);
        self
    }

    /// Adds a debug callback receiving one rendered line per event.
    pub fn with_debug<F>(self, f: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.with_subscriber(DebugFn::arc(f))
    }

    /// Adds a [`LogWriter`] so every event is recorded through `tracing`.
    pub fn with_logging(self) -> Self {
        self.with_subscriber(Arc::new(LogWriter::new()))
    }

    /// Builds the supervisor and spawns the subscriber workers.
    ///
    /// Must be called from within a tokio runtime.
    pub fn build(self) -> Supervisor {
        let subs = SubscriberSet::new(self.subscribers);
        Supervisor::new_internal(self.cfg, subs)
    }
}
