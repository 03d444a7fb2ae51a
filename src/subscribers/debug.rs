//! # DebugFn: plain callback sink
//!
//! Adapts a `Fn(&str)` callback into a [`Subscribe`] implementation: every
//! event is rendered with [`Event::message`] and handed to the callback.
//! Fire-and-forget; the callback runs on the subscriber's worker task.
//!
//! ```rust
//! use pollvisor::{DebugFn, SupervisorConfig, Supervisor};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let sup = Supervisor::builder(SupervisorConfig::default())
//!     .with_subscriber(DebugFn::arc(|line: &str| eprintln!("{line}")))
//!     .build();
//! # sup.shutdown().await;
//! # }
//! ```

use std::sync::Arc;

use async_trait::async_trait;

use crate::events::Event;
use crate::subscribers::Subscribe;

/// Subscriber that forwards rendered event lines to a callback.
pub struct DebugFn<F> {
    f: F,
}

impl<F> DebugFn<F>
where
    F: Fn(&str) + Send + Sync + 'static,
{
    /// Wraps `f`.
    pub fn new(f: F) -> Self {
        Self { f }
    }

    /// Wraps `f` and returns it as a shared handle.
    pub fn arc(f: F) -> Arc<Self> {
        Arc::new(Self::new(f))
    }
}

#[async_trait]
impl<F> Subscribe for DebugFn<F>
where
    F: Fn(&str) + Send + Sync + 'static,
{
    async fn on_event(&self, event: &Event) {
        (self.f)(&event.message());
    }

    fn name(&self) -> &'static str {
        "DebugFn"
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::events::EventKind;
    use crate::subscribers::SubscriberSet;

    #[tokio::test]
    async fn callback_receives_rendered_lines() {
        let lines = Arc::new(Mutex::new(Vec::<String>::new()));
        let sink = Arc::clone(&lines);
        let set = SubscriberSet::new(vec![DebugFn::arc(move |line: &str| {
            sink.lock().unwrap().push(line.to_string());
        }) as Arc<dyn Subscribe>]);

        set.emit(&Event::new(EventKind::FailureCounterReset).with_task("poller"));
        set.shutdown().await;

        assert_eq!(*lines.lock().unwrap(), vec!["[poller] failure counter reset"]);
    }
}
