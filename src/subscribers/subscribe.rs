//! # Subscriber trait
//!
//! Anything that wants to observe the supervisor or the poll loop implements
//! [`Subscribe`] and is registered through
//! [`SupervisorBuilder`](crate::SupervisorBuilder).
//!
//! Events reach a subscriber through its own bounded queue and worker task
//! (see [`SubscriberSet`](crate::SubscriberSet)), in publication order. A slow
//! subscriber only delays itself; when its queue is full, further events for it
//! are dropped with a `tracing` warning. A panic in `on_event` is logged and the
//! worker keeps going.

use async_trait::async_trait;

use crate::events::Event;

/// Queue length used when a subscriber does not pick its own.
pub(crate) const DEFAULT_QUEUE_CAPACITY: usize = 1024;

/// Observer of runtime events.
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Called once per event, never concurrently for the same subscriber.
    async fn on_event(&self, event: &Event);

    /// Name used in overflow and panic warnings.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Capacity of the queue feeding this subscriber.
    fn queue_capacity(&self) -> usize {
        DEFAULT_QUEUE_CAPACITY
    }
}
