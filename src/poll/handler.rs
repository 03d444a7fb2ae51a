//! # Per-update processing.
//!
//! The poll loop awaits [`Handler::handle`] once per update, in arrival order,
//! with no timeout and no isolation:
//! - `Ok(())` or [`HandlerError::Failed`] → the loop moves on;
//! - [`HandlerError::Fatal`] → the loop abandons the batch and the task invocation ends;
//! - a panic unwinds out of the loop and is caught by the supervisor's runner;
//!   the update is already consumed and is not fetched again.

use std::marker::PhantomData;

use async_trait::async_trait;

use crate::error::HandlerError;
use crate::poll::update::Update;

/// Processes one update.
#[async_trait]
pub trait Handler: Send + Sync {
    /// Payload type this handler understands.
    type Payload: Send + Sync + 'static;

    /// Handles a single update.
    async fn handle(&self, update: &Update<Self::Payload>) -> Result<(), HandlerError>;
}

/// Closure-backed handler.
///
/// ```rust
/// use pollvisor::{HandlerError, HandlerFn, Update};
///
/// let handler = HandlerFn::new(|update: &Update<String>| {
///     if update.payload.is_empty() {
///         return Err(HandlerError::failed("empty text"));
///     }
///     Ok(())
/// });
/// # let _ = handler;
/// ```
pub struct HandlerFn<P, F> {
    f: F,
    _payload: PhantomData<fn(&P)>,
}

impl<P, F> HandlerFn<P, F>
where
    F: Fn(&Update<P>) -> Result<(), HandlerError>,
{
    /// Wraps a synchronous per-update closure.
    pub fn new(f: F) -> Self {
        Self {
            f,
            _payload: PhantomData,
        }
    }
}

#[async_trait]
impl<P, F> Handler for HandlerFn<P, F>
where
    P: Send + Sync + 'static,
    F: Fn(&Update<P>) -> Result<(), HandlerError> + Send + Sync + 'static,
{
    type Payload = P;

    async fn handle(&self, update: &Update<P>) -> Result<(), HandlerError> {
        (self.f)(update)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::error::TransportError;
    use crate::poll::transport::Outbound;

    /// Records replies instead of sending them.
    #[derive(Default)]
    struct Outbox {
        sent: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Outbound<String> for Outbox {
        type Ack = usize;

        async fn send(&self, message: String) -> Result<usize, TransportError> {
            let mut sent = self.sent.lock().unwrap();
            sent.push(message);
            Ok(sent.len())
        }
    }

    /// Greets the sender of every update through an [`Outbound`].
    struct Greeter {
        outbox: Arc<Outbox>,
    }

    #[async_trait]
    impl Handler for Greeter {
        type Payload = String;

        async fn handle(&self, update: &Update<String>) -> Result<(), HandlerError> {
            self.outbox
                .send(format!("Hello, {}!", update.payload))
                .await
                .map(|_| ())
                .map_err(|e| HandlerError::failed(e.to_string()))
        }
    }

    #[tokio::test]
    async fn handler_replies_through_outbound() {
        let outbox = Arc::new(Outbox::default());
        let greeter = Greeter {
            outbox: Arc::clone(&outbox),
        };

        greeter
            .handle(&Update::new(1, "ana".to_string()))
            .await
            .unwrap();

        assert_eq!(*outbox.sent.lock().unwrap(), vec!["Hello, ana!"]);
    }

    #[tokio::test]
    async fn closure_handler_reports_failures() {
        let handler = HandlerFn::new(|update: &Update<i32>| {
            if update.payload < 0 {
                Err(HandlerError::failed("negative"))
            } else {
                Ok(())
            }
        });

        assert!(handler.handle(&Update::new(1, 3)).await.is_ok());
        assert_eq!(
            handler.handle(&Update::new(2, -1)).await,
            Err(HandlerError::failed("negative"))
        );
    }
}
