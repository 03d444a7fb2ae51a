//! # Checkpointed long-poll loop.
//!
//! [`PollLoop`] owns a [`Transport`], a [`Handler`] and the [`Checkpoint`].
//! One call to [`PollLoop::poll_once`] performs one fetch and dispatches the
//! whole batch; [`Task::run`] repeats it until something goes wrong.
//!
//! ## Rules
//! - Every fetch asks for `last_offset + 1`; the long-poll wait races the cancellation token.
//! - A transport error leaves the offset untouched.
//! - Items are handled in arrival order; the offset becomes `max(offset, id)`
//!   before the handler sees the item, so no handler outcome causes redelivery.
//! - [`HandlerError::Failed`] is reported and skipped; [`HandlerError::Fatal`]
//!   abandons the rest of the batch and ends the invocation.
//! - A handler panic unwinds out of the loop with the offset already past that item.
//!
//! The checkpoint lives in the `PollLoop` value, so it survives supervisor
//! restarts of the same loop (the supervisor borrows it mutably across
//! iterations) but not process restarts.

use std::borrow::Cow;

use async_trait::async_trait;
use tokio::select;
use tokio_util::sync::CancellationToken;

use crate::{
    config::PollConfig,
    error::{HandlerError, PollError, TaskError},
    events::{Bus, Event, EventKind},
    poll::{
        checkpoint::Checkpoint,
        handler::Handler,
        transport::{FetchRequest, Transport},
    },
    tasks::Task,
};

/// Result of one successful [`PollLoop::poll_once`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PollReport {
    /// Number of updates handed to the handler.
    pub dispatched: usize,
    /// Checkpoint after the batch.
    pub offset: i64,
}

/// Long-polls a transport and dispatches updates to a handler.
///
/// # Example
/// ```no_run
/// use pollvisor::{
///     Batch, FetchRequest, HandlerFn, PollConfig, PollLoop, Supervisor, SupervisorConfig,
///     Transport, TransportError, Update,
/// };
/// use async_trait::async_trait;
/// use tokio_util::sync::CancellationToken;
///
/// struct Remote;
///
/// #[async_trait]
/// impl Transport for Remote {
///     type Payload = String;
///
///     async fn fetch_batch(&self, _req: FetchRequest) -> Result<Batch<String>, TransportError> {
///         Ok(Batch::empty())
///     }
/// }
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let sup = Supervisor::new(SupervisorConfig::default());
/// let handler = HandlerFn::new(|update: &Update<String>| {
///     println!("{}: {}", update.id, update.payload);
///     Ok(())
/// });
/// let mut poller = PollLoop::new(Remote, handler, PollConfig::default())
///     .with_bus(sup.bus().clone());
///
/// let _ = sup.run(&mut poller, &CancellationToken::new()).await;
/// sup.shutdown().await;
/// # }
/// ```
pub struct PollLoop<T, H> {
    name: Cow<'static, str>,
    transport: T,
    handler: H,
    cfg: PollConfig,
    checkpoint: Checkpoint,
    bus: Option<Bus>,
}

impl<T, H> PollLoop<T, H>
where
    T: Transport,
    H: Handler<Payload = T::Payload>,
{
    /// Creates a loop starting at offset 0, publishing no events.
    pub fn new(transport: T, handler: H, cfg: PollConfig) -> Self {
        Self {
            name: Cow::Borrowed("poll-loop"),
            transport,
            handler,
            cfg,
            checkpoint: Checkpoint::new(),
            bus: None,
        }
    }

    /// Publishes poll events on `bus` (usually [`Supervisor::bus`](crate::Supervisor::bus)).
    pub fn with_bus(mut self, bus: Bus) -> Self {
        self.bus = Some(bus);
        self
    }

    /// Sets the name used as the task name and in events.
    pub fn with_name(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.name = name.into();
        self
    }

    /// Highest update id consumed so far.
    pub fn last_offset(&self) -> i64 {
        self.checkpoint.last()
    }

    /// Name used as the task name and in events (`"poll-loop"` by default).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fetches one batch and dispatches it.
    ///
    /// Returns `Ok` when polling should continue and `Err` when the current
    /// task invocation must end.
    pub async fn poll_once(&mut self, ctx: &CancellationToken) -> Result<PollReport, PollError> {
        let request = FetchRequest {
            offset: self.checkpoint.next_request(),
            timeout: self.cfg.wait_timeout_secs(),
        };

        let fetched = select! {
            biased;
            _ = ctx.cancelled() => return Err(PollError::Cancelled),
            res = self.transport.fetch_batch(request) => res,
        };
        let batch = match fetched {
            Ok(batch) => batch,
            Err(e) => {
                self.emit(
                    Event::new(EventKind::PollFailed)
                        .with_offset(request.offset)
                        .with_reason(e.to_string()),
                );
                return Err(e.into());
            }
        };
        self.emit(
            Event::new(EventKind::BatchReceived)
                .with_offset(request.offset)
                .with_count(batch.len()),
        );

        let before = self.checkpoint.last();
        let mut dispatched = 0;
        let mut fault = None;
        for update in &batch.items {
            self.checkpoint.observe(update.id);
            dispatched += 1;
            let outcome = self.handler.handle(update).await;

            let Err(err) = outcome else { continue };
            self.emit(
                Event::new(EventKind::HandlerFailed)
                    .with_update(update.id)
                    .with_reason(err.to_string()),
            );
            if let HandlerError::Fatal { reason } = err {
                fault = Some(PollError::HandlerFault {
                    update_id: update.id,
                    reason,
                });
                break;
            }
        }

        let offset = self.checkpoint.last();
        if offset != before {
            self.emit(Event::new(EventKind::CheckpointAdvanced).with_offset(offset));
        }

        match fault {
            Some(e) => Err(e),
            None => Ok(PollReport { dispatched, offset }),
        }
    }

    fn emit(&self, ev: Event) {
        if let Some(bus) = &self.bus {
            bus.publish(ev.with_task(self.name.as_ref()));
        }
    }
}

#[async_trait]
impl<T, H> Task for PollLoop<T, H>
where
    T: Transport,
    H: Handler<Payload = T::Payload>,
{
    fn name(&self) -> &str {
        &self.name
    }

    /// Polls until cancelled or until a poll fails.
    async fn run(&mut self, ctx: CancellationToken) -> Result<(), TaskError> {
        loop {
            self.poll_once(&ctx).await?;
        }
    }
}
