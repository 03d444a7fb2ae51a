//! # Run a single task invocation.
//!
//! Executes one invocation of a [`Task`], measures how long it ran and
//! publishes [`EventKind::TaskExited`] on the [`Bus`].
//!
//! ## Rules
//! - Derives a **child token** per invocation (child cancellation never affects the parent)
//! - A panic inside the task is caught and reported as [`TaskError::Panicked`]
//! - Always publishes **exactly one** `TaskExited` event
//! - Elapsed time is measured with `tokio::time::Instant` (virtual time in paused tests)

use std::panic::AssertUnwindSafe;
use std::time::Duration;

use futures::FutureExt;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::{
    error::TaskError,
    events::{Bus, Event, EventKind},
    subscribers::panic_message,
    tasks::Task,
};

/// Outcome of one invocation.
#[derive(Debug)]
pub(crate) struct RunRecord {
    /// How long `Task::run` took.
    pub elapsed: Duration,
    /// What the task returned.
    pub result: Result<(), TaskError>,
}

/// Runs `task` once and reports how long it took.
pub(crate) async fn run_once<T: Task + ?Sized>(
    task: &mut T,
    parent: &CancellationToken,
    iteration: u64,
    bus: &Bus,
) -> RunRecord {
    let child = parent.child_token();
    let started = Instant::now();

    let result = match AssertUnwindSafe(task.run(child.clone()))
        .catch_unwind()
        .await
    {
        Ok(res) => res,
        Err(panic) => Err(TaskError::Panicked {
            reason: panic_message(panic.as_ref()),
        }),
    };
    let elapsed = started.elapsed();
    child.cancel();

    let mut ev = Event::new(EventKind::TaskExited)
        .with_task(task.name())
        .with_iteration(iteration)
        .with_elapsed(elapsed);
    if let Err(e) = &result {
        ev = ev.with_reason(e.to_string());
    }
    bus.publish(ev);

    RunRecord { elapsed, result }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::TaskFn;

    #[tokio::test(start_paused = true)]
    async fn measures_elapsed_time() {
        let bus = Bus::new(16);
        let mut rx = bus.subscribe();
        let mut task = TaskFn::new("sleeper", |_ctx: CancellationToken| async {
            tokio::time::sleep(Duration::from_secs(3)).await;
            Ok::<(), TaskError>(())
        });

        let record = run_once(&mut task, &CancellationToken::new(), 1, &bus).await;
        assert!(record.result.is_ok());
        assert!(record.elapsed >= Duration::from_secs(3));
        assert!(record.elapsed < Duration::from_secs(4));

        let ev = rx.try_recv().unwrap();
        assert_eq!(ev.kind, EventKind::TaskExited);
        assert_eq!(ev.task.as_deref(), Some("sleeper"));
        assert!(ev.reason.is_none());
    }

    #[tokio::test]
    async fn catches_panics() {
        let bus = Bus::new(16);
        let mut rx = bus.subscribe();
        fn explode() -> Result<(), TaskError> {
            panic!("handler blew up")
        }
        let mut task = TaskFn::new("crasher", |_ctx: CancellationToken| async { explode() });

        let record = run_once(&mut task, &CancellationToken::new(), 7, &bus).await;
        assert_eq!(
            record.result,
            Err(TaskError::Panicked {
                reason: "handler blew up".to_string()
            })
        );

        let ev = rx.try_recv().unwrap();
        assert_eq!(ev.iteration, Some(7));
        assert_eq!(ev.reason.as_deref(), Some("task panicked: handler blew up"));
    }

    #[tokio::test]
    async fn child_token_follows_parent() {
        let bus = Bus::new(16);
        let parent = CancellationToken::new();
        parent.cancel();
        let mut task = TaskFn::new("observer", |ctx: CancellationToken| async move {
            if ctx.is_cancelled() {
                Err(TaskError::Canceled)
            } else {
                Ok(())
            }
        });

        let record = run_once(&mut task, &parent, 1, &bus).await;
        assert_eq!(record.result, Err(TaskError::Canceled));
    }
}
