//! # Supervisor: restarts a task under a fixed-backoff circuit breaker.
//!
//! The [`Supervisor`] owns the event bus, the subscriber fan-out and the
//! [`SupervisorConfig`]. [`Supervisor::run`] invokes one task over and over,
//! timing each invocation:
//!
//! ```text
//! loop {
//!   ├─► token cancelled?            → ShutdownRequested, Ok(Stopped)
//!   ├─► publish TaskStarting{ iteration }
//!   ├─► run_once(task) ──► elapsed  → publish TaskExited{ elapsed }
//!   ├─► classify:
//!   │     ├─ Cancelled                → ShutdownRequested, Ok(Stopped)
//!   │     ├─ Success (elapsed ≥ floor) → reset counter (FailureCounterReset if it was > 0)
//!   │     └─ Failure                  → FailureCounted{ failures }
//!   │            ├─ failures ≥ threshold → CircuitOpen, Err(RuntimeError::CircuitOpen)
//!   │            └─ otherwise            → BackoffScheduled{ delay }, sleep(delay) (cancellable)
//! }
//! ```
//!
//! ## Rules
//! - The task is **never** run concurrently with itself.
//! - Only the **duration** of a run decides success or failure; its error value does not.
//! - A zero `minimum_success` classifies every run as a failure.
//! - No sleep after the failure that trips the breaker.
//! - Cancellation is never counted as a failure.
//! - With a zero `restart_delay` the loop yields between runs so subscribers keep up.
//!
//! ## Event flow
//! ```text
//!   Supervisor::run ── publish(Event) ──► Bus ──► listener ──► SubscriberSet::emit(&Event)
//!   PollLoop        ── publish(Event) ──┘  └────► Bus::subscribe() receivers
//! ```

use std::sync::Arc;

use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tokio::task::JoinHandle;
use tokio::{select, time};
use tokio_util::sync::CancellationToken;

use crate::{
    config::SupervisorConfig,
    core::{builder::SupervisorBuilder, runner::run_once},
    error::{RuntimeError, TaskError},
    events::{Bus, Event, EventKind},
    policies::{BreakerDecision, CircuitBreaker, HealthPolicy, RunVerdict},
    subscribers::SubscriberSet,
    tasks::Task,
};

/// How a supervised run ended when it did not give up.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Stopped {
    /// Number of task invocations started.
    pub iterations: u64,
}

/// Restarts a task until the circuit breaker trips or the token is cancelled.
pub struct Supervisor {
    cfg: SupervisorConfig,
    bus: Bus,
    listener: Option<JoinHandle<SubscriberSet>>,
    listener_stop: CancellationToken,
}

impl Supervisor {
    /// Returns a builder for attaching subscribers or a debug callback.
    pub fn builder(cfg: SupervisorConfig) -> SupervisorBuilder {
        SupervisorBuilder::new(cfg)
    }

    /// Creates a supervisor without subscribers.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(cfg: SupervisorConfig) -> Self {
        SupervisorBuilder::new(cfg).build()
    }

    pub(crate) fn new_internal(cfg: SupervisorConfig, subs: SubscriberSet) -> Self {
        let bus = Bus::new(cfg.bus_capacity_clamped());
        let listener_stop = CancellationToken::new();
        let listener = subscriber_listener(&bus, subs, listener_stop.clone());
        Self {
            cfg,
            bus,
            listener: Some(listener),
            listener_stop,
        }
    }

    /// The configuration this supervisor runs with.
    pub fn config(&self) -> &SupervisorConfig {
        &self.cfg
    }

    /// The event bus; hand a clone to components that should publish alongside the supervisor.
    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    /// Runs `task` until the circuit breaker trips or `token` is cancelled.
    ///
    /// Returns `Ok(Stopped)` on cancellation and
    /// `Err(RuntimeError::CircuitOpen)` once `failure_threshold` consecutive
    /// runs were classified as failures.
    ///
    /// # Example
    /// ```rust
    /// use std::time::Duration;
    /// use tokio_util::sync::CancellationToken;
    /// use pollvisor::{RuntimeError, Supervisor, SupervisorConfig, TaskError, TaskFn};
    ///
    /// # #[tokio::main(flavor = "current_thread")]
    /// # async fn main() {
    /// let cfg = SupervisorConfig {
    ///     minimum_success: Duration::from_secs(5),
    ///     restart_delay: Duration::ZERO,
    ///     failure_threshold: 2,
    ///     ..SupervisorConfig::default()
    /// };
    /// let sup = Supervisor::new(cfg);
    ///
    /// // exits immediately: every run is a failure
    /// let mut task = TaskFn::new("flaky", |_ctx: CancellationToken| async {
    ///     Err::<(), _>(TaskError::Fail { error: "connection refused".into() })
    /// });
    ///
    /// let res = sup.run(&mut task, &CancellationToken::new()).await;
    /// assert_eq!(res, Err(RuntimeError::CircuitOpen { failures: 2, iterations: 2 }));
    /// sup.shutdown().await;
    /// # }
    /// ```
    pub async fn run<T: Task + ?Sized>(
        &self,
        task: &mut T,
        token: &CancellationToken,
    ) -> Result<Stopped, RuntimeError> {
        let name: Arc<str> = Arc::from(task.name());
        let health = HealthPolicy::from(&self.cfg);
        let mut breaker = CircuitBreaker::new(self.cfg.failure_threshold);
        let mut iteration: u64 = 0;

        loop {
            if token.is_cancelled() {
                return Ok(self.stopped(&name, iteration));
            }

            iteration += 1;
            self.bus.publish(
                Event::new(EventKind::TaskStarting)
                    .with_task(name.clone())
                    .with_iteration(iteration),
            );

            let record = run_once(task, token, iteration, &self.bus).await;
            let cancelled =
                token.is_cancelled() || matches!(record.result, Err(TaskError::Canceled));
            let verdict = if cancelled {
                RunVerdict::Cancelled
            } else {
                health.classify(record.elapsed)
            };

            match verdict {
                RunVerdict::Cancelled => return Ok(self.stopped(&name, iteration)),
                RunVerdict::Success => {
                    if breaker.record_success() {
                        self.bus.publish(
                            Event::new(EventKind::FailureCounterReset)
                                .with_task(name.clone())
                                .with_iteration(iteration),
                        );
                    }
                }
                RunVerdict::Failure => {
                    let decision = breaker.record_failure();
                    self.bus.publish(
                        Event::new(EventKind::FailureCounted)
                            .with_task(name.clone())
                            .with_iteration(iteration)
                            .with_failures(breaker.failures()),
                    );

                    match decision {
                        BreakerDecision::Trip { failures } => {
                            self.bus.publish(
                                Event::new(EventKind::CircuitOpen)
                                    .with_task(name.clone())
                                    .with_iteration(iteration)
                                    .with_failures(failures),
                            );
                            return Err(RuntimeError::CircuitOpen {
                                failures,
                                iterations: iteration,
                            });
                        }
                        BreakerDecision::Retry { failures } => {
                            self.bus.publish(
                                Event::new(EventKind::BackoffScheduled)
                                    .with_task(name.clone())
                                    .with_iteration(iteration)
                                    .with_delay(self.cfg.restart_delay)
                                    .with_failures(failures),
                            );

                            match self.cfg.restart_delay() {
                                Some(delay) => {
                                    let sleep = time::sleep(delay);
                                    tokio::pin!(sleep);
                                    select! {
                                        _ = &mut sleep => {}
                                        _ = token.cancelled() => {
                                            return Ok(self.stopped(&name, iteration));
                                        }
                                    }
                                }
                                // Let the listener drain the bus before the next run.
                                None => tokio::task::yield_now().await,
                            }
                        }
                    }
                }
            }
        }
    }

    /// Flushes pending events to all subscribers and stops their workers.
    ///
    /// Dropping the supervisor without calling this stops the listener too,
    /// but events still queued for subscribers may be lost.
    pub async fn shutdown(mut self) {
        self.listener_stop.cancel();
        let Some(listener) = self.listener.take() else {
            return;
        };
        match listener.await {
            Ok(set) => set.shutdown().await,
            Err(e) => tracing::error!(error = %e, "event listener failed"),
        }
    }

    fn stopped(&self, name: &Arc<str>, iteration: u64) -> Stopped {
        let mut ev = Event::new(EventKind::ShutdownRequested).with_task(name.clone());
        if iteration > 0 {
            ev = ev.with_iteration(iteration);
        }
        self.bus.publish(ev);
        Stopped {
            iterations: iteration,
        }
    }
}

impl Drop for Supervisor {
    fn drop(&mut self) {
        self.listener_stop.cancel();
    }
}

/// Forwards bus events to the subscriber set until `stop` fires, then drains
/// what is already buffered and hands the set back.
fn subscriber_listener(
    bus: &Bus,
    set: SubscriberSet,
    stop: CancellationToken,
) -> JoinHandle<SubscriberSet> {
    let mut rx = bus.subscribe();
    tokio::spawn(async move {
        loop {
            select! {
                biased;
                res = rx.recv() => match res {
                    Ok(ev) => set.emit(&ev),
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "event listener lagged");
                    }
                    Err(RecvError::Closed) => break,
                },
                _ = stop.cancelled() => {
                    loop {
                        match rx.try_recv() {
                            Ok(ev) => set.emit(&ev),
                            Err(TryRecvError::Lagged(skipped)) => {
                                tracing::warn!(skipped, "event listener lagged");
                            }
                            Err(_) => break,
                        }
                    }
                    break;
                }
            }
        }
        set
    })
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    use tokio::sync::broadcast;
    use tokio::time::Instant;

    use super::*;
    use crate::subscribers::DebugFn;
    use crate::tasks::TaskFn;

    fn cfg(min_secs: u64, delay_secs: u64, threshold: u32) -> SupervisorConfig {
        SupervisorConfig {
            minimum_success: Duration::from_secs(min_secs),
            restart_delay: Duration::from_secs(delay_secs),
            failure_threshold: threshold,
            ..SupervisorConfig::default()
        }
    }

    /// Task whose n-th invocation sleeps `secs[n]` seconds (0 once exhausted).
    fn scripted(secs: Vec<u64>) -> impl Task {
        let mut durations = secs.into_iter();
        TaskFn::new("scripted", move |_ctx: CancellationToken| {
            let secs = durations.next().unwrap_or(0);
            async move {
                if secs > 0 {
                    time::sleep(Duration::from_secs(secs)).await;
                }
                Ok::<(), TaskError>(())
            }
        })
    }

    fn drain(rx: &mut broadcast::Receiver<Event>) -> Vec<Event> {
        let mut out = Vec::new();
        while let Ok(ev) = rx.try_recv() {
            out.push(ev);
        }
        out
    }

    fn iterations_of(events: &[Event], kind: EventKind) -> Vec<u64> {
        events
            .iter()
            .filter(|e| e.kind == kind)
            .filter_map(|e| e.iteration)
            .collect()
    }

    #[tokio::test(start_paused = true)]
    async fn success_resets_consecutive_failures() {
        let sup = Supervisor::new(cfg(5, 1, 3));
        let mut rx = sup.bus().subscribe();
        let mut task = scripted(vec![1, 1, 6, 1, 1, 1]);

        let started = Instant::now();
        let res = sup.run(&mut task, &CancellationToken::new()).await;
        let total = started.elapsed();

        assert_eq!(
            res,
            Err(RuntimeError::CircuitOpen {
                failures: 3,
                iterations: 6
            })
        );
        let events = drain(&mut rx);
        assert_eq!(
            iterations_of(&events, EventKind::TaskStarting),
            vec![1, 2, 3, 4, 5, 6]
        );
        assert_eq!(
            iterations_of(&events, EventKind::BackoffScheduled),
            vec![1, 2, 4, 5]
        );
        assert_eq!(
            iterations_of(&events, EventKind::FailureCounterReset),
            vec![3]
        );
        assert_eq!(iterations_of(&events, EventKind::CircuitOpen), vec![6]);

        // 11s of runs + 4 restart delays
        assert!(total >= Duration::from_secs(15));
        assert!(total < Duration::from_secs(16));
    }

    #[tokio::test(start_paused = true)]
    async fn fast_exits_trip_after_threshold_without_final_sleep() {
        let sup = Supervisor::new(cfg(5, 2, 4));
        let mut rx = sup.bus().subscribe();
        let mut task = scripted(vec![]);

        let started = Instant::now();
        let res = sup.run(&mut task, &CancellationToken::new()).await;

        assert_eq!(
            res,
            Err(RuntimeError::CircuitOpen {
                failures: 4,
                iterations: 4
            })
        );
        let events = drain(&mut rx);
        assert_eq!(
            iterations_of(&events, EventKind::BackoffScheduled),
            vec![1, 2, 3]
        );
        let total = started.elapsed();
        assert!(total >= Duration::from_secs(6));
        assert!(total < Duration::from_secs(7));
    }

    #[tokio::test(start_paused = true)]
    async fn zero_threshold_trips_after_one_failure() {
        let sup = Supervisor::new(cfg(5, 1, 0));
        let mut rx = sup.bus().subscribe();
        let mut task = scripted(vec![]);

        let res = sup.run(&mut task, &CancellationToken::new()).await;

        assert_eq!(
            res,
            Err(RuntimeError::CircuitOpen {
                failures: 1,
                iterations: 1
            })
        );
        let events = drain(&mut rx);
        assert!(iterations_of(&events, EventKind::BackoffScheduled).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn zero_restart_delay_adds_no_time() {
        let sup = Supervisor::new(cfg(5, 0, 5));
        let mut task = scripted(vec![]);

        let started = Instant::now();
        let res = sup.run(&mut task, &CancellationToken::new()).await;

        assert!(matches!(
            res,
            Err(RuntimeError::CircuitOpen { iterations: 5, .. })
        ));
        assert_eq!(started.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn zero_success_floor_counts_long_runs_as_failures() {
        let sup = Supervisor::new(cfg(0, 0, 2));
        let mut rx = sup.bus().subscribe();
        let mut task = scripted(vec![3600, 3600]);

        let res = sup.run(&mut task, &CancellationToken::new()).await;

        assert_eq!(
            res,
            Err(RuntimeError::CircuitOpen {
                failures: 2,
                iterations: 2
            })
        );
        let events = drain(&mut rx);
        assert!(iterations_of(&events, EventKind::FailureCounterReset).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_during_backoff_is_not_a_failure() {
        let sup = Supervisor::new(cfg(5, 60, 2));
        let mut rx = sup.bus().subscribe();
        let mut task = scripted(vec![]);
        let token = CancellationToken::new();

        let canceller = token.clone();
        tokio::spawn(async move {
            time::sleep(Duration::from_secs(10)).await;
            canceller.cancel();
        });

        let res = sup.run(&mut task, &token).await;

        assert_eq!(res, Ok(Stopped { iterations: 1 }));
        let events = drain(&mut rx);
        assert!(events.iter().all(|e| e.kind != EventKind::CircuitOpen));
        assert_eq!(
            events.last().map(|e| e.kind),
            Some(EventKind::ShutdownRequested)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_during_task_is_not_a_failure() {
        let sup = Supervisor::new(cfg(5, 1, 1));
        let mut rx = sup.bus().subscribe();
        let mut task = TaskFn::new("waiter", |ctx: CancellationToken| async move {
            ctx.cancelled().await;
            Err::<(), _>(TaskError::Canceled)
        });
        let token = CancellationToken::new();

        let canceller = token.clone();
        tokio::spawn(async move {
            time::sleep(Duration::from_secs(1)).await;
            canceller.cancel();
        });

        let res = sup.run(&mut task, &token).await;

        assert_eq!(res, Ok(Stopped { iterations: 1 }));
        let events = drain(&mut rx);
        assert!(events.iter().all(|e| e.kind != EventKind::FailureCounted));
    }

    #[tokio::test]
    async fn cancelled_token_never_starts_the_task() {
        let sup = Supervisor::new(cfg(5, 1, 1));
        let runs = Arc::new(Mutex::new(0u32));
        let counter = Arc::clone(&runs);
        let mut task = TaskFn::new("never", move |_ctx: CancellationToken| {
            *counter.lock().unwrap() += 1;
            async { Ok::<(), TaskError>(()) }
        });
        let token = CancellationToken::new();
        token.cancel();

        let res = sup.run(&mut task, &token).await;

        assert_eq!(res, Ok(Stopped { iterations: 0 }));
        assert_eq!(*runs.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn debug_callback_keeps_up_with_zero_delay_restarts() {
        let lines = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&lines);
        let sup = Supervisor::builder(cfg(5, 0, 2000))
            .with_debug(move |_line: &str| {
                counter.fetch_add(1, Ordering::Relaxed);
            })
            .build();
        let mut task = scripted(vec![]);

        let res = sup.run(&mut task, &CancellationToken::new()).await;
        assert!(matches!(
            res,
            Err(RuntimeError::CircuitOpen {
                iterations: 2000,
                ..
            })
        ));
        sup.shutdown().await;

        // starting, exited, counted and backoff/circuit-open per run
        assert_eq!(lines.load(Ordering::Relaxed), 4 * 2000);
    }

    #[tokio::test]
    async fn dropping_supervisor_stops_subscribers() {
        let sink = DebugFn::arc(|_line: &str| {});
        let sup = Supervisor::builder(cfg(5, 0, 1))
            .with_subscriber(Arc::clone(&sink))
            .build();
        let bus = sup.bus().clone();

        drop(sup);

        let released = time::timeout(Duration::from_secs(1), async {
            while Arc::strong_count(&sink) > 1 {
                tokio::task::yield_now().await;
            }
        })
        .await;
        assert!(released.is_ok());
        bus.publish(Event::new(EventKind::ShutdownRequested));
    }

    #[tokio::test]
    async fn debug_callback_sees_the_failure_path() {
        let lines = Arc::new(Mutex::new(Vec::<String>::new()));
        let sink = Arc::clone(&lines);
        let sup = Supervisor::builder(cfg(5, 0, 0))
            .with_debug(move |line: &str| sink.lock().unwrap().push(line.to_string()))
            .build();
        let mut task = TaskFn::new("flaky", |_ctx: CancellationToken| async {
            Err::<(), _>(TaskError::Fail {
                error: "refused".into(),
            })
        });

        let res = sup.run(&mut task, &CancellationToken::new()).await;
        assert!(res.is_err());
        sup.shutdown().await;

        let lines = lines.lock().unwrap();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "[flaky] task starting (iteration 1)");
        assert!(lines[1].starts_with("[flaky] task exited: "));
        assert!(lines[1].ends_with("(execution failed: refused)"));
        assert_eq!(lines[2], "[flaky] failure counter: 1");
        assert_eq!(
            lines[3],
            "[flaky] general failure after 1 consecutive failures, exiting the loop"
        );
    }
}
