//! # Example: supervised_polling
//!
//! Runs a [`PollLoop`] under a [`Supervisor`] against an in-memory remote.
//!
//! The remote serves a few JSON batches, then drops the connection twice in a
//! row. Each drop ends the poll task quickly, so the supervisor counts it as a
//! failure and restarts the loop after `restart_delay`. The checkpoint lives in
//! the loop, so restarts resume from the last consumed update.
//!
//! ## Flow
//! ```text
//! Supervisor::run()
//!   ├─► iteration 1: fetches at offsets 1, 3, 4, 4; the last one hits "connection reset"
//!   ├─► FailureCounted(1), BackoffScheduled(1s)
//!   ├─► iteration 2: "connection reset" again
//!   ├─► FailureCounted(2), BackoffScheduled(1s)
//!   ├─► iteration 3: idle long polls (returns empty batches)
//!   └─► Ctrl-C ─► ShutdownRequested, Ok(Stopped)
//! ```
//!
//! ## Run
//! ```bash
//! RUST_LOG=debug cargo run --example supervised_polling
//! ```

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use pollvisor::{
    decode::decode_batch, Batch, FetchRequest, HandlerError, HandlerFn, PollConfig, PollLoop,
    Supervisor, SupervisorConfig, Transport, TransportError, Update,
};
use serde::Deserialize;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Deserialize)]
struct Message {
    text: String,
}

/// Pretends to be a remote bot API: scripted response bodies, then idle.
struct FakeRemote {
    responses: Mutex<VecDeque<Option<&'static str>>>,
}

#[async_trait]
impl Transport for FakeRemote {
    type Payload = Message;

    async fn fetch_batch(&self, request: FetchRequest) -> Result<Batch<Message>, TransportError> {
        let body = self
            .responses
            .lock()
            .map_err(|_| TransportError::request("remote state poisoned"))?
            .pop_front();
        match body {
            Some(Some(body)) => decode_batch(body.as_bytes()),
            Some(None) => Err(TransportError::request("connection reset")),
            None => {
                tokio::time::sleep(Duration::from_secs(request.timeout)).await;
                Ok(Batch::empty())
            }
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cfg = SupervisorConfig {
        minimum_success: Duration::from_secs(10),
        restart_delay: Duration::from_secs(1),
        failure_threshold: 3,
        ..SupervisorConfig::default()
    };
    let sup = Supervisor::builder(cfg).with_logging().build();

    let remote = FakeRemote {
        responses: Mutex::new(VecDeque::from([
            Some(r#"{"ok":true,"result":[{"update_id":1,"text":"hi"},{"update_id":2,"text":"how are you?"}]}"#),
            Some(r#"{"ok":true,"result":[{"update_id":3,"text":""}]}"#),
            Some(r#"{"ok":true,"result":[]}"#),
            None,
            None,
        ])),
    };
    let handler = HandlerFn::new(|update: &Update<Message>| {
        if update.payload.text.is_empty() {
            return Err(HandlerError::failed("empty message"));
        }
        println!("#{} says {:?}", update.id, update.payload.text);
        Ok(())
    });
    let mut poller = PollLoop::new(
        remote,
        handler,
        PollConfig {
            wait_timeout: Duration::from_secs(5),
        },
    )
    .with_name("bot")
    .with_bus(sup.bus().clone());

    let token = CancellationToken::new();
    let on_signal = token.clone();
    tokio::spawn(async move {
        let _ = tokio::signal::ctrl_c().await;
        on_signal.cancel();
    });

    let res = sup.run(&mut poller, &token).await;
    println!("supervisor finished: {res:?} (offset {})", poller.last_offset());
    sup.shutdown().await;
    res?;
    Ok(())
}
