//! # Remote transport capabilities.
//!
//! The crate does not talk HTTP itself. Callers implement [`Transport`] (used
//! by the poll loop) and, when handlers need to answer, [`Outbound`].
//!
//! A `Transport` performs one long-poll fetch per call: it should block up to
//! `request.timeout` seconds waiting for new updates, then return whatever it
//! has (possibly an empty batch). Responses should be decoded with
//! [`decode`](crate::poll::decode) so malformed payloads surface as
//! [`TransportError::Decode`] instead of panics.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::TransportError;
use crate::poll::update::Batch;

/// Parameters of one long-poll fetch.
///
/// Serializes as `{"offset": <i64>, "timeout": <seconds>}`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchRequest {
    /// Only updates with `id >= offset` are wanted.
    pub offset: i64,
    /// Server-side wait bound in seconds.
    pub timeout: u64,
}

/// Source of update batches.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Payload type carried by each update.
    type Payload: Send + Sync + 'static;

    /// Fetches the next batch of updates.
    async fn fetch_batch(
        &self,
        request: FetchRequest,
    ) -> Result<Batch<Self::Payload>, TransportError>;
}

/// Sink for outgoing messages; used by handlers, never by the poll loop.
#[async_trait]
pub trait Outbound<M: Send + 'static>: Send + Sync {
    /// Acknowledgement returned by the remote.
    type Ack: Send;

    /// Sends one message.
    async fn send(&self, message: M) -> Result<Self::Ack, TransportError>;
}
