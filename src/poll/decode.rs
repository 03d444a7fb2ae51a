//! # Response envelope decoding.
//!
//! Remote responses are wrapped in a JSON envelope:
//!
//! ```text
//! { "ok": true,  "result": <R> }
//! { "ok": false, "description": "Unauthorized" }
//! ```
//!
//! Updates inside a `result` array look like `{"update_id": 42, ...payload fields}`;
//! everything except `update_id` is deserialized into the payload type.
//!
//! Decoding is schema-checked: a missing `result`, a wrong type or a missing
//! `update_id` all become [`TransportError::Decode`], and `ok: false` becomes
//! [`TransportError::Rejected`].

use serde::de::{DeserializeOwned, Error as _};
use serde::Deserialize;

use crate::error::TransportError;
use crate::poll::update::{Batch, Update};

#[derive(Deserialize)]
struct Envelope<R> {
    ok: bool,
    result: Option<R>,
    description: Option<String>,
}

#[derive(Deserialize)]
struct RawUpdate<P> {
    update_id: i64,
    #[serde(flatten)]
    payload: P,
}

/// Decodes an envelope and returns its `result`.
///
/// # Example
/// ```
/// use pollvisor::decode::decode_result;
///
/// let me: String = decode_result(br#"{"ok":true,"result":"bot"}"#).unwrap();
/// assert_eq!(me, "bot");
/// assert!(decode_result::<String>(br#"{"ok":false,"description":"nope"}"#).is_err());
/// ```
pub fn decode_result<R: DeserializeOwned>(bytes: &[u8]) -> Result<R, TransportError> {
    let env: Envelope<R> = serde_json::from_slice(bytes)?;
    if !env.ok {
        return Err(TransportError::Rejected {
            description: env.description.unwrap_or_default(),
        });
    }
    env.result
        .ok_or_else(|| TransportError::Decode(serde_json::Error::missing_field("result")))
}

/// Decodes an envelope whose `result` is an array of updates.
pub fn decode_batch<P: DeserializeOwned>(bytes: &[u8]) -> Result<Batch<P>, TransportError> {
    let raw: Vec<RawUpdate<P>> = decode_result(bytes)?;
    Ok(raw
        .into_iter()
        .map(|r| Update::new(r.update_id, r.payload))
        .collect::<Vec<_>>()
        .into())
}
