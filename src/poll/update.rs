use serde::{Deserialize, Serialize};

/// One update delivered by the remote source.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Update<P> {
    /// Source-assigned id; the checkpoint tracks the maximum seen.
    pub id: i64,
    /// Opaque payload handed to the handler.
    pub payload: P,
}

impl<P> Update<P> {
    /// Wraps `payload` with its source-assigned `id`.
    pub fn new(id: i64, payload: P) -> Self {
        Self { id, payload }
    }
}

/// Updates returned by one fetch, in arrival order (not necessarily sorted by id).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Batch<P> {
    /// Updates in the order the transport returned them.
    pub items: Vec<Update<P>>,
}

impl<P> Batch<P> {
    /// Wraps already-ordered updates.
    pub fn new(items: Vec<Update<P>>) -> Self {
        Self { items }
    }

    /// A batch with no updates (long-poll wait elapsed).
    pub fn empty() -> Self {
        Self { items: Vec::new() }
    }

    /// Number of updates in the batch.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True if the long poll returned nothing.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

}

impl<P> From<Vec<Update<P>>> for Batch<P> {
    fn from(items: Vec<Update<P>>) -> Self {
        Self::new(items)
    }
}
