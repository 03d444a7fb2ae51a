//! # Forward-only consumption offset.
//!
//! [`Checkpoint`] remembers the highest update id consumed so far. It never
//! moves backwards: out-of-order and duplicate ids leave it untouched. The
//! value lives in memory only and starts at `0` for every new loop.

/// Highest consumed update id.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Checkpoint {
    last: i64,
}

impl Checkpoint {
    /// A checkpoint at offset 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Highest id observed so far.
    pub fn last(&self) -> i64 {
        self.last
    }

    /// Offset to request next: strictly newer than everything consumed.
    pub fn next_request(&self) -> i64 {
        self.last.saturating_add(1)
    }

    /// Records `id` as consumed. Returns `true` if the checkpoint moved.
    ///
    /// # Example
    /// ```
    /// use pollvisor::Checkpoint;
    ///
    /// let mut cp = Checkpoint::new();
    /// assert!(cp.observe(5));
    /// assert!(!cp.observe(3));
    /// assert!(cp.observe(7));
    /// assert_eq!(cp.last(), 7);
    /// assert_eq!(cp.next_request(), 8);
    /// ```
    pub fn observe(&mut self, id: i64) -> bool {
        if id > self.last {
            self.last = id;
            true
        } else {
            false
        }
    }
}
