use serde::{Deserialize, Serialize};

/// Client-visible key: an opaque byte sequence, ordered lexicographically.
pub type Key = Vec<u8>;

/// Raw value bytes stored under a key.
pub type Value = Vec<u8>;

/// Logical clock value assigned by an external timestamp oracle.
///
/// Timestamps are totally ordered and serve three roles in the transaction
/// protocol: the version a read observes (`read_ts`), the identity of a
/// transaction (`start_ts`), and the version at which a transaction's effects
/// become visible (`commit_ts`).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct Timestamp(u64);

impl Timestamp {
    /// The zero timestamp, ordered before every assigned timestamp.
    pub const ZERO: Timestamp = Timestamp(0);

    /// The maximum timestamp, ordered after every assigned timestamp.
    pub const MAX: Timestamp = Timestamp(u64::MAX);

    /// Create a timestamp from a raw oracle value.
    pub fn with_ts(timestamp: u64) -> Self {
        Self(timestamp)
    }

    /// Returns the raw value of the timestamp.
    pub fn raw(&self) -> u64 {
        self.0
    }

    /// Logical time elapsed since `earlier`, saturating at zero.
    pub fn elapsed_since(&self, earlier: Timestamp) -> u64 {
        self.0.saturating_sub(earlier.0)
    }
}

impl From<u64> for Timestamp {
    fn from(ts: u64) -> Self {
        Self(ts)
    }
}
