/// The three logical stores of the multi-version data layout.
///
/// Every read and write names its column family explicitly; there is no
/// process-wide registry of stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cf {
    /// Committed values, keyed by `(user key, start_ts)` in encoded form.
    Default,
    /// At most one outstanding lock per user key, keyed by the raw user key.
    Lock,
    /// Append-only commit/rollback markers per user key, keyed by
    /// `(user key, commit_ts)` in encoded form.
    Write,
}

impl Cf {
    /// All column families, in a fixed order.
    pub const ALL: [Cf; 3] = [Cf::Default, Cf::Lock, Cf::Write];
}
