use serde::{Deserialize, Serialize};

/// Tuning knobs for the command scheduler.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Number of latch slots keys hash into. More slots means fewer false
    /// conflicts between unrelated keys.
    pub latch_slots: usize,
    /// Values at or below this size are inlined into the prewrite lock
    /// instead of being written to the Default family.
    pub short_value_limit: usize,
    /// Upper bound applied to client-supplied Scan / ScanLock limits.
    pub max_scan_limit: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            latch_slots: 256,
            short_value_limit: 64,
            max_scan_limit: 4096,
        }
    }
}
