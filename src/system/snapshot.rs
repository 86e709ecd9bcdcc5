use std::time::Instant;

use crate::error::MonitorError;

use super::process::{MemoryStats, ProcessRecord, RawProcess};

/// Output of one sampling pass, before derivation.
#[derive(Debug)]
pub struct RawSample {
    pub taken_at: Instant,
    pub processes: Vec<RawProcess>,
    pub memory: MemoryStats,
    pub issues: Vec<MonitorError>,
}

/// One complete pass worth of derived records, in enumeration order.
#[derive(Debug, Default)]
pub struct Snapshot {
    pub records: Vec<ProcessRecord>,
    pub memory: MemoryStats,
    /// Per-item skips and neutral substitutions recorded during the pass.
    pub issues: Vec<MonitorError>,
}

impl Snapshot {
    pub fn skipped_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|issue| matches!(issue, MonitorError::ProcessUnavailable { .. }))
            .count()
    }

    pub fn unsupported_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|issue| matches!(issue, MonitorError::UnsupportedMetric { .. }))
            .count()
    }
}
