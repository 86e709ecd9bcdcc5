use serde::Serialize;

use crate::system::platform::IoStats;

/// Counters read straight from the OS for one process in one pass.
#[derive(Clone, Debug, PartialEq)]
pub struct RawProcess {
    pub pid: u32,
    pub name: String,
    pub memory_bytes: u64,
    /// Accumulated CPU time across all cores, in milliseconds.
    pub cpu_time_ms: u64,
    pub io: Option<IoStats>,
    pub priority: Option<i32>,
}

/// Normalized per-process metrics for one snapshot.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ProcessRecord {
    pub pid: u32,
    pub name: String,
    pub memory_mb: f64,
    pub cpu_percent: f64,
    /// KB/s read since the previous sample.
    pub disk_read_delta: f64,
    /// KB/s written since the previous sample.
    pub disk_write_delta: f64,
    pub priority: Option<i32>,
}

impl ProcessRecord {
    pub fn new(pid: u32, name: impl Into<String>) -> Self {
        ProcessRecord {
            pid,
            name: name.into(),
            memory_mb: 0.0,
            cpu_percent: 0.0,
            disk_read_delta: 0.0,
            disk_write_delta: 0.0,
            priority: None,
        }
    }
}

/// System-wide memory figures taken during a pass.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MemoryStats {
    pub total_bytes: u64,
    pub used_bytes: u64,
    pub swap_total_bytes: u64,
    pub swap_used_bytes: u64,
}

impl MemoryStats {
    pub fn used_percent(&self) -> f64 {
        percent(self.used_bytes, self.total_bytes)
    }

    pub fn swap_percent(&self) -> f64 {
        percent(self.swap_used_bytes, self.swap_total_bytes)
    }

    pub fn swap_used_mb(&self) -> f64 {
        self.swap_used_bytes as f64 / BYTES_PER_MB
    }
}

pub const BYTES_PER_KB: f64 = 1024.0;
pub const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

fn percent(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        (part as f64 / whole as f64 * 100.0).clamp(0.0, 100.0)
    }
}
