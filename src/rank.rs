//! Filtering and stable, type-aware ordering of process records.

use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use crate::error::MonitorError;
use crate::system::process::ProcessRecord;

/// A sortable column of [`ProcessRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortKey {
    Pid,
    Name,
    Memory,
    Cpu,
    DiskRead,
    DiskWrite,
    Priority,
}

impl SortKey {
    /// Column order of the table and the export.
    pub const ALL: [SortKey; 7] = [
        SortKey::Pid,
        SortKey::Name,
        SortKey::Memory,
        SortKey::Cpu,
        SortKey::DiskRead,
        SortKey::DiskWrite,
        SortKey::Priority,
    ];

    pub fn label(self) -> &'static str {
        match self {
            SortKey::Pid => "PID",
            SortKey::Name => "Process Name",
            SortKey::Memory => "Memory (MB)",
            SortKey::Cpu => "CPU (%)",
            SortKey::DiskRead => "Disk Read",
            SortKey::DiskWrite => "Disk Write",
            SortKey::Priority => "Priority",
        }
    }

    pub fn field_name(self) -> &'static str {
        match self {
            SortKey::Pid => "pid",
            SortKey::Name => "name",
            SortKey::Memory => "memoryMB",
            SortKey::Cpu => "cpuPercent",
            SortKey::DiskRead => "diskReadDelta",
            SortKey::DiskWrite => "diskWriteDelta",
            SortKey::Priority => "priority",
        }
    }

    pub fn column(self) -> usize {
        SortKey::ALL.iter().position(|k| *k == self).unwrap_or(0)
    }

    pub fn from_column(index: usize) -> Option<Self> {
        SortKey::ALL.get(index).copied()
    }

    pub fn next(self) -> Self {
        SortKey::ALL[(self.column() + 1) % SortKey::ALL.len()]
    }

    fn compare(self, a: &ProcessRecord, b: &ProcessRecord) -> Ordering {
        match self {
            SortKey::Pid => a.pid.cmp(&b.pid),
            SortKey::Name => a
                .name
                .chars()
                .flat_map(char::to_lowercase)
                .cmp(b.name.chars().flat_map(char::to_lowercase)),
            SortKey::Memory => a.memory_mb.total_cmp(&b.memory_mb),
            SortKey::Cpu => a.cpu_percent.total_cmp(&b.cpu_percent),
            SortKey::DiskRead => a.disk_read_delta.total_cmp(&b.disk_read_delta),
            SortKey::DiskWrite => a.disk_write_delta.total_cmp(&b.disk_write_delta),
            // None sorts below every value
            SortKey::Priority => a.priority.cmp(&b.priority),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.field_name())
    }
}

impl FromStr for SortKey {
    type Err = MonitorError;

    /// Accepts field names, short aliases and column headers, ignoring case
    /// and punctuation (`memoryMB`, `mem`, `Memory (MB)`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| c.is_alphanumeric())
            .flat_map(char::to_lowercase)
            .collect();
        let key = match normalized.as_str() {
            "pid" => SortKey::Pid,
            "name" | "processname" => SortKey::Name,
            "memory" | "mem" | "memorymb" | "rss" => SortKey::Memory,
            "cpu" | "cpupercent" => SortKey::Cpu,
            "read" | "diskread" | "diskreaddelta" => SortKey::DiskRead,
            "write" | "diskwrite" | "diskwritedelta" => SortKey::DiskWrite,
            "priority" | "nice" => SortKey::Priority,
            _ => return Err(MonitorError::InvalidSortKey(s.to_string())),
        };
        Ok(key)
    }
}

/// Requested ordering. Defaults to CPU, highest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec {
    pub key: SortKey,
    pub descending: bool,
}

impl Default for SortSpec {
    fn default() -> Self {
        SortSpec {
            key: SortKey::Cpu,
            descending: true,
        }
    }
}

impl SortSpec {
    pub fn new(key: SortKey, descending: bool) -> Self {
        SortSpec { key, descending }
    }

    /// Column-header semantics: picking the active column flips the
    /// direction, picking another column sorts it ascending.
    pub fn select(self, key: SortKey) -> Self {
        if self.key == key {
            self.reversed()
        } else {
            SortSpec::new(key, false)
        }
    }

    pub fn reversed(self) -> Self {
        SortSpec::new(self.key, !self.descending)
    }
}

/// Case-insensitive name match; an all-digit query also matches PIDs
/// containing it.
pub fn matches_filter(record: &ProcessRecord, query: &str) -> bool {
    let query = query.trim();
    if query.is_empty() {
        return true;
    }
    if query.chars().all(|c| c.is_ascii_digit()) && record.pid.to_string().contains(query) {
        return true;
    }
    record.name.to_lowercase().contains(&query.to_lowercase())
}

/// Filters, then stable-sorts. Ties keep their order in `records` for
/// either direction.
pub fn rank(
    records: &[ProcessRecord],
    key: SortKey,
    descending: bool,
    filter: &str,
) -> Vec<ProcessRecord> {
    let mut ranked: Vec<ProcessRecord> = records
        .iter()
        .filter(|record| matches_filter(record, filter))
        .cloned()
        .collect();
    if descending {
        ranked.sort_by(|a, b| key.compare(b, a));
    } else {
        ranked.sort_by(|a, b| key.compare(a, b));
    }
    ranked
}

/// [`rank`] with the key given by name.
pub fn rank_by(
    records: &[ProcessRecord],
    key: &str,
    descending: bool,
    filter: &str,
) -> Result<Vec<ProcessRecord>, MonitorError> {
    let key = key.parse::<SortKey>()?;
    Ok(rank(records, key, descending, filter))
}

/// Ranks and then keeps at most `top_n` records.
pub fn rank_top(
    records: &[ProcessRecord],
    spec: SortSpec,
    filter: &str,
    top_n: Option<usize>,
) -> Vec<ProcessRecord> {
    let mut ranked = rank(records, spec.key, spec.descending, filter);
    if let Some(n) = top_n {
        ranked.truncate(n);
    }
    ranked
}

/// Largest memory users, one entry per distinct name.
pub fn top_unique_by_memory(records: &[ProcessRecord], n: usize) -> Vec<ProcessRecord> {
    let mut seen = HashSet::new();
    rank(records, SortKey::Memory, true, "")
        .into_iter()
        .filter(|record| seen.insert(record.name.clone()))
        .take(n)
        .collect()
}
