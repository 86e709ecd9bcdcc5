use std::collections::HashMap;
use std::time::{Duration, Instant};

use super::process::{BYTES_PER_KB, BYTES_PER_MB, ProcessRecord, RawProcess};
use super::snapshot::{RawSample, Snapshot};

/// Last-seen cumulative counters of one process.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProcessCounters {
    pub cpu_time_ms: u64,
    pub read_bytes: Option<u64>,
    pub write_bytes: Option<u64>,
}

impl From<&RawProcess> for ProcessCounters {
    fn from(raw: &RawProcess) -> Self {
        ProcessCounters {
            cpu_time_ms: raw.cpu_time_ms,
            read_bytes: raw.io.map(|io| io.read_bytes),
            write_bytes: raw.io.map(|io| io.write_bytes),
        }
    }
}

/// Passes closer together than this keep the previous baseline and repeat
/// the previous rates. CPU time advances in whole scheduler ticks, so a few
/// milliseconds of wall time cannot carry a meaningful percentage.
pub const MIN_RATE_WINDOW: Duration = Duration::from_millis(100);

/// Rates last reported for a PID.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct Rates {
    cpu_percent: f64,
    read_kb_per_sec: f64,
    write_kb_per_sec: f64,
}

/// PID → counters of the previous pass, plus when that pass was taken.
#[derive(Clone, Debug, Default)]
pub struct CounterTable {
    taken_at: Option<Instant>,
    by_pid: HashMap<u32, ProcessCounters>,
    rates: HashMap<u32, Rates>,
}

impl CounterTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_counters(
        taken_at: Instant,
        counters: impl IntoIterator<Item = (u32, ProcessCounters)>,
    ) -> Self {
        CounterTable {
            taken_at: Some(taken_at),
            by_pid: counters.into_iter().collect(),
            rates: HashMap::new(),
        }
    }

    pub fn get(&self, pid: u32) -> Option<&ProcessCounters> {
        self.by_pid.get(&pid)
    }

    pub fn taken_at(&self) -> Option<Instant> {
        self.taken_at
    }

    pub fn len(&self) -> usize {
        self.by_pid.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_pid.is_empty()
    }
}

/// Turns raw counters into records. PIDs without a previous counter (or
/// whose counters went backwards, as after PID reuse) get the neutral
/// baseline. A pass less than [`MIN_RATE_WINDOW`] after the previous one
/// repeats the previous rates and keeps the previous baseline. The returned
/// table holds exactly the PIDs of `raw`.
pub fn derive(
    raw: &RawSample,
    previous: &CounterTable,
    logical_cores: usize,
) -> (Vec<ProcessRecord>, CounterTable) {
    let window = previous
        .taken_at
        .map(|then| raw.taken_at.saturating_duration_since(then));
    if window.is_some_and(|window| window < MIN_RATE_WINDOW) {
        return carry_forward(raw, previous);
    }
    let elapsed_secs = window.map(|window| window.as_secs_f64());
    let cores = logical_cores.max(1) as f64;

    let mut records = Vec::with_capacity(raw.processes.len());
    let mut by_pid = HashMap::with_capacity(raw.processes.len());
    let mut rates = HashMap::with_capacity(raw.processes.len());

    for process in &raw.processes {
        let current = ProcessCounters::from(process);
        let mut rate = Rates::default();

        if let (Some(prev), Some(secs)) = (previous.by_pid.get(&process.pid), elapsed_secs) {
            let cpu_ms_per_sec =
                counter_rate(Some(prev.cpu_time_ms), Some(current.cpu_time_ms), secs);
            rate.cpu_percent = (cpu_ms_per_sec / 1000.0 * 100.0 / cores).clamp(0.0, 100.0);
            rate.read_kb_per_sec =
                counter_rate(prev.read_bytes, current.read_bytes, secs) / BYTES_PER_KB;
            rate.write_kb_per_sec =
                counter_rate(prev.write_bytes, current.write_bytes, secs) / BYTES_PER_KB;
        }

        by_pid.insert(process.pid, current);
        rates.insert(process.pid, rate);
        records.push(record_for(process, rate));
    }

    let updated = CounterTable {
        taken_at: Some(raw.taken_at),
        by_pid,
        rates,
    };
    (records, updated)
}

/// Short window: surviving PIDs keep their old counters and rates so the
/// next pass measures over the full span. New PIDs start from their current
/// counters with the neutral baseline.
fn carry_forward(raw: &RawSample, previous: &CounterTable) -> (Vec<ProcessRecord>, CounterTable) {
    let mut records = Vec::with_capacity(raw.processes.len());
    let mut by_pid = HashMap::with_capacity(raw.processes.len());
    let mut rates = HashMap::with_capacity(raw.processes.len());

    for process in &raw.processes {
        let current = ProcessCounters::from(process);
        let (counters, rate) = match previous.by_pid.get(&process.pid) {
            Some(prev) if prev.cpu_time_ms <= current.cpu_time_ms => (
                *prev,
                previous.rates.get(&process.pid).copied().unwrap_or_default(),
            ),
            _ => (current, Rates::default()),
        };

        by_pid.insert(process.pid, counters);
        rates.insert(process.pid, rate);
        records.push(record_for(process, rate));
    }

    let updated = CounterTable {
        taken_at: previous.taken_at,
        by_pid,
        rates,
    };
    (records, updated)
}

fn record_for(process: &RawProcess, rate: Rates) -> ProcessRecord {
    ProcessRecord {
        pid: process.pid,
        name: process.name.clone(),
        memory_mb: process.memory_bytes as f64 / BYTES_PER_MB,
        cpu_percent: rate.cpu_percent,
        disk_read_delta: rate.read_kb_per_sec,
        disk_write_delta: rate.write_kb_per_sec,
        priority: process.priority,
    }
}

fn counter_rate(previous: Option<u64>, current: Option<u64>, secs: f64) -> f64 {
    match (previous, current) {
        (Some(prev), Some(cur)) if cur >= prev && secs > 0.0 => (cur - prev) as f64 / secs,
        _ => 0.0,
    }
}

/// Owns the counter table between passes.
#[derive(Debug)]
pub struct MetricDeriver {
    counters: CounterTable,
    logical_cores: usize,
}

impl MetricDeriver {
    pub fn new(logical_cores: usize) -> Self {
        MetricDeriver {
            counters: CounterTable::new(),
            logical_cores,
        }
    }

    pub fn counters(&self) -> &CounterTable {
        &self.counters
    }

    pub fn derive(&mut self, raw: RawSample) -> Snapshot {
        let _span = tracing::debug_span!("deriver.derive", processes = raw.processes.len()).entered();

        let (records, counters) = derive(&raw, &self.counters, self.logical_cores);
        let pruned = self
            .counters
            .by_pid
            .keys()
            .filter(|pid| !counters.by_pid.contains_key(pid))
            .count();
        if pruned > 0 {
            tracing::trace!(pruned, "dropped counters of exited processes");
        }
        self.counters = counters;

        Snapshot {
            records,
            memory: raw.memory,
            issues: raw.issues,
        }
    }
}
