use std::time::{Duration, Instant};

use sysinfo::{ProcessRefreshKind, ProcessStatus, ProcessesToUpdate, System};

use crate::error::{Metric, MonitorError, SkipReason, Unavailable};

use super::platform::{self, IoStats, ProbeError};
use super::process::{MemoryStats, RawProcess};
use super::snapshot::RawSample;

/// Identity and core counters of a process as listed by the OS.
#[derive(Clone, Debug, PartialEq)]
pub struct ProcessEntry {
    pub pid: u32,
    pub name: String,
    pub memory_bytes: u64,
    pub cpu_time_ms: u64,
}

/// Access to the OS process table.
pub trait ProcessSource {
    /// Re-reads the process table and memory figures.
    fn refresh(&mut self);

    /// Lists the processes seen by the last refresh. A process that cannot
    /// be read at all is reported as an error with its pid.
    fn processes(&self) -> Vec<Result<ProcessEntry, (u32, SkipReason)>>;

    fn memory(&self) -> MemoryStats;

    fn logical_cores(&self) -> usize;

    fn process_io(&self, pid: u32) -> Result<IoStats, ProbeError> {
        platform::process_io(pid)
    }

    fn process_priority(&self, pid: u32) -> Result<i32, ProbeError> {
        platform::process_priority(pid)
    }
}

pub struct SysinfoSource {
    sys: System,
}

impl Default for SysinfoSource {
    fn default() -> Self {
        Self::new()
    }
}

impl SysinfoSource {
    pub fn new() -> Self {
        let mut sys = System::new();
        sys.refresh_cpu_all();
        SysinfoSource { sys }
    }
}

impl ProcessSource for SysinfoSource {
    fn refresh(&mut self) {
        self.sys.refresh_memory();
        self.sys.refresh_processes_specifics(
            ProcessesToUpdate::All,
            true,
            ProcessRefreshKind::nothing().with_memory().with_cpu(),
        );
    }

    fn processes(&self) -> Vec<Result<ProcessEntry, (u32, SkipReason)>> {
        self.sys
            .processes()
            .iter()
            .map(|(pid, process)| {
                let pid = pid.as_u32();
                // Exited but not yet reaped by its parent
                if process.status() == ProcessStatus::Zombie {
                    return Err((pid, SkipReason::Exited));
                }
                Ok(ProcessEntry {
                    pid,
                    name: process.name().to_string_lossy().to_string(),
                    memory_bytes: process.memory(),
                    cpu_time_ms: process.accumulated_cpu_time(),
                })
            })
            .collect()
    }

    fn memory(&self) -> MemoryStats {
        MemoryStats {
            total_bytes: self.sys.total_memory(),
            used_bytes: self.sys.used_memory(),
            swap_total_bytes: self.sys.total_swap(),
            swap_used_bytes: self.sys.used_swap(),
        }
    }

    fn logical_cores(&self) -> usize {
        self.sys.cpus().len().max(1)
    }
}

/// Takes best-effort raw samples of every visible process.
pub struct Sampler<S: ProcessSource = SysinfoSource> {
    source: S,
    probe_deadline: Duration,
}

impl Sampler<SysinfoSource> {
    pub fn new(probe_deadline: Duration) -> Self {
        Sampler::with_source(SysinfoSource::new(), probe_deadline)
    }
}

impl<S: ProcessSource> Sampler<S> {
    pub fn with_source(source: S, probe_deadline: Duration) -> Self {
        Sampler {
            source,
            probe_deadline,
        }
    }

    pub fn logical_cores(&self) -> usize {
        self.source.logical_cores()
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    /// Never fails: unreadable processes are omitted and recorded as issues.
    pub fn sample(&mut self) -> RawSample {
        let _span = tracing::debug_span!("sampler.sample").entered();

        let started = Instant::now();
        self.source.refresh();
        // The probe deadline covers probing only, not the table refresh.
        let taken_at = Instant::now();

        let entries = self.source.processes();
        let mut processes = Vec::with_capacity(entries.len());
        let mut issues = Vec::new();

        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err((pid, reason)) => {
                    issues.push(MonitorError::ProcessUnavailable { pid, reason });
                    continue;
                }
            };
            let pid = entry.pid;
            let past_deadline = taken_at.elapsed() > self.probe_deadline;
            match self.probe(entry, past_deadline, &mut issues) {
                Ok(process) => processes.push(process),
                Err(reason) => issues.push(MonitorError::ProcessUnavailable { pid, reason }),
            }
        }

        tracing::debug!(
            sampled = processes.len(),
            issues = issues.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "sampling pass complete"
        );

        RawSample {
            taken_at,
            processes,
            memory: self.source.memory(),
            issues,
        }
    }

    fn probe(
        &self,
        entry: ProcessEntry,
        past_deadline: bool,
        issues: &mut Vec<MonitorError>,
    ) -> Result<RawProcess, SkipReason> {
        let pid = entry.pid;
        let io = optional_probe(pid, Metric::DiskIo, past_deadline, issues, || {
            self.source.process_io(pid)
        })?;
        let priority = optional_probe(pid, Metric::Priority, past_deadline, issues, || {
            self.source.process_priority(pid)
        })?;

        Ok(RawProcess {
            pid,
            name: entry.name,
            memory_bytes: entry.memory_bytes,
            cpu_time_ms: entry.cpu_time_ms,
            io,
            priority,
        })
    }
}

/// Runs one optional probe. A vanished process aborts the whole record;
/// anything else degrades to `None` and leaves an issue behind.
fn optional_probe<T>(
    pid: u32,
    metric: Metric,
    past_deadline: bool,
    issues: &mut Vec<MonitorError>,
    probe: impl FnOnce() -> Result<T, ProbeError>,
) -> Result<Option<T>, SkipReason> {
    let cause = if past_deadline {
        Unavailable::Deadline
    } else {
        match probe() {
            Ok(value) => return Ok(Some(value)),
            Err(ProbeError::Gone) => return Err(SkipReason::Exited),
            Err(ProbeError::Denied) => Unavailable::Denied,
            Err(ProbeError::Unsupported) => Unavailable::Unsupported,
        }
    };
    issues.push(MonitorError::UnsupportedMetric { pid, metric, cause });
    Ok(None)
}
