use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Why a process was left out of a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    Exited,
    AccessDenied,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Exited => f.write_str("exited during sampling"),
            SkipReason::AccessDenied => f.write_str("access denied"),
        }
    }
}

/// Optional per-process metrics that may be replaced by a neutral default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    DiskIo,
    Priority,
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Metric::DiskIo => f.write_str("disk I/O"),
            Metric::Priority => f.write_str("priority"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unavailable {
    Denied,
    Unsupported,
    Deadline,
}

impl fmt::Display for Unavailable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Unavailable::Denied => f.write_str("permission denied"),
            Unavailable::Unsupported => f.write_str("not supported on this platform"),
            Unavailable::Deadline => f.write_str("probe deadline exceeded"),
        }
    }
}

#[derive(Debug, Error)]
pub enum MonitorError {
    /// Recorded in a snapshot, never returned from sampling.
    #[error("process {pid} skipped: {reason}")]
    ProcessUnavailable { pid: u32, reason: SkipReason },

    /// Recorded in a snapshot; the metric holds its neutral default.
    #[error("{metric} unavailable for process {pid}: {cause}")]
    UnsupportedMetric {
        pid: u32,
        metric: Metric,
        cause: Unavailable,
    },

    #[error(
        "unknown sort key `{0}` (expected pid, name, memoryMB, cpuPercent, diskReadDelta, diskWriteDelta or priority)"
    )]
    InvalidSortKey(String),

    #[error("export to {} failed: {source}", path.display())]
    ExportFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_process_and_cause() {
        let err = MonitorError::ProcessUnavailable {
            pid: 42,
            reason: SkipReason::Exited,
        };
        assert_eq!(err.to_string(), "process 42 skipped: exited during sampling");

        let err = MonitorError::UnsupportedMetric {
            pid: 7,
            metric: Metric::DiskIo,
            cause: Unavailable::Denied,
        };
        assert_eq!(
            err.to_string(),
            "disk I/O unavailable for process 7: permission denied"
        );
    }

    #[test]
    fn export_failure_keeps_io_source() {
        let err = MonitorError::ExportFailure {
            path: PathBuf::from("/tmp/out.csv"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "nope"),
        };
        assert!(err.to_string().starts_with("export to /tmp/out.csv failed"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
