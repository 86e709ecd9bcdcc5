#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IoStats {
    pub read_bytes: u64,
    pub write_bytes: u64,
}

/// Outcome of a failed per-process probe.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProbeError {
    /// The process no longer exists.
    Gone,
    Denied,
    Unsupported,
}

impl From<std::io::Error> for ProbeError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => ProbeError::Gone,
            std::io::ErrorKind::PermissionDenied => ProbeError::Denied,
            _ => ProbeError::Unsupported,
        }
    }
}

pub trait PlatformExtensions {
    fn process_priority(pid: u32) -> Result<i32, ProbeError>;
    fn process_io(pid: u32) -> Result<IoStats, ProbeError>;
}

#[cfg(target_os = "linux")]
mod linux;
#[cfg(target_os = "macos")]
mod macos;
#[cfg(target_os = "windows")]
mod windows;

#[cfg(target_os = "linux")]
use linux as platform_impl;
#[cfg(target_os = "macos")]
use macos as platform_impl;
#[cfg(target_os = "windows")]
use windows as platform_impl;

/// Scheduling priority: niceness on Unix, priority class on Windows.
pub fn process_priority(pid: u32) -> Result<i32, ProbeError> {
    platform_impl::Platform::process_priority(pid)
}

/// Cumulative bytes read from and written to storage.
pub fn process_io(pid: u32) -> Result<IoStats, ProbeError> {
    platform_impl::Platform::process_io(pid)
}
