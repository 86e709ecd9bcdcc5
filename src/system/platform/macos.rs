use super::{IoStats, PlatformExtensions, ProbeError};

pub struct Platform;

impl PlatformExtensions for Platform {
    fn process_priority(pid: u32) -> Result<i32, ProbeError> {
        // getpriority returns -1 on error, but -1 is also a valid niceness,
        // so errno has to be cleared first and checked afterwards
        unsafe { *libc::__error() = 0 };
        let prio = unsafe { libc::getpriority(libc::PRIO_PROCESS, pid as libc::id_t) };
        let errno = unsafe { *libc::__error() };
        if prio == -1 && errno != 0 {
            Err(match errno {
                libc::ESRCH => ProbeError::Gone,
                libc::EPERM | libc::EACCES => ProbeError::Denied,
                _ => ProbeError::Unsupported,
            })
        } else {
            Ok(prio)
        }
    }

    fn process_io(_pid: u32) -> Result<IoStats, ProbeError> {
        // macOS doesn't expose per-process I/O bytes without entitlements
        Err(ProbeError::Unsupported)
    }
}
