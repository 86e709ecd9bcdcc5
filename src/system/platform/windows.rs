use super::{IoStats, PlatformExtensions, ProbeError};

use windows_sys::Win32::{
    Foundation::{CloseHandle, ERROR_ACCESS_DENIED, ERROR_INVALID_PARAMETER, GetLastError, HANDLE},
    System::Threading::{
        GetPriorityClass, GetProcessIoCounters, IO_COUNTERS, OpenProcess,
        PROCESS_QUERY_LIMITED_INFORMATION,
    },
};

pub struct Platform;

fn open_process(pid: u32) -> Result<HANDLE, ProbeError> {
    let handle = unsafe { OpenProcess(PROCESS_QUERY_LIMITED_INFORMATION, 0, pid) };
    if !handle.is_null() {
        return Ok(handle);
    }
    Err(match unsafe { GetLastError() } {
        ERROR_INVALID_PARAMETER => ProbeError::Gone,
        ERROR_ACCESS_DENIED => ProbeError::Denied,
        _ => ProbeError::Unsupported,
    })
}

impl PlatformExtensions for Platform {
    fn process_priority(pid: u32) -> Result<i32, ProbeError> {
        let handle = open_process(pid)?;
        let prio = unsafe { GetPriorityClass(handle) };
        unsafe { CloseHandle(handle) };
        if prio == 0 {
            Err(ProbeError::Unsupported)
        } else {
            Ok(prio as i32)
        }
    }

    fn process_io(pid: u32) -> Result<IoStats, ProbeError> {
        let handle = open_process(pid)?;
        let mut counters = unsafe { std::mem::zeroed::<IO_COUNTERS>() };
        let ok = unsafe { GetProcessIoCounters(handle, &mut counters) };
        unsafe { CloseHandle(handle) };
        if ok == 0 {
            return Err(ProbeError::Unsupported);
        }
        Ok(IoStats {
            read_bytes: counters.ReadTransferCount,
            write_bytes: counters.WriteTransferCount,
        })
    }
}
