use super::{IoStats, PlatformExtensions, ProbeError};

pub struct Platform;

impl PlatformExtensions for Platform {
    fn process_priority(pid: u32) -> Result<i32, ProbeError> {
        let contents = std::fs::read_to_string(format!("/proc/{pid}/stat"))?;
        parse_nice(&contents).ok_or(ProbeError::Unsupported)
    }

    fn process_io(pid: u32) -> Result<IoStats, ProbeError> {
        // Readable only for our own processes unless privileged.
        let contents = std::fs::read_to_string(format!("/proc/{pid}/io"))?;
        parse_io(&contents).ok_or(ProbeError::Unsupported)
    }
}

fn parse_nice(stat: &str) -> Option<i32> {
    // comm may contain spaces and parens, so skip past the last ')'
    let after_comm = stat.rfind(')')? + 1;
    let fields: Vec<&str> = stat[after_comm..].split_whitespace().collect();
    // state(0) ppid(1) pgrp(2) session(3) tty_nr(4) tpgid(5) flags(6)
    // minflt(7) cminflt(8) majflt(9) cmajflt(10) utime(11) stime(12)
    // cutime(13) cstime(14) priority(15) nice(16)
    fields.get(16)?.parse().ok()
}

fn parse_io(contents: &str) -> Option<IoStats> {
    let mut read_bytes = None;
    let mut write_bytes = None;
    for line in contents.lines() {
        if let Some(val) = line.strip_prefix("read_bytes: ") {
            read_bytes = val.trim().parse().ok();
        } else if let Some(val) = line.strip_prefix("write_bytes: ") {
            write_bytes = val.trim().parse().ok();
        }
    }
    Some(IoStats {
        read_bytes: read_bytes?,
        write_bytes: write_bytes?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nice_is_read_past_a_comm_with_parens() {
        let stat = "1234 (my (odd) proc) S 1 1234 1234 0 -1 4194560 100 0 0 0 \
                    5 3 0 0 20 -5 1 0 100 1000 200";
        assert_eq!(parse_nice(stat), Some(-5));
    }

    #[test]
    fn truncated_stat_has_no_nice() {
        assert_eq!(parse_nice("1 (init) S 0"), None);
    }

    #[test]
    fn io_file_yields_storage_counters() {
        let io = "rchar: 500\nwchar: 600\nsyscr: 1\nsyscw: 2\n\
                  read_bytes: 4096\nwrite_bytes: 8192\ncancelled_write_bytes: 0\n";
        assert_eq!(
            parse_io(io),
            Some(IoStats {
                read_bytes: 4096,
                write_bytes: 8192
            })
        );
        assert_eq!(parse_io("rchar: 1\n"), None);
    }
}
