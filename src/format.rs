use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

pub fn truncate_unicode(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }
    let mut result = String::new();
    let mut width = 0;
    for ch in s.chars() {
        let ch_width = ch.width().unwrap_or(0);
        if width + ch_width > max_width.saturating_sub(1) {
            result.push('\u{2026}');
            break;
        }
        result.push(ch);
        width += ch_width;
    }
    result
}

pub fn format_memory_mb(memory_mb: f64) -> String {
    format!("{memory_mb:.1}")
}

pub fn format_cpu(cpu_percent: f64) -> String {
    format!("{cpu_percent:.1}")
}

/// Disk rates are KB/s.
pub fn format_rate(kb_per_sec: f64) -> String {
    format!("{kb_per_sec:.2}")
}

pub fn format_priority(priority: Option<i32>) -> String {
    priority.map_or_else(|| "N/A".to_string(), |p| p.to_string())
}
