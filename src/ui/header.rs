use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph};

use crate::pipeline::View;
use crate::rank::SortSpec;
use crate::system::process::{BYTES_PER_MB, MemoryStats};
use crate::system::snapshot::Snapshot;
use crate::ui::theme::Theme;

/// `RAM: used MB / total MB (pct%) | Swap: used MB / total MB (pct%)`
pub fn memory_label(memory: &MemoryStats) -> String {
    format!(
        "RAM: {:.0} MB / {:.0} MB ({:.1}%) | Swap: {:.0} MB / {:.0} MB ({:.1}%)",
        memory.used_bytes as f64 / BYTES_PER_MB,
        memory.total_bytes as f64 / BYTES_PER_MB,
        memory.used_percent(),
        memory.swap_used_bytes as f64 / BYTES_PER_MB,
        memory.swap_total_bytes as f64 / BYTES_PER_MB,
        memory.swap_percent(),
    )
}

pub fn render(frame: &mut Frame, area: Rect, snapshot: &Snapshot, view: &View, sort: SortSpec, theme: &Theme) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.overlay_border));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let secondary = Style::default().fg(theme.text_secondary);
    let arrow = if sort.descending { "\u{25bc}" } else { "\u{25b2}" };

    let mut spans = vec![
        Span::styled(
            " procscope ",
            Style::default()
                .fg(theme.header_accent_fg)
                .bg(theme.header_accent_bg)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled(
            memory_label(&snapshot.memory),
            Style::default().fg(theme.text_primary),
        ),
        Span::raw("  "),
        Span::styled(format!("Procs: {}/{}", view.matched, view.total), secondary),
        Span::raw("  "),
        Span::styled(format!("Sort: {} {arrow}", sort.key.label()), secondary),
    ];

    let skipped = snapshot.skipped_count();
    if skipped > 0 {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            format!("Skipped: {skipped}"),
            Style::default().fg(theme.status_err),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), inner);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_label_shows_ram_and_swap() {
        let memory = MemoryStats {
            total_bytes: 8 * 1024 * 1024 * 1024,
            used_bytes: 2 * 1024 * 1024 * 1024,
            swap_total_bytes: 1024 * 1024 * 1024,
            swap_used_bytes: 256 * 1024 * 1024,
        };
        assert_eq!(
            memory_label(&memory),
            "RAM: 2048 MB / 8192 MB (25.0%) | Swap: 256 MB / 1024 MB (25.0%)"
        );
    }

    #[test]
    fn memory_label_without_swap() {
        let memory = MemoryStats {
            total_bytes: 1024 * 1024 * 1024,
            used_bytes: 512 * 1024 * 1024,
            ..MemoryStats::default()
        };
        assert!(memory_label(&memory).ends_with("Swap: 0 MB / 0 MB (0.0%)"));
    }
}
