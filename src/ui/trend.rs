use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph, Sparkline};

use crate::format::{format_memory_mb, truncate_unicode};
use crate::history::RollingHistory;
use crate::rank::top_unique_by_memory;
use crate::system::process::ProcessRecord;
use crate::ui::theme::Theme;

pub const TOP_MEMORY_COUNT: usize = 5;

fn titled_block<'a>(title: String, theme: &Theme) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.overlay_border))
        .title(Span::styled(
            title,
            Style::default()
                .fg(theme.text_secondary)
                .add_modifier(Modifier::BOLD),
        ))
}

/// Memory and swap sparklines above the heaviest processes by memory.
/// `records` is the unfiltered snapshot.
pub fn render(
    frame: &mut Frame,
    area: Rect,
    history: &RollingHistory,
    records: &[ProcessRecord],
    theme: &Theme,
) {
    let [memory_area, swap_area, top_area] = Layout::vertical([
        Constraint::Length(5),
        Constraint::Length(5),
        Constraint::Min(3),
    ])
    .areas(area);

    let latest = history.latest();

    let memory_title = match latest {
        Some(point) => format!(" Memory {:.1}% ", point.memory_percent),
        None => " Memory ".to_string(),
    };
    let memory_data = history.memory_series();
    frame.render_widget(
        Sparkline::default()
            .block(titled_block(memory_title, theme))
            .data(&memory_data)
            .max(10_000)
            .style(Style::default().fg(theme.sparkline_memory)),
        memory_area,
    );

    let swap_title = match latest {
        Some(point) => format!(" Swap {:.0} MB ", point.fault_indicator),
        None => " Swap ".to_string(),
    };
    let swap_data = history.fault_series();
    frame.render_widget(
        Sparkline::default()
            .block(titled_block(swap_title, theme))
            .data(&swap_data)
            .style(Style::default().fg(theme.sparkline_swap)),
        swap_area,
    );

    let top_block = titled_block(format!(" Top {TOP_MEMORY_COUNT} by memory "), theme);
    let inner = top_block.inner(top_area);
    let name_width = (inner.width as usize).saturating_sub(11);
    let lines: Vec<Line> = top_unique_by_memory(records, TOP_MEMORY_COUNT)
        .iter()
        .map(|record| {
            Line::from(vec![
                Span::styled(
                    format!("{:<width$}", truncate_unicode(&record.name, name_width), width = name_width),
                    Style::default().fg(theme.text_primary),
                ),
                Span::styled(
                    format!("{:>10} ", format_memory_mb(record.memory_mb)),
                    Style::default().fg(theme.accent),
                ),
            ])
        })
        .collect();

    frame.render_widget(top_block, top_area);
    frame.render_widget(Paragraph::new(lines), inner);
}
