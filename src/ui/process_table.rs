use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{
    Block, BorderType, Borders, Cell, HighlightSpacing, Row, Table, TableState,
};

use crate::format::{format_cpu, format_memory_mb, format_priority, format_rate, truncate_unicode};
use crate::pipeline::View;
use crate::rank::{SortKey, SortSpec};
use crate::ui::theme::Theme;

const COLUMN_SPACING: u16 = 1;
const MIN_NAME_WIDTH: u16 = 8;

fn header_label(key: SortKey) -> &'static str {
    match key {
        SortKey::Pid => "PID",
        SortKey::Name => "Name",
        SortKey::Memory => "Mem MB",
        SortKey::Cpu => "CPU %",
        SortKey::DiskRead => "Read KB/s",
        SortKey::DiskWrite => "Write KB/s",
        SortKey::Priority => "Prio",
    }
}

fn fixed_width(key: SortKey) -> Option<u16> {
    match key {
        SortKey::Pid => Some(8),
        SortKey::Name => None,
        SortKey::Memory => Some(10),
        SortKey::Cpu => Some(8),
        SortKey::DiskRead => Some(12),
        SortKey::DiskWrite => Some(13),
        SortKey::Priority => Some(7),
    }
}

/// Column widths for a table drawn in `area` (borders included).
pub fn column_widths(area: Rect) -> [u16; 7] {
    let inner_width = area.width.saturating_sub(2);
    let fixed: u16 = SortKey::ALL.iter().filter_map(|k| fixed_width(*k)).sum();
    let spacing = COLUMN_SPACING * (SortKey::ALL.len() as u16 - 1);
    let name_width = inner_width
        .saturating_sub(fixed + spacing)
        .max(MIN_NAME_WIDTH);
    SortKey::ALL.map(|k| fixed_width(k).unwrap_or(name_width))
}

/// Which column a terminal x coordinate falls in. Gaps between columns hit nothing.
pub fn column_at(area: Rect, x: u16) -> Option<SortKey> {
    let mut start = area.x + 1;
    for (key, width) in SortKey::ALL.iter().zip(column_widths(area)) {
        if x >= start && x < start + width {
            return Some(*key);
        }
        start += width + COLUMN_SPACING;
    }
    None
}

pub fn render(
    frame: &mut Frame,
    area: Rect,
    view: &View,
    sort: SortSpec,
    state: &mut TableState,
    theme: &Theme,
) {
    let widths = column_widths(area);
    let name_width = widths[SortKey::Name.column()] as usize;

    let header_style = Style::default()
        .fg(theme.table_header_fg)
        .add_modifier(Modifier::BOLD);
    let header = Row::new(SortKey::ALL.map(|key| {
        let mut label = header_label(key).to_string();
        if key == sort.key {
            label.push(' ');
            label.push_str(if sort.descending { "\u{25bc}" } else { "\u{25b2}" });
        }
        let style = if key == sort.key {
            header_style.add_modifier(Modifier::UNDERLINED)
        } else {
            header_style
        };
        Cell::from(label).style(style)
    }));

    let rows = view.records.iter().map(|record| {
        Row::new(vec![
            Cell::from(Line::from(record.pid.to_string()).alignment(Alignment::Right)),
            Cell::from(truncate_unicode(&record.name, name_width)),
            Cell::from(Line::from(format_memory_mb(record.memory_mb)).alignment(Alignment::Right)),
            Cell::from(
                Line::from(Span::styled(
                    format_cpu(record.cpu_percent),
                    Style::default().fg(theme.cpu_color(record.cpu_percent)),
                ))
                .alignment(Alignment::Right),
            ),
            Cell::from(Line::from(format_rate(record.disk_read_delta)).alignment(Alignment::Right)),
            Cell::from(Line::from(format_rate(record.disk_write_delta)).alignment(Alignment::Right)),
            Cell::from(Line::from(format_priority(record.priority)).alignment(Alignment::Right)),
        ])
        .style(Style::default().fg(theme.text_primary))
    });

    let title = format!(" Processes {}/{} ", view.records.len(), view.total);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.overlay_border))
        .title(Span::styled(
            title,
            Style::default()
                .fg(theme.text_secondary)
                .add_modifier(Modifier::BOLD),
        ));

    let table = Table::new(rows, widths.map(Constraint::Length))
        .header(header)
        .block(block)
        .column_spacing(COLUMN_SPACING)
        .highlight_spacing(HighlightSpacing::Never)
        .row_highlight_style(
            Style::default()
                .fg(theme.selection_fg)
                .bg(theme.selection_bg)
                .add_modifier(Modifier::BOLD),
        );

    frame.render_stateful_widget(table, area, state);
}
