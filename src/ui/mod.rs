pub mod header;
pub mod help;
pub mod process_table;
pub mod statusbar;
pub mod theme;
pub mod trend;

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout};

use crate::app::App;

/// Below this width the trend panel is hidden and the table gets everything.
const TREND_PANEL_MIN_TOTAL_WIDTH: u16 = 100;
const TREND_PANEL_WIDTH: u16 = 34;

pub fn draw(frame: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(frame.area());

    let content_area = chunks[1];
    let table_area = if content_area.width >= TREND_PANEL_MIN_TOTAL_WIDTH {
        let h_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(20), Constraint::Length(TREND_PANEL_WIDTH)])
            .split(content_area);
        trend::render(
            frame,
            h_chunks[1],
            &app.ctx.history,
            &app.snapshot.records,
            &app.theme,
        );
        h_chunks[0]
    } else {
        content_area
    };

    app.table_area = Some(table_area);
    process_table::render(
        frame,
        table_area,
        &app.view,
        app.ctx.sort,
        &mut app.table_state,
        &app.theme,
    );

    header::render(
        frame,
        chunks[0],
        &app.snapshot,
        &app.view,
        app.ctx.sort,
        &app.theme,
    );
    statusbar::render(
        frame,
        chunks[2],
        app.input_mode,
        &app.ctx.filter,
        app.status_message.as_ref(),
        &app.theme,
    );

    // Help overlay rendered last to appear on top
    if app.show_help() {
        help::render(frame, frame.area(), &app.help_entries(), &app.theme);
    }
}
