use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::layout::Rect;
use ratatui::widgets::TableState;

use crate::action::{Action, Direction};
use crate::config::{Config, parse_key};
use crate::export::default_export_path;
use crate::pipeline::{View, ViewContext, apply_tick};
use crate::rank::SortKey;
use crate::system::snapshot::Snapshot;
use crate::ui::process_table;
use crate::ui::theme::Theme;
use crate::worker::{WorkerCommand, WorkerEvent};

const STATUS_TTL_SECS: u64 = 3;
const PAGE_SIZE: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Filter,
    Help,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatusMessage {
    pub text: String,
    pub is_error: bool,
    pub created: Instant,
}

#[derive(Debug, Clone)]
pub struct ResolvedKeybinds {
    pub quit: KeyCode,
    pub filter: KeyCode,
    pub cycle_sort: KeyCode,
    pub reverse_sort: KeyCode,
    pub export: KeyCode,
    pub refresh: KeyCode,
    pub cycle_theme: KeyCode,
    pub help: KeyCode,
}

impl ResolvedKeybinds {
    pub fn from_config(kb: &crate::config::KeybindsConfig) -> Self {
        Self {
            quit: parse_key(&kb.quit).unwrap_or(KeyCode::Char('q')),
            filter: parse_key(&kb.filter).unwrap_or(KeyCode::Char('/')),
            cycle_sort: parse_key(&kb.cycle_sort).unwrap_or(KeyCode::Char('s')),
            reverse_sort: parse_key(&kb.reverse_sort).unwrap_or(KeyCode::Char('r')),
            export: parse_key(&kb.export).unwrap_or(KeyCode::Char('e')),
            refresh: parse_key(&kb.refresh).unwrap_or(KeyCode::F(5)),
            cycle_theme: parse_key(&kb.cycle_theme).unwrap_or(KeyCode::Char('t')),
            help: parse_key(&kb.help).unwrap_or(KeyCode::Char('?')),
        }
    }

    /// Returns (key_label, description) pairs for all configurable keybinds.
    pub fn help_entries(&self) -> Vec<(String, &'static str)> {
        let mut entries = vec![
            (key_label(self.quit), "Quit"),
            (key_label(self.filter), "Search name or PID"),
            (key_label(self.cycle_sort), "Next sort column"),
            (key_label(self.reverse_sort), "Reverse sort order"),
            (key_label(self.export), "Export snapshot"),
            (key_label(self.refresh), "Refresh now"),
            (key_label(self.cycle_theme), "Cycle theme"),
            (key_label(self.help), "Toggle help"),
        ];
        entries.push(("1-7".to_string(), "Sort by column"));
        entries.push(("↑↓ PgUp PgDn".to_string(), "Move selection"));
        entries.push(("Ctrl+C".to_string(), "Quit (always)"));
        entries
    }
}

fn key_label(code: KeyCode) -> String {
    match code {
        KeyCode::Char(' ') => "Space".to_string(),
        KeyCode::Char(c) => c.to_string(),
        KeyCode::Enter => "Enter".to_string(),
        KeyCode::Esc => "Esc".to_string(),
        KeyCode::Tab => "Tab".to_string(),
        KeyCode::Backspace => "Bksp".to_string(),
        KeyCode::Delete => "Del".to_string(),
        KeyCode::F(n) => format!("F{n}"),
        _ => "?".to_string(),
    }
}

pub struct App {
    pub running: bool,
    pub ctx: ViewContext,
    pub snapshot: Arc<Snapshot>,
    pub view: View,
    pub table_state: TableState,
    pub input_mode: InputMode,
    pub status_message: Option<StatusMessage>,
    pub theme: Theme,
    pub table_area: Option<Rect>,
    pub export_dir: PathBuf,
    pub keybinds: ResolvedKeybinds,
}

impl App {
    pub fn new(config: &Config, ctx: ViewContext) -> Self {
        App {
            running: true,
            ctx,
            snapshot: Arc::new(Snapshot::default()),
            view: View::default(),
            table_state: TableState::default(),
            input_mode: InputMode::Normal,
            status_message: None,
            theme: Theme::from_config(&config.colors.theme),
            table_area: None,
            export_dir: config.export.directory.clone(),
            keybinds: ResolvedKeybinds::from_config(&config.keybinds),
        }
    }

    pub fn on_worker_event(&mut self, event: WorkerEvent) {
        match event {
            WorkerEvent::Sampled(snapshot) => self.on_snapshot(snapshot),
            WorkerEvent::Exported { path, count } => {
                self.set_status(
                    format!("Exported {count} processes to {}", path.display()),
                    false,
                );
            }
            WorkerEvent::ExportFailed(err) => {
                self.set_status(format!("Export failed: {err}"), true);
            }
        }
    }

    pub fn on_snapshot(&mut self, snapshot: Arc<Snapshot>) {
        let selected = self.selected_pid();
        self.view = apply_tick(&mut self.ctx, &snapshot);
        self.snapshot = snapshot;
        self.reselect(selected);

        if let Some(status) = &self.status_message
            && status.created.elapsed().as_secs() >= STATUS_TTL_SECS
        {
            self.status_message = None;
        }
    }

    /// Re-ranks the current snapshot after a sort or filter change.
    fn relayout(&mut self) {
        let selected = self.selected_pid();
        self.view = self.ctx.view(&self.snapshot);
        self.reselect(selected);
    }

    fn reselect(&mut self, pid: Option<u32>) {
        if self.view.records.is_empty() {
            self.table_state.select(None);
            return;
        }
        let index = pid
            .and_then(|pid| self.view.records.iter().position(|r| r.pid == pid))
            .unwrap_or_else(|| {
                self.table_state
                    .selected()
                    .unwrap_or(0)
                    .min(self.view.records.len() - 1)
            });
        self.table_state.select(Some(index));
    }

    pub fn map_key(&self, key: KeyEvent) -> Action {
        // Ctrl+C always quits (hardwired safety)
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return Action::Quit;
        }

        match self.input_mode {
            InputMode::Normal => self.map_key_normal(key),
            InputMode::Filter => self.map_key_filter(key),
            InputMode::Help => self.map_key_help(key),
        }
    }

    fn map_key_normal(&self, key: KeyEvent) -> Action {
        let code = key.code;
        let kb = &self.keybinds;

        // Navigation and column digits are hardwired (not configurable)
        match code {
            KeyCode::Up => return Action::Navigate(Direction::Up),
            KeyCode::Down => return Action::Navigate(Direction::Down),
            KeyCode::PageUp => return Action::Navigate(Direction::PageUp),
            KeyCode::PageDown => return Action::Navigate(Direction::PageDown),
            KeyCode::Home => return Action::Navigate(Direction::Top),
            KeyCode::End => return Action::Navigate(Direction::Bottom),
            KeyCode::Char(c @ '1'..='7') => {
                let column = c as usize - '1' as usize;
                return SortKey::from_column(column).map_or(Action::None, Action::SortBy);
            }
            _ => {}
        }

        if code == kb.quit {
            return Action::Quit;
        }
        if code == kb.filter {
            return Action::EnterFilterMode;
        }
        if code == kb.cycle_sort {
            return Action::CycleSortKey;
        }
        if code == kb.reverse_sort {
            return Action::ReverseSort;
        }
        if code == kb.export {
            return Action::Export;
        }
        if code == kb.refresh {
            return Action::Refresh;
        }
        if code == kb.cycle_theme {
            return Action::CycleTheme;
        }
        if code == kb.help {
            return Action::ToggleHelp;
        }
        if code == KeyCode::Esc && !self.ctx.filter.is_empty() {
            return Action::ClearFilter;
        }

        Action::None
    }

    fn map_key_help(&self, key: KeyEvent) -> Action {
        let code = key.code;
        // In help mode, only the help key and Esc dismiss, everything else is ignored
        if code == self.keybinds.help || code == KeyCode::Esc {
            return Action::ToggleHelp;
        }
        Action::None
    }

    fn map_key_filter(&self, key: KeyEvent) -> Action {
        match key.code {
            KeyCode::Esc => Action::ClearFilter,
            KeyCode::Enter => Action::ExitFilterMode,
            KeyCode::Backspace => {
                let mut text = self.ctx.filter.clone();
                text.pop();
                Action::UpdateFilter(text)
            }
            KeyCode::Char(c) => {
                let mut text = self.ctx.filter.clone();
                text.push(c);
                Action::UpdateFilter(text)
            }
            _ => Action::None,
        }
    }

    /// Applies an action; returns work for the sampling worker, if any.
    pub fn dispatch(&mut self, action: Action) -> Option<WorkerCommand> {
        match action {
            Action::Quit => self.running = false,
            Action::Navigate(dir) => self.navigate(dir),
            Action::EnterFilterMode => {
                self.input_mode = InputMode::Filter;
            }
            Action::ExitFilterMode => {
                self.input_mode = InputMode::Normal;
            }
            Action::ClearFilter => {
                self.ctx.filter.clear();
                self.input_mode = InputMode::Normal;
                self.relayout();
            }
            Action::UpdateFilter(text) => {
                self.ctx.filter = text;
                self.relayout();
            }
            Action::SortBy(key) => {
                self.ctx.sort = self.ctx.sort.select(key);
                self.relayout();
            }
            Action::CycleSortKey => {
                self.ctx.sort.key = self.ctx.sort.key.next();
                self.relayout();
            }
            Action::ReverseSort => {
                self.ctx.sort = self.ctx.sort.reversed();
                self.relayout();
            }
            Action::Export => {
                let path = default_export_path(&self.export_dir);
                self.set_status(format!("Exporting to {}…", path.display()), false);
                return Some(WorkerCommand::Export(path));
            }
            Action::Refresh => return Some(WorkerCommand::Refresh),
            Action::CycleTheme => {
                self.theme = self.theme.next();
            }
            Action::ToggleHelp => {
                self.input_mode = if self.input_mode == InputMode::Help {
                    InputMode::Normal
                } else {
                    InputMode::Help
                };
            }
            Action::ClickAt(col, row) => self.click_at(col, row),
            Action::None => {}
        }
        None
    }

    fn navigate(&mut self, direction: Direction) {
        let len = self.view.records.len();
        if len == 0 {
            return;
        }
        let current = self.table_state.selected().unwrap_or(0);
        let next = match direction {
            Direction::Up => current.saturating_sub(1),
            Direction::Down => current + 1,
            Direction::PageUp => current.saturating_sub(PAGE_SIZE),
            Direction::PageDown => current + PAGE_SIZE,
            Direction::Top => 0,
            Direction::Bottom => len - 1,
        };
        self.table_state.select(Some(next.min(len - 1)));
    }

    /// Header clicks sort by that column; body clicks select a row.
    fn click_at(&mut self, col: u16, row: u16) {
        let Some(area) = self.table_area else {
            return;
        };
        if col < area.x || col >= area.x + area.width || row < area.y || row >= area.y + area.height
        {
            return;
        }

        let header_row = area.y + 1;
        if row == header_row {
            if let Some(key) = process_table::column_at(area, col) {
                self.dispatch(Action::SortBy(key));
            }
        } else if row > header_row {
            let index = self.table_state.offset() + (row - header_row - 1) as usize;
            if index < self.view.records.len() {
                self.table_state.select(Some(index));
            }
        }
    }

    pub fn selected_pid(&self) -> Option<u32> {
        self.table_state
            .selected()
            .and_then(|i| self.view.records.get(i))
            .map(|r| r.pid)
    }

    pub fn show_help(&self) -> bool {
        self.input_mode == InputMode::Help
    }

    pub fn help_entries(&self) -> Vec<(String, &'static str)> {
        self.keybinds.help_entries()
    }

    fn set_status(&mut self, text: String, is_error: bool) {
        self.status_message = Some(StatusMessage {
            text,
            is_error,
            created: Instant::now(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rank::SortSpec;
    use crate::system::process::{MemoryStats, ProcessRecord};

    fn make_record(pid: u32, name: &str, memory_mb: f64, cpu_percent: f64) -> ProcessRecord {
        ProcessRecord {
            memory_mb,
            cpu_percent,
            ..ProcessRecord::new(pid, name)
        }
    }

    fn make_snapshot(records: Vec<ProcessRecord>) -> Arc<Snapshot> {
        Arc::new(Snapshot {
            records,
            memory: MemoryStats {
                total_bytes: 1000,
                used_bytes: 500,
                swap_total_bytes: 0,
                swap_used_bytes: 0,
            },
            issues: Vec::new(),
        })
    }

    fn make_test_app() -> App {
        let mut app = App::new(&Config::default(), ViewContext::default());
        app.on_snapshot(make_snapshot(vec![
            make_record(1, "low_cpu", 500.0, 5.0),
            make_record(2, "high_cpu", 100.0, 90.0),
            make_record(3, "mid_cpu", 300.0, 50.0),
        ]));
        app
    }

    fn labels(app: &App) -> Vec<&str> {
        app.view.records.iter().map(|r| r.name.as_str()).collect()
    }

    #[test]
    fn default_view_orders_by_cpu_descending() {
        let app = make_test_app();
        assert_eq!(labels(&app), vec!["high_cpu", "mid_cpu", "low_cpu"]);
        assert_eq!(app.ctx.history.len(), 1);
        assert_eq!(app.table_state.selected(), Some(0));
    }

    #[test]
    fn column_digits_select_and_toggle_sort() {
        let mut app = make_test_app();
        let key = KeyEvent::new(KeyCode::Char('3'), KeyModifiers::NONE);
        let action = app.map_key(key);
        assert_eq!(action, Action::SortBy(SortKey::Memory));

        app.dispatch(action.clone());
        assert_eq!(app.ctx.sort, SortSpec::new(SortKey::Memory, false));
        assert_eq!(labels(&app), vec!["high_cpu", "mid_cpu", "low_cpu"]);

        app.dispatch(action);
        assert_eq!(app.ctx.sort, SortSpec::new(SortKey::Memory, true));
        assert_eq!(labels(&app), vec!["low_cpu", "mid_cpu", "high_cpu"]);
    }

    #[test]
    fn filter_keys_build_query_and_rerank() {
        let mut app = make_test_app();
        app.dispatch(Action::EnterFilterMode);
        for c in "MID".chars() {
            let action = app.map_key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE));
            app.dispatch(action);
        }
        assert_eq!(app.ctx.filter, "MID");
        assert_eq!(labels(&app), vec!["mid_cpu"]);

        let action = app.map_key(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE));
        assert_eq!(action, Action::ClearFilter);
        app.dispatch(action);
        assert_eq!(app.view.records.len(), 3);
        assert_eq!(app.input_mode, InputMode::Normal);
    }

    #[test]
    fn selection_follows_pid_across_refreshes() {
        let mut app = make_test_app();
        app.dispatch(Action::Navigate(Direction::Down));
        assert_eq!(app.selected_pid(), Some(3));

        app.on_snapshot(make_snapshot(vec![
            make_record(3, "mid_cpu", 300.0, 95.0),
            make_record(2, "high_cpu", 100.0, 90.0),
        ]));
        assert_eq!(app.selected_pid(), Some(3));
        assert_eq!(app.table_state.selected(), Some(0));
        assert_eq!(app.ctx.history.len(), 2);
    }

    #[test]
    fn export_and_refresh_are_forwarded_to_the_worker() {
        let mut app = make_test_app();
        match app.dispatch(Action::Export) {
            Some(WorkerCommand::Export(path)) => {
                assert!(path.to_string_lossy().contains("process_data_"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
        assert_eq!(app.dispatch(Action::Refresh), Some(WorkerCommand::Refresh));
        assert_eq!(app.dispatch(Action::ReverseSort), None);
    }

    #[test]
    fn export_results_become_status_messages() {
        let mut app = make_test_app();
        app.on_worker_event(WorkerEvent::ExportFailed("disk full".to_string()));
        let status = app.status_message.clone().unwrap();
        assert!(status.is_error);
        assert_eq!(status.text, "Export failed: disk full");

        app.on_worker_event(WorkerEvent::Exported {
            path: PathBuf::from("out.csv"),
            count: 3,
        });
        let status = app.status_message.clone().unwrap();
        assert!(!status.is_error);
        assert_eq!(status.text, "Exported 3 processes to out.csv");
    }

    #[test]
    fn default_keybinds_map_to_actions() {
        let app = make_test_app();
        let press = |code| app.map_key(KeyEvent::new(code, KeyModifiers::NONE));

        assert_eq!(press(KeyCode::Char('q')), Action::Quit);
        assert_eq!(press(KeyCode::Char('/')), Action::EnterFilterMode);
        assert_eq!(press(KeyCode::Char('s')), Action::CycleSortKey);
        assert_eq!(press(KeyCode::Char('r')), Action::ReverseSort);
        assert_eq!(press(KeyCode::Char('e')), Action::Export);
        assert_eq!(press(KeyCode::F(5)), Action::Refresh);
        assert_eq!(press(KeyCode::Char('?')), Action::ToggleHelp);
        assert_eq!(press(KeyCode::Char('8')), Action::None);
        assert_eq!(
            app.map_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Action::Quit
        );
    }

    #[test]
    fn help_mode_blocks_other_keys() {
        let mut app = make_test_app();
        app.dispatch(Action::ToggleHelp);
        assert!(app.show_help());

        let key = KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE);
        assert_eq!(app.map_key(key), Action::None);

        let key = KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE);
        assert_eq!(app.map_key(key), Action::ToggleHelp);
        app.dispatch(Action::ToggleHelp);
        assert!(!app.show_help());
    }

    #[test]
    fn header_click_sorts_and_row_click_selects() {
        let mut app = make_test_app();
        app.table_area = Some(Rect::new(0, 3, 80, 20));

        // First column starts right after the left border.
        app.dispatch(Action::ClickAt(1, 4));
        assert_eq!(app.ctx.sort, SortSpec::new(SortKey::Pid, false));
        assert_eq!(app.view.records[0].pid, 1);

        app.dispatch(Action::ClickAt(10, 7));
        assert_eq!(app.table_state.selected(), Some(2));
    }
}
