use std::io::{Write, stdout};
use std::path::PathBuf;

use clap::Parser;
use color_eyre::Result;
use color_eyre::eyre::eyre;
use crossterm::event::{
    DisableMouseCapture, EnableMouseCapture, KeyEventKind, MouseButton, MouseEventKind,
};
use crossterm::execute;
use tokio::sync::mpsc;

use procscope::action::{Action, Direction};
use procscope::app::App;
use procscope::config::{Config, load_config};
use procscope::event::{Event, EventHandler};
use procscope::export::export_to_path;
use procscope::format::{format_cpu, format_memory_mb, format_priority, format_rate, truncate_unicode};
use procscope::logging::{init_file_logging, init_stderr_logging};
use procscope::pipeline::{View, ViewContext, apply_tick};
use procscope::rank::{SortKey, SortSpec};
use procscope::system::collector::Collector;
use procscope::system::derive::MIN_RATE_WINDOW;
use procscope::ui;
use procscope::worker::SamplingWorker;

#[derive(Parser)]
#[command(
    name = "procscope",
    about = "TUI process monitor ranking memory, CPU, disk I/O and priority"
)]
struct Cli {
    /// Path to config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Refresh rate in milliseconds
    #[arg(long)]
    refresh_rate: Option<u64>,

    /// Sort column: pid, name, memory, cpu, read, write, priority
    #[arg(long)]
    sort: Option<String>,

    /// Sort lowest first
    #[arg(long, default_value_t = false)]
    ascending: bool,

    /// Initial search text (name substring or PID)
    #[arg(long)]
    filter: Option<String>,

    /// Show at most this many processes
    #[arg(long)]
    top: Option<usize>,

    /// Sample, write every process to PATH (CSV, or JSON for .json) and exit
    #[arg(long, value_name = "PATH")]
    export: Option<PathBuf>,

    /// Sample, print the ranked table to stdout and exit
    #[arg(long, default_value_t = false, conflicts_with = "export")]
    print: bool,

    /// Write JSON logs to this file
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    let (mut config, config_error) = load_config(cli.config.as_deref());
    apply_cli_overrides(&mut config, &cli);

    let headless = cli.print || cli.export.is_some();
    let log_file = cli.log_file.clone().or_else(|| config.logging.file.clone());
    match log_file {
        Some(path) => init_file_logging(&path, config.logging.level())?,
        None if headless => init_stderr_logging(config.logging.level())?,
        None => {}
    }
    if let Some(err) = config_error {
        tracing::warn!(error = %err, "using default configuration");
    }

    let ctx = ViewContext::new(
        sort_spec_for_cli(&config, &cli)?,
        cli.filter.clone().unwrap_or_default(),
        cli.top.or_else(|| config.top_n()),
    );
    let collector = Collector::new(config.probe_deadline());

    if headless {
        return run_headless(collector, ctx, &config, &cli).await;
    }

    let mut terminal = ratatui::init();
    execute!(stdout(), EnableMouseCapture)?;

    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = execute!(std::io::stdout(), DisableMouseCapture);
        ratatui::restore();
        original_hook(panic_info);
    }));

    let result = run(&mut terminal, &config, ctx, collector).await;

    execute!(stdout(), DisableMouseCapture)?;
    ratatui::restore();

    result
}

fn apply_cli_overrides(config: &mut Config, cli: &Cli) {
    if let Some(rate) = cli.refresh_rate {
        config.general.refresh_rate_ms = rate;
    }
}

fn sort_spec_for_cli(config: &Config, cli: &Cli) -> Result<SortSpec> {
    let mut spec = match &cli.sort {
        Some(name) => SortSpec::new(name.parse::<SortKey>()?, config.general.sort_descending),
        None => config.sort_spec()?,
    };
    if cli.ascending {
        spec.descending = false;
    }
    Ok(spec)
}

async fn run(
    terminal: &mut ratatui::DefaultTerminal,
    config: &Config,
    ctx: ViewContext,
    collector: Collector,
) -> Result<()> {
    let (worker_tx, worker_rx) = mpsc::unbounded_channel();
    let worker = SamplingWorker::spawn(collector, config.refresh_interval(), worker_tx);
    let mut events = EventHandler::new(worker_rx);
    let mut app = App::new(config, ctx);

    let result = event_loop(terminal, &mut app, &mut events, &worker).await;
    worker.shutdown().await;
    result
}

async fn event_loop(
    terminal: &mut ratatui::DefaultTerminal,
    app: &mut App,
    events: &mut EventHandler,
    worker: &SamplingWorker,
) -> Result<()> {
    terminal.draw(|frame| ui::draw(frame, app))?;

    while app.running {
        let Some(event) = events.next().await else {
            return Err(eyre!("event stream closed"));
        };
        let action = match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => app.map_key(key),
            Event::Key(_) => continue,
            Event::Mouse(mouse) => match mouse.kind {
                MouseEventKind::Down(MouseButton::Left) => Action::ClickAt(mouse.column, mouse.row),
                MouseEventKind::ScrollDown => Action::Navigate(Direction::Down),
                MouseEventKind::ScrollUp => Action::Navigate(Direction::Up),
                _ => continue,
            },
            Event::Resize => Action::None,
            Event::Worker(worker_event) => {
                app.on_worker_event(worker_event);
                Action::None
            }
        };
        if let Some(command) = app.dispatch(action) {
            worker.send(command);
        }
        terminal.draw(|frame| ui::draw(frame, app))?;
    }

    Ok(())
}

/// Two passes one interval apart so rates have a baseline.
async fn run_headless(
    mut collector: Collector,
    mut ctx: ViewContext,
    config: &Config,
    cli: &Cli,
) -> Result<()> {
    let interval = config.refresh_interval().max(MIN_RATE_WINDOW);
    let snapshot = tokio::task::spawn_blocking(move || {
        collector.refresh();
        std::thread::sleep(interval);
        collector.refresh()
    })
    .await?;

    if snapshot.skipped_count() > 0 {
        tracing::info!(skipped = snapshot.skipped_count(), "some processes were skipped");
    }

    if let Some(path) = &cli.export {
        let count = export_to_path(path, &snapshot.records)?;
        println!("Exported {count} processes to {}", path.display());
        return Ok(());
    }

    let view = apply_tick(&mut ctx, &snapshot);
    print_view(&view)?;
    Ok(())
}

fn print_view(view: &View) -> Result<()> {
    const NAME_WIDTH: usize = 24;
    let mut out = stdout().lock();
    writeln!(
        out,
        "{:>8} {:<NAME_WIDTH$} {:>10} {:>8} {:>12} {:>12} {:>8}",
        "PID", "Name", "Mem MB", "CPU %", "Read KB/s", "Write KB/s", "Prio"
    )?;
    for record in &view.records {
        writeln!(
            out,
            "{:>8} {:<NAME_WIDTH$} {:>10} {:>8} {:>12} {:>12} {:>8}",
            record.pid,
            truncate_unicode(&record.name, NAME_WIDTH),
            format_memory_mb(record.memory_mb),
            format_cpu(record.cpu_percent),
            format_rate(record.disk_read_delta),
            format_rate(record.disk_write_delta),
            format_priority(record.priority),
        )?;
    }
    writeln!(out, "{} of {} processes", view.records.len(), view.total)?;
    Ok(())
}
