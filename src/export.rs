//! CSV/JSON export of full snapshots

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};
use serde::Serialize;

use crate::error::MonitorError;
use crate::rank::SortKey;
use crate::system::process::ProcessRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    /// `.json` selects JSON; anything else is CSV.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => ExportFormat::Json,
            _ => ExportFormat::Csv,
        }
    }
}

/// One exported record, fields in column order.
#[derive(Debug, Serialize, PartialEq)]
pub struct ExportRow {
    #[serde(rename = "PID")]
    pub pid: u32,
    #[serde(rename = "Process Name")]
    pub name: String,
    #[serde(rename = "Memory (MB)")]
    pub memory_mb: f64,
    #[serde(rename = "CPU (%)")]
    pub cpu_percent: f64,
    #[serde(rename = "Disk Read")]
    pub disk_read: f64,
    #[serde(rename = "Disk Write")]
    pub disk_write: f64,
    #[serde(rename = "Priority")]
    pub priority: Option<i32>,
}

impl From<&ProcessRecord> for ExportRow {
    fn from(record: &ProcessRecord) -> Self {
        ExportRow {
            pid: record.pid,
            name: record.name.clone(),
            memory_mb: round_2(record.memory_mb),
            cpu_percent: round_2(record.cpu_percent),
            disk_read: round_2(record.disk_read_delta),
            disk_write: round_2(record.disk_write_delta),
            priority: record.priority,
        }
    }
}

fn round_2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Wraps in quotes if the field contains a comma, quote or newline.
fn escape_csv(s: &str) -> String {
    if s.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

pub fn write_csv<W: Write>(mut writer: W, records: &[ProcessRecord]) -> io::Result<()> {
    let header: Vec<&str> = SortKey::ALL.iter().map(|key| key.label()).collect();
    writeln!(writer, "{}", header.join(","))?;

    for record in records {
        let priority = record.priority.map(|p| p.to_string()).unwrap_or_default();
        writeln!(
            writer,
            "{},{},{:.2},{:.1},{:.2},{:.2},{}",
            record.pid,
            escape_csv(&record.name),
            record.memory_mb,
            record.cpu_percent,
            record.disk_read_delta,
            record.disk_write_delta,
            priority,
        )?;
    }

    writer.flush()
}

pub fn write_json<W: Write>(mut writer: W, records: &[ProcessRecord]) -> io::Result<()> {
    let rows: Vec<ExportRow> = records.iter().map(ExportRow::from).collect();
    serde_json::to_writer_pretty(&mut writer, &rows)?;
    writeln!(writer)?;
    writer.flush()
}

pub fn write_records<W: Write>(
    writer: W,
    records: &[ProcessRecord],
    format: ExportFormat,
) -> io::Result<()> {
    match format {
        ExportFormat::Csv => write_csv(writer, records),
        ExportFormat::Json => write_json(writer, records),
    }
}

/// Writes every record to `path`, returning how many were written.
pub fn export_to_path(path: &Path, records: &[ProcessRecord]) -> Result<usize, MonitorError> {
    let wrap = |source| MonitorError::ExportFailure {
        path: path.to_path_buf(),
        source,
    };
    let file = File::create(path).map_err(wrap)?;
    write_records(BufWriter::new(file), records, ExportFormat::from_path(path)).map_err(wrap)?;

    tracing::info!(path = %path.display(), count = records.len(), "exported snapshot");
    Ok(records.len())
}

pub fn default_file_name(at: NaiveDateTime) -> String {
    format!("process_data_{}.csv", at.format("%Y-%m-%d_%H-%M-%S"))
}

pub fn default_export_path(directory: &Path) -> PathBuf {
    directory.join(default_file_name(Local::now().naive_local()))
}
