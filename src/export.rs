//! Export functionality for the session history
//!
//! Maps the append-only snapshot history to a fixed seven-column table and
//! persists it as CSV (and JSON when the `json` feature is enabled).

use crate::error::{NmeaError, Result};
use crate::types::{HistoryEntry, ReceiverSnapshot};
use std::path::{Path, PathBuf};

/// Column order of the exported history table
pub const HISTORY_COLUMNS: [&str; 7] = [
    "UTC Time",
    "Latitude",
    "Longitude",
    "Fix Status",
    "PDOP",
    "HDOP",
    "VDOP",
];

/// Log file used when none is given
pub const DEFAULT_LOG_FILE: &str = "GPS_LOG/log.csv";

/// Export options for controlling output formats
#[derive(Debug, Clone)]
pub struct ExportOptions {
    pub csv: bool,
    pub json: bool,
    pub log_file: PathBuf,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            csv: true,
            json: false,
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
        }
    }
}

/// Paths written by an export
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportReport {
    pub csv_path: Option<PathBuf>,
    pub json_path: Option<PathBuf>,
    pub rows: usize,
}

/// Output paths derived from the configured log file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportPaths {
    pub csv: PathBuf,
    pub json: PathBuf,
}

/// The CSV goes to `log_file` itself, the JSON next to it with a `.json` extension
pub fn compute_export_paths(options: &ExportOptions) -> ExportPaths {
    ExportPaths {
        csv: options.log_file.clone(),
        json: options.log_file.with_extension("json"),
    }
}

/// One row of text per history entry, in `HISTORY_COLUMNS` order
pub fn history_rows(history: &[HistoryEntry]) -> Vec<[String; 7]> {
    history
        .iter()
        .map(|entry| {
            [
                entry.utc_time.clone(),
                entry.latitude.to_string(),
                entry.longitude.to_string(),
                entry.fix_status.to_string(),
                entry.pdop.to_string(),
                entry.hdop.to_string(),
                entry.vdop.to_string(),
            ]
        })
        .collect()
}

fn export_io(path: &Path, err: std::io::Error) -> NmeaError {
    NmeaError::Export(format!("{}: {}", path.display(), err))
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| export_io(parent, e))?;
        }
    }
    Ok(())
}

/// Write the header row and one row per history entry
#[cfg(feature = "csv")]
pub fn write_history_csv<W: std::io::Write>(history: &[HistoryEntry], writer: W) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(HISTORY_COLUMNS)?;
    for row in history_rows(history) {
        csv_writer.write_record(&row)?;
    }
    csv_writer
        .flush()
        .map_err(|e| NmeaError::Export(format!("CSV flush failed: {}", e)))?;
    Ok(())
}

/// Export the snapshot history to the configured CSV file
#[cfg(feature = "csv")]
pub fn export_to_csv(snapshot: &ReceiverSnapshot, options: &ExportOptions) -> Result<PathBuf> {
    let path = compute_export_paths(options).csv;
    ensure_parent_dir(&path)?;

    let file = std::fs::File::create(&path).map_err(|e| export_io(&path, e))?;
    write_history_csv(&snapshot.history, std::io::BufWriter::new(file))?;

    log::info!(
        "Wrote {} history rows to {}",
        snapshot.history.len(),
        path.display()
    );
    Ok(path)
}

/// Export the snapshot history as a JSON array next to the CSV file
#[cfg(feature = "json")]
pub fn export_to_json(snapshot: &ReceiverSnapshot, options: &ExportOptions) -> Result<PathBuf> {
    use std::io::Write;

    let path = compute_export_paths(options).json;
    ensure_parent_dir(&path)?;

    let file = std::fs::File::create(&path).map_err(|e| export_io(&path, e))?;
    let mut writer = std::io::BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, &snapshot.history)
        .map_err(|e| NmeaError::Export(format!("JSON serialization failed: {}", e)))?;
    writer.flush().map_err(|e| export_io(&path, e))?;

    log::info!("Wrote history JSON to {}", path.display());
    Ok(path)
}

/// Run every export enabled in `options`
pub fn export_session(snapshot: &ReceiverSnapshot, options: &ExportOptions) -> Result<ExportReport> {
    let mut report = ExportReport {
        rows: snapshot.history.len(),
        ..ExportReport::default()
    };

    if options.csv {
        #[cfg(feature = "csv")]
        {
            report.csv_path = Some(export_to_csv(snapshot, options)?);
        }
        #[cfg(not(feature = "csv"))]
        {
            return Err(NmeaError::Export(
                "CSV export requested but the `csv` feature is disabled".to_string(),
            ));
        }
    }

    if options.json {
        #[cfg(feature = "json")]
        {
            report.json_path = Some(export_to_json(snapshot, options)?);
        }
        #[cfg(not(feature = "json"))]
        {
            return Err(NmeaError::Export(
                "JSON export requested but the `json` feature is disabled".to_string(),
            ));
        }
    }

    Ok(report)
}
