// src/report/writer.rs - Writes a ConsolidatedReport as a JSON workbook or a CSV directory
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use log::{debug, info};
use serde::Serialize;
use std::fmt;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::models::crawl::CrawlSite;
use crate::models::matching::{ConsolidatedReport, SignalResultTable};
use crate::report::{row_cells, sheet_columns};

/// Run details stamped onto every report.
#[derive(Debug, Clone)]
pub struct ReportMetadata {
    pub run_id: String,
    pub generated_at: DateTime<Utc>,
    pub legacy_source: Option<String>,
    pub new_source: Option<String>,
}

impl ReportMetadata {
    pub fn new(run_id: &str, legacy: &CrawlSite, new: &CrawlSite) -> Self {
        Self {
            run_id: run_id.to_string(),
            generated_at: Utc::now(),
            legacy_source: legacy.source.as_ref().map(|p| p.display().to_string()),
            new_source: new.source.as_ref().map(|p| p.display().to_string()),
        }
    }
}

pub trait ReportWriter {
    /// Writes all five sheets and returns the path of the artifact created.
    fn write(&self, report: &ConsolidatedReport, metadata: &ReportMetadata) -> Result<PathBuf>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    #[default]
    Json,
    Csv,
}

impl ReportFormat {
    pub fn default_output(&self) -> PathBuf {
        match self {
            ReportFormat::Json => PathBuf::from("mapped_urls.json"),
            ReportFormat::Csv => PathBuf::from("mapped_urls"),
        }
    }

    pub fn writer(&self, output: PathBuf) -> Box<dyn ReportWriter + Send + Sync> {
        match self {
            ReportFormat::Json => Box::new(JsonWorkbookWriter::new(output)),
            ReportFormat::Csv => Box::new(CsvDirectoryWriter::new(output)),
        }
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportFormat::Json => f.write_str("json"),
            ReportFormat::Csv => f.write_str("csv"),
        }
    }
}

impl FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(ReportFormat::Json),
            "csv" => Ok(ReportFormat::Csv),
            other => Err(format!("unknown report format '{}' (expected json or csv)", other)),
        }
    }
}

#[derive(Serialize)]
struct JsonWorkbook<'a> {
    run_id: &'a str,
    generated_at: DateTime<Utc>,
    legacy_source: Option<&'a str>,
    new_source: Option<&'a str>,
    sheets: Vec<JsonSheet<'a>>,
}

#[derive(Serialize)]
struct JsonSheet<'a> {
    name: &'a str,
    columns: &'static [&'static str],
    rows: Vec<Vec<serde_json::Value>>,
}

impl<'a> JsonSheet<'a> {
    fn from_table(table: &'a SignalResultTable) -> Self {
        Self {
            name: table.sheet_name(),
            columns: sheet_columns(table.signal),
            rows: table
                .rows
                .iter()
                .map(|row| row_cells(table.signal, row).iter().map(|c| c.to_json()).collect())
                .collect(),
        }
    }
}

/// One JSON document holding every sheet in order.
pub struct JsonWorkbookWriter {
    path: PathBuf,
}

impl JsonWorkbookWriter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl ReportWriter for JsonWorkbookWriter {
    fn write(&self, report: &ConsolidatedReport, metadata: &ReportMetadata) -> Result<PathBuf> {
        ensure_parent_dir(&self.path)?;
        let workbook = JsonWorkbook {
            run_id: &metadata.run_id,
            generated_at: metadata.generated_at,
            legacy_source: metadata.legacy_source.as_deref(),
            new_source: metadata.new_source.as_deref(),
            sheets: report.tables().iter().map(JsonSheet::from_table).collect(),
        };

        let file = File::create(&self.path)
            .with_context(|| format!("Failed to create report file {}", self.path.display()))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, &workbook)
            .with_context(|| format!("Failed to serialize report to {}", self.path.display()))?;
        writer
            .flush()
            .with_context(|| format!("Failed to flush report file {}", self.path.display()))?;

        info!(
            "💾 Wrote JSON workbook with {} sheets ({} rows) to {}",
            workbook.sheets.len(),
            report.total_rows(),
            self.path.display()
        );
        Ok(self.path.clone())
    }
}

/// A directory with one CSV file per sheet, named `NN - <Sheet>.csv`.
pub struct CsvDirectoryWriter {
    dir: PathBuf,
}

impl CsvDirectoryWriter {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn sheet_file_name(position: usize, sheet_name: &str) -> String {
        format!("{:02} - {}.csv", position, sheet_name)
    }

    fn write_sheet(&self, position: usize, table: &SignalResultTable) -> Result<PathBuf> {
        let path = self.dir.join(Self::sheet_file_name(position, table.sheet_name()));
        let mut writer = csv::Writer::from_path(&path)
            .with_context(|| format!("Failed to create sheet file {}", path.display()))?;

        writer
            .write_record(sheet_columns(table.signal))
            .with_context(|| format!("Failed to write header to {}", path.display()))?;
        for row in &table.rows {
            let fields: Vec<String> = row_cells(table.signal, row).iter().map(|c| c.to_field()).collect();
            writer
                .write_record(&fields)
                .with_context(|| format!("Failed to write row to {}", path.display()))?;
        }
        writer
            .flush()
            .with_context(|| format!("Failed to flush sheet file {}", path.display()))?;

        debug!("Wrote {} rows to {}", table.len(), path.display());
        Ok(path)
    }
}

impl ReportWriter for CsvDirectoryWriter {
    fn write(&self, report: &ConsolidatedReport, metadata: &ReportMetadata) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create report directory {}", self.dir.display()))?;

        for (i, table) in report.tables().iter().enumerate() {
            self.write_sheet(i + 1, table)?;
        }

        info!(
            "💾 Wrote {} CSV sheets ({} rows) for run {} to {}",
            report.tables().len(),
            report.total_rows(),
            metadata.run_id,
            self.dir.display()
        );
        Ok(self.dir.clone())
    }
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    Ok(())
}
