// src/ingest/crawl.rs - Loading crawl exports into typed records
use log::{debug, info, warn};
use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::error::MapperError;
use crate::ingest::url_parse::is_parseable;
use crate::models::crawl::{CrawlRecord, CrawlSide, CrawlSite};

pub const ADDRESS_COLUMN: &str = "Address";
pub const TITLE_COLUMN: &str = "Title 1";
pub const H1_COLUMN: &str = "H1-1";
pub const H2_COLUMN: &str = "H2-1";
pub const REQUIRED_COLUMNS: [&str; 4] = [ADDRESS_COLUMN, TITLE_COLUMN, H1_COLUMN, H2_COLUMN];

const PREVIEW_ROWS: usize = 5;

/// Counters gathered while reading one crawl file.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct CrawlLoadStats {
    pub rows_read: usize,
    pub records_kept: usize,
    pub empty_addresses: usize,
    pub duplicate_addresses: usize,
    pub unparseable_addresses: usize,
}

struct ColumnIndexes {
    address: usize,
    title: usize,
    heading1: usize,
    heading2: usize,
}

/// Reads a crawl CSV export from disk.
pub fn load_crawl(path: &Path, side: CrawlSide) -> Result<(CrawlSite, CrawlLoadStats), MapperError> {
    info!("📂 Reading {} crawl from {}", side, path.display());
    let file = File::open(path).map_err(|source| MapperError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let (site, stats) = read_crawl(file, path, side)?;
    Ok((site.with_source(path.to_path_buf()), stats))
}

/// Reads a crawl from any reader. `path` is only used in error messages.
pub fn read_crawl<R: Read>(
    reader: R,
    path: &Path,
    side: CrawlSide,
) -> Result<(CrawlSite, CrawlLoadStats), MapperError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(reader);

    let headers = csv_reader
        .headers()
        .map_err(|source| unparseable(path, source))?
        .clone();
    let columns = resolve_columns(&headers, path)?;

    let mut stats = CrawlLoadStats::default();
    let mut seen_addresses: HashSet<String> = HashSet::new();
    let mut records = Vec::new();

    for row in csv_reader.records() {
        let row = row.map_err(|source| unparseable(path, source))?;
        stats.rows_read += 1;

        let address = row.get(columns.address).unwrap_or("").trim();
        if address.is_empty() {
            stats.empty_addresses += 1;
            continue;
        }
        if !seen_addresses.insert(address.to_string()) {
            stats.duplicate_addresses += 1;
            continue;
        }
        if !is_parseable(address) {
            stats.unparseable_addresses += 1;
        }

        records.push(CrawlRecord {
            address: address.to_string(),
            title: row.get(columns.title).unwrap_or("").to_string(),
            heading1: row.get(columns.heading1).unwrap_or("").to_string(),
            heading2: row.get(columns.heading2).unwrap_or("").to_string(),
        });
    }
    stats.records_kept = records.len();

    log_load_stats(side, &stats);
    for record in records.iter().take(PREVIEW_ROWS) {
        debug!("   {} preview: {}", side, record.address);
    }

    Ok((CrawlSite::new(side, records), stats))
}

fn resolve_columns(headers: &csv::StringRecord, path: &Path) -> Result<ColumnIndexes, MapperError> {
    let names: Vec<String> = headers
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
        .collect();

    let find = |column: &str| -> Result<usize, MapperError> {
        names
            .iter()
            .position(|name| name == column)
            .ok_or_else(|| MapperError::MissingColumn {
                path: path.to_path_buf(),
                column: column.to_string(),
            })
    };

    Ok(ColumnIndexes {
        address: find(ADDRESS_COLUMN)?,
        title: find(TITLE_COLUMN)?,
        heading1: find(H1_COLUMN)?,
        heading2: find(H2_COLUMN)?,
    })
}

fn unparseable(path: &Path, source: csv::Error) -> MapperError {
    MapperError::Unparseable {
        path: PathBuf::from(path),
        source,
    }
}

fn log_load_stats(side: CrawlSide, stats: &CrawlLoadStats) {
    info!(
        "📊 Loaded {} {} crawl records from {} rows",
        stats.records_kept, side, stats.rows_read
    );
    if stats.empty_addresses > 0 {
        warn!(
            "⚠️  Data quality: {} {} rows without an Address were skipped",
            stats.empty_addresses, side
        );
    }
    if stats.duplicate_addresses > 0 {
        warn!(
            "⚠️  Data quality: {} duplicate {} addresses ignored (first row kept)",
            stats.duplicate_addresses, side
        );
    }
    if stats.unparseable_addresses > 0 {
        warn!(
            "⚠️  Data quality: {} {} addresses could not be parsed as URLs and only take part in content matching",
            stats.unparseable_addresses, side
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::stats_models::SignalType;
    use std::io::Write;

    fn read(content: &str) -> Result<(CrawlSite, CrawlLoadStats), MapperError> {
        read_crawl(content.as_bytes(), Path::new("legacy.csv"), CrawlSide::Legacy)
    }

    #[test]
    fn test_reads_required_columns_in_any_order() {
        let csv = "Status Code,H2-1,Address,Title 1,H1-1\n\
                   200,,https://old.example.com/products/blue-widget,Blue Widget - Example Co,Blue Widget\n";
        let (site, stats) = read(csv).unwrap();
        assert_eq!(stats.records_kept, 1);
        let record = site.record(0);
        assert_eq!(record.address, "https://old.example.com/products/blue-widget");
        assert_eq!(record.title, "Blue Widget - Example Co");
        assert_eq!(record.heading1, "Blue Widget");
        assert_eq!(record.heading2, "");
        assert_eq!(site.signal_value(SignalType::UrlSlug, 0), "blue-widget");
    }

    #[test]
    fn test_missing_column_names_file_and_column() {
        let csv = "Address,Title 1,H1-1\nhttps://old.example.com/,Home,Home\n";
        let err = read(csv).unwrap_err();
        match &err {
            MapperError::MissingColumn { path, column } => {
                assert_eq!(path, Path::new("legacy.csv"));
                assert_eq!(column, "H2-1");
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(err.to_string().contains("legacy.csv"));
        assert!(err.is_input_error());
    }

    #[test]
    fn test_short_rows_get_empty_cells() {
        let csv = "Address,Title 1,H1-1,H2-1\nhttps://old.example.com/a,Only Title\n";
        let (site, _) = read(csv).unwrap();
        assert_eq!(site.record(0).title, "Only Title");
        assert_eq!(site.record(0).heading1, "");
        assert_eq!(site.record(0).heading2, "");
    }

    #[test]
    fn test_bom_and_padded_headers_are_tolerated() {
        let csv = "\u{feff}Address , Title 1,H1-1,H2-1\nhttps://old.example.com/a,A,B,C\n";
        let (site, _) = read(csv).unwrap();
        assert_eq!(site.len(), 1);
        assert_eq!(site.record(0).heading2, "C");
    }

    #[test]
    fn test_empty_and_duplicate_addresses_are_skipped() {
        let csv = "Address,Title 1,H1-1,H2-1\n\
                   https://old.example.com/a,First,,\n\
                   ,No address,,\n\
                   https://old.example.com/a,Second,,\n\
                   mailto:info@example.com,Mail,,\n";
        let (site, stats) = read(csv).unwrap();
        assert_eq!(stats.rows_read, 4);
        assert_eq!(stats.records_kept, 2);
        assert_eq!(stats.empty_addresses, 1);
        assert_eq!(stats.duplicate_addresses, 1);
        assert_eq!(stats.unparseable_addresses, 1);
        assert_eq!(site.record(0).title, "First");
    }

    #[test]
    fn test_header_only_file_is_an_empty_site() {
        let (site, stats) = read("Address,Title 1,H1-1,H2-1\n").unwrap();
        assert!(site.is_empty());
        assert_eq!(stats, CrawlLoadStats::default());
    }

    #[test]
    fn test_load_crawl_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "Address,Title 1,H1-1,H2-1").unwrap();
        writeln!(file, "https://new.example.com/shop/blue-widget-v2,\"Blue Widget | Example Co\",Blue Widget,").unwrap();

        let (site, _) = load_crawl(file.path(), CrawlSide::New).unwrap();
        assert_eq!(site.side, CrawlSide::New);
        assert_eq!(site.source.as_deref(), Some(file.path()));
        assert_eq!(site.record(0).title, "Blue Widget | Example Co");
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = load_crawl(Path::new("/nonexistent/crawl.csv"), CrawlSide::Legacy).unwrap_err();
        assert!(matches!(err, MapperError::Io { .. }));
    }
}
