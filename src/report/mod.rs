// src/report/mod.rs - Sheet layout shared by every report writer
pub mod writer;

pub use writer::{CsvDirectoryWriter, JsonWorkbookWriter, ReportFormat, ReportMetadata, ReportWriter};

use crate::models::matching::SignalResultRow;
use crate::models::stats_models::SignalType;

pub const URL_SHEET_COLUMNS: [&str; 7] = [
    "From",
    "To",
    "Similarity",
    "Legacy URL Path",
    "New URL Path",
    "Legacy URL",
    "New URL",
];

pub const CONTENT_SHEET_COLUMNS: [&str; 5] = ["From", "To", "Similarity", "Legacy URL", "New URL"];

pub fn sheet_columns(signal: SignalType) -> &'static [&'static str] {
    if signal.is_url_signal() {
        &URL_SHEET_COLUMNS
    } else {
        &CONTENT_SHEET_COLUMNS
    }
}

/// One report cell. Similarity is kept numeric so JSON output stays typed.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell<'a> {
    Text(&'a str),
    Similarity(f64),
}

impl Cell<'_> {
    pub fn to_field(&self) -> String {
        match self {
            Cell::Text(text) => text.to_string(),
            Cell::Similarity(score) => format!("{:.3}", score),
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Cell::Text(text) => serde_json::Value::from(*text),
            Cell::Similarity(score) => serde_json::Value::from(*score),
        }
    }
}

/// Cells of `row` in the column order of `signal`'s sheet.
pub fn row_cells(signal: SignalType, row: &SignalResultRow) -> Vec<Cell<'_>> {
    let mut cells = vec![
        Cell::Text(&row.from),
        Cell::Text(&row.to),
        Cell::Similarity(row.rounded_similarity()),
    ];
    if signal.is_url_signal() {
        cells.push(Cell::Text(row.legacy_path.as_deref().unwrap_or("")));
        cells.push(Cell::Text(row.new_path.as_deref().unwrap_or("")));
    }
    cells.push(Cell::Text(&row.legacy_url));
    cells.push(Cell::Text(&row.new_url));
    cells
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slug_row() -> SignalResultRow {
        SignalResultRow {
            from: "blue-widget".to_string(),
            to: "blue-widget-v2".to_string(),
            similarity: 0.869_565,
            legacy_path: Some("/products/blue-widget".to_string()),
            new_path: Some("/shop/blue-widget-v2".to_string()),
            legacy_url: "https://old.example.com/products/blue-widget".to_string(),
            new_url: "https://new.example.com/shop/blue-widget-v2".to_string(),
        }
    }

    #[test]
    fn test_url_sheet_cells_follow_columns() {
        let row = slug_row();
        let cells = row_cells(SignalType::UrlSlug, &row);
        assert_eq!(cells.len(), sheet_columns(SignalType::UrlSlug).len());
        let fields: Vec<String> = cells.iter().map(|c| c.to_field()).collect();
        assert_eq!(
            fields,
            vec![
                "blue-widget",
                "blue-widget-v2",
                "0.870",
                "/products/blue-widget",
                "/shop/blue-widget-v2",
                "https://old.example.com/products/blue-widget",
                "https://new.example.com/shop/blue-widget-v2",
            ]
        );
    }

    #[test]
    fn test_content_sheet_omits_paths() {
        let mut row = slug_row();
        row.from = "Blue Widget".to_string();
        row.to = "Blue Widget".to_string();
        row.similarity = 1.0;
        row.legacy_path = None;
        row.new_path = None;

        let cells = row_cells(SignalType::Heading1, &row);
        assert_eq!(cells.len(), CONTENT_SHEET_COLUMNS.len());
        assert_eq!(cells[2], Cell::Similarity(1.0));
        assert_eq!(cells[3], Cell::Text("https://old.example.com/products/blue-widget"));
        assert_eq!(cells[2].to_json(), serde_json::json!(1.0));
    }
}
