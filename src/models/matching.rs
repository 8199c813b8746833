// src/models/matching.rs
use serde::Serialize;

use crate::models::stats_models::{SignalStats, SignalType};

/// Best target found for one source value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchCandidatePair {
    pub from: String,
    pub to: String,
    pub similarity: f64,
}

/// A candidate pair joined back to the records it came from on both sides.
/// Paths are only present for URL signals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignalResultRow {
    pub from: String,
    pub to: String,
    pub similarity: f64,
    pub legacy_path: Option<String>,
    pub new_path: Option<String>,
    pub legacy_url: String,
    pub new_url: String,
}

/// Similarity as shown in the report: three decimal places.
pub fn round_similarity(similarity: f64) -> f64 {
    (similarity * 1000.0).round() / 1000.0
}

impl SignalResultRow {
    pub fn rounded_similarity(&self) -> f64 {
        round_similarity(self.similarity)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignalResultTable {
    pub signal: SignalType,
    pub rows: Vec<SignalResultRow>,
}

impl SignalResultTable {
    pub fn empty(signal: SignalType) -> Self {
        Self {
            signal,
            rows: Vec::new(),
        }
    }

    pub fn sheet_name(&self) -> &'static str {
        self.signal.sheet_name()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Outcome of one signal run.
#[derive(Debug, Clone)]
pub struct SignalMatchResult {
    pub table: SignalResultTable,
    pub stats: SignalStats,
}

/// Five tables in fixed sheet order, one per signal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConsolidatedReport {
    tables: Vec<SignalResultTable>,
}

impl ConsolidatedReport {
    /// Orders the given tables by `SignalType::ALL`; a signal without a table
    /// gets an empty one so the report always has five sheets.
    pub fn from_tables(tables: Vec<SignalResultTable>) -> Self {
        let mut ordered = Vec::with_capacity(SignalType::ALL.len());
        for signal in SignalType::ALL {
            let table = tables
                .iter()
                .find(|t| t.signal == signal)
                .cloned()
                .unwrap_or_else(|| SignalResultTable::empty(signal));
            ordered.push(table);
        }
        Self { tables: ordered }
    }

    pub fn tables(&self) -> &[SignalResultTable] {
        &self.tables
    }

    pub fn table(&self, signal: SignalType) -> &SignalResultTable {
        // from_tables guarantees one table per signal
        &self.tables[SignalType::ALL
            .iter()
            .position(|s| *s == signal)
            .unwrap_or_default()]
    }

    pub fn total_rows(&self) -> usize {
        self.tables.iter().map(|t| t.len()).sum()
    }
}
