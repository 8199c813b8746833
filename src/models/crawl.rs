// src/models/crawl.rs
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

use crate::models::stats_models::SignalType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CrawlSide {
    Legacy,
    New,
}

impl fmt::Display for CrawlSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CrawlSide::Legacy => f.write_str("legacy"),
            CrawlSide::New => f.write_str("new"),
        }
    }
}

/// One crawled page. `address` is the unique key within a site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlRecord {
    pub address: String,
    pub title: String,
    pub heading1: String,
    pub heading2: String,
}

impl CrawlRecord {
    pub fn new(address: &str, title: &str, heading1: &str, heading2: &str) -> Self {
        Self {
            address: address.to_string(),
            title: title.to_string(),
            heading1: heading1.to_string(),
            heading2: heading2.to_string(),
        }
    }
}

/// Structural pieces of a record's address, computed once at load time.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UrlComponents {
    pub url: String,
    pub path: String,
    pub last_segment: String,
}

/// All records of one site plus their decomposed addresses.
///
/// `components[i]` is always derived from `records[i]`; the index is the only
/// link between the two.
#[derive(Debug, Clone)]
pub struct CrawlSite {
    pub side: CrawlSide,
    pub source: Option<PathBuf>,
    records: Vec<CrawlRecord>,
    components: Vec<UrlComponents>,
}

impl CrawlSite {
    pub fn new(side: CrawlSide, records: Vec<CrawlRecord>) -> Self {
        let components = records
            .iter()
            .map(|r| crate::ingest::url_parse::decompose_url(&r.address))
            .collect();
        Self {
            side,
            source: None,
            records,
            components,
        }
    }

    pub fn with_source(mut self, source: PathBuf) -> Self {
        self.source = Some(source);
        self
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn record(&self, index: usize) -> &CrawlRecord {
        &self.records[index]
    }

    pub fn components(&self, index: usize) -> &UrlComponents {
        &self.components[index]
    }

    /// The text a signal compares for the record at `index`.
    pub fn signal_value(&self, signal: SignalType, index: usize) -> &str {
        match signal {
            SignalType::UrlPath => &self.components[index].path,
            SignalType::UrlSlug => &self.components[index].last_segment,
            SignalType::Title => &self.records[index].title,
            SignalType::Heading1 => &self.records[index].heading1,
            SignalType::Heading2 => &self.records[index].heading2,
        }
    }

    /// Signal values in record order, one per record.
    pub fn signal_values(&self, signal: SignalType) -> Vec<&str> {
        (0..self.records.len())
            .map(|i| self.signal_value(signal, i))
            .collect()
    }

    /// Number of records with a non-blank value for `signal`.
    pub fn non_empty_count(&self, signal: SignalType) -> usize {
        (0..self.records.len())
            .filter(|&i| !self.signal_value(signal, i).trim().is_empty())
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signal_values_follow_record_order() {
        let site = CrawlSite::new(
            CrawlSide::Legacy,
            vec![
                CrawlRecord::new("https://old.example.com/a/first", "First", "H1 a", ""),
                CrawlRecord::new("https://old.example.com/b/second/", "Second", "", "H2 b"),
            ],
        );

        assert_eq!(site.signal_values(SignalType::UrlPath), vec!["/a/first", "/b/second/"]);
        assert_eq!(site.signal_values(SignalType::UrlSlug), vec!["first", "second"]);
        assert_eq!(site.signal_values(SignalType::Title), vec!["First", "Second"]);
        assert_eq!(site.non_empty_count(SignalType::Heading1), 1);
        assert_eq!(site.non_empty_count(SignalType::Heading2), 1);
    }

    #[test]
    fn test_components_back_reference_record() {
        let site = CrawlSite::new(
            CrawlSide::New,
            vec![CrawlRecord::new("https://new.example.com/shop/item", "", "", "")],
        );
        assert_eq!(site.components(0).url, site.record(0).address);
    }
}
