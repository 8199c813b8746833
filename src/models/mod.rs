// src/models/mod.rs
pub mod crawl;
pub mod matching;
pub mod stats_models;

pub use crawl::{CrawlRecord, CrawlSide, CrawlSite, UrlComponents};
pub use matching::{
    ConsolidatedReport, MatchCandidatePair, SignalMatchResult, SignalResultRow, SignalResultTable,
};
pub use stats_models::{RunStats, SignalStats, SignalType};
