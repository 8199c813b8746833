// src/ingest/mod.rs
pub mod crawl;
pub mod url_parse;

pub use crawl::{load_crawl, read_crawl, CrawlLoadStats, REQUIRED_COLUMNS};
pub use url_parse::decompose_url;
