// src/lib.rs
pub mod error;
pub mod ingest;
pub mod matching;
pub mod models;
pub mod report;
pub mod utils;

pub use error::MapperError;
pub use models::stats_models::SignalType;
