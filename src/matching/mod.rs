pub mod manager;
pub mod signal;
pub mod similarity;

pub use manager::SignalMatchOrchestrator;
pub use signal::run_signal_match;
pub use similarity::{MatcherConfig, SimilarityMatcher, SimilarityMetric};
