// src/models/stats_models.rs
use serde::{Deserialize, Serialize};
use std::fmt;

/// One comparable text attribute used independently for matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignalType {
    UrlPath,
    UrlSlug,
    Title,
    Heading1,
    Heading2,
}

impl SignalType {
    /// Report order. Sheets are always written in this sequence.
    pub const ALL: [SignalType; 5] = [
        SignalType::UrlPath,
        SignalType::UrlSlug,
        SignalType::Title,
        SignalType::Heading1,
        SignalType::Heading2,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SignalType::UrlPath => "url_path",
            SignalType::UrlSlug => "url_slug",
            SignalType::Title => "title",
            SignalType::Heading1 => "h1",
            SignalType::Heading2 => "h2",
        }
    }

    pub fn sheet_name(&self) -> &'static str {
        match self {
            SignalType::UrlPath => "URL Match",
            SignalType::UrlSlug => "Slug Match",
            SignalType::Title => "Title Match",
            SignalType::Heading1 => "H1 Match",
            SignalType::Heading2 => "H2 Match",
        }
    }

    /// Acceptance cutoff used when no override is configured.
    pub fn default_threshold(&self) -> f64 {
        match self {
            SignalType::UrlSlug => 0.800,
            _ => 0.900,
        }
    }

    pub fn threshold_env_var(&self) -> &'static str {
        match self {
            SignalType::UrlPath => "URL_PATH_THRESHOLD",
            SignalType::UrlSlug => "URL_SLUG_THRESHOLD",
            SignalType::Title => "TITLE_THRESHOLD",
            SignalType::Heading1 => "H1_THRESHOLD",
            SignalType::Heading2 => "H2_THRESHOLD",
        }
    }

    /// URL signals carry the legacy/new path columns in their sheet.
    pub fn is_url_signal(&self) -> bool {
        matches!(self, SignalType::UrlPath | SignalType::UrlSlug)
    }

    pub fn log_label(&self) -> (&'static str, &'static str) {
        match self {
            SignalType::UrlPath => ("URL", "🌐"),
            SignalType::UrlSlug => ("SLUG", "🔗"),
            SignalType::Title => ("TITLE", "🏷️"),
            SignalType::Heading1 => ("H1", "📰"),
            SignalType::Heading2 => ("H2", "📄"),
        }
    }
}

impl fmt::Display for SignalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-signal outcome figures for the run summary.
#[derive(Debug, Clone, Serialize)]
pub struct SignalStats {
    pub signal: SignalType,
    pub threshold: f64,
    pub legacy_values: usize,
    pub new_values: usize,
    pub pairs_matched: usize,
    pub rows_written: usize,
    pub duplicate_rows_removed: usize,
    pub legacy_urls_covered: usize,
    pub avg_similarity: f64,
    pub duration_secs: f64,
}

impl SignalStats {
    pub fn new(signal: SignalType, threshold: f64) -> Self {
        Self {
            signal,
            threshold,
            legacy_values: 0,
            new_values: 0,
            pairs_matched: 0,
            rows_written: 0,
            duplicate_rows_removed: 0,
            legacy_urls_covered: 0,
            avg_similarity: 0.0,
            duration_secs: 0.0,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RunStats {
    pub run_id: String,
    pub legacy_records: usize,
    pub new_records: usize,
    pub load_time: f64,
    pub matching_time: f64,
    pub report_time: f64,
    pub signal_stats: Vec<SignalStats>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_order_and_sheet_names() {
        let names: Vec<&str> = SignalType::ALL.iter().map(|s| s.sheet_name()).collect();
        assert_eq!(
            names,
            vec!["URL Match", "Slug Match", "Title Match", "H1 Match", "H2 Match"]
        );
    }

    #[test]
    fn test_default_thresholds() {
        assert_eq!(SignalType::UrlSlug.default_threshold(), 0.8);
        for signal in [
            SignalType::UrlPath,
            SignalType::Title,
            SignalType::Heading1,
            SignalType::Heading2,
        ] {
            assert_eq!(signal.default_threshold(), 0.9);
        }
    }

    #[test]
    fn test_url_signals() {
        assert!(SignalType::UrlPath.is_url_signal());
        assert!(SignalType::UrlSlug.is_url_signal());
        assert!(!SignalType::Title.is_url_signal());
        assert!(!SignalType::Heading2.is_url_signal());
    }
}
