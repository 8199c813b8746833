// src/utils/progress_bars/logging.rs - Logging helpers for signal matching
use log::{debug, error, info, warn};
use std::time::{Duration, Instant};

use crate::matching::similarity::MatcherConfig;
use crate::models::stats_models::{SignalStats, SignalType};

#[derive(Clone)]
pub struct SignalLogger {
    signal_name: &'static str,
    signal_emoji: &'static str,
    start_time: Instant,
}

impl SignalLogger {
    pub fn new(signal: SignalType) -> Self {
        let (signal_name, signal_emoji) = signal.log_label();
        Self {
            signal_name,
            signal_emoji,
            start_time: Instant::now(),
        }
    }

    pub fn log_start(&self, threshold: f64, config: &MatcherConfig) {
        info!(
            "[{}] {} 🚀 Starting {} matching (threshold {:.3})",
            self.signal_name,
            self.signal_emoji,
            self.signal_name.to_lowercase(),
            threshold
        );
        debug!(
            "[{}] {} ⚙️  Metric: {}, normalization: {}",
            self.signal_name,
            self.signal_emoji,
            config.metric,
            if config.normalize { "enabled" } else { "disabled" }
        );
    }

    pub fn log_phase(&self, phase: &str, details: Option<&str>) {
        let elapsed = self.start_time.elapsed();
        match details {
            Some(details) => info!(
                "[{}] {} 🔄 Phase: {} - {} [+{:.1}s]",
                self.signal_name, self.signal_emoji, phase, details, elapsed.as_secs_f32()
            ),
            None => info!(
                "[{}] {} 🔄 Phase: {} [+{:.1}s]",
                self.signal_name, self.signal_emoji, phase, elapsed.as_secs_f32()
            ),
        }
    }

    pub fn log_values_loaded(&self, legacy_count: usize, new_count: usize) {
        info!(
            "[{}] {} 📊 Comparing {} legacy values against {} new values",
            self.signal_name, self.signal_emoji, legacy_count, new_count
        );
    }

    pub fn log_empty_comparison_set(&self, legacy_count: usize, new_count: usize) {
        let side = match (legacy_count, new_count) {
            (0, 0) => "either site",
            (0, _) => "the legacy site",
            _ => "the new site",
        };
        warn!(
            "[{}] {} ⚠️  No {} values found on {}; sheet will be empty",
            self.signal_name,
            self.signal_emoji,
            self.signal_name.to_lowercase(),
            side
        );
    }

    pub fn log_pairs_accepted(&self, accepted: usize, threshold: f64) {
        self.log_phase(
            "Scoring complete",
            Some(&format!("{} pairs at or above {:.3}", accepted, threshold)),
        );
    }

    pub fn log_join_results(&self, pairs: usize, rows: usize, duplicates_removed: usize) {
        info!(
            "[{}] {} 🔗 Join: {} pairs → {} rows ({} duplicate rows removed)",
            self.signal_name, self.signal_emoji, pairs, rows, duplicates_removed
        );
    }

    pub fn log_completion(&self, stats: &SignalStats) {
        let duration = self.start_time.elapsed();
        info!(
            "[{}] {} 🎉 COMPLETED: {} rows in {:.2?}",
            self.signal_name, self.signal_emoji, stats.rows_written, duration
        );
        info!(
            "[{}] {} 📊 Results: {} legacy URLs covered, avg similarity: {:.3}",
            self.signal_name, self.signal_emoji, stats.legacy_urls_covered, stats.avg_similarity
        );
    }
}

// Pipeline-level logging functions
pub fn log_pipeline_start(run_id: &str, signal_count: usize, concurrency_limit: usize, config: &MatcherConfig) {
    info!("🚀 ===== URL REDIRECT MAPPING STARTING =====");
    info!("📅 Run ID: {}", run_id);
    info!("⚙️  Configuration:");
    info!("   • {} signals enabled", signal_count);
    info!("   • Concurrency limit: {} simultaneous signals", concurrency_limit);
    info!("   • Similarity metric: {}", config.metric);
    info!(
        "   • Value normalization: {}",
        if config.normalize { "enabled" } else { "disabled" }
    );
    info!("🎯 Signals: URL 🌐, Slug 🔗, Title 🏷️, H1 📰, H2 📄");
    info!("============================================");
}

pub fn log_pipeline_phase(phase: &str, details: Option<&str>) {
    let msg = if let Some(details) = details {
        format!("🔄 Pipeline Phase: {} - {}", phase, details)
    } else {
        format!("🔄 Pipeline Phase: {}", phase)
    };
    info!("{}", msg);
}

pub fn log_pipeline_signal_starting(signal: SignalType, slot_acquired: bool) {
    let (name, emoji) = signal.log_label();
    if slot_acquired {
        info!("🚦 [{}] {} Processing slot acquired, starting {} matching", name, emoji, name.to_lowercase());
    } else {
        info!("⏳ [{}] {} Waiting for processing slot...", name, emoji);
    }
}

pub fn log_pipeline_signal_completed(signal: SignalType, rows: usize, duration: Duration, avg_similarity: f64) {
    let (name, emoji) = signal.log_label();
    info!(
        "✅ [{}] {} {} matching completed in {:.2?}: {} rows (avg similarity: {:.3})",
        name, emoji, name.to_lowercase(), duration, rows, avg_similarity
    );
}

pub fn log_pipeline_signal_failed(signal: SignalType, duration: Duration, error: &str) {
    let (name, emoji) = signal.log_label();
    error!(
        "❌ [{}] {} {} matching failed after {:.2?}: {}",
        name, emoji, name.to_lowercase(), duration, error
    );
}

pub fn log_pipeline_completion(run_id: &str, duration: Duration, signal_stats: &[SignalStats]) {
    info!("🎉 ===== URL REDIRECT MAPPING COMPLETED =====");
    info!("📅 Run ID: {}", run_id);
    info!("⏱️  Total Duration: {:.2?}", duration);
    info!("");
    info!("📈 Signal Breakdown:");

    let mut total_rows = 0;
    for stats in signal_stats {
        let (name, emoji) = stats.signal.log_label();
        total_rows += stats.rows_written;
        info!(
            "  {} {}: {} rows, {} legacy URLs covered (threshold {:.3}, avg similarity {:.3}, {:.2}s)",
            emoji,
            name,
            stats.rows_written,
            stats.legacy_urls_covered,
            stats.threshold,
            stats.avg_similarity,
            stats.duration_secs
        );
    }

    info!("");
    info!("📊 Summary:");
    info!("  • Total rows across sheets: {}", total_rows);
    info!("=============================================");
}
