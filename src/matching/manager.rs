// src/matching/manager.rs - Runs the five signals concurrently and assembles the report
use anyhow::{Context, Result};
use futures::future::join_all;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use log::{debug, error, info, warn};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;

use crate::matching::signal::run_signal_match;
use crate::matching::similarity::SimilarityMatcher;
use crate::models::crawl::CrawlSite;
use crate::models::matching::{ConsolidatedReport, SignalMatchResult};
use crate::models::stats_models::{SignalStats, SignalType};
use crate::utils::config::MappingConfig;
use crate::utils::progress_bars::logging::{
    log_pipeline_completion, log_pipeline_phase, log_pipeline_signal_completed,
    log_pipeline_signal_failed, log_pipeline_signal_starting, log_pipeline_start,
};
use crate::utils::progress_bars::progress_callback::{
    new_status_tracker, ProgressCallbackManager, StatusTracker, TaskStatus,
};
use crate::utils::progress_bars::progress_config::{add_bar, signal_bar_style};

const STATUS_REFRESH_INTERVAL: Duration = Duration::from_millis(250);

/// Runs every signal match for one legacy/new crawl pair.
///
/// Holds the matcher and thresholds for the run; nothing is shared globally.
pub struct SignalMatchOrchestrator {
    matcher: SimilarityMatcher,
    config: MappingConfig,
}

impl SignalMatchOrchestrator {
    pub fn new(config: MappingConfig) -> Self {
        Self {
            matcher: SimilarityMatcher::new(config.matcher),
            config,
        }
    }

    /// Matches all five signals and returns the report with per-signal stats
    /// in sheet order. Fails if any signal task fails; no partial report is
    /// returned.
    pub async fn run(
        &self,
        legacy: Arc<CrawlSite>,
        new: Arc<CrawlSite>,
        run_id: &str,
        multi_progress: Option<&MultiProgress>,
    ) -> Result<(ConsolidatedReport, Vec<SignalStats>)> {
        let start_time = Instant::now();
        let signals = SignalType::ALL;
        let concurrency = self.config.max_concurrent_signals.max(1);

        log_pipeline_start(run_id, signals.len(), concurrency, self.matcher.config());
        debug!(
            "Matching {} legacy records against {} new records",
            legacy.len(),
            new.len()
        );

        log_pipeline_phase("Initialization", Some("setting up task tracking with progress callbacks"));
        let status_tracker = new_status_tracker(&signals);
        let callback_manager = Arc::new(ProgressCallbackManager::new(status_tracker.clone()));
        let semaphore = Arc::new(Semaphore::new(concurrency));

        let status_pb = multi_progress.map(|mp| {
            let status = mp.add(ProgressBar::new_spinner());
            status.set_style(
                ProgressStyle::default_spinner()
                    .template("    {spinner:.cyan} {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner()),
            );
            status.set_message("Initializing signals...");
            status
        });
        let status_updater = status_pb
            .clone()
            .map(|status_bar| spawn_status_updater(status_bar, status_tracker.clone()));

        log_pipeline_phase("Task Creation", Some("spawning one task per signal"));
        let mut tasks: Vec<JoinHandle<Result<SignalMatchResult>>> = Vec::with_capacity(signals.len());
        for signal in signals {
            let progress_bar = add_bar(multi_progress, 0, signal_bar_style());
            if let Some(pb) = &progress_bar {
                pb.set_prefix(signal.log_label().0);
                pb.set_message("queued");
            }
            tasks.push(create_signal_task(
                signal,
                Arc::clone(&legacy),
                Arc::clone(&new),
                self.matcher.clone(),
                self.config.threshold(signal),
                Arc::clone(&semaphore),
                status_tracker.clone(),
                Arc::clone(&callback_manager),
                progress_bar,
            ));
        }

        log_pipeline_phase("Execution", Some("matching signals"));
        let join_results = join_all(tasks).await;

        if let Some(updater) = status_updater {
            updater.abort();
        }

        log_pipeline_phase("Results Processing", Some("collecting tables from all signals"));
        let mut tables = Vec::with_capacity(signals.len());
        let mut signal_stats = Vec::with_capacity(signals.len());
        let mut failures = Vec::new();

        for (signal, join_result) in signals.iter().zip(join_results) {
            match join_result {
                Ok(Ok(result)) => {
                    signal_stats.push(result.stats);
                    tables.push(result.table);
                }
                Ok(Err(e)) => {
                    error!("❌ {} task returned an error: {:?}", signal.sheet_name(), e);
                    failures.push(format!("{}: {}", signal.sheet_name(), e));
                }
                Err(e) => {
                    error!("💥 {} task panicked or failed to join: {:?}", signal.sheet_name(), e);
                    failures.push(format!("{}: {}", signal.sheet_name(), e));
                }
            }
        }

        log_status_summary(&status_tracker, &signals).await;
        if let Some(status) = status_pb {
            status.finish_and_clear();
        }

        if !failures.is_empty() {
            anyhow::bail!(
                "{} of {} signal tasks failed: {}",
                failures.len(),
                signals.len(),
                failures.join("; ")
            );
        }

        let report = ConsolidatedReport::from_tables(tables);
        log_pipeline_completion(run_id, start_time.elapsed(), &signal_stats);
        Ok((report, signal_stats))
    }
}

#[allow(clippy::too_many_arguments)]
fn create_signal_task(
    signal: SignalType,
    legacy: Arc<CrawlSite>,
    new: Arc<CrawlSite>,
    matcher: SimilarityMatcher,
    threshold: f64,
    semaphore: Arc<Semaphore>,
    status_tracker: StatusTracker,
    callback_manager: Arc<ProgressCallbackManager>,
    progress_bar: Option<ProgressBar>,
) -> JoinHandle<Result<SignalMatchResult>> {
    tokio::spawn(async move {
        {
            let mut tracker = status_tracker.lock().await;
            if let Some(status) = tracker.get_mut(&signal) {
                status.status = TaskStatus::WaitingForSlot;
                status.processing_phase = "Waiting for processing slot".to_string();
                status.detailed_progress.clear();
                status.last_update_time = Instant::now();
            }
        }
        log_pipeline_signal_starting(signal, false);

        let _permit = semaphore
            .acquire_owned()
            .await
            .context("Failed to acquire semaphore permit")?;

        log_pipeline_signal_starting(signal, true);
        {
            let mut tracker = status_tracker.lock().await;
            if let Some(status) = tracker.get_mut(&signal) {
                status.status = TaskStatus::Running;
                status.processing_phase = "Starting".to_string();
                status.start_time = Instant::now();
                status.last_update_time = Instant::now();
            }
        }
        if let Some(pb) = &progress_bar {
            pb.set_message("scoring");
        }

        let task_start = Instant::now();
        let progress_callback = callback_manager.create_callback(signal);
        let worker_pb = progress_bar.clone();
        let outcome = tokio::task::spawn_blocking(move || {
            run_signal_match(
                signal,
                &legacy,
                &new,
                &matcher,
                threshold,
                worker_pb.as_ref(),
                Some(progress_callback),
            )
        })
        .await;
        let task_duration = task_start.elapsed();

        let mut tracker = status_tracker.lock().await;
        let status = tracker.get_mut(&signal);
        match outcome {
            Ok(result) => {
                if let Some(status) = status {
                    status.status = TaskStatus::Complete;
                    status.rows = result.table.len();
                    status.avg_similarity = result.stats.avg_similarity;
                    status.processing_phase = "Completed".to_string();
                    status.detailed_progress = format!("{} rows", result.table.len());
                    status.end_time = Some(Instant::now());
                    status.last_update_time = Instant::now();
                }
                if let Some(pb) = &progress_bar {
                    pb.finish_with_message(format!("✅ {} rows", result.table.len()));
                }
                log_pipeline_signal_completed(
                    signal,
                    result.table.len(),
                    task_duration,
                    result.stats.avg_similarity,
                );
                Ok(result)
            }
            Err(join_error) => {
                let message = format!("matching worker failed: {}", join_error);
                if let Some(status) = status {
                    status.status = TaskStatus::Failed;
                    status.processing_phase = "Error".to_string();
                    status.detailed_progress = "Failed during execution".to_string();
                    status.error = Some(message.clone());
                    status.end_time = Some(Instant::now());
                    status.last_update_time = Instant::now();
                }
                if let Some(pb) = &progress_bar {
                    pb.abandon_with_message("❌ failed");
                }
                log_pipeline_signal_failed(signal, task_duration, &message);
                Err(anyhow::anyhow!(message))
            }
        }
    })
}

/// Refreshes the status spinner with the signals still in flight.
fn spawn_status_updater(status_bar: ProgressBar, status_tracker: StatusTracker) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(STATUS_REFRESH_INTERVAL);
        loop {
            interval.tick().await;
            let tracker = status_tracker.lock().await;
            let finished = tracker.values().filter(|s| s.status.is_finished()).count();
            let active: Vec<String> = SignalType::ALL
                .iter()
                .filter_map(|signal| tracker.get(signal))
                .filter(|s| s.status == TaskStatus::Running)
                .map(|s| s.display_line())
                .collect();
            let total = tracker.len();
            drop(tracker);

            if active.is_empty() {
                status_bar.set_message(format!("{}/{} signals finished", finished, total));
            } else {
                status_bar.set_message(format!(
                    "{}/{} finished | {}",
                    finished,
                    total,
                    active.join(" | ")
                ));
            }
        }
    })
}

async fn log_status_summary(status_tracker: &StatusTracker, signals: &[SignalType]) {
    let tracker = status_tracker.lock().await;
    info!("📋 ===== SIGNAL SUMMARY =====");
    for signal in signals {
        match tracker.get(signal) {
            Some(status) => match status.status {
                TaskStatus::Complete => info!(
                    "  {} ({} rows, avg similarity {:.3})",
                    status.display_line(),
                    status.rows,
                    status.avg_similarity
                ),
                TaskStatus::Failed => error!(
                    "  {} - {}",
                    status.display_line(),
                    status.error.as_deref().unwrap_or("Unknown error")
                ),
                _ => warn!(
                    "  ⚠️  {} did not finish: {}",
                    signal.sheet_name(),
                    status.status.description()
                ),
            },
            None => warn!("  ⚠️  {} has no status entry", signal.sheet_name()),
        }
    }
}
