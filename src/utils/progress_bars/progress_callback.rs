// src/utils/progress_bars/progress_callback.rs - Progress callbacks and per-signal task status

use log::debug;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;

use crate::models::stats_models::SignalType;

/// Type alias for progress callback functions
/// Takes phase name and optional detailed progress information
pub type ProgressCallback = Arc<dyn Fn(String, Option<String>) + Send + Sync>;

pub type StatusTracker = Arc<Mutex<HashMap<SignalType, SignalTaskStatus>>>;

#[derive(Debug, Clone, PartialEq)]
pub enum TaskStatus {
    Queued,
    WaitingForSlot,
    Running,
    Complete,
    Failed,
}

impl TaskStatus {
    pub fn emoji(&self) -> &'static str {
        match self {
            TaskStatus::Queued => "⏳",
            TaskStatus::WaitingForSlot => "🔄",
            TaskStatus::Running => "▶️",
            TaskStatus::Complete => "✅",
            TaskStatus::Failed => "❌",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            TaskStatus::Queued => "Queued",
            TaskStatus::WaitingForSlot => "Waiting for slot",
            TaskStatus::Running => "Running",
            TaskStatus::Complete => "Complete",
            TaskStatus::Failed => "Failed",
        }
    }

    pub fn is_finished(&self) -> bool {
        matches!(self, TaskStatus::Complete | TaskStatus::Failed)
    }
}

/// Status of one signal task, updated by the manager and by progress callbacks.
#[derive(Debug, Clone)]
pub struct SignalTaskStatus {
    pub signal: SignalType,
    pub status: TaskStatus,
    pub rows: usize,
    pub avg_similarity: f64,
    pub start_time: Instant,
    pub end_time: Option<Instant>,
    pub error: Option<String>,
    pub processing_phase: String,
    pub detailed_progress: String,
    pub last_update_time: Instant,
}

impl SignalTaskStatus {
    pub fn queued(signal: SignalType) -> Self {
        Self {
            signal,
            status: TaskStatus::Queued,
            rows: 0,
            avg_similarity: 0.0,
            start_time: Instant::now(),
            end_time: None,
            error: None,
            processing_phase: "Queued".to_string(),
            detailed_progress: "Waiting to start...".to_string(),
            last_update_time: Instant::now(),
        }
    }

    pub fn elapsed_secs(&self) -> f32 {
        match self.end_time {
            Some(end) => (end - self.start_time).as_secs_f32(),
            None => self.start_time.elapsed().as_secs_f32(),
        }
    }

    /// One-line status for the summary and the status spinner.
    pub fn display_line(&self) -> String {
        let phase = if self.detailed_progress.is_empty() {
            self.processing_phase.clone()
        } else {
            format!("{}: {}", self.processing_phase, self.detailed_progress)
        };
        format!(
            "{} {}: {} ({:.1}s)",
            self.status.emoji(),
            self.signal.sheet_name(),
            phase,
            self.elapsed_secs()
        )
    }
}

/// Creates a tracker with every signal queued.
pub fn new_status_tracker(signals: &[SignalType]) -> StatusTracker {
    let map = signals
        .iter()
        .map(|s| (*s, SignalTaskStatus::queued(*s)))
        .collect();
    Arc::new(Mutex::new(map))
}

/// Manages progress callbacks for signal tasks
pub struct ProgressCallbackManager {
    status_tracker: StatusTracker,
}

impl ProgressCallbackManager {
    pub fn new(status_tracker: StatusTracker) -> Self {
        Self { status_tracker }
    }

    /// Creates a progress callback for a specific signal. Callbacks run on
    /// blocking worker threads, so they never wait for the tracker lock.
    pub fn create_callback(&self, signal: SignalType) -> ProgressCallback {
        let tracker = Arc::clone(&self.status_tracker);

        Arc::new(move |phase: String, details: Option<String>| {
            if let Ok(mut status_map) = tracker.try_lock() {
                if let Some(status) = status_map.get_mut(&signal) {
                    status.processing_phase = phase;
                    status.detailed_progress = details.unwrap_or_default();
                    status.last_update_time = Instant::now();
                }
            } else {
                debug!("Could not acquire status tracker lock for {} progress update", signal);
            }
        })
    }
}

/// Convenience macro for updating progress within signal runs
#[macro_export]
macro_rules! update_progress {
    ($callback:expr, $phase:expr) => {
        if let Some(ref cb) = $callback {
            cb($phase.to_string(), None);
        }
    };
    ($callback:expr, $phase:expr, $details:expr) => {
        if let Some(ref cb) = $callback {
            cb($phase.to_string(), Some($details.to_string()));
        }
    };
}

/// Macro for updating progress with a current/total count
#[macro_export]
macro_rules! update_detailed_progress {
    ($callback:expr, $phase:expr, $current:expr, $total:expr) => {
        if let Some(ref cb) = $callback {
            let details = format!("{}/{}", $current, $total);
            cb($phase.to_string(), Some(details));
        }
    };
    ($callback:expr, $phase:expr, $current:expr, $total:expr, $extra:expr) => {
        if let Some(ref cb) = $callback {
            let details = format!("{}/{} ({})", $current, $total, $extra);
            cb($phase.to_string(), Some(details));
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_callback_updates_tracker() {
        let tracker = new_status_tracker(&SignalType::ALL);
        let manager = ProgressCallbackManager::new(tracker.clone());
        let callback = Some(manager.create_callback(SignalType::Title));

        update_progress!(callback, "Scoring", "10/20");

        let map = tracker.lock().await;
        let status = map.get(&SignalType::Title).unwrap();
        assert_eq!(status.processing_phase, "Scoring");
        assert_eq!(status.detailed_progress, "10/20");
        assert_eq!(map.get(&SignalType::UrlPath).unwrap().processing_phase, "Queued");
    }

    #[tokio::test]
    async fn test_callback_does_not_block_when_locked() {
        let tracker = new_status_tracker(&[SignalType::Heading1]);
        let manager = ProgressCallbackManager::new(tracker.clone());
        let callback = manager.create_callback(SignalType::Heading1);

        let guard = tracker.lock().await;
        callback("Scoring".to_string(), None);
        assert_eq!(guard.get(&SignalType::Heading1).unwrap().processing_phase, "Queued");
    }

    #[test]
    fn test_macro_counts_calls() {
        let call_count = Arc::new(AtomicUsize::new(0));
        let call_count_clone = Arc::clone(&call_count);
        let callback: Option<ProgressCallback> = Some(Arc::new(move |_phase: String, _details: Option<String>| {
            call_count_clone.fetch_add(1, Ordering::SeqCst);
        }));

        update_progress!(callback, "Extracting values");
        update_progress!(callback, "Joining", format!("{} pairs", 3));
        let none: Option<ProgressCallback> = None;
        update_progress!(none, "Ignored");
        update_detailed_progress!(callback, "Deduplicating", 4, 6, "rows kept");

        assert_eq!(call_count.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_status_display_line() {
        let mut status = SignalTaskStatus::queued(SignalType::UrlSlug);
        status.status = TaskStatus::Complete;
        status.processing_phase = "Completed".to_string();
        status.detailed_progress = "4 rows".to_string();
        let line = status.display_line();
        assert!(line.starts_with("✅ Slug Match: Completed: 4 rows"));
        assert!(TaskStatus::Failed.is_finished());
        assert!(!TaskStatus::Running.is_finished());
    }
}
