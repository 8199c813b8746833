// src/utils/progress_bars/progress_config.rs

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::env;

use crate::error::MapperError;
use crate::utils::config::parse_bool;

/// Configuration for progress tracking throughout the pipeline
#[derive(Debug, Clone)]
pub struct ProgressConfig {
    /// Whether to show progress bars at all
    pub enabled: bool,
    /// Whether to show one bar per signal under the main bar
    pub detailed: bool,
    /// Whether to show memory usage in the run summary
    pub show_memory: bool,
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            detailed: true,
            show_memory: true,
        }
    }
}

impl ProgressConfig {
    /// Create progress configuration from environment variables
    pub fn from_env() -> Result<Self, MapperError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, MapperError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let flag = |key: &str| -> Result<bool, MapperError> {
            lookup(key).map_or(Ok(true), |raw| parse_bool(key, &raw))
        };
        Ok(Self {
            enabled: flag("PROGRESS_ENABLED")?,
            detailed: flag("PROGRESS_DETAILED")?,
            show_memory: flag("PROGRESS_SHOW_MEMORY")?,
        })
    }

    /// Create a MultiProgress instance if progress is enabled, None otherwise
    pub fn create_multi_progress(&self) -> Option<MultiProgress> {
        if self.enabled {
            Some(MultiProgress::new())
        } else {
            None
        }
    }

    pub fn should_show_detailed(&self) -> bool {
        self.enabled && self.detailed
    }

    pub fn should_show_memory(&self) -> bool {
        self.enabled && self.show_memory
    }
}

pub fn main_bar_style() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
}

pub fn signal_bar_style() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template("  {spinner:.blue} {prefix:>6} {bar:30.green/blue} {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
}

/// Adds a styled bar to `multi_progress`, or returns None when progress is off.
pub fn add_bar(
    multi_progress: Option<&MultiProgress>,
    len: u64,
    style: ProgressStyle,
) -> Option<ProgressBar> {
    multi_progress.map(|mp| {
        let pb = mp.add(ProgressBar::new(len));
        pb.set_style(style);
        pb
    })
}
