// src/utils/config.rs - Mapping configuration from the environment and CLI overrides
use log::debug;
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::env;

use crate::error::MapperError;
use crate::matching::similarity::{MatcherConfig, SimilarityMetric};
use crate::models::stats_models::SignalType;

pub static DEFAULT_MAX_CONCURRENT_SIGNALS: Lazy<usize> =
    Lazy::new(|| num_cpus::get().min(SignalType::ALL.len()));

/// Everything a mapping run needs besides the two crawls.
#[derive(Debug, Clone)]
pub struct MappingConfig {
    pub matcher: MatcherConfig,
    thresholds: HashMap<SignalType, f64>,
    pub max_concurrent_signals: usize,
}

impl Default for MappingConfig {
    fn default() -> Self {
        Self {
            matcher: MatcherConfig::default(),
            thresholds: SignalType::ALL
                .iter()
                .map(|s| (*s, s.default_threshold()))
                .collect(),
            max_concurrent_signals: *DEFAULT_MAX_CONCURRENT_SIGNALS,
        }
    }
}

impl MappingConfig {
    pub fn from_env() -> Result<Self, MapperError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from `lookup`; unset keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, MapperError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup("MATCH_METRIC") {
            config.matcher.metric = raw
                .parse::<SimilarityMetric>()
                .map_err(|e| MapperError::Config(format!("MATCH_METRIC: {}", e)))?;
        }
        if let Some(raw) = lookup("MATCH_NORMALIZE") {
            config.matcher.normalize = parse_bool("MATCH_NORMALIZE", &raw)?;
        }
        for signal in SignalType::ALL {
            let key = signal.threshold_env_var();
            if let Some(raw) = lookup(key) {
                let value = raw.trim().parse::<f64>().map_err(|_| {
                    MapperError::Config(format!("{} must be a number, got '{}'", key, raw))
                })?;
                config.thresholds.insert(signal, validate_threshold(key, value)?);
            }
        }
        if let Some(raw) = lookup("MAX_CONCURRENT_SIGNALS") {
            config.max_concurrent_signals = match raw.trim().parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(MapperError::Config(format!(
                        "MAX_CONCURRENT_SIGNALS must be a positive integer, got '{}'",
                        raw
                    )))
                }
            };
        }

        debug!("Mapping configuration: {:?}", config);
        Ok(config)
    }

    pub fn threshold(&self, signal: SignalType) -> f64 {
        self.thresholds
            .get(&signal)
            .copied()
            .unwrap_or_else(|| signal.default_threshold())
    }

    pub fn set_threshold(&mut self, signal: SignalType, value: f64) -> Result<(), MapperError> {
        let value = validate_threshold(signal.threshold_env_var(), value)?;
        self.thresholds.insert(signal, value);
        Ok(())
    }
}

fn validate_threshold(name: &str, value: f64) -> Result<f64, MapperError> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(MapperError::Config(format!(
            "{} must be between 0 and 1, got {}",
            name, value
        )))
    }
}

/// Parses a boolean setting, accepting true/false, 1/0 and yes/no.
pub fn parse_bool(name: &str, raw: &str) -> Result<bool, MapperError> {
    match raw.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(MapperError::Config(format!(
            "{} must be true or false, got '{}'",
            name, raw
        ))),
    }
}
