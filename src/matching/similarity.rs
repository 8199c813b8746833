// src/matching/similarity.rs - Best-match discovery between two text collections
use indicatif::ProgressBar;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use strsim::{jaro_winkler, normalized_damerau_levenshtein, normalized_levenshtein, sorensen_dice};

use crate::models::matching::{round_similarity, MatchCandidatePair};

const PROGRESS_TICK_INTERVAL: usize = 100;

/// Highest score a pair of different strings can get. Keeps 1.000 in the
/// report for exact matches only.
pub const NON_IDENTICAL_CEILING: f64 = 0.999;

static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("static regex"));

/// String similarity measures. Every variant is deterministic, bounded to
/// [0, 1] and scores identical strings 1.0. Different strings never reach 1.0,
/// even when the underlying measure ignores what tells them apart (Dice drops
/// whitespace, for one).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SimilarityMetric {
    /// Sørensen–Dice coefficient over character bigrams.
    #[default]
    SorensenDice,
    Levenshtein,
    DamerauLevenshtein,
    JaroWinkler,
}

impl SimilarityMetric {
    pub const ALL: [SimilarityMetric; 4] = [
        SimilarityMetric::SorensenDice,
        SimilarityMetric::Levenshtein,
        SimilarityMetric::DamerauLevenshtein,
        SimilarityMetric::JaroWinkler,
    ];

    pub fn score(&self, a: &str, b: &str) -> f64 {
        if a == b {
            return 1.0;
        }
        let raw = match self {
            SimilarityMetric::SorensenDice => sorensen_dice(a, b),
            SimilarityMetric::Levenshtein => normalized_levenshtein(a, b),
            SimilarityMetric::DamerauLevenshtein => normalized_damerau_levenshtein(a, b),
            SimilarityMetric::JaroWinkler => jaro_winkler(a, b),
        };
        raw.clamp(0.0, NON_IDENTICAL_CEILING)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SimilarityMetric::SorensenDice => "dice",
            SimilarityMetric::Levenshtein => "levenshtein",
            SimilarityMetric::DamerauLevenshtein => "damerau",
            SimilarityMetric::JaroWinkler => "jaro-winkler",
        }
    }
}

impl fmt::Display for SimilarityMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SimilarityMetric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "dice" | "sorensen-dice" | "sorensen_dice" => Ok(SimilarityMetric::SorensenDice),
            "levenshtein" => Ok(SimilarityMetric::Levenshtein),
            "damerau" | "damerau-levenshtein" | "damerau_levenshtein" => {
                Ok(SimilarityMetric::DamerauLevenshtein)
            }
            "jaro-winkler" | "jaro_winkler" | "jarowinkler" => Ok(SimilarityMetric::JaroWinkler),
            other => Err(format!(
                "unknown similarity metric '{}' (expected dice, levenshtein, damerau or jaro-winkler)",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatcherConfig {
    pub metric: SimilarityMetric,
    /// Trim, lowercase and collapse whitespace before scoring.
    pub normalize: bool,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            metric: SimilarityMetric::default(),
            normalize: true,
        }
    }
}

/// Finds, for each source value, the single most similar target value.
///
/// Values that are blank after trimming are ignored on both sides. Duplicate
/// values are scored once. A target equal to the source always wins. Otherwise,
/// when several targets share the best score the one that appears first in the
/// target collection wins. A pair is kept when its score, rounded to three
/// places as the report shows it, reaches the cutoff.
#[derive(Debug, Clone, Default)]
pub struct SimilarityMatcher {
    config: MatcherConfig,
}

impl SimilarityMatcher {
    pub fn new(config: MatcherConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MatcherConfig {
        &self.config
    }

    /// Score two raw values the way `match_values` does.
    pub fn similarity(&self, a: &str, b: &str) -> f64 {
        self.config.metric.score(&self.prepare(a), &self.prepare(b))
    }

    pub fn match_values<S, T>(&self, source: &[S], target: &[T], cutoff: f64) -> Vec<MatchCandidatePair>
    where
        S: AsRef<str>,
        T: AsRef<str>,
    {
        self.match_values_with_progress(source, target, cutoff, None)
    }

    /// Like `match_values`, advancing `progress` once per distinct source value.
    pub fn match_values_with_progress<S, T>(
        &self,
        source: &[S],
        target: &[T],
        cutoff: f64,
        progress: Option<&ProgressBar>,
    ) -> Vec<MatchCandidatePair>
    where
        S: AsRef<str>,
        T: AsRef<str>,
    {
        let cutoff = cutoff.clamp(0.0, 1.0);
        let sources = distinct_non_empty(source);
        let targets = distinct_non_empty(target);

        if let Some(pb) = progress {
            pb.set_length(sources.len() as u64);
            pb.set_position(0);
        }
        if sources.is_empty() || targets.is_empty() {
            return Vec::new();
        }

        let prepared_targets: Vec<Cow<'_, str>> = targets.iter().map(|t| self.prepare(t)).collect();
        let mut pairs = Vec::new();

        for (scored, source_value) in sources.iter().enumerate() {
            let prepared_source = self.prepare(source_value);
            let mut best: Option<(usize, f64)> = None;

            for (idx, candidate) in prepared_targets.iter().enumerate() {
                if *candidate == prepared_source {
                    best = Some((idx, 1.0));
                    break;
                }
                let score = self.config.metric.score(&prepared_source, candidate);
                if best.map_or(true, |(_, best_score)| score > best_score) {
                    best = Some((idx, score));
                }
            }

            if let Some((idx, score)) = best {
                if round_similarity(score) >= cutoff {
                    pairs.push(MatchCandidatePair {
                        from: source_value.to_string(),
                        to: targets[idx].to_string(),
                        similarity: score,
                    });
                }
            }

            if let Some(pb) = progress {
                if (scored + 1) % PROGRESS_TICK_INTERVAL == 0 || scored + 1 == sources.len() {
                    pb.set_position((scored + 1) as u64);
                }
            }
        }

        pairs
    }

    fn prepare<'a>(&self, value: &'a str) -> Cow<'a, str> {
        if self.config.normalize {
            Cow::Owned(normalize_value(value))
        } else {
            Cow::Borrowed(value)
        }
    }
}

/// Trim, collapse whitespace runs to one space and lowercase.
pub fn normalize_value(value: &str) -> String {
    WHITESPACE_RUN.replace_all(value.trim(), " ").to_lowercase()
}

/// Distinct values in first-appearance order, blanks removed.
fn distinct_non_empty<V: AsRef<str>>(values: &[V]) -> Vec<&str> {
    let mut seen = HashSet::new();
    values
        .iter()
        .map(|v| v.as_ref())
        .filter(|v| !v.trim().is_empty())
        .filter(|v| seen.insert(*v))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matcher() -> SimilarityMatcher {
        SimilarityMatcher::default()
    }

    #[test]
    fn test_self_match_identity_for_every_metric() {
        for metric in SimilarityMetric::ALL {
            let m = SimilarityMatcher::new(MatcherConfig { metric, normalize: false });
            for value in ["a", "blue-widget", "/products/blue-widget", "Blue Widget - Example Co"] {
                let pairs = m.match_values(&[value], &[value], 1.0);
                assert_eq!(pairs.len(), 1, "metric {} value {}", metric, value);
                assert_eq!(pairs[0].similarity, 1.0);
                assert_eq!(pairs[0].from, value);
                assert_eq!(pairs[0].to, value);
            }
        }
    }

    #[test]
    fn test_slug_example_sits_between_thresholds() {
        let score = matcher().similarity("blue-widget", "blu-widget");
        assert!((score - 16.0 / 19.0).abs() < 1e-9, "score was {}", score);

        let slug = matcher().match_values(&["blue-widget"], &["blu-widget"], 0.8);
        assert_eq!(slug.len(), 1);
        let strict = matcher().match_values(&["blue-widget"], &["blu-widget"], 0.9);
        assert!(strict.is_empty());
    }

    #[test]
    fn test_picks_best_target() {
        let pairs = matcher().match_values(
            &["/products/blue-widget"],
            &["/about-us", "/shop/blue-widget", "/shop/red-widget"],
            0.0,
        );
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].to, "/shop/blue-widget");
    }

    #[test]
    fn test_ties_go_to_first_target() {
        // "abd" and "abe" both share one of two bigrams with "abc"
        let pairs = matcher().match_values(&["abc"], &["abd", "abe"], 0.0);
        assert_eq!(pairs[0].to, "abd");
        assert_eq!(pairs[0].similarity, 0.5);

        let reversed = matcher().match_values(&["abc"], &["abe", "abd"], 0.0);
        assert_eq!(reversed[0].to, "abe");
    }

    #[test]
    fn test_at_most_one_pair_per_source() {
        let source = ["blue widget", "blue widget", "red widget", "", "   "];
        let target = ["blue widget", "blue widgets", "red widget", "red widgets"];
        let pairs = matcher().match_values(&source, &target, 0.0);

        let froms: HashSet<&str> = pairs.iter().map(|p| p.from.as_str()).collect();
        assert_eq!(froms.len(), pairs.len());
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].from, "blue widget");
        assert_eq!(pairs[1].from, "red widget");
    }

    #[test]
    fn test_blank_values_never_match() {
        assert!(matcher().match_values(&[""], &[""], 0.0).is_empty());
        assert!(matcher().match_values(&["  "], &["x", " "], 0.0).is_empty());
        let pairs = matcher().match_values(&["x"], &["", "x"], 0.0);
        assert_eq!(pairs[0].to, "x");
    }

    #[test]
    fn test_empty_inputs_return_empty() {
        let none: [&str; 0] = [];
        assert!(matcher().match_values(&none, &["a", "b"], 0.0).is_empty());
        assert!(matcher().match_values(&["a", "b"], &none, 0.0).is_empty());
        assert!(matcher().match_values(&none, &none, 0.0).is_empty());
    }

    #[test]
    fn test_threshold_monotonicity() {
        let source = ["blue-widget", "red-gadget", "green-thing", "contact", "about-us"];
        let target = ["blu-widget", "red-gadgets", "greenthing", "contact-us", "about"];
        let mut previous = usize::MAX;
        for step in 0..=20 {
            let cutoff = step as f64 / 20.0;
            let count = matcher().match_values(&source, &target, cutoff).len();
            assert!(count <= previous, "cutoff {} grew result to {}", cutoff, count);
            previous = count;
        }
    }

    #[test]
    fn test_deterministic_results() {
        let source = ["Blue Widget", "Red Widget", "Widgets", "Contact"];
        let target = ["Red Widgets", "Blue Widgets", "Contact Us", "Widget"];
        let first = matcher().match_values(&source, &target, 0.5);
        for _ in 0..5 {
            assert_eq!(matcher().match_values(&source, &target, 0.5), first);
        }
    }

    #[test]
    fn test_normalization_ignores_case_and_spacing() {
        let pairs = matcher().match_values(&["  Blue   Widget "], &["blue widget"], 1.0);
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].from, "  Blue   Widget ");
        assert_eq!(pairs[0].to, "blue widget");

        let strict = SimilarityMatcher::new(MatcherConfig {
            metric: SimilarityMetric::Levenshtein,
            normalize: false,
        });
        assert!(strict.similarity("Blue Widget", "blue widget") < 1.0);
    }

    #[test]
    fn test_exact_target_beats_earlier_whitespace_variant() {
        // Dice ignores whitespace, so "bluewidget" would otherwise tie at 1.0 and win by position
        assert!(matcher().similarity("blue widget", "bluewidget") < 1.0);

        let pairs = matcher().match_values(&["blue widget"], &["bluewidget", "blue widget"], 0.9);
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].to, "blue widget");
        assert_eq!(pairs[0].similarity, 1.0);
    }

    #[test]
    fn test_only_identical_values_score_one() {
        for metric in SimilarityMetric::ALL {
            let m = SimilarityMatcher::new(MatcherConfig { metric, normalize: false });
            let score = m.similarity("blue widget", "blue  widget");
            assert!(score <= NON_IDENTICAL_CEILING, "metric {} scored {}", metric, score);
            assert!(m.match_values(&["blue widget"], &["blue  widget"], 1.0).is_empty());
        }
    }

    #[test]
    fn test_cutoff_compares_the_displayed_score() {
        let strict = SimilarityMatcher::new(MatcherConfig {
            metric: SimilarityMetric::Levenshtein,
            normalize: false,
        });
        let legacy = "a".repeat(209);

        // 21 edits in 209 characters: 0.89952 shows as 0.900
        let near = format!("{}{}", "b".repeat(21), "a".repeat(188));
        let pairs = strict.match_values(&[legacy.as_str()], &[near.as_str()], 0.9);
        assert_eq!(pairs.len(), 1);
        assert!(pairs[0].similarity < 0.9);
        assert_eq!(round_similarity(pairs[0].similarity), 0.9);

        // 22 edits: 0.89474 shows as 0.895
        let far = format!("{}{}", "b".repeat(22), "a".repeat(187));
        assert!(strict.match_values(&[legacy.as_str()], &[far.as_str()], 0.9).is_empty());
    }

    #[test]
    fn test_cutoff_is_clamped() {
        assert_eq!(matcher().match_values(&["a"], &["a"], 1.5).len(), 1);
        assert_eq!(matcher().match_values(&["ab"], &["cd"], -1.0).len(), 1);
    }

    #[test]
    fn test_progress_bar_tracks_distinct_sources() {
        let pb = ProgressBar::hidden();
        matcher().match_values_with_progress(&["a", "a", "b"], &["a"], 0.0, Some(&pb));
        assert_eq!(pb.length(), Some(2));
        assert_eq!(pb.position(), 2);
    }

    #[test]
    fn test_metric_parsing() {
        assert_eq!("dice".parse::<SimilarityMetric>().unwrap(), SimilarityMetric::SorensenDice);
        assert_eq!("Jaro-Winkler".parse::<SimilarityMetric>().unwrap(), SimilarityMetric::JaroWinkler);
        assert_eq!("damerau".parse::<SimilarityMetric>().unwrap(), SimilarityMetric::DamerauLevenshtein);
        assert!("cosine".parse::<SimilarityMetric>().is_err());
        for metric in SimilarityMetric::ALL {
            assert_eq!(metric.as_str().parse::<SimilarityMetric>().unwrap(), metric);
        }
    }
}
