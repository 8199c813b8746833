// src/matching/signal.rs - One signal's match, join, dedupe and sort pipeline
use indicatif::ProgressBar;
use std::collections::{HashMap, HashSet};
use std::time::Instant;

use crate::matching::similarity::SimilarityMatcher;
use crate::models::crawl::CrawlSite;
use crate::models::matching::{
    MatchCandidatePair, SignalMatchResult, SignalResultRow, SignalResultTable,
};
use crate::models::stats_models::{SignalStats, SignalType};
use crate::{update_detailed_progress, update_progress};
use crate::utils::progress_bars::logging::SignalLogger;
use crate::utils::progress_bars::progress_callback::ProgressCallback;

/// Signal value -> indices of the records carrying it, in record order.
type ValueIndex<'a> = HashMap<&'a str, Vec<usize>>;

fn build_value_index(site: &CrawlSite, signal: SignalType) -> ValueIndex<'_> {
    let mut index: ValueIndex<'_> = HashMap::new();
    for i in 0..site.len() {
        index.entry(site.signal_value(signal, i)).or_default().push(i);
    }
    index
}

/// Matches one signal between the legacy and new sites.
///
/// Every accepted pair fans out to all records on each side sharing the
/// matched value. Rows identical in every report column are dropped, keeping
/// the first, and the table is sorted by descending similarity with ties in
/// join order.
pub fn run_signal_match(
    signal: SignalType,
    legacy: &CrawlSite,
    new: &CrawlSite,
    matcher: &SimilarityMatcher,
    threshold: f64,
    progress_bar: Option<&ProgressBar>,
    progress_callback: Option<ProgressCallback>,
) -> SignalMatchResult {
    let logger = SignalLogger::new(signal);
    let start = Instant::now();
    let mut stats = SignalStats::new(signal, threshold);
    logger.log_start(threshold, matcher.config());

    update_progress!(progress_callback, "Extracting values");
    let legacy_values = legacy.signal_values(signal);
    let new_values = new.signal_values(signal);
    stats.legacy_values = legacy.non_empty_count(signal);
    stats.new_values = new.non_empty_count(signal);
    logger.log_values_loaded(stats.legacy_values, stats.new_values);

    if stats.legacy_values == 0 || stats.new_values == 0 {
        logger.log_empty_comparison_set(stats.legacy_values, stats.new_values);
        update_progress!(progress_callback, "Completed", "empty comparison set");
        if let Some(pb) = progress_bar {
            pb.set_length(0);
        }
        stats.duration_secs = start.elapsed().as_secs_f64();
        return SignalMatchResult {
            table: SignalResultTable::empty(signal),
            stats,
        };
    }

    update_progress!(
        progress_callback,
        "Scoring",
        format!("{} legacy x {} new values", stats.legacy_values, stats.new_values)
    );
    let pairs = matcher.match_values_with_progress(&legacy_values, &new_values, threshold, progress_bar);
    stats.pairs_matched = pairs.len();
    logger.log_pairs_accepted(pairs.len(), threshold);

    update_progress!(progress_callback, "Joining", format!("{} accepted pairs", pairs.len()));
    let legacy_index = build_value_index(legacy, signal);
    let new_index = build_value_index(new, signal);
    let (rows, duplicates) = join_pairs(signal, &pairs, legacy, &legacy_index, new, &new_index);
    stats.duplicate_rows_removed = duplicates;
    logger.log_join_results(pairs.len(), rows.len(), duplicates);
    update_detailed_progress!(progress_callback, "Deduplicated", rows.len(), rows.len() + duplicates, "rows kept");

    let table = sort_table(signal, rows);
    stats.rows_written = table.len();
    stats.legacy_urls_covered = table
        .rows
        .iter()
        .map(|r| r.legacy_url.as_str())
        .collect::<HashSet<_>>()
        .len();
    stats.avg_similarity = if table.is_empty() {
        0.0
    } else {
        table.rows.iter().map(|r| r.similarity).sum::<f64>() / table.len() as f64
    };
    stats.duration_secs = start.elapsed().as_secs_f64();

    update_progress!(progress_callback, "Completed", format!("{} rows", table.len()));
    logger.log_completion(&stats);

    SignalMatchResult { table, stats }
}

/// Full-row identity as it appears in the report.
#[derive(PartialEq, Eq, Hash)]
struct RowKey<'a> {
    from: &'a str,
    to: &'a str,
    similarity_millis: i64,
    legacy_path: Option<&'a str>,
    new_path: Option<&'a str>,
    legacy_url: &'a str,
    new_url: &'a str,
}

impl<'a> RowKey<'a> {
    fn of(row: &'a SignalResultRow) -> Self {
        Self {
            from: &row.from,
            to: &row.to,
            similarity_millis: (row.similarity * 1000.0).round() as i64,
            legacy_path: row.legacy_path.as_deref(),
            new_path: row.new_path.as_deref(),
            legacy_url: &row.legacy_url,
            new_url: &row.new_url,
        }
    }
}

fn join_pairs(
    signal: SignalType,
    pairs: &[MatchCandidatePair],
    legacy: &CrawlSite,
    legacy_index: &ValueIndex<'_>,
    new: &CrawlSite,
    new_index: &ValueIndex<'_>,
) -> (Vec<SignalResultRow>, usize) {
    let mut joined = Vec::new();

    for pair in pairs {
        let (Some(legacy_rows), Some(new_rows)) = (
            legacy_index.get(pair.from.as_str()),
            new_index.get(pair.to.as_str()),
        ) else {
            continue;
        };

        for &li in legacy_rows {
            for &ni in new_rows {
                let (legacy_path, new_path) = if signal.is_url_signal() {
                    (
                        Some(legacy.components(li).path.clone()),
                        Some(new.components(ni).path.clone()),
                    )
                } else {
                    (None, None)
                };
                joined.push(SignalResultRow {
                    from: pair.from.clone(),
                    to: pair.to.clone(),
                    similarity: pair.similarity,
                    legacy_path,
                    new_path,
                    legacy_url: legacy.record(li).address.clone(),
                    new_url: new.record(ni).address.clone(),
                });
            }
        }
    }

    let before = joined.len();
    let keep: Vec<bool> = {
        let mut seen = HashSet::new();
        joined.iter().map(|row| seen.insert(RowKey::of(row))).collect()
    };
    let rows: Vec<SignalResultRow> = joined
        .into_iter()
        .zip(keep)
        .filter_map(|(row, keep)| keep.then_some(row))
        .collect();
    let removed = before - rows.len();

    (rows, removed)
}

fn sort_table(signal: SignalType, mut rows: Vec<SignalResultRow>) -> SignalResultTable {
    rows.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
    SignalResultTable { signal, rows }
}
