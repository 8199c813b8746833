use anyhow::{Context, Result};
use clap::Parser;
use indicatif::ProgressBar;
use log::{error, info};
use redirect_mapper_lib::ingest::{load_crawl, CrawlLoadStats};
use redirect_mapper_lib::matching::{SignalMatchOrchestrator, SimilarityMetric};
use redirect_mapper_lib::models::crawl::{CrawlSide, CrawlSite};
use redirect_mapper_lib::models::stats_models::{RunStats, SignalType};
use redirect_mapper_lib::report::{ReportFormat, ReportMetadata};
use redirect_mapper_lib::utils::config::MappingConfig;
use redirect_mapper_lib::utils::env::load_env;
use redirect_mapper_lib::utils::get_memory_usage;
use redirect_mapper_lib::utils::progress_bars::progress_config::{add_bar, main_bar_style, ProgressConfig};
use redirect_mapper_lib::MapperError;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

const PIPELINE_PHASES: u64 = 4;

/// Map legacy URLs to their closest pages on a migrated site.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Crawl export (CSV) of the legacy site
    #[arg(long)]
    legacy: PathBuf,

    /// Crawl export (CSV) of the new site
    #[arg(long)]
    new: PathBuf,

    /// Output file (json) or directory (csv)
    #[arg(short, long)]
    output: Option<PathBuf>,

    #[arg(long, default_value_t = ReportFormat::Json)]
    format: ReportFormat,

    /// dice, levenshtein, damerau or jaro-winkler
    #[arg(long)]
    metric: Option<SimilarityMetric>,

    /// Compare raw values without trimming, lowercasing or collapsing whitespace
    #[arg(long)]
    no_normalize: bool,

    #[arg(long)]
    url_threshold: Option<f64>,

    #[arg(long)]
    slug_threshold: Option<f64>,

    #[arg(long)]
    title_threshold: Option<f64>,

    #[arg(long)]
    h1_threshold: Option<f64>,

    #[arg(long)]
    h2_threshold: Option<f64>,
}

impl Cli {
    fn apply_overrides(&self, config: &mut MappingConfig) -> Result<(), MapperError> {
        if let Some(metric) = self.metric {
            config.matcher.metric = metric;
        }
        if self.no_normalize {
            config.matcher.normalize = false;
        }
        let thresholds = [
            (SignalType::UrlPath, self.url_threshold),
            (SignalType::UrlSlug, self.slug_threshold),
            (SignalType::Title, self.title_threshold),
            (SignalType::Heading1, self.h1_threshold),
            (SignalType::Heading2, self.h2_threshold),
        ];
        for (signal, value) in thresholds {
            if let Some(value) = value {
                config.set_threshold(signal, value)?;
            }
        }
        Ok(())
    }
}

fn update_main_pb(pb: Option<&ProgressBar>, message: String) {
    if let Some(pb) = pb {
        pb.set_message(message);
    }
}

fn load_side(path: &Path, side: CrawlSide) -> Result<(CrawlSite, CrawlLoadStats)> {
    load_crawl(path, side).with_context(|| format!("Failed to load {} crawl", side))
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    load_env();
    let cli = Cli::parse();

    // Configuration errors stop the run before any file is read
    let mut config = MappingConfig::from_env().context("Invalid mapping configuration")?;
    cli.apply_overrides(&mut config)
        .context("Invalid command line configuration")?;
    let progress_config = ProgressConfig::from_env().context("Invalid progress configuration")?;
    info!(
        "Progress tracking: enabled={}, detailed={}",
        progress_config.enabled, progress_config.detailed
    );

    let (run_stats, written) = match run_mapping(&cli, config, &progress_config).await {
        Ok(outcome) => outcome,
        Err(e) => {
            error!("❌ Mapping aborted by {}; no report was written", failure_kind(&e));
            return Err(e);
        }
    };
    print_summary(&run_stats, &written);

    if progress_config.should_show_memory() {
        let final_memory_mb = get_memory_usage().await;
        info!("Final memory usage: {} MB", final_memory_mb);
    }

    info!("Redirect mapping completed successfully!");
    Ok(())
}

/// Loads both crawls, matches every signal and writes the report. Nothing is
/// written unless loading and matching both succeed.
async fn run_mapping(
    cli: &Cli,
    config: MappingConfig,
    progress_config: &ProgressConfig,
) -> Result<(RunStats, PathBuf)> {
    let multi_progress = progress_config.create_multi_progress();
    let main_pb = add_bar(multi_progress.as_ref(), PIPELINE_PHASES, main_bar_style());
    update_main_pb(main_pb.as_ref(), "Initializing run...".to_string());

    let run_id = Uuid::new_v4().to_string();
    info!("Starting redirect mapping run {}", run_id);

    // Phase 1: load both crawls
    update_main_pb(main_pb.as_ref(), "Phase 1: Loading crawls".to_string());
    let load_start = Instant::now();
    let (legacy, legacy_load) = load_side(&cli.legacy, CrawlSide::Legacy)?;
    let (new, new_load) = load_side(&cli.new, CrawlSide::New)?;
    let load_time = load_start.elapsed();
    info!(
        "Loaded {} legacy and {} new records in {:.2?}",
        legacy.len(),
        new.len(),
        load_time
    );
    if let Some(pb) = &main_pb {
        pb.inc(1);
    }

    // Phase 2: URL decomposition happens as records load; report what it found
    update_main_pb(main_pb.as_ref(), "Phase 2: Decomposing URLs".to_string());
    for (side, stats) in [(CrawlSide::Legacy, &legacy_load), (CrawlSide::New, &new_load)] {
        info!(
            "🌐 {} {} addresses decomposed ({} without a URL path)",
            stats.records_kept - stats.unparseable_addresses,
            side,
            stats.unparseable_addresses
        );
    }
    if let Some(pb) = &main_pb {
        pb.inc(1);
    }

    // Phase 3: signal matching
    update_main_pb(main_pb.as_ref(), "Phase 3: Matching signals".to_string());
    let matching_start = Instant::now();
    let orchestrator = SignalMatchOrchestrator::new(config);
    let legacy = Arc::new(legacy);
    let new = Arc::new(new);
    let signal_progress = if progress_config.should_show_detailed() {
        multi_progress.as_ref()
    } else {
        None
    };
    let (report, signal_stats) = orchestrator
        .run(Arc::clone(&legacy), Arc::clone(&new), &run_id, signal_progress)
        .await
        .context("Signal matching failed")?;
    let matching_time = matching_start.elapsed();
    if let Some(pb) = &main_pb {
        pb.inc(1);
    }

    // Phase 4: write the report
    update_main_pb(main_pb.as_ref(), "Phase 4: Writing report".to_string());
    let report_start = Instant::now();
    let output = cli
        .output
        .clone()
        .unwrap_or_else(|| cli.format.default_output());
    let metadata = ReportMetadata::new(&run_id, &legacy, &new);
    let written = cli
        .format
        .writer(output)
        .write(&report, &metadata)
        .context("Failed to write mapping report")?;
    let report_time = report_start.elapsed();
    if let Some(pb) = &main_pb {
        pb.inc(1);
        pb.finish_with_message(format!("Run complete: {} rows", report.total_rows()));
    }

    let run_stats = RunStats {
        run_id,
        legacy_records: legacy.len(),
        new_records: new.len(),
        load_time: load_time.as_secs_f64(),
        matching_time: matching_time.as_secs_f64(),
        report_time: report_time.as_secs_f64(),
        signal_stats,
    };
    Ok((run_stats, written))
}

/// Names what stopped a run: a rejected crawl file, bad configuration, or
/// something else along the way.
fn failure_kind(err: &anyhow::Error) -> &'static str {
    match err.chain().find_map(|cause| cause.downcast_ref::<MapperError>()) {
        Some(mapper_err) if mapper_err.is_input_error() => "an input file error",
        Some(_) => "a configuration error",
        None => "a pipeline error",
    }
}

fn print_summary(stats: &RunStats, written: &Path) {
    println!("=== Redirect Mapping Summary ===");
    println!("Run ID: {}", stats.run_id);
    println!(
        "Records: {} legacy, {} new",
        stats.legacy_records, stats.new_records
    );
    println!(
        "{:<12} {:>9} {:>8} {:>9} {:>9}",
        "Sheet", "Threshold", "Rows", "Covered", "Avg sim"
    );
    for signal in &stats.signal_stats {
        println!(
            "{:<12} {:>9.3} {:>8} {:>9} {:>9.3}",
            signal.signal.sheet_name(),
            signal.threshold,
            signal.rows_written,
            signal.legacy_urls_covered,
            signal.avg_similarity
        );
    }
    println!(
        "Timing: load {:.2}s, matching {:.2}s, report {:.2}s",
        stats.load_time, stats.matching_time, stats.report_time
    );
    println!("Report written to {}", written.display());
}
