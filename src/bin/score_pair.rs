// Scores two strings under every metric to help pick signal thresholds.
use anyhow::{Context, Result};
use clap::Parser;
use redirect_mapper_lib::matching::{MatcherConfig, SimilarityMatcher, SimilarityMetric};
use redirect_mapper_lib::models::matching::round_similarity;
use redirect_mapper_lib::utils::config::MappingConfig;
use redirect_mapper_lib::utils::env::load_env;
use redirect_mapper_lib::SignalType;

#[derive(Parser, Debug)]
#[command(author, version, about = "Score a legacy/new value pair under every similarity metric", long_about = None)]
struct Args {
    /// Legacy value (path, slug, title or heading)
    legacy: String,

    /// New value to compare against
    new: String,

    /// Compare raw values without normalization
    #[arg(long)]
    no_normalize: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    load_env();
    let args = Args::parse();

    let config = MappingConfig::from_env().context("Invalid mapping configuration")?;
    let normalize = config.matcher.normalize && !args.no_normalize;

    println!("Legacy: {:?}", args.legacy);
    println!("New:    {:?}", args.new);
    println!("Normalization: {}", if normalize { "on" } else { "off" });
    println!();

    let header: Vec<String> = SignalType::ALL
        .iter()
        .map(|s| format!("{:>6}@{:.3}", s.log_label().0, config.threshold(*s)))
        .collect();
    println!("{:<14} {:>7}  {}", "Metric", "Score", header.join(" "));

    for metric in SimilarityMetric::ALL {
        let matcher = SimilarityMatcher::new(MatcherConfig { metric, normalize });
        let score = matcher.similarity(&args.legacy, &args.new);
        let verdicts: Vec<String> = SignalType::ALL
            .iter()
            .map(|s| {
                let accepted = round_similarity(score) >= config.threshold(*s);
                format!("{:>12}", if accepted { "✅ accept" } else { "❌ reject" })
            })
            .collect();
        let marker = if metric == config.matcher.metric { "*" } else { " " };
        println!(
            "{}{:<13} {:>7.3}  {}",
            marker,
            metric.as_str(),
            score,
            verdicts.join(" ")
        );
    }

    println!();
    println!("* configured metric (MATCH_METRIC)");
    Ok(())
}
