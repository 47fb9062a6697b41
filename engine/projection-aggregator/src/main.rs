//! Projection aggregation entry point
//!
//! Loads configuration (file, then `PROJ_*` environment, then flags), runs the
//! pipeline for one season and prints a summary.

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use projection_aggregator::cli::{print_top_players, Cli};
use projection_aggregator::{initialize_logging, AggregationEngine, AggregatorConfig, PipelineReport};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => AggregatorConfig::load_from_file(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => AggregatorConfig::default(),
    };
    let mut config = config.apply_env().context("Invalid environment override")?;
    cli.apply_overrides(&mut config);
    config.validate().context("Invalid configuration")?;

    initialize_logging(&config.logging.level, &config.logging.format)?;
    info!("Starting projection aggregator v{}", env!("CARGO_PKG_VERSION"));

    let engine = AggregationEngine::new(config);
    let ranking = engine
        .build(cli.season)
        .with_context(|| format!("Failed to aggregate {} projections", cli.season))?;

    if cli.dry_run {
        println!("🔍 Dry run: nothing written");
        print_summary(&ranking.report(None));
        print_top_players(&ranking.records, cli.top);
        return Ok(());
    }

    let records = (cli.top > 0).then(|| ranking.records.clone());
    let report = engine.write(ranking).context("Failed to write projections")?;

    if let Some(path) = &report.output_path {
        println!("✅ Successfully saved {} projections to {}", report.season, path.display());
    }
    print_summary(&report);
    if let Some(records) = records {
        print_top_players(&records, cli.top);
    }

    Ok(())
}

fn print_summary(report: &PipelineReport) {
    println!(
        "📊 {} players from {} sources ({})",
        report.player_count,
        report.sources.len(),
        report.sources.join(", ")
    );
    if !report.warnings.is_empty() {
        println!("⚠️  {} warnings", report.warnings.len());
        for warning in &report.warnings {
            println!("   - {}", warning);
        }
    }
}
