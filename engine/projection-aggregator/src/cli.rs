//! # Command Line Interface
//!
//! `aggregate-projections <season>` builds `Projections-<season>.json`.

use crate::config::AggregatorConfig;
use crate::models::PlayerRecord;
use clap::Parser;
use std::path::PathBuf;

/// Aggregate projection sources into a ranked, tiered player table
#[derive(Parser, Debug)]
#[command(name = "aggregate-projections")]
#[command(about = "Consensus fantasy projections with VORP, volatility and tiers")]
pub struct Cli {
    /// Season to aggregate
    #[arg(value_parser = clap::value_parser!(i32).range(2001..2030))]
    pub season: i32,

    /// TOML configuration file
    #[arg(short, long, env = "PROJ_CONFIG")]
    pub config: Option<PathBuf>,

    /// Root data directory (overrides paths.data_dir)
    #[arg(short, long)]
    pub data_dir: Option<PathBuf>,

    /// K-Means seed (overrides tiers.seed)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (pretty, compact, json)
    #[arg(long, value_parser = ["pretty", "compact", "json"])]
    pub log_format: Option<String>,

    /// Print the top N players after the run
    #[arg(long, default_value = "0")]
    pub top: usize,

    /// Compute everything but do not write the output file
    #[arg(long)]
    pub dry_run: bool,
}

impl Cli {
    /// Apply command-line overrides on top of file and environment settings
    pub fn apply_overrides(&self, config: &mut AggregatorConfig) {
        if let Some(data_dir) = &self.data_dir {
            config.paths.data_dir = data_dir.clone();
        }
        if let Some(seed) = self.seed {
            config.tiers.seed = seed;
        }
        if let Some(level) = &self.log_level {
            config.logging.level = level.clone();
        }
        if let Some(format) = &self.log_format {
            config.logging.format = format.clone();
        }
    }
}

/// Print the first `limit` ranked players as a table
pub fn print_top_players(records: &[PlayerRecord], limit: usize) {
    if limit == 0 || records.is_empty() {
        return;
    }

    println!("🏈 Top {} Players", limit.min(records.len()));
    println!("{}", "=".repeat(72));
    println!(
        "{:>4}  {:<26} {:<4} {:<4} {:>8} {:>4} {:>6} {:>7}",
        "Rank", "Player", "Pos", "Team", "VORP", "Tier", "Vol", "ADP"
    );
    println!("{}", "-".repeat(72));

    for record in records.iter().take(limit) {
        let adp = record.adp.map_or_else(|| "-".to_string(), |adp| format!("{adp:.1}"));
        let tier = if record.tier == 0 { "-".to_string() } else { record.tier.to_string() };
        println!(
            "{:>4}  {:<26} {:<4} {:<4} {:>8.2} {:>4} {:>6.2} {:>7}",
            record.rank,
            record.player,
            record.position(),
            record.team.as_deref().unwrap_or("-"),
            record.vorp,
            tier,
            record.volatility,
            adp
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_season_range() {
        assert!(Cli::try_parse_from(["aggregate-projections", "2025"]).is_ok());
        assert!(Cli::try_parse_from(["aggregate-projections", "2001"]).is_ok());
        assert!(Cli::try_parse_from(["aggregate-projections", "2029"]).is_ok());
        assert!(Cli::try_parse_from(["aggregate-projections", "2000"]).is_err());
        assert!(Cli::try_parse_from(["aggregate-projections", "2030"]).is_err());
        assert!(Cli::try_parse_from(["aggregate-projections", "twenty"]).is_err());
    }

    #[test]
    fn test_overrides() {
        let cli = Cli::try_parse_from([
            "aggregate-projections",
            "2024",
            "--data-dir",
            "/srv/ff",
            "--seed",
            "7",
            "--log-format",
            "json",
            "--top",
            "25",
            "--dry-run",
        ])
        .unwrap();

        let mut config = AggregatorConfig::default();
        cli.apply_overrides(&mut config);

        assert_eq!(cli.season, 2024);
        assert_eq!(cli.top, 25);
        assert!(cli.dry_run);
        assert_eq!(config.paths.data_dir, PathBuf::from("/srv/ff"));
        assert_eq!(config.tiers.seed, 7);
        assert_eq!(config.logging.format, "json");
        assert_eq!(config.logging.level, "info");
    }
}
