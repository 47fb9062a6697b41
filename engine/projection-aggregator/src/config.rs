use crate::error::{AggregateError, Result};
use crate::models::StatField;
use crate::volatility::{VOLATILITY_MAX, VOLATILITY_MIN};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Configuration for the projection aggregator
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregatorConfig {
    /// Input and output locations
    pub paths: PathsConfig,

    /// Fantasy scoring weights
    pub scoring: ScoringConfig,

    /// Replacement baselines and volatility scale
    pub value: ValueConfig,

    /// K-Means tiering parameters
    pub tiers: TierConfig,

    /// ADP name matching
    pub matching: MatchingConfig,

    /// Logging output
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Root that the directories below are resolved against
    pub data_dir: PathBuf,

    /// Raw per-source projection tables (`<source>-<year>.<ext>`)
    pub projections_dir: PathBuf,

    /// Raw ADP tables
    pub adp_dir: PathBuf,

    /// Processed output (`Projections-<year>.json`)
    pub output_dir: PathBuf,

    /// Source name of the single ADP table
    pub adp_source: String,

    /// Extension of raw tables
    pub file_extension: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            projections_dir: PathBuf::from("raw/projections"),
            adp_dir: PathBuf::from("raw/adp"),
            output_dir: PathBuf::from("processed"),
            adp_source: "FantasyPros".to_string(),
            file_extension: "csv".to_string(),
        }
    }
}

impl PathsConfig {
    pub fn projections_path(&self) -> PathBuf {
        self.data_dir.join(&self.projections_dir)
    }

    pub fn adp_file(&self, season: i32) -> PathBuf {
        self.data_dir
            .join(&self.adp_dir)
            .join(format!("{}-{}.{}", self.adp_source, season, self.file_extension))
    }

    pub fn output_file(&self, season: i32) -> PathBuf {
        self.data_dir.join(&self.output_dir).join(format!("Projections-{season}.json"))
    }
}

/// Points per unit of each stat. Defaults are half-point PPR.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub pass_yds: f64,
    pub pass_td: f64,
    pub interception: f64,
    pub rush_yds: f64,
    pub rush_td: f64,
    pub reception: f64,
    pub rec_yds: f64,
    pub rec_td: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            pass_yds: 1.0 / 25.0,
            pass_td: 4.0,
            interception: -2.0,
            rush_yds: 1.0 / 10.0,
            rush_td: 6.0,
            reception: 0.5,
            rec_yds: 1.0 / 10.0,
            rec_td: 6.0,
        }
    }
}

impl ScoringConfig {
    /// Points awarded per unit of `field`
    pub fn weight(&self, field: StatField) -> f64 {
        match field {
            StatField::PassYds => self.pass_yds,
            StatField::PassTd => self.pass_td,
            StatField::Int => self.interception,
            StatField::RushYds => self.rush_yds,
            StatField::RushTd => self.rush_td,
            StatField::Rec => self.reception,
            StatField::RecYds => self.rec_yds,
            StatField::RecTd => self.rec_td,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ValueConfig {
    /// 0-based index of the replacement-level player per position
    pub replacement_levels: BTreeMap<String, usize>,

    /// Volatility for players whose rank spread is unknown
    pub neutral_volatility: f64,
}

impl Default for ValueConfig {
    fn default() -> Self {
        let mut replacement_levels = BTreeMap::new();
        replacement_levels.insert("QB".to_string(), 20);
        replacement_levels.insert("RB".to_string(), 40);
        replacement_levels.insert("WR".to_string(), 40);
        replacement_levels.insert("TE".to_string(), 15);

        Self { replacement_levels, neutral_volatility: 5.0 }
    }
}

impl ValueConfig {
    /// Replacement index for a position, if configured
    pub fn replacement_level(&self, position: &str) -> Option<usize> {
        self.replacement_levels.get(position).copied()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TierConfig {
    /// Number of tiers (K-Means clusters) per position
    pub tier_counts: BTreeMap<String, usize>,

    /// K-Means seed
    pub seed: u64,

    /// Independent K-Means restarts; the lowest inertia wins
    pub n_init: usize,

    /// Lloyd iterations per restart
    pub max_iter: usize,

    /// Convergence tolerance, relative to the mean feature variance
    pub tolerance: f64,
}

impl Default for TierConfig {
    fn default() -> Self {
        let mut tier_counts = BTreeMap::new();
        tier_counts.insert("QB".to_string(), 8);
        tier_counts.insert("RB".to_string(), 10);
        tier_counts.insert("WR".to_string(), 10);
        tier_counts.insert("TE".to_string(), 7);

        Self { tier_counts, seed: 42, n_init: 10, max_iter: 300, tolerance: 1e-4 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchingConfig {
    /// Fuzzy-match ADP names that fail the exact join
    pub fuzzy_adp_fallback: bool,

    /// Minimum Skim score for a fuzzy match
    pub fuzzy_min_score: i64,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            fuzzy_adp_fallback: false,
            fuzzy_min_score: player_registry::matcher::DEFAULT_MIN_SCORE,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (pretty, compact, json)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), format: "pretty".to_string() }
    }
}

impl AggregatorConfig {
    /// Load configuration from a TOML file. Missing sections keep defaults.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| AggregateError::io(path, e))?;
        let config: AggregatorConfig = toml::from_str(&content)
            .map_err(|e| AggregateError::config(format!("{}: {e}", path.display())))?;
        Ok(config)
    }

    /// Apply `PROJ_*` environment overrides
    pub fn apply_env(mut self) -> Result<Self> {
        if let Ok(data_dir) = std::env::var("PROJ_DATA_DIR") {
            self.paths.data_dir = PathBuf::from(data_dir);
        }

        if let Ok(adp_source) = std::env::var("PROJ_ADP_SOURCE") {
            self.paths.adp_source = adp_source;
        }

        if let Ok(seed) = std::env::var("PROJ_TIER_SEED") {
            self.tiers.seed = seed
                .parse()
                .map_err(|_| AggregateError::config(format!("PROJ_TIER_SEED is not a u64: {seed}")))?;
        }

        if let Ok(level) = std::env::var("PROJ_LOG_LEVEL") {
            self.logging.level = level;
        }

        if let Ok(format) = std::env::var("PROJ_LOG_FORMAT") {
            self.logging.format = format;
        }

        Ok(self)
    }

    /// Reject settings the pipeline cannot run with
    pub fn validate(&self) -> Result<()> {
        if let Some((position, _)) = self.tiers.tier_counts.iter().find(|(_, k)| **k == 0) {
            return Err(AggregateError::config(format!("tier count for {position} must be positive")));
        }
        if self.tiers.n_init == 0 {
            return Err(AggregateError::config("tiers.n_init must be positive"));
        }
        if self.tiers.max_iter == 0 {
            return Err(AggregateError::config("tiers.max_iter must be positive"));
        }
        if !self.tiers.tolerance.is_finite() || self.tiers.tolerance < 0.0 {
            return Err(AggregateError::config("tiers.tolerance must be a non-negative number"));
        }
        if !(VOLATILITY_MIN..=VOLATILITY_MAX).contains(&self.value.neutral_volatility) {
            return Err(AggregateError::config(format!(
                "value.neutral_volatility must be within {VOLATILITY_MIN}..={VOLATILITY_MAX}"
            )));
        }
        if self.paths.adp_source.is_empty() {
            return Err(AggregateError::config("paths.adp_source must not be empty"));
        }
        Ok(())
    }
}
