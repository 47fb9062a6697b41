//! # Aggregation Engine
//!
//! Runs one season end to end:
//! load sources -> merge ADP -> VORP -> volatility -> tiers -> rank -> write.
//! Any fatal error aborts before the artifact is touched.

use crate::calculator::VorpCalculator;
use crate::config::AggregatorConfig;
use crate::error::Result;
use crate::loader::SourceLoader;
use crate::merger::Merger;
use crate::models::{PipelineWarning, PlayerRecord};
use crate::output::{rank_players, Artifact};
use crate::tiers::TierAssigner;
use crate::volatility::VolatilityScorer;
use std::path::PathBuf;
use tracing::{info, warn};

/// Ranked records for one season, ready to write
#[derive(Debug, Clone)]
pub struct SeasonRanking {
    pub season: i32,
    pub sources: Vec<String>,
    pub rank_columns: Vec<String>,
    pub records: Vec<PlayerRecord>,
    pub warnings: Vec<PipelineWarning>,
}

impl SeasonRanking {
    pub fn artifact(&self) -> Artifact<'_> {
        Artifact { records: &self.records, rank_columns: &self.rank_columns }
    }

    /// Summarize the ranking; `output_path` is `None` when nothing was written.
    pub fn report(&self, output_path: Option<PathBuf>) -> PipelineReport {
        PipelineReport {
            season: self.season,
            output_path,
            sources: self.sources.clone(),
            player_count: self.records.len(),
            warnings: self.warnings.clone(),
        }
    }
}

/// Summary of a completed run
#[derive(Debug, Clone)]
pub struct PipelineReport {
    pub season: i32,
    /// `None` when nothing was written
    pub output_path: Option<PathBuf>,
    pub sources: Vec<String>,
    pub player_count: usize,
    pub warnings: Vec<PipelineWarning>,
}

/// Season aggregation pipeline
pub struct AggregationEngine {
    config: AggregatorConfig,
}

impl AggregationEngine {
    pub fn new(config: AggregatorConfig) -> Self {
        Self { config }
    }

    /// Compute the ranked player table without writing anything.
    pub fn build(&self, season: i32) -> Result<SeasonRanking> {
        info!("Aggregating projections for {}", season);
        let mut warnings = Vec::new();

        let loader = SourceLoader::new(self.config.paths.clone(), self.config.scoring.clone());
        let consensus = loader.load_projections(season)?;
        let adp = loader.load_adp(season)?;

        if consensus.sources.is_empty() {
            warnings.push(PipelineWarning::NoProjectionSources);
        }
        warnings.extend(consensus.collisions.iter().map(PipelineWarning::from));
        warnings.extend(adp.duplicates.iter().map(|player| PipelineWarning::DuplicateAdp { player: player.clone() }));

        let sources = consensus.sources.clone();
        let rank_columns = consensus.rank_columns.clone();

        let (mut records, merge_warnings) = Merger::new(self.config.matching.clone()).merge(consensus, &adp);
        warnings.extend(merge_warnings);

        warnings.extend(VorpCalculator::new(self.config.value.clone()).apply(&mut records));
        warnings.extend(VolatilityScorer::new(self.config.value.neutral_volatility).apply(&mut records));
        warnings.extend(TierAssigner::new(self.config.tiers.clone()).apply(&mut records)?);

        rank_players(&mut records);

        // Stages only collect warnings; this is the one place they are logged.
        for warning in &warnings {
            warn!("{}", warning);
        }

        Ok(SeasonRanking { season, sources, rank_columns, records, warnings })
    }

    /// Build the season and write `Projections-<season>.json`.
    pub fn run(&self, season: i32) -> Result<PipelineReport> {
        let ranking = self.build(season)?;
        self.write(ranking)
    }

    /// Write a built ranking to the configured output file.
    pub fn write(&self, ranking: SeasonRanking) -> Result<PipelineReport> {
        let path = self.config.paths.output_file(ranking.season);
        ranking.artifact().write(&path)?;
        Ok(ranking.report(Some(path)))
    }
}
