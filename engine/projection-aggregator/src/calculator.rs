use crate::config::{ScoringConfig, ValueConfig};
use crate::models::{PipelineWarning, PlayerRecord, PopulationStage, StatLine};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Round to 2 decimal places
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Consensus fantasy points for a stat line; missing stats count as zero.
pub fn projected_points(stats: &StatLine, scoring: &ScoringConfig) -> f64 {
    let total: f64 = stats
        .iter()
        .map(|(field, value)| value.unwrap_or(0.0) * scoring.weight(field))
        .sum();
    round2(total)
}

/// Value Over Replacement Player calculator
pub struct VorpCalculator {
    config: ValueConfig,
}

impl VorpCalculator {
    pub fn new(config: ValueConfig) -> Self {
        Self { config }
    }

    /// Replacement baseline for every position present in `records`.
    ///
    /// The baseline is the projected points of the player at the configured
    /// 0-based index. Positions with too few players, or with no configured
    /// index, get a baseline of zero.
    pub fn baselines(&self, records: &[PlayerRecord]) -> (BTreeMap<String, f64>, Vec<PipelineWarning>) {
        let mut by_position: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
        for record in records {
            by_position.entry(record.position()).or_default().push(record.projected_points);
        }

        let mut baselines = BTreeMap::new();
        let mut warnings = Vec::new();

        for (position, mut points) in by_position {
            let Some(index) = self.config.replacement_level(position) else {
                continue;
            };

            points.sort_by(|a, b| b.total_cmp(a));
            let baseline = if points.len() > index {
                points[index]
            } else {
                warnings.push(PipelineWarning::InsufficientPopulation {
                    position: position.to_string(),
                    players: points.len(),
                    required: index + 1,
                    stage: PopulationStage::Replacement,
                });
                0.0
            };

            debug!("Replacement baseline for {}: {:.2}", position, baseline);
            baselines.insert(position.to_string(), baseline);
        }

        (baselines, warnings)
    }

    /// Fill `vorp` on every record and return any population warnings.
    pub fn apply(&self, records: &mut [PlayerRecord]) -> Vec<PipelineWarning> {
        let (baselines, warnings) = self.baselines(records);

        for record in records.iter_mut() {
            let baseline = baselines.get(record.position()).copied().unwrap_or(0.0);
            record.vorp = round2(record.projected_points - baseline);
        }

        info!("Calculated VORP for {} players across {} baselines", records.len(), baselines.len());
        warnings
    }
}
