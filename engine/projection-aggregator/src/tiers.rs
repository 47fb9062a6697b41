use crate::config::TierConfig;
use crate::error::Result;
use crate::kmeans::KMeans;
use crate::models::{PipelineWarning, PlayerRecord, PopulationStage};
use tracing::{debug, info};

/// Standard deviations below this are treated as a constant column
const STD_EPSILON: f64 = 1e-12;

/// Replace missing values with the mean of the present ones (0 if none).
pub fn impute_mean(values: &[Option<f64>]) -> Vec<f64> {
    let present: Vec<f64> = values.iter().flatten().copied().collect();
    let mean = if present.is_empty() {
        0.0
    } else {
        present.iter().sum::<f64>() / present.len() as f64
    };
    values.iter().map(|v| v.unwrap_or(mean)).collect()
}

/// Scale to zero mean and unit (population) variance.
///
/// A constant column becomes all zeros.
pub fn standardize(values: &[f64]) -> Vec<f64> {
    if values.is_empty() {
        return Vec::new();
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let std = (values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n).sqrt();
    let scale = if std < STD_EPSILON { 1.0 } else { std };
    values.iter().map(|v| (v - mean) / scale).collect()
}

/// Map raw cluster labels to tiers.
///
/// Non-empty clusters are ordered by mean VORP descending, then mean ADP
/// ascending, then cluster id, and numbered from 1. Returns one tier per point.
pub fn tiers_from_clusters(labels: &[usize], vorp: &[f64], adp: &[f64]) -> Vec<u32> {
    let clusters = labels.iter().max().map_or(0, |m| m + 1);
    let mut sums = vec![(0.0, 0.0, 0usize); clusters];
    for ((label, v), a) in labels.iter().zip(vorp).zip(adp) {
        let entry = &mut sums[*label];
        entry.0 += v;
        entry.1 += a;
        entry.2 += 1;
    }

    let mut order: Vec<(usize, f64, f64)> = sums
        .iter()
        .enumerate()
        .filter(|(_, (_, _, count))| *count > 0)
        .map(|(id, (v, a, count))| (id, v / *count as f64, a / *count as f64))
        .collect();
    order.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.2.total_cmp(&b.2)).then(a.0.cmp(&b.0)));

    let mut tier_of_cluster = vec![0u32; clusters];
    for (rank, (id, _, _)) in order.iter().enumerate() {
        tier_of_cluster[*id] = rank as u32 + 1;
    }
    labels.iter().map(|label| tier_of_cluster[*label]).collect()
}

/// Clusters each tiered position into ordered tiers
pub struct TierAssigner {
    config: TierConfig,
}

impl TierAssigner {
    pub fn new(config: TierConfig) -> Self {
        Self { config }
    }

    /// Fill `tier` on every record. Untiered players are left at 0.
    pub fn apply(&self, records: &mut [PlayerRecord]) -> Result<Vec<PipelineWarning>> {
        let mut warnings = Vec::new();
        for record in records.iter_mut() {
            record.tier = 0;
        }

        for (position, &k) in &self.config.tier_counts {
            let members: Vec<usize> = records
                .iter()
                .enumerate()
                .filter(|(_, r)| r.position() == position)
                .map(|(idx, _)| idx)
                .collect();

            if members.is_empty() {
                continue;
            }
            if members.len() < k {
                warnings.push(PipelineWarning::InsufficientPopulation {
                    position: position.clone(),
                    players: members.len(),
                    required: k,
                    stage: PopulationStage::Tiers,
                });
                continue;
            }

            let vorp = impute_mean(&members.iter().map(|&i| Some(records[i].vorp)).collect::<Vec<_>>());
            let adp = impute_mean(&members.iter().map(|&i| records[i].adp).collect::<Vec<_>>());
            let points: Vec<Vec<f64>> = standardize(&vorp)
                .into_iter()
                .zip(standardize(&adp))
                .map(|(v, a)| vec![v, a])
                .collect();

            let kmeans = KMeans {
                n_init: self.config.n_init,
                max_iter: self.config.max_iter,
                tolerance: self.config.tolerance,
                ..KMeans::new(k, self.config.seed)
            };
            let fit = kmeans.fit(&points)?;
            let tiers = tiers_from_clusters(&fit.labels, &vorp, &adp);

            for (&idx, tier) in members.iter().zip(&tiers) {
                records[idx].tier = *tier;
            }

            let used = tiers.iter().max().copied().unwrap_or(0);
            debug!(
                "{}: {} players in {} tiers (inertia {:.4}, {} iterations)",
                position,
                members.len(),
                used,
                fit.inertia,
                fit.iterations
            );
        }

        info!("Assigned tiers for {} positions", self.config.tier_counts.len());
        Ok(warnings)
    }
}
