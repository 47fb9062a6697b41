//! Rank-disagreement volatility.
//!
//! Each player's spread is the sample standard deviation of the ranks the
//! sources gave them, rescaled across the pool onto [1, 10]. Players ranked by
//! fewer than two sources get the neutral value, which means "unknown" rather
//! than "no disagreement".

use crate::models::{PipelineWarning, PlayerRecord};
use tracing::info;

/// Lower end of the volatility scale
pub const VOLATILITY_MIN: f64 = 1.0;
/// Upper end of the volatility scale
pub const VOLATILITY_MAX: f64 = 10.0;

/// Spreads closer than this are treated as identical
const RANGE_EPSILON: f64 = 1e-12;

/// Sample standard deviation (n - 1). `None` for fewer than two values.
pub fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    Some(variance.sqrt())
}

/// Min-max rescale `spreads` onto [1, 10].
///
/// Returns `None` when the finite spreads have no range (including when there
/// are none), which the caller resolves to the neutral value for everyone.
pub fn rescale(spreads: &[Option<f64>], neutral: f64) -> Option<Vec<f64>> {
    let known = spreads.iter().flatten().copied();
    let (min, max) = known.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), s| (lo.min(s), hi.max(s)));

    if !min.is_finite() || max - min < RANGE_EPSILON {
        return None;
    }

    let span = VOLATILITY_MAX - VOLATILITY_MIN;
    Some(
        spreads
            .iter()
            .map(|spread| match spread {
                Some(s) => VOLATILITY_MIN + span * (s - min) / (max - min),
                None => neutral,
            })
            .collect(),
    )
}

/// Scores how much the sources disagree on each player's rank
pub struct VolatilityScorer {
    neutral: f64,
}

impl VolatilityScorer {
    pub fn new(neutral: f64) -> Self {
        Self { neutral }
    }

    /// Fill `volatility` on every record.
    pub fn apply(&self, records: &mut [PlayerRecord]) -> Vec<PipelineWarning> {
        let spreads: Vec<Option<f64>> = records
            .iter()
            .map(|record| {
                let ranks: Vec<f64> = record.per_source_ranks.values().copied().collect();
                sample_std(&ranks)
            })
            .collect();

        match rescale(&spreads, self.neutral) {
            Some(scores) => {
                for (record, score) in records.iter_mut().zip(scores) {
                    record.volatility = score;
                }
                let unknown = spreads.iter().filter(|s| s.is_none()).count();
                info!("Scored volatility for {} players ({} neutral)", records.len(), unknown);
                Vec::new()
            }
            None => {
                for record in records.iter_mut() {
                    record.volatility = self.neutral;
                }
                if records.is_empty() {
                    return Vec::new();
                }
                vec![PipelineWarning::DegenerateVolatility { players: records.len() }]
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ConsensusProjection, StatLine};
    use std::collections::BTreeMap;

    fn record(name: &str, ranks: &[(&str, f64)]) -> PlayerRecord {
        PlayerRecord::from_projection(
            ConsensusProjection {
                player: name.to_string(),
                identity_key: None,
                team: None,
                position: Some("WR".to_string()),
                ranks: ranks.iter().map(|(c, r)| (c.to_string(), *r)).collect::<BTreeMap<_, _>>(),
                stats: StatLine::default(),
                projected_points: 0.0,
            },
            None,
        )
    }

    #[test]
    fn test_sample_std_uses_present_values_only() {
        // Three sources report, a fourth does not: n - 1 = 2, not 3.
        assert_eq!(sample_std(&[5.0, 7.0, 6.0]), Some(1.0));
        assert_eq!(sample_std(&[4.0]), None);
        assert_eq!(sample_std(&[]), None);
    }

    #[test]
    fn test_rescale_bounds() {
        let scores = rescale(&[Some(0.0), Some(2.0), Some(4.0), None], 5.0).unwrap();
        assert_eq!(scores, vec![1.0, 5.5, 10.0, 5.0]);
    }

    #[test]
    fn test_rescale_degenerate() {
        assert!(rescale(&[Some(3.0), Some(3.0), None], 5.0).is_none());
        assert!(rescale(&[None, None], 5.0).is_none());
        assert!(rescale(&[], 5.0).is_none());
    }

    #[test]
    fn test_apply_scores_and_neutral_default() {
        let mut records = vec![
            record("Steady", &[("CBS_Rank", 10.0), ("ESPN_Rank", 10.0)]),
            record("Split", &[("CBS_Rank", 5.0), ("ESPN_Rank", 7.0), ("FantasyPros_Rank", 6.0)]),
            record("Wild", &[("CBS_Rank", 1.0), ("ESPN_Rank", 9.0)]),
            record("Unranked", &[("CBS_Rank", 40.0)]),
        ];

        let warnings = VolatilityScorer::new(5.0).apply(&mut records);
        assert!(warnings.is_empty());
        assert_eq!(records[0].volatility, 1.0);
        assert_eq!(records[2].volatility, 10.0);
        assert_eq!(records[3].volatility, 5.0);
        assert!(records[1].volatility > 1.0 && records[1].volatility < 10.0);
        assert!(records.iter().all(|r| (VOLATILITY_MIN..=VOLATILITY_MAX).contains(&r.volatility)));
    }

    #[test]
    fn test_apply_degenerate_pool() {
        let mut records = vec![
            record("A", &[("CBS_Rank", 1.0), ("ESPN_Rank", 3.0)]),
            record("B", &[("CBS_Rank", 10.0), ("ESPN_Rank", 12.0)]),
            record("C", &[]),
        ];

        let warnings = VolatilityScorer::new(5.0).apply(&mut records);
        assert_eq!(warnings, vec![PipelineWarning::DegenerateVolatility { players: 3 }]);
        assert!(records.iter().all(|r| r.volatility == 5.0));
    }

    #[test]
    fn test_apply_empty_pool() {
        let mut records: Vec<PlayerRecord> = Vec::new();
        assert!(VolatilityScorer::new(5.0).apply(&mut records).is_empty());
    }
}
