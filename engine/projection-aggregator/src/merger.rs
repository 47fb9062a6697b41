use crate::config::MatchingConfig;
use crate::models::{AdpTable, ConsensusTable, PipelineWarning, PlayerRecord};
use player_registry::NameMatcher;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info};

/// Left join of consensus projections with ADP
pub struct Merger {
    matching: MatchingConfig,
}

impl Merger {
    pub fn new(matching: MatchingConfig) -> Self {
        Self { matching }
    }

    /// One [`PlayerRecord`] per consensus player, with `adp` when it joined.
    ///
    /// ADP rows without a projection are dropped. With the fuzzy fallback
    /// enabled, each leftover ADP name may claim one still-unmatched player.
    pub fn merge(&self, consensus: ConsensusTable, adp: &AdpTable) -> (Vec<PlayerRecord>, Vec<PipelineWarning>) {
        let mut warnings = Vec::new();
        let mut adp_by_player: BTreeMap<String, f64> = BTreeMap::new();

        for projection in &consensus.players {
            if let Some(value) = adp.get(&projection.player) {
                adp_by_player.insert(projection.player.clone(), value);
            }
        }

        if self.matching.fuzzy_adp_fallback {
            warnings.extend(self.fuzzy_fallback(&consensus, adp, &mut adp_by_player));
        }

        let records: Vec<PlayerRecord> = consensus
            .players
            .into_iter()
            .map(|projection| {
                let value = adp_by_player.get(&projection.player).copied();
                PlayerRecord::from_projection(projection, value)
            })
            .collect();

        info!(
            "Merged {} players, {} with ADP ({} ADP entries)",
            records.len(),
            adp_by_player.len(),
            adp.len()
        );
        (records, warnings)
    }

    fn fuzzy_fallback(
        &self,
        consensus: &ConsensusTable,
        adp: &AdpTable,
        adp_by_player: &mut BTreeMap<String, f64>,
    ) -> Vec<PipelineWarning> {
        let matcher = NameMatcher::new(self.matching.fuzzy_min_score);
        let projected: BTreeSet<&str> = consensus.players.iter().map(|p| p.player.as_str()).collect();
        let mut unmatched: BTreeSet<&str> =
            projected.iter().copied().filter(|name| !adp_by_player.contains_key(*name)).collect();

        let mut warnings = Vec::new();
        for (adp_name, value) in &adp.entries {
            if projected.contains(adp_name.as_str()) {
                continue;
            }
            let Some((matched, score)) = matcher.best_match(adp_name, unmatched.iter().copied()) else {
                debug!("No projection for ADP entry '{}'", adp_name);
                continue;
            };

            adp_by_player.insert(matched.to_string(), *value);
            unmatched.remove(matched);
            warnings.push(PipelineWarning::FuzzyAdpMatch {
                adp_name: adp_name.clone(),
                matched: matched.to_string(),
                score,
            });
        }

        warnings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ConsensusProjection, StatLine};

    fn consensus(names: &[&str]) -> ConsensusTable {
        ConsensusTable {
            players: names
                .iter()
                .map(|name| ConsensusProjection {
                    player: name.to_string(),
                    identity_key: None,
                    team: None,
                    position: Some("WR".to_string()),
                    ranks: BTreeMap::new(),
                    stats: StatLine::default(),
                    projected_points: 100.0,
                })
                .collect(),
            ..ConsensusTable::default()
        }
    }

    fn adp(entries: &[(&str, f64)]) -> AdpTable {
        AdpTable {
            entries: entries.iter().map(|(n, a)| (n.to_string(), *a)).collect(),
            duplicates: Vec::new(),
        }
    }

    #[test]
    fn test_left_join_keeps_unmatched_players() {
        let merger = Merger::new(MatchingConfig::default());
        let (records, warnings) = merger.merge(
            consensus(&["CeeDee Lamb", "Gabriel Davis"]),
            &adp(&[("CeeDee Lamb", 4.5), ("Gabe Davis", 140.0), ("Rookie Nobody", 200.0)]),
        );

        assert!(warnings.is_empty());
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].adp, Some(4.5));
        assert_eq!(records[1].player, "Gabriel Davis");
        assert_eq!(records[1].adp, None);
        assert_eq!(records[1].projected_points, 100.0);
    }

    #[test]
    fn test_fuzzy_fallback_is_opt_in() {
        let merger = Merger::new(MatchingConfig { fuzzy_adp_fallback: true, ..MatchingConfig::default() });
        let (records, warnings) =
            merger.merge(consensus(&["CeeDee Lamb", "Gabriel Davis"]), &adp(&[("Gabe Davis", 140.0)]));

        assert_eq!(records[1].adp, Some(140.0));
        assert_eq!(records[0].adp, None);
        assert!(matches!(
            &warnings[..],
            [PipelineWarning::FuzzyAdpMatch { adp_name, matched, .. }]
                if adp_name == "Gabe Davis" && matched == "Gabriel Davis"
        ));
    }

    #[test]
    fn test_fuzzy_fallback_never_steals_exact_matches() {
        let merger = Merger::new(MatchingConfig { fuzzy_adp_fallback: true, ..MatchingConfig::default() });
        let (records, warnings) = merger.merge(
            consensus(&["Gabriel Davis"]),
            &adp(&[("Gabe Davis", 140.0), ("Gabriel Davis", 120.0)]),
        );

        assert_eq!(records[0].adp, Some(120.0));
        assert!(warnings.is_empty());
    }
}
