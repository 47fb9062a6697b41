//! Final assembly: sort, rank and write the season artifact.

use crate::error::{AggregateError, Result};
use crate::models::{PlayerRecord, StatField};
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use std::cmp::Ordering;
use std::path::Path;
use tracing::info;

/// Output order: VORP desc, projected points desc, name asc
fn output_order(a: &PlayerRecord, b: &PlayerRecord) -> Ordering {
    b.vorp
        .total_cmp(&a.vorp)
        .then(b.projected_points.total_cmp(&a.projected_points))
        .then_with(|| a.player.cmp(&b.player))
}

/// Sort by VORP and assign contiguous 1-based ranks.
pub fn rank_players(records: &mut [PlayerRecord]) {
    records.sort_by(output_order);
    for (index, record) in records.iter_mut().enumerate() {
        record.rank = index + 1;
    }
}

/// One output object with the fixed column order
struct OutputRow<'a> {
    record: &'a PlayerRecord,
    rank_columns: &'a [String],
}

impl Serialize for OutputRow<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let record = self.record;
        let mut map = serializer.serialize_map(Some(8 + self.rank_columns.len() + StatField::ALL.len()))?;

        map.serialize_entry("Player", &record.player)?;
        map.serialize_entry("Team", &record.team)?;
        map.serialize_entry("Pos", &record.position)?;
        map.serialize_entry("VORP", &record.vorp)?;
        map.serialize_entry("Tier", &record.tier)?;
        map.serialize_entry("Volatility", &record.volatility)?;
        map.serialize_entry("ADP", &record.adp)?;
        for column in self.rank_columns {
            map.serialize_entry(column, &record.per_source_ranks.get(column))?;
        }
        for field in StatField::ALL {
            map.serialize_entry(field.column(), &record.stats.get(field))?;
        }
        map.serialize_entry("Rank", &record.rank)?;

        map.end()
    }
}

/// The season artifact: ranked records plus the rank columns to emit
pub struct Artifact<'a> {
    pub records: &'a [PlayerRecord],
    pub rank_columns: &'a [String],
}

impl Serialize for Artifact<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.records.len()))?;
        for record in self.records {
            seq.serialize_element(&OutputRow { record, rank_columns: self.rank_columns })?;
        }
        seq.end()
    }
}

impl Artifact<'_> {
    pub fn to_json(&self) -> Result<String> {
        let mut json = serde_json::to_string_pretty(self)?;
        json.push('\n');
        Ok(json)
    }

    /// Write the artifact, replacing any previous one in a single rename.
    pub fn write(&self, path: &Path) -> Result<()> {
        let json = self.to_json()?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| AggregateError::io(parent, e))?;
        }

        let staging = path.with_extension("json.tmp");
        std::fs::write(&staging, json).map_err(|e| AggregateError::io(&staging, e))?;
        std::fs::rename(&staging, path).map_err(|e| AggregateError::io(path, e))?;

        info!("Wrote {} players to {}", self.records.len(), path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ConsensusProjection, StatLine};
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    fn record(name: &str, vorp: f64, adp: Option<f64>) -> PlayerRecord {
        let mut record = PlayerRecord::from_projection(
            ConsensusProjection {
                player: name.to_string(),
                identity_key: None,
                team: Some("DET".to_string()),
                position: Some("RB".to_string()),
                ranks: BTreeMap::from([("ESPN_Rank".to_string(), 3.0)]),
                stats: StatLine::default().with(StatField::RushYds, 1200.0),
                projected_points: vorp,
            },
            adp,
        );
        record.vorp = vorp;
        record.volatility = 5.0;
        record.tier = 1;
        record
    }

    #[test]
    fn test_rank_players() {
        let mut records = vec![
            record("Jahmyr Gibbs", 80.0, Some(5.0)),
            record("Bijan Robinson", 95.5, Some(2.0)),
            record("Aaron Jones", 80.0, None),
        ];
        rank_players(&mut records);

        let order: Vec<(&str, usize)> = records.iter().map(|r| (r.player.as_str(), r.rank)).collect();
        assert_eq!(order, vec![("Bijan Robinson", 1), ("Aaron Jones", 2), ("Jahmyr Gibbs", 3)]);
    }

    #[test]
    fn test_field_order_and_nulls() {
        let mut records = vec![record("David Montgomery", 40.0, None)];
        rank_players(&mut records);
        let rank_columns = vec!["CBS_Rank".to_string(), "ESPN_Rank".to_string()];

        let json = Artifact { records: &records, rank_columns: &rank_columns }.to_json().unwrap();
        let keys: Vec<&str> = json
            .lines()
            .filter_map(|line| line.trim().strip_prefix('"'))
            .filter_map(|line| line.split('"').next())
            .collect();

        assert_eq!(
            keys,
            vec![
                "Player", "Team", "Pos", "VORP", "Tier", "Volatility", "ADP", "CBS_Rank", "ESPN_Rank",
                "Pass_Yds", "Pass_TD", "Int", "Rush_Yds", "Rush_TD", "Rec", "Rec_Yds", "Rec_TD", "Rank",
            ]
        );
        assert!(json.contains("\"ADP\": null"));
        assert!(json.contains("\"CBS_Rank\": null"));
        assert!(json.contains("\"ESPN_Rank\": 3.0"));
        assert!(json.contains("\"Rush_Yds\": 1200.0"));
        assert!(json.contains("\"Rank\": 1"));
    }

    #[test]
    fn test_write_creates_directory_and_replaces() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("processed").join("Projections-2025.json");

        let records = vec![record("Breece Hall", 60.0, Some(12.0))];
        let artifact = Artifact { records: &records, rank_columns: &[] };
        artifact.write(&path).unwrap();
        artifact.write(&path).unwrap();

        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written[0]["Player"], "Breece Hall");
        assert_eq!(written[0]["ADP"], 12.0);
        assert!(!path.with_extension("json.tmp").exists());
    }
}
