use player_registry::{IdentityKey, NameCollision};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

/// Counting stats that feed projected points, in output column order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StatField {
    PassYds,
    PassTd,
    Int,
    RushYds,
    RushTd,
    Rec,
    RecYds,
    RecTd,
}

impl StatField {
    pub const ALL: [StatField; 8] = [
        StatField::PassYds,
        StatField::PassTd,
        StatField::Int,
        StatField::RushYds,
        StatField::RushTd,
        StatField::Rec,
        StatField::RecYds,
        StatField::RecTd,
    ];

    /// Column header used by raw tables and the output artifact
    pub fn column(self) -> &'static str {
        match self {
            StatField::PassYds => "Pass_Yds",
            StatField::PassTd => "Pass_TD",
            StatField::Int => "Int",
            StatField::RushYds => "Rush_Yds",
            StatField::RushTd => "Rush_TD",
            StatField::Rec => "Rec",
            StatField::RecYds => "Rec_Yds",
            StatField::RecTd => "Rec_TD",
        }
    }

    pub fn from_column(column: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.column() == column)
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// One value per [`StatField`]; `None` when no source reported it
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StatLine([Option<f64>; 8]);

impl StatLine {
    pub fn get(&self, field: StatField) -> Option<f64> {
        self.0[field.index()]
    }

    pub fn set(&mut self, field: StatField, value: Option<f64>) {
        self.0[field.index()] = value;
    }

    pub fn with(mut self, field: StatField, value: f64) -> Self {
        self.set(field, Some(value));
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (StatField, Option<f64>)> + '_ {
        StatField::ALL.into_iter().map(move |field| (field, self.get(field)))
    }
}

/// One parsed row of a projection source
#[derive(Debug, Clone, PartialEq)]
pub struct SourceRow {
    /// Normalized join name
    pub player: String,
    pub position: Option<String>,
    pub team: Option<String>,
    pub rank: Option<f64>,
    pub stats: StatLine,
}

/// A parsed projection source (`<source>-<year>.<ext>`)
#[derive(Debug, Clone)]
pub struct SourceTable {
    pub source: String,
    pub path: PathBuf,
    pub rows: Vec<SourceRow>,
}

impl SourceTable {
    /// Source-qualified rank column, e.g. `ESPN_Rank`
    pub fn rank_column(&self) -> String {
        rank_column_name(&self.source)
    }
}

pub fn rank_column_name(source: &str) -> String {
    format!("{source}_Rank")
}

/// A consensus projection: stats averaged across every source
#[derive(Debug, Clone, PartialEq)]
pub struct ConsensusProjection {
    pub player: String,
    pub identity_key: Option<IdentityKey>,
    pub team: Option<String>,
    pub position: Option<String>,
    /// Rank column (`<source>_Rank`) to rank
    pub ranks: BTreeMap<String, f64>,
    pub stats: StatLine,
    pub projected_points: f64,
}

/// Output of the source loader for one season
#[derive(Debug, Clone, Default)]
pub struct ConsensusTable {
    /// Players in join-name order
    pub players: Vec<ConsensusProjection>,
    /// Source names in load order
    pub sources: Vec<String>,
    /// Every rank column seen, sorted
    pub rank_columns: Vec<String>,
    /// Join names that merged more than one identity
    pub collisions: Vec<NameCollision>,
}

/// ADP keyed by normalized join name
#[derive(Debug, Clone, Default)]
pub struct AdpTable {
    pub entries: BTreeMap<String, f64>,
    /// Join names that appeared more than once; the first row won
    pub duplicates: Vec<String>,
}

impl AdpTable {
    pub fn get(&self, player: &str) -> Option<f64> {
        self.entries.get(player).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The unit entity of the pipeline, one per distinct player
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerRecord {
    pub player: String,
    pub identity_key: Option<IdentityKey>,
    pub team: Option<String>,
    pub position: Option<String>,
    pub per_source_ranks: BTreeMap<String, f64>,
    pub stats: StatLine,
    pub projected_points: f64,
    pub adp: Option<f64>,
    pub vorp: f64,
    pub volatility: f64,
    /// 1 = best; 0 = not tiered
    pub tier: u32,
    /// 1-based overall rank by VORP; 0 until assigned
    pub rank: usize,
}

impl PlayerRecord {
    /// Start a record from its consensus projection; derived fields are filled later.
    pub fn from_projection(projection: ConsensusProjection, adp: Option<f64>) -> Self {
        Self {
            player: projection.player,
            identity_key: projection.identity_key,
            team: projection.team,
            position: projection.position,
            per_source_ranks: projection.ranks,
            stats: projection.stats,
            projected_points: projection.projected_points,
            adp,
            vorp: 0.0,
            volatility: 0.0,
            tier: 0,
            rank: 0,
        }
    }

    pub fn position(&self) -> &str {
        self.position.as_deref().unwrap_or("")
    }
}

/// Which stage found a position too small
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopulationStage {
    Replacement,
    Tiers,
}

/// Non-fatal conditions reported by a run
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineWarning {
    /// No projection files were found for the season
    NoProjectionSources,

    /// A position is too small for its replacement index or tier count
    InsufficientPopulation {
        position: String,
        players: usize,
        required: usize,
        stage: PopulationStage,
    },

    /// Every player had the same rank spread
    DegenerateVolatility { players: usize },

    /// A join name merged more than one identity
    IdentityCollision { name: String, identities: Vec<String> },

    /// An ADP table listed the same join name twice
    DuplicateAdp { player: String },

    /// An ADP name joined a projection through the fuzzy fallback
    FuzzyAdpMatch { adp_name: String, matched: String, score: i64 },
}

impl From<&NameCollision> for PipelineWarning {
    fn from(collision: &NameCollision) -> Self {
        PipelineWarning::IdentityCollision {
            name: collision.name.clone(),
            identities: collision.identities.iter().map(|k| k.to_string()).collect(),
        }
    }
}

impl fmt::Display for PipelineWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineWarning::NoProjectionSources => write!(f, "no projection sources found"),
            PipelineWarning::InsufficientPopulation { position, players, required, stage } => {
                let what = match stage {
                    PopulationStage::Replacement => "replacement baseline",
                    PopulationStage::Tiers => "tiering",
                };
                write!(f, "{position} has {players} players, {what} needs {required}")
            }
            PipelineWarning::DegenerateVolatility { players } => {
                write!(f, "rank spread identical for all {players} players, volatility set to neutral")
            }
            PipelineWarning::IdentityCollision { name, identities } => {
                write!(f, "'{name}' merges {} identities: {}", identities.len(), identities.join(", "))
            }
            PipelineWarning::DuplicateAdp { player } => {
                write!(f, "duplicate ADP entry for '{player}', keeping the first")
            }
            PipelineWarning::FuzzyAdpMatch { adp_name, matched, score } => {
                write!(f, "ADP '{adp_name}' fuzzy matched '{matched}' (score {score})")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stat_columns_round_trip() {
        for field in StatField::ALL {
            assert_eq!(StatField::from_column(field.column()), Some(field));
        }
        assert_eq!(StatField::from_column("FPTS"), None);
    }

    #[test]
    fn test_stat_line_access() {
        let line = StatLine::default().with(StatField::Rec, 80.0);
        assert_eq!(line.get(StatField::Rec), Some(80.0));
        assert_eq!(line.get(StatField::RecTd), None);
        assert_eq!(line.iter().filter(|(_, v)| v.is_some()).count(), 1);
    }

    #[test]
    fn test_warning_messages() {
        let warning = PipelineWarning::InsufficientPopulation {
            position: "RB".to_string(),
            players: 39,
            required: 41,
            stage: PopulationStage::Replacement,
        };
        assert_eq!(warning.to_string(), "RB has 39 players, replacement baseline needs 41");
    }
}
