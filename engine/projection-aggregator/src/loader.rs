//! Source loading: raw projection tables and the ADP table.
//!
//! Every projection source becomes a [`SourceTable`] keyed by normalized
//! name. The tables are then folded into one [`ConsensusTable`] where each
//! numeric column is the mean of the values that were actually reported.

use crate::calculator::projected_points;
use crate::config::{PathsConfig, ScoringConfig};
use crate::error::{AggregateError, Result};
use crate::models::{
    rank_column_name, AdpTable, ConsensusProjection, ConsensusTable, SourceRow, SourceTable,
    StatField, StatLine,
};
use player_registry::{normalize_player_name, PlayerRegistry};
use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

const PLAYER_COLUMN: &str = "Player";
const POSITION_COLUMN: &str = "Pos";
const TEAM_COLUMN: &str = "Team";
const ADP_COLUMN: &str = "ADP";
/// Columns renamed to `<source>_Rank`, in order of preference
const RANK_COLUMNS: [&str; 2] = ["Rank", "Overall"];

/// Loads and merges one season of raw tables
pub struct SourceLoader {
    paths: PathsConfig,
    scoring: ScoringConfig,
}

/// Running mean that ignores missing values
#[derive(Debug, Clone, Copy, Default)]
struct Mean {
    sum: f64,
    count: usize,
}

impl Mean {
    fn push(&mut self, value: Option<f64>) {
        if let Some(value) = value {
            self.sum += value;
            self.count += 1;
        }
    }

    fn value(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }
}

#[derive(Debug, Default)]
struct PlayerAccumulator {
    team: Option<String>,
    position: Option<String>,
    ranks: BTreeMap<String, Mean>,
    stats: [Mean; 8],
}

impl SourceLoader {
    pub fn new(paths: PathsConfig, scoring: ScoringConfig) -> Self {
        Self { paths, scoring }
    }

    /// Find `<source>-<season>.<ext>` files, sorted by file name.
    pub fn discover_projection_files(&self, season: i32) -> Result<Vec<(String, PathBuf)>> {
        let dir = self.paths.projections_path();
        let suffix = format!("-{}.{}", season, self.paths.file_extension);

        let entries = std::fs::read_dir(&dir).map_err(|e| AggregateError::io(&dir, e))?;
        let mut files = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| AggregateError::io(&dir, e))?;
            let file_name = entry.file_name().to_string_lossy().into_owned();
            if !file_name.ends_with(&suffix) || !entry.path().is_file() {
                continue;
            }
            let source = file_name.split('-').next().unwrap_or_default().to_string();
            if source.is_empty() {
                warn!("Skipping projection file with no source name: {}", file_name);
                continue;
            }
            files.push((file_name, source, entry.path()));
        }

        files.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(files.into_iter().map(|(_, source, path)| (source, path)).collect())
    }

    /// Load every projection source for the season and build the consensus table.
    pub fn load_projections(&self, season: i32) -> Result<ConsensusTable> {
        let files = self.discover_projection_files(season)?;
        info!("Found {} projection sources for {}", files.len(), season);

        let mut registry = PlayerRegistry::new();
        let mut tables = Vec::with_capacity(files.len());
        for (source, path) in files {
            let file = File::open(&path).map_err(|e| AggregateError::io(&path, e))?;
            let table = parse_projection_source(&source, &path, file, &mut registry)?;
            info!("Loaded {} rows from {} ({})", table.rows.len(), source, path.display());
            tables.push(table);
        }

        debug!(
            "Registry resolved {} names to {} identities",
            registry.name_count(),
            registry.identity_count()
        );
        Ok(self.build_consensus(&tables, &registry))
    }

    /// Fold parsed sources into one row per player.
    pub fn build_consensus(&self, tables: &[SourceTable], registry: &PlayerRegistry) -> ConsensusTable {
        let mut players: BTreeMap<String, PlayerAccumulator> = BTreeMap::new();
        let mut rank_columns = BTreeSet::new();

        for table in tables {
            let rank_column = table.rank_column();
            for row in &table.rows {
                let acc = players.entry(row.player.clone()).or_default();
                if acc.team.is_none() {
                    acc.team = row.team.clone();
                }
                if acc.position.is_none() {
                    acc.position = row.position.clone();
                }
                if row.rank.is_some() {
                    rank_columns.insert(rank_column.clone());
                    acc.ranks.entry(rank_column.clone()).or_default().push(row.rank);
                }
                for (field, value) in row.stats.iter() {
                    acc.stats[field as usize].push(value);
                }
            }
        }

        let players: Vec<ConsensusProjection> = players
            .into_iter()
            .map(|(player, acc)| {
                let mut stats = StatLine::default();
                for field in StatField::ALL {
                    stats.set(field, acc.stats[field as usize].value());
                }
                let ranks = acc
                    .ranks
                    .into_iter()
                    .filter_map(|(column, mean)| mean.value().map(|rank| (column, rank)))
                    .collect();
                let identity_key =
                    registry.get_by_name(&player).ok().map(|identity| identity.identity_key.clone());

                ConsensusProjection {
                    projected_points: projected_points(&stats, &self.scoring),
                    identity_key,
                    team: acc.team,
                    position: acc.position,
                    player,
                    ranks,
                    stats,
                }
            })
            .collect();

        debug!("Consensus built for {} players from {} sources", players.len(), tables.len());

        ConsensusTable {
            players,
            sources: tables.iter().map(|t| t.source.clone()).collect(),
            rank_columns: rank_columns.into_iter().collect(),
            collisions: registry.collisions(),
        }
    }

    /// Load the season's single ADP table.
    pub fn load_adp(&self, season: i32) -> Result<AdpTable> {
        let path = self.paths.adp_file(season);
        let file = File::open(&path).map_err(|e| AggregateError::io(&path, e))?;
        let table = parse_adp(&path, file)?;
        info!("Loaded {} ADP entries from {}", table.len(), path.display());
        Ok(table)
    }
}

/// Parse a numeric cell; blanks, text and non-finite values are missing.
fn parse_cell(raw: Option<&str>) -> Option<f64> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }
    raw.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn text_cell(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim).filter(|s| !s.is_empty()).map(str::to_string)
}

fn column_index(headers: &csv::StringRecord, name: &str) -> Option<usize> {
    headers.iter().position(|h| h.trim() == name)
}

fn require_column(headers: &csv::StringRecord, name: &str, path: &Path) -> Result<usize> {
    column_index(headers, name).ok_or_else(|| AggregateError::schema_mismatch(path, name))
}

/// Parse one projection source. `path` is only used for error messages.
pub fn parse_projection_source<R: Read>(
    source: &str,
    path: &Path,
    rdr: R,
    registry: &mut PlayerRegistry,
) -> Result<SourceTable> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(rdr);
    let headers = reader.headers().map_err(|e| AggregateError::csv(path, e))?.clone();

    let player_idx = require_column(&headers, PLAYER_COLUMN, path)?;
    let position_idx = require_column(&headers, POSITION_COLUMN, path)?;
    let team_idx = column_index(&headers, TEAM_COLUMN);
    let rank_idx = RANK_COLUMNS.iter().find_map(|name| column_index(&headers, name));
    let stat_idx: Vec<(StatField, usize)> = headers
        .iter()
        .enumerate()
        .filter_map(|(idx, header)| StatField::from_column(header.trim()).map(|f| (f, idx)))
        .collect();

    if stat_idx.is_empty() {
        warn!("{} has no stat columns, its players contribute zero points", source);
    }
    if rank_idx.is_some() {
        debug!("{} rank column renamed to {}", source, rank_column_name(source));
    }

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                warn!("Skipping malformed row in {}: {}", path.display(), e);
                continue;
            }
        };

        let raw_name = record.get(player_idx).unwrap_or_default();
        let position = text_cell(record.get(position_idx));
        let team = team_idx.and_then(|idx| text_cell(record.get(idx)));

        let player = match registry.register(raw_name, position.as_deref().unwrap_or(""), team.as_deref()) {
            Ok(player) => player,
            Err(e) => {
                debug!("Skipping row in {}: {}", path.display(), e);
                continue;
            }
        };

        let mut stats = StatLine::default();
        for (field, idx) in &stat_idx {
            if let Some(value) = parse_cell(record.get(*idx)) {
                stats.set(*field, Some(value));
            }
        }

        rows.push(SourceRow {
            player,
            position: position.map(|p| player_registry::normalize_position(&p)),
            team,
            rank: rank_idx.and_then(|idx| parse_cell(record.get(idx))),
            stats,
        });
    }

    Ok(SourceTable { source: source.to_string(), path: path.to_path_buf(), rows })
}

/// Parse an ADP table into `{player -> adp}`. The first row for a name wins.
pub fn parse_adp<R: Read>(path: &Path, rdr: R) -> Result<AdpTable> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(rdr);
    let headers = reader.headers().map_err(|e| AggregateError::csv(path, e))?.clone();

    let player_idx = require_column(&headers, PLAYER_COLUMN, path)?;
    let adp_idx = require_column(&headers, ADP_COLUMN, path)?;

    let mut table = AdpTable::default();
    for result in reader.records() {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                warn!("Skipping malformed ADP row in {}: {}", path.display(), e);
                continue;
            }
        };

        let player = normalize_player_name(record.get(player_idx).unwrap_or_default());
        if player.is_empty() {
            continue;
        }
        let Some(adp) = parse_cell(record.get(adp_idx)) else {
            debug!("No usable ADP for '{}'", player);
            continue;
        };

        if table.entries.contains_key(&player) {
            table.duplicates.push(player);
            continue;
        }
        table.entries.insert(player, adp);
    }

    Ok(table)
}
