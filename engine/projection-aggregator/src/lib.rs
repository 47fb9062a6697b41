//! # Projection Aggregator
//!
//! Builds one season's draft board from per-source fantasy projections.
//!
//! Each raw source is loaded and averaged into a consensus projection, joined
//! with average draft position, scored as value over a replacement-level
//! player, given a volatility score from how much the sources disagree on
//! rank, and clustered into per-position tiers with a seeded K-Means. The
//! result is written as `Projections-<season>.json`.

pub mod calculator;
pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod kmeans;
pub mod loader;
pub mod logging;
pub mod merger;
pub mod models;
pub mod output;
pub mod tiers;
pub mod volatility;

// Re-export main types for easy usage
pub use config::AggregatorConfig;
pub use engine::{AggregationEngine, PipelineReport, SeasonRanking};
pub use error::{AggregateError, Result};
pub use loader::SourceLoader;
pub use logging::initialize_logging;
pub use merger::Merger;
pub use models::{PipelineWarning, PlayerRecord};
