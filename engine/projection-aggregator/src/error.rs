//! Error types for the aggregation pipeline

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type alias for aggregation operations
pub type Result<T> = std::result::Result<T, AggregateError>;

/// Fatal errors. Any of these aborts the run before output is written.
#[derive(Error, Debug)]
pub enum AggregateError {
    /// A required input file or directory does not exist
    #[error("Missing input: {}", path.display())]
    MissingInput { path: PathBuf },

    /// A source lacks a required identity column
    #[error("Schema mismatch in {}: missing column '{column}'", path.display())]
    SchemaMismatch { path: PathBuf, column: String },

    /// I/O errors while reading inputs or writing the artifact
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed CSV input
    #[error("CSV error in {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// Output serialization errors
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// K-Means was asked for an impossible clustering
    #[error("Clustering error: {0}")]
    Clustering(String),
}

impl AggregateError {
    pub fn missing_input(path: impl AsRef<Path>) -> Self {
        Self::MissingInput { path: path.as_ref().to_path_buf() }
    }

    pub fn schema_mismatch(path: impl AsRef<Path>, column: impl Into<String>) -> Self {
        Self::SchemaMismatch { path: path.as_ref().to_path_buf(), column: column.into() }
    }

    /// Map an I/O error, turning `NotFound` into `MissingInput`
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::NotFound {
            return Self::missing_input(path);
        }
        Self::Io { path: path.as_ref().to_path_buf(), source }
    }

    pub fn csv(path: impl AsRef<Path>, source: csv::Error) -> Self {
        Self::Csv { path: path.as_ref().to_path_buf(), source }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn clustering(msg: impl Into<String>) -> Self {
        Self::Clustering(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_becomes_missing_input() {
        let err = AggregateError::io(
            "raw/adp/FantasyPros-2025.csv",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert!(matches!(err, AggregateError::MissingInput { .. }));
        assert_eq!(err.to_string(), "Missing input: raw/adp/FantasyPros-2025.csv");
    }

    #[test]
    fn test_other_io_errors_kept() {
        let err = AggregateError::io(
            "processed",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(matches!(err, AggregateError::Io { .. }));
    }

    #[test]
    fn test_schema_mismatch_message() {
        let err = AggregateError::schema_mismatch("raw/projections/CBS-2025.csv", "Pos");
        assert_eq!(
            err.to_string(),
            "Schema mismatch in raw/projections/CBS-2025.csv: missing column 'Pos'"
        );
    }
}
