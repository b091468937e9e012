use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the replay environment
#[derive(Error, Debug)]
pub enum BourseError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // Snapshot ingestion errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Missing column `{column}` in {}", .file.display())]
    MissingColumn { file: PathBuf, column: &'static str },

    #[error("Unparsable depth encoding in {} at time {time}: {reason}", .file.display())]
    BadDepth {
        file: PathBuf,
        time: i64,
        reason: String,
    },

    #[error("Empty {side} depth in {} at time {time}", .file.display())]
    EmptyDepth {
        file: PathBuf,
        time: i64,
        side: &'static str,
    },

    #[error("No snapshots found: {0}")]
    EmptyStore(String),

    // Episode usage errors
    #[error("Episode already ended; call reset() before stepping again")]
    EpisodeEnded,
}

/// Result type alias for BourseError
pub type Result<T> = std::result::Result<T, BourseError>;
