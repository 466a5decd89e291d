//! Error types for kg-walker
//!
//! This module defines the error hierarchy that covers:
//! - Triple ingestion and store readiness
//! - Entity selection (allow-lists, continuation directories)
//! - Walk file output
//! - Configuration and CLI errors
//! - Worker thread errors
//!
//! Library code returns [`Result`]; per-entity sampling anomalies never
//! surface as errors and are reported through [`SampleOutcome`] instead.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for the kg-walker application
#[derive(Error, Debug)]
pub enum WalkerError {
    /// Triple store / ingestion errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Entity selection errors
    #[error("Selector error: {0}")]
    Selector(#[from] SelectorError),

    /// Walk output errors
    #[error("Output error: {0}")]
    Output(#[from] OutputError),

    /// Worker/concurrency errors
    #[error("Worker error: {0}")]
    Worker(#[from] WorkerError),

    /// I/O errors (file operations, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The triple source is missing, unreadable or empty
    #[error("Triple source not initialized: {0}")]
    NotInitialized(String),
}

/// Triple ingestion errors
#[derive(Error, Debug)]
pub enum StoreError {
    /// Graph file or directory does not exist
    #[error("Graph path not found: '{path}'")]
    NotFound { path: PathBuf },

    /// Graph file could not be opened or read
    #[error("Failed to read graph file '{path}': {reason}")]
    ReadFailed { path: PathBuf, reason: String },

    /// A loader thread died before delivering its triples
    #[error("Loader thread for '{path}' panicked")]
    LoaderPanicked { path: PathBuf },
}

/// Entity selection errors
#[derive(Error, Debug)]
pub enum SelectorError {
    /// Entity allow-list could not be read
    #[error("Failed to read entity file '{path}': {reason}")]
    EntityFile { path: PathBuf, reason: String },
}

/// Walk file output errors
#[derive(Error, Debug)]
pub enum OutputError {
    /// Walk directory could not be created
    #[error("Failed to create walk directory '{path}': {reason}")]
    CreateDir { path: PathBuf, reason: String },

    /// Walk segment could not be opened
    #[error("Failed to open walk file '{path}': {reason}")]
    OpenFailed { path: PathBuf, reason: String },

    /// Writer channel closed unexpectedly
    #[error("Walk writer channel closed unexpectedly")]
    ChannelClosed,

    /// Writer thread panicked
    #[error("Walk writer thread panicked")]
    WriterPanicked,
}

/// Configuration and CLI errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Invalid worker count
    #[error("Invalid thread count {count}: must be between 1 and {max}")]
    InvalidThreadCount { count: usize, max: usize },

    /// Invalid number of walks per entity
    #[error("Invalid number of walks {count}: must be at least 1")]
    InvalidWalkCount { count: usize },

    /// Invalid depth
    #[error("Invalid depth {depth}: must be at least 1")]
    InvalidDepth { depth: usize },

    /// Invalid text walk length
    #[error("Invalid text walk length {length}: must be greater than 2")]
    InvalidTextWalkLength { length: usize },

    /// Invalid rotation threshold
    #[error("Invalid rotation threshold {lines}: must be at least 1")]
    InvalidRotation { lines: usize },

    /// Unknown walk generation mode
    #[error("Unknown walk generation mode '{name}' (expected one of: {options})")]
    UnknownMode { name: String, options: String },

    /// Input path error
    #[error("Invalid input path '{path}': {reason}")]
    InvalidInputPath { path: PathBuf, reason: String },

    /// Output path error
    #[error("Invalid output path '{path}': {reason}")]
    InvalidOutputPath { path: PathBuf, reason: String },
}

/// Worker thread errors
#[derive(Error, Debug)]
pub enum WorkerError {
    /// Worker panicked outside of an entity task
    #[error("Worker {id} panicked: {message}")]
    Panicked { id: usize, message: String },

    /// Worker could not be spawned
    #[error("Failed to spawn worker {id}: {reason}")]
    SpawnFailed { id: usize, reason: String },

    /// Entity queue send failed
    #[error("Failed to submit entity: queue closed")]
    QueueSendFailed,
}

/// Result type alias for WalkerError
pub type Result<T> = std::result::Result<T, WalkerError>;

/// Result type alias for StoreError
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Result type alias for OutputError
pub type OutputResult<T> = std::result::Result<T, OutputError>;

/// Outcome of sampling walks for a single entity
#[derive(Debug)]
pub enum SampleOutcome {
    /// Walks were produced (possibly none)
    Success { entity: String, walks: usize },

    /// Entity was skipped, e.g. it has no neighbours
    Skipped { entity: String, reason: String },

    /// Sampling raised an unexpected condition
    Failed { entity: String, error: String },
}

impl SampleOutcome {
    /// Returns true if this outcome represents success
    pub fn is_success(&self) -> bool {
        matches!(self, SampleOutcome::Success { .. })
    }

    /// Returns the entity associated with this outcome
    pub fn entity(&self) -> &str {
        match self {
            SampleOutcome::Success { entity, .. } => entity,
            SampleOutcome::Skipped { entity, .. } => entity,
            SampleOutcome::Failed { entity, .. } => entity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion() {
        let err = ConfigError::InvalidDepth { depth: 0 };
        let walker_err: WalkerError = err.into();
        assert!(matches!(walker_err, WalkerError::Config(_)));

        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let walker_err: WalkerError = io.into();
        assert!(matches!(walker_err, WalkerError::Io(_)));
    }

    #[test]
    fn test_error_messages() {
        let err = ConfigError::InvalidThreadCount { count: 0, max: 512 };
        assert_eq!(
            err.to_string(),
            "Invalid thread count 0: must be between 1 and 512"
        );

        let err = WalkerError::NotInitialized("no triples".into());
        assert!(err.to_string().contains("no triples"));
    }

    #[test]
    fn test_sample_outcome() {
        let ok = SampleOutcome::Success {
            entity: "A".into(),
            walks: 3,
        };
        assert!(ok.is_success());
        assert_eq!(ok.entity(), "A");

        let failed = SampleOutcome::Failed {
            entity: "B".into(),
            error: "boom".into(),
        };
        assert!(!failed.is_success());
        assert_eq!(failed.entity(), "B");
    }
}
