//! Error types for Mirra

use thiserror::Error;

/// Core Mirra errors
#[derive(Error, Debug)]
pub enum MirraError {
    // Per-frame degenerate input. Scorers recover from this locally.
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    // Offline comparison errors
    #[error("No overlapping time window: [{start}, {end}]")]
    EmptyOverlap { start: f64, end: f64 },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    // Corpus errors
    #[error("Missing source: {0}")]
    MissingSource(String),

    #[error("Malformed record at line {line}: {reason}")]
    MalformedRecord { line: usize, reason: String },

    // Session errors
    #[error("Session not started")]
    SessionNotStarted,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for Mirra operations
pub type MirraResult<T> = Result<T, MirraError>;
