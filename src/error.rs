//! Error types for field map generation.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FieldMapError {
    /// An axis definition that cannot produce a non-empty, strictly increasing set of samples.
    #[error("Invalid axis: {0}")]
    InvalidAxis(String),

    /// Declared sample counts disagree with the grid (or file body) they describe.
    #[error("Shape mismatch on {what}: declared {declared}, actual {actual}")]
    ShapeMismatch {
        what: String,
        declared: usize,
        actual: usize,
    },

    #[error("Both field map axes are {0}; the two axes must differ")]
    DuplicateAxis(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Parse error on line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Plot error: {0}")]
    Plot(String),
}

impl From<tempfile::PersistError> for FieldMapError {
    fn from(err: tempfile::PersistError) -> Self {
        FieldMapError::Io(err.error)
    }
}

pub type Result<T> = std::result::Result<T, FieldMapError>;
