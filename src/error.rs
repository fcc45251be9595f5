use std::path::PathBuf;

use parser_sql::SqlParseError;
use serde::Serialize;
use thiserror::Error;

/// Errors reported by the loader, the aggregate views and the predictor
#[derive(Debug, Error)]
pub enum AnalyzerError {
    /// The dump could not be tokenized
    #[error("failed to parse dump: {0}")]
    Parse(#[from] SqlParseError),

    /// The dump does not carry the columns a mission record needs
    #[error("schema mismatch: {0}")]
    Schema(String),

    /// A row was tokenized but one of its values is unusable
    #[error("invalid row {row} (statement at line {line}): {message}")]
    InvalidRow {
        line: usize,
        row: usize,
        message: String,
    },

    /// A category the classifier was never trained on
    #[error("unknown {field} `{value}`: not in the training vocabulary")]
    UnknownCategory { field: &'static str, value: String },

    /// An aggregate view that does not exist
    #[error("no aggregate view named `{0}`")]
    NotFound(String),

    /// The model artifact is malformed or inconsistent
    #[error("invalid model artifact: {0}")]
    Model(String),

    /// No model artifact was configured
    #[error("no model loaded; prediction is unavailable")]
    ModelUnavailable,

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, AnalyzerError>;

impl AnalyzerError {
    /// Stable, machine-readable error kind
    pub fn kind(&self) -> &'static str {
        match self {
            AnalyzerError::Parse(_) | AnalyzerError::Schema(_) | AnalyzerError::InvalidRow { .. } => {
                "parse_error"
            }
            AnalyzerError::UnknownCategory { .. } => "unknown_category",
            AnalyzerError::NotFound(_) => "not_found",
            AnalyzerError::Model(_) => "model_error",
            AnalyzerError::ModelUnavailable => "model_unavailable",
            AnalyzerError::Io { .. } => "io_error",
            AnalyzerError::Config(_) => "config_error",
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        AnalyzerError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn invalid_row(line: usize, row: usize, message: impl Into<String>) -> Self {
        AnalyzerError::InvalidRow {
            line,
            row,
            message: message.into(),
        }
    }
}

/// Serializable form of an error for the presentation layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorReport {
    pub kind: &'static str,
    pub message: String,
}

impl From<&AnalyzerError> for ErrorReport {
    fn from(err: &AnalyzerError) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}
