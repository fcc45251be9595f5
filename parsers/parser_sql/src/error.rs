use thiserror::Error;

/// Errors raised while tokenizing a dump
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SqlParseError {
    #[error("syntax error at line {line}: {message}")]
    Syntax { line: usize, message: String },

    #[error("unterminated string literal starting at line {line}")]
    UnterminatedString { line: usize },

    #[error("INSERT into `{table}` at line {line}: row {row} has {found} values, expected {expected}")]
    ColumnCountMismatch {
        table: String,
        line: usize,
        row: usize,
        expected: usize,
        found: usize,
    },
}

impl SqlParseError {
    /// Line of the statement that failed
    pub fn line(&self) -> usize {
        match self {
            SqlParseError::Syntax { line, .. }
            | SqlParseError::UnterminatedString { line }
            | SqlParseError::ColumnCountMismatch { line, .. } => *line,
        }
    }
}
