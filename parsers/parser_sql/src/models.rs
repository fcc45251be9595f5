use std::fmt;

use serde::{Deserialize, Serialize};

/// A single literal from a `VALUES (...)` tuple
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SqlValue {
    Null,
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl SqlValue {
    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null)
    }

    /// Render the value as text, `None` for NULL.
    ///
    /// Numbers keep their natural formatting so that a date stored as an
    /// integer year (`2005`) reads back as `"2005"`.
    pub fn as_text(&self) -> Option<String> {
        match self {
            SqlValue::Null => None,
            SqlValue::Str(s) => Some(s.clone()),
            SqlValue::Int(i) => Some(i.to_string()),
            SqlValue::Float(f) => Some(f.to_string()),
            SqlValue::Bool(b) => Some(if *b { "1" } else { "0" }.to_string()),
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            SqlValue::Int(i) => Some(*i as f64),
            SqlValue::Float(f) => Some(*f),
            _ => None,
        }
    }
}

impl fmt::Display for SqlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlValue::Null => write!(f, "NULL"),
            SqlValue::Str(s) => write!(f, "'{}'", s.replace('\'', "''")),
            SqlValue::Int(i) => write!(f, "{}", i),
            SqlValue::Float(v) => write!(f, "{}", v),
            SqlValue::Bool(b) => write!(f, "{}", if *b { "TRUE" } else { "FALSE" }),
        }
    }
}

/// One `INSERT INTO ... VALUES ...` statement from a dump
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsertStatement {
    /// Table name, without schema qualifier or quoting
    pub table: String,
    /// Column list, `None` when the statement relies on table order
    pub columns: Option<Vec<String>>,
    /// Value tuples in source order
    pub rows: Vec<Vec<SqlValue>>,
    /// 1-based line where the statement starts
    pub line: usize,
}

impl InsertStatement {
    /// Position of a column in this statement's column list
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns
            .as_ref()?
            .iter()
            .position(|c| c.eq_ignore_ascii_case(name))
    }
}
