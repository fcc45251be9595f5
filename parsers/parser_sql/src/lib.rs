//! Tokenizer for SQL dump files.
//!
//! Pulls every `INSERT ... VALUES` statement out of a textual dump (as
//! produced by `mysqldump`, `sqlite3 .dump` or hand-written seed files) and
//! returns the literal rows. Every other statement is skipped. Nothing is
//! executed and no schema is interpreted; mapping columns onto typed records
//! is left to the caller.

mod error;
mod models;
mod parser;

pub use error::SqlParseError;
pub use models::{InsertStatement, SqlValue};

use log::{debug, trace};

/// Maps suffixes of the dump to 1-based line numbers.
///
/// Remembers the last position asked for, so a forward walk over the dump
/// counts each newline once.
struct LineCounter<'a> {
    input: &'a str,
    offset: usize,
    line: usize,
}

impl<'a> LineCounter<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, offset: 0, line: 1 }
    }

    /// Line on which `rest`, a suffix of the input, starts
    fn line_of(&mut self, rest: &str) -> usize {
        let offset = self.input.len().saturating_sub(rest.len());
        if offset < self.offset {
            self.offset = 0;
            self.line = 1;
        }
        self.line += self.input.as_bytes()[self.offset..offset]
            .iter()
            .filter(|b| **b == b'\n')
            .count();
        self.offset = offset;
        self.line
    }
}

fn skip_ws(input: &str) -> &str {
    match parser::ws(input) {
        Ok((rest, _)) => rest,
        Err(_) => input,
    }
}

fn starts_with_keyword(input: &str, kw: &'static str) -> bool {
    parser::keyword(kw)(input).is_ok()
}

/// Skip to just past the next `;` that is not inside a literal or comment
fn skip_statement(input: &str, line: usize) -> Result<&str, SqlParseError> {
    let bytes = input.as_bytes();
    let mut quote: Option<u8> = None;
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];
        match quote {
            Some(q) => {
                if b == b'\\' {
                    i += 1;
                } else if b == q {
                    quote = None;
                }
            }
            None => match b {
                b'\'' | b'"' | b'`' => quote = Some(b),
                b';' => return Ok(&input[i + 1..]),
                b'-' if bytes.get(i + 1) == Some(&b'-') => {
                    i = input[i..].find('\n').map_or(bytes.len(), |n| i + n);
                }
                b'#' => {
                    i = input[i..].find('\n').map_or(bytes.len(), |n| i + n);
                }
                b'/' if bytes.get(i + 1) == Some(&b'*') => {
                    i = input[i + 2..].find("*/").map_or(bytes.len(), |n| i + 2 + n + 1);
                }
                _ => {}
            },
        }
        i += 1;
    }

    if quote.is_some() {
        return Err(SqlParseError::UnterminatedString { line });
    }
    Ok("")
}

fn syntax_error(lines: &mut LineCounter, err: nom::Err<nom::error::Error<&str>>, fallback_line: usize) -> SqlParseError {
    match err {
        nom::Err::Incomplete(_) => SqlParseError::Syntax {
            line: fallback_line,
            message: "unexpected end of input".to_string(),
        },
        nom::Err::Error(e) | nom::Err::Failure(e) => {
            if e.code == nom::error::ErrorKind::Escaped {
                return SqlParseError::UnterminatedString { line: lines.line_of(e.input) };
            }
            let near: String = e.input.chars().take(32).collect();
            SqlParseError::Syntax {
                line: lines.line_of(e.input),
                message: format!("expected {:?} near `{}`", e.code, near.trim_end()),
            }
        }
    }
}

/// Parse one INSERT statement starting at `rest`, returning the input after its terminator
fn parse_insert<'a>(
    lines: &mut LineCounter,
    rest: &'a str,
) -> Result<(&'a str, InsertStatement), SqlParseError> {
    let line = lines.line_of(rest);
    let (after, (table, columns, rows)) =
        parser::insert_statement(rest).map_err(|e| syntax_error(lines, e, line))?;

    // Only a terminator or an ON DUPLICATE KEY clause may follow the tuples
    let after = skip_ws(after);
    let after = if let Some(stripped) = after.strip_prefix(';') {
        stripped
    } else if after.is_empty() {
        after
    } else if starts_with_keyword(after, "ON") {
        skip_statement(after, line)?
    } else {
        let near: String = after.chars().take(32).collect();
        return Err(SqlParseError::Syntax {
            line: lines.line_of(after),
            message: format!("unexpected input after VALUES near `{}`", near.trim_end()),
        });
    };

    let expected = match &columns {
        Some(columns) => columns.len(),
        None => rows.first().map_or(0, Vec::len),
    };
    for (idx, values) in rows.iter().enumerate() {
        if values.len() != expected {
            return Err(SqlParseError::ColumnCountMismatch {
                table,
                line,
                row: idx + 1,
                expected,
                found: values.len(),
            });
        }
    }

    trace!("INSERT into {} at line {} with {} rows", table, line, rows.len());
    Ok((after, InsertStatement { table, columns, rows, line }))
}

/// Parse a dump and return its INSERT statements in source order.
///
/// Fails on the first statement that cannot be tokenized, or whose tuples do
/// not match its column list. Partial results are never returned.
pub fn parse_dump(input: &str) -> Result<Vec<InsertStatement>, SqlParseError> {
    let mut statements = Vec::new();
    let mut skipped = 0usize;
    let mut lines = LineCounter::new(input);
    let mut rest = input;

    loop {
        rest = skip_ws(rest);
        if rest.is_empty() {
            break;
        }
        if let Some(stripped) = rest.strip_prefix(';') {
            rest = stripped;
            continue;
        }

        if starts_with_keyword(rest, "INSERT") {
            let (after, statement) = parse_insert(&mut lines, rest)?;
            statements.push(statement);
            rest = after;
        } else {
            let line = lines.line_of(rest);
            rest = skip_statement(rest, line)?;
            skipped += 1;
        }
    }

    debug!(
        "Parsed {} INSERT statements ({} other statements skipped)",
        statements.len(),
        skipped
    );
    Ok(statements)
}

/// Parse a dump and keep only the INSERT statements targeting `table`
pub fn parse_table(input: &str, table: &str) -> Result<Vec<InsertStatement>, SqlParseError> {
    Ok(parse_dump(input)?
        .into_iter()
        .filter(|s| s.table.eq_ignore_ascii_case(table))
        .collect())
}
