use nom::{
    branch::alt,
    bytes::complete::{tag, tag_no_case, take_until, take_while, take_while1},
    character::complete::{char, digit0, digit1, multispace1, one_of, satisfy},
    combinator::{map, not, opt, recognize, value},
    error::{Error, ErrorKind},
    multi::{many0, separated_list0, separated_list1},
    sequence::{delimited, pair, terminated, tuple},
    IResult,
};

use crate::models::SqlValue;

/// Raw pieces of an INSERT statement before column validation
pub(crate) type InsertParts = (String, Option<Vec<String>>, Vec<Vec<SqlValue>>);

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

/// Parses whitespace and comments (`-- `, `#`, `/* */`)
pub(crate) fn ws(input: &str) -> IResult<&str, ()> {
    value(
        (),
        many0(alt((
            value((), multispace1),
            value((), pair(tag("--"), take_while(|c: char| c != '\n'))),
            value((), pair(char('#'), take_while(|c: char| c != '\n'))),
            value((), tuple((tag("/*"), take_until("*/"), tag("*/")))),
        ))),
    )(input)
}

/// Case-insensitive keyword that must not run into an identifier
pub(crate) fn keyword<'a>(kw: &'static str) -> impl FnMut(&'a str) -> IResult<&'a str, &'a str> {
    terminated(tag_no_case(kw), not(satisfy(is_ident_char)))
}

fn separator(input: &str) -> IResult<&str, char> {
    delimited(ws, char(','), ws)(input)
}

/// Parses one identifier segment: bare, `back-ticked`, "double-quoted" or [bracketed]
fn identifier_part(input: &str) -> IResult<&str, String> {
    alt((
        map(delimited(char('`'), take_while1(|c: char| c != '`'), char('`')), String::from),
        map(delimited(char('"'), take_while1(|c: char| c != '"'), char('"')), String::from),
        map(delimited(char('['), take_while1(|c: char| c != ']'), char(']')), String::from),
        map(take_while1(is_ident_char), String::from),
    ))(input)
}

/// Parses a possibly schema-qualified identifier and keeps the last segment
pub(crate) fn identifier(input: &str) -> IResult<&str, String> {
    map(separated_list1(char('.'), identifier_part), |mut parts| {
        parts.pop().unwrap_or_default()
    })(input)
}

fn column_list(input: &str) -> IResult<&str, Vec<String>> {
    delimited(
        pair(char('('), ws),
        separated_list1(separator, identifier),
        pair(ws, char(')')),
    )(input)
}

/// Parses a quoted string literal.
///
/// Handles both the SQL-standard doubled quote (`'it''s'`) and MySQL
/// backslash escapes (`'it\'s'`). An unterminated literal is a hard failure
/// so the caller does not try alternatives on the remaining input.
pub(crate) fn quoted_string(input: &str) -> IResult<&str, String> {
    let (rest, quote) = one_of("'\"")(input)?;
    let mut out = String::new();
    let mut chars = rest.char_indices().peekable();

    while let Some((idx, ch)) = chars.next() {
        if ch == quote {
            if let Some(&(_, next)) = chars.peek() {
                if next == quote {
                    out.push(quote);
                    chars.next();
                    continue;
                }
            }
            return Ok((&rest[idx + ch.len_utf8()..], out));
        }
        if ch == '\\' {
            match chars.next() {
                Some((_, escaped)) => out.push(match escaped {
                    'n' => '\n',
                    'r' => '\r',
                    't' => '\t',
                    '0' => '\0',
                    'Z' => '\u{1a}',
                    other => other,
                }),
                None => break,
            }
            continue;
        }
        out.push(ch);
    }

    Err(nom::Err::Failure(Error::new(input, ErrorKind::Escaped)))
}

/// Parses an integer or decimal literal
fn number(input: &str) -> IResult<&str, SqlValue> {
    let (rest, text) = recognize(tuple((
        opt(one_of("+-")),
        alt((
            recognize(pair(digit1, opt(pair(char('.'), digit0)))),
            recognize(pair(char('.'), digit1)),
        )),
        opt(tuple((one_of("eE"), opt(one_of("+-")), digit1))),
    )))(input)?;

    let is_float = text.contains(['.', 'e', 'E']);
    if !is_float {
        if let Ok(int) = text.parse::<i64>() {
            return Ok((rest, SqlValue::Int(int)));
        }
    }
    let float = text
        .parse::<f64>()
        .map_err(|_| nom::Err::Error(Error::new(input, ErrorKind::Float)))?;
    Ok((rest, SqlValue::Float(float)))
}

/// Parses a single value inside a tuple
pub(crate) fn sql_value(input: &str) -> IResult<&str, SqlValue> {
    alt((
        value(SqlValue::Null, keyword("NULL")),
        value(SqlValue::Bool(true), keyword("TRUE")),
        value(SqlValue::Bool(false), keyword("FALSE")),
        map(quoted_string, SqlValue::Str),
        number,
    ))(input)
}

/// Parses one `( value, value, ... )` tuple
pub(crate) fn row(input: &str) -> IResult<&str, Vec<SqlValue>> {
    delimited(
        pair(char('('), ws),
        separated_list0(separator, sql_value),
        pair(ws, char(')')),
    )(input)
}

/// Parses `INSERT [modifier] [INTO] table [(cols)] VALUES (...), (...)`
///
/// Stops after the last tuple; the caller deals with the terminator.
pub(crate) fn insert_statement(input: &str) -> IResult<&str, InsertParts> {
    let (input, _) = keyword("INSERT")(input)?;
    let (input, _) = ws(input)?;
    let (input, _) = opt(terminated(
        alt((
            keyword("IGNORE"),
            keyword("LOW_PRIORITY"),
            keyword("DELAYED"),
            keyword("HIGH_PRIORITY"),
        )),
        ws,
    ))(input)?;
    let (input, _) = opt(terminated(keyword("INTO"), ws))(input)?;
    let (input, table) = identifier(input)?;
    let (input, _) = ws(input)?;
    let (input, columns) = opt(terminated(column_list, ws))(input)?;
    let (input, _) = alt((keyword("VALUES"), keyword("VALUE")))(input)?;
    let (input, _) = ws(input)?;
    let (input, rows) = separated_list1(separator, row)(input)?;

    Ok((input, (table, columns, rows)))
}
