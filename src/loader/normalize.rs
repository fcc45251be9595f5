//! Cleaning rules for the categorical and date fields of a mission row.

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use parser_sql::SqlValue;
use regex::Regex;

use crate::types::{Outcome, VehicleFamily};

/// Family patterns, checked in order; the first match wins
static FAMILY_PATTERNS: Lazy<Vec<(Regex, VehicleFamily)>> = Lazy::new(|| {
    vec![
        (Regex::new(r"(?i)PSLV").expect("valid PSLV pattern"), VehicleFamily::Pslv),
        (Regex::new(r"(?i)GSLV|LVM\s*-?\s*3").expect("valid GSLV pattern"), VehicleFamily::Gslv),
        (Regex::new(r"(?i)SLV").expect("valid SLV pattern"), VehicleFamily::Slv),
    ]
});

static BARE_YEAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*(\d{4})\s*$").expect("valid year pattern"));

static MASS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*([0-9][0-9,]*(?:\.[0-9]+)?)\s*(?:kgs?)?\s*$").expect("valid mass pattern")
});

const DATE_FORMATS: [&str; 9] = [
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%d-%m-%Y",
    "%d/%m/%Y",
    "%d.%m.%Y",
    "%d %B %Y",
    "%d %b %Y",
    "%B %d, %Y",
    "%b %d, %Y",
];

const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Classify a launch vehicle name, `None` when no family pattern matches
pub fn classify_vehicle(vehicle: &str) -> Option<VehicleFamily> {
    FAMILY_PATTERNS
        .iter()
        .find(|(pattern, _)| pattern.is_match(vehicle))
        .map(|(_, family)| *family)
}

/// Family used for aggregation; unmatched vehicles fall into `Other`
pub fn family_of(vehicle: &str) -> VehicleFamily {
    classify_vehicle(vehicle).unwrap_or(VehicleFamily::Other)
}

/// Reduce a free-text outcome to success or failure.
///
/// Anything mentioning "success" counts as a success unless it says
/// "unsuccessful"; every other remark is a failure.
pub fn normalize_outcome(raw: &str) -> Outcome {
    let text = raw.trim().to_lowercase();
    if text.contains("success") && !text.contains("unsuccessful") {
        Outcome::Success
    } else {
        Outcome::Failure
    }
}

/// Parse a launch date cell into `(full date, year)`.
///
/// Integer cells and bare four-digit strings are read as a year only.
pub fn parse_launch_date(value: &SqlValue) -> Option<(Option<NaiveDate>, i32)> {
    match value {
        SqlValue::Int(year) => i32::try_from(*year).ok().map(|y| (None, y)),
        SqlValue::Str(text) => parse_date_text(text),
        _ => None,
    }
}

fn parse_date_text(text: &str) -> Option<(Option<NaiveDate>, i32)> {
    let text = text.trim();

    if let Some(caps) = BARE_YEAR.captures(text) {
        return caps[1].parse().ok().map(|y| (None, y));
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(text, format) {
            return Some((Some(date), date.year()));
        }
    }
    for format in DATETIME_FORMATS {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(text, format) {
            let date = datetime.date();
            return Some((Some(date), date.year()));
        }
    }
    None
}

/// Parse a payload mass cell in kilograms.
///
/// NULL and blank cells are unknown masses. Strings may carry thousands
/// separators and a trailing unit.
pub fn parse_payload_mass(value: &SqlValue) -> Result<Option<f64>, String> {
    let mass = match value {
        SqlValue::Null => return Ok(None),
        SqlValue::Int(_) | SqlValue::Float(_) => value.as_f64(),
        SqlValue::Str(text) if text.trim().is_empty() => return Ok(None),
        SqlValue::Str(text) => MASS
            .captures(text)
            .and_then(|caps| caps[1].replace(',', "").parse::<f64>().ok()),
        SqlValue::Bool(_) => None,
    };

    match mass {
        Some(kg) if kg.is_finite() && kg >= 0.0 => Ok(Some(kg)),
        _ => Err(format!("payload mass {} is not a non-negative number", value)),
    }
}
