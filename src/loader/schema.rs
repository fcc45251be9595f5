use std::cmp::Reverse;
use std::collections::HashMap;

use log::{debug, warn};
use parser_sql::{InsertStatement, SqlValue};

use crate::error::{AnalyzerError, Result};

/// Fields of a mission record and the column names they may appear under
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Field {
    Name,
    LaunchDate,
    Vehicle,
    Orbit,
    Outcome,
    PayloadMass,
    Application,
    LaunchSite,
}

impl Field {
    pub const ALL: [Field; 8] = [
        Field::Name,
        Field::LaunchDate,
        Field::Vehicle,
        Field::Orbit,
        Field::Outcome,
        Field::PayloadMass,
        Field::Application,
        Field::LaunchSite,
    ];

    /// Accepted column names; the first one is canonical
    pub fn aliases(self) -> &'static [&'static str] {
        match self {
            Field::Name => &["name", "mission_name", "mission"],
            Field::LaunchDate => &["launch_date", "date", "launch_year", "year"],
            Field::Vehicle => &["launch_vehicle", "vehicle"],
            Field::Orbit => &["orbit_type", "orbit"],
            Field::Outcome => &["outcome", "status", "remarks"],
            Field::PayloadMass => &["payload_mass", "payload_mass_kg", "payload_kg", "mass"],
            Field::Application => &["application"],
            Field::LaunchSite => &["launch_site", "site"],
        }
    }

    pub fn required(self) -> bool {
        matches!(
            self,
            Field::Name | Field::LaunchDate | Field::Vehicle | Field::Orbit | Field::Outcome
        )
    }

    pub fn column_name(self) -> &'static str {
        self.aliases()[0]
    }
}

/// Column positions of each field inside one INSERT statement
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ColumnMap {
    positions: [Option<usize>; 8],
}

impl ColumnMap {
    /// Resolve field positions from the statement's column list, by name
    pub fn resolve(statement: &InsertStatement) -> Result<Self> {
        if statement.columns.is_none() {
            return Err(AnalyzerError::Schema(format!(
                "INSERT into `{}` at line {} has no column list; columns are mapped by name",
                statement.table, statement.line
            )));
        }

        let mut positions = [None; 8];
        for (slot, field) in positions.iter_mut().zip(Field::ALL) {
            *slot = field
                .aliases()
                .iter()
                .find_map(|alias| statement.column_index(alias));

            if slot.is_none() && field.required() {
                return Err(AnalyzerError::Schema(format!(
                    "INSERT into `{}` at line {} is missing required column `{}`",
                    statement.table,
                    statement.line,
                    field.column_name()
                )));
            }
        }

        debug!("Column map for statement at line {}: {:?}", statement.line, positions);
        Ok(Self { positions })
    }

    fn value<'a>(&self, values: &'a [SqlValue], field: Field) -> Option<&'a SqlValue> {
        let position = self.positions[field as usize]?;
        values.get(position).filter(|v| !v.is_null())
    }

    /// Trimmed text of a non-NULL cell. A blank string is a value of its own.
    fn text(&self, values: &[SqlValue], field: Field) -> Option<String> {
        self.value(values, field)
            .and_then(SqlValue::as_text)
            .map(|s| s.trim().to_string())
    }

    /// Pull the raw field values of one tuple
    pub fn extract(&self, line: usize, row: usize, values: &[SqlValue]) -> RawRow {
        RawRow {
            line,
            row,
            name: self.text(values, Field::Name),
            launch_date: self.value(values, Field::LaunchDate).cloned(),
            vehicle: self.text(values, Field::Vehicle),
            orbit: self.text(values, Field::Orbit),
            outcome: self.text(values, Field::Outcome),
            payload_mass: self.value(values, Field::PayloadMass).cloned(),
            application: self.text(values, Field::Application),
            launch_site: self.text(values, Field::LaunchSite),
        }
    }
}

/// A tuple with its values picked out but not yet validated
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RawRow {
    /// Line of the statement the tuple belongs to
    pub line: usize,
    /// 1-based position of the tuple inside its statement
    pub row: usize,
    pub name: Option<String>,
    pub launch_date: Option<SqlValue>,
    pub vehicle: Option<String>,
    pub orbit: Option<String>,
    pub outcome: Option<String>,
    pub payload_mass: Option<SqlValue>,
    pub application: Option<String>,
    pub launch_site: Option<String>,
}

/// Most frequent value; ties go to the lexicographically smallest
fn mode<'a>(values: impl Iterator<Item = &'a String>) -> Option<String> {
    let mut counts: HashMap<&String, usize> = HashMap::new();
    for value in values {
        *counts.entry(value).or_default() += 1;
    }
    counts
        .into_iter()
        .max_by_key(|(value, count)| (*count, Reverse(*value)))
        .map(|(value, _)| value.clone())
}

fn fill_column(rows: &mut [RawRow], field: Field, get: fn(&mut RawRow) -> &mut Option<String>) {
    let mut present = Vec::new();
    let mut missing = 0usize;
    for row in rows.iter_mut() {
        match get(row) {
            Some(value) => present.push(value.clone()),
            None => missing += 1,
        }
    }
    if missing == 0 {
        return;
    }

    match mode(present.iter()) {
        Some(fill) => {
            warn!(
                "Filling {} NULL `{}` values with most common value `{}`",
                missing,
                field.column_name(),
                fill
            );
            for row in rows.iter_mut() {
                let slot = get(row);
                if slot.is_none() {
                    *slot = Some(fill.clone());
                }
            }
        }
        None => debug!("Column `{}` has no values to fill from", field.column_name()),
    }
}

/// Fill NULL categorical cells with the column mode
pub(crate) fn fill_missing_categories(rows: &mut [RawRow]) {
    fill_column(rows, Field::Vehicle, |r| &mut r.vehicle);
    fill_column(rows, Field::Orbit, |r| &mut r.orbit);
    fill_column(rows, Field::Outcome, |r| &mut r.outcome);
    fill_column(rows, Field::Application, |r| &mut r.application);
    fill_column(rows, Field::LaunchSite, |r| &mut r.launch_site);
}
