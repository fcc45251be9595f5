
pub mod normalize;
mod schema;

use std::path::Path;

use log::{debug, info};

use crate::error::{AnalyzerError, Result};
use crate::types::{AnalyzerConfig, MissionRecord, MissionTable, OrbitType};
use schema::{ColumnMap, RawRow};

pub use normalize::{classify_vehicle, family_of, normalize_outcome};

/// Read a dump from disk and load its mission table
pub fn load_dump(path: &Path, config: &AnalyzerConfig) -> Result<MissionTable> {
    info!("Loading mission dump from {}", path.display());
    let text = std::fs::read_to_string(path).map_err(|e| AnalyzerError::io(path, e))?;
    parse_mission_dump(&text, config)
}

/// Load the mission table from dump text.
///
/// Every INSERT for the configured table contributes its rows in source
/// order. Any statement that fails to tokenize, lacks a required column, or
/// carries an unusable value aborts the whole load.
pub fn parse_mission_dump(text: &str, config: &AnalyzerConfig) -> Result<MissionTable> {
    let statements = parser_sql::parse_table(text, &config.table_name)?;
    if statements.is_empty() {
        return Err(AnalyzerError::Schema(format!(
            "dump contains no INSERT statements for table `{}`",
            config.table_name
        )));
    }
    debug!("Found {} INSERT statements for `{}`", statements.len(), config.table_name);

    let mut rows = Vec::new();
    for statement in &statements {
        let columns = ColumnMap::resolve(statement)?;
        for (idx, values) in statement.rows.iter().enumerate() {
            rows.push(columns.extract(statement.line, idx + 1, values));
        }
    }

    schema::fill_missing_categories(&mut rows);

    let records = rows
        .into_iter()
        .map(|row| build_record(row, config))
        .collect::<Result<Vec<_>>>()?;

    info!("Loaded {} mission records from table `{}`", records.len(), config.table_name);
    Ok(MissionTable::new(records))
}

fn build_record(row: RawRow, config: &AnalyzerConfig) -> Result<MissionRecord> {
    let RawRow { line, row: index, .. } = row;
    let missing = |column: &str| AnalyzerError::invalid_row(line, index, format!("`{}` is NULL", column));

    let name = row.name.ok_or_else(|| missing("name"))?;
    let date_value = row.launch_date.ok_or_else(|| missing("launch_date"))?;
    let (launch_date, year) = normalize::parse_launch_date(&date_value).ok_or_else(|| {
        AnalyzerError::invalid_row(line, index, format!("unrecognized launch date {}", date_value))
    })?;
    if !config.year_range.contains(year) {
        return Err(AnalyzerError::invalid_row(
            line,
            index,
            format!(
                "launch year {} outside the historical range {}..={}",
                year, config.year_range.min, config.year_range.max
            ),
        ));
    }

    // After filling, these are only missing when the whole column is NULL
    let vehicle = row.vehicle.ok_or_else(|| missing("launch_vehicle"))?;
    let orbit = row.orbit.ok_or_else(|| missing("orbit_type"))?;
    let outcome = row.outcome.ok_or_else(|| missing("outcome"))?;

    let payload_mass_kg = match &row.payload_mass {
        Some(value) => normalize::parse_payload_mass(value)
            .map_err(|message| AnalyzerError::invalid_row(line, index, message))?,
        None => None,
    };

    Ok(MissionRecord {
        family: family_of(&vehicle),
        vehicle,
        name,
        orbit: OrbitType::new(&orbit),
        launch_date,
        year,
        outcome: normalize_outcome(&outcome),
        payload_mass_kg,
        application: row.application,
        launch_site: row.launch_site,
    })
}
