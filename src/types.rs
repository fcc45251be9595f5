use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::NaiveDate;
use log::info;
use serde::{Deserialize, Serialize};

use crate::error::{AnalyzerError, Result};

/// Default table holding the mission records inside the dump
pub const DEFAULT_TABLE_NAME: &str = "isro_space_missions";

/// Launch outcome, reduced to exactly two values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Success,
    Failure,
}

impl Outcome {
    pub fn is_success(self) -> bool {
        self == Outcome::Success
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Success => write!(f, "success"),
            Outcome::Failure => write!(f, "failure"),
        }
    }
}

/// Grouping of launch vehicles used as an aggregation and feature key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum VehicleFamily {
    /// Polar Satellite Launch Vehicle
    #[serde(rename = "PSLV")]
    Pslv,
    /// Geosynchronous launchers, GSLV Mk III / LVM3 included
    #[serde(rename = "GSLV")]
    Gslv,
    /// SLV-3, ASLV and SSLV
    #[serde(rename = "SLV")]
    Slv,
    /// Foreign or experimental launchers
    #[serde(rename = "Other")]
    Other,
}

impl VehicleFamily {
    pub const ALL: [VehicleFamily; 4] = [
        VehicleFamily::Pslv,
        VehicleFamily::Gslv,
        VehicleFamily::Slv,
        VehicleFamily::Other,
    ];

    pub fn label(self) -> &'static str {
        match self {
            VehicleFamily::Pslv => "PSLV",
            VehicleFamily::Gslv => "GSLV",
            VehicleFamily::Slv => "SLV",
            VehicleFamily::Other => "Other",
        }
    }

    /// Match a family label exactly, ignoring case
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        Self::ALL
            .into_iter()
            .find(|family| family.label().eq_ignore_ascii_case(label))
    }
}

impl fmt::Display for VehicleFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for VehicleFamily {
    type Err = AnalyzerError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_label(s).ok_or_else(|| AnalyzerError::UnknownCategory {
            field: "vehicle family",
            value: s.to_string(),
        })
    }
}

/// Orbit type with whitespace normalized
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrbitType(String);

impl OrbitType {
    pub fn new(raw: &str) -> Self {
        Self(raw.split_whitespace().collect::<Vec<_>>().join(" "))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for OrbitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One row of the mission table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MissionRecord {
    /// Mission or payload name
    pub name: String,
    /// Launch vehicle as written in the dump (e.g. `PSLV-C37`)
    pub vehicle: String,
    /// Family derived from `vehicle`
    pub family: VehicleFamily,
    pub orbit: OrbitType,
    /// Full launch date, when the dump carries more than a year
    pub launch_date: Option<NaiveDate>,
    pub year: i32,
    pub outcome: Outcome,
    /// Payload mass in kilograms, when known
    pub payload_mass_kg: Option<f64>,
    pub application: Option<String>,
    pub launch_site: Option<String>,
}

impl MissionRecord {
    /// Decade bucket, `floor(year / 10) * 10`
    pub fn decade(&self) -> i32 {
        self.year.div_euclid(10) * 10
    }

    /// Minimal record for unit tests
    #[cfg(test)]
    pub(crate) fn sample(vehicle: &str, orbit: &str, year: i32, outcome: Outcome) -> Self {
        Self {
            name: format!("{} {}", vehicle, year),
            vehicle: vehicle.to_string(),
            family: crate::loader::family_of(vehicle),
            orbit: OrbitType::new(orbit),
            launch_date: None,
            year,
            outcome,
            payload_mass_kg: None,
            application: None,
            launch_site: None,
        }
    }
}

/// Immutable sequence of mission records in source order
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct MissionTable {
    records: Vec<MissionRecord>,
}

impl MissionTable {
    pub fn new(records: Vec<MissionRecord>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[MissionRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MissionRecord> {
        self.records.iter()
    }
}

impl<'a> IntoIterator for &'a MissionTable {
    type Item = &'a MissionRecord;
    type IntoIter = std::slice::Iter<'a, MissionRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Inclusive range of launch years accepted by the loader
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearRange {
    pub min: i32,
    pub max: i32,
}

impl YearRange {
    pub fn contains(&self, year: i32) -> bool {
        (self.min..=self.max).contains(&year)
    }
}

impl Default for YearRange {
    fn default() -> Self {
        Self { min: 1963, max: 2025 }
    }
}

/// Configuration for loading and serving the mission dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Path to the SQL dump
    pub dump_path: PathBuf,
    /// Table whose INSERT statements hold the mission records
    pub table_name: String,
    /// Optional tree-ensemble artifact used for predictions
    pub model_path: Option<PathBuf>,
    /// Historical range every launch year must fall into
    pub year_range: YearRange,
    /// Decimal places kept on success rates
    pub rate_precision: u32,
    /// Number of families reported by the top-families aggregate
    pub top_families: usize,
    /// Base URL handed to the presentation layer; unused by the core
    pub api_base_url: String,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            dump_path: PathBuf::from("data/isro-missions.sql"),
            table_name: DEFAULT_TABLE_NAME.to_string(),
            model_path: None,
            year_range: YearRange::default(),
            rate_precision: 2,
            top_families: 3,
            api_base_url: "http://127.0.0.1:8000/api".to_string(),
        }
    }
}

impl AnalyzerConfig {
    /// Load a configuration file, falling back to defaults for missing keys
    pub fn load(path: &Path) -> Result<Self> {
        info!("Loading configuration from {}", path.display());
        let file = std::fs::File::open(path).map_err(|e| AnalyzerError::io(path, e))?;
        let config: Self = serde_json::from_reader(file)
            .map_err(|e| AnalyzerError::Config(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.year_range.min > self.year_range.max {
            return Err(AnalyzerError::Config(format!(
                "year_range.min ({}) is after year_range.max ({})",
                self.year_range.min, self.year_range.max
            )));
        }
        if self.table_name.trim().is_empty() {
            return Err(AnalyzerError::Config("table_name must not be empty".to_string()));
        }
        if self.rate_precision > 6 {
            return Err(AnalyzerError::Config(format!(
                "rate_precision {} is too large (max 6)",
                self.rate_precision
            )));
        }
        Ok(())
    }
}
