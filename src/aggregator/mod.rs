//! Chart-ready summaries computed from a loaded mission table.
//!
//! Every function here is a pure function of the table: nothing is cached
//! and nothing is persisted.

#[cfg(test)]
mod tests;

mod matrix;
mod trend;

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{AnalyzerError, Result};
use crate::types::{MissionRecord, MissionTable};
use crate::utils::success_rate;

pub use matrix::{CapabilityMatrix, MatrixLink};
pub use trend::{growth_trend, success_kpi, top_families, FamilyLaunches, KpiSummary, YearTrend};

/// Named summary views served at the service boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewName {
    ByFamily,
    ByDecade,
    ByOrbit,
    ByYear,
    ByApplication,
}

impl ViewName {
    pub const ALL: [ViewName; 5] = [
        ViewName::ByFamily,
        ViewName::ByDecade,
        ViewName::ByOrbit,
        ViewName::ByYear,
        ViewName::ByApplication,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ViewName::ByFamily => "by_family",
            ViewName::ByDecade => "by_decade",
            ViewName::ByOrbit => "by_orbit",
            ViewName::ByYear => "by_year",
            ViewName::ByApplication => "by_application",
        }
    }
}

impl fmt::Display for ViewName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ViewName {
    type Err = AnalyzerError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|view| view.as_str() == s.trim())
            .ok_or_else(|| AnalyzerError::NotFound(s.to_string()))
    }
}

/// One key of an aggregate view
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateRow {
    pub key: String,
    pub total: usize,
    pub successes: usize,
    /// `successes / total`, rounded
    pub success_rate: f64,
}

/// A named view; keys with zero launches never appear
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateView {
    pub name: ViewName,
    pub rows: Vec<AggregateRow>,
}

impl AggregateView {
    pub fn get(&self, key: &str) -> Option<&AggregateRow> {
        self.rows.iter().find(|row| row.key == key)
    }

    /// Key to success rate
    pub fn rates(&self) -> BTreeMap<String, f64> {
        self.rows
            .iter()
            .map(|row| (row.key.clone(), row.success_rate))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Compute a view over the table
pub fn aggregate(table: &MissionTable, view: ViewName, precision: u32) -> AggregateView {
    let rows = match view {
        ViewName::ByFamily => group_by(table, precision, |r| Some(r.family.label().to_string())),
        ViewName::ByDecade => group_by(table, precision, |r| Some(r.decade())),
        ViewName::ByOrbit => group_by(table, precision, |r| Some(r.orbit.to_string())),
        ViewName::ByYear => group_by(table, precision, |r| Some(r.year)),
        // Records without an application only drop out of this view
        ViewName::ByApplication => group_by(table, precision, |r| r.application.clone()),
    };
    debug!("View {} has {} keys", view, rows.len());
    AggregateView { name: view, rows }
}

fn group_by<K, F>(table: &MissionTable, precision: u32, key_of: F) -> Vec<AggregateRow>
where
    K: Ord + ToString,
    F: Fn(&MissionRecord) -> Option<K>,
{
    let mut counts: BTreeMap<K, (usize, usize)> = BTreeMap::new();
    for record in table {
        if let Some(key) = key_of(record) {
            let entry = counts.entry(key).or_default();
            entry.0 += 1;
            if record.outcome.is_success() {
                entry.1 += 1;
            }
        }
    }

    counts
        .into_iter()
        .filter_map(|(key, (total, successes))| {
            success_rate(successes, total, precision).map(|rate| AggregateRow {
                key: key.to_string(),
                total,
                successes,
                success_rate: rate,
            })
        })
        .collect()
}
