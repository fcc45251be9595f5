use std::cmp::Reverse;
use std::collections::BTreeMap;

use serde::Serialize;

use crate::types::{MissionTable, VehicleFamily};
use crate::utils::success_rate;

/// Launches in one year and the running total up to it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct YearTrend {
    pub year: i32,
    pub missions: usize,
    pub cumulative: usize,
}

/// Headline figures over the whole table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KpiSummary {
    pub total_missions: usize,
    pub successes: usize,
    pub failures: usize,
    /// `None` only for an empty table
    pub success_rate: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FamilyLaunches {
    pub family: VehicleFamily,
    pub launches: usize,
    pub success_rate: f64,
}

/// Missions per launch year, oldest first, years without launches skipped
pub fn growth_trend(table: &MissionTable) -> Vec<YearTrend> {
    let mut per_year: BTreeMap<i32, usize> = BTreeMap::new();
    for record in table {
        *per_year.entry(record.year).or_default() += 1;
    }

    let mut cumulative = 0;
    per_year
        .into_iter()
        .map(|(year, missions)| {
            cumulative += missions;
            YearTrend {
                year,
                missions,
                cumulative,
            }
        })
        .collect()
}

pub fn success_kpi(table: &MissionTable, precision: u32) -> KpiSummary {
    let total_missions = table.len();
    let successes = table.iter().filter(|r| r.outcome.is_success()).count();
    KpiSummary {
        total_missions,
        successes,
        failures: total_missions - successes,
        success_rate: success_rate(successes, total_missions, precision),
    }
}

/// The `n` families with the most launches; ties keep family order
pub fn top_families(table: &MissionTable, n: usize, precision: u32) -> Vec<FamilyLaunches> {
    let mut counts: BTreeMap<VehicleFamily, (usize, usize)> = BTreeMap::new();
    for record in table {
        let entry = counts.entry(record.family).or_default();
        entry.0 += 1;
        if record.outcome.is_success() {
            entry.1 += 1;
        }
    }

    let mut ranked: Vec<_> = counts.into_iter().collect();
    ranked.sort_by_key(|(family, (launches, _))| (Reverse(*launches), *family));

    ranked
        .into_iter()
        .take(n)
        .filter_map(|(family, (launches, successes))| {
            success_rate(successes, launches, precision).map(|rate| FamilyLaunches {
                family,
                launches,
                success_rate: rate,
            })
        })
        .collect()
}
