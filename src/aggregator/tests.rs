use pretty_assertions::assert_eq;
use test_log::test;

use super::*;
use crate::types::{MissionRecord, Outcome, VehicleFamily};

fn table(rows: &[(&str, &str, i32, Outcome)]) -> MissionTable {
    MissionTable::new(
        rows.iter()
            .map(|(vehicle, orbit, year, outcome)| MissionRecord::sample(vehicle, orbit, *year, *outcome))
            .collect(),
    )
}

fn example() -> MissionTable {
    table(&[
        ("PSLV-C6", "LEO", 2005, Outcome::Success),
        ("PSLV-C7", "LEO", 2006, Outcome::Failure),
        ("GSLV-F01", "GTO", 2005, Outcome::Success),
    ])
}

#[test]
fn test_family_and_decade_rates() {
    let table = example();

    let by_family = aggregate(&table, ViewName::ByFamily, 2);
    assert_eq!(
        by_family.rates(),
        BTreeMap::from([("GSLV".to_string(), 1.0), ("PSLV".to_string(), 0.5)])
    );

    let by_decade = aggregate(&table, ViewName::ByDecade, 2);
    assert_eq!(by_decade.rates(), BTreeMap::from([("2000".to_string(), 0.67)]));
    let row = by_decade.get("2000").unwrap();
    assert_eq!((row.total, row.successes), (3, 2));
}

#[test]
fn test_rates_stay_in_bounds() {
    let table = table(&[
        ("SLV-3 E1", "LEO", 1979, Outcome::Failure),
        ("SLV-3 E2", "LEO", 1980, Outcome::Success),
        ("ASLV-D1", "LEO", 1987, Outcome::Failure),
        ("PSLV-D1", "SSPO", 1993, Outcome::Failure),
        ("PSLV-D2", "SSPO", 1994, Outcome::Success),
        ("PSLV-D3", "SSPO", 1996, Outcome::Success),
    ]);

    for view in ViewName::ALL {
        for row in &aggregate(&table, view, 2).rows {
            assert!(row.total > 0, "{} {}", view, row.key);
            assert!((0.0..=1.0).contains(&row.success_rate));
            let expected = crate::utils::round_to(row.successes as f64 / row.total as f64, 2);
            assert_eq!(row.success_rate, expected);
        }
    }
}

#[test]
fn test_families_without_launches_are_absent() {
    let by_family = aggregate(&example(), ViewName::ByFamily, 2);
    assert_eq!(by_family.len(), 2);
    assert!(by_family.get("SLV").is_none());
    assert!(by_family.get("Other").is_none());
}

#[test]
fn test_rows_sorted_by_key() {
    let table = table(&[
        ("PSLV-C37", "SSPO", 2017, Outcome::Success),
        ("SLV-3 E1", "LEO", 1979, Outcome::Failure),
        ("GSLV-F10", "GTO", 2021, Outcome::Failure),
    ]);
    let keys: Vec<_> = aggregate(&table, ViewName::ByYear, 2)
        .rows
        .into_iter()
        .map(|r| r.key)
        .collect();
    assert_eq!(keys, vec!["1979", "2017", "2021"]);

    let orbits: Vec<_> = aggregate(&table, ViewName::ByOrbit, 2)
        .rows
        .into_iter()
        .map(|r| r.key)
        .collect();
    assert_eq!(orbits, vec!["GTO", "LEO", "SSPO"]);
}

#[test]
fn test_application_view_skips_unknown_application() {
    let mut records = example().records().to_vec();
    records[0].application = Some("Earth Observation".to_string());
    records[2].application = Some("Communication".to_string());
    let table = MissionTable::new(records);

    let view = aggregate(&table, ViewName::ByApplication, 2);
    assert_eq!(view.len(), 2);
    assert_eq!(view.rows.iter().map(|r| r.total).sum::<usize>(), 2);
}

#[test]
fn test_view_names() {
    for view in ViewName::ALL {
        assert_eq!(view.as_str().parse::<ViewName>().unwrap(), view);
    }
    let err = "by_moon".parse::<ViewName>().unwrap_err();
    assert_eq!(err.kind(), "not_found");
}

#[test]
fn test_capability_matrix_is_sparse() {
    let matrix = CapabilityMatrix::from_table(&example());
    assert_eq!(matrix.len(), 2);
    assert_eq!(matrix.count("PSLV", "LEO"), Some(2));
    assert_eq!(matrix.count("GSLV", "GTO"), Some(1));
    assert_eq!(matrix.count("GSLV", "LEO"), None);
    assert_eq!(matrix.count_or_zero("GSLV", "LEO"), 0);
    assert_eq!(matrix.total(), 3);
    assert!(matrix.links().iter().all(|link| link.value > 0));
}

#[test]
fn test_capability_matrix_serializes_as_links() {
    let matrix = CapabilityMatrix::from_table(&example());
    let json = serde_json::to_value(&matrix).unwrap();
    assert_eq!(
        json,
        serde_json::json!([
            { "source": "GSLV", "target": "GTO", "value": 1 },
            { "source": "PSLV", "target": "LEO", "value": 2 },
        ])
    );
}

#[test]
fn test_growth_trend_is_cumulative() {
    let trend = growth_trend(&example());
    assert_eq!(
        trend,
        vec![
            YearTrend { year: 2005, missions: 2, cumulative: 2 },
            YearTrend { year: 2006, missions: 1, cumulative: 3 },
        ]
    );
}

#[test]
fn test_kpi_summary() {
    let kpi = success_kpi(&example(), 2);
    assert_eq!(kpi.total_missions, 3);
    assert_eq!(kpi.failures, 1);
    assert_eq!(kpi.success_rate, Some(0.67));

    assert_eq!(success_kpi(&MissionTable::default(), 2).success_rate, None);
}

#[test]
fn test_top_families() {
    let table = table(&[
        ("PSLV-C1", "SSPO", 1997, Outcome::Success),
        ("PSLV-C2", "SSPO", 1999, Outcome::Success),
        ("GSLV-D1", "GTO", 2001, Outcome::Success),
        ("SLV-3 E1", "LEO", 1979, Outcome::Failure),
        ("Ariane 5", "GTO", 2011, Outcome::Success),
    ]);

    let top = top_families(&table, 2, 2);
    let families: Vec<_> = top.iter().map(|f| f.family).collect();
    assert_eq!(families, vec![VehicleFamily::Pslv, VehicleFamily::Gslv]);
    assert_eq!(top[0].launches, 2);
    assert_eq!(top_families(&table, 10, 2).len(), 4);
}
