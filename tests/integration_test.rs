use std::collections::BTreeMap;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use log::debug;
use pretty_assertions::assert_eq;
use test_log::test;

use mission_analyzer::{
    load_dump,
    AnalyzerConfig,
    ForestModel,
    MissionAnalyzer,
    MissionStore,
    Predictor,
    VehicleFamily,
    ViewName,
};

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures")
}

fn config() -> AnalyzerConfig {
    AnalyzerConfig {
        dump_path: fixtures_dir().join("isro_missions.sql"),
        model_path: Some(fixtures_dir().join("forest_model.json")),
        ..Default::default()
    }
}

fn rates(pairs: &[(&str, f64)]) -> BTreeMap<String, f64> {
    pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
}

#[test]
fn test_load_fixture_dump() -> Result<()> {
    let table = load_dump(&config().dump_path, &config())?;
    debug!("Loaded {} missions", table.len());
    assert_eq!(table.len(), 30);

    let records = table.records();
    assert_eq!(records[0].name, "Aryabhata");
    assert_eq!(records[29].name, "NVS-02");
    assert_eq!(records[16].name, "Chandrayaan-1 (India's first lunar probe)");

    // NULL cells: optional mass stays unknown, categories take the column mode
    assert_eq!(records[5].payload_mass_kg, None);
    assert_eq!(records[23].payload_mass_kg, Some(3850.0));
    assert_eq!(records[3].application.as_deref(), Some("Earth Observation"));
    assert_eq!(records[14].launch_site.as_deref(), Some("SDSC SHAR"));
    assert!(records[29].outcome.is_success());

    assert_eq!(records[11].family, VehicleFamily::Pslv);
    assert!(records[11].outcome.is_success(), "partial success counts as success");
    assert_eq!(records[26].family, VehicleFamily::Gslv);
    assert_eq!(records[25].family, VehicleFamily::Slv);
    assert_eq!(records[5].family, VehicleFamily::Other);

    Ok(())
}

#[test]
fn test_success_rate_views() -> Result<()> {
    let analyzer = MissionAnalyzer::open(config())?;

    let by_family = analyzer.get_aggregates("by_family")?;
    assert_eq!(
        by_family.rates(),
        rates(&[("GSLV", 0.67), ("Other", 1.0), ("PSLV", 0.83), ("SLV", 0.33)])
    );

    let by_decade = analyzer.get_aggregates("by_decade")?;
    assert_eq!(
        by_decade.rates(),
        rates(&[
            ("1970", 0.67),
            ("1980", 0.6),
            ("1990", 0.75),
            ("2000", 0.8),
            ("2010", 0.67),
            ("2020", 0.71),
        ])
    );

    for view in ViewName::ALL {
        let view = analyzer.get_aggregates(view.as_str())?;
        let total: usize = view.rows.iter().map(|r| r.total).sum();
        assert_eq!(total, 30, "{} should cover every mission", view.name);
        for row in &view.rows {
            assert!(row.total > 0);
            assert!((0.0..=1.0).contains(&row.success_rate));
        }
    }

    Ok(())
}

#[test]
fn test_unknown_view_is_not_found() -> Result<()> {
    let analyzer = MissionAnalyzer::open(config())?;
    let err = analyzer.get_aggregates("by_payload").unwrap_err();
    assert_eq!(err.kind(), "not_found");
    Ok(())
}

#[test]
fn test_capability_matrix() -> Result<()> {
    let analyzer = MissionAnalyzer::open(config())?;
    let matrix = analyzer.get_capability_matrix();

    assert_eq!(matrix.count("PSLV", "SSPO"), Some(6));
    assert_eq!(matrix.count("GSLV", "GTO"), Some(6));
    assert_eq!(matrix.count("GSLV", "Lunar"), Some(2));
    assert_eq!(matrix.count("SLV", "LEO"), Some(6));
    assert_eq!(matrix.count("SLV", "GTO"), None);
    assert_eq!(matrix.total(), 30);
    assert!(matrix.links().iter().all(|link| link.value > 0));

    Ok(())
}

#[test]
fn test_dashboard_aggregates() -> Result<()> {
    let analyzer = MissionAnalyzer::open(config())?;

    let kpi = analyzer.success_kpi();
    assert_eq!((kpi.total_missions, kpi.successes, kpi.failures), (30, 21, 9));
    assert_eq!(kpi.success_rate, Some(0.7));

    let top: Vec<_> = analyzer
        .top_families()
        .into_iter()
        .map(|f| (f.family, f.launches))
        .collect();
    assert_eq!(
        top,
        vec![
            (VehicleFamily::Pslv, 12),
            (VehicleFamily::Gslv, 9),
            (VehicleFamily::Slv, 6),
        ]
    );

    let trend = analyzer.growth_trend();
    assert_eq!(trend.first().map(|t| t.year), Some(1975));
    assert_eq!(trend.last().map(|t| t.cumulative), Some(30));
    let year_2023 = trend.iter().find(|t| t.year == 2023).map(|t| t.missions);
    assert_eq!(year_2023, Some(3));

    Ok(())
}

#[test]
fn test_predict_with_fixture_model() -> Result<()> {
    let analyzer = MissionAnalyzer::open(config())?;

    let p = analyzer.predict("PSLV-C60", "SSPO", 2024)?;
    assert!((p - 0.85).abs() < 1e-9, "{}", p);
    assert_eq!(analyzer.predict("PSLV-C60", "SSPO", 2024)?, p);

    let p = analyzer.predict("SSLV", "leo", 2022)?;
    assert!((p - 0.6).abs() < 1e-9, "{}", p);

    let err = analyzer.predict("Falcon 9", "LEO", 2020).unwrap_err();
    assert_eq!(err.kind(), "unknown_category");
    let err = analyzer.predict("PSLV", "Venus", 2020).unwrap_err();
    assert_eq!(err.kind(), "unknown_category");

    Ok(())
}

#[test]
fn test_model_reporting() -> Result<()> {
    let analyzer = MissionAnalyzer::open(config())?;

    let metrics = analyzer.model_performance()?;
    assert_eq!(metrics.accuracy, 0.83);

    let ranked = analyzer.feature_importance()?;
    assert_eq!(ranked.len(), 10);
    assert_eq!(ranked[0].feature, "family=PSLV");
    assert!(ranked.windows(2).all(|w| w[0].importance >= w[1].importance));
    assert!(ranked.iter().all(|f| f.feature != "orbit=Heliocentric"));

    let options = analyzer.prediction_options();
    assert_eq!(options.vehicles, vec!["GSLV", "Other", "PSLV", "SLV"]);
    assert_eq!(options.orbits.len(), 7);

    Ok(())
}

#[test]
fn test_model_artifact_matches_dataset_levels() -> Result<()> {
    let model = ForestModel::load(&fixtures_dir().join("forest_model.json"))?;
    let table = load_dump(&config().dump_path, &config())?;

    // Every observed level can be encoded, so every row is predictable
    let builder = model.feature_builder();
    for record in &table {
        let features = builder.encode(record.family.label(), record.orbit.as_str(), record.year)?;
        let p = model.predict_proba(&features)?;
        assert!((0.0..=1.0).contains(&p));
    }
    Ok(())
}

#[test]
fn test_reload_from_disk() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let dump_path = dir.path().join("missions.sql");
    std::fs::copy(fixtures_dir().join("isro_missions.sql"), &dump_path)?;

    let config = AnalyzerConfig {
        dump_path: dump_path.clone(),
        ..Default::default()
    };
    let store = Arc::new(MissionStore::open(config)?);
    let analyzer = MissionAnalyzer::new(Arc::clone(&store), None);
    assert!(!analyzer.reload()?);

    let mut file = std::fs::OpenOptions::new().append(true).open(&dump_path)?;
    writeln!(
        file,
        "INSERT INTO `isro_space_missions` (`name`, `launch_date`, `launch_vehicle`, `orbit_type`, `outcome`) VALUES ('SpaDeX', '2024-12-30', 'PSLV-C60', 'LEO', 'Launch successful');"
    )?;
    drop(file);

    let before = store.snapshot();
    assert!(analyzer.reload()?);
    assert_eq!(before.table.len(), 30);
    assert_eq!(analyzer.snapshot_info().missions, 31);

    std::fs::write(&dump_path, "INSERT INTO `isro_space_missions` (`name`) VALUES ('broken")?;
    let err = analyzer.reload().unwrap_err();
    assert_eq!(err.kind(), "parse_error");
    assert_eq!(analyzer.snapshot_info().missions, 31);

    Ok(())
}

#[test]
fn test_missing_dump_refuses_to_start() {
    let config = AnalyzerConfig {
        dump_path: fixtures_dir().join("no_such_dump.sql"),
        ..Default::default()
    };
    let err = MissionAnalyzer::open(config).err().map(|e| e.kind());
    assert_eq!(err, Some("io_error"));
}
