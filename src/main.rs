use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::{debug, info};
use serde::Serialize;

use mission_analyzer::store::watch_dump;
use mission_analyzer::{AnalyzerConfig, AnalyzerError, ErrorReport, MissionAnalyzer};

#[derive(Parser)]
#[command(name = "mission-analyzer")]
#[command(author, version, about = "Launch-record aggregates and success predictions from an SQL dump", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// JSON configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// SQL dump holding the mission table
    #[arg(short, long, global = true, env = "MISSION_ANALYZER_DUMP")]
    dump: Option<PathBuf>,

    /// Tree-ensemble artifact used by `predict`
    #[arg(short, long, global = true, env = "MISSION_ANALYZER_MODEL")]
    model: Option<PathBuf>,

    /// Table whose INSERT statements hold the missions
    #[arg(long, global = true)]
    table: Option<String>,

    #[arg(long, global = true, env = "API_URL")]
    api_url: Option<String>,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, global = true, default_value = "info")]
    log_level: String,
}

#[derive(Subcommand)]
enum Command {
    /// Dataset fingerprint and headline success figures
    Summary,

    /// One named aggregate view (by_family, by_decade, by_orbit, by_year, by_application)
    View { name: String },

    /// Launch counts per vehicle family and orbit
    Matrix,

    /// Missions per year with a running total
    Trend,

    /// Families with the most launches
    Top,

    /// Success probability for a hypothetical launch
    Predict {
        #[arg(long)]
        vehicle: String,
        #[arg(long)]
        orbit: String,
        #[arg(long)]
        year: i32,
    },

    /// Evaluation metrics and feature importance of the loaded model
    Model,

    /// Vehicles, orbits and years accepted by `predict`
    Options,

    /// Keep reloading the dump when it changes, until ctrl-c
    Watch {
        #[arg(long, default_value_t = 5)]
        interval_secs: u64,
    },
}

#[derive(Serialize)]
struct SummaryOutput<T: Serialize, K: Serialize> {
    snapshot: T,
    kpi: K,
}

#[derive(Serialize)]
struct PredictionOutput<'a> {
    vehicle: &'a str,
    orbit: &'a str,
    year: i32,
    probability: f64,
}

#[derive(Serialize)]
struct ModelOutput<M: Serialize, F: Serialize> {
    metrics: M,
    feature_importance: F,
}

fn build_config(cli: &Cli) -> Result<AnalyzerConfig> {
    let mut config = match &cli.config {
        Some(path) => AnalyzerConfig::load(path)
            .with_context(|| format!("Failed to load configuration {}", path.display()))?,
        None => AnalyzerConfig::default(),
    };

    if let Some(dump) = &cli.dump {
        config.dump_path = dump.clone();
    }
    if let Some(model) = &cli.model {
        config.model_path = Some(model.clone());
    }
    if let Some(table) = &cli.table {
        config.table_name = table.clone();
    }
    if let Some(url) = &cli.api_url {
        config.api_base_url = url.clone();
    }
    config.validate()?;
    debug!("Configuration: {:?}", config);
    Ok(config)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn run(cli: Cli) -> Result<()> {
    let config = build_config(&cli)?;
    let dump_path = config.dump_path.clone();
    let analyzer = MissionAnalyzer::open(config)
        .with_context(|| format!("Failed to load mission data from {}", dump_path.display()))?;

    match cli.command {
        Command::Summary => print_json(&SummaryOutput {
            snapshot: analyzer.snapshot_info(),
            kpi: analyzer.success_kpi(),
        }),
        Command::View { name } => print_json(&analyzer.get_aggregates(&name)?),
        Command::Matrix => print_json(&analyzer.get_capability_matrix()),
        Command::Trend => print_json(&analyzer.growth_trend()),
        Command::Top => print_json(&analyzer.top_families()),
        Command::Predict {
            vehicle,
            orbit,
            year,
        } => {
            let probability = analyzer.predict(&vehicle, &orbit, year)?;
            print_json(&PredictionOutput {
                vehicle: &vehicle,
                orbit: &orbit,
                year,
                probability,
            })
        }
        Command::Model => print_json(&ModelOutput {
            metrics: analyzer.model_performance()?,
            feature_importance: analyzer.feature_importance()?,
        }),
        Command::Options => print_json(&analyzer.prediction_options()),
        Command::Watch { interval_secs } => {
            let store = Arc::clone(analyzer.store());
            watch_dump(store, Duration::from_secs(interval_secs.max(1))).await;
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&cli.log_level)).init();

    info!("Starting mission-analyzer");
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let report = match err.downcast_ref::<AnalyzerError>() {
                Some(analyzer_err) => ErrorReport {
                    kind: analyzer_err.kind(),
                    message: format!("{:#}", err),
                },
                None => ErrorReport {
                    kind: "internal_error",
                    message: format!("{:#}", err),
                },
            };
            match serde_json::to_string(&report) {
                Ok(json) => eprintln!("{}", json),
                Err(_) => eprintln!("{:#}", err),
            }
            ExitCode::FAILURE
        }
    }
}
