//! Functions served to the presentation layer.
//!
//! Each call reads the current snapshot once, so a reload mid-request never
//! mixes two tables in one response.


use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::{debug, info};
use serde::Serialize;

use crate::aggregator::{
    self, AggregateView, CapabilityMatrix, FamilyLaunches, KpiSummary, ViewName, YearTrend,
};
use crate::error::{AnalyzerError, Result};
use crate::predictor::{ForestModel, ModelMetrics, Predictor};
use crate::store::MissionStore;
use crate::types::{AnalyzerConfig, YearRange};

/// Number of entries reported by [`MissionAnalyzer::feature_importance`]
pub const TOP_FEATURES: usize = 10;

/// Which dataset is being served
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SnapshotInfo {
    pub missions: usize,
    pub fingerprint: String,
    pub source: PathBuf,
    pub loaded_at: DateTime<Utc>,
    pub model_loaded: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureImportance {
    pub feature: String,
    pub importance: f64,
}

/// Choices for a prediction form
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionOptions {
    pub vehicles: Vec<String>,
    pub orbits: Vec<String>,
    pub years: YearRange,
}

/// Service boundary over the mission store and the optional classifier
pub struct MissionAnalyzer {
    store: Arc<MissionStore>,
    model: Option<Arc<dyn Predictor>>,
}

impl MissionAnalyzer {
    pub fn new(store: Arc<MissionStore>, model: Option<Arc<dyn Predictor>>) -> Self {
        Self { store, model }
    }

    /// Load the dump and, when configured, the model artifact
    pub fn open(config: AnalyzerConfig) -> Result<Self> {
        config.validate()?;
        let model = match &config.model_path {
            Some(path) => Some(Arc::new(ForestModel::load(path)?) as Arc<dyn Predictor>),
            None => {
                info!("No model configured; predictions are disabled");
                None
            }
        };
        let store = Arc::new(MissionStore::open(config)?);
        Ok(Self::new(store, model))
    }

    pub fn store(&self) -> &Arc<MissionStore> {
        &self.store
    }

    fn precision(&self) -> u32 {
        self.store.config().rate_precision
    }

    fn model(&self) -> Result<&dyn Predictor> {
        self.model.as_deref().ok_or(AnalyzerError::ModelUnavailable)
    }

    pub fn get_aggregates(&self, view_name: &str) -> Result<AggregateView> {
        let view: ViewName = view_name.parse()?;
        let snapshot = self.store.snapshot();
        Ok(aggregator::aggregate(&snapshot.table, view, self.precision()))
    }

    pub fn get_capability_matrix(&self) -> CapabilityMatrix {
        CapabilityMatrix::from_table(&self.store.snapshot().table)
    }

    /// Success probability for a hypothetical launch
    pub fn predict(&self, vehicle: &str, orbit: &str, year: i32) -> Result<f64> {
        let model = self.model()?;
        let features = model.feature_builder().encode(vehicle, orbit, year)?;
        let probability = model.predict_proba(&features)?;
        debug!("predict({}, {}, {}) = {}", vehicle, orbit, year, probability);
        Ok(probability)
    }

    pub fn growth_trend(&self) -> Vec<YearTrend> {
        aggregator::growth_trend(&self.store.snapshot().table)
    }

    pub fn success_kpi(&self) -> KpiSummary {
        aggregator::success_kpi(&self.store.snapshot().table, self.precision())
    }

    pub fn top_families(&self) -> Vec<FamilyLaunches> {
        let n = self.store.config().top_families;
        aggregator::top_families(&self.store.snapshot().table, n, self.precision())
    }

    pub fn model_performance(&self) -> Result<ModelMetrics> {
        self.model()?
            .metrics()
            .copied()
            .ok_or_else(|| AnalyzerError::Model("artifact carries no evaluation metrics".to_string()))
    }

    /// The most important features, highest first
    pub fn feature_importance(&self) -> Result<Vec<FeatureImportance>> {
        let model = self.model()?;
        let importances = model
            .feature_importances()
            .ok_or_else(|| AnalyzerError::Model("artifact carries no feature importances".to_string()))?;

        let mut ranked: Vec<_> = model
            .vocabulary()
            .feature_names()
            .into_iter()
            .zip(importances.iter().copied())
            .map(|(feature, importance)| FeatureImportance { feature, importance })
            .collect();
        ranked.sort_by(|a, b| b.importance.partial_cmp(&a.importance).unwrap_or(Ordering::Equal));
        ranked.truncate(TOP_FEATURES);
        Ok(ranked)
    }

    /// Vehicles and orbits a prediction accepts; falls back to the observed
    /// levels when no model is loaded
    pub fn prediction_options(&self) -> PredictionOptions {
        let years = self.store.config().year_range;
        if let Some(model) = &self.model {
            let vocabulary = model.vocabulary();
            return PredictionOptions {
                vehicles: vocabulary.families.clone(),
                orbits: vocabulary.orbits.clone(),
                years,
            };
        }

        let snapshot = self.store.snapshot();
        let vehicles: BTreeSet<_> = snapshot.table.iter().map(|r| r.family.label()).collect();
        let orbits: BTreeSet<_> = snapshot.table.iter().map(|r| r.orbit.as_str()).collect();
        PredictionOptions {
            vehicles: vehicles.into_iter().map(String::from).collect(),
            orbits: orbits.into_iter().map(String::from).collect(),
            years,
        }
    }

    pub fn snapshot_info(&self) -> SnapshotInfo {
        let snapshot = self.store.snapshot();
        SnapshotInfo {
            missions: snapshot.table.len(),
            fingerprint: snapshot.fingerprint.clone(),
            source: snapshot.source.clone(),
            loaded_at: snapshot.loaded_at,
            model_loaded: self.model.is_some(),
        }
    }

    /// See [`MissionStore::reload`]
    pub fn reload(&self) -> Result<bool> {
        self.store.reload()
    }
}
