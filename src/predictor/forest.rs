use std::path::Path;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use super::Predictor;
use crate::error::{AnalyzerError, Result};
use crate::features::{FeatureVector, Vocabulary, YearScaling};

/// Artifact format understood by [`ForestModel`]
pub const FORMAT_VERSION: u32 = 1;

/// Evaluation figures recorded when the model was trained
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelMetrics {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
}

/// Node of a flattened decision tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Node {
    /// `x[feature] <= threshold` continues at `left`, otherwise at `right`
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf { probability: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Walks from the root to a leaf. A validated tree reaches one in at most
    /// `nodes.len()` steps, anything longer is a cycle.
    fn evaluate(&self, tree: usize, x: &[f64]) -> Result<f64> {
        let mut idx = 0;
        for _ in 0..self.nodes.len() {
            match self.nodes.get(idx) {
                Some(Node::Leaf { probability }) => return Ok(*probability),
                Some(Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                }) => {
                    let value = x.get(*feature).ok_or_else(|| {
                        AnalyzerError::Model(format!(
                            "tree {} node {}: feature {} out of range for width {}",
                            tree,
                            idx,
                            feature,
                            x.len()
                        ))
                    })?;
                    idx = if *value <= *threshold { *left } else { *right };
                }
                None => {
                    return Err(AnalyzerError::Model(format!(
                        "tree {}: node {} does not exist",
                        tree, idx
                    )))
                }
            }
        }
        Err(AnalyzerError::Model(format!(
            "tree {} does not reach a leaf",
            tree
        )))
    }

    /// Children must point forward so evaluation always reaches a leaf
    fn validate(&self, tree: usize, width: usize) -> Result<()> {
        if self.nodes.is_empty() {
            return Err(AnalyzerError::Model(format!("tree {} has no nodes", tree)));
        }
        for (idx, node) in self.nodes.iter().enumerate() {
            match node {
                Node::Leaf { probability } => {
                    if !(0.0..=1.0).contains(probability) {
                        return Err(AnalyzerError::Model(format!(
                            "tree {} node {}: leaf probability {} outside [0, 1]",
                            tree, idx, probability
                        )));
                    }
                }
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    if *feature >= width {
                        return Err(AnalyzerError::Model(format!(
                            "tree {} node {}: feature {} out of range for width {}",
                            tree, idx, feature, width
                        )));
                    }
                    if threshold.is_nan() {
                        return Err(AnalyzerError::Model(format!(
                            "tree {} node {}: threshold is NaN",
                            tree, idx
                        )));
                    }
                    for child in [*left, *right] {
                        if child <= idx || child >= self.nodes.len() {
                            return Err(AnalyzerError::Model(format!(
                                "tree {} node {}: child {} must point forward inside the tree",
                                tree, idx, child
                            )));
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

/// Tree ensemble loaded from a JSON artifact.
///
/// The success probability is the mean of the leaf probabilities reached in
/// every tree. Deserializing runs [`ForestModel::validate`], so an instance
/// always describes a well-formed ensemble.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ForestArtifact")]
pub struct ForestModel {
    format_version: u32,
    vocabulary: Vocabulary,
    year_scaling: YearScaling,
    trees: Vec<Tree>,
    #[serde(skip_serializing_if = "Option::is_none")]
    metrics: Option<ModelMetrics>,
    #[serde(skip_serializing_if = "Option::is_none")]
    feature_importances: Option<Vec<f64>>,
}

/// Artifact as written on disk, before validation
#[derive(Deserialize)]
struct ForestArtifact {
    format_version: u32,
    vocabulary: Vocabulary,
    year_scaling: YearScaling,
    trees: Vec<Tree>,
    #[serde(default)]
    metrics: Option<ModelMetrics>,
    #[serde(default)]
    feature_importances: Option<Vec<f64>>,
}

impl TryFrom<ForestArtifact> for ForestModel {
    type Error = AnalyzerError;

    fn try_from(artifact: ForestArtifact) -> Result<Self> {
        let model = ForestModel {
            format_version: artifact.format_version,
            vocabulary: artifact.vocabulary,
            year_scaling: artifact.year_scaling,
            trees: artifact.trees,
            metrics: artifact.metrics,
            feature_importances: artifact.feature_importances,
        };
        model.validate()?;
        Ok(model)
    }
}

impl ForestModel {
    pub fn load(path: &Path) -> Result<Self> {
        info!("Loading model artifact from {}", path.display());
        let text = std::fs::read_to_string(path).map_err(|e| AnalyzerError::io(path, e))?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let model: Self =
            serde_json::from_str(text).map_err(|e| AnalyzerError::Model(e.to_string()))?;
        debug!(
            "Model has {} trees over {} features",
            model.trees.len(),
            model.vocabulary.width()
        );
        Ok(model)
    }

    pub fn format_version(&self) -> u32 {
        self.format_version
    }

    pub fn trees(&self) -> &[Tree] {
        &self.trees
    }

    pub fn validate(&self) -> Result<()> {
        if self.format_version != FORMAT_VERSION {
            return Err(AnalyzerError::Model(format!(
                "unsupported format_version {} (expected {})",
                self.format_version, FORMAT_VERSION
            )));
        }
        if self.vocabulary.families.is_empty() || self.vocabulary.orbits.is_empty() {
            return Err(AnalyzerError::Model("vocabulary must list families and orbits".to_string()));
        }
        if !(self.year_scaling.max > self.year_scaling.min) {
            return Err(AnalyzerError::Model(format!(
                "year_scaling.max ({}) must exceed year_scaling.min ({})",
                self.year_scaling.max, self.year_scaling.min
            )));
        }
        if self.trees.is_empty() {
            return Err(AnalyzerError::Model("artifact contains no trees".to_string()));
        }

        let width = self.vocabulary.width();
        for (idx, tree) in self.trees.iter().enumerate() {
            tree.validate(idx, width)?;
        }

        if let Some(importances) = &self.feature_importances {
            if importances.len() != width {
                return Err(AnalyzerError::Model(format!(
                    "{} feature importances for {} features",
                    importances.len(),
                    width
                )));
            }
        }
        Ok(())
    }
}

impl Predictor for ForestModel {
    fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    fn year_scaling(&self) -> YearScaling {
        self.year_scaling
    }

    fn predict_proba(&self, features: &FeatureVector) -> Result<f64> {
        let width = self.vocabulary.width();
        if features.len() != width {
            return Err(AnalyzerError::Model(format!(
                "feature vector has {} values, model expects {}",
                features.len(),
                width
            )));
        }

        if self.trees.is_empty() {
            return Err(AnalyzerError::Model("artifact contains no trees".to_string()));
        }

        let x = features.as_slice();
        let mut total = 0.0;
        for (idx, tree) in self.trees.iter().enumerate() {
            total += tree.evaluate(idx, x)?;
        }
        Ok(total / self.trees.len() as f64)
    }

    fn metrics(&self) -> Option<&ModelMetrics> {
        self.metrics.as_ref()
    }

    fn feature_importances(&self) -> Option<&[f64]> {
        self.feature_importances.as_deref()
    }
}
