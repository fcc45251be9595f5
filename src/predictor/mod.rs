mod forest;

pub use forest::{ForestModel, ModelMetrics, Node, Tree, FORMAT_VERSION};

use crate::error::Result;
use crate::features::{FeatureBuilder, FeatureVector, Vocabulary, YearScaling};

/// A trained classifier returning launch-success probabilities
pub trait Predictor: Send + Sync {
    /// Categorical levels the model was trained on
    fn vocabulary(&self) -> &Vocabulary;

    fn year_scaling(&self) -> YearScaling;

    /// Probability of success in `[0, 1]` for an encoded request
    fn predict_proba(&self, features: &FeatureVector) -> Result<f64>;

    /// Held-out evaluation figures, when the artifact carries them
    fn metrics(&self) -> Option<&ModelMetrics> {
        None
    }

    /// Importance per feature, in vector order
    fn feature_importances(&self) -> Option<&[f64]> {
        None
    }

    fn feature_builder(&self) -> FeatureBuilder<'_> {
        FeatureBuilder::new(self.vocabulary(), self.year_scaling())
    }
}
