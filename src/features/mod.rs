//! Numeric encoding of a prediction request.
//!
//! Layout of a [`FeatureVector`] for a vocabulary with `F` families and `O`
//! orbits:
//!
//! ```text
//! 0 .. F-1       one-hot vehicle family, vocabulary order
//! F .. F+O-1     one-hot orbit type, vocabulary order
//! F+O            (year - min) / (max - min)
//! ```
//!
//! Vocabulary order is the training-time order stored with the model and is
//! never re-sorted. The year is not clamped.

use log::trace;
use serde::{Deserialize, Serialize};

use crate::error::{AnalyzerError, Result};
use crate::loader::classify_vehicle;
use crate::types::{OrbitType, VehicleFamily};

/// Categorical levels the classifier was trained on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vocabulary {
    pub families: Vec<String>,
    pub orbits: Vec<String>,
}

impl Vocabulary {
    /// Length of every vector built against this vocabulary
    pub fn width(&self) -> usize {
        self.families.len() + self.orbits.len() + 1
    }

    pub fn family_index(&self, family: &str) -> Option<usize> {
        self.families
            .iter()
            .position(|known| known.eq_ignore_ascii_case(family))
    }

    pub fn orbit_index(&self, orbit: &str) -> Option<usize> {
        self.orbits
            .iter()
            .position(|known| known.eq_ignore_ascii_case(orbit))
    }

    /// Column names in vector order
    pub fn feature_names(&self) -> Vec<String> {
        self.families
            .iter()
            .map(|f| format!("family={}", f))
            .chain(self.orbits.iter().map(|o| format!("orbit={}", o)))
            .chain(std::iter::once("year_scaled".to_string()))
            .collect()
    }
}

/// Min/max bounds of the training years
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct YearScaling {
    pub min: f64,
    pub max: f64,
}

impl YearScaling {
    pub fn scale(&self, year: i32) -> f64 {
        (f64::from(year) - self.min) / (self.max - self.min)
    }
}

/// Fixed-length input of the classifier
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FeatureVector(Vec<f64>);

impl FeatureVector {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn get(&self, index: usize) -> Option<f64> {
        self.0.get(index).copied()
    }
}

impl From<Vec<f64>> for FeatureVector {
    fn from(values: Vec<f64>) -> Self {
        Self(values)
    }
}

/// Encodes `(vehicle, orbit, year)` against a fixed vocabulary
#[derive(Debug, Clone, Copy)]
pub struct FeatureBuilder<'a> {
    vocabulary: &'a Vocabulary,
    scaling: YearScaling,
}

impl<'a> FeatureBuilder<'a> {
    pub fn new(vocabulary: &'a Vocabulary, scaling: YearScaling) -> Self {
        Self { vocabulary, scaling }
    }

    /// Family label for a vehicle input.
    ///
    /// An exact family label wins; otherwise the vehicle name is classified.
    /// Names no family pattern matches are rejected rather than bucketed
    /// into `Other`.
    pub fn resolve_family(vehicle: &str) -> Result<VehicleFamily> {
        VehicleFamily::from_label(vehicle)
            .or_else(|| classify_vehicle(vehicle))
            .ok_or_else(|| AnalyzerError::UnknownCategory {
                field: "vehicle family",
                value: vehicle.trim().to_string(),
            })
    }

    pub fn encode(&self, vehicle: &str, orbit: &str, year: i32) -> Result<FeatureVector> {
        let family = Self::resolve_family(vehicle)?;
        let family_idx = self
            .vocabulary
            .family_index(family.label())
            .ok_or_else(|| AnalyzerError::UnknownCategory {
                field: "vehicle family",
                value: family.label().to_string(),
            })?;

        let orbit = OrbitType::new(orbit);
        let orbit_idx = self
            .vocabulary
            .orbit_index(orbit.as_str())
            .ok_or_else(|| AnalyzerError::UnknownCategory {
                field: "orbit type",
                value: orbit.to_string(),
            })?;

        let families = self.vocabulary.families.len();
        let mut values = vec![0.0; self.vocabulary.width()];
        values[family_idx] = 1.0;
        values[families + orbit_idx] = 1.0;
        values[families + self.vocabulary.orbits.len()] = self.scaling.scale(year);

        trace!("Encoded ({}, {}, {}) as {:?}", family, orbit, year, values);
        Ok(FeatureVector(values))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn vocabulary() -> Vocabulary {
        Vocabulary {
            families: vec!["GSLV".into(), "PSLV".into(), "SLV".into()],
            orbits: vec!["GTO".into(), "LEO".into(), "SSPO".into()],
        }
    }

    const SCALING: YearScaling = YearScaling { min: 1980.0, max: 2020.0 };

    #[test]
    fn test_layout() {
        let vocab = vocabulary();
        let builder = FeatureBuilder::new(&vocab, SCALING);
        let vector = builder.encode("PSLV-C37", "sspo", 2000).unwrap();
        assert_eq!(vector.as_slice(), &[0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.5]);
        assert_eq!(vector.len(), vocab.width());
    }

    #[test]
    fn test_family_label_and_vehicle_name_agree() {
        let vocab = vocabulary();
        let builder = FeatureBuilder::new(&vocab, SCALING);
        assert_eq!(
            builder.encode("GSLV", "GTO", 2010).unwrap(),
            builder.encode("LVM3-M2", "GTO", 2010).unwrap()
        );
    }

    #[test]
    fn test_year_is_not_clamped() {
        let vocab = vocabulary();
        let builder = FeatureBuilder::new(&vocab, SCALING);
        let vector = builder.encode("PSLV", "LEO", 2040).unwrap();
        assert_eq!(vector.get(6), Some(1.5));
    }

    #[test]
    fn test_unknown_levels_are_rejected() {
        let vocab = vocabulary();
        let builder = FeatureBuilder::new(&vocab, SCALING);

        let err = builder.encode("Falcon 9", "LEO", 2020).unwrap_err();
        assert_eq!(err.kind(), "unknown_category");

        // Known family, but absent from this vocabulary
        let err = builder.encode("Other", "LEO", 2020).unwrap_err();
        assert!(err.to_string().contains("Other"), "{}", err);

        let err = builder.encode("PSLV", "Lunar", 2020).unwrap_err();
        assert!(matches!(err, AnalyzerError::UnknownCategory { field: "orbit type", .. }));
    }

    #[test]
    fn test_feature_names() {
        assert_eq!(
            vocabulary().feature_names(),
            vec![
                "family=GSLV",
                "family=PSLV",
                "family=SLV",
                "orbit=GTO",
                "orbit=LEO",
                "orbit=SSPO",
                "year_scaled"
            ]
        );
    }
}
