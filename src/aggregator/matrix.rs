use std::collections::{BTreeMap, BTreeSet};

use serde::{Serialize, Serializer};

use crate::types::MissionTable;

/// Launch counts per observed (vehicle family, orbit) pair.
///
/// Sparse: pairs that never flew are absent and read as zero.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapabilityMatrix {
    counts: BTreeMap<(String, String), usize>,
}

/// One edge of the matrix in source/target/value form
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatrixLink {
    pub source: String,
    pub target: String,
    pub value: usize,
}

impl CapabilityMatrix {
    pub fn from_table(table: &MissionTable) -> Self {
        let mut counts = BTreeMap::new();
        for record in table {
            *counts
                .entry((record.family.label().to_string(), record.orbit.to_string()))
                .or_insert(0) += 1;
        }
        Self { counts }
    }

    /// Count for an observed pair
    pub fn count(&self, family: &str, orbit: &str) -> Option<usize> {
        self.counts
            .get(&(family.to_string(), orbit.to_string()))
            .copied()
    }

    pub fn count_or_zero(&self, family: &str, orbit: &str) -> usize {
        self.count(family, orbit).unwrap_or(0)
    }

    /// Number of observed pairs
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn families(&self) -> BTreeSet<&str> {
        self.counts.keys().map(|(family, _)| family.as_str()).collect()
    }

    pub fn orbits(&self) -> BTreeSet<&str> {
        self.counts.keys().map(|(_, orbit)| orbit.as_str()).collect()
    }

    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    pub fn links(&self) -> Vec<MatrixLink> {
        self.counts
            .iter()
            .map(|((family, orbit), count)| MatrixLink {
                source: family.clone(),
                target: orbit.clone(),
                value: *count,
            })
            .collect()
    }
}

impl Serialize for CapabilityMatrix {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_seq(self.links())
    }
}
