pub mod aggregator;
pub mod error;
pub mod features;
pub mod loader;
pub mod predictor;
pub mod service;
pub mod store;
pub mod types;
pub mod utils;

pub use error::{
    AnalyzerError,
    ErrorReport,
    Result,
};

pub use types::{
    AnalyzerConfig,
    MissionRecord,
    MissionTable,
    OrbitType,
    Outcome,
    VehicleFamily,
    YearRange,
};

pub use aggregator::{
    AggregateRow,
    AggregateView,
    CapabilityMatrix,
    ViewName,
};

pub use features::{
    FeatureBuilder,
    FeatureVector,
    Vocabulary,
};

pub use loader::{
    load_dump,
    parse_mission_dump,
};

pub use predictor::{
    ForestModel,
    Predictor,
};

pub use service::MissionAnalyzer;
pub use store::{
    MissionStore,
    Snapshot,
};
