pub mod predict;

pub use predict::{
    HealthIndicators, PatientRecord, PatientV1, PatientV2, PatientV3, Prediction, PredictionV1,
    PredictionV2, PredictionV3,
};
