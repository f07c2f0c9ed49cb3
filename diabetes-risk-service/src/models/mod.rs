pub mod clinical;
pub mod features;
pub mod revision;

pub use clinical::{body_mass_index, round2, BmiCategory, RiskLevel, RISK_THRESHOLD};
pub use features::FeatureRow;
pub use revision::SchemaRevision;
