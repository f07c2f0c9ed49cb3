pub mod metrics;
pub mod model;

pub use metrics::{get_metrics, init_metrics, record_prediction};
pub use model::{ModelError, ModelHandle, RiskModel};
