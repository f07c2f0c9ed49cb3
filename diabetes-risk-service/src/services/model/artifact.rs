//! On-disk model artifact format.
//!
//! An artifact is a JSON document describing an already trained binary
//! classifier, optionally preceded by preprocessing stages:
//!
//! ```json
//! {
//!   "name": "lightgbm_model_sf",
//!   "feature_names": ["GenHlth", "MentHlth", "..."],
//!   "estimator": {
//!     "type": "pipeline",
//!     "steps": [
//!       ["scaler", { "type": "standard_scaler", "mean": [...], "scale": [...] }],
//!       ["trained_model", { "type": "logistic_regression", "classes": [0, 1], ... }]
//!     ]
//!   }
//! }
//! ```
//!
//! The class list is read from the top-level `classes` when present, and
//! from the final stage otherwise.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub name: String,
    pub feature_names: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classes: Option<Vec<i64>>,
    pub estimator: Estimator,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Estimator {
    LogisticRegression(LogisticRegression),
    GradientBoosting(GradientBoosting),
    Pipeline(Pipeline),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pipeline {
    /// `(name, stage)` pairs applied in order.
    pub steps: Vec<(String, Stage)>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Stage {
    StandardScaler(StandardScaler),
    LogisticRegression(LogisticRegression),
    GradientBoosting(GradientBoosting),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

/// Binary logistic regression. The decision function scores `classes[1]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticRegression {
    pub classes: Vec<i64>,
    pub coefficients: Vec<f64>,
    pub intercept: f64,
}

/// Binary gradient-boosted trees with a logistic link.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradientBoosting {
    pub classes: Vec<i64>,
    #[serde(default)]
    pub base_score: f64,
    #[serde(default = "default_learning_rate")]
    pub learning_rate: f64,
    pub trees: Vec<Tree>,
}

fn default_learning_rate() -> f64 {
    1.0
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tree {
    /// Node 0 is the root. Children always have a larger index than their
    /// parent.
    pub nodes: Vec<TreeNode>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TreeNode {
    /// Goes to `left` when `x[feature] <= threshold`.
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: f64,
    },
}
