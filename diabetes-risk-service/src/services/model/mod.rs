//! Model adapter.
//!
//! The trained classifier is loaded once into a [`ModelHandle`] and shared
//! read-only behind the [`RiskModel`] trait. Everything that depends on the
//! artifact's structure (class list lookup, positive class, feature order)
//! is resolved at load time, so a bad artifact fails startup instead of a
//! request.

pub mod artifact;
mod estimator;

use crate::models::FeatureRow;
use artifact::{Estimator, ModelArtifact, Stage};
use estimator::CompiledPipeline;
use service_core::error::AppError;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Label value of the positive (prediabetes/diabetes) class.
pub const POSITIVE_LABEL: i64 = 1;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Failed to read model artifact {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed model artifact: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid model artifact: {0}")]
    InvalidArtifact(String),

    #[error("Only binary classifiers are supported, got classes {0:?}")]
    UnsupportedClasses(Vec<i64>),

    #[error("Positive class label 1 not found in model classes {0:?}")]
    PositiveClassMissing(Vec<i64>),

    #[error("Declared classes {declared:?} do not match estimator classes {estimator:?}")]
    ClassMismatch {
        declared: Vec<i64>,
        estimator: Vec<i64>,
    },

    #[error("Model features do not match schema: missing {missing:?}, unexpected {unexpected:?}")]
    FeatureMismatch {
        missing: Vec<String>,
        unexpected: Vec<String>,
    },

    #[error("Feature '{0}' missing from request row")]
    MissingFeature(String),

    #[error("Feature '{0}' is not a finite number")]
    NonFiniteFeature(String),
}

impl From<ModelError> for AppError {
    fn from(err: ModelError) -> Self {
        match err {
            ModelError::NonFiniteFeature(_) => AppError::BadRequest(anyhow::Error::new(err)),
            _ => AppError::InternalError(anyhow::Error::new(err)),
        }
    }
}

/// The single interface handlers use to run inference.
pub trait RiskModel: Send + Sync {
    fn name(&self) -> &str;

    fn feature_names(&self) -> &[String];

    fn classes(&self) -> &[i64];

    /// Index of [`POSITIVE_LABEL`] in [`RiskModel::classes`].
    fn positive_class_index(&self) -> usize;

    fn predict(&self, row: &FeatureRow) -> Result<i64, ModelError>;

    /// Probabilities aligned with [`RiskModel::classes`].
    fn predict_probability(&self, row: &FeatureRow) -> Result<Vec<f64>, ModelError>;

    fn positive_probability(&self, row: &FeatureRow) -> Result<f64, ModelError> {
        let proba = self.predict_probability(row)?;
        proba
            .get(self.positive_class_index())
            .copied()
            .ok_or_else(|| ModelError::PositiveClassMissing(self.classes().to_vec()))
    }
}

/// A loaded, validated model artifact.
#[derive(Debug, Clone)]
pub struct ModelHandle {
    name: String,
    feature_names: Vec<String>,
    classes: Vec<i64>,
    positive_index: usize,
    pipeline: CompiledPipeline,
}

impl ModelHandle {
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, ModelError> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await.map_err(|source| ModelError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_slice(&bytes)
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, ModelError> {
        let artifact: ModelArtifact = serde_json::from_slice(bytes)?;
        Self::from_artifact(artifact)
    }

    pub fn from_artifact(artifact: ModelArtifact) -> Result<Self, ModelError> {
        if artifact.feature_names.is_empty() {
            return Err(ModelError::InvalidArtifact(
                "feature_names is empty".to_string(),
            ));
        }

        let declared = artifact.classes.clone().or_else(|| {
            // Fall back to the final stage when the top level has no class list.
            final_stage_classes(&artifact.estimator).map(|c| c.to_vec())
        });

        let pipeline = CompiledPipeline::compile(artifact.estimator, artifact.feature_names.len())?;
        let classes = declared.unwrap_or_else(|| pipeline.classes().to_vec());
        if classes != pipeline.classes() {
            return Err(ModelError::ClassMismatch {
                declared: classes,
                estimator: pipeline.classes().to_vec(),
            });
        }

        let positive_index = classes
            .iter()
            .position(|c| *c == POSITIVE_LABEL)
            .ok_or_else(|| ModelError::PositiveClassMissing(classes.clone()))?;

        Ok(Self {
            name: artifact.name,
            feature_names: artifact.feature_names,
            classes,
            positive_index,
            pipeline,
        })
    }

    /// Checks that the model consumes exactly `columns`, in any order.
    pub fn ensure_columns(&self, columns: &[&str]) -> Result<(), ModelError> {
        let missing: Vec<String> = columns
            .iter()
            .filter(|c| !self.feature_names.iter().any(|f| f == *c))
            .map(|c| c.to_string())
            .collect();
        let unexpected: Vec<String> = self
            .feature_names
            .iter()
            .filter(|f| !columns.contains(&f.as_str()))
            .cloned()
            .collect();

        if missing.is_empty() && unexpected.is_empty() {
            Ok(())
        } else {
            Err(ModelError::FeatureMismatch {
                missing,
                unexpected,
            })
        }
    }

    fn vectorize(&self, row: &FeatureRow) -> Result<Vec<f64>, ModelError> {
        self.feature_names
            .iter()
            .map(|name| {
                let value = row
                    .get(name)
                    .ok_or_else(|| ModelError::MissingFeature(name.clone()))?;
                if value.is_finite() {
                    Ok(value)
                } else {
                    Err(ModelError::NonFiniteFeature(name.clone()))
                }
            })
            .collect()
    }
}

fn final_stage_classes(estimator: &Estimator) -> Option<&[i64]> {
    match estimator {
        Estimator::LogisticRegression(m) => Some(&m.classes),
        Estimator::GradientBoosting(m) => Some(&m.classes),
        Estimator::Pipeline(p) => match p.steps.last().map(|(_, stage)| stage) {
            Some(Stage::LogisticRegression(m)) => Some(&m.classes),
            Some(Stage::GradientBoosting(m)) => Some(&m.classes),
            _ => None,
        },
    }
}

impl RiskModel for ModelHandle {
    fn name(&self) -> &str {
        &self.name
    }

    fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    fn classes(&self) -> &[i64] {
        &self.classes
    }

    fn positive_class_index(&self) -> usize {
        self.positive_index
    }

    fn predict(&self, row: &FeatureRow) -> Result<i64, ModelError> {
        let proba = self.predict_probability(row)?;
        // First maximum wins on ties.
        let best = proba
            .iter()
            .enumerate()
            .fold(0, |best, (i, p)| if *p > proba[best] { i } else { best });
        Ok(self.classes[best])
    }

    fn predict_probability(&self, row: &FeatureRow) -> Result<Vec<f64>, ModelError> {
        let x = self.vectorize(row)?;
        Ok(self.pipeline.predict_proba(x))
    }
}
