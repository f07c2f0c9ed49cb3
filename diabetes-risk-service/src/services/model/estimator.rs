//! Evaluation of validated estimators.

use super::artifact::{
    Estimator, GradientBoosting, LogisticRegression, Stage, StandardScaler, Tree, TreeNode,
};
use super::ModelError;

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

fn invalid(msg: impl Into<String>) -> ModelError {
    ModelError::InvalidArtifact(msg.into())
}

impl StandardScaler {
    fn validate(&self, n_features: usize) -> Result<(), ModelError> {
        if self.mean.len() != n_features || self.scale.len() != n_features {
            return Err(invalid(format!(
                "standard_scaler expects {} features, has mean={} scale={}",
                n_features,
                self.mean.len(),
                self.scale.len()
            )));
        }
        Ok(())
    }

    /// A zero scale leaves the centred value unscaled.
    fn transform(&self, x: &mut [f64]) {
        for ((value, mean), scale) in x.iter_mut().zip(&self.mean).zip(&self.scale) {
            let scale = if *scale == 0.0 { 1.0 } else { *scale };
            *value = (*value - mean) / scale;
        }
    }
}

impl LogisticRegression {
    fn validate(&self, n_features: usize) -> Result<(), ModelError> {
        if self.coefficients.len() != n_features {
            return Err(invalid(format!(
                "logistic_regression expects {} coefficients, has {}",
                n_features,
                self.coefficients.len()
            )));
        }
        Ok(())
    }

    fn decision(&self, x: &[f64]) -> f64 {
        self.coefficients
            .iter()
            .zip(x)
            .map(|(w, v)| w * v)
            .sum::<f64>()
            + self.intercept
    }
}

impl Tree {
    fn validate(&self, n_features: usize) -> Result<(), ModelError> {
        if self.nodes.is_empty() {
            return Err(invalid("tree has no nodes"));
        }
        for (index, node) in self.nodes.iter().enumerate() {
            if let TreeNode::Split {
                feature,
                left,
                right,
                ..
            } = node
            {
                if *feature >= n_features {
                    return Err(invalid(format!(
                        "node {} splits on feature {} of {}",
                        index, feature, n_features
                    )));
                }
                for child in [*left, *right] {
                    if child <= index || child >= self.nodes.len() {
                        return Err(invalid(format!(
                            "node {} has out-of-order child {}",
                            index, child
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    // Terminates because validated children always point forward.
    fn evaluate(&self, x: &[f64]) -> f64 {
        let mut index = 0;
        loop {
            match &self.nodes[index] {
                TreeNode::Leaf { value } => return *value,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    index = if x[*feature] <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }
}

impl GradientBoosting {
    fn validate(&self, n_features: usize) -> Result<(), ModelError> {
        if self.trees.is_empty() {
            return Err(invalid("gradient_boosting has no trees"));
        }
        self.trees.iter().try_for_each(|t| t.validate(n_features))
    }

    fn decision(&self, x: &[f64]) -> f64 {
        self.base_score + self.learning_rate * self.trees.iter().map(|t| t.evaluate(x)).sum::<f64>()
    }
}

/// The final, probability-producing stage.
#[derive(Debug, Clone)]
pub(crate) enum Classifier {
    Logistic(LogisticRegression),
    Boosted(GradientBoosting),
}

impl Classifier {
    pub(crate) fn classes(&self) -> &[i64] {
        match self {
            Classifier::Logistic(m) => &m.classes,
            Classifier::Boosted(m) => &m.classes,
        }
    }

    fn validate(&self, n_features: usize) -> Result<(), ModelError> {
        let classes = self.classes();
        if classes.len() != 2 || classes[0] == classes[1] {
            return Err(ModelError::UnsupportedClasses(classes.to_vec()));
        }
        match self {
            Classifier::Logistic(m) => m.validate(n_features),
            Classifier::Boosted(m) => m.validate(n_features),
        }
    }

    /// Probabilities aligned with [`Classifier::classes`].
    fn predict_proba(&self, x: &[f64]) -> Vec<f64> {
        let z = match self {
            Classifier::Logistic(m) => m.decision(x),
            Classifier::Boosted(m) => m.decision(x),
        };
        let p = sigmoid(z);
        vec![1.0 - p, p]
    }
}

/// Preprocessing stages followed by a classifier, checked against the
/// feature count once at load time.
#[derive(Debug, Clone)]
pub(crate) struct CompiledPipeline {
    transforms: Vec<StandardScaler>,
    classifier: Classifier,
}

impl CompiledPipeline {
    pub(crate) fn compile(estimator: Estimator, n_features: usize) -> Result<Self, ModelError> {
        let (transforms, classifier) = match estimator {
            Estimator::LogisticRegression(m) => (Vec::new(), Classifier::Logistic(m)),
            Estimator::GradientBoosting(m) => (Vec::new(), Classifier::Boosted(m)),
            Estimator::Pipeline(pipeline) => {
                let mut steps = pipeline.steps;
                let (last_name, last) = steps
                    .pop()
                    .ok_or_else(|| invalid("pipeline has no steps"))?;
                let classifier = match last {
                    Stage::LogisticRegression(m) => Classifier::Logistic(m),
                    Stage::GradientBoosting(m) => Classifier::Boosted(m),
                    Stage::StandardScaler(_) => {
                        return Err(invalid(format!(
                            "final pipeline step '{}' is not a classifier",
                            last_name
                        )))
                    }
                };
                let transforms = steps
                    .into_iter()
                    .map(|(name, stage)| match stage {
                        Stage::StandardScaler(s) => Ok(s),
                        _ => Err(invalid(format!(
                            "pipeline step '{}' must be a transformer",
                            name
                        ))),
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                (transforms, classifier)
            }
        };

        transforms
            .iter()
            .try_for_each(|t| t.validate(n_features))?;
        classifier.validate(n_features)?;

        Ok(Self {
            transforms,
            classifier,
        })
    }

    pub(crate) fn classes(&self) -> &[i64] {
        self.classifier.classes()
    }

    pub(crate) fn predict_proba(&self, mut x: Vec<f64>) -> Vec<f64> {
        for transform in &self.transforms {
            transform.transform(&mut x);
        }
        self.classifier.predict_proba(&x)
    }
}
