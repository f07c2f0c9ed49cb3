mod common;

use common::{fixture_path, test_config};
use diabetes_risk_service::models::SchemaRevision;
use diabetes_risk_service::services::{ModelError, ModelHandle, RiskModel};
use diabetes_risk_service::Application;
use service_core::error::AppError;

#[tokio::test]
async fn fixtures_match_their_revisions() {
    for revision in [SchemaRevision::V1, SchemaRevision::V2, SchemaRevision::V3] {
        let model = ModelHandle::load(fixture_path(revision)).await.unwrap();
        model
            .ensure_columns(revision.columns())
            .unwrap_or_else(|e| panic!("{} fixture: {}", revision, e));
        assert_eq!(model.classes()[model.positive_class_index()], 1);
    }
}

#[tokio::test]
async fn bundled_artifact_loads() {
    let path = format!(
        "{}/artifacts/diabetes_model_v2.json",
        env!("CARGO_MANIFEST_DIR")
    );
    let model = ModelHandle::load(path).await.unwrap();
    assert!(model.ensure_columns(SchemaRevision::V2.columns()).is_ok());
}

#[tokio::test]
async fn startup_fails_when_model_does_not_fit_revision() {
    // The revision 3 model needs Education, which revision 2 never sends.
    let mut config = test_config(SchemaRevision::V2);
    config.model.path = fixture_path(SchemaRevision::V3);

    let result = Application::build(config).await;
    assert!(matches!(result, Err(AppError::ConfigError(_))));
}

#[tokio::test]
async fn startup_fails_when_model_is_missing() {
    let mut config = test_config(SchemaRevision::V2);
    config.model.path = "does/not/exist.json".to_string();

    assert!(Application::build(config).await.is_err());
}

#[test]
fn artifact_without_positive_class_is_rejected() {
    let artifact = serde_json::json!({
        "name": "relabelled",
        "feature_names": ["BMI"],
        "estimator": {
            "type": "pipeline",
            "steps": [
                ["trained_model", {
                    "type": "logistic_regression",
                    "classes": [0, 2],
                    "coefficients": [0.1],
                    "intercept": 0.0
                }]
            ]
        }
    });

    let err = ModelHandle::from_slice(artifact.to_string().as_bytes()).unwrap_err();
    assert!(matches!(err, ModelError::PositiveClassMissing(_)));
}
