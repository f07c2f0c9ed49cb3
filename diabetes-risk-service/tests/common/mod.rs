//! Common test utilities for diabetes-risk-service integration tests.

#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use diabetes_risk_service::config::{ModelConfig, PredictionConfig};
use diabetes_risk_service::models::{FeatureRow, SchemaRevision};
use diabetes_risk_service::services::{ModelError, ModelHandle, RiskModel};
use diabetes_risk_service::{build_router, AppState, Application};
use serde_json::{json, Value};
use service_core::config::Config as CoreConfig;
use std::sync::{Arc, Once};
use tower::ServiceExt;

static INIT: Once = Once::new();

pub const SERVICE_NAME: &str = "diabetes-risk-service-test";

/// Initialize tracing for tests (only once).
pub fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter("info,diabetes_risk_service=debug")
            .with_test_writer()
            .try_init()
            .ok();
    });
}

pub fn fixture_path(revision: SchemaRevision) -> String {
    format!(
        "{}/tests/fixtures/model_{}.json",
        env!("CARGO_MANIFEST_DIR"),
        revision.as_str()
    )
}

pub fn test_config(revision: SchemaRevision) -> PredictionConfig {
    PredictionConfig {
        common: CoreConfig { port: 0 },
        service_name: SERVICE_NAME.to_string(),
        log_level: "debug".to_string(),
        otlp_endpoint: None,
        model: ModelConfig {
            path: fixture_path(revision),
            revision,
        },
    }
}

/// Router backed by the fixture model for `revision`.
pub async fn fixture_router(revision: SchemaRevision) -> Router {
    init_tracing();
    let model = ModelHandle::load(fixture_path(revision))
        .await
        .expect("Failed to load fixture model");
    build_router(AppState::new(SERVICE_NAME, revision, Arc::new(model)))
}

/// Router backed by a model that always returns `probability` for label 1.
pub fn stub_router(revision: SchemaRevision, probability: f64) -> Router {
    init_tracing();
    let model = FixedProbabilityModel::new(revision, probability);
    build_router(AppState::new(SERVICE_NAME, revision, Arc::new(model)))
}

pub struct FixedProbabilityModel {
    feature_names: Vec<String>,
    probability: f64,
}

impl FixedProbabilityModel {
    pub fn new(revision: SchemaRevision, probability: f64) -> Self {
        Self {
            feature_names: revision.columns().iter().map(|c| c.to_string()).collect(),
            probability,
        }
    }
}

impl RiskModel for FixedProbabilityModel {
    fn name(&self) -> &str {
        "fixed_probability"
    }

    fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    fn classes(&self) -> &[i64] {
        &[0, 1]
    }

    fn positive_class_index(&self) -> usize {
        1
    }

    fn predict(&self, _row: &FeatureRow) -> Result<i64, ModelError> {
        Ok(if self.probability > 0.5 { 1 } else { 0 })
    }

    fn predict_probability(&self, _row: &FeatureRow) -> Result<Vec<f64>, ModelError> {
        Ok(vec![1.0 - self.probability, self.probability])
    }
}

pub fn base_payload() -> Value {
    json!({
        "GenHlth": 3,
        "MentHlth": 5,
        "PhysHlth": 2,
        "HighBP": 1,
        "DiffWalk": 0,
        "HighChol": 1,
        "HeartDiseaseorAttack": 0,
        "Stroke": 0,
        "PhysActivity": 1,
        "HvyAlcoholConsump": 0,
        "CholCheck": 1,
        "Smoker": 0,
        "Age": 9,
        "Income": 6
    })
}

pub fn payload(revision: SchemaRevision) -> Value {
    let mut payload = base_payload();
    match revision {
        SchemaRevision::V1 => {
            payload["BMI"] = json!(27.5);
        }
        SchemaRevision::V2 => {
            payload["Peso"] = json!(80);
            payload["Altura"] = json!(160);
        }
        SchemaRevision::V3 => {
            payload["Peso"] = json!(80);
            payload["Altura"] = json!(160);
            payload["Education"] = json!(4);
        }
    }
    payload
}

/// POSTs `body` to `/predict` and returns the status and parsed JSON body.
pub async fn post_predict(router: Router, body: &Value) -> (StatusCode, Value) {
    let response = router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/predict")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

pub async fn get_json(router: Router, uri: &str) -> (StatusCode, Value) {
    let response = router
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

pub struct TestApp {
    pub address: String,
    pub port: u16,
}

impl TestApp {
    pub async fn spawn(revision: SchemaRevision) -> Self {
        init_tracing();

        let app = Application::build(test_config(revision))
            .await
            .expect("Failed to build test application");

        let port = app.port();
        let address = format!("http://127.0.0.1:{}", port);

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        // Wait for server to be ready by polling health endpoint
        let client = reqwest::Client::new();
        let health_url = format!("{}/health", address);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
        }

        TestApp { address, port }
    }
}
