use crate::models::SchemaRevision;
use serde::Deserialize;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;

const DEFAULT_SERVICE_NAME: &str = "diabetes-risk-service";
const DEFAULT_MODEL_PATH: &str = "artifacts/diabetes_model_v2.json";

#[derive(Debug, Clone, Deserialize)]
pub struct PredictionConfig {
    #[serde(flatten)]
    pub common: core_config::Config,
    pub service_name: String,
    pub log_level: String,
    pub otlp_endpoint: Option<String>,
    pub model: ModelConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModelConfig {
    /// Path to the JSON model artifact.
    pub path: String,
    /// Request/response shape served on `/predict`. The artifact's features
    /// must match this revision's columns.
    pub revision: SchemaRevision,
}

impl PredictionConfig {
    pub fn load() -> Result<Self, AppError> {
        // Load common config (handles .env and APP__ prefix)
        let common_config = core_config::Config::load()?;

        Self::from_lookup(common_config, |key| env::var(key).ok())
    }

    /// Builds the service settings from `lookup`. In production only
    /// `MODEL_PATH` must be set explicitly.
    fn from_lookup(
        common: core_config::Config,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, AppError> {
        let is_prod = lookup("ENVIRONMENT").unwrap_or_else(|| "dev".to_string()) == "prod";

        Ok(PredictionConfig {
            common,
            service_name: get_env(&lookup, "SERVICE_NAME", Some(DEFAULT_SERVICE_NAME), false)?,
            log_level: get_env(&lookup, "LOG_LEVEL", Some("info"), false)?,
            otlp_endpoint: lookup("OTLP_ENDPOINT").filter(|s| !s.is_empty()),
            model: ModelConfig {
                path: get_env(&lookup, "MODEL_PATH", Some(DEFAULT_MODEL_PATH), is_prod)?,
                revision: get_env(&lookup, "SCHEMA_REVISION", Some("v2"), false)?
                    .parse()
                    .map_err(|e: String| AppError::ConfigError(anyhow::anyhow!(e)))?,
            },
        })
    }
}

fn get_env(
    lookup: impl Fn(&str) -> Option<String>,
    key: &str,
    default: Option<&str>,
    is_prod: bool,
) -> Result<String, AppError> {
    match lookup(key) {
        Some(val) => Ok(val),
        None => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(format!(
                    "{} is required in production but not set",
                    key
                ))))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(format!(
                    "{} is required but not set",
                    key
                ))))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    fn build(pairs: &[(&str, &str)]) -> Result<PredictionConfig, AppError> {
        PredictionConfig::from_lookup(core_config::Config { port: 0 }, vars(pairs))
    }

    #[test]
    fn test_get_env_uses_default_outside_prod() {
        let value = get_env(vars(&[]), "SERVICE_NAME", Some("fallback"), false).unwrap();
        assert_eq!(value, "fallback");
    }

    #[test]
    fn test_get_env_requires_value_in_prod() {
        let err = get_env(vars(&[]), "MODEL_PATH", Some("fallback"), true).unwrap_err();
        assert!(matches!(err, AppError::ConfigError(_)));
    }

    #[test]
    fn test_get_env_without_default_fails() {
        assert!(get_env(vars(&[]), "MODEL_PATH", None, false).is_err());
    }

    #[test]
    fn test_defaults_outside_prod() {
        let config = build(&[]).unwrap();
        assert_eq!(config.service_name, "diabetes-risk-service");
        assert_eq!(config.log_level, "info");
        assert_eq!(config.otlp_endpoint, None);
        assert_eq!(config.model.path, "artifacts/diabetes_model_v2.json");
        assert_eq!(config.model.revision, SchemaRevision::V2);
    }

    #[test]
    fn test_prod_requires_only_model_path() {
        let err = build(&[("ENVIRONMENT", "prod")]).unwrap_err();
        assert!(err.to_string().contains("MODEL_PATH"));

        let config = build(&[
            ("ENVIRONMENT", "prod"),
            ("MODEL_PATH", "/srv/models/diabetes_v3.json"),
        ])
        .unwrap();
        assert_eq!(config.model.path, "/srv/models/diabetes_v3.json");
        assert_eq!(config.service_name, "diabetes-risk-service");
        assert_eq!(config.model.revision, SchemaRevision::V2);
    }

    #[test]
    fn test_overrides_and_blank_otlp_endpoint() {
        let config = build(&[
            ("SERVICE_NAME", "risk-api"),
            ("SCHEMA_REVISION", "v3"),
            ("OTLP_ENDPOINT", ""),
        ])
        .unwrap();
        assert_eq!(config.service_name, "risk-api");
        assert_eq!(config.model.revision, SchemaRevision::V3);
        assert_eq!(config.otlp_endpoint, None);
    }

    #[test]
    fn test_unknown_revision_is_config_error() {
        let err = build(&[("SCHEMA_REVISION", "v9")]).unwrap_err();
        assert!(matches!(err, AppError::ConfigError(_)));
    }
}
