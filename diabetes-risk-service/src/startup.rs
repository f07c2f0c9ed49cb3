//! Application startup and lifecycle management.

use crate::config::PredictionConfig;
use crate::dtos::{PatientV1, PatientV2, PatientV3};
use crate::handlers;
use crate::models::SchemaRevision;
use crate::services::{ModelHandle, RiskModel};
use axum::{
    middleware::from_fn,
    routing::{get, post, MethodRouter},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::{
    metrics_middleware, request_id_middleware, security_headers_middleware, REQUEST_ID_HEADER,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::trace::TraceLayer;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub service_name: Arc<str>,
    pub revision: SchemaRevision,
    pub model: Arc<dyn RiskModel>,
}

impl AppState {
    pub fn new(
        service_name: impl Into<Arc<str>>,
        revision: SchemaRevision,
        model: Arc<dyn RiskModel>,
    ) -> Self {
        Self {
            service_name: service_name.into(),
            revision,
            model,
        }
    }
}

fn predict_route(revision: SchemaRevision) -> MethodRouter<AppState> {
    match revision {
        SchemaRevision::V1 => post(handlers::predict::<PatientV1>),
        SchemaRevision::V2 => post(handlers::predict::<PatientV2>),
        SchemaRevision::V3 => post(handlers::predict::<PatientV3>),
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .route("/metrics", get(handlers::metrics_endpoint))
        .route("/model", get(handlers::model_info))
        .route("/predict", predict_route(state.revision))
        .layer(from_fn(metrics_middleware))
        .layer(from_fn(security_headers_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get(REQUEST_ID_HEADER)
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            }),
        )
        .layer(from_fn(request_id_middleware))
        .with_state(state)
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    state: AppState,
}

impl Application {
    /// Loads the model, checks it against the configured revision and binds
    /// the listener. Any failure aborts startup.
    pub async fn build(config: PredictionConfig) -> Result<Self, AppError> {
        let revision = config.model.revision;

        let model = ModelHandle::load(&config.model.path).await.map_err(|e| {
            tracing::error!("Failed to load model from {}: {}", config.model.path, e);
            AppError::ConfigError(e.into())
        })?;

        model.ensure_columns(revision.columns()).map_err(|e| {
            tracing::error!("Model {} does not fit schema {}: {}", model.name(), revision, e);
            AppError::ConfigError(e.into())
        })?;

        tracing::info!(
            model = model.name(),
            revision = %revision,
            positive_class_index = model.positive_class_index(),
            "Model loaded"
        );

        let state = AppState::new(config.service_name, revision, Arc::new(model));

        let addr = config.common.bind_addr();
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Listening on {}", port);

        Ok(Self {
            port,
            listener,
            state,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn state(&self) -> AppState {
        self.state.clone()
    }

    /// Serves until SIGINT/SIGTERM, then drains in-flight requests. The
    /// model is released when the state is dropped.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        let router = build_router(self.state);
        axum::serve(self.listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
