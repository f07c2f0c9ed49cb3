use diabetes_risk_service::config::PredictionConfig;
use diabetes_risk_service::services::init_metrics;
use diabetes_risk_service::Application;
use service_core::observability::{init_tracing, shutdown_tracing};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = PredictionConfig::load().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        anyhow::anyhow!("Configuration error: {}", e)
    })?;

    init_tracing(
        &config.service_name,
        &config.log_level,
        config.otlp_endpoint.as_deref(),
    );

    // Initialize metrics recorder (must be before any metrics are recorded)
    init_metrics();

    let application = Application::build(config).await?;
    application.run_until_stopped().await?;

    tracing::info!("Server stopped");
    shutdown_tracing();

    Ok(())
}
