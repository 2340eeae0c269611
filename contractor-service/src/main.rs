use contractor_service::config::ContractorConfig;
use contractor_service::services::init_metrics;
use contractor_service::Application;
use service_core::observability::init_tracing;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ContractorConfig::load()?;

    init_tracing(
        "contractor-service",
        &config.common.log_level,
        config.otlp_endpoint.as_deref(),
    );
    init_metrics();

    let application = Application::build(config).await?;
    application.run_until_stopped().await?;

    Ok(())
}
