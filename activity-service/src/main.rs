use activity_service::config::ActivityConfig;
use activity_service::services::init_metrics;
use activity_service::startup::Application;
use service_core::observability::init_tracing;
use tokio::signal;

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
            Ok(mut sigterm) => {
                sigterm.recv().await;
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

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let config = match ActivityConfig::load() {
        Ok(config) => config,
        Err(e) => {
            init_tracing("activity-service", "info");
            tracing::error!("Failed to load configuration: {}", e);
            return Err(std::io::Error::other(format!("Configuration error: {}", e)));
        }
    };

    init_tracing("activity-service", &config.common.log_level);
    init_metrics();

    if config.audit.endpoint.is_none() {
        tracing::error!("HUBOT_AUDIT_ENDPOINT not set");
    }

    let application = Application::build(config).await.map_err(|e| {
        tracing::error!("Failed to build application: {}", e);
        std::io::Error::other(format!("Startup error: {}", e))
    })?;

    application.run_with_shutdown(shutdown_signal()).await
}
