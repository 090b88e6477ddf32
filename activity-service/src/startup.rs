//! Application startup and lifecycle management.
//!
//! Wires the plugin (store provider, activity consumer, report generator,
//! chat commands) onto an [`HttpHost`] and serves it over axum.

use crate::config::ActivityConfig;
use crate::handlers::{
    health_check, metrics_endpoint, publish_activity, readiness_check, receive_message,
};
use crate::host::{BotHost, HttpHost};
use crate::services::{
    ActivityConsumer, CommandRouter, MessageCatalog, ReportGenerator, StoreClientProvider,
};
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::{metrics_middleware, request_id_middleware};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ActivityConfig,
    pub host: Arc<HttpHost>,
    pub consumer: Arc<ActivityConsumer>,
    pub commands: Arc<CommandRouter>,
}

impl AppState {
    /// Wire the plugin onto a fresh [`HttpHost`] and try to start auditing.
    pub fn new(
        config: ActivityConfig,
        provider: Arc<StoreClientProvider>,
    ) -> Result<Self, AppError> {
        let catalog = Arc::new(MessageCatalog::english().map_err(|e| {
            tracing::error!("Failed to load message catalog: {}", e);
            AppError::ConfigError(anyhow::anyhow!("Invalid message catalog: {}", e))
        })?);

        let host = Arc::new(HttpHost::new(
            config.bot.name.clone(),
            config.bot.adapter.clone(),
        ));
        let consumer = Arc::new(ActivityConsumer::new(&config.audit, provider));

        // A failed attempt here is retried on every incoming chat message.
        let bot_host: Arc<dyn BotHost> = host.clone();
        if let Err(e) = consumer.init(bot_host) {
            tracing::warn!("Activity auditing not started: {}", e);
        }

        let reports = Arc::new(ReportGenerator::new(
            consumer.clone(),
            catalog.clone(),
            config.chart.clone(),
        ));
        let commands = Arc::new(
            CommandRouter::new(&config.bot.name, reports, catalog).map_err(|e| {
                tracing::error!("Failed to compile chat command patterns: {}", e);
                AppError::ConfigError(anyhow::anyhow!("Invalid bot name pattern: {}", e))
            })?,
        );

        Ok(Self {
            config,
            host,
            consumer,
            commands,
        })
    }
}

/// Application container for managing server lifecycle.
pub struct Application {
    http_port: u16,
    http_listener: TcpListener,
    state: AppState,
}

impl Application {
    /// Build the application with the given configuration.
    pub async fn build(config: ActivityConfig) -> Result<Self, AppError> {
        let provider = Arc::new(StoreClientProvider::new(config.audit.endpoint.clone()));
        Self::build_with_provider(config, provider).await
    }

    /// Build the application around an existing store client provider.
    pub async fn build_with_provider(
        config: ActivityConfig,
        provider: Arc<StoreClientProvider>,
    ) -> Result<Self, AppError> {
        let state = AppState::new(config.clone(), provider)?;

        // Bind HTTP listener (port 0 = random port for testing)
        let http_addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let http_listener = TcpListener::bind(http_addr).await.map_err(|e| {
            tracing::error!("Failed to bind HTTP listener to {}: {}", http_addr, e);
            AppError::from(e)
        })?;
        let http_port = http_listener.local_addr()?.port();

        tracing::info!(
            bot = %config.bot.name,
            auditing = state.consumer.is_active(),
            "Activity service: HTTP on port {}",
            http_port
        );

        Ok(Self {
            http_port,
            http_listener,
            state,
        })
    }

    /// Get the HTTP port the server is listening on.
    pub fn http_port(&self) -> u16 {
        self.http_port
    }

    /// Run the application until stopped.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        self.run_with_shutdown(std::future::pending()).await
    }

    /// Run the application until `shutdown` resolves, then drain in-flight
    /// requests.
    pub async fn run_with_shutdown<F>(self, shutdown: F) -> std::io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let router = build_router(self.state);

        axum::serve(self.http_listener, router)
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| {
                tracing::error!("HTTP server error: {}", e);
                std::io::Error::other(format!("HTTP server error: {}", e))
            })
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        .route("/metrics", get(metrics_endpoint))
        .route("/api/v1/activity", post(publish_activity))
        .route("/api/v1/messages", post(receive_message))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::DEBUG)),
        )
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(request_id_middleware))
        .with_state(state)
}
