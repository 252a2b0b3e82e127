//! Stripe Event Bridge server binary.

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use stripe_event_bridge::adapters::events::{InMemoryEventBus, RedisEventBus};
use stripe_event_bridge::adapters::http::{app_router, WebhookAppState};
use stripe_event_bridge::adapters::secrets::{CachedSecretProvider, EnvSecretProvider};
use stripe_event_bridge::application::{EventDispatcher, PipelineConfig, WebhookPipeline};
use stripe_event_bridge::config::{AppConfig, BusTransport, ValidationError};
use stripe_event_bridge::domain::webhook::supported_event_types;
use stripe_event_bridge::ports::{EventBus, SecretProvider};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    init_tracing(&config);
    config.validate()?;

    let secrets = build_secret_provider(&config);
    let bus = build_event_bus(&config).await?;

    tracing::info!(
        environment = ?config.server.environment,
        secret_provider = secrets.provider_type(),
        transport = bus.transport(),
        event_bus = %config.bus.event_bus_name,
        event_types = ?supported_event_types(),
        "Starting stripe event bridge"
    );

    let pipeline = WebhookPipeline::new(
        secrets,
        EventDispatcher::new(bus),
        PipelineConfig::from_app_config(&config),
    );
    let app = app_router(
        WebhookAppState::new(Arc::new(pipeline)),
        config.webhook.max_body_bytes,
        std::time::Duration::from_secs(config.server.request_timeout_secs),
    );

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// JSON logs in production, compact text elsewhere. `RUST_LOG` overrides
/// the configured filter.
fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    if config.is_production() {
        builder.json().init();
    } else {
        builder.compact().init();
    }
}

fn build_secret_provider(config: &AppConfig) -> Arc<dyn SecretProvider> {
    let provider: Arc<dyn SecretProvider> = Arc::new(EnvSecretProvider::new(
        &config.secrets.env_var,
        &config.secrets.json_key,
    ));

    match config.secrets.cache_ttl() {
        Some(ttl) => Arc::new(CachedSecretProvider::new(provider, ttl)),
        None => provider,
    }
}

async fn build_event_bus(config: &AppConfig) -> Result<Arc<dyn EventBus>, Box<dyn std::error::Error>> {
    match config.bus.transport {
        BusTransport::Redis => {
            let url = config
                .bus
                .redis_url
                .as_deref()
                .ok_or(ValidationError::MissingRequired("BUS__REDIS_URL"))?;
            Ok(Arc::new(RedisEventBus::connect(url).await?))
        }
        BusTransport::Memory => {
            tracing::warn!("Using in-memory event bus; published events are not delivered anywhere");
            Ok(Arc::new(InMemoryEventBus::new()))
        }
    }
}

/// Wait for SIGTERM or SIGINT signal for graceful shutdown
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
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
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal, shutting down gracefully");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM signal, shutting down gracefully");
        },
    }
}
