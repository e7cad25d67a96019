use anyhow::Context;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{EnvFilter, fmt};

use energy_graph_gateway::shared::infrastructure::graph_store::DriverFactory;
use energy_graph_gateway::shared::infrastructure::graph_store::bolt::BoltDriverFactory;
use energy_graph_gateway::shell::config::{AuthMode, GatewayConfig};
use energy_graph_gateway::shell::graphql::{SchemaSettings, build_schema};
use energy_graph_gateway::shell::http::router;
use energy_graph_gateway::shell::state::{AppState, Drivers};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let config = GatewayConfig::from_env().context("invalid configuration")?;
    let schema = build_schema(SchemaSettings {
        query: config.query_settings(),
        persisted_queries: config.persisted_queries,
    })
    .context("invalid type definitions")?;

    let factory = Arc::new(BoltDriverFactory::new(
        config.bolt_url.clone(),
        config.database.clone(),
        config.pool.clone(),
    ));
    let drivers = match &config.auth {
        AuthMode::Fixed(credentials) => Drivers::Shared(
            factory
                .connect(credentials)
                .await
                .with_context(|| format!("cannot connect to {}", config.bolt_url))?,
        ),
        AuthMode::Bearer => Drivers::PerRequest(factory),
    };

    let state = AppState {
        schema,
        drivers: drivers.clone(),
        error_format: config.error_format,
    };
    let app = router(state, &config.path);

    let listener = TcpListener::bind((config.host.as_str(), config.port))
        .await
        .with_context(|| format!("cannot bind {}:{}", config.host, config.port))?;
    tracing::info!(
        bearer_auth = matches!(config.auth, AuthMode::Bearer),
        database = %config.database,
        "Server ready at http://{}:{}{}",
        config.host,
        config.port,
        config.path
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Drivers::Shared(driver) = drivers
        && let Err(e) = driver.close().await
    {
        tracing::debug!(error = %e, "closing driver failed");
    }
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "cannot listen for shutdown signal");
    }
    tracing::info!("shutting down");
}
