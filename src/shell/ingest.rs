// Loads the demo dataset into the configured database, replacing its contents.

use anyhow::{Context, bail};
use tracing_subscriber::{EnvFilter, fmt};

use energy_graph_gateway::modules::energy_graph::use_cases::ingest_sample_data::handler::ingest_sample_data;
use energy_graph_gateway::shared::infrastructure::graph_store::bolt::BoltDriverFactory;
use energy_graph_gateway::shared::infrastructure::graph_store::DriverFactory;
use energy_graph_gateway::shell::config::{AuthMode, GatewayConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let config = GatewayConfig::from_env().context("invalid configuration")?;
    let AuthMode::Fixed(credentials) = &config.auth else {
        bail!("sample data ingest needs NEO4J_USER/NEO4J_PASSWORD, not bearer auth");
    };

    let factory = BoltDriverFactory::new(
        config.bolt_url.clone(),
        config.database.clone(),
        config.pool.clone(),
    );
    let driver = factory
        .connect(credentials)
        .await
        .with_context(|| format!("cannot connect to {}", config.bolt_url))?;
    let session = driver.open_session().await?;

    let result = ingest_sample_data(session.as_ref()).await;

    if let Err(e) = session.close().await {
        tracing::debug!(error = %e, "closing session failed");
    }
    if let Err(e) = driver.close().await {
        tracing::debug!(error = %e, "closing driver failed");
    }

    let summary = result.context("sample data ingest failed")?;
    println!(
        "Ingested {} nodes and {} relationships into {}",
        summary.nodes, summary.edges, config.database
    );
    Ok(())
}
