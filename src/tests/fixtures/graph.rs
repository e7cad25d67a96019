use rstest::fixture;
use std::sync::Arc;

use crate::modules::energy_graph::use_cases::ingest_sample_data::handler::ingest_sample_data;
use crate::shared::infrastructure::graph_store::in_memory::InMemoryGraph;
use crate::shared::infrastructure::graph_store::{Credentials, DriverFactory, GraphSession};

pub struct SeededGraph {
    pub graph: InMemoryGraph,
    pub session: Arc<dyn GraphSession>,
}

/// Loads the demo dataset through a driver and session that are closed again,
/// so lifecycle counters start balanced.
pub async fn seed(graph: &InMemoryGraph) {
    let driver = graph.connect(&Credentials::default()).await.unwrap();
    let session = driver.open_session().await.unwrap();
    ingest_sample_data(session.as_ref()).await.unwrap();
    session.close().await.unwrap();
    driver.close().await.unwrap();
}

/// Demo dataset plus an open session on it.
#[fixture]
pub async fn seeded_graph() -> SeededGraph {
    let graph = InMemoryGraph::new();
    seed(&graph).await;
    let driver = graph.connect(&Credentials::default()).await.unwrap();
    let session = driver.open_session().await.unwrap();
    SeededGraph { graph, session }
}
