use crate::modules::energy_graph::core::errors::GatewayError;
use crate::modules::energy_graph::core::nodes::GraphNode;
use crate::shared::infrastructure::graph_store::{GraphSession, NodeQuery};

pub async fn find_nodes<T: GraphNode>(
    session: &dyn GraphSession,
    query: &NodeQuery,
) -> Result<Vec<T>, GatewayError> {
    let records = session.find_nodes(query).await?;
    T::from_records(records)
}
