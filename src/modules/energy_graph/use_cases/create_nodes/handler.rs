use serde_json::Value;

use crate::modules::energy_graph::core::errors::GatewayError;
use crate::modules::energy_graph::core::type_defs::{RelationshipDef, TypeDefError};
use crate::modules::energy_graph::use_cases::create_nodes::command::CreateNode;
use crate::shared::infrastructure::graph_store::{
    Direction, GraphSession, NewEdge, NodeQuery, NodeRecord,
};

/// Creates the node, then one edge per connected parent.
///
/// Every parent is looked up before anything is written, so a missing parent
/// leaves the graph untouched.
pub async fn create_node(
    session: &dyn GraphSession,
    command: CreateNode,
) -> Result<NodeRecord, GatewayError> {
    let def = command.node;
    def.validate_properties(&command.properties)?;
    let id = command
        .properties
        .get("id")
        .and_then(Value::as_i64)
        .ok_or(TypeDefError::MissingProperty {
            label: def.label,
            property: "id",
        })?;

    let mut edges = Vec::with_capacity(command.connect.len());
    for connect in &command.connect {
        let rel = def
            .relationship(connect.field)
            .ok_or(TypeDefError::UnknownRelationship {
                label: def.label,
                field: connect.field,
            })?;
        let parents = session
            .find_nodes(&NodeQuery::with_id(rel.target, connect.target_id))
            .await?;
        if parents.is_empty() {
            return Err(GatewayError::NotFound {
                label: rel.target,
                id: connect.target_id,
            });
        }
        edges.push(edge_for(def.label, id, rel, connect.target_id));
    }

    let record = session.create_node(def.label, command.properties).await?;
    for edge in &edges {
        session.create_edge(edge).await?;
    }
    tracing::info!(label = def.label, id, edges = edges.len(), "node created");
    Ok(record)
}

fn edge_for(label: &str, id: i64, rel: &RelationshipDef, target_id: i64) -> NewEdge {
    match rel.direction {
        Direction::Out => NewEdge {
            from_label: label.to_string(),
            from_id: id,
            rel_type: rel.rel_type.to_string(),
            to_label: rel.target.to_string(),
            to_id: target_id,
        },
        Direction::In => NewEdge {
            from_label: rel.target.to_string(),
            from_id: target_id,
            rel_type: rel.rel_type.to_string(),
            to_label: label.to_string(),
            to_id: id,
        },
    }
}
