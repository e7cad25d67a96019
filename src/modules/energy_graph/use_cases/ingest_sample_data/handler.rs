// Loads the demo dataset: two office buildings with their devices, meters and
// readings. The graph is cleared first so repeated runs start from the same state.

use crate::modules::energy_graph::core::errors::GatewayError;
use crate::modules::energy_graph::use_cases::create_nodes::command::{
    CreateBuilding, CreateDevice, CreateMeter, CreateNode, CreateReading,
};
use crate::modules::energy_graph::use_cases::create_nodes::handler::create_node;
use crate::shared::infrastructure::graph_store::GraphSession;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IngestSummary {
    pub nodes: usize,
    pub edges: usize,
}

fn sample_data() -> Result<Vec<CreateNode>, GatewayError> {
    let mut buildings: Vec<CreateNode> = vec![
        CreateBuilding {
            id: 1,
            name: "Office Building A".into(),
            address: "123 Main St".into(),
        }
        .into(),
        CreateBuilding {
            id: 2,
            name: "Office Building B".into(),
            address: "456 Oak Ave".into(),
        }
        .into(),
    ];
    for (building, consumption) in buildings.iter_mut().zip([1500.0, 2000.0]) {
        building
            .properties
            .insert("totalEnergyConsumption".into(), Value::from(consumption));
    }

    let mut devices: Vec<CreateNode> = vec![
        CreateNode::try_from(CreateDevice {
            id: 1,
            name: "HVAC System 1".into(),
            kind: "HVAC".into(),
            building_id: "1".into(),
        })?,
        CreateNode::try_from(CreateDevice {
            id: 2,
            name: "Lighting System 1".into(),
            kind: "Lighting".into(),
            building_id: "1".into(),
        })?,
    ];
    for (device, consumption) in devices.iter_mut().zip([500.0, 200.0]) {
        device
            .properties
            .insert("powerConsumption".into(), Value::from(consumption));
        device
            .properties
            .insert("status".into(), Value::from("active"));
    }

    let meters: Vec<CreateNode> = vec![
        CreateNode::try_from(CreateMeter {
            id: 1,
            serial_number: "MTR001".into(),
            kind: "Electric".into(),
            building_id: "1".into(),
        })?,
        CreateNode::try_from(CreateMeter {
            id: 2,
            serial_number: "MTR002".into(),
            kind: "Water".into(),
            building_id: "2".into(),
        })?,
    ];

    let readings: Vec<CreateNode> = vec![
        CreateNode::try_from(CreateReading {
            id: 1,
            value: 450.0,
            unit: "kWh".into(),
            device_id: Some("1".into()),
            meter_id: None,
        })?,
        CreateNode::try_from(CreateReading {
            id: 2,
            value: 180.0,
            unit: "kWh".into(),
            device_id: Some("2".into()),
            meter_id: None,
        })?,
    ];

    Ok(buildings
        .into_iter()
        .chain(devices)
        .chain(meters)
        .chain(readings)
        .collect())
}

pub async fn ingest_sample_data(session: &dyn GraphSession) -> Result<IngestSummary, GatewayError> {
    session.clear().await?;
    let mut summary = IngestSummary::default();
    for command in sample_data()? {
        summary.edges += command.connect.len();
        create_node(session, command).await?;
        summary.nodes += 1;
    }
    tracing::info!(nodes = summary.nodes, edges = summary.edges, "sample data ingested");
    Ok(summary)
}
