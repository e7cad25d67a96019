// Create commands as received from the mutation arguments, and their
// translation into a label-agnostic CreateNode.
//
// Related ids arrive as GraphQL `ID` strings and must parse as integers.

use serde_json::{Value, json};

use crate::modules::energy_graph::core::errors::{GatewayError, parse_id};
use crate::modules::energy_graph::core::type_defs::{
    BUILDING, DEVICE, METER, NodeTypeDef, READING,
};
use crate::shared::infrastructure::graph_store::Properties;

#[derive(Debug, Clone, PartialEq)]
pub struct Connect {
    /// Relationship field on the node being created.
    pub field: &'static str,
    pub target_id: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateNode {
    pub node: &'static NodeTypeDef,
    pub properties: Properties,
    pub connect: Vec<Connect>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateBuilding {
    pub id: i64,
    pub name: String,
    pub address: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateDevice {
    pub id: i64,
    pub name: String,
    pub kind: String,
    pub building_id: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateMeter {
    pub id: i64,
    pub serial_number: String,
    pub kind: String,
    pub building_id: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateReading {
    pub id: i64,
    pub value: f64,
    pub unit: String,
    pub device_id: Option<String>,
    pub meter_id: Option<String>,
}

fn properties(value: Value) -> Properties {
    match value {
        Value::Object(map) => map,
        _ => Properties::new(),
    }
}

impl From<CreateBuilding> for CreateNode {
    fn from(command: CreateBuilding) -> Self {
        CreateNode {
            node: &BUILDING,
            properties: properties(json!({
                "id": command.id,
                "name": command.name,
                "address": command.address,
            })),
            connect: Vec::new(),
        }
    }
}

impl TryFrom<CreateDevice> for CreateNode {
    type Error = GatewayError;

    fn try_from(command: CreateDevice) -> Result<Self, Self::Error> {
        Ok(CreateNode {
            node: &DEVICE,
            properties: properties(json!({
                "id": command.id,
                "name": command.name,
                "type": command.kind,
            })),
            connect: vec![Connect {
                field: "building",
                target_id: parse_id(&command.building_id)?,
            }],
        })
    }
}

impl TryFrom<CreateMeter> for CreateNode {
    type Error = GatewayError;

    fn try_from(command: CreateMeter) -> Result<Self, Self::Error> {
        Ok(CreateNode {
            node: &METER,
            properties: properties(json!({
                "id": command.id,
                "serialNumber": command.serial_number,
                "type": command.kind,
            })),
            connect: vec![Connect {
                field: "building",
                target_id: parse_id(&command.building_id)?,
            }],
        })
    }
}

impl TryFrom<CreateReading> for CreateNode {
    type Error = GatewayError;

    fn try_from(command: CreateReading) -> Result<Self, Self::Error> {
        let mut connect = Vec::new();
        if let Some(device_id) = &command.device_id {
            connect.push(Connect {
                field: "device",
                target_id: parse_id(device_id)?,
            });
        }
        if let Some(meter_id) = &command.meter_id {
            connect.push(Connect {
                field: "meter",
                target_id: parse_id(meter_id)?,
            });
        }
        Ok(CreateNode {
            node: &READING,
            properties: properties(json!({
                "id": command.id,
                "value": command.value,
                "unit": command.unit,
            })),
            connect,
        })
    }
}
