// GraphQL object types for the declared node types.
//
// Scalar fields are read straight from the stored node properties. Relationship
// fields traverse the relationship declared in `type_defs`, using the session
// attached to the current request.

use async_graphql::{ComplexObject, Context, ErrorExtensions, Result as GqlResult, SimpleObject};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;

use crate::modules::energy_graph::core::errors::GatewayError;
use crate::modules::energy_graph::core::type_defs::{
    BUILDING, DEVICE, METER, NodeTypeDef, READING, TypeDefError,
};
use crate::shared::infrastructure::graph_store::{Expansion, GraphSession, NodeRecord};

pub trait GraphNode: DeserializeOwned + Send + Sync {
    fn type_def() -> &'static NodeTypeDef;

    fn from_record(record: NodeRecord) -> Result<Self, GatewayError> {
        let label = Self::type_def().label;
        serde_json::from_value(serde_json::Value::Object(record.properties)).map_err(|e| {
            GatewayError::Decode {
                label,
                reason: e.to_string(),
            }
        })
    }

    fn from_records(records: Vec<NodeRecord>) -> Result<Vec<Self>, GatewayError> {
        records.into_iter().map(Self::from_record).collect()
    }
}

/// The session the HTTP layer attached to the request as `Arc<dyn GraphSession>`.
pub fn session<'a>(ctx: &'a Context<'_>) -> Result<&'a Arc<dyn GraphSession>, GatewayError> {
    ctx.data_opt::<Arc<dyn GraphSession>>()
        .ok_or(GatewayError::NoSession)
}

async fn related(
    ctx: &Context<'_>,
    def: &'static NodeTypeDef,
    field: &'static str,
    id: i64,
) -> Result<Vec<NodeRecord>, GatewayError> {
    let rel = def
        .relationship(field)
        .ok_or(TypeDefError::UnknownRelationship {
            label: def.label,
            field,
        })?;
    let expansion = Expansion {
        from_label: def.label.to_string(),
        from_id: id,
        rel_type: rel.rel_type.to_string(),
        direction: rel.direction,
        to_label: rel.target.to_string(),
    };
    Ok(session(ctx)?.expand(&expansion).await?)
}

async fn many<T: GraphNode>(
    ctx: &Context<'_>,
    def: &'static NodeTypeDef,
    field: &'static str,
    id: i64,
) -> GqlResult<Vec<T>> {
    related(ctx, def, field, id)
        .await
        .and_then(T::from_records)
        .map_err(|e| e.extend())
}

async fn optional<T: GraphNode>(
    ctx: &Context<'_>,
    def: &'static NodeTypeDef,
    field: &'static str,
    id: i64,
) -> GqlResult<Option<T>> {
    let records = related(ctx, def, field, id).await.map_err(|e| e.extend())?;
    records
        .into_iter()
        .next()
        .map(T::from_record)
        .transpose()
        .map_err(|e| e.extend())
}

async fn one<T: GraphNode>(
    ctx: &Context<'_>,
    def: &'static NodeTypeDef,
    field: &'static str,
    id: i64,
) -> GqlResult<T> {
    optional(ctx, def, field, id).await?.ok_or_else(|| {
        GatewayError::MissingRelated {
            label: def.label,
            id,
            field,
        }
        .extend()
    })
}

#[derive(SimpleObject, Deserialize, Debug, Clone, PartialEq)]
#[graphql(complex)]
#[serde(rename_all = "camelCase")]
pub struct Building {
    pub id: i64,
    pub name: String,
    pub address: String,
    pub total_energy_consumption: Option<f64>,
}

#[ComplexObject]
impl Building {
    async fn devices(&self, ctx: &Context<'_>) -> GqlResult<Vec<Device>> {
        many(ctx, &BUILDING, "devices", self.id).await
    }

    async fn meters(&self, ctx: &Context<'_>) -> GqlResult<Vec<Meter>> {
        many(ctx, &BUILDING, "meters", self.id).await
    }
}

impl GraphNode for Building {
    fn type_def() -> &'static NodeTypeDef {
        &BUILDING
    }
}

#[derive(SimpleObject, Deserialize, Debug, Clone, PartialEq)]
#[graphql(complex)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    pub id: i64,
    pub name: String,
    #[graphql(name = "type")]
    #[serde(rename = "type")]
    pub kind: String,
    pub power_consumption: Option<f64>,
    pub status: Option<String>,
}

#[ComplexObject]
impl Device {
    async fn building(&self, ctx: &Context<'_>) -> GqlResult<Building> {
        one(ctx, &DEVICE, "building", self.id).await
    }

    async fn readings(&self, ctx: &Context<'_>) -> GqlResult<Vec<Reading>> {
        many(ctx, &DEVICE, "readings", self.id).await
    }
}

impl GraphNode for Device {
    fn type_def() -> &'static NodeTypeDef {
        &DEVICE
    }
}

#[derive(SimpleObject, Deserialize, Debug, Clone, PartialEq)]
#[graphql(complex)]
#[serde(rename_all = "camelCase")]
pub struct Meter {
    pub id: i64,
    pub serial_number: String,
    #[graphql(name = "type")]
    #[serde(rename = "type")]
    pub kind: String,
}

#[ComplexObject]
impl Meter {
    async fn building(&self, ctx: &Context<'_>) -> GqlResult<Building> {
        one(ctx, &METER, "building", self.id).await
    }

    async fn readings(&self, ctx: &Context<'_>) -> GqlResult<Vec<Reading>> {
        many(ctx, &METER, "readings", self.id).await
    }
}

impl GraphNode for Meter {
    fn type_def() -> &'static NodeTypeDef {
        &METER
    }
}

#[derive(SimpleObject, Deserialize, Debug, Clone, PartialEq)]
#[graphql(complex)]
#[serde(rename_all = "camelCase")]
pub struct Reading {
    pub id: i64,
    pub value: f64,
    pub unit: String,
}

#[ComplexObject]
impl Reading {
    async fn device(&self, ctx: &Context<'_>) -> GqlResult<Option<Device>> {
        optional(ctx, &READING, "device", self.id).await
    }

    async fn meter(&self, ctx: &Context<'_>) -> GqlResult<Option<Meter>> {
        optional(ctx, &READING, "meter", self.id).await
    }
}

impl GraphNode for Reading {
    fn type_def() -> &'static NodeTypeDef {
        &READING
    }
}
