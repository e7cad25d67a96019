use async_graphql::{Context, ErrorExtensions, ID, Object, Result as GqlResult};

use crate::modules::energy_graph::core::errors::GatewayError;
use crate::modules::energy_graph::core::nodes::{
    Building, Device, GraphNode, Meter, Reading, session,
};
use crate::modules::energy_graph::use_cases::create_nodes::command::{
    CreateBuilding, CreateDevice, CreateMeter, CreateNode, CreateReading,
};
use crate::modules::energy_graph::use_cases::create_nodes::handler::create_node;

async fn create_typed<T: GraphNode>(
    context: &Context<'_>,
    command: Result<CreateNode, GatewayError>,
) -> Result<T, GatewayError> {
    let record = create_node(session(context)?.as_ref(), command?).await?;
    T::from_record(record)
}

async fn create<T: GraphNode>(
    context: &Context<'_>,
    command: Result<CreateNode, GatewayError>,
) -> GqlResult<T> {
    create_typed(context, command).await.map_err(|e| e.extend())
}

pub struct MutationRoot;

#[Object]
impl MutationRoot {
    async fn create_building(
        &self,
        context: &Context<'_>,
        id: i64,
        name: String,
        address: String,
    ) -> GqlResult<Building> {
        let command = CreateBuilding { id, name, address };
        create(context, Ok(command.into())).await
    }

    async fn create_device(
        &self,
        context: &Context<'_>,
        id: i64,
        name: String,
        #[graphql(name = "type")] kind: String,
        building_id: ID,
    ) -> GqlResult<Device> {
        let command = CreateDevice {
            id,
            name,
            kind,
            building_id: building_id.0,
        };
        create(context, command.try_into()).await
    }

    async fn create_meter(
        &self,
        context: &Context<'_>,
        id: i64,
        serial_number: String,
        #[graphql(name = "type")] kind: String,
        building_id: ID,
    ) -> GqlResult<Meter> {
        let command = CreateMeter {
            id,
            serial_number,
            kind,
            building_id: building_id.0,
        };
        create(context, command.try_into()).await
    }

    async fn create_reading(
        &self,
        context: &Context<'_>,
        id: i64,
        value: f64,
        unit: String,
        device_id: Option<ID>,
        meter_id: Option<ID>,
    ) -> GqlResult<Reading> {
        let command = CreateReading {
            id,
            value,
            unit,
            device_id: device_id.map(|id| id.0),
            meter_id: meter_id.map(|id| id.0),
        };
        create(context, command.try_into()).await
    }
}
