use async_graphql::{Context, ErrorExtensions, Object, Result as GqlResult};

use crate::modules::energy_graph::core::errors::GatewayError;
use crate::modules::energy_graph::core::nodes::{
    Building, Device, GraphNode, Meter, Reading, session,
};
use crate::modules::energy_graph::use_cases::query_nodes::filter::{
    BuildingSort, BuildingWhere, DeviceSort, DeviceWhere, MeterSort, MeterWhere, NodeOptions,
    NodeSort, NodeWhere, QuerySettings, ReadingSort, ReadingWhere, node_query,
};
use crate::modules::energy_graph::use_cases::query_nodes::handler::find_nodes;

async fn list_nodes<T: GraphNode, W: NodeWhere, S: NodeSort>(
    context: &Context<'_>,
    filter: Option<W>,
    options: Option<NodeOptions<S>>,
) -> Result<Vec<T>, GatewayError> {
    let settings = context
        .data_opt::<QuerySettings>()
        .copied()
        .unwrap_or_default();
    let query = node_query(T::type_def().label, filter, options, settings)?;
    find_nodes::<T>(session(context)?.as_ref(), &query).await
}

async fn list<T: GraphNode, W: NodeWhere, S: NodeSort>(
    context: &Context<'_>,
    filter: Option<W>,
    options: Option<NodeOptions<S>>,
) -> GqlResult<Vec<T>> {
    list_nodes(context, filter, options)
        .await
        .map_err(|e| e.extend())
}

pub struct QueryRoot;

#[Object]
impl QueryRoot {
    async fn buildings(
        &self,
        context: &Context<'_>,
        #[graphql(name = "where")] filter: Option<BuildingWhere>,
        options: Option<NodeOptions<BuildingSort>>,
    ) -> GqlResult<Vec<Building>> {
        list(context, filter, options).await
    }

    async fn devices(
        &self,
        context: &Context<'_>,
        #[graphql(name = "where")] filter: Option<DeviceWhere>,
        options: Option<NodeOptions<DeviceSort>>,
    ) -> GqlResult<Vec<Device>> {
        list(context, filter, options).await
    }

    async fn meters(
        &self,
        context: &Context<'_>,
        #[graphql(name = "where")] filter: Option<MeterWhere>,
        options: Option<NodeOptions<MeterSort>>,
    ) -> GqlResult<Vec<Meter>> {
        list(context, filter, options).await
    }

    async fn readings(
        &self,
        context: &Context<'_>,
        #[graphql(name = "where")] filter: Option<ReadingWhere>,
        options: Option<NodeOptions<ReadingSort>>,
    ) -> GqlResult<Vec<Reading>> {
        list(context, filter, options).await
    }
}
