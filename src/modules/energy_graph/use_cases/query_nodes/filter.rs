// `where` and `options` arguments of the list queries, turned into a NodeQuery.

use async_graphql::{Enum, InputObject, InputType};
use serde_json::Value;

use crate::modules::energy_graph::core::errors::GatewayError;
use crate::shared::infrastructure::graph_store::{NodeQuery, SortOrder};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuerySettings {
    pub enable_regex: bool,
}

impl Default for QuerySettings {
    fn default() -> Self {
        Self { enable_regex: true }
    }
}

#[derive(Enum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl From<SortDirection> for SortOrder {
    fn from(direction: SortDirection) -> Self {
        match direction {
            SortDirection::Asc => SortOrder::Asc,
            SortDirection::Desc => SortOrder::Desc,
        }
    }
}

/// Paging and ordering. Each `sort` entry adds its keys after the previous
/// entry's; `id` always breaks remaining ties.
#[derive(InputObject, Debug, Clone)]
#[graphql(concrete(name = "BuildingOptions", params(BuildingSort)))]
#[graphql(concrete(name = "DeviceOptions", params(DeviceSort)))]
#[graphql(concrete(name = "MeterOptions", params(MeterSort)))]
#[graphql(concrete(name = "ReadingOptions", params(ReadingSort)))]
pub struct NodeOptions<S: InputType> {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    pub sort: Option<Vec<S>>,
}

#[derive(InputObject, Debug, Clone, Default)]
pub struct BuildingSort {
    pub id: Option<SortDirection>,
    pub name: Option<SortDirection>,
    pub address: Option<SortDirection>,
    pub total_energy_consumption: Option<SortDirection>,
}

#[derive(InputObject, Debug, Clone, Default)]
pub struct DeviceSort {
    pub id: Option<SortDirection>,
    pub name: Option<SortDirection>,
    #[graphql(name = "type")]
    pub kind: Option<SortDirection>,
    pub power_consumption: Option<SortDirection>,
    pub status: Option<SortDirection>,
}

#[derive(InputObject, Debug, Clone, Default)]
pub struct MeterSort {
    pub id: Option<SortDirection>,
    pub serial_number: Option<SortDirection>,
    #[graphql(name = "type")]
    pub kind: Option<SortDirection>,
}

#[derive(InputObject, Debug, Clone, Default)]
pub struct ReadingSort {
    pub id: Option<SortDirection>,
    pub value: Option<SortDirection>,
    pub unit: Option<SortDirection>,
}

pub trait NodeSort: InputType {
    /// Stored property names in declaration order.
    fn keys(&self) -> Vec<(&'static str, Option<SortDirection>)>;
}

impl NodeSort for BuildingSort {
    fn keys(&self) -> Vec<(&'static str, Option<SortDirection>)> {
        vec![
            ("id", self.id),
            ("name", self.name),
            ("address", self.address),
            ("totalEnergyConsumption", self.total_energy_consumption),
        ]
    }
}

impl NodeSort for DeviceSort {
    fn keys(&self) -> Vec<(&'static str, Option<SortDirection>)> {
        vec![
            ("id", self.id),
            ("name", self.name),
            ("type", self.kind),
            ("powerConsumption", self.power_consumption),
            ("status", self.status),
        ]
    }
}

impl NodeSort for MeterSort {
    fn keys(&self) -> Vec<(&'static str, Option<SortDirection>)> {
        vec![
            ("id", self.id),
            ("serialNumber", self.serial_number),
            ("type", self.kind),
        ]
    }
}

impl NodeSort for ReadingSort {
    fn keys(&self) -> Vec<(&'static str, Option<SortDirection>)> {
        vec![("id", self.id), ("value", self.value), ("unit", self.unit)]
    }
}

#[derive(InputObject, Debug, Clone, Default)]
pub struct BuildingWhere {
    pub id: Option<i64>,
    pub name: Option<String>,
    #[graphql(name = "name_MATCHES")]
    pub name_matches: Option<String>,
}

#[derive(InputObject, Debug, Clone, Default)]
pub struct DeviceWhere {
    pub id: Option<i64>,
    pub name: Option<String>,
    #[graphql(name = "name_MATCHES")]
    pub name_matches: Option<String>,
    #[graphql(name = "type")]
    pub kind: Option<String>,
    pub status: Option<String>,
}

#[derive(InputObject, Debug, Clone, Default)]
pub struct MeterWhere {
    pub id: Option<i64>,
    pub serial_number: Option<String>,
    #[graphql(name = "serialNumber_MATCHES")]
    pub serial_number_matches: Option<String>,
    #[graphql(name = "type")]
    pub kind: Option<String>,
}

#[derive(InputObject, Debug, Clone, Default)]
pub struct ReadingWhere {
    pub id: Option<i64>,
    pub unit: Option<String>,
}

pub trait NodeWhere {
    fn apply(self, filter: &mut Filter) -> Result<(), GatewayError>;
}

pub struct Filter {
    query: NodeQuery,
    settings: QuerySettings,
}

impl Filter {
    fn equals(&mut self, key: &str, value: Option<impl Into<Value>>) {
        if let Some(value) = value {
            self.query.equals.insert(key.to_string(), value.into());
        }
    }

    fn matches(&mut self, key: &str, pattern: Option<String>) -> Result<(), GatewayError> {
        let Some(pattern) = pattern else {
            return Ok(());
        };
        if !self.settings.enable_regex {
            return Err(GatewayError::RegexDisabled);
        }
        self.query.matches.push((key.to_string(), pattern));
        Ok(())
    }
}

impl NodeWhere for BuildingWhere {
    fn apply(self, filter: &mut Filter) -> Result<(), GatewayError> {
        filter.equals("id", self.id);
        filter.equals("name", self.name);
        filter.matches("name", self.name_matches)
    }
}

impl NodeWhere for DeviceWhere {
    fn apply(self, filter: &mut Filter) -> Result<(), GatewayError> {
        filter.equals("id", self.id);
        filter.equals("name", self.name);
        filter.equals("type", self.kind);
        filter.equals("status", self.status);
        filter.matches("name", self.name_matches)
    }
}

impl NodeWhere for MeterWhere {
    fn apply(self, filter: &mut Filter) -> Result<(), GatewayError> {
        filter.equals("id", self.id);
        filter.equals("serialNumber", self.serial_number);
        filter.equals("type", self.kind);
        filter.matches("serialNumber", self.serial_number_matches)
    }
}

impl NodeWhere for ReadingWhere {
    fn apply(self, filter: &mut Filter) -> Result<(), GatewayError> {
        filter.equals("id", self.id);
        filter.equals("unit", self.unit);
        Ok(())
    }
}

pub fn node_query<W: NodeWhere, S: NodeSort>(
    label: &str,
    filter: Option<W>,
    options: Option<NodeOptions<S>>,
    settings: QuerySettings,
) -> Result<NodeQuery, GatewayError> {
    let mut built = Filter {
        query: NodeQuery::label(label),
        settings,
    };
    if let Some(filter) = filter {
        filter.apply(&mut built)?;
    }
    let Some(options) = options else {
        return Ok(built.query);
    };
    built.query.offset = options.offset.unwrap_or(0).max(0) as u64;
    built.query.limit = options.limit.map(|limit| limit.max(0) as u64);
    for sort in options.sort.unwrap_or_default() {
        for (key, direction) in sort.keys() {
            if let Some(direction) = direction {
                built.query.order_by.push((key.to_string(), direction.into()));
            }
        }
    }
    Ok(built.query)
}
