// Ports describing what the GraphQL layer needs from the graph database.
//
// Purpose
// - Keep resolvers independent of the Bolt driver by coding against traits.
//
// Responsibilities
// - DriverFactory builds a driver for a set of credentials.
// - GraphDriver hands out sessions and owns the connection pool.
// - GraphSession runs the fixed set of graph operations for one request.
//
// Testing guidance
// - Use the in_memory adapter; it counts opened and closed drivers and sessions.

pub mod bolt;
pub mod cypher;
pub mod in_memory;

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::Arc;
use thiserror::Error;

pub type Properties = Map<String, Value>;

#[derive(Debug, Error)]
pub enum GraphStoreError {
    #[error("session is closed")]
    SessionClosed,

    #[error("driver is closed")]
    DriverClosed,

    #[error("cannot create {rel_type} edge: endpoint missing")]
    MissingEndpoint { rel_type: String },

    #[error("invalid identifier: {0:?}")]
    InvalidIdentifier(String),

    #[error("invalid filter: {0}")]
    InvalidFilter(String),

    #[error("unsupported property value for {0}")]
    UnsupportedValue(String),

    #[error("connection error: {0}")]
    Connection(String),

    #[error("backend error: {0}")]
    Backend(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Credentials {
    pub user: String,
    pub password: String,
}

impl Credentials {
    pub fn new(user: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            password: password.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Out,
    In,
}

impl Direction {
    pub fn reverse(self) -> Self {
        match self {
            Direction::Out => Direction::In,
            Direction::In => Direction::Out,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Out => "OUT",
            Direction::In => "IN",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NodeRecord {
    pub label: String,
    pub properties: Properties,
}

impl NodeRecord {
    pub fn id(&self) -> Option<i64> {
        self.properties.get("id").and_then(Value::as_i64)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// Label scan with optional property predicates, ordered by `order_by` and
/// then by `id`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NodeQuery {
    pub label: String,
    pub equals: Properties,
    /// Property name and full-match regular expression.
    pub matches: Vec<(String, String)>,
    pub order_by: Vec<(String, SortOrder)>,
    pub offset: u64,
    pub limit: Option<u64>,
}

impl NodeQuery {
    pub fn label(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Self::default()
        }
    }

    pub fn with_id(label: impl Into<String>, id: i64) -> Self {
        let mut query = Self::label(label);
        query.equals.insert("id".into(), Value::from(id));
        query
    }
}

/// One hop over a relationship type, starting from a node identified by `id`.
#[derive(Debug, Clone, PartialEq)]
pub struct Expansion {
    pub from_label: String,
    pub from_id: i64,
    pub rel_type: String,
    pub direction: Direction,
    pub to_label: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewEdge {
    pub from_label: String,
    pub from_id: i64,
    pub rel_type: String,
    pub to_label: String,
    pub to_id: i64,
}

#[async_trait]
pub trait GraphSession: Send + Sync {
    async fn find_nodes(&self, query: &NodeQuery) -> Result<Vec<NodeRecord>, GraphStoreError>;
    async fn expand(&self, expansion: &Expansion) -> Result<Vec<NodeRecord>, GraphStoreError>;
    async fn create_node(
        &self,
        label: &str,
        properties: Properties,
    ) -> Result<NodeRecord, GraphStoreError>;
    async fn create_edge(&self, edge: &NewEdge) -> Result<(), GraphStoreError>;
    async fn clear(&self) -> Result<(), GraphStoreError>;
    async fn close(&self) -> Result<(), GraphStoreError>;
}

#[async_trait]
pub trait GraphDriver: Send + Sync {
    async fn open_session(&self) -> Result<Arc<dyn GraphSession>, GraphStoreError>;
    async fn close(&self) -> Result<(), GraphStoreError>;
}

#[async_trait]
pub trait DriverFactory: Send + Sync {
    async fn connect(
        &self,
        credentials: &Credentials,
    ) -> Result<Arc<dyn GraphDriver>, GraphStoreError>;
}
