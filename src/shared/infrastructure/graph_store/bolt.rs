// Bolt implementation of the graph store ports, backed by neo4rs.
//
// Purpose
// - Talk to Memgraph or Neo4j over Bolt using the statements built in `cypher`.
//
// Notes
// - A neo4rs Graph owns its connection pool; closing a driver or session drops
//   the handle it holds, the pool shuts down once every handle is gone.
// - Node properties come back untyped. Each one is read as an integer first,
//   then a float, string or boolean, so integer ids stay integers.

use neo4rs::{BoltNull, BoltType, ConfigBuilder, Graph, Node, Query, query};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::Mutex;

use super::cypher::{self, CypherStatement};
use super::{
    Credentials, DriverFactory, Expansion, GraphDriver, GraphSession, GraphStoreError, NewEdge,
    NodeQuery, NodeRecord, Properties,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolSettings {
    pub max_connections: usize,
    pub fetch_size: usize,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            max_connections: 50,
            fetch_size: 500,
        }
    }
}

#[derive(Debug, Clone)]
pub struct BoltDriverFactory {
    uri: String,
    database: String,
    pool: PoolSettings,
}

impl BoltDriverFactory {
    pub fn new(uri: impl Into<String>, database: impl Into<String>, pool: PoolSettings) -> Self {
        Self {
            uri: uri.into(),
            database: database.into(),
            pool,
        }
    }
}

#[async_trait::async_trait]
impl DriverFactory for BoltDriverFactory {
    async fn connect(
        &self,
        credentials: &Credentials,
    ) -> Result<Arc<dyn GraphDriver>, GraphStoreError> {
        let config = ConfigBuilder::default()
            .uri(self.uri.as_str())
            .user(credentials.user.as_str())
            .password(credentials.password.as_str())
            .db(self.database.as_str())
            .fetch_size(self.pool.fetch_size)
            .max_connections(self.pool.max_connections)
            .build()
            .map_err(|e| GraphStoreError::Connection(e.to_string()))?;
        let graph = Graph::connect(config)
            .await
            .map_err(|e| GraphStoreError::Connection(e.to_string()))?;
        tracing::debug!(uri = %self.uri, database = %self.database, user = %credentials.user, "bolt driver connected");
        Ok(Arc::new(BoltDriver {
            graph: Mutex::new(Some(graph)),
        }))
    }
}

pub struct BoltDriver {
    graph: Mutex<Option<Graph>>,
}

#[async_trait::async_trait]
impl GraphDriver for BoltDriver {
    async fn open_session(&self) -> Result<Arc<dyn GraphSession>, GraphStoreError> {
        let graph = self
            .graph
            .lock()
            .await
            .clone()
            .ok_or(GraphStoreError::DriverClosed)?;
        Ok(Arc::new(BoltSession {
            graph: Mutex::new(Some(graph)),
        }))
    }

    async fn close(&self) -> Result<(), GraphStoreError> {
        self.graph.lock().await.take();
        Ok(())
    }
}

pub struct BoltSession {
    graph: Mutex<Option<Graph>>,
}

impl BoltSession {
    async fn graph(&self) -> Result<Graph, GraphStoreError> {
        self.graph
            .lock()
            .await
            .clone()
            .ok_or(GraphStoreError::SessionClosed)
    }

    async fn fetch_nodes(&self, statement: CypherStatement) -> Result<Vec<NodeRecord>, GraphStoreError> {
        let graph = self.graph().await?;
        let mut stream = graph
            .execute(to_query(statement)?)
            .await
            .map_err(backend)?;
        let mut nodes = Vec::new();
        while let Some(row) = stream.next().await.map_err(backend)? {
            let node: Node = row.get("n").map_err(backend)?;
            nodes.push(to_record(&node));
        }
        Ok(nodes)
    }
}

#[async_trait::async_trait]
impl GraphSession for BoltSession {
    async fn find_nodes(&self, query: &NodeQuery) -> Result<Vec<NodeRecord>, GraphStoreError> {
        self.fetch_nodes(cypher::find_nodes(query)?).await
    }

    async fn expand(&self, expansion: &Expansion) -> Result<Vec<NodeRecord>, GraphStoreError> {
        self.fetch_nodes(cypher::expand(expansion)?).await
    }

    async fn create_node(
        &self,
        label: &str,
        properties: Properties,
    ) -> Result<NodeRecord, GraphStoreError> {
        self.fetch_nodes(cypher::create_node(label, &properties)?)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| GraphStoreError::Backend(format!("CREATE {label} returned no node")))
    }

    async fn create_edge(&self, edge: &NewEdge) -> Result<(), GraphStoreError> {
        let graph = self.graph().await?;
        let mut stream = graph
            .execute(to_query(cypher::create_edge(edge)?)?)
            .await
            .map_err(backend)?;
        let mut created = 0_i64;
        while let Some(row) = stream.next().await.map_err(backend)? {
            created += row.get::<i64>("created").map_err(backend)?;
        }
        if created == 0 {
            return Err(GraphStoreError::MissingEndpoint {
                rel_type: edge.rel_type.clone(),
            });
        }
        Ok(())
    }

    async fn clear(&self) -> Result<(), GraphStoreError> {
        let graph = self.graph().await?;
        graph
            .run(to_query(cypher::clear())?)
            .await
            .map_err(backend)
    }

    async fn close(&self) -> Result<(), GraphStoreError> {
        self.graph.lock().await.take();
        Ok(())
    }
}

fn backend(e: impl std::fmt::Display) -> GraphStoreError {
    GraphStoreError::Backend(e.to_string())
}

fn to_query(statement: CypherStatement) -> Result<Query, GraphStoreError> {
    let mut q = query(&statement.text);
    for (name, value) in statement.params {
        let bolt = to_bolt(&name, value)?;
        q = q.param(&name, bolt);
    }
    Ok(q)
}

fn to_bolt(name: &str, value: Value) -> Result<BoltType, GraphStoreError> {
    match value {
        Value::Null => Ok(BoltType::Null(BoltNull)),
        Value::Bool(b) => Ok(BoltType::from(b)),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(BoltType::from(i))
            } else if let Some(f) = n.as_f64() {
                Ok(BoltType::from(f))
            } else {
                Err(GraphStoreError::UnsupportedValue(name.to_string()))
            }
        }
        Value::String(s) => Ok(BoltType::from(s)),
        Value::Array(_) | Value::Object(_) => {
            Err(GraphStoreError::UnsupportedValue(name.to_string()))
        }
    }
}

fn to_record(node: &Node) -> NodeRecord {
    let label = node
        .labels()
        .into_iter()
        .next()
        .map(|label| label.to_string())
        .unwrap_or_default();
    let mut properties = Properties::new();
    for key in node.keys() {
        properties.insert(key.to_string(), property(node, key));
    }
    NodeRecord { label, properties }
}

fn property(node: &Node, key: &str) -> Value {
    if let Ok(i) = node.get::<i64>(key) {
        return Value::from(i);
    }
    if let Ok(f) = node.get::<f64>(key) {
        return Value::from(f);
    }
    if let Ok(s) = node.get::<String>(key) {
        return Value::from(s);
    }
    if let Ok(b) = node.get::<bool>(key) {
        return Value::from(b);
    }
    Value::Null
}
