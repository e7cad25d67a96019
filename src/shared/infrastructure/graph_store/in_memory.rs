// In memory implementation of the graph store ports.
//
// Purpose
// - Support resolver and router tests and local development without a database.
//
// Responsibilities
// - Store nodes and edges in memory, shared by every driver and session handed out.
// - Count drivers and sessions opened and closed, and record the credentials used.
// - Simulate an unreachable database (toggle_offline) and failing close calls.

use regex::Regex;
use serde_json::Value;
use std::cmp::Ordering as CmpOrdering;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::{Mutex, RwLock};

use super::{
    Credentials, Direction, DriverFactory, Expansion, GraphDriver, GraphSession, GraphStoreError,
    NewEdge, NodeQuery, NodeRecord, Properties, SortOrder,
};

#[derive(Default)]
struct Store {
    nodes: Vec<NodeRecord>,
    edges: Vec<NewEdge>,
}

impl Store {
    fn contains(&self, label: &str, id: i64) -> bool {
        self.node(label, id).is_some()
    }

    fn node(&self, label: &str, id: i64) -> Option<&NodeRecord> {
        self.nodes
            .iter()
            .find(|node| node.label == label && node.id() == Some(id))
    }
}

#[derive(Default)]
struct Counters {
    drivers_opened: AtomicUsize,
    drivers_closed: AtomicUsize,
    sessions_opened: AtomicUsize,
    sessions_closed: AtomicUsize,
}

#[derive(Clone, Default)]
pub struct InMemoryGraph {
    store: Arc<RwLock<Store>>,
    counters: Arc<Counters>,
    offline: Arc<AtomicBool>,
    fail_on_close: Arc<AtomicBool>,
    connections: Arc<Mutex<Vec<Credentials>>>,
}

impl InMemoryGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toggle_offline(&self) {
        self.offline.fetch_xor(true, Ordering::SeqCst);
    }

    pub fn set_fail_on_close(&self, fail: bool) {
        self.fail_on_close.store(fail, Ordering::SeqCst);
    }

    pub fn drivers_opened(&self) -> usize {
        self.counters.drivers_opened.load(Ordering::SeqCst)
    }

    pub fn drivers_closed(&self) -> usize {
        self.counters.drivers_closed.load(Ordering::SeqCst)
    }

    pub fn sessions_opened(&self) -> usize {
        self.counters.sessions_opened.load(Ordering::SeqCst)
    }

    pub fn sessions_closed(&self) -> usize {
        self.counters.sessions_closed.load(Ordering::SeqCst)
    }

    pub async fn connections(&self) -> Vec<Credentials> {
        self.connections.lock().await.clone()
    }

    pub async fn nodes(&self, label: &str) -> Vec<NodeRecord> {
        self.store
            .read()
            .await
            .nodes
            .iter()
            .filter(|node| node.label == label)
            .cloned()
            .collect()
    }

    pub async fn edges(&self) -> Vec<NewEdge> {
        self.store.read().await.edges.clone()
    }

    fn is_offline(&self) -> bool {
        self.offline.load(Ordering::SeqCst)
    }

    fn close_result(&self) -> Result<(), GraphStoreError> {
        if self.fail_on_close.load(Ordering::SeqCst) {
            Err(GraphStoreError::Backend("close failed".into()))
        } else {
            Ok(())
        }
    }
}

#[async_trait::async_trait]
impl DriverFactory for InMemoryGraph {
    async fn connect(
        &self,
        credentials: &Credentials,
    ) -> Result<Arc<dyn GraphDriver>, GraphStoreError> {
        if self.is_offline() {
            return Err(GraphStoreError::Connection("graph offline".into()));
        }
        self.connections.lock().await.push(credentials.clone());
        self.counters.drivers_opened.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(InMemoryDriver {
            graph: self.clone(),
            closed: AtomicBool::new(false),
        }))
    }
}

pub struct InMemoryDriver {
    graph: InMemoryGraph,
    closed: AtomicBool,
}

#[async_trait::async_trait]
impl GraphDriver for InMemoryDriver {
    async fn open_session(&self) -> Result<Arc<dyn GraphSession>, GraphStoreError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(GraphStoreError::DriverClosed);
        }
        if self.graph.is_offline() {
            return Err(GraphStoreError::Connection("graph offline".into()));
        }
        self.graph
            .counters
            .sessions_opened
            .fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(InMemorySession {
            graph: self.graph.clone(),
            closed: AtomicBool::new(false),
        }))
    }

    async fn close(&self) -> Result<(), GraphStoreError> {
        self.closed.store(true, Ordering::SeqCst);
        self.graph
            .counters
            .drivers_closed
            .fetch_add(1, Ordering::SeqCst);
        self.graph.close_result()
    }
}

pub struct InMemorySession {
    graph: InMemoryGraph,
    closed: AtomicBool,
}

impl InMemorySession {
    fn ensure_open(&self) -> Result<(), GraphStoreError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(GraphStoreError::SessionClosed);
        }
        if self.graph.is_offline() {
            return Err(GraphStoreError::Connection("graph offline".into()));
        }
        Ok(())
    }
}

/// Nulls sort after every value, as in Cypher; values of different kinds tie.
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> CmpOrdering {
    match (a, b) {
        (Some(Value::Number(a)), Some(Value::Number(b))) => a
            .as_f64()
            .partial_cmp(&b.as_f64())
            .unwrap_or(CmpOrdering::Equal),
        (Some(Value::String(a)), Some(Value::String(b))) => a.cmp(b),
        (Some(Value::Bool(a)), Some(Value::Bool(b))) => a.cmp(b),
        (None | Some(Value::Null), None | Some(Value::Null)) => CmpOrdering::Equal,
        (None | Some(Value::Null), _) => CmpOrdering::Greater,
        (_, None | Some(Value::Null)) => CmpOrdering::Less,
        _ => CmpOrdering::Equal,
    }
}

fn sort_nodes(nodes: &mut [NodeRecord], order_by: &[(String, SortOrder)]) {
    nodes.sort_by(|a, b| {
        order_by
            .iter()
            .map(|(key, order)| {
                let ordering = compare_values(a.properties.get(key), b.properties.get(key));
                match order {
                    SortOrder::Asc => ordering,
                    SortOrder::Desc => ordering.reverse(),
                }
            })
            .find(|ordering| ordering.is_ne())
            .unwrap_or_else(|| (a.id().is_none(), a.id()).cmp(&(b.id().is_none(), b.id())))
    });
}

#[async_trait::async_trait]
impl GraphSession for InMemorySession {
    async fn find_nodes(&self, query: &NodeQuery) -> Result<Vec<NodeRecord>, GraphStoreError> {
        self.ensure_open()?;
        let patterns = query
            .matches
            .iter()
            .map(|(key, pattern)| {
                Regex::new(&format!("^(?:{pattern})$"))
                    .map(|regex| (key.as_str(), regex))
                    .map_err(|e| GraphStoreError::InvalidFilter(e.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let store = self.graph.store.read().await;
        let mut found: Vec<NodeRecord> = store
            .nodes
            .iter()
            .filter(|node| node.label == query.label)
            .filter(|node| {
                query
                    .equals
                    .iter()
                    .all(|(key, value)| node.properties.get(key) == Some(value))
            })
            .filter(|node| {
                patterns.iter().all(|(key, regex)| {
                    node.properties
                        .get(*key)
                        .and_then(|value| value.as_str())
                        .is_some_and(|text| regex.is_match(text))
                })
            })
            .cloned()
            .collect();
        sort_nodes(&mut found, &query.order_by);

        let skip = usize::try_from(query.offset).unwrap_or(usize::MAX);
        let take = query
            .limit
            .map(|limit| usize::try_from(limit).unwrap_or(usize::MAX))
            .unwrap_or(usize::MAX);
        Ok(found.into_iter().skip(skip).take(take).collect())
    }

    async fn expand(&self, expansion: &Expansion) -> Result<Vec<NodeRecord>, GraphStoreError> {
        self.ensure_open()?;
        let store = self.graph.store.read().await;
        let mut found: Vec<NodeRecord> = store
            .edges
            .iter()
            .filter(|edge| edge.rel_type == expansion.rel_type)
            .filter_map(|edge| match expansion.direction {
                Direction::Out
                    if edge.from_label == expansion.from_label
                        && edge.from_id == expansion.from_id
                        && edge.to_label == expansion.to_label =>
                {
                    store.node(&edge.to_label, edge.to_id)
                }
                Direction::In
                    if edge.to_label == expansion.from_label
                        && edge.to_id == expansion.from_id
                        && edge.from_label == expansion.to_label =>
                {
                    store.node(&edge.from_label, edge.from_id)
                }
                _ => None,
            })
            .cloned()
            .collect();
        sort_nodes(&mut found, &[]);
        Ok(found)
    }

    async fn create_node(
        &self,
        label: &str,
        properties: Properties,
    ) -> Result<NodeRecord, GraphStoreError> {
        self.ensure_open()?;
        let record = NodeRecord {
            label: label.to_string(),
            properties,
        };
        self.graph.store.write().await.nodes.push(record.clone());
        Ok(record)
    }

    async fn create_edge(&self, edge: &NewEdge) -> Result<(), GraphStoreError> {
        self.ensure_open()?;
        let mut store = self.graph.store.write().await;
        if !store.contains(&edge.from_label, edge.from_id)
            || !store.contains(&edge.to_label, edge.to_id)
        {
            return Err(GraphStoreError::MissingEndpoint {
                rel_type: edge.rel_type.clone(),
            });
        }
        store.edges.push(edge.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<(), GraphStoreError> {
        self.ensure_open()?;
        let mut store = self.graph.store.write().await;
        store.nodes.clear();
        store.edges.clear();
        Ok(())
    }

    async fn close(&self) -> Result<(), GraphStoreError> {
        self.closed.store(true, Ordering::SeqCst);
        self.graph
            .counters
            .sessions_closed
            .fetch_add(1, Ordering::SeqCst);
        self.graph.close_result()
    }
}
