// Cypher templates for the graph operations exposed by GraphSession.
//
// Identifiers (labels, relationship types, property names) are spliced into the
// statement text, so they are checked first. Values always travel as parameters.

use serde_json::Value;

use super::{Direction, Expansion, GraphStoreError, NewEdge, NodeQuery, Properties, SortOrder};

#[derive(Debug, Clone, PartialEq)]
pub struct CypherStatement {
    pub text: String,
    pub params: Vec<(String, Value)>,
}

impl CypherStatement {
    fn new(text: String) -> Self {
        Self {
            text,
            params: Vec::new(),
        }
    }

    fn bind(&mut self, name: impl Into<String>, value: Value) {
        self.params.push((name.into(), value));
    }
}

pub fn identifier(name: &str) -> Result<&str, GraphStoreError> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    };
    if valid {
        Ok(name)
    } else {
        Err(GraphStoreError::InvalidIdentifier(name.to_string()))
    }
}

pub fn find_nodes(query: &NodeQuery) -> Result<CypherStatement, GraphStoreError> {
    let label = identifier(&query.label)?;
    let mut predicates = Vec::new();
    let mut params = Vec::new();

    for (key, value) in &query.equals {
        let name = format!("p{}", params.len());
        predicates.push(format!("n.{} = ${name}", identifier(key)?));
        params.push((name, value.clone()));
    }
    for (key, pattern) in &query.matches {
        let name = format!("p{}", params.len());
        predicates.push(format!("n.{} =~ ${name}", identifier(key)?));
        params.push((name, Value::from(pattern.as_str())));
    }

    let mut order = Vec::new();
    for (key, direction) in &query.order_by {
        order.push(format!("n.{} {}", identifier(key)?, direction.as_str()));
    }
    if !query.order_by.iter().any(|(key, _)| key == "id") {
        order.push("n.id".to_string());
    }

    let mut text = format!("MATCH (n:{label})");
    if !predicates.is_empty() {
        text.push_str(" WHERE ");
        text.push_str(&predicates.join(" AND "));
    }
    text.push_str(&format!(" RETURN n ORDER BY {} SKIP $skip", order.join(", ")));
    if query.limit.is_some() {
        text.push_str(" LIMIT $limit");
    }

    let mut statement = CypherStatement::new(text);
    statement.params = params;
    statement.bind("skip", Value::from(query.offset));
    if let Some(limit) = query.limit {
        statement.bind("limit", Value::from(limit));
    }
    Ok(statement)
}

pub fn expand(expansion: &Expansion) -> Result<CypherStatement, GraphStoreError> {
    let from = identifier(&expansion.from_label)?;
    let rel = identifier(&expansion.rel_type)?;
    let to = identifier(&expansion.to_label)?;
    let pattern = match expansion.direction {
        Direction::Out => format!("-[:{rel}]->"),
        Direction::In => format!("<-[:{rel}]-"),
    };
    let mut statement = CypherStatement::new(format!(
        "MATCH (a:{from} {{id: $from_id}}){pattern}(n:{to}) RETURN n ORDER BY n.id"
    ));
    statement.bind("from_id", Value::from(expansion.from_id));
    Ok(statement)
}

pub fn create_node(label: &str, properties: &Properties) -> Result<CypherStatement, GraphStoreError> {
    let label = identifier(label)?;
    let mut assignments = Vec::new();
    let mut params = Vec::new();
    for (key, value) in properties {
        let name = format!("p{}", params.len());
        assignments.push(format!("n.{} = ${name}", identifier(key)?));
        params.push((name, value.clone()));
    }

    let text = if assignments.is_empty() {
        format!("CREATE (n:{label}) RETURN n")
    } else {
        format!("CREATE (n:{label}) SET {} RETURN n", assignments.join(", "))
    };
    let mut statement = CypherStatement::new(text);
    statement.params = params;
    Ok(statement)
}

pub fn create_edge(edge: &NewEdge) -> Result<CypherStatement, GraphStoreError> {
    let from = identifier(&edge.from_label)?;
    let rel = identifier(&edge.rel_type)?;
    let to = identifier(&edge.to_label)?;
    let mut statement = CypherStatement::new(format!(
        "MATCH (a:{from} {{id: $from_id}}), (b:{to} {{id: $to_id}}) \
         CREATE (a)-[:{rel}]->(b) RETURN count(*) AS created"
    ));
    statement.bind("from_id", Value::from(edge.from_id));
    statement.bind("to_id", Value::from(edge.to_id));
    Ok(statement)
}

pub fn clear() -> CypherStatement {
    CypherStatement::new("MATCH (n) DETACH DELETE n".to_string())
}
