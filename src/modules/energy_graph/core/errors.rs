use async_graphql::ErrorExtensions;
use thiserror::Error;

use crate::modules::energy_graph::core::type_defs::TypeDefError;
use crate::shared::infrastructure::graph_store::GraphStoreError;

pub const BAD_USER_INPUT: &str = "BAD_USER_INPUT";
pub const NOT_FOUND: &str = "NOT_FOUND";
pub const DATABASE_UNAVAILABLE: &str = "DATABASE_UNAVAILABLE";
pub const INTERNAL_SERVER_ERROR: &str = "INTERNAL_SERVER_ERROR";
pub const GRAPHQL_VALIDATION_FAILED: &str = "GRAPHQL_VALIDATION_FAILED";
pub const PERSISTED_QUERY_NOT_FOUND: &str = "PERSISTED_QUERY_NOT_FOUND";

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error(transparent)]
    Store(#[from] GraphStoreError),

    #[error(transparent)]
    Schema(#[from] TypeDefError),

    #[error("regular expression filters are disabled")]
    RegexDisabled,

    #[error("invalid id {0:?}: expected an integer")]
    InvalidId(String),

    #[error("{label} with id {id} not found")]
    NotFound { label: &'static str, id: i64 },

    #[error("{label} {id} has no {field}")]
    MissingRelated {
        label: &'static str,
        id: i64,
        field: &'static str,
    },

    #[error("{label} record could not be read: {reason}")]
    Decode { label: &'static str, reason: String },

    #[error("no graph session attached to the request")]
    NoSession,
}

impl GatewayError {
    pub fn code(&self) -> &'static str {
        match self {
            GatewayError::Store(
                GraphStoreError::Connection(_)
                | GraphStoreError::SessionClosed
                | GraphStoreError::DriverClosed,
            ) => DATABASE_UNAVAILABLE,
            GatewayError::Store(GraphStoreError::InvalidFilter(_))
            | GatewayError::Schema(_)
            | GatewayError::RegexDisabled
            | GatewayError::InvalidId(_) => BAD_USER_INPUT,
            GatewayError::NotFound { .. } => NOT_FOUND,
            GatewayError::NoSession => DATABASE_UNAVAILABLE,
            GatewayError::Store(_)
            | GatewayError::MissingRelated { .. }
            | GatewayError::Decode { .. } => INTERNAL_SERVER_ERROR,
        }
    }
}

impl ErrorExtensions for GatewayError {
    fn extend(&self) -> async_graphql::Error {
        async_graphql::Error::new(self.to_string())
            .extend_with(|_, e| e.set("code", self.code().to_string()))
    }
}

pub fn parse_id(raw: &str) -> Result<i64, GatewayError> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| GatewayError::InvalidId(raw.to_string()))
}
