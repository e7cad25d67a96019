// Gateway configuration read from the environment.
//
// `from_env` reads the process environment; `from_lookup` takes any lookup
// function so tests can pass a map instead of mutating the environment.

use thiserror::Error;

use crate::modules::energy_graph::use_cases::query_nodes::filter::QuerySettings;
use crate::shared::infrastructure::graph_store::Credentials;
use crate::shared::infrastructure::graph_store::bolt::PoolSettings;

pub mod envvars {
    pub const BOLT_URL: &str = "NEO4J_DOCKER";
    pub const DATABASE: &str = "NEO4J_DATABASE";
    pub const USER: &str = "NEO4J_USER";
    pub const PASSWORD: &str = "NEO4J_PASSWORD";
    pub const AUTH: &str = "NEO4J_AUTH";
    pub const MAX_CONNECTIONS: &str = "NEO4J_MAX_CONNECTIONS";
    pub const FETCH_SIZE: &str = "NEO4J_FETCH_SIZE";
    pub const HOST: &str = "GRAPHQL_SERVER_HOST";
    pub const PORT: &str = "GRAPHQL_LISTEN_PORT";
    pub const PATH: &str = "GRAPHQL_SERVER_PATH";
    pub const PERSISTED_QUERIES: &str = "APOLLO_PERSISTED_QUERIES";
    pub const ERROR_FORMAT: &str = "GRAPHQL_ERROR_FORMAT";
    pub const ENABLE_REGEX: &str = "GRAPHQL_ENABLE_REGEX";
}

pub mod defaults {
    pub const BOLT_URL: &str = "bolt://localhost:7687";
    pub const DATABASE: &str = "memgraph";
    pub const HOST: &str = "0.0.0.0";
    pub const PORT: u16 = 4001;
    pub const PATH: &str = "/graphql";
    pub const PERSISTED_QUERY_CACHE_SIZE: usize = 1000;
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} must be a number, got {value:?}")]
    NotANumber { name: &'static str, value: String },

    #[error("{name} must be \"true\" or \"false\", got {value:?}")]
    NotABool { name: &'static str, value: String },

    #[error("{name} must be \"envelope\" or \"default\", got {value:?}")]
    UnknownErrorFormat { name: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthMode {
    /// One shared driver connected with these credentials.
    Fixed(Credentials),
    /// One driver per request, built from the bearer token.
    Bearer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorFormat {
    Envelope,
    Default,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    pub bolt_url: String,
    pub database: String,
    pub auth: AuthMode,
    pub pool: PoolSettings,
    pub host: String,
    pub port: u16,
    pub path: String,
    pub persisted_queries: bool,
    pub error_format: ErrorFormat,
    pub enable_regex: bool,
}

impl GatewayConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let auth = if lookup(envvars::AUTH).as_deref() == Some("true") {
            AuthMode::Bearer
        } else {
            AuthMode::Fixed(Credentials::new(
                lookup(envvars::USER).unwrap_or_default(),
                lookup(envvars::PASSWORD).unwrap_or_default(),
            ))
        };

        let error_format = match lookup(envvars::ERROR_FORMAT).as_deref() {
            None => match auth {
                AuthMode::Fixed(_) => ErrorFormat::Envelope,
                AuthMode::Bearer => ErrorFormat::Default,
            },
            Some("envelope") => ErrorFormat::Envelope,
            Some("default") => ErrorFormat::Default,
            Some(other) => {
                return Err(ConfigError::UnknownErrorFormat {
                    name: envvars::ERROR_FORMAT,
                    value: other.to_string(),
                });
            }
        };

        let path = lookup(envvars::PATH).unwrap_or_else(|| defaults::PATH.to_string());
        let path = if path.starts_with('/') {
            path
        } else {
            format!("/{path}")
        };

        let pool_defaults = PoolSettings::default();

        Ok(Self {
            bolt_url: lookup(envvars::BOLT_URL).unwrap_or_else(|| defaults::BOLT_URL.to_string()),
            database: lookup(envvars::DATABASE).unwrap_or_else(|| defaults::DATABASE.to_string()),
            auth,
            pool: PoolSettings {
                max_connections: number(
                    &lookup,
                    envvars::MAX_CONNECTIONS,
                    pool_defaults.max_connections,
                )?,
                fetch_size: number(&lookup, envvars::FETCH_SIZE, pool_defaults.fetch_size)?,
            },
            host: lookup(envvars::HOST).unwrap_or_else(|| defaults::HOST.to_string()),
            port: number(&lookup, envvars::PORT, defaults::PORT)?,
            path,
            persisted_queries: lookup(envvars::PERSISTED_QUERIES).as_deref() != Some("false"),
            error_format,
            enable_regex: flag(&lookup, envvars::ENABLE_REGEX, true)?,
        })
    }

    pub fn query_settings(&self) -> QuerySettings {
        QuerySettings {
            enable_regex: self.enable_regex,
        }
    }
}

fn number<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(name) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::NotANumber { name, value }),
    }
}

fn flag(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: bool,
) -> Result<bool, ConfigError> {
    match lookup(name).as_deref() {
        None => Ok(default),
        Some("true") => Ok(true),
        Some("false") => Ok(false),
        Some(other) => Err(ConfigError::NotABool {
            name,
            value: other.to_string(),
        }),
    }
}
