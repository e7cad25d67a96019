use async_graphql::extensions::Tracing;
use async_graphql::extensions::apollo_persisted_queries::{ApolloPersistedQueries, LruCacheStorage};
use async_graphql::{EmptySubscription, Schema};

pub use crate::modules::energy_graph::use_cases::create_nodes::inbound::graphql::MutationRoot;
pub use crate::modules::energy_graph::use_cases::query_nodes::inbound::graphql::QueryRoot;

use crate::modules::energy_graph::core::type_defs::{TYPE_DEFS, TypeDefError, validate_type_defs};
use crate::modules::energy_graph::use_cases::query_nodes::filter::QuerySettings;
use crate::shell::config::defaults::PERSISTED_QUERY_CACHE_SIZE;

pub type AppSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

#[derive(Debug, Clone, Copy)]
pub struct SchemaSettings {
    pub query: QuerySettings,
    pub persisted_queries: bool,
}

impl Default for SchemaSettings {
    fn default() -> Self {
        Self {
            query: QuerySettings::default(),
            persisted_queries: true,
        }
    }
}

/// Fails when the declared type definitions are inconsistent.
pub fn build_schema(settings: SchemaSettings) -> Result<AppSchema, TypeDefError> {
    validate_type_defs(&TYPE_DEFS)?;

    let builder = Schema::build(QueryRoot, MutationRoot, EmptySubscription)
        .data(settings.query)
        .extension(Tracing);
    let builder = if settings.persisted_queries {
        builder.extension(ApolloPersistedQueries::new(LruCacheStorage::new(
            PERSISTED_QUERY_CACHE_SIZE,
        )))
    } else {
        builder
    };
    Ok(builder.finish())
}
