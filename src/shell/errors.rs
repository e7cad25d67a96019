use async_graphql::{ErrorExtensionValues, ErrorExtensions, Pos, Response, ServerError, Value};

use crate::modules::energy_graph::core::errors::{
    BAD_USER_INPUT, GRAPHQL_VALIDATION_FAILED, GatewayError, INTERNAL_SERVER_ERROR,
    PERSISTED_QUERY_NOT_FOUND,
};
use crate::shell::config::ErrorFormat;

/// Rewrites the response errors according to the configured format.
pub fn format_response(mut response: Response, format: ErrorFormat) -> Response {
    if format == ErrorFormat::Envelope {
        response.errors = response.errors.into_iter().map(envelope).collect();
    }
    response
}

/// `{ message, path, extensions: { code } }`, nothing else.
fn envelope(error: ServerError) -> ServerError {
    let code = match error.extensions.as_ref().and_then(|ext| ext.get("code")) {
        Some(Value::String(code)) => code.clone(),
        _ => classify(&error).to_string(),
    };
    tracing::error!(code = %code, path = ?error.path, "graphql error: {}", error.message);

    let mut extensions = ErrorExtensionValues::default();
    extensions.set("code", code);
    ServerError {
        locations: Vec::new(),
        extensions: Some(extensions),
        ..error
    }
}

/// Code for errors raised by the GraphQL engine itself, which carry none.
fn classify(error: &ServerError) -> &'static str {
    if error.message == "PersistedQueryNotFound" {
        PERSISTED_QUERY_NOT_FOUND
    } else if error.message.starts_with("Invalid value for argument")
        || error.message.starts_with("Failed to parse")
    {
        BAD_USER_INPUT
    } else if !error.locations.is_empty() && error.path.is_empty() {
        // rejected before execution
        GRAPHQL_VALIDATION_FAILED
    } else {
        INTERNAL_SERVER_ERROR
    }
}

/// Response for a request that never reached execution.
pub fn error_response(error: &GatewayError) -> Response {
    let mut server_error = error.extend().into_server_error(Pos::default());
    server_error.locations.clear();
    Response::from_errors(vec![server_error])
}
