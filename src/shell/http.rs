use async_graphql::http::{GraphiQLSource, parse_query_string};
use async_graphql::{BatchRequest, BatchResponse};
use async_graphql_axum::rejection::GraphQLRejection;
use async_graphql_axum::{GraphQLBatchRequest, GraphQLResponse};
use axum::{
    Extension, Router,
    extract::{RawQuery, State},
    http::HeaderMap,
    response::{Html, IntoResponse, Response},
    routing::get,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::Instrument;

use crate::shell::context::CloseGuard;
use crate::shell::errors::{error_response, format_response};
use crate::shell::state::AppState;

#[derive(Clone)]
struct GraphiqlEndpoint(String);

pub fn router(state: AppState, path: &str) -> Router {
    Router::new()
        .route(path, get(graphql_get).post(graphql_post))
        .layer(Extension(GraphiqlEndpoint(path.to_string())))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// A GET carrying `query` or `extensions` is executed; a bare GET gets GraphiQL.
async fn graphql_get(
    State(state): State<AppState>,
    Extension(endpoint): Extension<GraphiqlEndpoint>,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
) -> Response {
    let Some(query) = query.filter(|query| carries_operation(query)) else {
        return graphiql(&endpoint.0).into_response();
    };
    match parse_query_string(&query) {
        Ok(request) => execute(&state, &headers, BatchRequest::Single(request))
            .await
            .into_response(),
        Err(e) => GraphQLRejection(e).into_response(),
    }
}

async fn graphql_post(
    State(state): State<AppState>,
    headers: HeaderMap,
    request: GraphQLBatchRequest,
) -> GraphQLResponse {
    execute(&state, &headers, request.into_inner()).await
}

/// Opens one session for the whole HTTP request, executes every operation in
/// it, then closes the session before the response leaves the handler.
async fn execute(state: &AppState, headers: &HeaderMap, batch: BatchRequest) -> GraphQLResponse {
    let context = match state.open_context(headers).await {
        Ok(context) => context,
        Err(e) => {
            tracing::warn!(error = %e, "could not open a graph session");
            let failed = || format_response(error_response(&e), state.error_format);
            return match batch {
                BatchRequest::Single(_) => failed().into(),
                BatchRequest::Batch(requests) => {
                    BatchResponse::Batch(requests.iter().map(|_| failed()).collect()).into()
                }
            };
        }
    };

    let span = tracing::info_span!("graphql", session_id = %context.session_id);
    let session = context.session.clone();
    let guard = CloseGuard::new(context);
    let response = state
        .schema
        .execute_batch(batch.data(session))
        .instrument(span)
        .await;
    guard.close().await;

    match response {
        BatchResponse::Single(response) => format_response(response, state.error_format).into(),
        BatchResponse::Batch(responses) => BatchResponse::Batch(
            responses
                .into_iter()
                .map(|response| format_response(response, state.error_format))
                .collect(),
        )
        .into(),
    }
}

fn carries_operation(query: &str) -> bool {
    query
        .split('&')
        .filter_map(|pair| pair.split('=').next())
        .any(|key| key == "query" || key == "extensions")
}

fn graphiql(endpoint: &str) -> Html<String> {
    Html(GraphiQLSource::build().endpoint(endpoint).finish())
}
