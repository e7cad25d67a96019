use axum::Router;
use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use jsonwebtoken::{EncodingKey, Header, encode};
use rstest::fixture;
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

use crate::modules::energy_graph::use_cases::query_nodes::filter::QuerySettings;
use crate::shared::infrastructure::graph_store::in_memory::InMemoryGraph;
use crate::shared::infrastructure::graph_store::{Credentials, DriverFactory};
use crate::shell::config::ErrorFormat;
use crate::shell::graphql::{SchemaSettings, build_schema};
use crate::shell::http::router;
use crate::shell::state::{AppState, Drivers};
use crate::tests::fixtures::graph::seed;

pub const PATH: &str = "/graphql";

#[derive(Debug, Clone, Copy)]
pub struct AppOptions {
    pub bearer: bool,
    pub error_format: ErrorFormat,
    pub enable_regex: bool,
    pub persisted_queries: bool,
}

impl Default for AppOptions {
    fn default() -> Self {
        Self {
            bearer: false,
            error_format: ErrorFormat::Envelope,
            enable_regex: true,
            persisted_queries: true,
        }
    }
}

pub struct TestApp {
    pub graph: InMemoryGraph,
    pub router: Router,
}

impl TestApp {
    /// Router over a seeded in-memory graph. In fixed mode the shared driver
    /// is connected here, like the binary does at startup.
    pub async fn start(options: AppOptions) -> Self {
        let graph = InMemoryGraph::new();
        seed(&graph).await;

        let drivers = if options.bearer {
            Drivers::PerRequest(Arc::new(graph.clone()))
        } else {
            Drivers::Shared(graph.connect(&Credentials::default()).await.unwrap())
        };
        let schema = build_schema(SchemaSettings {
            query: QuerySettings {
                enable_regex: options.enable_regex,
            },
            persisted_queries: options.persisted_queries,
        })
        .unwrap();
        let state = AppState {
            schema,
            drivers,
            error_format: options.error_format,
        };

        Self {
            graph,
            router: router(state, PATH),
        }
    }

    pub async fn post(&self, body: Value, authorization: Option<&str>) -> (StatusCode, Value) {
        let mut request = Request::builder()
            .method("POST")
            .uri(PATH)
            .header(CONTENT_TYPE, "application/json");
        if let Some(authorization) = authorization {
            request = request.header(AUTHORIZATION, authorization);
        }
        let request = request.body(Body::from(body.to_string())).unwrap();

        let (status, body) = self.send(request).await;
        (status, serde_json::from_str(&body).unwrap())
    }

    /// GET on the endpoint with the given query string (without `?`).
    pub async fn get(&self, query_string: &str) -> (StatusCode, String) {
        let uri = if query_string.is_empty() {
            PATH.to_string()
        } else {
            format!("{PATH}?{query_string}")
        };
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        self.send(request).await
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, String) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    pub async fn query(&self, query: &str) -> Value {
        let (status, body) = self.post(json!({ "query": query }), None).await;
        assert_eq!(status, StatusCode::OK);
        body
    }
}

pub fn token_for(email: &str) -> String {
    encode(
        &Header::default(),
        &json!({ "email": email, "sub": "user-1" }),
        &EncodingKey::from_secret(b"issuer-secret"),
    )
    .unwrap()
}

#[fixture]
pub async fn fixed_app() -> TestApp {
    TestApp::start(AppOptions::default()).await
}

#[fixture]
pub async fn bearer_app() -> TestApp {
    TestApp::start(AppOptions {
        bearer: true,
        error_format: ErrorFormat::Default,
        ..AppOptions::default()
    })
    .await
}
