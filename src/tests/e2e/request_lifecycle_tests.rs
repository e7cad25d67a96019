use axum::http::StatusCode;
use rstest::rstest;
use serde_json::{Value, json};
use sha2::{Digest, Sha256};

use crate::shared::infrastructure::graph_store::Credentials;
use crate::tests::fixtures::app::{AppOptions, PATH, TestApp, bearer_app, fixed_app, token_for};

const BAD_PATTERN: &str = r#"{ buildings(where: { name_MATCHES: "(" }) { id } }"#;

fn keys(error: &Value) -> Vec<&str> {
    let mut keys: Vec<&str> = error
        .as_object()
        .unwrap()
        .keys()
        .map(String::as_str)
        .collect();
    keys.sort_unstable();
    keys
}

#[rstest]
#[tokio::test]
async fn it_should_close_the_session_after_each_response(#[future] fixed_app: TestApp) {
    let app = fixed_app.await;

    app.query("{ buildings { id devices { id } } }").await;
    app.query("{ meters { id } }").await;

    assert_eq!(app.graph.sessions_opened(), 3);
    assert_eq!(app.graph.sessions_closed(), 3);
    // only the seeding driver; the shared one stays open
    assert_eq!(app.graph.drivers_closed(), 1);
}

#[rstest]
#[tokio::test]
async fn it_should_connect_with_the_bearer_identity(#[future] bearer_app: TestApp) {
    let app = bearer_app.await;
    let token = token_for("facility@example.com");

    let (status, body) = app
        .post(
            json!({ "query": "{ buildings { name } }" }),
            Some(&format!("Bearer {token}")),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["buildings"][1]["name"], "Office Building B");
    assert_eq!(
        app.graph.connections().await.last(),
        Some(&Credentials::new("facility@example.com", token))
    );
    assert_eq!(app.graph.drivers_opened(), app.graph.drivers_closed());
    assert_eq!(app.graph.sessions_opened(), app.graph.sessions_closed());
}

#[rstest]
#[tokio::test]
async fn it_should_connect_anonymously_without_a_token(#[future] bearer_app: TestApp) {
    let app = bearer_app.await;

    app.post(json!({ "query": "{ meters { id } }" }), None).await;

    assert_eq!(
        app.graph.connections().await.last(),
        Some(&Credentials::default())
    );
}

#[rstest]
#[tokio::test]
async fn it_should_swallow_close_failures(#[future] bearer_app: TestApp) {
    let app = bearer_app.await;
    app.graph.set_fail_on_close(true);

    let (status, body) = app
        .post(json!({ "query": "{ readings { value } }" }), None)
        .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.get("errors").is_none(), "{body}");
    assert_eq!(app.graph.drivers_opened(), app.graph.drivers_closed());
}

#[rstest]
#[tokio::test]
async fn it_should_wrap_errors_in_the_envelope(#[future] fixed_app: TestApp) {
    let app = fixed_app.await;

    let body = app.query(BAD_PATTERN).await;

    let error = &body["errors"][0];
    assert_eq!(keys(error), vec!["extensions", "message", "path"]);
    assert_eq!(error["extensions"], json!({ "code": "BAD_USER_INPUT" }));
    assert_eq!(error["path"], json!(["buildings"]));
}

#[rstest]
#[tokio::test]
async fn it_should_keep_library_errors_in_default_format(#[future] bearer_app: TestApp) {
    let app = bearer_app.await;

    let (_, body) = app.post(json!({ "query": BAD_PATTERN }), None).await;

    let error = &body["errors"][0];
    assert!(keys(error).contains(&"locations"), "{error}");
    assert_eq!(error["extensions"]["code"], "BAD_USER_INPUT");
}

#[rstest]
#[tokio::test]
async fn it_should_answer_with_a_graphql_error_when_the_database_is_down(
    #[future] fixed_app: TestApp,
) {
    let app = fixed_app.await;
    app.graph.toggle_offline();

    let body = app.query("{ buildings { id } }").await;

    assert!(body["data"].is_null());
    assert_eq!(
        body["errors"][0]["extensions"],
        json!({ "code": "DATABASE_UNAVAILABLE" })
    );
}

#[rstest]
#[tokio::test]
async fn it_should_serve_graphiql_on_a_bare_get(#[future] fixed_app: TestApp) {
    let app = fixed_app.await;

    let (status, page) = app.get("").await;

    assert_eq!(status, StatusCode::OK);
    assert!(page.contains(PATH));
    assert_eq!(app.graph.sessions_opened(), 1);
}

#[rstest]
#[tokio::test]
async fn it_should_execute_a_get_that_carries_a_query(#[future] fixed_app: TestApp) {
    let app = fixed_app.await;

    let (status, body) = app
        .get("query=%7B%20meters%20%7B%20serialNumber%20%7D%20%7D")
        .await;

    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(
        body["data"],
        json!({ "meters": [{ "serialNumber": "MTR001" }, { "serialNumber": "MTR002" }] })
    );
    assert_eq!(app.graph.sessions_opened(), app.graph.sessions_closed());
}

#[rstest]
#[tokio::test]
async fn it_should_reject_a_get_with_malformed_extensions(#[future] fixed_app: TestApp) {
    let app = fixed_app.await;

    let (status, _) = app.get("extensions=not-json").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(app.graph.sessions_opened(), 1);
}

#[rstest]
#[tokio::test]
async fn it_should_run_a_batch_on_one_session(#[future] fixed_app: TestApp) {
    let app = fixed_app.await;

    let (status, body) = app
        .post(
            json!([
                { "query": "{ meters { id } }" },
                { "query": "{ readings { unit } }" }
            ]),
            None,
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!([
            { "data": { "meters": [{ "id": 1 }, { "id": 2 }] } },
            { "data": { "readings": [{ "unit": "kWh" }, { "unit": "kWh" }] } }
        ])
    );
    // one for seeding, one for the batch
    assert_eq!(app.graph.sessions_opened(), 2);
    assert_eq!(app.graph.sessions_closed(), 2);
}

#[rstest]
#[tokio::test]
async fn it_should_answer_every_operation_of_a_batch_when_the_database_is_down(
    #[future] fixed_app: TestApp,
) {
    let app = fixed_app.await;
    app.graph.toggle_offline();

    let (_, body) = app
        .post(
            json!([{ "query": "{ meters { id } }" }, { "query": "{ devices { id } }" }]),
            None,
        )
        .await;

    let responses = body.as_array().unwrap();
    assert_eq!(responses.len(), 2);
    for response in responses {
        assert_eq!(response["errors"][0]["extensions"]["code"], "DATABASE_UNAVAILABLE");
    }
}

#[rstest]
#[tokio::test]
async fn it_should_label_validation_failures(#[future] fixed_app: TestApp) {
    let app = fixed_app.await;

    let body = app.query("{ buildings { floors } }").await;

    let error = &body["errors"][0];
    assert_eq!(keys(error), vec!["extensions", "message"]);
    assert_eq!(error["extensions"], json!({ "code": "GRAPHQL_VALIDATION_FAILED" }));
}

#[rstest]
#[tokio::test]
async fn it_should_label_invalid_argument_values(#[future] fixed_app: TestApp) {
    let app = fixed_app.await;

    let body = app
        .query(r#"{ buildings(where: { id: "one" }) { id } }"#)
        .await;

    assert_eq!(body["errors"][0]["extensions"]["code"], "BAD_USER_INPUT");
}

fn persisted(query: Option<&str>, hash: &str) -> Value {
    let mut body = json!({
        "extensions": { "persistedQuery": { "version": 1, "sha256Hash": hash } }
    });
    if let Some(query) = query {
        body["query"] = json!(query);
    }
    body
}

fn sha256(query: &str) -> String {
    format!("{:x}", Sha256::digest(query.as_bytes()))
}

#[rstest]
#[tokio::test]
async fn it_should_serve_registered_persisted_queries(#[future] fixed_app: TestApp) {
    let app = fixed_app.await;
    let query = "{ buildings { name } }";
    let hash = sha256(query);

    let (_, unknown) = app.post(persisted(None, &hash), None).await;
    assert_eq!(unknown["errors"][0]["message"], "PersistedQueryNotFound");
    assert_eq!(
        unknown["errors"][0]["extensions"]["code"],
        "PERSISTED_QUERY_NOT_FOUND"
    );

    let (_, registered) = app.post(persisted(Some(query), &hash), None).await;
    let (_, replayed) = app.post(persisted(None, &hash), None).await;

    let expected = json!({
        "buildings": [{ "name": "Office Building A" }, { "name": "Office Building B" }]
    });
    assert_eq!(registered["data"], expected);
    assert_eq!(replayed["data"], expected);
    assert!(replayed.get("errors").is_none(), "{replayed}");
}

#[rstest]
#[tokio::test]
async fn it_should_refuse_a_mismatched_persisted_query_hash(#[future] fixed_app: TestApp) {
    let app = fixed_app.await;

    let (_, body) = app
        .post(persisted(Some("{ meters { id } }"), &sha256("{ devices { id } }")), None)
        .await;

    assert_eq!(body["errors"][0]["message"], "provided sha does not match query");
    assert!(body["data"].is_null());
}

#[rstest]
#[tokio::test]
async fn it_should_ignore_persisted_query_hashes_when_disabled() {
    let app = TestApp::start(AppOptions {
        persisted_queries: false,
        ..AppOptions::default()
    })
    .await;
    let query = "{ buildings { name } }";
    let hash = sha256(query);

    let (_, registered) = app.post(persisted(Some(query), &hash), None).await;
    let (_, replayed) = app.post(persisted(None, &hash), None).await;

    assert_eq!(registered["data"]["buildings"][0]["name"], "Office Building A");
    assert!(replayed["data"].is_null());
    assert_ne!(
        replayed["errors"][0]["extensions"]["code"],
        "PERSISTED_QUERY_NOT_FOUND"
    );
}
