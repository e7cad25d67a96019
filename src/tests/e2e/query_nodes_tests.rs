use rstest::rstest;
use serde_json::json;

use crate::tests::fixtures::app::{AppOptions, TestApp, fixed_app};

#[rstest]
#[tokio::test]
async fn it_should_resolve_nested_relationships(#[future] fixed_app: TestApp) {
    let app = fixed_app.await;

    let body = app
        .query(
            "{ buildings { name devices { name readings { value unit } } meters { serialNumber } } }",
        )
        .await;

    assert_eq!(
        body["data"],
        json!({
            "buildings": [
                {
                    "name": "Office Building A",
                    "devices": [
                        { "name": "HVAC System 1", "readings": [{ "value": 450.0, "unit": "kWh" }] },
                        { "name": "Lighting System 1", "readings": [{ "value": 180.0, "unit": "kWh" }] }
                    ],
                    "meters": [{ "serialNumber": "MTR001" }]
                },
                {
                    "name": "Office Building B",
                    "devices": [],
                    "meters": [{ "serialNumber": "MTR002" }]
                }
            ]
        })
    );
}

#[rstest]
#[tokio::test]
async fn it_should_resolve_relationships_towards_parents(#[future] fixed_app: TestApp) {
    let app = fixed_app.await;

    let body = app
        .query("{ readings { id device { name building { address } } meter { serialNumber } } }")
        .await;

    assert_eq!(
        body["data"]["readings"][0],
        json!({
            "id": 1,
            "device": { "name": "HVAC System 1", "building": { "address": "123 Main St" } },
            "meter": null
        })
    );
}

#[rstest]
#[tokio::test]
async fn it_should_filter_by_equality_and_pattern(#[future] fixed_app: TestApp) {
    let app = fixed_app.await;

    let body = app
        .query(
            r#"{
                devices(where: { name_MATCHES: "HVAC.*" }) { name type }
                meters(where: { type: "Water" }) { serialNumber building { name } }
            }"#,
        )
        .await;

    assert_eq!(
        body["data"],
        json!({
            "devices": [{ "name": "HVAC System 1", "type": "HVAC" }],
            "meters": [{ "serialNumber": "MTR002", "building": { "name": "Office Building B" } }]
        })
    );
}

#[rstest]
#[tokio::test]
async fn it_should_page_through_results_in_id_order(#[future] fixed_app: TestApp) {
    let app = fixed_app.await;

    let body = app
        .query("{ buildings(options: { limit: 1, offset: 1 }) { id } }")
        .await;

    assert_eq!(body["data"], json!({ "buildings": [{ "id": 2 }] }));
}

#[rstest]
#[tokio::test]
async fn it_should_sort_by_the_requested_properties(#[future] fixed_app: TestApp) {
    let app = fixed_app.await;

    let body = app
        .query(
            r#"{
                devices(options: { sort: [{ name: DESC }] }) { name }
                readings(options: { sort: [{ value: ASC }], limit: 1 }) { id value }
                meters(options: { sort: [{ type: DESC }, { id: ASC }] }) { serialNumber }
            }"#,
        )
        .await;

    assert_eq!(
        body["data"],
        json!({
            "devices": [{ "name": "Lighting System 1" }, { "name": "HVAC System 1" }],
            "readings": [{ "id": 2, "value": 180.0 }],
            "meters": [{ "serialNumber": "MTR002" }, { "serialNumber": "MTR001" }]
        })
    );
}

#[rstest]
#[tokio::test]
async fn it_should_reject_an_unknown_sort_direction(#[future] fixed_app: TestApp) {
    let app = fixed_app.await;

    let body = app
        .query("{ buildings(options: { sort: [{ name: SIDEWAYS }] }) { id } }")
        .await;

    assert!(body["data"].is_null());
    assert_eq!(body["errors"][0]["extensions"]["code"], "BAD_USER_INPUT");
}

#[rstest]
#[tokio::test]
async fn it_should_reject_pattern_filters_when_disabled() {
    let app = TestApp::start(AppOptions {
        enable_regex: false,
        ..AppOptions::default()
    })
    .await;

    let body = app
        .query(r#"{ buildings(where: { name_MATCHES: "Office.*" }) { id } }"#)
        .await;

    assert_eq!(body["errors"][0]["extensions"]["code"], "BAD_USER_INPUT");
    assert_eq!(body["errors"][0]["path"], json!(["buildings"]));
}
