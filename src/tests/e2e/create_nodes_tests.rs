use rstest::rstest;
use serde_json::json;

use crate::tests::fixtures::app::{TestApp, fixed_app};

#[rstest]
#[tokio::test]
async fn it_should_create_a_device_inside_a_building(#[future] fixed_app: TestApp) {
    let app = fixed_app.await;

    let created = app
        .query(
            r#"mutation {
                createDevice(id: 3, name: "Boiler", type: "Heating", buildingId: "2") {
                    id name type building { name }
                }
            }"#,
        )
        .await;
    assert_eq!(
        created["data"]["createDevice"],
        json!({ "id": 3, "name": "Boiler", "type": "Heating", "building": { "name": "Office Building B" } })
    );

    let listed = app
        .query(r#"{ buildings(where: { id: 2 }) { devices { name } } }"#)
        .await;
    assert_eq!(
        listed["data"]["buildings"],
        json!([{ "devices": [{ "name": "Boiler" }] }])
    );
}

#[rstest]
#[tokio::test]
async fn it_should_create_a_reading_for_a_meter(#[future] fixed_app: TestApp) {
    let app = fixed_app.await;

    let created = app
        .query(
            r#"mutation {
                createReading(id: 3, value: 12.5, unit: "m3", meterId: "2") {
                    value device { id } meter { serialNumber }
                }
            }"#,
        )
        .await;

    assert_eq!(
        created["data"]["createReading"],
        json!({ "value": 12.5, "device": null, "meter": { "serialNumber": "MTR002" } })
    );
    assert_eq!(app.graph.nodes("Reading").await.len(), 3);
}

#[rstest]
#[tokio::test]
async fn it_should_report_a_missing_parent_without_writing(#[future] fixed_app: TestApp) {
    let app = fixed_app.await;

    let body = app
        .query(
            r#"mutation { createMeter(id: 3, serialNumber: "MTR003", type: "Gas", buildingId: "9") { id } }"#,
        )
        .await;

    assert_eq!(body["errors"][0]["extensions"]["code"], "NOT_FOUND");
    assert_eq!(body["errors"][0]["message"], "Building with id 9 not found");
    assert_eq!(app.graph.nodes("Meter").await.len(), 2);
}

#[rstest]
#[tokio::test]
async fn it_should_reject_a_non_integer_parent_id(#[future] fixed_app: TestApp) {
    let app = fixed_app.await;

    let body = app
        .query(
            r#"mutation { createDevice(id: 3, name: "Boiler", type: "Heating", buildingId: "b-1") { id } }"#,
        )
        .await;

    assert_eq!(body["errors"][0]["extensions"]["code"], "BAD_USER_INPUT");
    assert_eq!(body["errors"][0]["path"], json!(["createDevice"]));
}
