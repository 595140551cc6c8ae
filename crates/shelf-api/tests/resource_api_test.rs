//! Integration tests for the in-memory list resource over HTTP
//!
//! These tests drive the full router (middleware included) and check the
//! status codes and JSON bodies of the create / list / get / delete routes.

use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::{Value, json};
use shelf_api::config::{ResourceConfig, ShelfConfig};
use shelf_api::create_app;

/// Helper function to create a test server with a single memory resource
async fn create_test_server() -> TestServer {
    let config =
        ShelfConfig { resources: vec![ResourceConfig::memory("list")], ..ShelfConfig::default() };
    let app = create_app(&config).await.expect("Failed to create app");
    TestServer::new(app).expect("Failed to create test server")
}

async fn create(server: &TestServer, name: &str) {
    let response = server.post("/list").json(&json!({ "name": name })).await;
    assert_eq!(response.status_code(), StatusCode::CREATED);
    assert_eq!(response.json::<Value>(), json!({"message": "ok!"}));
}

#[tokio::test]
async fn test_get_on_empty_list_is_out_of_bound() {
    let server = create_test_server().await;

    let response = server.get("/list/0").await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>(), json!({"message": "out of bound"}));
}

#[tokio::test]
async fn test_list_preserves_insertion_order() {
    let server = create_test_server().await;
    create(&server, "Jon").await;
    create(&server, "Linda").await;

    let response = server.get("/list").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(
        response.json::<Value>(),
        json!({"message": "ok!", "items": [{"name": "Jon"}, {"name": "Linda"}]})
    );
}

#[tokio::test]
async fn test_delete_returns_removed_item_and_shifts() {
    let server = create_test_server().await;
    create(&server, "Jon").await;
    create(&server, "Linda").await;

    let response = server.delete("/list/0").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(
        response.json::<Value>(),
        json!({"message": "ok!", "removed_item": {"name": "Jon"}})
    );

    let response = server.get("/list").await;
    assert_eq!(response.json::<Value>(), json!({"message": "ok!", "items": [{"name": "Linda"}]}));

    let response = server.get("/list/0").await;
    assert_eq!(response.json::<Value>(), json!({"message": "ok!", "items": {"name": "Linda"}}));
}

#[tokio::test]
async fn test_negative_and_malformed_positions() {
    let server = create_test_server().await;
    create(&server, "Jon").await;

    for path in ["/list/-1", "/list/1", "/list/abc", "/list/1.0"] {
        let response = server.get(path).await;
        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST, "GET {path}");
        assert_eq!(response.json::<Value>(), json!({"message": "out of bound"}));

        let response = server.delete(path).await;
        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST, "DELETE {path}");
        assert_eq!(response.json::<Value>(), json!({"message": "out of bound"}));
    }

    let response = server.get("/list").await;
    assert_eq!(response.json::<Value>(), json!({"message": "ok!", "items": [{"name": "Jon"}]}));
}

#[tokio::test]
async fn test_payload_fields_pass_through() {
    let server = create_test_server().await;
    let payload = json!({"Name": "Linda", "LastName": "Witherfork", "Age": 34, "Nick": null});
    server.post("/list").json(&payload).await.assert_status(StatusCode::CREATED);

    let response = server.get("/list/0").await;
    assert_eq!(response.json::<Value>()["items"], payload);
}

#[tokio::test]
async fn test_integers_beyond_i64_round_trip_exactly() {
    let server = create_test_server().await;
    let payload = json!({"n": 18_446_744_073_709_551_615_u64});
    server.post("/list").json(&payload).await.assert_status(StatusCode::CREATED);

    let response = server.get("/list/0").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.json::<Value>(), json!({"message": "ok!", "items": payload}));
}

#[tokio::test]
async fn test_rejects_non_scalar_and_malformed_payloads() {
    let server = create_test_server().await;

    let response = server.post("/list").json(&json!({"tags": ["a", "b"]})).await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["code"], "VALIDATION_ERROR");

    let response = server.post("/list").text("{not json").content_type("application/json").await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    let response = server.get("/list").await;
    assert_eq!(response.json::<Value>(), json!({"message": "ok!", "items": []}));
}

#[tokio::test]
async fn test_unknown_resource_is_not_found() {
    let server = create_test_server().await;

    let response = server.get("/recordings").await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    assert_eq!(response.json::<Value>()["code"], "NOT_FOUND");

    let response = server.post("/recordings").json(&json!({"name": "x"})).await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_responses_carry_request_id() {
    let server = create_test_server().await;
    let response = server.get("/list").await;
    let request_id = response.header("x-request-id");
    assert!(!request_id.is_empty());
}

#[tokio::test]
async fn test_health_reports_resources() {
    let server = create_test_server().await;
    create(&server, "Jon").await;

    let response = server.get("/health").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body = response.json::<Value>();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["resources"][0]["name"], "list");
    assert_eq!(body["resources"][0]["backend"], "memory");
    assert_eq!(body["resources"][0]["records"], 1);
}
