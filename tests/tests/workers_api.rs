//! Push endpoint tests through the real router.

use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::json;

use integration_tests::{fixtures, setup};
use market_store::EtlLogRepository;

#[tokio::test]
async fn test_ingestion_push_runs_the_job() {
    let (app, store) = setup::test_app().await;
    let server = TestServer::new(app).expect("Failed to create test server");

    let envelope =
        fixtures::push_envelope(fixtures::ingestion_payload("demographics", "GH", "Accra"));
    let response = server.post("/workers/ingestion").json(&envelope).await;

    response.assert_status(StatusCode::OK);
    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], "OK");
    assert_eq!(body["result"]["dataset_name"], "demographics");
    assert_eq!(body["result"]["row_count"], 3);

    let logs = EtlLogRepository::new()
        .list_recent(&store, Some("demographics"), 10)
        .await
        .unwrap();
    assert_eq!(logs.len(), 1);
}

#[tokio::test]
async fn test_embedding_push_runs_the_rebuild() {
    let (app, store) = setup::test_app().await;
    let server = TestServer::new(app).expect("Failed to create test server");

    // Seed datasets first, then rebuild.
    let seed = fixtures::push_envelope(fixtures::ingestion_payload("demographics", "GH", "Accra"));
    server.post("/workers/ingestion").json(&seed).await.assert_status(StatusCode::OK);

    let envelope = fixtures::push_envelope(fixtures::embedding_payload("Accra"));
    let response = server.post("/workers/embeddings").json(&envelope).await;

    response.assert_status(StatusCode::OK);
    let body: serde_json::Value = response.json();
    assert_eq!(body["result"]["job_name"], "rebuild-embeddings");
    assert_eq!(body["result"]["status"], "COMPLETED");
    assert_eq!(body["result"]["region_count"], 3);

    let logs = EtlLogRepository::new()
        .list_recent(&store, Some("rebuild-embeddings"), 10)
        .await
        .unwrap();
    assert_eq!(logs.len(), 1);
}

#[tokio::test]
async fn test_non_object_payload_is_rejected() {
    let (app, _store) = setup::test_app().await;
    let server = TestServer::new(app).expect("Failed to create test server");

    let envelope = json!({
        "message": { "data": "not-an-object" },
    });
    let response = server.post("/workers/ingestion").json(&envelope).await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "Invalid push message payload");
}

#[tokio::test]
async fn test_unknown_dataset_maps_to_400() {
    let (app, _store) = setup::test_app().await;
    let server = TestServer::new(app).expect("Failed to create test server");

    let envelope = fixtures::push_envelope(fixtures::ingestion_payload("weather", "GH", "Accra"));
    let response = server.post("/workers/ingestion").json(&envelope).await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert!(body["error"].as_str().unwrap().contains("weather"));
}

#[tokio::test]
async fn test_embedding_push_without_city_maps_to_400() {
    let (app, _store) = setup::test_app().await;
    let server = TestServer::new(app).expect("Failed to create test server");

    let envelope = fixtures::push_envelope(json!({"job_name": "rebuild-embeddings"}));
    let response = server.post("/workers/embeddings").json(&envelope).await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_health_reports_database_connection() {
    let (app, _store) = setup::test_app().await;
    let server = TestServer::new(app).expect("Failed to create test server");

    let response = server.get("/health").await;

    response.assert_status(StatusCode::OK);
    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database_connected"], true);
}
