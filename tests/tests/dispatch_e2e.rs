//! End-to-end dispatch tests: decoded payload in, summary map out, with
//! freshness and audit side effects verified in storage.

use serde_json::json;

use etl_core::Error;
use integration_tests::{fixtures, setup};
use market_store::{DataFreshnessRepository, DemographicsRepository, EtlLogRepository};
use market_store::DemographicsStore as _;

#[tokio::test]
async fn test_demographics_dispatch_example_scenario() {
    let store = setup::test_store().await;
    let worker = setup::test_ingestion_worker();

    let result = worker
        .consume(&store, &fixtures::ingestion_payload("demographics", "GH", "Accra"))
        .await
        .unwrap();

    assert_eq!(result["dataset_name"], "demographics");
    assert_eq!(result["status"], "COMPLETED");
    assert_eq!(result["row_count"], 3);
    assert_eq!(result["country"], "GH");
    assert_eq!(result["city"], "Accra");

    // Three region rows land in storage.
    let rows = DemographicsRepository::new()
        .list_for_city(&store, "Accra", Some("GH"))
        .await
        .unwrap();
    let geo_ids: Vec<_> = rows.iter().map(|r| r.geo_id.as_str()).collect();
    assert_eq!(geo_ids, vec!["accra-central", "accra-north", "accra-south"]);

    // One freshness record for the dataset.
    let freshness = DataFreshnessRepository::new()
        .get(&store, "demographics")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(freshness.row_count, 3);
    assert_eq!(freshness.status, "COMPLETED");

    // One new audit entry.
    let logs = EtlLogRepository::new()
        .list_recent(&store, Some("demographics"), 10)
        .await
        .unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].status, "COMPLETED");
    assert_eq!(logs[0].payload["country"], "GH");
}

#[tokio::test]
async fn test_alias_spellings_produce_identical_results() {
    let store = setup::test_store().await;
    let worker = setup::test_ingestion_worker();

    let hyphenated = worker
        .consume(
            &store,
            &fixtures::ingestion_payload("business-density-refresh", "GH", "Accra"),
        )
        .await
        .unwrap();
    let canonical = worker
        .consume(
            &store,
            &fixtures::ingestion_payload("business_density", "GH", "Accra"),
        )
        .await
        .unwrap();

    assert_eq!(hyphenated, canonical);
    assert_eq!(canonical["dataset_name"], "business_density");
    assert_eq!(canonical["row_count"], 2);

    // Both spellings audit under the canonical dataset name.
    let logs = EtlLogRepository::new()
        .list_recent(&store, Some("business_density"), 10)
        .await
        .unwrap();
    assert_eq!(logs.len(), 2);
}

#[tokio::test]
async fn test_job_name_only_payload_routes_via_fallback() {
    let store = setup::test_store().await;
    let worker = setup::test_ingestion_worker();

    let result = worker
        .consume(
            &store,
            &json!({"job_name": "spending-stats-refresh", "country": "GH", "city": "Accra"}),
        )
        .await
        .unwrap();

    assert_eq!(result["dataset_name"], "spending");
    assert_eq!(result["row_count"], 9);
}

#[tokio::test]
async fn test_unsupported_dataset_propagates_original_identifier() {
    let store = setup::test_store().await;
    let worker = setup::test_ingestion_worker();

    let err = worker
        .consume(&store, &json!({"dataset": "Crime-Rates"}))
        .await
        .unwrap_err();

    match err {
        Error::UnsupportedJob(job) => assert_eq!(job, "Crime-Rates"),
        other => panic!("expected UnsupportedJob, got {other:?}"),
    }

    // A rejected dispatch leaves no bookkeeping behind.
    let all = DataFreshnessRepository::new().list_all(&store).await.unwrap();
    assert!(all.is_empty());
    let logs = EtlLogRepository::new().list_recent(&store, None, 10).await.unwrap();
    assert!(logs.is_empty());
}

#[tokio::test]
async fn test_each_dataset_gets_its_own_freshness_row() {
    let store = setup::test_store().await;
    let worker = setup::test_ingestion_worker();

    for dataset in ["demographics", "labour_stats", "spending", "business_density"] {
        worker
            .consume(&store, &fixtures::ingestion_payload(dataset, "GH", "Accra"))
            .await
            .unwrap();
    }

    let all = DataFreshnessRepository::new().list_all(&store).await.unwrap();
    let names: Vec<_> = all.iter().map(|f| f.dataset_name.as_str()).collect();
    assert_eq!(
        names,
        vec!["business_density", "demographics", "labour_stats", "spending"]
    );
    assert!(all.iter().all(|f| f.status == "COMPLETED"));
}
