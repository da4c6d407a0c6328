//! Failure propagation: a failing fetch marks the dataset FAILED, audits
//! the attempt, and re-raises the original error.

use std::sync::Arc;

use serde_json::Map;

use etl_core::Error;
use integration_tests::{mocks::FailingDemographicsSource, setup};
use jobs::DemographicsEtlJob;
use market_store::{
    DataFreshnessRepository, DemographicsRepository, EtlLogRepository,
};

fn failing_job() -> DemographicsEtlJob {
    DemographicsEtlJob::new(
        Arc::new(DemographicsRepository::new()),
        Arc::new(DataFreshnessRepository::new()),
        Arc::new(EtlLogRepository::new()),
        Arc::new(FailingDemographicsSource::new("census API returned 503")),
    )
}

#[tokio::test]
async fn test_source_failure_writes_failed_freshness_and_audit() {
    let store = setup::test_store().await;

    let err = failing_job()
        .run(&store, Some("GH"), Some("Accra"), &Map::new())
        .await
        .unwrap_err();

    // Original error type and message survive the bookkeeping.
    match &err {
        Error::SourceFetch(msg) => assert!(msg.contains("census API returned 503")),
        other => panic!("expected SourceFetch, got {other:?}"),
    }

    let freshness = DataFreshnessRepository::new()
        .get(&store, "demographics")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(freshness.status, "FAILED");
    assert_eq!(freshness.row_count, 0);

    let logs = EtlLogRepository::new()
        .list_recent(&store, Some("demographics"), 10)
        .await
        .unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].status, "FAILED");
    assert_eq!(logs[0].payload["city"], "Accra");
}

#[tokio::test]
async fn test_exactly_one_bookkeeping_mutation_per_run() {
    let store = setup::test_store().await;
    let job = failing_job();

    // Three failing runs: one freshness row overwritten three times, three
    // audit entries appended.
    for _ in 0..3 {
        job.run(&store, Some("GH"), Some("Accra"), &Map::new())
            .await
            .unwrap_err();
    }

    let freshness_rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM data_freshness")
        .fetch_one(store.pool())
        .await
        .unwrap();
    assert_eq!(freshness_rows, 1);

    let audit_rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM etl_logs")
        .fetch_one(store.pool())
        .await
        .unwrap();
    assert_eq!(audit_rows, 3);
}

#[tokio::test]
async fn test_failure_then_success_overwrites_freshness() {
    let store = setup::test_store().await;

    failing_job()
        .run(&store, Some("GH"), Some("Accra"), &Map::new())
        .await
        .unwrap_err();

    let freshness = DataFreshnessRepository::new()
        .get(&store, "demographics")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(freshness.status, "FAILED");

    DemographicsEtlJob::create_default()
        .run(&store, Some("GH"), Some("Accra"), &Map::new())
        .await
        .unwrap();

    let freshness = DataFreshnessRepository::new()
        .get(&store, "demographics")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(freshness.status, "COMPLETED");
    assert_eq!(freshness.row_count, 3);
}

#[tokio::test]
async fn test_dispatch_propagates_job_failure_after_bookkeeping() {
    let store = setup::test_store().await;

    // A worker whose demographics job always fails.
    let mut handlers: std::collections::HashMap<
        etl_core::Dataset,
        Arc<dyn jobs::IngestionHandler>,
    > = std::collections::HashMap::new();
    handlers.insert(etl_core::Dataset::Demographics, Arc::new(failing_job()));
    let worker = jobs::IngestionWorker::new(handlers);

    let err = worker
        .consume(
            &store,
            &integration_tests::fixtures::ingestion_payload("demographics", "GH", "Accra"),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, Error::SourceFetch(_)));

    // The router does not swallow the failure, and the bookkeeping is visible.
    let logs = EtlLogRepository::new()
        .list_recent(&store, Some("demographics"), 10)
        .await
        .unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].status, "FAILED");
}
