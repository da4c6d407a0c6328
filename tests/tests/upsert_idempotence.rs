//! Idempotent upsert tests: replaying identical rows updates in place,
//! never duplicates, and restamps `last_updated`.

use chrono::{Duration, Utc};
use serde_json::json;
use uuid::Uuid;

use etl_core::{DemographicsRow, SpendingRow};
use integration_tests::setup;
use market_store::{DemographicsRepository, DemographicsStore, SpendingRepository, SpendingStore};

fn accra_row(geo_id: &str, population: i64) -> DemographicsRow {
    DemographicsRow {
        tenant_id: None,
        geo_id: geo_id.into(),
        country: "GH".into(),
        city: "Accra".into(),
        population_total: Some(population),
        median_income: Some(50_000.0),
        age_distribution: Some(json!({"18-35": 0.4})),
        education_levels: None,
        household_size_avg: Some(3.6),
        immigration_ratio: None,
        coordinates: None,
    }
}

#[tokio::test]
async fn test_replay_of_identical_rows_is_idempotent() {
    let store = setup::test_store().await;
    let repo = DemographicsRepository::new();
    let rows = vec![accra_row("accra-central", 150_000), accra_row("accra-north", 170_000)];
    let now = Utc::now();

    let first = repo.upsert_many(&store, &rows, now).await.unwrap();
    let second = repo.upsert_many(&store, &rows, now).await.unwrap();

    // Affected count is rows processed, both times.
    assert_eq!(first, 2);
    assert_eq!(second, 2);

    // Exactly one row per natural key.
    let stored = repo.list_for_city(&store, "Accra", Some("GH")).await.unwrap();
    assert_eq!(stored.len(), 2);

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM demographics")
        .fetch_one(store.pool())
        .await
        .unwrap();
    assert_eq!(count, 2);
}

#[tokio::test]
async fn test_second_call_replaces_last_updated() {
    let store = setup::test_store().await;
    let repo = DemographicsRepository::new();
    let rows = vec![accra_row("accra-central", 150_000)];

    let first_run = Utc::now();
    let second_run = first_run + Duration::seconds(90);

    repo.upsert_many(&store, &rows, first_run).await.unwrap();
    let stamped_first: String =
        sqlx::query_scalar("SELECT last_updated FROM demographics WHERE geo_id = 'accra-central'")
            .fetch_one(store.pool())
            .await
            .unwrap();

    repo.upsert_many(&store, &rows, second_run).await.unwrap();
    let stamped_second: String =
        sqlx::query_scalar("SELECT last_updated FROM demographics WHERE geo_id = 'accra-central'")
            .fetch_one(store.pool())
            .await
            .unwrap();

    assert_eq!(stamped_first, first_run.to_rfc3339());
    assert_eq!(stamped_second, second_run.to_rfc3339());
    assert_ne!(stamped_first, stamped_second);
}

#[tokio::test]
async fn test_update_overwrites_values_but_not_key_or_tenant() {
    let store = setup::test_store().await;
    let repo = DemographicsRepository::new();
    let now = Utc::now();

    let tenant = Uuid::new_v4();
    let mut original = accra_row("accra-central", 150_000);
    original.tenant_id = Some(tenant);
    repo.upsert_many(&store, &[original], now).await.unwrap();

    // Same key, new values, different tenant on the incoming row.
    let mut updated = accra_row("accra-central", 210_000);
    updated.tenant_id = Some(Uuid::new_v4());
    updated.median_income = Some(61_500.0);
    repo.upsert_many(&store, &[updated], now).await.unwrap();

    let stored = repo.list_for_city(&store, "Accra", Some("GH")).await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].population_total, Some(210_000));
    assert_eq!(stored[0].median_income, Some(61_500.0));
    // The existing row's tenant binding survives the update.
    assert_eq!(stored[0].tenant_id, Some(tenant));
    assert_eq!(stored[0].geo_id, "accra-central");
}

#[tokio::test]
async fn test_spending_keys_on_category_too() {
    let store = setup::test_store().await;
    let repo = SpendingRepository::new();
    let now = Utc::now();

    let row = |category: &str, spend: f64| SpendingRow {
        tenant_id: None,
        geo_id: "accra-central".into(),
        country: "GH".into(),
        city: "Accra".into(),
        category: category.into(),
        avg_monthly_spend: Some(spend),
        spend_index: Some(1.0),
    };

    repo.upsert_many(
        &store,
        &[row("groceries", 350.0), row("dining", 220.0)],
        now,
    )
    .await
    .unwrap();
    // Same geo, one category refreshed.
    repo.upsert_many(&store, &[row("dining", 240.0)], now)
        .await
        .unwrap();

    let stored = repo.list_for_city(&store, "Accra", Some("GH")).await.unwrap();
    assert_eq!(stored.len(), 2);

    let dining = stored.iter().find(|r| r.category == "dining").unwrap();
    assert_eq!(dining.avg_monthly_spend, Some(240.0));
    let groceries = stored.iter().find(|r| r.category == "groceries").unwrap();
    assert_eq!(groceries.avg_monthly_spend, Some(350.0));
}

#[tokio::test]
async fn test_json_columns_round_trip() {
    let store = setup::test_store().await;
    let repo = DemographicsRepository::new();
    let mut row = accra_row("accra-central", 150_000);
    row.coordinates = Some(json!({"lat": 5.56, "lon": -0.2}));

    repo.upsert_many(&store, &[row], Utc::now()).await.unwrap();

    let stored = repo.list_for_city(&store, "Accra", None).await.unwrap();
    assert_eq!(stored[0].age_distribution, Some(json!({"18-35": 0.4})));
    assert_eq!(stored[0].coordinates, Some(json!({"lat": 5.56, "lon": -0.2})));
}
