//! Table definitions for the normalized market tables and pipeline
//! bookkeeping.
//!
//! Natural keys are enforced with unique indexes; `vector_insights` keys on
//! `(tenant_id, geo_id)` in repository logic because SQLite treats NULL
//! tenant ids as distinct in a unique index.

use sqlx::sqlite::SqlitePool;

use etl_core::Result;

use crate::store::db_err;

const TABLES: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS demographics (
        id TEXT PRIMARY KEY,
        tenant_id TEXT,
        geo_id TEXT NOT NULL,
        country TEXT NOT NULL,
        city TEXT NOT NULL,
        population_total INTEGER,
        median_income REAL,
        age_distribution TEXT,
        education_levels TEXT,
        household_size_avg REAL,
        immigration_ratio REAL,
        coordinates TEXT,
        last_updated TEXT
    )
    "#,
    r#"
    CREATE UNIQUE INDEX IF NOT EXISTS idx_demographics_key
        ON demographics (geo_id, city, country)
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS spending (
        id TEXT PRIMARY KEY,
        tenant_id TEXT,
        geo_id TEXT NOT NULL,
        country TEXT NOT NULL,
        city TEXT NOT NULL,
        category TEXT NOT NULL,
        avg_monthly_spend REAL,
        spend_index REAL,
        last_updated TEXT
    )
    "#,
    r#"
    CREATE UNIQUE INDEX IF NOT EXISTS idx_spending_key
        ON spending (geo_id, city, country, category)
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS labour_stats (
        id TEXT PRIMARY KEY,
        tenant_id TEXT,
        geo_id TEXT NOT NULL,
        country TEXT NOT NULL,
        city TEXT NOT NULL,
        unemployment_rate REAL,
        job_openings INTEGER,
        median_salary REAL,
        labour_force_participation REAL,
        last_updated TEXT
    )
    "#,
    r#"
    CREATE UNIQUE INDEX IF NOT EXISTS idx_labour_stats_key
        ON labour_stats (geo_id, city, country)
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS business_density (
        id TEXT PRIMARY KEY,
        tenant_id TEXT,
        geo_id TEXT NOT NULL,
        country TEXT NOT NULL,
        city TEXT NOT NULL,
        business_type TEXT NOT NULL,
        count INTEGER,
        density_score REAL,
        coordinates TEXT,
        last_updated TEXT
    )
    "#,
    r#"
    CREATE UNIQUE INDEX IF NOT EXISTS idx_business_density_key
        ON business_density (geo_id, city, country, business_type)
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS data_freshness (
        id TEXT PRIMARY KEY,
        dataset_name TEXT NOT NULL UNIQUE,
        last_run TEXT,
        row_count INTEGER,
        status TEXT
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS etl_logs (
        id TEXT PRIMARY KEY,
        job_name TEXT NOT NULL,
        payload TEXT,
        status TEXT,
        created_at TEXT
    )
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS idx_etl_logs_job_name
        ON etl_logs (job_name, created_at)
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS vector_insights (
        id TEXT PRIMARY KEY,
        tenant_id TEXT,
        geo_id TEXT NOT NULL,
        embedding TEXT NOT NULL,
        metadata TEXT,
        created_at TEXT
    )
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS idx_vector_insights_geo_id
        ON vector_insights (geo_id)
    "#,
];

/// Create all tables and indexes; safe to call repeatedly.
pub async fn apply(pool: &SqlitePool) -> Result<()> {
    for ddl in TABLES {
        sqlx::query(ddl)
            .execute(pool)
            .await
            .map_err(|e| db_err("apply schema", e))?;
    }
    Ok(())
}
