//! SQLite-backed storage handle.

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

use etl_core::{Error, Result};

use crate::schema;

/// Shared storage handle passed into every job invocation.
///
/// Wraps a connection pool; statements autocommit, so a job's writes are
/// durable once issued. Any outer transaction boundary belongs to the
/// caller.
#[derive(Clone)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    /// Connect (or create) a database at `database_url`,
    /// e.g. `sqlite://marketscope.db`.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| Error::persistence(format!("invalid database url: {e}")))?
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .connect_with(options)
            .await
            .map_err(|e| Error::persistence(format!("connect error: {e}")))?;

        Ok(Self { pool })
    }

    /// In-memory database for tests and local runs.
    ///
    /// Single connection: each SQLite `:memory:` connection is its own
    /// database.
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .map_err(|e| Error::persistence(format!("connect error: {e}")))?;

        Ok(Self { pool })
    }

    /// Apply the schema; idempotent.
    pub async fn init_schema(&self) -> Result<()> {
        schema::apply(&self.pool).await
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Cheap liveness probe for the health endpoint.
    pub async fn ping(&self) -> bool {
        sqlx::query_scalar::<_, i64>("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .is_ok()
    }
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store").finish()
    }
}

/// Map a sqlx failure into the pipeline's persistence error.
pub(crate) fn db_err(context: &str, err: sqlx::Error) -> Error {
    Error::persistence(format!("{context}: {err}"))
}
