use std::time::Duration;

use async_trait::async_trait;

use interface::{TickerSnapshot, TickerUpdate};

use super::{StoreError, TickerRepository};

const SCHEMA_SQL: &str = "CREATE TABLE IF NOT EXISTS tickers (
    name TEXT PRIMARY KEY,
    last TEXT NOT NULL,
    buy TEXT NOT NULL,
    sell TEXT NOT NULL,
    volume TEXT NOT NULL,
    base_unit TEXT NOT NULL
)";

const UPSERT_SQL: &str = "INSERT INTO tickers (name, last, buy, sell, volume, base_unit) \
    VALUES ($1, $2, $3, $4, $5, $6) \
    ON CONFLICT (name) DO UPDATE SET \
    last = EXCLUDED.last, \
    buy = EXCLUDED.buy, \
    sell = EXCLUDED.sell, \
    volume = EXCLUDED.volume, \
    base_unit = EXCLUDED.base_unit";

const LIST_SQL: &str = "SELECT name, last, buy, sell, volume, base_unit FROM tickers ORDER BY name";

#[derive(Debug, Clone)]
pub struct PostgresConfig {
    pub connection_string: String,
    pub pool_size: usize,
    pub query_timeout: Duration,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            connection_string: "postgres://postgres@localhost:5432/postgres".into(),
            pool_size: 10,
            query_timeout: Duration::from_secs(30),
        }
    }
}

/// Ticker rows in PostgreSQL behind a deadpool connection pool.
pub struct PostgresTickerStore {
    pool: deadpool_postgres::Pool,
    query_timeout: Duration,
}

impl PostgresTickerStore {
    /// Parses the connection string and builds the pool. Connections are
    /// established lazily; nothing is validated until the first query.
    pub fn new(config: &PostgresConfig) -> Result<Self, StoreError> {
        let pg_config: tokio_postgres::Config = config
            .connection_string
            .parse()
            .map_err(|e| StoreError::Unavailable(format!("invalid connection string: {e}")))?;

        let mgr_config = deadpool_postgres::ManagerConfig {
            recycling_method: deadpool_postgres::RecyclingMethod::Fast,
        };
        let mgr =
            deadpool_postgres::Manager::from_config(pg_config, tokio_postgres::NoTls, mgr_config);

        let pool = deadpool_postgres::Pool::builder(mgr)
            .max_size(config.pool_size)
            .build()
            .map_err(|e| StoreError::Unavailable(format!("pool creation failed: {e}")))?;

        Ok(Self {
            pool,
            query_timeout: config.query_timeout,
        })
    }

    async fn client(&self) -> Result<deadpool_postgres::Object, StoreError> {
        self.pool
            .get()
            .await
            .map_err(|e| StoreError::Unavailable(format!("pool get failed: {e}")))
    }

    /// Connectivity probe: `SELECT 1` through the pool.
    pub async fn health_check(&self) -> Result<(), StoreError> {
        let client = self.client().await?;
        client
            .query_one("SELECT 1", &[])
            .await
            .map_err(|e| StoreError::Query(format!("health check failed: {e}")))?;
        Ok(())
    }

    /// Creates the tickers table when missing. Bootstrap only, not a
    /// migration layer.
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        let client = self.client().await?;
        client
            .batch_execute(SCHEMA_SQL)
            .await
            .map_err(|e| StoreError::Query(format!("schema setup failed: {e}")))?;
        Ok(())
    }
}

#[async_trait]
impl TickerRepository for PostgresTickerStore {
    async fn upsert(&self, update: &TickerUpdate) -> Result<(), StoreError> {
        let client = self.client().await?;

        // `None` fields bind as NULL and trip the NOT NULL constraints.
        let params: [&(dyn tokio_postgres::types::ToSql + Sync); 6] = [
            &update.name,
            &update.last,
            &update.buy,
            &update.sell,
            &update.volume,
            &update.base_unit,
        ];

        tokio::time::timeout(self.query_timeout, client.execute(UPSERT_SQL, &params))
            .await
            .map_err(|_| StoreError::Timeout(self.query_timeout))?
            .map_err(|e| StoreError::Query(format!("upsert failed for {}: {e}", update.name)))?;

        Ok(())
    }

    async fn list(&self) -> Result<Vec<TickerSnapshot>, StoreError> {
        let client = self.client().await?;

        let rows = tokio::time::timeout(self.query_timeout, client.query(LIST_SQL, &[]))
            .await
            .map_err(|_| StoreError::Timeout(self.query_timeout))?
            .map_err(|e| StoreError::Query(format!("list failed: {e}")))?;

        rows.iter().map(snapshot_from_row).collect()
    }
}

fn snapshot_from_row(row: &tokio_postgres::Row) -> Result<TickerSnapshot, StoreError> {
    let get = |col: &str| -> Result<String, StoreError> {
        row.try_get(col)
            .map_err(|e| StoreError::Query(format!("bad column {col}: {e}")))
    };

    Ok(TickerSnapshot {
        name: get("name")?,
        last: get("last")?,
        buy: get("buy")?,
        sell: get("sell")?,
        volume: get("volume")?,
        base_unit: get("base_unit")?,
    })
}
