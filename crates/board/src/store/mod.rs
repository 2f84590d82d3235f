use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use interface::{TickerSnapshot, TickerUpdate};

pub mod postgres;

#[cfg(test)]
pub mod memory;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("database unavailable: {0}")]
    Unavailable(String),
    #[error("query failed: {0}")]
    Query(String),
    #[error("query timed out after {0:?}")]
    Timeout(Duration),
}

/// Persistence seam for ticker rows.
#[async_trait]
pub trait TickerRepository: Send + Sync {
    /// Inserts the entry, or overwrites the existing row with the same name.
    /// A `None` data field is attempted as SQL NULL and rejected by the
    /// column constraints.
    async fn upsert(&self, update: &TickerUpdate) -> Result<(), StoreError>;

    /// Returns every stored row, ordered by name.
    async fn list(&self) -> Result<Vec<TickerSnapshot>, StoreError>;
}

// Convenience re-exports
pub use postgres::{PostgresConfig, PostgresTickerStore};
