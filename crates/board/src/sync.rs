use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::time::sleep;
use tracing::{info, warn};

use exchanges::{SourceError, TickerSource};

use crate::store::{StoreError, TickerRepository};

#[derive(Error, Debug)]
pub enum SyncError {
    /// Upstream could not be reached or answered with a non-success status.
    #[error("upstream fetch failed: {0}")]
    Upstream(SourceError),
    /// Upstream answered but the payload held no usable entries.
    #[error("upstream returned no data")]
    EmptyPayload,
    /// An upsert failed mid-batch. The `committed` earlier entries are
    /// already stored; nothing is rolled back and later entries were never
    /// attempted.
    #[error("upsert failed for {name} after {committed} committed rows: {source}")]
    PartialUpsert {
        name: String,
        committed: usize,
        source: StoreError,
    },
}

/// Fetches the full ticker set and upserts every entry, in name order, one
/// statement at a time. Fail-fast: the first failing upsert aborts the run.
pub async fn sync_tickers(
    source: &dyn TickerSource,
    store: &dyn TickerRepository,
) -> Result<usize, SyncError> {
    let mut updates = match source.fetch_tickers().await {
        Ok(updates) => updates,
        Err(SourceError::Malformed(reason)) => {
            warn!("{} payload unusable: {reason}", source.name());
            return Err(SyncError::EmptyPayload);
        }
        Err(e) => return Err(SyncError::Upstream(e)),
    };

    if updates.is_empty() {
        return Err(SyncError::EmptyPayload);
    }

    updates.sort_by(|a, b| a.name.cmp(&b.name));

    let mut committed = 0;
    for update in &updates {
        if let Err(e) = store.upsert(update).await {
            return Err(SyncError::PartialUpsert {
                name: update.name.clone(),
                committed,
                source: e,
            });
        }
        committed += 1;
    }

    Ok(committed)
}

/// Spawns the periodic sync task. Cycle errors are logged and the loop keeps
/// going; only a panic would take the process down.
pub fn start_sync_loop(
    source: Arc<dyn TickerSource>,
    store: Arc<dyn TickerRepository>,
    interval: Duration,
) {
    tokio::spawn(async move {
        info!(
            "sync loop started: source {}, every {}s",
            source.name(),
            interval.as_secs()
        );
        loop {
            match sync_tickers(source.as_ref(), store.as_ref()).await {
                Ok(count) => info!("sync complete: {count} tickers stored"),
                Err(e) => warn!("sync cycle failed: {e}"),
            }
            sleep(interval).await;
        }
    });
}
