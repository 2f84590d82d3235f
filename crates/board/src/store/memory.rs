use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;

use interface::{TickerSnapshot, TickerUpdate};

use super::{StoreError, TickerRepository};

/// In-memory repository with the same observable behavior as the Postgres
/// backend: keyed by name, NULL-rejecting, name-ordered listing.
#[derive(Default)]
pub struct MemoryTickerStore {
    rows: Mutex<BTreeMap<String, TickerSnapshot>>,
}

impl MemoryTickerStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn row_count(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.rows.lock().unwrap().contains_key(name)
    }
}

#[async_trait]
impl TickerRepository for MemoryTickerStore {
    async fn upsert(&self, update: &TickerUpdate) -> Result<(), StoreError> {
        let columns = [
            ("last", &update.last),
            ("buy", &update.buy),
            ("sell", &update.sell),
            ("volume", &update.volume),
            ("base_unit", &update.base_unit),
        ];
        for (col, value) in columns {
            if value.is_none() {
                return Err(StoreError::Query(format!(
                    "upsert failed for {}: null value in column \"{col}\"",
                    update.name
                )));
            }
        }

        let snapshot = TickerSnapshot {
            name: update.name.clone(),
            last: update.last.clone().unwrap(),
            buy: update.buy.clone().unwrap(),
            sell: update.sell.clone().unwrap(),
            volume: update.volume.clone().unwrap(),
            base_unit: update.base_unit.clone().unwrap(),
        };
        self.rows
            .lock()
            .unwrap()
            .insert(snapshot.name.clone(), snapshot);
        Ok(())
    }

    async fn list(&self) -> Result<Vec<TickerSnapshot>, StoreError> {
        Ok(self.rows.lock().unwrap().values().cloned().collect())
    }
}

/// Repository whose every call fails, for exercising the error paths.
pub struct FailingTickerStore;

#[async_trait]
impl TickerRepository for FailingTickerStore {
    async fn upsert(&self, _update: &TickerUpdate) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("connection refused".into()))
    }

    async fn list(&self) -> Result<Vec<TickerSnapshot>, StoreError> {
        Err(StoreError::Unavailable("connection refused".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_upsert_then_list_round_trips_exact_values() {
        let store = MemoryTickerStore::new();
        let update = TickerUpdate::filled("btcinr", "50000", "49990", "50010", "12.5", "inr");

        store.upsert(&update).await.unwrap();
        let rows = store.list().await.unwrap();

        assert_eq!(
            rows,
            vec![TickerSnapshot {
                name: "btcinr".into(),
                last: "50000".into(),
                buy: "49990".into(),
                sell: "50010".into(),
                volume: "12.5".into(),
                base_unit: "inr".into(),
            }]
        );
    }

    #[tokio::test]
    async fn test_upsert_overwrites_the_row_with_the_same_name() {
        let store = MemoryTickerStore::new();
        store
            .upsert(&TickerUpdate::filled("btcinr", "1", "1", "1", "1", "inr"))
            .await
            .unwrap();
        store
            .upsert(&TickerUpdate::filled("btcinr", "2", "2", "2", "2", "inr"))
            .await
            .unwrap();

        let rows = store.list().await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].last, "2");
    }

    #[tokio::test]
    async fn test_missing_field_is_rejected_like_a_null_column() {
        let store = MemoryTickerStore::new();
        let mut update = TickerUpdate::filled("btcinr", "1", "1", "1", "1", "inr");
        update.volume = None;

        let err = store.upsert(&update).await.unwrap_err();
        match err {
            StoreError::Query(msg) => {
                assert!(msg.contains("btcinr"));
                assert!(msg.contains("volume"));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(store.row_count(), 0);
    }

    #[tokio::test]
    async fn test_list_returns_rows_in_name_order() {
        let store = MemoryTickerStore::new();
        for name in ["ethinr", "btcinr", "xrpinr"] {
            store
                .upsert(&TickerUpdate::filled(name, "1", "1", "1", "1", "inr"))
                .await
                .unwrap();
        }

        let names: Vec<String> = store
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(names, ["btcinr", "ethinr", "xrpinr"]);
    }
}
