use serde::{Deserialize, Serialize};

/// One stored row per market pair, served as-is on the JSON surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickerSnapshot {
    pub name: String,
    pub last: String,
    pub buy: String,
    pub sell: String,
    pub volume: String,
    pub base_unit: String,
}

/// One upstream entry as fetched, before it is persisted.
///
/// The data fields are optional: upstream omissions travel through as `None`
/// and are rejected by the store's NOT NULL columns, so a half-shaped entry
/// fails at the row it belongs to instead of aborting the whole decode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickerUpdate {
    pub name: String,
    pub last: Option<String>,
    pub buy: Option<String>,
    pub sell: Option<String>,
    pub volume: Option<String>,
    pub base_unit: Option<String>,
}

impl TickerUpdate {
    /// Update with every data field present, mostly useful in tests.
    pub fn filled(
        name: impl Into<String>,
        last: impl Into<String>,
        buy: impl Into<String>,
        sell: impl Into<String>,
        volume: impl Into<String>,
        base_unit: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            last: Some(last.into()),
            buy: Some(buy.into()),
            sell: Some(sell.into()),
            volume: Some(volume.into()),
            base_unit: Some(base_unit.into()),
        }
    }
}
