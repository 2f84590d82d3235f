use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use interface::TickerUpdate;

use crate::{SourceError, TickerSource};

const BASE_URL: &str = "https://api.wazirx.com";

#[derive(Clone)]
pub struct WazirxClient {
    http: reqwest::Client,
}

impl WazirxClient {
    pub fn new(timeout: Duration) -> Result<Self, SourceError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { http })
    }
}

/// One entry value of the tickers map. Every field is optional so a sparse
/// entry still decodes; the store decides what happens to the holes.
#[derive(Debug, Deserialize)]
struct WazirxTicker {
    last: Option<String>,
    buy: Option<String>,
    sell: Option<String>,
    volume: Option<String>,
    base_unit: Option<String>,
}

#[async_trait]
impl TickerSource for WazirxClient {
    fn name(&self) -> &'static str {
        "wazirx"
    }

    async fn fetch_tickers(&self) -> Result<Vec<TickerUpdate>, SourceError> {
        let url = format!("{BASE_URL}/api/v2/tickers");
        let response = self.http.get(&url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        parse_tickers(&body)
    }
}

/// Decodes the tickers payload: a JSON object keyed by market pair name,
/// each value carrying the price fields. The map key is the identifier; the
/// entry's own display `name` field ("BTC/INR") is ignored.
fn parse_tickers(body: &str) -> Result<Vec<TickerUpdate>, SourceError> {
    let payload: HashMap<String, WazirxTicker> =
        serde_json::from_str(body).map_err(|e| SourceError::Malformed(e.to_string()))?;

    let out = payload
        .into_iter()
        .map(|(name, ticker)| TickerUpdate {
            name,
            last: ticker.last,
            buy: ticker.buy,
            sell: ticker.sell,
            volume: ticker.volume,
            base_unit: ticker.base_unit,
        })
        .collect();

    Ok(out)
}
