use async_trait::async_trait;
use thiserror::Error;

use interface::TickerUpdate;

pub mod wazirx;

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("upstream returned status {0}")]
    Status(u16),
    #[error("malformed payload: {0}")]
    Malformed(String),
}

/// A market data endpoint that can be polled for its full ticker set.
#[async_trait]
pub trait TickerSource: Send + Sync {
    fn name(&self) -> &'static str;

    async fn fetch_tickers(&self) -> Result<Vec<TickerUpdate>, SourceError>;
}

// Convenience re-exports
pub use wazirx::WazirxClient;
