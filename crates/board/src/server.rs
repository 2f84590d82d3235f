use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderValue, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use thiserror::Error;
use tower_http::services::ServeDir;
use tower_http::set_header::SetResponseHeaderLayer;
use tracing::{error, info};

use exchanges::TickerSource;
use interface::TickerSnapshot;

use crate::config::Config;
use crate::store::{StoreError, TickerRepository};
use crate::sync::{self, SyncError};

#[derive(Clone)]
pub struct AppState {
    pub source: Arc<dyn TickerSource>,
    pub store: Arc<dyn TickerRepository>,
}

#[derive(Error, Debug)]
pub enum QueryError {
    /// The table exists but holds nothing yet.
    #[error("no rows stored")]
    NoData,
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Reads every stored row. An empty table is `NoData` so the HTTP layer can
/// answer 404 instead of an empty list.
pub async fn list_tickers(store: &dyn TickerRepository) -> Result<Vec<TickerSnapshot>, QueryError> {
    let rows = store.list().await?;
    if rows.is_empty() {
        return Err(QueryError::NoData);
    }
    Ok(rows)
}

pub fn router(state: Arc<AppState>, config: &Config) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route("/fetch-data", get(fetch_data_handler))
        .route("/get-data", get(get_data_handler))
        .fallback_service(ServeDir::new(&config.public_dir))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::CONTENT_SECURITY_POLICY,
            content_security_policy(config.port),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("SAMEORIGIN"),
        ))
        .with_state(state)
}

/// Browser-facing lockdown: same-origin everything, with the API host
/// allowed explicitly for fetches from the static page.
fn content_security_policy(port: u16) -> HeaderValue {
    let value = format!(
        "default-src 'self'; connect-src 'self' http://localhost:{port}; \
         script-src 'self'; style-src 'self'"
    );
    HeaderValue::from_str(&value).expect("csp header is valid ascii")
}

async fn root_handler() -> &'static str {
    "Root route"
}

async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Runs one sync pass against the upstream source.
async fn fetch_data_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match sync::sync_tickers(state.source.as_ref(), state.store.as_ref()).await {
        Ok(count) => {
            info!("stored {count} tickers from {}", state.source.name());
            "Data fetched and stored in the database successfully".into_response()
        }
        Err(SyncError::EmptyPayload) => {
            error!("sync aborted: upstream returned no data");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "No data received from the API",
            )
                .into_response()
        }
        Err(SyncError::PartialUpsert {
            name,
            committed,
            source,
        }) => {
            error!("upsert failed for {name} after {committed} rows: {source}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Error inserting data for {name}"),
            )
                .into_response()
        }
        Err(SyncError::Upstream(e)) => {
            error!("upstream fetch failed: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Error fetching data from API",
            )
                .into_response()
        }
    }
}

/// Returns every stored ticker row as JSON.
async fn get_data_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match list_tickers(state.store.as_ref()).await {
        Ok(rows) => Json(rows).into_response(),
        Err(QueryError::NoData) => (StatusCode::NOT_FOUND, "No data available").into_response(),
        Err(QueryError::Store(e)) => {
            error!("failed to read tickers: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Error retrieving data from the database",
            )
                .into_response()
        }
    }
}

pub async fn serve(state: Arc<AppState>, config: &Config) -> eyre::Result<()> {
    let app = router(state, config);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
