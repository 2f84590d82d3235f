use std::sync::Arc;

use color_eyre::eyre;
use structopt::StructOpt;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use exchanges::{TickerSource, WazirxClient};

use board::config::Config;
use board::server::{self, AppState};
use board::store::{PostgresConfig, PostgresTickerStore, TickerRepository};
use board::sync;

// .env is loaded automatically by lib.rs

#[derive(Debug, StructOpt)]
#[structopt(name = "board", about = "WazirX ticker board: sync and serve")]
enum Command {
    /// Run the HTTP server (plus the periodic sync when configured)
    Serve,
    /// Run a single fetch-and-upsert pass and exit
    Sync,
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // init error reporting
    color_eyre::install()?;

    // init logging
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    // exit on any panic, including ones inside spawned tasks
    install_panic_exit_hook();

    let cmd = Command::from_args();
    let config = Config::from_env()?;

    match cmd {
        Command::Serve => run_server(config).await,
        Command::Sync => run_sync_once(config).await,
    }
}

fn install_panic_exit_hook() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        default_hook(info);
        std::process::exit(1);
    }));
}

fn postgres_config(config: &Config) -> PostgresConfig {
    PostgresConfig {
        connection_string: config.database_url.clone(),
        pool_size: config.db_pool_size,
        query_timeout: config.db_query_timeout,
    }
}

async fn run_server(config: Config) -> eyre::Result<()> {
    info!("starting ticker board server...");

    let postgres = Arc::new(PostgresTickerStore::new(&postgres_config(&config))?);

    // probe the database; a failure only logs and requests answer 500 until
    // the database comes back
    match postgres.health_check().await {
        Ok(()) => {
            info!("database connection ok");
            postgres.ensure_schema().await?;
        }
        Err(e) => warn!("database not reachable yet: {e}"),
    }

    let source: Arc<dyn TickerSource> = Arc::new(WazirxClient::new(config.http_timeout)?);
    let store: Arc<dyn TickerRepository> = postgres;

    let state = Arc::new(AppState { source, store });

    // start background sync when an interval is configured
    if let Some(interval) = config.sync_interval {
        sync::start_sync_loop(state.source.clone(), state.store.clone(), interval);
    }

    server::serve(state, &config).await?;

    Ok(())
}

async fn run_sync_once(config: Config) -> eyre::Result<()> {
    let store = PostgresTickerStore::new(&postgres_config(&config))?;
    store.ensure_schema().await?;

    let source = WazirxClient::new(config.http_timeout)?;

    let count = sync::sync_tickers(&source, &store).await?;
    info!("stored {count} tickers");

    Ok(())
}
