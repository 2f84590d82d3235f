use std::env;
use std::time::Duration;

/// Runtime settings, environment-overridable. `.env.example` documents the
/// variable names.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub database_url: String,
    pub db_pool_size: usize,
    pub db_query_timeout: Duration,
    pub http_timeout: Duration,
    /// Background sync period; `None` means on-demand only.
    pub sync_interval: Option<Duration>,
    pub public_dir: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 3000,
            database_url: "postgres://postgres@localhost:5432/postgres".into(),
            db_pool_size: 10,
            db_query_timeout: Duration::from_secs(30),
            http_timeout: Duration::from_secs(30),
            sync_interval: None,
            public_dir: "public".into(),
        }
    }
}

impl Config {
    /// Reads the environment on top of the defaults. Unset variables keep
    /// their default; set variables must parse.
    pub fn from_env() -> eyre::Result<Self> {
        let mut config = Config::default();

        if let Ok(value) = env::var("PORT") {
            config.port = value
                .parse()
                .map_err(|e| eyre::eyre!("invalid PORT {value:?}: {e}"))?;
        }
        if let Ok(value) = env::var("DATABASE_URL") {
            config.database_url = value;
        }
        if let Ok(value) = env::var("DB_POOL_SIZE") {
            config.db_pool_size = value
                .parse()
                .map_err(|e| eyre::eyre!("invalid DB_POOL_SIZE {value:?}: {e}"))?;
        }
        if let Ok(value) = env::var("DB_QUERY_TIMEOUT_SECS") {
            let secs: u64 = value
                .parse()
                .map_err(|e| eyre::eyre!("invalid DB_QUERY_TIMEOUT_SECS {value:?}: {e}"))?;
            config.db_query_timeout = Duration::from_secs(secs);
        }
        if let Ok(value) = env::var("HTTP_TIMEOUT_SECS") {
            let secs: u64 = value
                .parse()
                .map_err(|e| eyre::eyre!("invalid HTTP_TIMEOUT_SECS {value:?}: {e}"))?;
            config.http_timeout = Duration::from_secs(secs);
        }
        if let Ok(value) = env::var("SYNC_INTERVAL_SECS") {
            let secs: u64 = value
                .parse()
                .map_err(|e| eyre::eyre!("invalid SYNC_INTERVAL_SECS {value:?}: {e}"))?;
            // 0 disables the loop
            config.sync_interval = (secs > 0).then(|| Duration::from_secs(secs));
        }
        if let Ok(value) = env::var("PUBLIC_DIR") {
            config.public_dir = value;
        }

        Ok(config)
    }
}
