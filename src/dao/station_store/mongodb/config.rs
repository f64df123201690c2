use mongodb::options::ClientOptions;
use tracing::warn;

use super::{
    connection::PingRetry,
    error::{MongoDaoError, MongoResult},
};

const DEFAULT_DATABASE: &str = "scavenger_hunt";

#[derive(Clone)]
pub struct MongoConfig {
    pub options: ClientOptions,
    pub database_name: String,
    pub ping_retry: PingRetry,
}

impl MongoConfig {
    pub async fn from_uri(uri: &str, db_name: Option<&str>) -> MongoResult<Self> {
        let database_name = db_name.unwrap_or(DEFAULT_DATABASE).to_owned();
        let options =
            ClientOptions::parse(uri)
                .await
                .map_err(|source| MongoDaoError::InvalidUri {
                    uri: uri.to_owned(),
                    source,
                })?;

        Ok(Self {
            options,
            database_name,
            ping_retry: PingRetry::default(),
        })
    }

    /// Replace the retry budget used while waiting for the first ping.
    pub fn with_ping_retry(mut self, ping_retry: PingRetry) -> Self {
        self.ping_retry = ping_retry;
        self
    }

    /// Read `MONGO_URI` (required), `MONGO_DB` and `MONGO_CONNECT_ATTEMPTS` (optional).
    pub async fn from_env() -> MongoResult<Self> {
        let uri = std::env::var("MONGO_URI")
            .map_err(|_| MongoDaoError::MissingEnvVar { var: "MONGO_URI" })?;
        let db = std::env::var("MONGO_DB").ok();
        let mut config = Self::from_uri(&uri, db.as_deref()).await?;

        if let Ok(raw) = std::env::var("MONGO_CONNECT_ATTEMPTS") {
            match raw.parse::<u32>() {
                Ok(attempts) if attempts > 0 => config.ping_retry.attempts = attempts,
                _ => warn!(value = %raw, "ignoring invalid MONGO_CONNECT_ATTEMPTS"),
            }
        }
        Ok(config)
    }
}
