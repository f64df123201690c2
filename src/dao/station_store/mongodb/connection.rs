use std::{iter, time::Duration};

use mongodb::{Client, Database, bson::doc};
use tokio::time::sleep;
use tracing::{debug, info};

use super::{
    config::MongoConfig,
    error::{MongoDaoError, MongoResult},
};

/// How long to keep pinging a freshly built client before giving up.
///
/// A database container started next to the backend usually needs a few
/// seconds before it answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PingRetry {
    pub attempts: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
}

impl Default for PingRetry {
    fn default() -> Self {
        Self {
            attempts: 10,
            initial_delay: Duration::from_millis(250),
            max_delay: Duration::from_secs(5),
        }
    }
}

impl PingRetry {
    /// Pauses between consecutive attempts, doubling up to `max_delay`.
    fn delays(&self) -> impl Iterator<Item = Duration> {
        let max = self.max_delay;
        iter::successors(Some(self.initial_delay.min(max)), move |delay| {
            Some((*delay * 2).min(max))
        })
        .take(self.attempts.saturating_sub(1) as usize)
    }
}

/// Build a client for `config` and wait until the database answers a ping.
pub async fn establish_connection(config: &MongoConfig) -> MongoResult<(Client, Database)> {
    let client = Client::with_options(config.options.clone())
        .map_err(|source| MongoDaoError::ClientConstruction { source })?;
    let database = client.database(&config.database_name);

    let mut delays = config.ping_retry.delays();
    let mut attempts = 0;
    loop {
        attempts += 1;
        let err = match database.run_command(doc! { "ping": 1 }).await {
            Ok(_) => break,
            Err(err) => err,
        };
        match delays.next() {
            Some(delay) => {
                debug!(attempts, ?delay, error = %err, "MongoDB ping failed; retrying");
                sleep(delay).await;
            }
            None => {
                return Err(MongoDaoError::InitialPing {
                    attempts,
                    source: err,
                });
            }
        }
    }

    info!(database = %config.database_name, attempts, "connected to MongoDB");
    Ok((client, database))
}
