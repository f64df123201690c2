use std::{future::Future, sync::Arc, time::Duration};

use tokio::time::sleep;
use tracing::{info, warn};

use crate::{
    dao::{station_store::StationStore, storage::StorageError},
    state::SharedState,
};

/// Timing knobs of the storage supervisor.
#[derive(Debug, Clone, Copy)]
pub struct SupervisorPolicy {
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub health_poll_interval: Duration,
    pub max_reconnect_attempts: u32,
}

impl Default for SupervisorPolicy {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_millis(1_000),
            max_delay: Duration::from_secs(10),
            health_poll_interval: Duration::from_secs(5),
            max_reconnect_attempts: 3,
        }
    }
}

impl SupervisorPolicy {
    fn next_delay(&self, delay: Duration) -> Duration {
        (delay * 2).min(self.max_delay)
    }
}

/// Reconnect to the storage backend and keep the shared state in degraded mode when it is unavailable.
pub async fn run<F, Fut>(state: SharedState, connect: F)
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = Result<Arc<dyn StationStore>, StorageError>> + Send,
{
    run_with_policy(state, connect, SupervisorPolicy::default()).await
}

/// [`run`] with explicit timings.
pub async fn run_with_policy<F, Fut>(state: SharedState, mut connect: F, policy: SupervisorPolicy)
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = Result<Arc<dyn StationStore>, StorageError>> + Send,
{
    let mut delay = policy.initial_delay;

    loop {
        match connect().await {
            Ok(store) => {
                state.set_station_store(store.clone()).await;
                info!("station store connected; leaving degraded mode");
                delay = policy.initial_delay;

                watch_health(&state, store.as_ref(), &policy).await;
                warn!("exhausted storage reconnect attempts; staying in degraded mode");
                state.clear_station_store().await;
            }
            Err(err) => {
                warn!(backend = err.backend(), error = %err, "station store connection attempt failed");
            }
        }

        sleep(delay).await;
        delay = policy.next_delay(delay);
    }
}

/// Poll `store` until it stays unreachable after every reconnect attempt.
async fn watch_health(state: &SharedState, store: &dyn StationStore, policy: &SupervisorPolicy) {
    loop {
        match store.health_check().await {
            Ok(()) => {
                if state.is_degraded().await {
                    info!("station store healthy again; leaving degraded mode");
                    state.update_degraded(false).await;
                }
            }
            Err(err) => {
                warn!(backend = err.backend(), error = %err, "station store health check failed");
                if !reconnect(state, store, policy).await {
                    return;
                }
                state.update_degraded(false).await;
            }
        }
        sleep(policy.health_poll_interval).await;
    }
}

async fn reconnect(state: &SharedState, store: &dyn StationStore, policy: &SupervisorPolicy) -> bool {
    let mut delay = policy.initial_delay;

    for attempt in 0..policy.max_reconnect_attempts {
        match store.try_reconnect().await {
            Ok(()) => {
                info!(attempt, "station store reconnected after health check failure");
                return true;
            }
            Err(err) => {
                if attempt == 0 {
                    warn!(attempt, error = %err, "storage reconnect first attempt failed; entering degraded mode");
                    state.update_degraded(true).await;
                } else {
                    warn!(attempt, error = %err, "storage reconnect attempt failed");
                }
                sleep(delay).await;
                delay = policy.next_delay(delay);
            }
        }
    }
    false
}
