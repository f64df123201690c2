//! Scavenger Hunt Back binary entrypoint wiring the REST API, the station store and its supervisor.

use std::{env, net::SocketAddr, sync::Arc, time::Duration};

use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[cfg(feature = "couch-store")]
use scavenger_hunt_back::dao::station_store::couchdb::{CouchConfig, CouchStationStore};
#[cfg(feature = "mongo-store")]
use scavenger_hunt_back::dao::station_store::mongodb::{MongoConfig, MongoStationStore};
use scavenger_hunt_back::{
    config::AppConfig,
    dao::{
        station_store::{StationStore, memory::MemoryStationStore},
        storage::StorageError,
    },
    routes,
    services::{hunt_service, storage_supervisor},
    state::{AppState, SharedState},
};

/// Environment variable selecting the station store backend.
const STATION_STORE_ENV: &str = "STATION_STORE";
/// How often idle hunt sessions are swept.
const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::load();
    if config.admin_token().is_none() {
        warn!("no admin token configured; admin routes will reject every request");
    }

    let app_state = AppState::new(config).context("building application state")?;

    let backend = env::var(STATION_STORE_ENV).unwrap_or_else(|_| default_backend().into());
    spawn_storage(app_state.clone(), &backend)?;
    tokio::spawn(hunt_service::reap_idle_sessions(
        app_state.clone(),
        SESSION_SWEEP_INTERVAL,
    ));

    // Build the HTTP router once the shared state is ready.
    let app = build_router(app_state);

    let port = env::var("PORT")
        .or_else(|_| env::var("SERVER_PORT"))
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(8080);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(%addr, "starting server");

    let listener = TcpListener::bind(addr).await.context("binding server")?;
    let service = app.into_make_service();
    axum::serve(listener, service)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving axum")?;

    Ok(())
}

fn default_backend() -> &'static str {
    if cfg!(feature = "mongo-store") {
        "mongo"
    } else if cfg!(feature = "couch-store") {
        "couch"
    } else {
        "memory"
    }
}

/// Start the storage supervisor for the selected backend.
fn spawn_storage(state: SharedState, backend: &str) -> anyhow::Result<()> {
    info!(backend, "selecting station store");
    match backend {
        "memory" => {
            let store = MemoryStationStore::new();
            tokio::spawn(storage_supervisor::run(state, move || {
                let store = store.clone();
                async move { Ok(Arc::new(store) as Arc<dyn StationStore>) }
            }));
        }
        #[cfg(feature = "mongo-store")]
        "mongo" => {
            tokio::spawn(storage_supervisor::run(state, || async {
                let config = MongoConfig::from_env().await?;
                let store = MongoStationStore::connect(config).await?;
                Ok::<_, StorageError>(Arc::new(store) as Arc<dyn StationStore>)
            }));
        }
        #[cfg(feature = "couch-store")]
        "couch" => {
            tokio::spawn(storage_supervisor::run(state, || async {
                let config = CouchConfig::from_env()?;
                let store = CouchStationStore::connect(config).await?;
                Ok::<_, StorageError>(Arc::new(store) as Arc<dyn StationStore>)
            }));
        }
        other => anyhow::bail!("unsupported {STATION_STORE_ENV} value `{other}`"),
    }
    Ok(())
}

/// Build the top-level router and attach cross-cutting middleware layers.
fn build_router(state: SharedState) -> Router<()> {
    routes::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Configure tracing subscribers so logs include spans by default.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=debug".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Wait for Ctrl+C or SIGTERM and shut the server down gracefully.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = term.recv() => {},
                }
            }
            Err(err) => {
                warn!(error = %err, "failed to install SIGTERM handler; waiting for Ctrl+C only");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
