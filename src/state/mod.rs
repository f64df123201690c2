pub mod editor;
pub mod hunt_machine;
pub mod station;

use std::{
    sync::Arc,
    time::{Instant, SystemTime},
};

use dashmap::DashMap;
use tokio::sync::{RwLock, watch};
use tracing::debug;
use uuid::Uuid;

use crate::{
    config::AppConfig,
    dao::station_store::StationStore,
    error::ServiceError,
    services::qr::{QrCodec, QrError},
    state::hunt_machine::HuntStateMachine,
};

pub type SharedState = Arc<AppState>;

/// One participant's progress, as tracked by the server.
#[derive(Debug, Clone)]
pub struct HuntSession {
    pub machine: HuntStateMachine,
    pub opened_at: SystemTime,
}

/// Registry entry: the session plus the last time it was read or written.
#[derive(Debug)]
struct SessionSlot {
    session: HuntSession,
    last_seen: Instant,
}

/// Central application state holding the storage handle and live hunt sessions.
pub struct AppState {
    station_store: RwLock<Option<Arc<dyn StationStore>>>,
    degraded: watch::Sender<bool>,
    sessions: DashMap<Uuid, SessionSlot>,
    config: AppConfig,
    qr: QrCodec,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    ///
    /// The application starts in degraded mode until a storage backend is installed.
    pub fn new(config: AppConfig) -> Result<SharedState, QrError> {
        let qr = QrCodec::new(config.public_base_url())?;
        let (degraded_tx, _rx) = watch::channel(true);
        Ok(Arc::new(Self {
            station_store: RwLock::new(None),
            degraded: degraded_tx,
            sessions: DashMap::new(),
            config,
            qr,
        }))
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Encoder/decoder shared by the QR generator and the scanner.
    pub fn qr(&self) -> &QrCodec {
        &self.qr
    }

    /// Obtain a handle to the current station store, if one is installed.
    pub async fn station_store(&self) -> Option<Arc<dyn StationStore>> {
        let guard = self.station_store.read().await;
        guard.as_ref().cloned()
    }

    /// Station store handle, or [`ServiceError::Degraded`] while none is installed.
    pub async fn require_station_store(&self) -> Result<Arc<dyn StationStore>, ServiceError> {
        self.station_store().await.ok_or(ServiceError::Degraded)
    }

    /// Install a new station store implementation and leave degraded mode.
    pub async fn set_station_store(&self, store: Arc<dyn StationStore>) {
        {
            let mut guard = self.station_store.write().await;
            *guard = Some(store);
        }
        self.update_degraded(false).await;
    }

    /// Remove the current station store and enter degraded mode.
    pub async fn clear_station_store(&self) {
        {
            let mut guard = self.station_store.write().await;
            guard.take();
        }
        self.update_degraded(true).await;
    }

    /// Current degraded flag.
    pub async fn is_degraded(&self) -> bool {
        *self.degraded.borrow()
    }

    /// Subscribe to degraded mode updates.
    pub fn degraded_watcher(&self) -> watch::Receiver<bool> {
        self.degraded.subscribe()
    }

    /// Update and broadcast the degraded flag when the value changes.
    pub async fn update_degraded(&self, value: bool) {
        self.degraded.send_if_modified(|current| {
            if *current == value {
                return false;
            }
            *current = value;
            true
        });
    }

    /// Register a fresh session in the unauthenticated phase.
    ///
    /// Sessions idle for longer than the configured TTL are dropped first.
    pub fn open_session(&self) -> (Uuid, HuntSession) {
        let now = Instant::now();
        self.prune_idle_sessions(now);

        let id = Uuid::new_v4();
        let session = HuntSession {
            machine: HuntStateMachine::new(self.config.completion_message()),
            opened_at: SystemTime::now(),
        };
        self.sessions.insert(
            id,
            SessionSlot {
                session: session.clone(),
                last_seen: now,
            },
        );
        debug!(session_id = %id, "hunt session opened");
        (id, session)
    }

    /// Copy of the session, state machine included. Counts as activity.
    pub fn session(&self, id: Uuid) -> Option<HuntSession> {
        self.sessions.get_mut(&id).map(|mut slot| {
            slot.last_seen = Instant::now();
            slot.session.clone()
        })
    }

    /// Store `updated` as the session's machine if nothing was committed since
    /// `based_on` was read. A session discarded meanwhile is reported as not found.
    pub fn commit_session(
        &self,
        id: Uuid,
        based_on: usize,
        updated: HuntStateMachine,
    ) -> Result<(), ServiceError> {
        let mut slot = self
            .sessions
            .get_mut(&id)
            .ok_or_else(|| ServiceError::NotFound(format!("hunt session `{id}`")))?;

        let current = slot.session.machine.version();
        if current != based_on {
            return Err(ServiceError::Stale {
                expected: based_on,
                actual: current,
            });
        }

        slot.session.machine = updated;
        slot.last_seen = Instant::now();
        Ok(())
    }

    /// Drop a session. Returns `false` when it did not exist.
    pub fn close_session(&self, id: Uuid) -> bool {
        let removed = self.sessions.remove(&id).is_some();
        if removed {
            debug!(session_id = %id, "hunt session closed");
        }
        removed
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// Drop every session not seen for longer than the configured TTL as of `now`.
    /// Returns how many were dropped.
    pub fn prune_idle_sessions(&self, now: Instant) -> usize {
        let ttl = self.config.session_ttl();
        let before = self.sessions.len();
        self.sessions
            .retain(|_, slot| now.saturating_duration_since(slot.last_seen) <= ttl);
        before.saturating_sub(self.sessions.len())
    }
}
