//! Process-local station store, used for local runs and tests.

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use futures::future::BoxFuture;
use indexmap::IndexMap;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::dao::{
    models::StationEntity,
    station_store::StationStore,
    storage::{StorageError, StorageResult},
};

/// Failures reported by the in-memory store.
#[derive(Debug, Error)]
pub enum MemoryStoreError {
    #[error("in-memory station store is offline")]
    Offline,
}

impl From<MemoryStoreError> for StorageError {
    fn from(err: MemoryStoreError) -> Self {
        StorageError::unavailable("memory", err)
    }
}

/// Station store keeping rows in an insertion-ordered map.
#[derive(Clone, Default)]
pub struct MemoryStationStore {
    stations: Arc<RwLock<IndexMap<String, StationEntity>>>,
    offline: Arc<AtomicBool>,
}

impl MemoryStationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store pre-populated with `stations`, in the given order.
    pub fn with_stations(stations: impl IntoIterator<Item = StationEntity>) -> Self {
        let map = stations
            .into_iter()
            .map(|station| (station.id.clone(), station))
            .collect();
        Self {
            stations: Arc::new(RwLock::new(map)),
            offline: Arc::default(),
        }
    }

    /// Simulate an outage: while offline every operation fails.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn ensure_online(&self) -> Result<(), MemoryStoreError> {
        if self.offline.load(Ordering::SeqCst) {
            Err(MemoryStoreError::Offline)
        } else {
            Ok(())
        }
    }
}

impl StationStore for MemoryStationStore {
    fn list_stations(&self) -> BoxFuture<'static, StorageResult<Vec<StationEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store.ensure_online()?;
            let guard = store.stations.read().await;
            Ok(guard.values().cloned().collect())
        })
    }

    fn find_station(&self, id: String) -> BoxFuture<'static, StorageResult<Option<StationEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store.ensure_online()?;
            let guard = store.stations.read().await;
            Ok(guard.get(&id).cloned())
        })
    }

    fn upsert_station(&self, station: StationEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store.ensure_online()?;
            let mut guard = store.stations.write().await;
            // IndexMap::insert keeps the original slot for existing keys.
            guard.insert(station.id.clone(), station);
            Ok(())
        })
    }

    fn delete_station(&self, id: String) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move {
            store.ensure_online()?;
            let mut guard = store.stations.write().await;
            Ok(guard.shift_remove(&id).is_some())
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.ensure_online().map_err(Into::into) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        self.health_check()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dao::models::RouteEntity;

    fn station(id: &str) -> StationEntity {
        StationEntity {
            id: id.into(),
            name: format!("Station {id}"),
            routes: IndexMap::new(),
        }
    }

    #[tokio::test]
    async fn listing_follows_creation_order_across_updates() {
        let store = MemoryStationStore::new();
        store.upsert_station(station("B")).await.unwrap();
        store.upsert_station(station("A")).await.unwrap();

        let mut edited = station("B");
        edited.name = "Renamed".into();
        store.upsert_station(edited).await.unwrap();

        let ids: Vec<_> = store
            .list_stations()
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.id)
            .collect();
        assert_eq!(ids, vec!["B", "A"]);
    }

    #[tokio::test]
    async fn upsert_then_list_round_trips_every_field() {
        let store = MemoryStationStore::new();
        let mut edited = station("A");
        edited.routes.insert(
            "START_A".into(),
            RouteEntity {
                next_station: "B".into(),
                password: "CAT".into(),
                next_clue: "Look under the bench".into(),
                video_url: Some("https://example.com/v.mp4".into()),
            },
        );
        store.upsert_station(edited.clone()).await.unwrap();

        let listed = store.list_stations().await.unwrap();
        assert_eq!(listed, vec![edited]);
    }

    #[tokio::test]
    async fn delete_reports_whether_station_existed() {
        let store = MemoryStationStore::with_stations([station("A")]);
        assert!(store.delete_station("A".into()).await.unwrap());
        assert!(!store.delete_station("A".into()).await.unwrap());
    }

    #[tokio::test]
    async fn offline_store_fails_every_operation() {
        let store = MemoryStationStore::with_stations([station("A")]);
        store.set_offline(true);
        assert!(store.list_stations().await.is_err());
        assert!(store.health_check().await.is_err());

        store.set_offline(false);
        assert_eq!(store.list_stations().await.unwrap().len(), 1);
    }
}
