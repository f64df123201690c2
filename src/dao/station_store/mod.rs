#[cfg(feature = "couch-store")]
pub mod couchdb;
pub mod memory;
#[cfg(feature = "mongo-store")]
pub mod mongodb;

use crate::dao::models::StationEntity;
use crate::dao::storage::StorageResult;
use futures::future::BoxFuture;

/// Abstraction over the persistence layer holding the station table.
///
/// Listing returns stations in creation order. Upserts replace the whole row
/// and are last-writer-wins; there is no concurrency token.
pub trait StationStore: Send + Sync {
    fn list_stations(&self) -> BoxFuture<'static, StorageResult<Vec<StationEntity>>>;
    fn find_station(&self, id: String) -> BoxFuture<'static, StorageResult<Option<StationEntity>>>;
    fn upsert_station(&self, station: StationEntity) -> BoxFuture<'static, StorageResult<()>>;
    /// Returns `false` when no station with this id existed.
    fn delete_station(&self, id: String) -> BoxFuture<'static, StorageResult<bool>>;
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>>;
}
