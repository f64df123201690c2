use std::sync::Arc;

use futures::{TryStreamExt, future::BoxFuture};
use mongodb::{
    Client, Collection, Database,
    bson::{DateTime, doc},
    options::IndexOptions,
};
use tokio::sync::RwLock;

use super::{
    config::MongoConfig,
    connection::establish_connection,
    error::{MongoDaoError, MongoResult},
    models::{CreatedAtProjection, MongoStationDocument, MongoStationRow, doc_id},
};
use crate::dao::{
    models::StationEntity,
    records::RecordError,
    station_store::StationStore,
    storage::StorageResult,
};

const STATION_COLLECTION_NAME: &str = "stations";

#[derive(Clone)]
pub struct MongoStationStore {
    inner: Arc<MongoInner>,
}

struct MongoInner {
    state: RwLock<MongoState>,
    config: MongoConfig,
}

struct MongoState {
    // Kept alive alongside the database handle it produced.
    #[allow(dead_code)]
    client: Client,
    database: Database,
}

impl MongoInner {
    async fn ping(&self) -> MongoResult<()> {
        let database = {
            let guard = self.state.read().await;
            guard.database.clone()
        };

        database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|source| MongoDaoError::HealthPing { source })?;
        Ok(())
    }

    async fn reconnect(&self) -> MongoResult<()> {
        let (client, database) = establish_connection(&self.config).await?;
        let mut guard = self.state.write().await;
        guard.client = client;
        guard.database = database;
        Ok(())
    }
}

impl MongoStationStore {
    /// Establish a connection to MongoDB and ensure indexes are present.
    pub async fn connect(config: MongoConfig) -> MongoResult<Self> {
        let (client, database) = establish_connection(&config).await?;

        let inner = Arc::new(MongoInner {
            state: RwLock::new(MongoState { client, database }),
            config,
        });

        let store = Self { inner };
        store.ensure_indexes().await?;
        Ok(store)
    }

    async fn ensure_indexes(&self) -> MongoResult<()> {
        let collection = self.documents().await;
        let index = mongodb::IndexModel::builder()
            .keys(doc! {"created_at": 1})
            .options(
                IndexOptions::builder()
                    .name(Some("station_created_at_idx".to_owned()))
                    .build(),
            )
            .build();

        collection
            .create_index(index)
            .await
            .map_err(|source| MongoDaoError::EnsureIndex {
                collection: STATION_COLLECTION_NAME,
                index: "created_at",
                source,
            })?;

        Ok(())
    }

    async fn database(&self) -> Database {
        let guard = self.inner.state.read().await;
        guard.database.clone()
    }

    async fn documents(&self) -> Collection<MongoStationDocument> {
        self.database()
            .await
            .collection::<MongoStationDocument>(STATION_COLLECTION_NAME)
    }

    async fn rows(&self) -> Collection<MongoStationRow> {
        self.database()
            .await
            .collection::<MongoStationRow>(STATION_COLLECTION_NAME)
    }

    async fn list_stations(&self) -> MongoResult<Vec<StationEntity>> {
        let rows: Vec<MongoStationRow> = self
            .rows()
            .await
            .find(doc! {})
            .sort(doc! {"created_at": 1, "_id": 1})
            .await
            .map_err(|source| MongoDaoError::ListStations { source })?
            .try_collect()
            .await
            .map_err(|source| MongoDaoError::ListStations { source })?;

        Ok(rows
            .into_iter()
            .filter_map(|row| {
                let key = row.key.clone();
                match StationEntity::try_from(row) {
                    Ok(station) => Some(station),
                    Err(err) => {
                        log_rejected_row(&key, &err);
                        None
                    }
                }
            })
            .collect())
    }

    async fn find_station(&self, id: String) -> MongoResult<Option<StationEntity>> {
        let row = self
            .rows()
            .await
            .find_one(doc_id(&id))
            .await
            .map_err(|source| MongoDaoError::LoadStation {
                id: id.clone(),
                source,
            })?;

        Ok(row.and_then(|row| match StationEntity::try_from(row) {
            Ok(station) => Some(station),
            Err(err) => {
                log_rejected_row(&id, &err);
                None
            }
        }))
    }

    async fn upsert_station(&self, station: StationEntity) -> MongoResult<()> {
        let id = station.id.clone();
        let existing = self
            .database()
            .await
            .collection::<CreatedAtProjection>(STATION_COLLECTION_NAME)
            .find_one(doc_id(&id))
            .projection(doc! {"created_at": 1})
            .await
            .map_err(|source| MongoDaoError::SaveStation {
                id: id.clone(),
                source,
            })?;

        let created_at = existing
            .and_then(|projection| projection.created_at)
            .unwrap_or_else(DateTime::now);
        let document = MongoStationDocument::new(station, created_at);

        self.documents()
            .await
            .replace_one(doc_id(&id), &document)
            .upsert(true)
            .await
            .map_err(|source| MongoDaoError::SaveStation { id, source })?;

        Ok(())
    }

    async fn delete_station(&self, id: String) -> MongoResult<bool> {
        let result = self
            .documents()
            .await
            .delete_one(doc_id(&id))
            .await
            .map_err(|source| MongoDaoError::DeleteStation { id, source })?;
        Ok(result.deleted_count > 0)
    }
}

fn log_rejected_row(key: &str, err: &RecordError) {
    tracing::warn!(station_key = %key, error = %err, "skipping malformed station row");
}

impl StationStore for MongoStationStore {
    fn list_stations(&self) -> BoxFuture<'static, StorageResult<Vec<StationEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.list_stations().await.map_err(Into::into) })
    }

    fn find_station(&self, id: String) -> BoxFuture<'static, StorageResult<Option<StationEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.find_station(id).await.map_err(Into::into) })
    }

    fn upsert_station(&self, station: StationEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.upsert_station(station).await.map_err(Into::into) })
    }

    fn delete_station(&self, id: String) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move { store.delete_station(id).await.map_err(Into::into) })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.ping().await.map_err(Into::into) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.reconnect().await.map_err(Into::into) })
    }
}
