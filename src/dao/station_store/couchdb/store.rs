use std::{sync::Arc, time::SystemTime};

use futures::future::BoxFuture;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde_json::{Value, from_value};
use tracing::{debug, info, warn};

use crate::dao::{
    models::StationEntity, station_store::StationStore, storage::StorageResult,
};

use super::{
    config::{CouchConfig, CouchCredentials},
    error::{CouchDaoError, CouchResult},
    models::{
        AllDocsResponse, CouchStationDocument, CouchStationRow, END_SUFFIX, STATION_PREFIX,
        station_doc_id,
    },
};

const ALL_DOCS: &str = "_all_docs";

/// Station store keeping one CouchDB document per station, keyed `station::<id>`.
#[derive(Clone)]
pub struct CouchStationStore {
    client: Client,
    database_url: Arc<Url>,
    credentials: Option<Arc<CouchCredentials>>,
}

impl CouchStationStore {
    /// Build the HTTP client and create the database when it does not exist yet.
    pub async fn connect(config: CouchConfig) -> CouchResult<Self> {
        let client = Client::builder()
            .build()
            .map_err(|source| CouchDaoError::ClientBuilder { source })?;

        let mut database_url = config.base_url.clone();
        database_url
            .path_segments_mut()
            .map_err(|_| CouchDaoError::InvalidBaseUrl {
                url: config.base_url.to_string(),
            })?
            .pop_if_empty()
            .push(&config.database);

        let store = Self {
            client,
            database_url: Arc::new(database_url),
            credentials: config.credentials.map(Arc::new),
        };
        store.ensure_database().await?;
        info!(database = %config.database, "connected to CouchDB");
        Ok(store)
    }

    /// Request against the database itself, or one of its documents.
    fn request(&self, method: Method, doc_id: Option<&str>) -> RequestBuilder {
        let mut url = (*self.database_url).clone();
        if let (Some(doc_id), Ok(mut segments)) = (doc_id, url.path_segments_mut()) {
            segments.push(doc_id);
        }
        let builder = self.client.request(method, url);
        match &self.credentials {
            Some(credentials) => {
                builder.basic_auth(&credentials.username, Some(&credentials.password))
            }
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder, target: &str) -> CouchResult<Response> {
        builder
            .send()
            .await
            .map_err(|source| CouchDaoError::Unreachable {
                target: target.to_owned(),
                source,
            })
    }

    async fn ensure_database(&self) -> CouchResult<()> {
        let target = self.database_url.path().to_owned();
        let response = self.send(self.request(Method::GET, None), &target).await?;

        let status = match response.status() {
            StatusCode::OK => return Ok(()),
            StatusCode::NOT_FOUND => {
                debug!(target = %target, "creating CouchDB database");
                self.send(self.request(Method::PUT, None), &target)
                    .await?
                    .status()
            }
            other => other,
        };

        // 412: created concurrently by another instance.
        if status.is_success() || status == StatusCode::PRECONDITION_FAILED {
            Ok(())
        } else {
            Err(CouchDaoError::UnexpectedStatus { target, status })
        }
    }

    async fn read_json<T: DeserializeOwned>(response: Response, target: &str) -> CouchResult<T> {
        let status = response.status();
        if !status.is_success() {
            return Err(CouchDaoError::UnexpectedStatus {
                target: target.to_owned(),
                status,
            });
        }
        response
            .json::<T>()
            .await
            .map_err(|source| CouchDaoError::Decode {
                target: target.to_owned(),
                source,
            })
    }

    async fn get_row(&self, doc_id: &str) -> CouchResult<Option<CouchStationRow>> {
        let response = self
            .send(self.request(Method::GET, Some(doc_id)), doc_id)
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let value: Value = Self::read_json(response, doc_id).await?;
        from_value(value)
            .map(Some)
            .map_err(|source| CouchDaoError::MalformedDocument {
                doc_id: doc_id.to_owned(),
                source,
            })
    }

    async fn list_stations(&self) -> CouchResult<Vec<StationEntity>> {
        let query = [
            ("include_docs", "true".to_owned()),
            ("startkey", format!("\"{STATION_PREFIX}\"")),
            ("endkey", format!("\"{STATION_PREFIX}{END_SUFFIX}\"")),
        ];
        let response = self
            .send(
                self.request(Method::GET, Some(ALL_DOCS)).query(&query),
                ALL_DOCS,
            )
            .await?;
        let payload: AllDocsResponse = Self::read_json(response, ALL_DOCS).await?;

        let mut rows: Vec<CouchStationRow> = payload
            .rows
            .into_iter()
            .filter_map(|row| {
                let doc = row.doc?;
                from_value(doc)
                    .map_err(|source| {
                        let err = CouchDaoError::MalformedDocument {
                            doc_id: row.id,
                            source,
                        };
                        warn!(error = %err, "skipping station document");
                    })
                    .ok()
            })
            .collect();
        // `_all_docs` is keyed by id; creation order comes from `created_at`.
        rows.sort_by_key(|row| row.created_at);

        Ok(rows.into_iter().filter_map(into_station).collect())
    }

    async fn find_station(&self, id: &str) -> CouchResult<Option<StationEntity>> {
        Ok(self
            .get_row(&station_doc_id(id))
            .await?
            .and_then(into_station))
    }

    /// Whole-document replace. A revision conflict is retried once with the fresh `_rev`.
    async fn upsert_station(&self, station: StationEntity) -> CouchResult<()> {
        let doc_id = station_doc_id(&station.id);

        for attempt in 0..2 {
            let existing = self.get_row(&doc_id).await?;
            let (rev, created_at) = match existing {
                Some(row) => (row.rev, row.created_at.unwrap_or_else(SystemTime::now)),
                None => (None, SystemTime::now()),
            };
            let document = CouchStationDocument::new(station.clone(), rev, created_at);

            let response = self
                .send(
                    self.request(Method::PUT, Some(&doc_id)).json(&document),
                    &doc_id,
                )
                .await?;
            match response.status() {
                status if status.is_success() => return Ok(()),
                StatusCode::CONFLICT => {
                    debug!(doc_id = %doc_id, attempt, "station document revision conflict");
                }
                status => {
                    return Err(CouchDaoError::UnexpectedStatus {
                        target: doc_id,
                        status,
                    });
                }
            }
        }

        Err(CouchDaoError::Conflict { doc_id })
    }

    async fn delete_station(&self, id: &str) -> CouchResult<bool> {
        let doc_id = station_doc_id(id);
        let Some(rev) = self.get_row(&doc_id).await?.and_then(|row| row.rev) else {
            return Ok(false);
        };

        let response = self
            .send(
                self.request(Method::DELETE, Some(&doc_id))
                    .query(&[("rev", rev.as_str())]),
                &doc_id,
            )
            .await?;
        match response.status() {
            status if status.is_success() => Ok(true),
            // Deleted by someone else in between.
            StatusCode::NOT_FOUND => Ok(false),
            status => Err(CouchDaoError::UnexpectedStatus {
                target: doc_id,
                status,
            }),
        }
    }

    async fn ping(&self) -> CouchResult<()> {
        let target = self.database_url.path().to_owned();
        let status = self
            .send(self.request(Method::HEAD, None), &target)
            .await?
            .status();
        if status.is_success() {
            Ok(())
        } else {
            Err(CouchDaoError::UnexpectedStatus { target, status })
        }
    }
}

fn into_station(row: CouchStationRow) -> Option<StationEntity> {
    let doc_id = row.doc_id.clone();
    StationEntity::try_from(row)
        .map_err(|err| warn!(doc_id = %doc_id, error = %err, "skipping malformed station document"))
        .ok()
}

impl StationStore for CouchStationStore {
    fn list_stations(&self) -> BoxFuture<'static, StorageResult<Vec<StationEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.list_stations().await.map_err(Into::into) })
    }

    fn find_station(&self, id: String) -> BoxFuture<'static, StorageResult<Option<StationEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.find_station(&id).await.map_err(Into::into) })
    }

    fn upsert_station(&self, station: StationEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.upsert_station(station).await.map_err(Into::into) })
    }

    fn delete_station(&self, id: String) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move { store.delete_station(&id).await.map_err(Into::into) })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.ping().await.map_err(Into::into) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.ensure_database().await.map_err(Into::into) })
    }
}
