use indexmap::IndexMap;
use mongodb::bson::{DateTime, Document, doc};
use serde::{Deserialize, Serialize};

use crate::dao::{
    models::{RouteEntity, StationEntity},
    records::{RawStationRecord, RecordError},
};

/// Shape written to the `stations` collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoStationDocument {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub routes: IndexMap<String, RouteEntity>,
    pub created_at: DateTime,
}

impl MongoStationDocument {
    pub fn new(station: StationEntity, created_at: DateTime) -> Self {
        Self {
            id: station.id,
            name: station.name,
            routes: station.routes,
            created_at,
        }
    }
}

/// Shape read back from the collection; tolerant of legacy rows.
#[derive(Debug, Deserialize)]
pub struct MongoStationRow {
    #[serde(rename = "_id")]
    pub key: String,
    #[serde(flatten)]
    pub record: RawStationRecord,
}

impl TryFrom<MongoStationRow> for StationEntity {
    type Error = RecordError;

    fn try_from(row: MongoStationRow) -> Result<Self, Self::Error> {
        let mut record = row.record;
        record.id.get_or_insert(row.key);
        record.try_into()
    }
}

/// Projection used to carry `created_at` over when a row is replaced.
#[derive(Debug, Deserialize)]
pub struct CreatedAtProjection {
    #[serde(default)]
    pub created_at: Option<DateTime>,
}

pub fn doc_id(id: &str) -> Document {
    doc! {"_id": id}
}
