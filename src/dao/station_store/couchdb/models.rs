use std::time::SystemTime;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::dao::{
    models::{RouteEntity, StationEntity},
    records::{RawStationRecord, RecordError},
};

pub const STATION_PREFIX: &str = "station::";
pub const END_SUFFIX: &str = "\u{ffff}";

#[derive(Debug, Deserialize)]
pub struct AllDocsResponse {
    pub rows: Vec<AllDocsRow>,
}

#[derive(Debug, Deserialize)]
pub struct AllDocsRow {
    pub id: String,
    #[serde(default)]
    pub doc: Option<Value>,
}

/// Document written for each station.
#[derive(Debug, Clone, Serialize)]
pub struct CouchStationDocument {
    #[serde(rename = "_id")]
    pub doc_id: String,
    #[serde(rename = "_rev", skip_serializing_if = "Option::is_none")]
    pub rev: Option<String>,
    pub id: String,
    pub name: String,
    pub routes: IndexMap<String, RouteEntity>,
    pub created_at: SystemTime,
}

impl CouchStationDocument {
    pub fn new(station: StationEntity, rev: Option<String>, created_at: SystemTime) -> Self {
        Self {
            doc_id: station_doc_id(&station.id),
            rev,
            id: station.id,
            name: station.name,
            routes: station.routes,
            created_at,
        }
    }
}

/// Document read back from CouchDB, tolerant of legacy rows.
#[derive(Debug, Deserialize)]
pub struct CouchStationRow {
    #[serde(rename = "_id")]
    pub doc_id: String,
    #[serde(rename = "_rev", default)]
    pub rev: Option<String>,
    #[serde(default)]
    pub created_at: Option<SystemTime>,
    #[serde(flatten)]
    pub record: RawStationRecord,
}

impl TryFrom<CouchStationRow> for StationEntity {
    type Error = RecordError;

    fn try_from(row: CouchStationRow) -> Result<Self, Self::Error> {
        let mut record = row.record;
        if record.id.is_none() {
            record.id = row
                .doc_id
                .strip_prefix(STATION_PREFIX)
                .map(ToOwned::to_owned);
        }
        record.try_into()
    }
}

pub fn station_doc_id(id: &str) -> String {
    format!("{STATION_PREFIX}{id}")
}
