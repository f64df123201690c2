//! Boundary decoding for station rows.
//!
//! Rows written by older versions of the admin screen carry the video at the
//! station level (`video_url` or `videoUrl`), snake-cased route fields, or a
//! `null` route mapping. Every backend decodes into [`RawStationRecord`] and
//! converts it once into the canonical [`StationEntity`].

use indexmap::IndexMap;
use serde::Deserialize;
use thiserror::Error;
use tracing::warn;

use crate::dao::models::{RouteEntity, StationEntity};

/// Reasons a stored row cannot be turned into a station.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RecordError {
    #[error("station row has no `id` field")]
    MissingId,
}

/// Station row as found in storage, before normalisation.
#[derive(Debug, Default, Deserialize)]
pub struct RawStationRecord {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    /// Legacy station-level video.
    #[serde(default, alias = "videoUrl")]
    pub video_url: Option<String>,
    #[serde(default)]
    pub routes: Option<IndexMap<String, RawRouteRecord>>,
}

/// Route entry as found in storage, before normalisation.
#[derive(Debug, Default, Deserialize)]
pub struct RawRouteRecord {
    #[serde(default, alias = "nextStation")]
    pub next_station: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default, alias = "nextClue")]
    pub next_clue: Option<String>,
    #[serde(default, alias = "videoUrl")]
    pub video_url: Option<String>,
}

impl TryFrom<RawStationRecord> for StationEntity {
    type Error = RecordError;

    fn try_from(raw: RawStationRecord) -> Result<Self, Self::Error> {
        let id = raw.id.ok_or(RecordError::MissingId)?;
        let station_video = non_empty(raw.video_url);

        let routes = raw
            .routes
            .unwrap_or_default()
            .into_iter()
            .map(|(key, route)| {
                let video_url = non_empty(route.video_url).or_else(|| station_video.clone());
                let route = RouteEntity {
                    next_station: route.next_station.unwrap_or_default(),
                    password: route.password.unwrap_or_default(),
                    next_clue: route.next_clue.unwrap_or_default(),
                    video_url,
                };
                (key, route)
            })
            .collect::<IndexMap<_, _>>();

        if routes.is_empty() && station_video.is_some() {
            warn!(station_id = %id, "dropping station-level video on a station without routes");
        }

        Ok(Self {
            id,
            name: raw.name.unwrap_or_default(),
            routes,
        })
    }
}

/// Normalise a batch of rows, skipping (and logging) the ones that cannot be decoded.
pub fn normalize_rows(rows: impl IntoIterator<Item = RawStationRecord>) -> Vec<StationEntity> {
    rows.into_iter()
        .filter_map(|row| match StationEntity::try_from(row) {
            Ok(station) => Some(station),
            Err(err) => {
                warn!(error = %err, "skipping malformed station row");
                None
            }
        })
        .collect()
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
