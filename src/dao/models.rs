use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Canonical persisted representation of a physical checkpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct StationEntity {
    /// Short identifier, also encoded into the station QR code.
    pub id: String,
    /// Display label shown to participants.
    pub name: String,
    /// Accepted passwords keyed by the origin of the incoming edge, in declaration order.
    pub routes: IndexMap<String, RouteEntity>,
}

/// One accepted password at a station and what it unlocks.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct RouteEntity {
    /// Identifier of the station reached when the password matches.
    pub next_station: String,
    /// Secret compared case-insensitively against participant submissions.
    pub password: String,
    /// Clue text revealed on success.
    pub next_clue: String,
    /// Optional video revealed alongside the clue.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
}
