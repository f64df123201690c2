//! DTO definitions used by the participant-facing hunt routes.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::{format_system_time, validation::validate_not_blank},
    services::video::embed_video_url,
    state::{
        HuntSession,
        hunt_machine::{Clue, HuntPhase},
        station::Station,
    },
};

/// Optional deep-link parameter accepted when a session is opened.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct OpenSessionQuery {
    /// Station to resolve immediately, as carried by the participant page URL.
    pub station: Option<String>,
}

/// Station identifier typed in by hand.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct ResolveStationRequest {
    #[validate(custom(function = "validate_not_blank"))]
    pub identifier: String,
}

/// Raw text decoded from a station QR code.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct ScanRequest {
    #[validate(custom(function = "validate_not_blank"))]
    pub payload: String,
}

/// Password submitted at the current station.
#[derive(Debug, Deserialize, ToSchema)]
pub struct PasswordRequest {
    pub password: String,
}

/// Wire name of a hunt phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum HuntPhaseKind {
    Unauthenticated,
    AtStation,
    Advanced,
}

/// Public projection of a station; routes and passwords stay server-side.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StationRef {
    pub id: String,
    pub name: String,
}

/// Content revealed after a correct password.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ClueDto {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    /// Embeddable form of `video_url` for the clue player.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_embed_url: Option<String>,
}

/// Snapshot of one participant's progress.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct HuntSessionView {
    pub session_id: Uuid,
    pub phase: HuntPhaseKind,
    /// Current station while `at_station`, station to find next once `advanced`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub station: Option<StationRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clue: Option<ClueDto>,
    /// RFC 3339 timestamp of the session creation.
    pub opened_at: String,
}

impl HuntSessionView {
    pub fn new(session_id: Uuid, session: &HuntSession) -> Self {
        let (phase, station, clue) = match session.machine.phase() {
            HuntPhase::Unauthenticated => (HuntPhaseKind::Unauthenticated, None, None),
            HuntPhase::AtStation(station) => (HuntPhaseKind::AtStation, Some(station.into()), None),
            HuntPhase::Advanced { station, clue } => (
                HuntPhaseKind::Advanced,
                Some(station.into()),
                Some(clue.into()),
            ),
        };
        Self {
            session_id,
            phase,
            station,
            clue,
            opened_at: format_system_time(session.opened_at),
        }
    }
}

impl From<&Station> for StationRef {
    fn from(value: &Station) -> Self {
        Self {
            id: value.id.clone(),
            name: value.name.clone(),
        }
    }
}

impl From<&Clue> for ClueDto {
    fn from(value: &Clue) -> Self {
        Self {
            text: value.text.clone(),
            video_url: value.video_url.clone(),
            video_embed_url: value.video_url.as_deref().map(embed_video_url),
        }
    }
}
