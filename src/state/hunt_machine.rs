use std::sync::Arc;

use thiserror::Error;

use crate::state::station::{Station, StationSet};

/// Phases of one participant's progress through the hunt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HuntPhase {
    /// No station resolved yet.
    Unauthenticated,
    /// A station has been scanned and awaits a password.
    AtStation(Station),
    /// The password matched; the destination station's clue is shown until the next scan.
    Advanced {
        /// Station the participant must find next.
        station: Station,
        /// Content revealed for that station.
        clue: Clue,
    },
}

impl HuntPhase {
    /// Short name used in logs and error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            HuntPhase::Unauthenticated => "unauthenticated",
            HuntPhase::AtStation(_) => "at_station",
            HuntPhase::Advanced { .. } => "advanced",
        }
    }
}

/// Content revealed when a participant advances.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clue {
    pub text: String,
    pub video_url: Option<String>,
}

impl Clue {
    /// Clue shown on arrival at `station`: its first-declared route's clue, or
    /// `completion_message` when that clue is empty or the station is a sink.
    pub fn for_station(station: &Station, completion_message: &str) -> Self {
        let first = station.first_route();
        let text = first
            .map(|route| route.next_clue.trim())
            .filter(|text| !text.is_empty())
            .unwrap_or(completion_message)
            .to_owned();
        Self {
            text,
            video_url: first.and_then(|route| route.video_url.clone()),
        }
    }
}

/// Non-fatal outcomes of a hunt action. The phase is left untouched in every case.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HuntError {
    /// The scanned or typed identifier names no station.
    #[error("invalid station code `{identifier}`")]
    InvalidCode { identifier: String },
    /// A password was submitted before a station was scanned.
    #[error("scan a station code first (current phase: {phase})")]
    NotAtStation { phase: &'static str },
    /// No route of the station accepts the password.
    #[error("incorrect password for station `{station_id}`")]
    PasswordMismatch { station_id: String },
    /// The matching route leads to a station that does not exist.
    #[error("route `{route_key}` of station `{station_id}` leads to unknown station `{next_station}`")]
    DanglingReference {
        station_id: String,
        route_key: String,
        next_station: String,
    },
}

/// Per-participant state machine. Transitions are computed against a freshly
/// loaded [`StationSet`]; the version increments on every applied transition
/// so callers can detect that a copy went stale.
#[derive(Debug, Clone)]
pub struct HuntStateMachine {
    phase: HuntPhase,
    version: usize,
    completion_message: Arc<str>,
}

impl HuntStateMachine {
    /// Create a machine in [`HuntPhase::Unauthenticated`].
    pub fn new(completion_message: impl Into<Arc<str>>) -> Self {
        Self {
            phase: HuntPhase::Unauthenticated,
            version: 0,
            completion_message: completion_message.into(),
        }
    }

    pub fn phase(&self) -> &HuntPhase {
        &self.phase
    }

    pub fn version(&self) -> usize {
        self.version
    }

    /// Move to [`HuntPhase::AtStation`] for `identifier`, from any phase.
    pub fn resolve_station(
        &mut self,
        stations: &StationSet,
        identifier: &str,
    ) -> Result<&HuntPhase, HuntError> {
        let identifier = identifier.trim();
        let station = stations
            .get(identifier)
            .cloned()
            .ok_or_else(|| HuntError::InvalidCode {
                identifier: identifier.to_owned(),
            })?;

        Ok(self.transition(HuntPhase::AtStation(station)))
    }

    /// Accept the first route (declaration order) whose password matches
    /// `candidate` case-insensitively and advance to its destination.
    ///
    /// Neither side is trimmed: a stored `"cat "` accepts `"CAT "` but not `"cat"`.
    pub fn submit_password(
        &mut self,
        stations: &StationSet,
        candidate: &str,
    ) -> Result<&HuntPhase, HuntError> {
        let HuntPhase::AtStation(current) = &self.phase else {
            return Err(HuntError::NotAtStation {
                phase: self.phase.kind(),
            });
        };

        // Edits made since the scan apply; a station deleted meanwhile no longer exists.
        let station = stations
            .get(&current.id)
            .ok_or_else(|| HuntError::InvalidCode {
                identifier: current.id.clone(),
            })?;

        let (route_key, route) =
            station
                .matching_route(candidate)
                .ok_or_else(|| HuntError::PasswordMismatch {
                    station_id: station.id.clone(),
                })?;

        let next = stations
            .get(&route.next_station)
            .cloned()
            .ok_or_else(|| HuntError::DanglingReference {
                station_id: station.id.clone(),
                route_key: route_key.to_owned(),
                next_station: route.next_station.clone(),
            })?;

        let clue = Clue::for_station(&next, &self.completion_message);
        Ok(self.transition(HuntPhase::Advanced {
            station: next,
            clue,
        }))
    }

    fn transition(&mut self, next: HuntPhase) -> &HuntPhase {
        self.phase = next;
        self.version += 1;
        &self.phase
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::station::Route;

    const DONE: &str = "Mission complete!";

    fn route(password: &str, next: &str, clue: &str) -> Route {
        Route {
            next_station: next.into(),
            password: password.into(),
            next_clue: clue.into(),
            video_url: None,
        }
    }

    fn station(id: &str, routes: Vec<(&str, Route)>) -> Station {
        Station {
            id: id.into(),
            name: format!("Station {id}"),
            routes: routes
                .into_iter()
                .map(|(key, route)| (key.to_owned(), route))
                .collect(),
        }
    }

    /// `A --CAT--> B`, `B` has no routes.
    fn two_station_hunt() -> StationSet {
        [
            station("A", vec![("r1", route("CAT", "B", "Find the oak"))]),
            station("B", vec![]),
        ]
        .into_iter()
        .collect()
    }

    fn at(sm: &mut HuntStateMachine, stations: &StationSet, id: &str) {
        sm.resolve_station(stations, id).unwrap();
    }

    #[test]
    fn initial_phase_is_unauthenticated() {
        let sm = HuntStateMachine::new(DONE);
        assert_eq!(sm.phase(), &HuntPhase::Unauthenticated);
        assert_eq!(sm.version(), 0);
    }

    #[test]
    fn resolving_a_known_station_moves_to_at_station() {
        let stations = two_station_hunt();
        let mut sm = HuntStateMachine::new(DONE);

        let phase = sm.resolve_station(&stations, "A").unwrap().clone();
        assert_eq!(phase, HuntPhase::AtStation(stations.get("A").unwrap().clone()));
    }

    #[test]
    fn resolving_twice_is_idempotent() {
        let stations = two_station_hunt();
        let mut sm = HuntStateMachine::new(DONE);

        let first = sm.resolve_station(&stations, "A").unwrap().clone();
        let second = sm.resolve_station(&stations, "A").unwrap().clone();
        assert_eq!(first, second);
    }

    #[test]
    fn unknown_code_keeps_phase() {
        let stations = two_station_hunt();
        let mut sm = HuntStateMachine::new(DONE);
        at(&mut sm, &stations, "A");
        let version = sm.version();

        let err = sm.resolve_station(&stations, "Z").unwrap_err();
        assert_eq!(
            err,
            HuntError::InvalidCode {
                identifier: "Z".into()
            }
        );
        assert!(matches!(sm.phase(), HuntPhase::AtStation(s) if s.id == "A"));
        assert_eq!(sm.version(), version);
    }

    #[test]
    fn matching_password_in_any_case_advances_to_sink_with_completion_message() {
        let stations = two_station_hunt();
        let mut sm = HuntStateMachine::new(DONE);
        at(&mut sm, &stations, "A");

        let phase = sm.submit_password(&stations, "cat").unwrap().clone();
        match phase {
            HuntPhase::Advanced { station, clue } => {
                assert_eq!(station.id, "B");
                assert_eq!(clue.text, DONE);
                assert_eq!(clue.video_url, None);
            }
            other => panic!("expected advanced phase, got {other:?}"),
        }
    }

    #[test]
    fn every_route_password_advances_to_its_destination() {
        let stations: StationSet = [
            station(
                "A",
                vec![
                    ("START_A", route("Alpha", "B", "")),
                    ("START_B", route("beta", "C", "")),
                ],
            ),
            station("B", vec![("A", route("x", "C", "Go to the slide"))]),
            station("C", vec![]),
        ]
        .into_iter()
        .collect();

        for (password, expected) in [("ALPHA", "B"), ("alpha", "B"), ("BeTa", "C")] {
            let mut sm = HuntStateMachine::new(DONE);
            at(&mut sm, &stations, "A");
            match sm.submit_password(&stations, password).unwrap() {
                HuntPhase::Advanced { station, .. } => assert_eq!(station.id, expected),
                other => panic!("expected advanced phase, got {other:?}"),
            }
        }
    }

    #[test]
    fn revealed_clue_comes_from_destination_first_route() {
        let mut first = route("x", "C", "Go to the slide");
        first.video_url = Some("https://example.com/slide.mp4".into());
        let stations: StationSet = [
            station("A", vec![("r1", route("cat", "B", ""))]),
            station(
                "B",
                vec![("r1", first), ("r2", route("y", "C", "Ignored clue"))],
            ),
            station("C", vec![]),
        ]
        .into_iter()
        .collect();
        let mut sm = HuntStateMachine::new(DONE);
        at(&mut sm, &stations, "A");

        match sm.submit_password(&stations, "CAT").unwrap() {
            HuntPhase::Advanced { clue, .. } => {
                assert_eq!(clue.text, "Go to the slide");
                assert_eq!(
                    clue.video_url.as_deref(),
                    Some("https://example.com/slide.mp4")
                );
            }
            other => panic!("expected advanced phase, got {other:?}"),
        }
    }

    #[test]
    fn wrong_password_keeps_phase_and_reports_mismatch() {
        let stations = two_station_hunt();
        let mut sm = HuntStateMachine::new(DONE);
        at(&mut sm, &stations, "A");
        let before = sm.phase().clone();

        let err = sm.submit_password(&stations, "DOG").unwrap_err();
        assert_eq!(
            err,
            HuntError::PasswordMismatch {
                station_id: "A".into()
            }
        );
        assert_eq!(sm.phase(), &before);
    }

    #[test]
    fn station_without_routes_rejects_everything() {
        let stations = two_station_hunt();
        let mut sm = HuntStateMachine::new(DONE);
        at(&mut sm, &stations, "B");

        for candidate in ["", "CAT", "anything"] {
            assert!(matches!(
                sm.submit_password(&stations, candidate),
                Err(HuntError::PasswordMismatch { .. })
            ));
        }
    }

    #[test]
    fn password_before_scan_is_rejected() {
        let stations = two_station_hunt();
        let mut sm = HuntStateMachine::new(DONE);
        assert_eq!(
            sm.submit_password(&stations, "CAT").unwrap_err(),
            HuntError::NotAtStation {
                phase: "unauthenticated"
            }
        );
    }

    #[test]
    fn advanced_requires_a_new_scan() {
        let stations = two_station_hunt();
        let mut sm = HuntStateMachine::new(DONE);
        at(&mut sm, &stations, "A");
        sm.submit_password(&stations, "CAT").unwrap();

        assert!(matches!(
            sm.submit_password(&stations, "CAT"),
            Err(HuntError::NotAtStation { phase: "advanced" })
        ));

        at(&mut sm, &stations, "B");
        assert!(matches!(sm.phase(), HuntPhase::AtStation(s) if s.id == "B"));
    }

    #[test]
    fn dangling_reference_is_a_hard_error() {
        let stations: StationSet = [station("A", vec![("r1", route("cat", "GHOST", ""))])]
            .into_iter()
            .collect();
        let mut sm = HuntStateMachine::new(DONE);
        at(&mut sm, &stations, "A");
        let version = sm.version();

        let err = sm.submit_password(&stations, "cat").unwrap_err();
        assert_eq!(
            err,
            HuntError::DanglingReference {
                station_id: "A".into(),
                route_key: "r1".into(),
                next_station: "GHOST".into(),
            }
        );
        assert_eq!(sm.version(), version);
    }

    #[test]
    fn stored_password_matches_exactly_as_typed_whitespace_included() {
        let stations: StationSet = [
            station("A", vec![("r1", route("CAT", "B", ""))]),
            station("B", vec![]),
            station("C", vec![("r1", route("cat ", "B", ""))]),
        ]
        .into_iter()
        .collect();

        let mut sm = HuntStateMachine::new(DONE);
        at(&mut sm, &stations, "C");
        assert!(matches!(
            sm.submit_password(&stations, "CAT "),
            Ok(HuntPhase::Advanced { .. })
        ));

        let mut sm = HuntStateMachine::new(DONE);
        at(&mut sm, &stations, "A");
        assert!(matches!(
            sm.submit_password(&stations, "  cat  "),
            Err(HuntError::PasswordMismatch { .. })
        ));
        assert!(matches!(sm.phase(), HuntPhase::AtStation(s) if s.id == "A"));
    }

    #[test]
    fn station_deleted_after_the_scan_is_an_invalid_code() {
        let stations = two_station_hunt();
        let mut sm = HuntStateMachine::new(DONE);
        at(&mut sm, &stations, "A");
        let version = sm.version();

        let without_a: StationSet = [station("B", vec![])].into_iter().collect();
        assert_eq!(
            sm.submit_password(&without_a, "CAT").unwrap_err(),
            HuntError::InvalidCode {
                identifier: "A".into()
            }
        );
        assert!(matches!(sm.phase(), HuntPhase::AtStation(s) if s.id == "A"));
        assert_eq!(sm.version(), version);
    }

    #[test]
    fn edits_made_after_the_scan_are_honoured() {
        let stations = two_station_hunt();
        let mut sm = HuntStateMachine::new(DONE);
        at(&mut sm, &stations, "A");

        let edited: StationSet = [
            station("A", vec![("r1", route("DOG", "B", ""))]),
            station("B", vec![]),
        ]
        .into_iter()
        .collect();

        assert!(sm.submit_password(&edited, "cat").is_err());
        assert!(sm.submit_password(&edited, "dog").is_ok());
    }
}
