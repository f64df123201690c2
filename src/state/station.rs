use indexmap::IndexMap;

use crate::dao::models::{RouteEntity, StationEntity};

/// Runtime representation of a physical checkpoint.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Station {
    /// Unique identifier, also the join key of [`Route::next_station`].
    pub id: String,
    /// Display label.
    pub name: String,
    /// Routes keyed by the origin of the incoming edge (team or previous station).
    pub routes: IndexMap<String, Route>,
}

/// One accepted password at a station.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Route {
    /// Station reached when the password matches.
    pub next_station: String,
    /// Secret, compared case-insensitively.
    pub password: String,
    /// Clue text revealed on success.
    pub next_clue: String,
    /// Optional video revealed with the clue.
    pub video_url: Option<String>,
}

impl Route {
    /// Case-insensitive password comparison. Whitespace is significant on both sides.
    pub fn accepts(&self, candidate: &str) -> bool {
        self.password.to_uppercase() == candidate.to_uppercase()
    }
}

impl Station {
    /// First route whose password accepts `candidate`, in declaration order.
    pub fn matching_route(&self, candidate: &str) -> Option<(&str, &Route)> {
        self.routes
            .iter()
            .find(|(_, route)| route.accepts(candidate))
            .map(|(key, route)| (key.as_str(), route))
    }

    /// The first-declared route, whose clue is shown when this station is reached.
    pub fn first_route(&self) -> Option<&Route> {
        self.routes.first().map(|(_, route)| route)
    }
}

/// The full station table loaded from storage, indexed by id in creation order.
#[derive(Debug, Clone, Default)]
pub struct StationSet {
    stations: IndexMap<String, Station>,
}

impl StationSet {
    pub fn get(&self, id: &str) -> Option<&Station> {
        self.stations.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.stations.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Station> {
        self.stations.values()
    }

    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }
}

impl FromIterator<Station> for StationSet {
    fn from_iter<T: IntoIterator<Item = Station>>(iter: T) -> Self {
        Self {
            stations: iter
                .into_iter()
                .map(|station| (station.id.clone(), station))
                .collect(),
        }
    }
}

impl From<Vec<StationEntity>> for StationSet {
    fn from(value: Vec<StationEntity>) -> Self {
        value.into_iter().map(Station::from).collect()
    }
}

impl From<RouteEntity> for Route {
    fn from(value: RouteEntity) -> Self {
        Self {
            next_station: value.next_station,
            password: value.password,
            next_clue: value.next_clue,
            video_url: value.video_url,
        }
    }
}

impl From<Route> for RouteEntity {
    fn from(value: Route) -> Self {
        Self {
            next_station: value.next_station,
            password: value.password,
            next_clue: value.next_clue,
            video_url: value.video_url,
        }
    }
}

impl From<StationEntity> for Station {
    fn from(value: StationEntity) -> Self {
        Self {
            id: value.id,
            name: value.name,
            routes: value
                .routes
                .into_iter()
                .map(|(key, route)| (key, route.into()))
                .collect(),
        }
    }
}

impl From<Station> for StationEntity {
    fn from(value: Station) -> Self {
        Self {
            id: value.id,
            name: value.name,
            routes: value
                .routes
                .into_iter()
                .map(|(key, route)| (key, route.into()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn route(password: &str, next: &str) -> Route {
        Route {
            next_station: next.into(),
            password: password.into(),
            ..Default::default()
        }
    }

    #[test]
    fn password_match_ignores_case() {
        let r = route("Cat", "B");
        assert!(r.accepts("cat"));
        assert!(r.accepts("CAT"));
        assert!(!r.accepts("cats"));
        assert!(!r.accepts(" cat "));
    }

    #[test]
    fn first_declared_matching_route_wins() {
        let mut station = Station {
            id: "A".into(),
            ..Default::default()
        };
        station.routes.insert("team_red".into(), route("owl", "B"));
        station.routes.insert("team_blue".into(), route("OWL", "C"));

        let (key, matched) = station.matching_route("Owl").unwrap();
        assert_eq!(key, "team_red");
        assert_eq!(matched.next_station, "B");
    }
}
