//! Route graph rendering and admin-time integrity checks.
//!
//! The graph is drawn by an external Mermaid renderer; this module only
//! produces the text description. Edges are coloured by route key, since a
//! route key names the team or station a participant arrives from.

use std::{collections::HashSet, fmt::Write};

use indexmap::IndexMap;

use crate::state::station::StationSet;

const EDGE_COLORS: &[&str] = &[
    "#e6194b", "#3cb44b", "#4363d8", "#f58231", "#911eb4", "#42d4f4", "#f032e6", "#bfef45",
    "#469990", "#9a6324", "#800000", "#000075",
];

/// One route whose destination station does not exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DanglingRoute {
    pub station_id: String,
    pub route_key: String,
    pub next_station: String,
}

/// One route that accepts an empty password.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteRef {
    pub station_id: String,
    pub route_key: String,
}

/// Data-integrity findings over the whole station set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GraphReport {
    /// Routes pointing at missing stations; advancing through them fails.
    pub dangling_routes: Vec<DanglingRoute>,
    /// Stations no route leads to: entry points, or stations nobody can reach.
    pub without_incoming: Vec<String>,
    /// Stations with no routes; reaching one ends the hunt.
    pub terminal: Vec<String>,
    /// Stations saved with an empty id or name.
    pub incomplete: Vec<String>,
    /// Routes whose password is empty and therefore match an empty submission.
    pub empty_passwords: Vec<RouteRef>,
}

impl GraphReport {
    /// True when nothing would break a participant's progress.
    pub fn is_navigable(&self) -> bool {
        self.dangling_routes.is_empty()
    }
}

/// Inspect the station set for defects the hunt runtime would trip over.
pub fn validate(stations: &StationSet) -> GraphReport {
    let mut report = GraphReport::default();
    let mut reached = HashSet::new();

    for station in stations.iter() {
        if station.id.trim().is_empty() || station.name.trim().is_empty() {
            report.incomplete.push(station.id.clone());
        }
        if station.routes.is_empty() {
            report.terminal.push(station.id.clone());
        }

        for (key, route) in &station.routes {
            if route.password.trim().is_empty() {
                report.empty_passwords.push(RouteRef {
                    station_id: station.id.clone(),
                    route_key: key.clone(),
                });
            }
            if stations.contains(&route.next_station) {
                reached.insert(route.next_station.as_str());
            } else {
                report.dangling_routes.push(DanglingRoute {
                    station_id: station.id.clone(),
                    route_key: key.clone(),
                    next_station: route.next_station.clone(),
                });
            }
        }
    }

    report.without_incoming = stations
        .iter()
        .filter(|station| !reached.contains(station.id.as_str()))
        .map(|station| station.id.clone())
        .collect();

    report
}

/// Render the station set as a Mermaid `graph TD` description.
pub fn render_mermaid(stations: &StationSet) -> String {
    let mut nodes: IndexMap<&str, String> = IndexMap::new();
    for station in stations.iter() {
        let node_id = format!("s{}", nodes.len());
        nodes.insert(station.id.as_str(), node_id);
    }

    let mut out = String::from("graph TD\n");
    for station in stations.iter() {
        let label = if station.name.trim().is_empty() {
            station.id.clone()
        } else {
            format!("{} ({})", station.name, station.id)
        };
        let _ = writeln!(out, "    {}[\"{}\"]", nodes[station.id.as_str()], escape(&label));
    }

    let mut dangling: IndexMap<&str, String> = IndexMap::new();
    let mut key_colors: IndexMap<&str, &str> = IndexMap::new();
    let mut link_styles = Vec::new();
    let mut edge_index = 0usize;

    for station in stations.iter() {
        let from = &nodes[station.id.as_str()];
        for (key, route) in &station.routes {
            let target = match nodes.get(route.next_station.as_str()) {
                Some(node) => node.clone(),
                None => {
                    let next_id = dangling.len();
                    dangling
                        .entry(route.next_station.as_str())
                        .or_insert_with(|| format!("missing{next_id}"))
                        .clone()
                }
            };

            let label = if key.is_empty() {
                route.password.clone()
            } else {
                format!("{}: {}", key, route.password)
            };
            let _ = writeln!(out, "    {from} -->|\"{}\"| {target}", escape(&label));

            let palette_index = key_colors.len() % EDGE_COLORS.len();
            let color = *key_colors
                .entry(key.as_str())
                .or_insert(EDGE_COLORS[palette_index]);
            link_styles.push(format!("    linkStyle {edge_index} stroke:{color}"));
            edge_index += 1;
        }
    }

    for (missing, node_id) in &dangling {
        let _ = writeln!(
            out,
            "    {node_id}[\"{} (missing)\"]:::dangling",
            escape(missing)
        );
    }
    for style in link_styles {
        out.push_str(&style);
        out.push('\n');
    }
    if !dangling.is_empty() {
        out.push_str("    classDef dangling stroke:#d00,stroke-dasharray:5 5\n");
    }

    out
}

/// Make `text` safe inside a quoted Mermaid label: quotes are entity-encoded and
/// line breaks, which end a Mermaid statement, become spaces.
fn escape(text: &str) -> String {
    text.replace('"', "#quot;").replace(['\r', '\n'], " ")
}
