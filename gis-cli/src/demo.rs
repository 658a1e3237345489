//! Seeded network for `--demo`: a handful of real stations and axes, and a
//! generated incident history, served through the in-memory transport.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use gis_core::{MemoryTransport, Method};
use serde_json::{json, Value};
use std::collections::BTreeMap;

const STATIONS: &[(&str, &str, &str, &str, &str, f64, f64)] = &[
    ("Casa Voyageurs", "CVO", "PRINCIPALE", "CASABLANCA", "Casablanca", -7.5898, 33.5883),
    ("Casa Port", "CPO", "PRINCIPALE", "CASABLANCA", "Casablanca", -7.6131, 33.6003),
    ("Ain Sebaa", "ASB", "SECONDAIRE", "CASABLANCA", "Casablanca", -7.5412, 33.6089),
    ("Rabat Ville", "RBV", "PRINCIPALE", "RABAT", "Rabat", -6.8350, 34.0150),
    ("Rabat Agdal", "RAG", "SECONDAIRE", "RABAT", "Rabat", -6.8560, 33.9990),
    ("Kenitra", "KEN", "SECONDAIRE", "RABAT", "Kenitra", -6.5802, 34.2610),
    ("Fes", "FES", "PRINCIPALE", "FES", "Fes", -5.0078, 34.0181),
    ("Meknes", "MEK", "SECONDAIRE", "FES", "Meknès", -5.5473, 33.8935),
    ("Marrakech", "MRK", "PRINCIPALE", "MARRAKECH", "Marrakech", -8.0089, 31.6295),
    ("Settat", "SET", "HALTE", "MARRAKECH", "Settat", -7.6164, 33.0010),
    ("Tanger Ville", "TNG", "PRINCIPALE", "TANGER", "Tanger", -5.7810, 35.7595),
    ("Asilah", "ASI", "HALTE", "TANGER", "Asilah", -6.0319, 35.4650),
];

const AXES: &[(&str, &[(f64, f64)])] = &[
    ("CASABLANCA", &[(-7.6131, 33.6003), (-7.5898, 33.5883), (-7.5412, 33.6089)]),
    ("RABAT", &[(-7.5412, 33.6089), (-6.8560, 33.9990), (-6.8350, 34.0150), (-6.5802, 34.2610)]),
    ("FES", &[(-6.5802, 34.2610), (-5.5473, 33.8935), (-5.0078, 34.0181)]),
    ("MARRAKECH", &[(-7.5898, 33.5883), (-7.6164, 33.0010), (-8.0089, 31.6295)]),
    ("TANGER", &[(-6.5802, 34.2610), (-6.0319, 35.4650), (-5.7810, 35.7595)]),
];

const INCIDENT_TYPES: &[(i64, &str)] = &[
    (1, "Panne de signalisation"),
    (2, "Défaut caténaire"),
    (3, "Obstacle sur voie"),
    (4, "Rupture de rail"),
    (5, "Panne matériel roulant"),
];

const STATUSES: &[&str] = &["Ouvert", "En cours", "Résolu", "Fermé"];

pub const INCIDENT_COUNT: i64 = 120;

/// Clock the demo data is generated against, so period buckets are stable.
pub fn reference_time() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 5, 15)
        .and_then(|date| date.and_hms_opt(10, 0, 0))
        .unwrap_or_default()
}

fn stations() -> Vec<Value> {
    STATIONS
        .iter()
        .enumerate()
        .map(|(index, &(name, code, kind, axis, city, lng, lat))| {
            // Every fourth station is stored in binary form, as some imports are.
            let geometry = if index % 4 == 3 {
                "0101000020E6100000A4703D0AD7A31EC0F6285C8FC2C54040".to_string()
            } else {
                format!("POINT({lng} {lat})")
            };
            json!({
                "id": index + 1,
                "nom": name,
                "code": code,
                "type": kind,
                "axe": axis,
                "ville": city,
                "etat": if index % 5 == 4 { "PASSIVE" } else { "ACTIVE" },
                "geometrie": geometry,
                "codeoperationnel": format!("OP{:03}", index + 1),
                "codereseau": format!("RN{:02}", index % 3),
            })
        })
        .collect()
}

fn segments() -> Vec<Value> {
    AXES.iter()
        .flat_map(|&(axis, points)| {
            points.windows(2).enumerate().map(move |(index, pair)| {
                let (a, b) = (pair[0], pair[1]);
                json!({
                    "axe": axis,
                    "plod": format!("{}+000", index * 40),
                    "plof": format!("{}+000", (index + 1) * 40),
                    "cumuld": (index * 40) as f64,
                    "cumulf": ((index + 1) * 40) as f64,
                    "geometrie": format!("LINESTRING({} {},{} {})", a.0, a.1, b.0, b.1),
                })
            })
        })
        .collect()
}

fn incidents() -> Vec<Value> {
    let now = reference_time();
    (1..=INCIDENT_COUNT)
        .map(|id| {
            let started = now - Duration::hours(id * 9);
            let status = STATUSES[(id as usize) % STATUSES.len()];
            let ended = matches!(status, "Résolu" | "Fermé")
                .then(|| (started + Duration::hours(3)).format("%Y-%m-%dT%H:%M:%S").to_string());
            let (_, code, _, axis, _, lng, lat) = STATIONS[(id as usize) % STATIONS.len()];
            json!({
                "id": id,
                "date_debut": started.format("%Y-%m-%dT%H:%M:%S").to_string(),
                "date_fin": ended,
                "heure_debut": started.format("%H:%M:%S").to_string(),
                "statut": status,
                "description": format!("Incident signalé sur l'axe {axis} à proximité de {code}"),
                "type_id": INCIDENT_TYPES[(id as usize) % INCIDENT_TYPES.len()].0,
                "localisation_id": (id % 10) + 1,
                "gare_debut_id": code,
                "pk_debut": format!("{}+{:03}", id, (id * 37) % 1000),
                "geometrie": format!("POINT({lng} {lat})"),
            })
        })
        .collect()
}

fn locations() -> Vec<Value> {
    (1..=10)
        .map(|id| {
            let (_, code, _, axis, _, _, _) = STATIONS[id % STATIONS.len()];
            json!({
                "id": id,
                "axe": axis,
                "pk_debut": format!("{}+000", id * 10),
                "pk_fin": format!("{}+500", id * 10),
                "voie": if id % 2 == 0 { "V1" } else { "V2" },
                "gare": code,
                "description": format!("Section {id}"),
            })
        })
        .collect()
}

fn count_by(rows: &[Value], key: &str, label: &str) -> Vec<Value> {
    let mut counts: BTreeMap<String, u64> = BTreeMap::new();
    for row in rows {
        if let Some(value) = row[key].as_str() {
            *counts.entry(value.to_string()).or_default() += 1;
        }
    }
    counts
        .into_iter()
        .map(|(value, count)| json!({ label: value, "count": count }))
        .collect()
}

fn statistics(stations: &[Value], segments: &[Value], incidents: &[Value]) -> Value {
    json!({
        "gares": {
            "total": stations.len(),
            "par_type": count_by(stations, "type", "type"),
            "par_axe": count_by(stations, "axe", "axe"),
        },
        "arcs": {
            "total": segments.len(),
            "par_axe": count_by(segments, "axe", "axe"),
        },
        "evenements": {
            "total": incidents.len(),
            "par_statut": count_by(incidents, "statut", "statut"),
        },
        "types_incidents": {"total": INCIDENT_TYPES.len(), "actifs": INCIDENT_TYPES.len()},
    })
}

fn ok(data: Value) -> Value {
    json!({ "success": true, "data": data })
}

pub fn seeded_transport() -> MemoryTransport {
    let transport = MemoryTransport::new();
    let stations = stations();
    let segments = segments();
    let incidents = incidents();

    let types: Vec<Value> = INCIDENT_TYPES
        .iter()
        .map(|&(id, label)| json!({ "id": id, "libelle": label, "niveau": "N1" }))
        .collect();
    let filters = json!({
        "axes": AXES.iter().map(|(axis, _)| axis).collect::<Vec<_>>(),
        "types": ["HALTE", "PRINCIPALE", "SECONDAIRE"],
        "etats": ["ACTIVE", "PASSIVE"],
    });

    transport.respond_json(
        Method::Get,
        "/statistiques",
        &ok(statistics(&stations, &segments, &incidents)),
    );
    for station in &stations {
        if let Some(id) = station["id"].as_u64() {
            transport.respond_json(Method::Get, &format!("/gares/{id}"), &ok(station.clone()));
        }
    }
    transport.respond_json(Method::Get, "/gares", &ok(Value::Array(stations)));
    transport.respond_json(Method::Get, "/gares/filters", &ok(filters));
    transport.respond_json(Method::Get, "/arcs", &ok(Value::Array(segments)));
    transport.respond_json(Method::Get, "/evenements", &ok(Value::Array(incidents)));
    transport.respond_json(Method::Get, "/types-incidents", &ok(Value::Array(types)));
    transport.respond_json(Method::Get, "/localisations", &ok(Value::Array(locations())));
    transport
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;
    use gis_core::{CollectingNotifier, GisApi};

    #[test]
    fn seeded_routes_decode_cleanly() {
        let notifier = CollectingNotifier::new();
        let api = GisApi::new(seeded_transport(), notifier.clone());

        let data = block_on(api.load_map(348));
        assert_eq!(data.stations.len(), STATIONS.len());
        assert_eq!(data.incidents.len(), INCIDENT_COUNT as usize);
        assert_eq!(data.segments.len(), 11);
        assert!(block_on(api.station(3)).is_some());
        assert_eq!(block_on(api.locations()).len(), 10);
        assert!(notifier.is_empty());
    }
}
