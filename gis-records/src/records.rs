use crate::lenient;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Station {
    #[serde(deserialize_with = "lenient::id")]
    pub id: i64,
    #[serde(rename = "nom", default, deserialize_with = "lenient::opt_text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub code: Option<String>,
    #[serde(rename = "type", default, deserialize_with = "lenient::opt_text")]
    pub kind: Option<String>,
    #[serde(rename = "axe", default, deserialize_with = "lenient::opt_text")]
    pub axis: Option<String>,
    #[serde(rename = "ville", default, deserialize_with = "lenient::opt_text")]
    pub city: Option<String>,
    #[serde(rename = "etat", default, deserialize_with = "lenient::opt_text")]
    pub status: Option<String>,
    #[serde(rename = "geometrie", default, deserialize_with = "lenient::opt_text")]
    pub geometry: Option<String>,
    #[serde(rename = "codeoperationnel", default, deserialize_with = "lenient::opt_text")]
    pub operational_code: Option<String>,
    #[serde(rename = "codereseau", default, deserialize_with = "lenient::opt_text")]
    pub network_code: Option<String>,
}

impl Station {
    pub fn is_active(&self) -> bool {
        self.status.as_deref() == Some("ACTIVE")
    }
}

/// A track section between two mileposts on a named axis.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    #[serde(default, deserialize_with = "lenient::opt_id")]
    pub id: Option<i64>,
    #[serde(rename = "axe", default, deserialize_with = "lenient::opt_text")]
    pub axis: Option<String>,
    #[serde(rename = "plod", default, deserialize_with = "lenient::opt_text")]
    pub start_milepost: Option<String>,
    #[serde(rename = "plof", default, deserialize_with = "lenient::opt_text")]
    pub end_milepost: Option<String>,
    #[serde(rename = "cumuld", default, deserialize_with = "lenient::opt_number")]
    pub start_distance: Option<f64>,
    #[serde(rename = "cumulf", default, deserialize_with = "lenient::opt_number")]
    pub end_distance: Option<f64>,
    #[serde(rename = "geometrie", default, deserialize_with = "lenient::opt_text")]
    pub geometry: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Incident {
    #[serde(deserialize_with = "lenient::id")]
    pub id: i64,
    #[serde(rename = "date_debut", default, deserialize_with = "lenient::opt_text")]
    pub start_date: Option<String>,
    #[serde(rename = "date_fin", default, deserialize_with = "lenient::opt_text")]
    pub end_date: Option<String>,
    #[serde(rename = "heure_debut", default, deserialize_with = "lenient::opt_text")]
    pub start_time: Option<String>,
    #[serde(rename = "heure_fin", default, deserialize_with = "lenient::opt_text")]
    pub end_time: Option<String>,
    #[serde(rename = "statut", default, deserialize_with = "lenient::opt_text")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_id")]
    pub type_id: Option<i64>,
    #[serde(rename = "localisation_id", default, deserialize_with = "lenient::opt_id")]
    pub location_id: Option<i64>,
    #[serde(rename = "gare_debut_id", default, deserialize_with = "lenient::opt_text")]
    pub start_station: Option<String>,
    #[serde(rename = "gare_fin_id", default, deserialize_with = "lenient::opt_text")]
    pub end_station: Option<String>,
    #[serde(rename = "pk_debut", default, deserialize_with = "lenient::opt_text")]
    pub start_pk: Option<String>,
    #[serde(rename = "pk_fin", default, deserialize_with = "lenient::opt_text")]
    pub end_pk: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub location_name: Option<String>,
    #[serde(rename = "geometrie", default, deserialize_with = "lenient::opt_text")]
    pub geometry: Option<String>,
}

impl Incident {
    /// An incident without an end date is still ongoing.
    pub fn is_ongoing(&self) -> bool {
        self.end_date.is_none()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct IncidentType {
    #[serde(deserialize_with = "lenient::id")]
    pub id: i64,
    #[serde(rename = "libelle", default, deserialize_with = "lenient::opt_text")]
    pub label: Option<String>,
    #[serde(rename = "niveau", default, deserialize_with = "lenient::opt_text")]
    pub level: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub systeme_id: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Location {
    #[serde(deserialize_with = "lenient::id")]
    pub id: i64,
    #[serde(rename = "axe", default, deserialize_with = "lenient::opt_text")]
    pub axis: Option<String>,
    #[serde(rename = "pk_debut", default, deserialize_with = "lenient::opt_text")]
    pub start_pk: Option<String>,
    #[serde(rename = "pk_fin", default, deserialize_with = "lenient::opt_text")]
    pub end_pk: Option<String>,
    #[serde(rename = "voie", default, deserialize_with = "lenient::opt_text")]
    pub track: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub section: Option<String>,
    #[serde(rename = "gare", default, deserialize_with = "lenient::opt_text")]
    pub station: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub description: Option<String>,
}

impl Location {
    /// Label used in location pickers: `"<axis> - <description|station>"`.
    pub fn label(&self) -> String {
        let name = self
            .description
            .as_deref()
            .or(self.station.as_deref())
            .unwrap_or("Sans nom");
        format!("{} - {}", self.axis.as_deref().unwrap_or(""), name)
            .trim()
            .to_string()
    }
}

/// Distinct values offered by the station filter dropdowns.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterOptions {
    #[serde(default)]
    pub axes: Vec<String>,
    #[serde(default)]
    pub types: Vec<String>,
    #[serde(rename = "etats", default)]
    pub statuses: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    #[serde(rename = "gares", default)]
    pub stations: StationStats,
    #[serde(rename = "arcs", default)]
    pub segments: SegmentStats,
    #[serde(rename = "evenements", default)]
    pub incidents: IncidentStats,
    #[serde(default)]
    pub types_incidents: IncidentTypeStats,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StationStats {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub par_type: Vec<TypeCount>,
    #[serde(default)]
    pub par_axe: Vec<AxisCount>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SegmentStats {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub par_axe: Vec<AxisCount>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct IncidentStats {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub par_statut: Vec<StatusCount>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct IncidentTypeStats {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub actifs: u64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TypeCount {
    #[serde(rename = "type", default, deserialize_with = "lenient::opt_text")]
    pub kind: Option<String>,
    pub count: u64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AxisCount {
    #[serde(rename = "axe", default, deserialize_with = "lenient::opt_text")]
    pub axis: Option<String>,
    pub count: u64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StatusCount {
    #[serde(rename = "statut", default, deserialize_with = "lenient::opt_text")]
    pub status: Option<String>,
    pub count: u64,
}
