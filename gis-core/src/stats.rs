use crate::status::IncidentStatus;
use gis_records::{Incident, Station, Statistics};
use serde::Serialize;

/// Headline figures for the dashboard cards.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct StatsSummary {
    pub stations: u64,
    pub segments: u64,
    pub incidents: u64,
    pub open_incidents: u64,
    pub in_progress_incidents: u64,
    pub resolved_incidents: u64,
    pub incident_types: u64,
    pub active_incident_types: u64,
}

impl From<&Statistics> for StatsSummary {
    fn from(stats: &Statistics) -> Self {
        let mut summary = StatsSummary {
            stations: stats.stations.total,
            segments: stats.segments.total,
            incidents: stats.incidents.total,
            incident_types: stats.types_incidents.total,
            active_incident_types: stats.types_incidents.actifs,
            ..StatsSummary::default()
        };
        for bucket in &stats.incidents.par_statut {
            match IncidentStatus::classify(bucket.status.as_deref()) {
                IncidentStatus::Open => summary.open_incidents += bucket.count,
                IncidentStatus::InProgress => summary.in_progress_incidents += bucket.count,
                IncidentStatus::Resolved => summary.resolved_incidents += bucket.count,
                IncidentStatus::Unknown => {}
            }
        }
        summary
    }
}

/// Counts computed from loaded collections when no aggregate is available.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct LiveCounts {
    pub active_stations: usize,
    pub passive_stations: usize,
    pub ongoing_incidents: usize,
}

impl LiveCounts {
    pub fn from_collections(stations: &[Station], incidents: &[Incident]) -> Self {
        let active_stations = stations.iter().filter(|s| s.is_active()).count();
        Self {
            active_stations,
            passive_stations: stations.len() - active_stations,
            ongoing_incidents: incidents.iter().filter(|i| i.is_ongoing()).count(),
        }
    }
}

/// Axis choices for the map filter, in server order.
pub fn axis_options(stats: &Statistics) -> Vec<String> {
    stats
        .stations
        .par_axe
        .iter()
        .filter_map(|bucket| bucket.axis.clone())
        .collect()
}

/// Station type choices for the map filter, in server order.
pub fn station_kind_options(stats: &Statistics) -> Vec<String> {
    stats
        .stations
        .par_type
        .iter()
        .filter_map(|bucket| bucket.kind.clone())
        .collect()
}
