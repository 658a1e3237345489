//! Map scene: what each layer draws, independent of any map library.
//!
//! The scene owns the loaded collections and rebuilds feature lists when
//! they, the map filters or the incident page change. Showing or hiding a
//! layer never touches its features.

use crate::api::MapData;
use crate::geometry::{self, LatLng, FALLBACK_POSITION};
use crate::listing::{IncidentFilter, ListView, Pager};
use crate::render::{excerpt, format_timestamp, ActionId, ActionKind, Badge, EntityRef, Field};
use crate::status::{station_tone, IncidentStatus, Tone};
use crate::styles::{segment_line, station_marker, LineStyle, MarkerStyle, INCIDENT_MARKER};
use chrono::NaiveDateTime;
use gis_records::{Incident, Segment, Station};
use serde::Serialize;
use std::str::FromStr;

pub const DEFAULT_ZOOM: u8 = 6;
pub const FOCUS_ZOOM: u8 = 15;
pub const MIN_ZOOM: u8 = 5;
pub const MAX_ZOOM: u8 = 18;

const NA: &str = "N/A";

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Viewport {
    pub center: LatLng,
    pub zoom: u8,
}

impl Viewport {
    pub const DEFAULT: Viewport = Viewport {
        center: FALLBACK_POSITION,
        zoom: DEFAULT_ZOOM,
    };

    pub fn new(center: LatLng, zoom: u8) -> Self {
        Self {
            center,
            zoom: zoom.clamp(MIN_ZOOM, MAX_ZOOM),
        }
    }

    pub fn focused(center: LatLng) -> Self {
        Self::new(center, FOCUS_ZOOM)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum LayerKind {
    Stations,
    Segments,
    Incidents,
}

impl LayerKind {
    pub const ALL: [LayerKind; 3] = [LayerKind::Stations, LayerKind::Segments, LayerKind::Incidents];

    fn index(self) -> usize {
        match self {
            LayerKind::Stations => 0,
            LayerKind::Segments => 1,
            LayerKind::Incidents => 2,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LayerSelection {
    #[default]
    All,
    Only(LayerKind),
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unknown layer `{0}`")]
pub struct UnknownLayer(pub String);

impl FromStr for LayerSelection {
    type Err = UnknownLayer;

    /// Accepts the layer selector values: `all`, `gares`, `arcs`, `incidents`.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim() {
            "" | "all" => Ok(LayerSelection::All),
            "gares" | "stations" => Ok(LayerSelection::Only(LayerKind::Stations)),
            "arcs" | "segments" => Ok(LayerSelection::Only(LayerKind::Segments)),
            "incidents" => Ok(LayerSelection::Only(LayerKind::Incidents)),
            other => Err(UnknownLayer(other.to_string())),
        }
    }
}

/// Segments have no stable id on the wire; they are addressed by position in
/// the loaded collection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum FeatureId {
    Station(i64),
    Segment(usize),
    Incident(i64),
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum Shape {
    Marker { at: LatLng, style: MarkerStyle },
    Line { path: Vec<LatLng>, style: LineStyle },
}

/// Content of a popup or of the info panel.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub title: String,
    pub badges: Vec<Badge>,
    pub fields: Vec<Field>,
    pub action: Option<ActionId>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MapFeature {
    pub id: FeatureId,
    pub shape: Shape,
    pub popup: Summary,
    pub info: Summary,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct LayerCounts {
    pub stations: usize,
    pub segments: usize,
    pub incidents: usize,
}

/// Map-only filters; they narrow what is drawn, not what is loaded.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MapFilters {
    /// Applies to stations and segments.
    pub axis: Option<String>,
    pub station_kind: Option<String>,
}

impl MapFilters {
    fn keeps_station(&self, station: &Station) -> bool {
        self.axis
            .as_deref()
            .map_or(true, |axis| station.axis.as_deref() == Some(axis))
            && self
                .station_kind
                .as_deref()
                .map_or(true, |kind| station.kind.as_deref() == Some(kind))
    }

    fn keeps_segment(&self, segment: &Segment) -> bool {
        self.axis
            .as_deref()
            .map_or(true, |axis| segment.axis.as_deref() == Some(axis))
    }
}

fn text(value: Option<&str>) -> String {
    value.unwrap_or(NA).to_string()
}

fn number(value: Option<f64>) -> String {
    value.map_or_else(|| NA.to_string(), |v| v.to_string())
}

fn station_summary(station: &Station, detailed: bool) -> Summary {
    let mut fields = vec![
        Field::new("Type", text(station.kind.as_deref())),
        Field::new("Axe", text(station.axis.as_deref())),
        Field::new("Ville", text(station.city.as_deref())),
    ];
    if detailed {
        fields.push(Field::new(
            "Code opérationnel",
            text(station.operational_code.as_deref()),
        ));
    }
    Summary {
        title: station
            .name
            .clone()
            .unwrap_or_else(|| "Gare sans nom".to_string()),
        badges: vec![
            Badge {
                text: text(station.code.as_deref()),
                tone: Tone::Primary,
            },
            Badge {
                text: text(station.status.as_deref()),
                tone: station_tone(station.status.as_deref()),
            },
        ],
        fields,
        action: Some(ActionId::new(
            ActionKind::View,
            EntityRef::Station(station.id),
        )),
    }
}

fn segment_summary(segment: &Segment) -> Summary {
    Summary {
        title: "Section de Voie".to_string(),
        badges: Vec::new(),
        fields: vec![
            Field::new("Axe", text(segment.axis.as_deref())),
            Field::new("Point de départ", text(segment.start_milepost.as_deref())),
            Field::new("Point d'arrivée", text(segment.end_milepost.as_deref())),
            Field::new("Cumul départ", number(segment.start_distance)),
            Field::new("Cumul arrivée", number(segment.end_distance)),
        ],
        action: None,
    }
}

fn incident_summary(incident: &Incident) -> Summary {
    let status = IncidentStatus::classify(incident.status.as_deref());
    let place = incident.location_name.clone().or_else(|| {
        match (&incident.start_station, &incident.end_station) {
            (Some(start), Some(end)) => Some(format!("{start} - {end}")),
            (Some(one), None) | (None, Some(one)) => Some(one.clone()),
            (None, None) => None,
        }
    });
    let pk = match (&incident.start_pk, &incident.end_pk) {
        (Some(start), Some(end)) => format!("{start} - {end}"),
        (Some(one), None) | (None, Some(one)) => one.clone(),
        (None, None) => NA.to_string(),
    };
    Summary {
        title: format!("Incident #{}", incident.id),
        badges: vec![
            Badge {
                text: text(incident.status.as_deref()),
                tone: status.tone(),
            },
            Badge {
                text: format_timestamp(incident.start_date.as_deref())
                    .unwrap_or_else(|| NA.to_string()),
                tone: Tone::Secondary,
            },
        ],
        fields: vec![
            Field::new("Heure", text(incident.start_time.as_deref())),
            Field::new("Localisation", place.unwrap_or_else(|| NA.to_string())),
            Field::new("PK", pk),
            Field::new(
                "Description",
                incident
                    .description
                    .as_deref()
                    .map_or_else(|| NA.to_string(), |d| excerpt(d, 150)),
            ),
        ],
        action: Some(ActionId::new(
            ActionKind::View,
            EntityRef::Incident(incident.id),
        )),
    }
}

fn station_feature(station: &Station) -> Option<MapFeature> {
    let at = geometry::parse_field(station.geometry.as_deref()).marker_position()?;
    Some(MapFeature {
        id: FeatureId::Station(station.id),
        shape: Shape::Marker {
            at,
            style: station_marker(station.kind.as_deref()),
        },
        popup: station_summary(station, false),
        info: station_summary(station, true),
    })
}

fn segment_feature(index: usize, segment: &Segment) -> Option<MapFeature> {
    let parsed = geometry::parse_field(segment.geometry.as_deref());
    let path = parsed.polyline()?.to_vec();
    let summary = segment_summary(segment);
    Some(MapFeature {
        id: FeatureId::Segment(index),
        shape: Shape::Line {
            path,
            style: segment_line(segment.axis.as_deref()),
        },
        popup: summary.clone(),
        info: summary,
    })
}

fn incident_feature(incident: &Incident) -> Option<MapFeature> {
    let at = geometry::parse_field(incident.geometry.as_deref()).marker_position()?;
    let summary = incident_summary(incident);
    Some(MapFeature {
        id: FeatureId::Incident(incident.id),
        shape: Shape::Marker {
            at,
            style: INCIDENT_MARKER,
        },
        popup: summary.clone(),
        info: summary,
    })
}

pub struct MapScene {
    stations: Vec<Station>,
    segments: Vec<Segment>,
    incidents: ListView<Incident, IncidentFilter>,
    filters: MapFilters,
    visible: [bool; 3],
    layers: [Vec<MapFeature>; 3],
    view: Viewport,
    info: Option<Summary>,
    selected_station: Option<i64>,
}

impl MapScene {
    pub fn new(incident_page_size: usize) -> Self {
        Self {
            stations: Vec::new(),
            segments: Vec::new(),
            incidents: ListView::new(incident_page_size),
            filters: MapFilters::default(),
            visible: [true; 3],
            layers: Default::default(),
            view: Viewport::DEFAULT,
            info: None,
            selected_station: None,
        }
    }

    pub fn load(&mut self, data: MapData, now: NaiveDateTime) {
        self.set_stations(data.stations);
        self.set_segments(data.segments);
        self.set_incidents(data.incidents, now);
    }

    pub fn set_stations(&mut self, stations: Vec<Station>) {
        self.stations = stations;
        self.rebuild(LayerKind::Stations);
    }

    pub fn set_segments(&mut self, segments: Vec<Segment>) {
        self.segments = segments;
        self.rebuild(LayerKind::Segments);
    }

    pub fn set_incidents(&mut self, incidents: Vec<Incident>, now: NaiveDateTime) {
        self.incidents.replace_items(incidents, now);
        self.rebuild(LayerKind::Incidents);
    }

    fn rebuild(&mut self, kind: LayerKind) {
        let features: Vec<MapFeature> = match kind {
            LayerKind::Stations => self
                .stations
                .iter()
                .filter(|s| self.filters.keeps_station(s))
                .filter_map(station_feature)
                .collect(),
            LayerKind::Segments => self
                .segments
                .iter()
                .enumerate()
                .filter(|(_, s)| self.filters.keeps_segment(s))
                .filter_map(|(index, s)| segment_feature(index, s))
                .collect(),
            LayerKind::Incidents => self
                .incidents
                .page_items()
                .into_iter()
                .filter_map(incident_feature)
                .collect(),
        };
        tracing::debug!(layer = ?kind, count = features.len(), "map layer rebuilt");
        self.layers[kind.index()] = features;
    }

    /// Every built feature of a layer, drawn or not.
    pub fn features(&self, kind: LayerKind) -> &[MapFeature] {
        &self.layers[kind.index()]
    }

    /// What is actually on the map right now.
    pub fn drawn(&self, kind: LayerKind) -> &[MapFeature] {
        if self.is_visible(kind) {
            self.features(kind)
        } else {
            &[]
        }
    }

    pub fn is_visible(&self, kind: LayerKind) -> bool {
        self.visible[kind.index()]
    }

    pub fn set_visible(&mut self, kind: LayerKind, visible: bool) {
        self.visible[kind.index()] = visible;
    }

    pub fn select(&mut self, selection: LayerSelection) {
        for kind in LayerKind::ALL {
            let visible = match selection {
                LayerSelection::All => true,
                LayerSelection::Only(only) => only == kind,
            };
            self.set_visible(kind, visible);
        }
    }

    pub fn filters(&self) -> &MapFilters {
        &self.filters
    }

    pub fn set_filters(&mut self, filters: MapFilters) {
        if self.filters == filters {
            return;
        }
        self.filters = filters;
        self.rebuild(LayerKind::Stations);
        self.rebuild(LayerKind::Segments);
    }

    /// Replaces the info panel with the clicked feature's summary.
    pub fn click(&mut self, id: FeatureId) -> bool {
        let Some(info) = LayerKind::ALL
            .iter()
            .flat_map(|&kind| self.drawn(kind))
            .find(|f| f.id == id)
            .map(|f| f.info.clone())
        else {
            return false;
        };
        self.info = Some(info);
        if let FeatureId::Station(station) = id {
            self.selected_station = Some(station);
        }
        true
    }

    pub fn click_background(&mut self) {
        self.info = None;
    }

    pub fn info(&self) -> Option<&Summary> {
        self.info.as_ref()
    }

    pub fn selected_station(&self) -> Option<&Station> {
        let id = self.selected_station?;
        self.stations.iter().find(|s| s.id == id)
    }

    /// Zooms onto the last clicked station, if it has a position.
    pub fn focus_selected(&mut self) -> Option<Viewport> {
        let station = self.selected_station()?;
        let at = geometry::parse_field(station.geometry.as_deref()).marker_position()?;
        let view = Viewport::focused(at);
        self.view = view;
        Some(view)
    }

    pub fn view(&self) -> Viewport {
        self.view
    }

    pub fn set_view(&mut self, view: Viewport) {
        self.view = Viewport::new(view.center, view.zoom);
    }

    pub fn incident_pager(&self) -> Pager {
        self.incidents.pager()
    }

    pub fn incidents_page(&mut self, page: usize) -> bool {
        let moved = self.incidents.go_to(page);
        if moved {
            self.rebuild(LayerKind::Incidents);
        }
        moved
    }

    pub fn next_incidents(&mut self) -> bool {
        self.incidents_page(self.incidents.pager().page() + 1)
    }

    pub fn previous_incidents(&mut self) -> bool {
        match self.incidents.pager().page().checked_sub(1) {
            Some(page) => self.incidents_page(page),
            None => false,
        }
    }

    pub fn counts(&self) -> LayerCounts {
        LayerCounts {
            stations: self.features(LayerKind::Stations).len(),
            segments: self.features(LayerKind::Segments).len(),
            incidents: self.features(LayerKind::Incidents).len(),
        }
    }

    /// Back to the initial presentation; loaded data is kept.
    pub fn reset(&mut self) {
        self.select(LayerSelection::All);
        self.set_filters(MapFilters::default());
        self.incidents_page(1);
        self.view = Viewport::DEFAULT;
        self.info = None;
        self.selected_station = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 15)
            .and_then(|d| d.and_hms_opt(9, 0, 0))
            .expect("valid date")
    }

    fn data() -> MapData {
        MapData {
            stations: vec![
                Station {
                    id: 1,
                    name: Some("Casa Port".into()),
                    kind: Some("PRINCIPALE".into()),
                    axis: Some("CASABLANCA".into()),
                    geometry: Some("POINT(-7.61 33.60)".into()),
                    ..Station::default()
                },
                Station {
                    id: 2,
                    name: Some("Kenitra".into()),
                    axis: Some("RABAT".into()),
                    geometry: Some("0101000020E6100000".into()),
                    ..Station::default()
                },
                Station {
                    id: 3,
                    geometry: Some("garbage".into()),
                    ..Station::default()
                },
            ],
            segments: vec![
                Segment {
                    axis: Some("CASABLANCA".into()),
                    geometry: Some("LINESTRING(-7.0 33.5,-6.9 33.6)".into()),
                    ..Segment::default()
                },
                Segment {
                    axis: Some("RABAT".into()),
                    geometry: Some("LINESTRING(-6.8 34.0)".into()),
                    ..Segment::default()
                },
            ],
            incidents: (1..=120)
                .map(|id| Incident {
                    id,
                    geometry: Some("POINT(-6.5 34.2)".into()),
                    ..Incident::default()
                })
                .collect(),
        }
    }

    fn scene() -> MapScene {
        let mut scene = MapScene::new(50);
        scene.load(data(), now());
        scene
    }

    #[test]
    fn unreadable_geometry_is_skipped() {
        let scene = scene();
        assert_eq!(
            scene.counts(),
            LayerCounts {
                stations: 2,
                segments: 1,
                incidents: 50
            }
        );
        let fallback = &scene.features(LayerKind::Stations)[1];
        assert_eq!(
            fallback.shape,
            Shape::Marker {
                at: FALLBACK_POSITION,
                style: station_marker(None)
            }
        );
    }

    #[test]
    fn segment_uses_axis_style() {
        let scene = scene();
        match &scene.features(LayerKind::Segments)[0].shape {
            Shape::Line { path, style } => {
                assert_eq!(path.len(), 2);
                assert_eq!((style.color, style.weight), ("#dc3545", 4));
            }
            other => panic!("expected a line, got {other:?}"),
        }
    }

    #[test]
    fn popups_fill_missing_fields_with_na() {
        let scene = scene();
        let popup = &scene.features(LayerKind::Stations)[1].popup;
        assert_eq!(popup.badges[0].text, "N/A");
        assert!(popup.fields.contains(&Field::new("Ville", "N/A")));
    }

    #[test]
    fn hiding_a_layer_keeps_its_features() {
        let mut scene = scene();
        scene.select(LayerSelection::Only(LayerKind::Segments));
        assert!(scene.drawn(LayerKind::Stations).is_empty());
        assert_eq!(scene.features(LayerKind::Stations).len(), 2);
        assert!(!scene.click(FeatureId::Station(1)));
        assert!(scene.click(FeatureId::Segment(0)));
    }

    #[test]
    fn incident_layer_pages_by_fifty() {
        let mut scene = scene();
        let mut sizes = vec![scene.features(LayerKind::Incidents).len()];
        while scene.next_incidents() {
            sizes.push(scene.features(LayerKind::Incidents).len());
        }
        assert_eq!(sizes, vec![50, 50, 20]);
        assert!(!scene.next_incidents());
        assert_eq!(scene.incident_pager().page(), 3);
    }

    #[test]
    fn click_sets_info_and_background_hides_it() {
        let mut scene = scene();
        assert!(scene.click(FeatureId::Station(1)));
        assert_eq!(scene.info().map(|i| i.title.as_str()), Some("Casa Port"));

        let view = scene.focus_selected().expect("station has a position");
        assert_eq!(view.zoom, FOCUS_ZOOM);
        assert_eq!(view.center, LatLng::new(33.60, -7.61));

        scene.click_background();
        assert!(scene.info().is_none());
    }

    #[test]
    fn map_filters_narrow_stations_and_segments() {
        let mut scene = scene();
        scene.set_filters(MapFilters {
            axis: Some("RABAT".into()),
            station_kind: None,
        });
        assert_eq!(scene.counts().stations, 1);
        assert_eq!(scene.counts().segments, 0);
        assert_eq!(scene.counts().incidents, 50);
    }

    #[test]
    fn reset_is_idempotent() {
        let mut scene = scene();
        scene.select(LayerSelection::Only(LayerKind::Incidents));
        scene.set_filters(MapFilters {
            axis: Some("RABAT".into()),
            station_kind: Some("PRINCIPALE".into()),
        });
        scene.next_incidents();
        scene.click(FeatureId::Incident(60));
        scene.set_view(Viewport::new(LatLng::new(35.0, -5.0), 12));

        scene.reset();
        let first = (scene.counts(), scene.view(), scene.incident_pager());
        assert!(scene.info().is_none());
        assert!(LayerKind::ALL.iter().all(|&k| scene.is_visible(k)));
        assert_eq!(first.1, Viewport::DEFAULT);
        assert_eq!(first.2.page(), 1);

        scene.reset();
        assert_eq!((scene.counts(), scene.view(), scene.incident_pager()), first);
    }

    #[test]
    fn reset_forgets_the_selected_station() {
        let mut scene = scene();
        assert!(scene.click(FeatureId::Station(1)));
        assert!(scene.selected_station().is_some());

        scene.reset();
        assert!(scene.selected_station().is_none());
        assert_eq!(scene.focus_selected(), None);
        assert_eq!(scene.view(), Viewport::DEFAULT);
    }

    #[test]
    fn layer_selector_values() {
        assert_eq!("all".parse::<LayerSelection>(), Ok(LayerSelection::All));
        assert_eq!(
            "arcs".parse::<LayerSelection>(),
            Ok(LayerSelection::Only(LayerKind::Segments))
        );
        assert!("rivers".parse::<LayerSelection>().is_err());
    }
}
