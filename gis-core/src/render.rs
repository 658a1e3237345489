//! Display descriptors for the station table and the incident cards.
//!
//! A render pass turns the current page of a [`ListView`] into plain rows.
//! Rows only carry [`ActionId`]s; what an action does is resolved later by
//! [`Dispatcher`] against whatever collection is current at that moment, so a
//! stale button can never act on data that has been replaced.

use crate::geometry;
use crate::listing::{Criteria, IncidentFilter, ListView, PageItem, PageSummary, StationFilter};
use crate::map::Viewport;
use crate::status::{station_status_label, station_tone, IncidentStatus, Tone};
use gis_records::{
    timestamp, Incident, IncidentInput, IncidentType, Location, Station, StationInput,
};
use serde::Serialize;

pub const STATION_PAGE_WINDOW: usize = 5;
pub const INCIDENT_PAGE_WINDOW: usize = 7;
pub const EXCERPT_CHARS: usize = 150;

const NOT_SET: &str = "Non défini";
const NOT_SET_F: &str = "Non définie";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum ActionKind {
    View,
    Edit,
    Delete,
    Locate,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum EntityRef {
    Station(i64),
    Incident(i64),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct ActionId {
    pub kind: ActionKind,
    pub target: EntityRef,
}

impl ActionId {
    pub fn new(kind: ActionKind, target: EntityRef) -> Self {
        Self { kind, target }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Badge {
    pub text: String,
    pub tone: Tone,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Field {
    pub label: &'static str,
    pub value: String,
}

impl Field {
    pub fn new(label: &'static str, value: impl Into<String>) -> Self {
        Self {
            label,
            value: value.into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Section {
    pub title: &'static str,
    pub fields: Vec<Field>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DetailView {
    pub title: String,
    pub badges: Vec<Badge>,
    pub sections: Vec<Section>,
    pub actions: Vec<ActionId>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct StationRow {
    pub id: i64,
    pub name: String,
    pub code: String,
    pub kind: String,
    pub axis: String,
    pub city: String,
    pub status: Badge,
    pub actions: Vec<ActionId>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct IncidentCard {
    pub id: i64,
    pub heading: String,
    pub status: Badge,
    pub card_class: &'static str,
    pub type_label: String,
    pub excerpt: String,
    pub started: String,
    pub start_time: Option<String>,
    pub location: String,
    pub actions: Vec<ActionId>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct EmptyState {
    pub title: &'static str,
    pub hint: &'static str,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PaginationControls {
    pub visible: bool,
    pub previous: Option<usize>,
    pub next: Option<usize>,
    pub items: Vec<PageItem>,
}

/// Everything one list render needs. Each pass replaces the previous one
/// wholesale.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderPass<R> {
    pub rows: Vec<R>,
    pub empty: Option<EmptyState>,
    pub controls: PaginationControls,
    pub summary: PageSummary,
}

fn or_placeholder(value: Option<&str>, placeholder: &str) -> String {
    value.unwrap_or(placeholder).to_string()
}

/// `dd/mm/yyyy hh:mm`, or `None` when the value is absent or unreadable.
pub fn format_timestamp(raw: Option<&str>) -> Option<String> {
    raw.and_then(timestamp::parse)
        .map(|at| at.format("%d/%m/%Y %H:%M").to_string())
}

/// First `max` characters plus `...` when longer.
pub fn excerpt(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

fn controls<T, F: Criteria<T>>(view: &ListView<T, F>, max_visible: usize) -> PaginationControls {
    let pager = view.pager();
    let window = pager.window(max_visible);
    PaginationControls {
        visible: window.is_visible(),
        previous: pager.has_previous().then(|| pager.page() - 1),
        next: pager.has_next().then(|| pager.page() + 1),
        items: window.items(),
    }
}

fn station_badge(station: &Station) -> Badge {
    let status = station.status.as_deref();
    Badge {
        text: station_status_label(status).to_string(),
        tone: station_tone(status),
    }
}

fn incident_badge(incident: &Incident) -> Badge {
    let status = IncidentStatus::classify(incident.status.as_deref());
    Badge {
        text: or_placeholder(incident.status.as_deref(), NOT_SET),
        tone: status.tone(),
    }
}

fn type_label<'a>(types: &'a [IncidentType], type_id: Option<i64>) -> Option<&'a str> {
    let type_id = type_id?;
    types
        .iter()
        .find(|t| t.id == type_id)
        .and_then(|t| t.label.as_deref())
}

pub fn station_row(station: &Station) -> StationRow {
    let target = EntityRef::Station(station.id);
    StationRow {
        id: station.id,
        name: or_placeholder(station.name.as_deref(), "Nom non défini"),
        code: or_placeholder(station.code.as_deref(), NOT_SET),
        kind: or_placeholder(station.kind.as_deref(), NOT_SET),
        axis: or_placeholder(station.axis.as_deref(), NOT_SET),
        city: or_placeholder(station.city.as_deref(), NOT_SET_F),
        status: station_badge(station),
        actions: [
            ActionKind::View,
            ActionKind::Edit,
            ActionKind::Locate,
            ActionKind::Delete,
        ]
        .into_iter()
        .map(|kind| ActionId::new(kind, target))
        .collect(),
    }
}

pub fn incident_card(incident: &Incident, types: &[IncidentType]) -> IncidentCard {
    let status = IncidentStatus::classify(incident.status.as_deref());
    let description = incident
        .description
        .as_deref()
        .unwrap_or("Aucune description disponible");
    let target = EntityRef::Incident(incident.id);
    IncidentCard {
        id: incident.id,
        heading: format!("Incident #{}", incident.id),
        status: incident_badge(incident),
        card_class: status.card_class(),
        type_label: type_label(types, incident.type_id)
            .unwrap_or("Type inconnu")
            .to_string(),
        excerpt: excerpt(description, EXCERPT_CHARS),
        started: format_timestamp(incident.start_date.as_deref())
            .unwrap_or_else(|| NOT_SET_F.to_string()),
        start_time: incident.start_time.clone(),
        location: incident
            .location_id
            .map_or_else(|| "N/A".to_string(), |id| format!("#{id}")),
        actions: [ActionKind::View, ActionKind::Edit, ActionKind::Locate]
            .into_iter()
            .map(|kind| ActionId::new(kind, target))
            .collect(),
    }
}

pub fn render_stations(view: &ListView<Station, StationFilter>) -> RenderPass<StationRow> {
    let rows: Vec<StationRow> = view.page_items().into_iter().map(station_row).collect();
    RenderPass {
        empty: rows.is_empty().then_some(EmptyState {
            title: "Aucune gare trouvée",
            hint: "Modifiez vos critères de recherche",
        }),
        rows,
        controls: controls(view, STATION_PAGE_WINDOW),
        summary: view.pager().summary(),
    }
}

pub fn render_incidents(
    view: &ListView<Incident, IncidentFilter>,
    types: &[IncidentType],
) -> RenderPass<IncidentCard> {
    let rows: Vec<IncidentCard> = view
        .page_items()
        .into_iter()
        .map(|incident| incident_card(incident, types))
        .collect();
    RenderPass {
        empty: rows.is_empty().then_some(EmptyState {
            title: "Aucun incident trouvé",
            hint: "Aucun incident ne correspond à vos critères",
        }),
        rows,
        controls: controls(view, INCIDENT_PAGE_WINDOW),
        summary: view.pager().summary(),
    }
}

pub fn station_detail(station: &Station) -> DetailView {
    let field = |label, value: &Option<String>, placeholder| {
        Field::new(label, or_placeholder(value.as_deref(), placeholder))
    };
    let target = EntityRef::Station(station.id);
    DetailView {
        title: or_placeholder(station.name.as_deref(), "Gare sans nom"),
        badges: vec![station_badge(station)],
        sections: vec![
            Section {
                title: "Informations générales",
                fields: vec![
                    Field::new("ID", format!("#{}", station.id)),
                    field("Nom", &station.name, NOT_SET),
                    field("Code", &station.code, NOT_SET),
                    field("Type", &station.kind, NOT_SET),
                ],
            },
            Section {
                title: "Localisation",
                fields: vec![
                    field("Axe", &station.axis, NOT_SET),
                    field("Ville", &station.city, NOT_SET_F),
                    field("Code opérationnel", &station.operational_code, NOT_SET),
                    field("Code réseau", &station.network_code, NOT_SET),
                ],
            },
        ],
        actions: vec![
            ActionId::new(ActionKind::Edit, target),
            ActionId::new(ActionKind::Locate, target),
        ],
    }
}

pub fn incident_detail(
    incident: &Incident,
    types: &[IncidentType],
    locations: &[Location],
) -> DetailView {
    let location = incident
        .location_id
        .and_then(|id| locations.iter().find(|l| l.id == id));
    let pk = location
        .and_then(|l| {
            let start = l.start_pk.as_deref()?;
            Some(format!("{start} - {}", l.end_pk.as_deref().unwrap_or(start)))
        })
        .unwrap_or_else(|| NOT_SET.to_string());

    DetailView {
        title: format!("Incident #{}", incident.id),
        badges: vec![incident_badge(incident)],
        sections: vec![
            Section {
                title: "Informations générales",
                fields: vec![
                    Field::new("ID", format!("#{}", incident.id)),
                    Field::new("Type", type_label(types, incident.type_id).unwrap_or(NOT_SET)),
                    Field::new(
                        "Statut",
                        or_placeholder(incident.status.as_deref(), NOT_SET),
                    ),
                    Field::new(
                        "Date début",
                        format_timestamp(incident.start_date.as_deref())
                            .unwrap_or_else(|| NOT_SET_F.to_string()),
                    ),
                    Field::new(
                        "Date fin",
                        format_timestamp(incident.end_date.as_deref())
                            .unwrap_or_else(|| "En cours".to_string()),
                    ),
                ],
            },
            Section {
                title: "Localisation",
                fields: vec![
                    Field::new("Axe", or_placeholder(location.and_then(|l| l.axis.as_deref()), NOT_SET)),
                    Field::new("Section", or_placeholder(location.and_then(|l| l.section.as_deref()), NOT_SET_F)),
                    Field::new("Gare", or_placeholder(location.and_then(|l| l.station.as_deref()), NOT_SET_F)),
                    Field::new("PK", pk),
                ],
            },
            Section {
                title: "Description complète",
                fields: vec![Field::new(
                    "Description",
                    or_placeholder(
                        incident.description.as_deref(),
                        "Aucune description disponible",
                    ),
                )],
            },
        ],
        actions: vec![ActionId::new(
            ActionKind::Edit,
            EntityRef::Incident(incident.id),
        )],
    }
}

/// What the UI should do in response to an action.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    ShowStation(DetailView),
    EditStation { id: i64, form: StationInput },
    ConfirmDeleteStation { id: i64, name: String },
    ShowIncident(DetailView),
    EditIncident { id: i64, form: IncidentInput },
    Locate(Viewport),
}

/// Resolves action ids against the collections current at click time.
pub struct Dispatcher<'a> {
    pub stations: &'a [Station],
    pub incidents: &'a [Incident],
    pub types: &'a [IncidentType],
    pub locations: &'a [Location],
}

impl Dispatcher<'_> {
    /// `None` when the entity is gone or the action does not apply to it.
    pub fn dispatch(&self, action: ActionId) -> Option<Command> {
        match action.target {
            EntityRef::Station(id) => {
                let station = self.stations.iter().find(|s| s.id == id)?;
                self.station_command(action.kind, station)
            }
            EntityRef::Incident(id) => {
                let incident = self.incidents.iter().find(|i| i.id == id)?;
                self.incident_command(action.kind, incident)
            }
        }
    }

    fn station_command(&self, kind: ActionKind, station: &Station) -> Option<Command> {
        match kind {
            ActionKind::View => Some(Command::ShowStation(station_detail(station))),
            ActionKind::Edit => Some(Command::EditStation {
                id: station.id,
                form: StationInput::from(station),
            }),
            ActionKind::Delete => Some(Command::ConfirmDeleteStation {
                id: station.id,
                name: or_placeholder(station.name.as_deref(), "cette gare"),
            }),
            ActionKind::Locate => locate(station.geometry.as_deref()),
        }
    }

    fn incident_command(&self, kind: ActionKind, incident: &Incident) -> Option<Command> {
        match kind {
            ActionKind::View => Some(Command::ShowIncident(incident_detail(
                incident,
                self.types,
                self.locations,
            ))),
            ActionKind::Edit => Some(Command::EditIncident {
                id: incident.id,
                form: IncidentInput::from(incident),
            }),
            ActionKind::Delete => None,
            ActionKind::Locate => locate(incident.geometry.as_deref()),
        }
    }
}

fn locate(geometry: Option<&str>) -> Option<Command> {
    geometry::parse_field(geometry)
        .marker_position()
        .map(|at| Command::Locate(Viewport::focused(at)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn now() -> chrono::NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 15)
            .and_then(|d| d.and_hms_opt(9, 0, 0))
            .expect("valid date")
    }

    fn station(id: i64, status: Option<&str>) -> Station {
        Station {
            id,
            name: Some(format!("Gare {id}")),
            status: status.map(str::to_string),
            geometry: Some("POINT(-6.8 34.0)".into()),
            ..Station::default()
        }
    }

    #[test]
    fn station_rows_carry_status_tone_and_actions() {
        let row = station_row(&station(4, Some("ACTIVE")));
        assert_eq!(row.status.tone, Tone::Success);
        assert_eq!(row.code, "Non défini");
        assert_eq!(row.actions.len(), 4);
        assert!(row
            .actions
            .iter()
            .all(|a| a.target == EntityRef::Station(4)));

        let passive = station_row(&station(5, None));
        assert_eq!(passive.status.tone, Tone::Secondary);
    }

    #[test]
    fn incident_card_truncates_and_resolves_type() {
        let incident = Incident {
            id: 12,
            type_id: Some(3),
            status: Some("En cours".into()),
            description: Some("é".repeat(200)),
            start_date: Some("2024-03-01T08:05:00".into()),
            location_id: Some(44),
            ..Incident::default()
        };
        let types = vec![IncidentType {
            id: 3,
            label: Some("Panne signalisation".into()),
            ..IncidentType::default()
        }];

        let card = incident_card(&incident, &types);
        assert_eq!(card.type_label, "Panne signalisation");
        assert_eq!(card.excerpt.chars().count(), 153);
        assert!(card.excerpt.ends_with("..."));
        assert_eq!(card.started, "01/03/2024 08:05");
        assert_eq!(card.location, "#44");
        assert_eq!(card.card_class, "in-progress");
        assert_eq!(card.status.tone, Tone::Warning);

        let bare = incident_card(&Incident::default(), &[]);
        assert_eq!(bare.type_label, "Type inconnu");
        assert_eq!(bare.location, "N/A");
    }

    #[test]
    fn empty_page_renders_empty_state() {
        let view: ListView<Station, StationFilter> = ListView::new(25);
        let pass = render_stations(&view);
        assert!(pass.rows.is_empty());
        assert!(pass.empty.is_some());
        assert!(!pass.controls.visible);
        assert_eq!(pass.summary.first, 0);
    }

    #[test]
    fn render_pass_reflects_current_page() {
        let mut view: ListView<Station, StationFilter> = ListView::new(25);
        view.replace_items((1..=60).map(|id| station(id, None)).collect(), now());
        view.go_to(2);

        let pass = render_stations(&view);
        assert_eq!(pass.rows.len(), 25);
        assert_eq!(pass.rows[0].id, 26);
        assert_eq!(pass.controls.previous, Some(1));
        assert_eq!(pass.controls.next, Some(3));
        assert_eq!(
            pass.summary,
            PageSummary {
                first: 26,
                last: 50,
                total: 60
            }
        );
    }

    #[test]
    fn dispatch_resolves_against_current_collection() {
        let stations = vec![station(1, Some("ACTIVE"))];
        let dispatcher = Dispatcher {
            stations: &stations,
            incidents: &[],
            types: &[],
            locations: &[],
        };

        let view = ActionId::new(ActionKind::View, EntityRef::Station(1));
        assert!(matches!(
            dispatcher.dispatch(view),
            Some(Command::ShowStation(_))
        ));

        let locate = ActionId::new(ActionKind::Locate, EntityRef::Station(1));
        match dispatcher.dispatch(locate) {
            Some(Command::Locate(viewport)) => assert_eq!(viewport.zoom, 15),
            other => panic!("unexpected {other:?}"),
        }

        let stale = ActionId::new(ActionKind::Edit, EntityRef::Station(99));
        assert_eq!(dispatcher.dispatch(stale), None);
    }

    #[test]
    fn incident_detail_uses_location_lookup() {
        let incident = Incident {
            id: 8,
            location_id: Some(2),
            start_date: Some("2024-02-10T14:30:00".into()),
            ..Incident::default()
        };
        let locations = vec![Location {
            id: 2,
            axis: Some("FES".into()),
            start_pk: Some("12+300".into()),
            ..Location::default()
        }];

        let detail = incident_detail(&incident, &[], &locations);
        let general = &detail.sections[0].fields;
        assert_eq!(general[4], Field::new("Date fin", "En cours"));
        let place = &detail.sections[1].fields;
        assert_eq!(place[0], Field::new("Axe", "FES"));
        assert_eq!(place[3], Field::new("PK", "12+300 - 12+300"));
    }
}
