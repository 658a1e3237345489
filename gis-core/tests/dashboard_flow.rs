use chrono::{NaiveDate, NaiveDateTime};
use futures::executor::block_on;
use gis_core::geometry::FALLBACK_POSITION;
use gis_core::map::Shape;
use gis_core::render::render_incidents;
use gis_core::styles::segment_line;
use gis_core::{
    CollectingNotifier, CollectionStore, GisApi, IncidentFilter, LayerKind, Level, ListView,
    MapScene, MemoryTransport, Method, StationFilter,
};
use gis_records::{Incident, Station};
use serde_json::{json, Value};

fn now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 5, 15)
        .and_then(|d| d.and_hms_opt(9, 0, 0))
        .expect("valid date")
}

fn incidents_json(count: i64) -> Value {
    let rows: Vec<Value> = (1..=count)
        .map(|id| {
            json!({
                "id": id,
                "statut": if id % 2 == 0 { "Ouvert" } else { "Résolu" },
                "date_debut": "2024-05-14T08:30:00",
                "type_id": 1,
                "geometrie": format!("POINT(-7.{:02} 33.5)", id % 100),
            })
        })
        .collect();
    json!({ "success": true, "data": rows })
}

fn api_with(transport: MemoryTransport) -> (GisApi<MemoryTransport, CollectingNotifier>, CollectingNotifier) {
    let notifier = CollectingNotifier::new();
    (GisApi::new(transport, notifier.clone()), notifier)
}

fn incident_view(count: i64) -> ListView<Incident, IncidentFilter> {
    let transport = MemoryTransport::new();
    transport.respond_json(Method::Get, "/evenements", &incidents_json(count));
    let (api, notifier) = api_with(transport);
    let incidents = block_on(api.incidents(348, &[]));
    assert!(notifier.is_empty());

    let mut view = ListView::new(50);
    view.replace_items(incidents, now());
    view
}

#[test]
fn hundred_twenty_incidents_page_by_fifty() {
    let mut view = incident_view(120);
    let mut sizes = vec![view.page_items().len()];
    while view.next_page() {
        sizes.push(view.page_items().len());
    }
    assert_eq!(sizes, vec![50, 50, 20]);
    assert_eq!(view.pager().page(), 3);

    assert!(!view.next_page());
    assert_eq!(view.pager().page(), 3);
}

#[test]
fn out_of_range_pages_are_ignored() {
    let mut view = incident_view(120);
    let count = view.pager().page_count();
    assert!(view.go_to(2));
    assert!(!view.go_to(0));
    assert!(!view.go_to(count + 1));
    assert_eq!(view.pager().page(), 2);
}

#[test]
fn filter_change_returns_to_first_page() {
    let mut view = incident_view(120);
    assert!(view.go_to(2));
    view.update_filter(now(), |filter| filter.status = Some("Ouvert".into()));
    assert_eq!(view.pager().page(), 1);
    assert_eq!(view.filtered_len(), 60);

    let pass = render_incidents(&view, &[]);
    assert_eq!(pass.rows.len(), 50);
    assert_eq!(pass.summary.first, 1);
    assert_eq!(pass.summary.total, 60);
}

#[test]
fn failed_envelope_yields_nothing_and_one_error() {
    let transport = MemoryTransport::new();
    transport.respond(
        Method::Get,
        "/evenements",
        500,
        json!({ "success": false, "message": "base indisponible" }).to_string(),
    );
    let (api, notifier) = api_with(transport);

    let incidents = block_on(api.incidents(50, &[]));
    assert!(incidents.is_empty());

    let seen = notifier.take();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].level, Level::Error);
}

#[test]
fn station_search_matches_any_text_field() {
    let transport = MemoryTransport::new();
    transport.respond_json(
        Method::Get,
        "/gares",
        &json!({ "success": true, "data": [
            { "id": 1, "nom": "Casa Voyageurs", "ville": "Casablanca", "etat": "ACTIVE" },
            { "id": 2, "nom": "Rabat Ville", "ville": "Rabat", "etat": "ACTIVE" },
            { "id": 3, "nom": "Ain Sebaa", "ville": "Casablanca", "etat": "PASSIVE" },
            { "id": 4, "nom": "Fes", "code": "FES" }
        ]}),
    );
    let (api, _) = api_with(transport);
    let stations = block_on(api.all_stations());

    let mut view: ListView<Station, StationFilter> = ListView::new(25);
    view.replace_items(stations, now());
    view.update_filter(now(), |filter| filter.search = "  CASA ".into());

    let ids: Vec<i64> = view.filtered().map(|s| s.id).collect();
    assert_eq!(ids, vec![1, 3]);
}

#[test]
fn odd_rows_keep_the_rest_of_the_batch() {
    let transport = MemoryTransport::new();
    transport.respond_json(
        Method::Get,
        "/gares",
        &json!({ "success": true, "data": [
            { "id": 1, "nom": "Casa Port", "geometrie": "POINT(-7.61 33.60)" },
            { "id": "2", "nom": "Rabat Ville", "geometrie": { "type": "Point", "coordinates": [-6.8, 34.0] } }
        ]}),
    );
    transport.respond_json(
        Method::Get,
        "/evenements",
        &json!({ "success": true, "data": [{ "id": "7", "statut": "Ouvert" }] }),
    );
    let (api, notifier) = api_with(transport);

    let stations = block_on(api.all_stations());
    let incidents = block_on(api.incidents(50, &[]));

    assert!(notifier.is_empty());
    assert_eq!(stations.iter().map(|s| s.id).collect::<Vec<_>>(), vec![1, 2]);
    assert_eq!(stations[1].geometry, None);
    assert_eq!(incidents[0].id, 7);

    let mut scene = MapScene::new(50);
    scene.set_stations(stations);
    assert_eq!(scene.counts().stations, 1);
}

#[test]
fn casablanca_axis_draws_red_and_heavy() {
    let style = segment_line(Some("CASABLANCA"));
    assert_eq!(style.color, "#dc3545");
    assert_eq!(style.weight, 4);
}

#[test]
fn map_scene_skips_unreadable_geometry() {
    let transport = MemoryTransport::new();
    transport.respond_json(
        Method::Get,
        "/gares",
        &json!({ "success": true, "data": [
            { "id": 1, "nom": "Casa Port", "geometrie": "POINT(-7.61 33.60)" },
            { "id": 2, "nom": "Binaire", "geometrie": "0101000020E6100000000000000000F03F" },
            { "id": 3, "nom": "Sans position" }
        ]}),
    );
    transport.respond_json(
        Method::Get,
        "/arcs",
        &json!({ "success": true, "data": [
            { "axe": "RABAT", "geometrie": "LINESTRING(-7.0 33.5, -6.8 34.0)" },
            { "axe": "RABAT", "geometrie": "LINESTRING(oops)" }
        ]}),
    );
    transport.respond_json(Method::Get, "/evenements", &incidents_json(3));
    let (api, notifier) = api_with(transport);

    let mut scene = MapScene::new(50);
    scene.load(block_on(api.load_map(348)), now());
    assert!(notifier.is_empty());

    let counts = scene.counts();
    assert_eq!((counts.stations, counts.segments, counts.incidents), (2, 1, 3));

    let binary = scene
        .features(LayerKind::Stations)
        .iter()
        .find(|f| f.popup.title == "Binaire")
        .expect("binary station drawn");
    assert!(matches!(binary.shape, Shape::Marker { at, .. } if at == FALLBACK_POSITION));
}

#[test]
fn superseded_fetch_is_dropped() {
    let mut store: CollectionStore<Incident, IncidentFilter> = CollectionStore::new(50);
    let slow = store.begin_fetch();
    let fast = store.begin_fetch();

    let fresh = vec![Incident {
        id: 2,
        ..Incident::default()
    }];
    assert!(store.complete(fast, fresh, now()));

    let stale = vec![Incident {
        id: 1,
        ..Incident::default()
    }];
    assert!(!store.complete(slow, stale, now()));
    assert_eq!(store.view().items()[0].id, 2);
}
