use crate::CliError;
use chrono::NaiveDateTime;
use gis_core::listing::{IncidentFilter, StationFilter};
use gis_core::map::LayerCounts;
use gis_core::render::{render_incidents, render_stations, IncidentCard, RenderPass, StationRow};
use gis_core::stats::LiveCounts;
use gis_core::{
    station_export_name, stations_csv, DashboardConfig, GisApi, ListView, MapScene, Notifier,
    StatsSummary, Transport,
};
use gis_records::{Incident, IncidentType, Pagination, Station, Statistics};
use std::path::{Path, PathBuf};

/// One pass of the whole dashboard, rendered for a terminal.
#[derive(Debug)]
pub struct DashboardReport {
    pub stations: RenderPass<StationRow>,
    pub incidents: RenderPass<IncidentCard>,
    pub map: LayerCounts,
    pub stats: Option<StatsSummary>,
    pub live: LiveCounts,
    pub server: ServerListing,
    pub exported: Option<PathBuf>,
}

/// The station page as the server filters and pages it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ServerListing {
    pub rows: usize,
    pub pagination: Option<Pagination>,
}

pub async fn build_report<T: Transport, N: Notifier>(
    api: &GisApi<T, N>,
    options: &crate::CliOptions,
    config: &DashboardConfig,
    now: NaiveDateTime,
) -> Result<DashboardReport, CliError> {
    let data = api.load_map(config.incident_fetch_limit).await;
    let (statistics, types) = lookups(api).await;

    let filter = StationFilter {
        search: options.search.clone().unwrap_or_default(),
        axis: options.axis.clone(),
        ..StationFilter::default()
    };
    let page = api
        .station_page(options.page, config.station_page_size, &filter)
        .await;
    let server = ServerListing {
        rows: page.stations.len(),
        pagination: page.pagination,
    };

    let mut stations: ListView<Station, StationFilter> = ListView::new(config.station_page_size);
    stations.replace_items(data.stations.clone(), now);
    stations.set_filter(filter, now);
    if !stations.go_to(options.page) && options.page != 1 {
        tracing::warn!(
            page = options.page,
            pages = stations.pager().page_count(),
            "requested station page does not exist, showing page 1"
        );
    }

    let mut incidents: ListView<Incident, IncidentFilter> = ListView::new(config.incident_page_size);
    incidents.replace_items(data.incidents.clone(), now);

    let live = LiveCounts::from_collections(&data.stations, &data.incidents);

    let mut scene = MapScene::new(config.map_incident_page_size);
    scene.load(data, now);

    let exported = match &options.export {
        Some(target) => {
            let path = export_path(target, now);
            std::fs::write(&path, stations_csv(stations.filtered())?)?;
            tracing::info!(path = %path.display(), rows = stations.filtered_len(), "stations exported");
            Some(path)
        }
        None => None,
    };

    Ok(DashboardReport {
        stations: render_stations(&stations),
        incidents: render_incidents(&incidents, &types),
        map: scene.counts(),
        stats: statistics.as_ref().map(StatsSummary::from),
        live,
        server,
        exported,
    })
}

async fn lookups<T: Transport, N: Notifier>(
    api: &GisApi<T, N>,
) -> (Option<Statistics>, Vec<IncidentType>) {
    let statistics = api.statistics().await;
    let types = api.incident_types().await;
    (statistics, types)
}

/// A directory target gets the dated default file name.
fn export_path(target: &Path, now: NaiveDateTime) -> PathBuf {
    if target.is_dir() {
        target.join(station_export_name(now.date()))
    } else {
        target.to_path_buf()
    }
}

impl DashboardReport {
    pub fn print(&self) {
        if let Some(stats) = &self.stats {
            println!(
                "réseau: {} gares, {} arcs, {} incidents ({} ouverts, {} en cours, {} résolus)",
                stats.stations,
                stats.segments,
                stats.incidents,
                stats.open_incidents,
                stats.in_progress_incidents,
                stats.resolved_incidents
            );
        }
        println!(
            "chargé: {} gares actives, {} passives, {} incidents sans date de fin",
            self.live.active_stations, self.live.passive_stations, self.live.ongoing_incidents
        );
        println!(
            "carte: {} gares, {} arcs, {} incidents affichés",
            self.map.stations, self.map.segments, self.map.incidents
        );

        let summary = self.stations.summary;
        println!(
            "\ngares {}-{} sur {}",
            summary.first, summary.last, summary.total
        );
        match self.server.pagination {
            Some(p) => println!(
                "  serveur: page {}/{}, {} gares sur {}",
                p.page, p.pages, self.server.rows, p.total
            ),
            None => println!("  serveur: {} gares renvoyées", self.server.rows),
        }
        match &self.stations.empty {
            Some(empty) => println!("  {}", empty.title),
            None => {
                for row in &self.stations.rows {
                    println!(
                        "  #{:<5} {:<32} {:<8} {:<12} {:<14} {}",
                        row.id, row.name, row.code, row.axis, row.city, row.status.text
                    );
                }
            }
        }

        let summary = self.incidents.summary;
        println!(
            "\nincidents {}-{} sur {}",
            summary.first, summary.last, summary.total
        );
        match &self.incidents.empty {
            Some(empty) => println!("  {}", empty.title),
            None => {
                for card in &self.incidents.rows {
                    println!(
                        "  {:<14} {:<10} {:<24} {} | {}",
                        card.heading, card.status.text, card.type_label, card.started, card.excerpt
                    );
                }
            }
        }

        if let Some(path) = &self.exported {
            println!("\nexport: {}", path.display());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{demo, CliOptions};
    use futures::executor::block_on;
    use gis_core::{CollectingNotifier, Method};
    use serde_json::json;

    fn report(options: &CliOptions) -> (DashboardReport, CollectingNotifier) {
        let notifier = CollectingNotifier::new();
        let api = GisApi::new(demo::seeded_transport(), notifier.clone());
        let report = block_on(build_report(
            &api,
            options,
            &DashboardConfig::default(),
            demo::reference_time(),
        ))
        .expect("demo report");
        (report, notifier)
    }

    #[test]
    fn demo_report_renders_every_section() {
        let (report, notifier) = report(&CliOptions::default());
        assert!(notifier.is_empty());
        assert!(report.stats.is_some());
        assert!(!report.stations.rows.is_empty());
        assert_eq!(report.incidents.rows.len(), 50);
        assert_eq!(report.map.incidents, 50);
        assert!(report.map.segments > 0);
    }

    #[test]
    fn search_narrows_station_rows() {
        let options = CliOptions {
            search: Some("casa".into()),
            ..CliOptions::default()
        };
        let (report, _) = report(&options);
        assert!(!report.stations.rows.is_empty());
        assert!(report
            .stations
            .rows
            .iter()
            .all(|row| row.name.to_lowercase().contains("casa")
                || row.city.to_lowercase().contains("casa")
                || row.code.to_lowercase().contains("casa")));
    }

    #[test]
    fn out_of_range_page_stays_on_first() {
        let options = CliOptions {
            page: 40,
            ..CliOptions::default()
        };
        let (report, _) = report(&options);
        assert_eq!(report.stations.summary.first, 1);
    }

    #[test]
    fn station_filters_reach_the_server_page() {
        let transport = demo::seeded_transport();
        transport.respond_json(
            Method::Get,
            "/gares",
            &json!({
                "success": true,
                "data": [{"id": 1, "nom": "Casa Voyageurs", "ville": "Casablanca"}],
                "pagination": {"page": 2, "pages": 3, "total": 51, "per_page": 25}
            }),
        );
        let api = GisApi::new(transport.clone(), CollectingNotifier::new());
        let options = CliOptions {
            page: 2,
            search: Some(" casa ".into()),
            axis: Some("CASABLANCA".into()),
            ..CliOptions::default()
        };

        let report = block_on(build_report(
            &api,
            &options,
            &DashboardConfig::default(),
            demo::reference_time(),
        ))
        .expect("report");

        assert_eq!(report.server.rows, 1);
        assert_eq!(report.server.pagination.map(|p| (p.page, p.total)), Some((2, 51)));
        let paged = transport
            .requests()
            .into_iter()
            .find(|request| request.path == "/gares" && request.query.iter().any(|(k, _)| k == "page"))
            .expect("paged station request");
        assert!(paged.query.contains(&("page".to_string(), "2".to_string())));
        assert!(paged.query.contains(&("search".to_string(), "casa".to_string())));
        assert!(paged.query.contains(&("axe".to_string(), "CASABLANCA".to_string())));
    }
}
