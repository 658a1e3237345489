use crate::bridge::{self, Api, SignalNotifier, Toast};
use crate::incidents::{IncidentForm, IncidentsPanel};
use crate::map_view::MapPanel;
use crate::stations::{StationForm, StationsPanel};
use gis_core::render::{Command, DetailView, Dispatcher};
use gis_core::stats::LiveCounts;
use gis_core::{
    ActionId, ActionKind, CollectionStore, DashboardConfig, GisApi, HttpTransport,
    IncidentFilter, StationFilter, StatsSummary, Viewport,
};
use gis_records::{
    FilterOptions, Incident, IncidentInput, IncidentType, Location, Segment, Station,
    StationInput, Statistics,
};
use leptos::*;
use std::rc::Rc;
use wasm_bindgen_futures::spawn_local;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tab {
    Map,
    Stations,
    Incidents,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Modal {
    Detail(DetailView),
    StationForm { id: Option<i64>, form: StationInput },
    ConfirmDelete { id: i64, name: String },
    IncidentForm { id: Option<i64>, form: IncidentInput },
}

/// Collections and UI state shared by every panel.
#[derive(Clone, Copy)]
pub struct Dashboard {
    pub api: StoredValue<Rc<Api>>,
    pub config: StoredValue<DashboardConfig>,
    pub stations: RwSignal<CollectionStore<Station, StationFilter>>,
    pub incidents: RwSignal<CollectionStore<Incident, IncidentFilter>>,
    pub segments: RwSignal<Vec<Segment>>,
    pub types: RwSignal<Vec<IncidentType>>,
    pub locations: RwSignal<Vec<Location>>,
    pub statistics: RwSignal<Option<Statistics>>,
    pub filter_options: RwSignal<FilterOptions>,
    pub tab: RwSignal<Tab>,
    pub modal: RwSignal<Option<Modal>>,
    /// Pending "centre the map here" request.
    pub focus: RwSignal<Option<Viewport>>,
}

impl Dashboard {
    fn new(toasts: RwSignal<Vec<Toast>>) -> Self {
        let config = DashboardConfig::default();
        let base = bridge::api_base(&config.api_base);
        let api = GisApi::new(HttpTransport::new(base), SignalNotifier::new(toasts));
        Self {
            api: store_value(Rc::new(api)),
            stations: create_rw_signal(CollectionStore::new(config.station_page_size)),
            incidents: create_rw_signal(CollectionStore::new(config.incident_page_size)),
            config: store_value(config),
            segments: create_rw_signal(Vec::new()),
            types: create_rw_signal(Vec::new()),
            locations: create_rw_signal(Vec::new()),
            statistics: create_rw_signal(None),
            filter_options: create_rw_signal(FilterOptions::default()),
            tab: create_rw_signal(Tab::Map),
            modal: create_rw_signal(None),
            focus: create_rw_signal(None),
        }
    }

    pub fn reload_stations(self) {
        let Some(ticket) = self.stations.try_update(|store| store.begin_fetch()) else {
            return;
        };
        let api = self.api.get_value();
        spawn_local(async move {
            let items = api.all_stations().await;
            self.stations.update(|store| {
                store.complete(ticket, items, bridge::now());
            });
        });
    }

    pub fn reload_incidents(self) {
        let Some(ticket) = self.incidents.try_update(|store| store.begin_fetch()) else {
            return;
        };
        let api = self.api.get_value();
        let limit = self.config.with_value(|config| config.incident_fetch_limit);
        spawn_local(async move {
            let items = api.incidents(limit, &[]).await;
            self.incidents.update(|store| {
                store.complete(ticket, items, bridge::now());
            });
        });
    }

    /// Lookups that change rarely: loaded once at start-up and after writes.
    pub fn reload_reference(self) {
        let api = self.api.get_value();
        spawn_local(async move {
            let (segments, types, locations, statistics, filters) = futures::join!(
                api.segments(),
                api.incident_types(),
                api.locations(),
                api.statistics(),
                api.station_filters(),
            );
            self.segments.set(segments);
            self.types.set(types);
            self.locations.set(locations);
            self.statistics.set(statistics);
            self.filter_options.set(filters);
        });
    }

    pub fn run(self, action: ActionId) {
        let command = self.stations.with_untracked(|stations| {
            self.incidents.with_untracked(|incidents| {
                self.types.with_untracked(|types| {
                    self.locations.with_untracked(|locations| {
                        Dispatcher {
                            stations: stations.view().items(),
                            incidents: incidents.view().items(),
                            types,
                            locations,
                        }
                        .dispatch(action)
                    })
                })
            })
        });

        match command {
            Some(Command::ShowStation(detail)) | Some(Command::ShowIncident(detail)) => {
                self.modal.set(Some(Modal::Detail(detail)));
            }
            Some(Command::EditStation { id, form }) => {
                self.modal.set(Some(Modal::StationForm { id: Some(id), form }));
            }
            Some(Command::ConfirmDeleteStation { id, name }) => {
                self.modal.set(Some(Modal::ConfirmDelete { id, name }));
            }
            Some(Command::EditIncident { id, form }) => {
                self.modal.set(Some(Modal::IncidentForm { id: Some(id), form }));
            }
            Some(Command::Locate(view)) => {
                self.modal.set(None);
                self.tab.set(Tab::Map);
                self.focus.set(Some(view));
            }
            None => logging::warn!("no command for {action:?}"),
        }
    }

    pub fn save_station(self, id: Option<i64>, form: StationInput) {
        let api = self.api.get_value();
        spawn_local(async move {
            let result = match id {
                Some(id) => api.update_station(id, &form).await,
                None => api.create_station(&form).await,
            };
            if result.is_ok() {
                self.modal.set(None);
                self.reload_stations();
                self.reload_reference();
            }
        });
    }

    pub fn delete_station(self, id: i64) {
        let api = self.api.get_value();
        spawn_local(async move {
            if api.delete_station(id).await.is_ok() {
                self.modal.set(None);
                self.reload_stations();
                self.reload_reference();
            }
        });
    }

    pub fn save_incident(self, id: Option<i64>, form: IncidentInput) {
        let api = self.api.get_value();
        spawn_local(async move {
            let result = match id {
                Some(id) => api.update_incident(id, &form).await,
                None => api.create_incident(&form).await,
            };
            if result.is_ok() {
                self.modal.set(None);
                self.reload_incidents();
                self.reload_reference();
            }
        });
    }
}

pub fn action_label(kind: ActionKind) -> &'static str {
    match kind {
        ActionKind::View => "Voir",
        ActionKind::Edit => "Modifier",
        ActionKind::Delete => "Supprimer",
        ActionKind::Locate => "Localiser",
    }
}

fn action_class(kind: ActionKind) -> &'static str {
    match kind {
        ActionKind::View => "btn btn-sm btn-outline-primary",
        ActionKind::Edit => "btn btn-sm btn-outline-secondary",
        ActionKind::Delete => "btn btn-sm btn-outline-danger",
        ActionKind::Locate => "btn btn-sm btn-outline-info",
    }
}

#[component]
pub fn ActionButtons(actions: Vec<ActionId>) -> impl IntoView {
    let dashboard = expect_context::<Dashboard>();
    actions
        .into_iter()
        .map(|action| {
            view! {
              <button
                class=action_class(action.kind)
                on:click=move |_| dashboard.run(action)
              >
                {action_label(action.kind)}
              </button>
            }
        })
        .collect_view()
}

#[component]
pub fn Pagination(
    controls: gis_core::render::PaginationControls,
    on_page: Callback<usize>,
) -> impl IntoView {
    use gis_core::listing::PageItem;

    if !controls.visible {
        return ().into_view();
    }
    let previous = controls.previous;
    let next = controls.next;
    view! {
      <nav>
        <ul class="pagination pagination-sm">
          <li class="page-item" class:disabled=previous.is_none()>
            <button class="page-link" on:click=move |_| {
              if let Some(page) = previous {
                on_page.call(page);
              }
            }>"Précédent"</button>
          </li>
          {controls
            .items
            .into_iter()
            .map(|item| match item {
              PageItem::Page { number, current } => view! {
                <li class="page-item" class:active=current>
                  <button class="page-link" on:click=move |_| on_page.call(number)>{number}</button>
                </li>
              }
              .into_view(),
              PageItem::Gap => view! {
                <li class="page-item disabled"><span class="page-link">"…"</span></li>
              }
              .into_view(),
            })
            .collect_view()}
          <li class="page-item" class:disabled=next.is_none()>
            <button class="page-link" on:click=move |_| {
              if let Some(page) = next {
                on_page.call(page);
              }
            }>"Suivant"</button>
          </li>
        </ul>
      </nav>
    }
    .into_view()
}

#[component]
fn DetailModal(detail: DetailView) -> impl IntoView {
    let dashboard = expect_context::<Dashboard>();
    view! {
      <div class="modal-header">
        <h5 class="modal-title">{detail.title}</h5>
        {detail
          .badges
          .into_iter()
          .map(|badge| view! { <span class=format!("{} ms-2", badge.tone.badge_class())>{badge.text}</span> })
          .collect_view()}
      </div>
      <div class="modal-body">
        {detail
          .sections
          .into_iter()
          .map(|section| view! {
            <h6 class="mt-2">{section.title}</h6>
            <dl class="row">
              {section
                .fields
                .into_iter()
                .map(|field| view! {
                  <dt class="col-sm-4">{field.label}</dt>
                  <dd class="col-sm-8">{field.value}</dd>
                })
                .collect_view()}
            </dl>
          })
          .collect_view()}
      </div>
      <div class="modal-footer">
        <ActionButtons actions=detail.actions/>
        <button class="btn btn-secondary" on:click=move |_| dashboard.modal.set(None)>"Fermer"</button>
      </div>
    }
}

#[component]
fn ConfirmDelete(id: i64, name: String) -> impl IntoView {
    let dashboard = expect_context::<Dashboard>();
    view! {
      <div class="modal-header"><h5 class="modal-title">"Confirmer la suppression"</h5></div>
      <div class="modal-body">
        {format!("Êtes-vous sûr de vouloir supprimer la gare \"{name}\" ?")}
      </div>
      <div class="modal-footer">
        <button class="btn btn-secondary" on:click=move |_| dashboard.modal.set(None)>"Annuler"</button>
        <button class="btn btn-danger" on:click=move |_| dashboard.delete_station(id)>"Supprimer"</button>
      </div>
    }
}

#[component]
fn ModalHost() -> impl IntoView {
    let dashboard = expect_context::<Dashboard>();
    move || {
        dashboard.modal.get().map(|modal| {
            let body = match modal {
                Modal::Detail(detail) => view! { <DetailModal detail=detail/> }.into_view(),
                Modal::ConfirmDelete { id, name } => view! { <ConfirmDelete id=id name=name/> }.into_view(),
                Modal::StationForm { id, form } => view! { <StationForm id=id form=form/> }.into_view(),
                Modal::IncidentForm { id, form } => view! { <IncidentForm id=id form=form/> }.into_view(),
            };
            view! {
              <div class="modal d-block" tabindex="-1">
                <div class="modal-dialog modal-lg">
                  <div class="modal-content">{body}</div>
                </div>
              </div>
              <div class="modal-backdrop show" on:click=move |_| dashboard.modal.set(None)></div>
            }
        })
    }
}

#[component]
fn Toasts(toasts: RwSignal<Vec<Toast>>) -> impl IntoView {
    view! {
      <div class="toast-container position-fixed top-0 end-0 p-3">
        <For
          each=move || toasts.get()
          key=|toast| toast.id
          children=move |toast| {
            let id = toast.id;
            view! {
              <div class=format!(
                "toast show align-items-center text-bg-{} border-0",
                toast.notification.level.css_class()
              )>
                <div class="d-flex">
                  <div class="toast-body">{toast.notification.message}</div>
                  <button
                    class="btn-close btn-close-white me-2 m-auto"
                    on:click=move |_| toasts.update(|list| list.retain(|t| t.id != id))
                  ></button>
                </div>
              </div>
            }
          }
        />
      </div>
    }
}

#[component]
fn StatsBar() -> impl IntoView {
    let dashboard = expect_context::<Dashboard>();
    let summary = move || dashboard.statistics.with(|stats| stats.as_ref().map(StatsSummary::from));
    let live = move || {
        dashboard.stations.with(|stations| {
            dashboard.incidents.with(|incidents| {
                LiveCounts::from_collections(stations.view().items(), incidents.view().items())
            })
        })
    };
    view! {
      <div class="row g-2 mb-3 stats-bar">
        <div class="col"><div class="card card-body">
          <div class="meta">"Gares"</div>
          <b>{move || summary().map_or(0, |s| s.stations)}</b>
          <small>{move || format!("{} actives / {} passives", live().active_stations, live().passive_stations)}</small>
        </div></div>
        <div class="col"><div class="card card-body">
          <div class="meta">"Arcs"</div>
          <b>{move || summary().map_or(0, |s| s.segments)}</b>
        </div></div>
        <div class="col"><div class="card card-body">
          <div class="meta">"Incidents"</div>
          <b>{move || summary().map_or(0, |s| s.incidents)}</b>
          <small>{move || {
            summary()
              .map(|s| format!(
                "{} ouverts / {} en cours / {} résolus",
                s.open_incidents, s.in_progress_incidents, s.resolved_incidents
              ))
              .unwrap_or_default()
          }}</small>
        </div></div>
        <div class="col"><div class="card card-body">
          <div class="meta">"En cours (chargés)"</div>
          <b>{move || live().ongoing_incidents}</b>
        </div></div>
        <div class="col"><div class="card card-body">
          <div class="meta">"Types d'incidents"</div>
          <b>{move || summary().map_or(0, |s| s.incident_types)}</b>
          <small>{move || summary().map(|s| format!("{} actifs", s.active_incident_types)).unwrap_or_default()}</small>
        </div></div>
      </div>
    }
}

#[component]
pub fn App() -> impl IntoView {
    let toasts = create_rw_signal(Vec::<Toast>::new());
    let dashboard = Dashboard::new(toasts);
    provide_context(dashboard);

    dashboard.reload_reference();
    dashboard.reload_stations();
    dashboard.reload_incidents();

    let (incident_every, station_every) = dashboard
        .config
        .with_value(|config| (config.incident_refresh(), config.station_refresh()));
    match set_interval_with_handle(move || dashboard.reload_incidents(), incident_every) {
        Ok(handle) => on_cleanup(move || handle.clear()),
        Err(err) => logging::error!("incident refresh timer failed: {err:?}"),
    }
    match set_interval_with_handle(move || dashboard.reload_stations(), station_every) {
        Ok(handle) => on_cleanup(move || handle.clear()),
        Err(err) => logging::error!("station refresh timer failed: {err:?}"),
    }

    let tab_button = move |tab: Tab, label: &'static str| {
        view! {
          <li class="nav-item">
            <button
              class="nav-link"
              class:active=move || dashboard.tab.get() == tab
              on:click=move |_| dashboard.tab.set(tab)
            >{label}</button>
          </li>
        }
    };
    let shown = move |tab: Tab| move || if dashboard.tab.get() == tab { "" } else { "display: none" };

    view! {
      <div class="container-fluid py-3">
        <h1 class="h4">"Réseau ferroviaire ONCF"</h1>
        <StatsBar/>
        <ul class="nav nav-tabs mb-3">
          {tab_button(Tab::Map, "Carte")}
          {tab_button(Tab::Stations, "Gares")}
          {tab_button(Tab::Incidents, "Incidents")}
        </ul>
        <section style=shown(Tab::Map)><MapPanel/></section>
        <section style=shown(Tab::Stations)><StationsPanel/></section>
        <section style=shown(Tab::Incidents)><IncidentsPanel/></section>
        <ModalHost/>
        <Toasts toasts=toasts/>
      </div>
    }
}
