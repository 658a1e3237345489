use crate::app::{ActionButtons, Dashboard, Modal, Pagination};
use crate::bridge;
use gis_core::render::render_stations;
use gis_core::{station_export_name, stations_csv, Debouncer};
use gis_records::payload::STATION_STATUSES;
use gis_records::StationInput;
use leptos::*;
use std::time::Duration;

const PAGE_SIZES: [usize; 4] = [10, 25, 50, 100];

fn choice(value: String) -> Option<String> {
    (!value.is_empty()).then_some(value)
}

#[component]
pub fn StationsPanel() -> impl IntoView {
    let dashboard = expect_context::<Dashboard>();
    let stations = dashboard.stations;
    let window = dashboard.config.with_value(|config| config.search_debounce());
    let debouncer = store_value(Debouncer::<String>::new(window));
    let search = create_rw_signal(String::new());

    let apply_search = move |value: String| {
        stations.update(|store| {
            store.update(|view| view.update_filter(bridge::now(), |filter| filter.search = value));
        });
    };

    let on_search = move |value: String| {
        search.set(value.clone());
        debouncer.update_value(|d| d.push(value, bridge::clock()));
        set_timeout(
            move || {
                if let Some(value) = debouncer.try_update_value(|d| d.poll(bridge::clock())).flatten() {
                    apply_search(value);
                }
            },
            window + Duration::from_millis(20),
        );
    };

    let set_axis = move |value: String| {
        stations.update(|store| {
            store.update(|view| view.update_filter(bridge::now(), |filter| filter.axis = choice(value)));
        });
    };
    let set_kind = move |value: String| {
        stations.update(|store| {
            store.update(|view| view.update_filter(bridge::now(), |filter| filter.kind = choice(value)));
        });
    };
    let set_status = move |value: String| {
        stations.update(|store| {
            store.update(|view| view.update_filter(bridge::now(), |filter| filter.status = choice(value)));
        });
    };
    let set_page_size = move |value: String| {
        if let Ok(size) = value.parse::<usize>() {
            stations.update(|store| store.update(|view| view.set_page_size(size)));
        }
    };
    let go_to = Callback::new(move |page: usize| {
        stations.update(|store| {
            store.update(|view| {
                view.go_to(page);
            });
        });
    });

    let export = move |_| {
        let csv = stations.with_untracked(|store| stations_csv(store.view().filtered()));
        match csv {
            Ok(content) => {
                let name = station_export_name(bridge::now().date());
                if let Err(err) = bridge::download(&name, "text/csv", &content) {
                    logging::error!("export failed: {err}");
                }
            }
            Err(err) => logging::error!("export failed: {err}"),
        }
    };

    let create = move |_| {
        dashboard.modal.set(Some(Modal::StationForm {
            id: None,
            form: StationInput {
                etat: "ACTIVE".into(),
                ..StationInput::default()
            },
        }));
    };

    let pass = move || stations.with(|store| render_stations(store.view()));
    let options = dashboard.filter_options;

    view! {
      <div class="d-flex flex-wrap gap-2 mb-2">
        <input
          class="form-control form-control-sm w-auto"
          placeholder="Rechercher (nom, code, ville)"
          prop:value=move || search.get()
          on:input=move |ev| on_search(event_target_value(&ev))
        />
        <select class="form-select form-select-sm w-auto" on:change=move |ev| set_axis(event_target_value(&ev))>
          <option value="">"Tous les axes"</option>
          {move || options.with(|o| o.axes.clone()).into_iter().map(|v| view! { <option value=v.clone()>{v}</option> }).collect_view()}
        </select>
        <select class="form-select form-select-sm w-auto" on:change=move |ev| set_kind(event_target_value(&ev))>
          <option value="">"Tous les types"</option>
          {move || options.with(|o| o.types.clone()).into_iter().map(|v| view! { <option value=v.clone()>{v}</option> }).collect_view()}
        </select>
        <select class="form-select form-select-sm w-auto" on:change=move |ev| set_status(event_target_value(&ev))>
          <option value="">"Tous les états"</option>
          {move || options.with(|o| o.statuses.clone()).into_iter().map(|v| view! { <option value=v.clone()>{v}</option> }).collect_view()}
        </select>
        <select class="form-select form-select-sm w-auto" on:change=move |ev| set_page_size(event_target_value(&ev))>
          {PAGE_SIZES
            .into_iter()
            .map(|size| {
              let current = stations.with_untracked(|store| store.view().pager().page_size()) == size;
              view! { <option value=size.to_string() selected=current>{format!("{size} par page")}</option> }
            })
            .collect_view()}
        </select>
        <button class="btn btn-sm btn-primary" on:click=create>"Nouvelle gare"</button>
        <button class="btn btn-sm btn-outline-success" on:click=export>"Exporter CSV"</button>
      </div>
      {move || {
        let pass = pass();
        let summary = pass.summary;
        view! {
          <p class="meta">{format!("Affichage de {} à {} sur {} gares", summary.first, summary.last, summary.total)}</p>
          {match pass.empty {
            Some(empty) => view! {
              <div class="text-center py-4">
                <h6>{empty.title}</h6>
                <p class="meta">{empty.hint}</p>
              </div>
            }
            .into_view(),
            None => view! {
              <table class="table table-sm table-hover">
                <thead>
                  <tr>
                    <th>"Nom"</th><th>"Code"</th><th>"Type"</th><th>"Axe"</th><th>"Ville"</th><th>"État"</th><th></th>
                  </tr>
                </thead>
                <tbody>
                  {pass
                    .rows
                    .into_iter()
                    .map(|row| view! {
                      <tr>
                        <td>{row.name}</td>
                        <td>{row.code}</td>
                        <td>{row.kind}</td>
                        <td>{row.axis}</td>
                        <td>{row.city}</td>
                        <td><span class=row.status.tone.badge_class()>{row.status.text}</span></td>
                        <td class="text-nowrap"><ActionButtons actions=row.actions/></td>
                      </tr>
                    })
                    .collect_view()}
                </tbody>
              </table>
            }
            .into_view(),
          }}
          <Pagination controls=pass.controls on_page=go_to/>
        }
      }}
    }
}

fn text_field(
    form: RwSignal<StationInput>,
    label: &'static str,
    read: fn(&StationInput) -> &String,
    write: fn(&mut StationInput, String),
) -> impl IntoView {
    view! {
      <div class="mb-2">
        <label class="form-label">{label}</label>
        <input
          class="form-control"
          prop:value=move || form.with(|f| read(f).clone())
          on:input=move |ev| form.update(|f| write(f, event_target_value(&ev)))
        />
      </div>
    }
}

#[component]
pub fn StationForm(id: Option<i64>, form: StationInput) -> impl IntoView {
    let dashboard = expect_context::<Dashboard>();
    let form = create_rw_signal(form);
    let title = if id.is_some() { "Modifier la gare" } else { "Nouvelle gare" };

    view! {
      <div class="modal-header"><h5 class="modal-title">{title}</h5></div>
      <div class="modal-body">
        {text_field(form, "Nom", |f| &f.nom, |f, v| f.nom = v)}
        {text_field(form, "Code", |f| &f.code, |f, v| f.code = v)}
        {text_field(form, "Type", |f| &f.kind, |f, v| f.kind = v)}
        {text_field(form, "Axe", |f| &f.axe, |f, v| f.axe = v)}
        {text_field(form, "Ville", |f| &f.ville, |f, v| f.ville = v)}
        {text_field(form, "Code opérationnel", |f| &f.codeoperationnel, |f, v| f.codeoperationnel = v)}
        {text_field(form, "Code réseau", |f| &f.codereseau, |f, v| f.codereseau = v)}
        <div class="mb-2">
          <label class="form-label">"État"</label>
          <select
            class="form-select"
            prop:value=move || form.with(|f| f.etat.clone())
            on:change=move |ev| form.update(|f| f.etat = event_target_value(&ev))
          >
            {STATION_STATUSES
              .into_iter()
              .map(|status| view! { <option value=status>{status}</option> })
              .collect_view()}
          </select>
        </div>
      </div>
      <div class="modal-footer">
        <button class="btn btn-secondary" on:click=move |_| dashboard.modal.set(None)>"Annuler"</button>
        <button class="btn btn-primary" on:click=move |_| dashboard.save_station(id, form.get_untracked())>
          "Enregistrer"
        </button>
      </div>
    }
}
