use crate::app::{ActionButtons, Dashboard, Modal, Pagination};
use crate::bridge;
use gis_core::render::render_incidents;
use gis_core::{Debouncer, Period};
use gis_records::IncidentInput;
use leptos::*;
use std::time::Duration;

const STATUSES: [&str; 3] = ["Ouvert", "En cours", "Résolu"];

const PERIODS: [(&str, &str); 4] = [
    ("today", "Aujourd'hui"),
    ("week", "7 derniers jours"),
    ("month", "Ce mois"),
    ("year", "Cette année"),
];

#[component]
pub fn IncidentsPanel() -> impl IntoView {
    let dashboard = expect_context::<Dashboard>();
    let incidents = dashboard.incidents;
    let types = dashboard.types;
    let window = dashboard.config.with_value(|config| config.search_debounce());
    let debouncer = store_value(Debouncer::<String>::new(window));
    let search = create_rw_signal(String::new());

    let on_search = move |value: String| {
        search.set(value.clone());
        debouncer.update_value(|d| d.push(value, bridge::clock()));
        set_timeout(
            move || {
                if let Some(value) = debouncer.try_update_value(|d| d.poll(bridge::clock())).flatten() {
                    incidents.update(|store| {
                        store.update(|view| view.update_filter(bridge::now(), |filter| filter.search = value));
                    });
                }
            },
            window + Duration::from_millis(20),
        );
    };

    let set_status = move |value: String| {
        let status = (!value.is_empty()).then_some(value);
        incidents.update(|store| {
            store.update(|view| view.update_filter(bridge::now(), |filter| filter.status = status));
        });
    };

    let set_period = move |value: String| {
        let period = value.parse::<Period>().ok();
        incidents.update(|store| {
            store.update(|view| view.update_filter(bridge::now(), |filter| filter.period = period));
        });
    };

    let toggle_type = move |id: i64, checked: bool| {
        incidents.update(|store| {
            store.update(|view| {
                view.update_filter(bridge::now(), |filter| {
                    if checked {
                        filter.types.insert(id);
                    } else {
                        filter.types.remove(&id);
                    }
                })
            });
        });
    };

    let go_to = Callback::new(move |page: usize| {
        incidents.update(|store| {
            store.update(|view| {
                view.go_to(page);
            });
        });
    });

    let create = move |_| {
        dashboard.modal.set(Some(Modal::IncidentForm {
            id: None,
            form: IncidentInput {
                statut: STATUSES[0].into(),
                ..IncidentInput::default()
            },
        }));
    };

    let pass = move || types.with(|types| incidents.with(|store| render_incidents(store.view(), types)));

    view! {
      <div class="d-flex flex-wrap gap-2 mb-2">
        <input
          class="form-control form-control-sm w-auto"
          placeholder="Rechercher un incident"
          prop:value=move || search.get()
          on:input=move |ev| on_search(event_target_value(&ev))
        />
        <select class="form-select form-select-sm w-auto" on:change=move |ev| set_status(event_target_value(&ev))>
          <option value="">"Tous les statuts"</option>
          {STATUSES.into_iter().map(|status| view! { <option value=status>{status}</option> }).collect_view()}
        </select>
        <select class="form-select form-select-sm w-auto" on:change=move |ev| set_period(event_target_value(&ev))>
          <option value="">"Toutes les dates"</option>
          {PERIODS.into_iter().map(|(value, label)| view! { <option value=value>{label}</option> }).collect_view()}
        </select>
        <button class="btn btn-sm btn-primary" on:click=create>"Nouvel incident"</button>
      </div>
      <div class="d-flex flex-wrap gap-3 mb-2 type-filters">
        {move || {
          types
            .get()
            .into_iter()
            .map(|kind| {
              let id = kind.id;
              let label = kind.label.unwrap_or_else(|| format!("Type {id}"));
              view! {
                <label class="form-check-label">
                  <input
                    type="checkbox"
                    class="form-check-input me-1"
                    prop:checked=move || incidents.with(|store| store.view().filter().types.contains(&id))
                    on:change=move |ev| toggle_type(id, event_target_checked(&ev))
                  />
                  {label}
                </label>
              }
            })
            .collect_view()
        }}
      </div>
      {move || {
        let pass = pass();
        let summary = pass.summary;
        view! {
          <p class="meta">{format!("Affichage de {} à {} sur {} incidents", summary.first, summary.last, summary.total)}</p>
          {match pass.empty {
            Some(empty) => view! {
              <div class="text-center py-4">
                <h6>{empty.title}</h6>
                <p class="meta">{empty.hint}</p>
              </div>
            }
            .into_view(),
            None => pass
              .rows
              .into_iter()
              .map(|card| view! {
                <div class=format!("card incident-card {} mb-2", card.card_class)>
                  <div class="card-body">
                    <div class="d-flex justify-content-between">
                      <h6 class="mb-1">{card.heading}</h6>
                      <span class=card.status.tone.badge_class()>{card.status.text}</span>
                    </div>
                    <div class="meta">{card.type_label}</div>
                    <p class="mb-1">{card.excerpt}</p>
                    <div class="meta">
                      {card.started}
                      {card.start_time.map(|time| format!(" à {time}"))}
                      " · "
                      {card.location}
                    </div>
                    <div class="mt-2 d-flex gap-1"><ActionButtons actions=card.actions/></div>
                  </div>
                </div>
              })
              .collect_view(),
          }}
          <Pagination controls=pass.controls on_page=go_to/>
        }
      }}
    }
}

#[component]
pub fn IncidentForm(id: Option<i64>, form: IncidentInput) -> impl IntoView {
    let dashboard = expect_context::<Dashboard>();
    let form = create_rw_signal(form);
    let title = match id {
        Some(id) => format!("Modifier l'incident #{id}"),
        None => "Nouvel incident".to_string(),
    };
    let id_choice = |value: String| value.parse::<i64>().ok();

    view! {
      <div class="modal-header"><h5 class="modal-title">{title}</h5></div>
      <div class="modal-body">
        <div class="mb-2">
          <label class="form-label">"Type d'incident"</label>
          <select
            class="form-select"
            prop:value=move || form.with(|f| f.type_id.map(|v| v.to_string()).unwrap_or_default())
            on:change=move |ev| form.update(|f| f.type_id = id_choice(event_target_value(&ev)))
          >
            <option value="">"Sélectionner un type"</option>
            {move || {
              dashboard
                .types
                .get()
                .into_iter()
                .map(|kind| {
                  let label = kind.label.unwrap_or_else(|| format!("Type {}", kind.id));
                  view! { <option value=kind.id.to_string()>{label}</option> }
                })
                .collect_view()
            }}
          </select>
        </div>
        <div class="mb-2">
          <label class="form-label">"Localisation"</label>
          <select
            class="form-select"
            prop:value=move || form.with(|f| f.localisation_id.map(|v| v.to_string()).unwrap_or_default())
            on:change=move |ev| form.update(|f| f.localisation_id = id_choice(event_target_value(&ev)))
          >
            <option value="">"Sélectionner une localisation"</option>
            {move || {
              dashboard
                .locations
                .get()
                .into_iter()
                .map(|location| view! { <option value=location.id.to_string()>{location.label()}</option> })
                .collect_view()
            }}
          </select>
        </div>
        <div class="row">
          <div class="col mb-2">
            <label class="form-label">"Date de début"</label>
            <input
              type="datetime-local"
              class="form-control"
              prop:value=move || form.with(|f| f.date_debut.clone())
              on:input=move |ev| form.update(|f| f.date_debut = event_target_value(&ev))
            />
          </div>
          <div class="col mb-2">
            <label class="form-label">"Date de fin"</label>
            <input
              type="datetime-local"
              class="form-control"
              prop:value=move || form.with(|f| f.date_fin.clone().unwrap_or_default())
              on:input=move |ev| {
                let value = event_target_value(&ev);
                form.update(|f| f.date_fin = (!value.is_empty()).then_some(value));
              }
            />
          </div>
        </div>
        <div class="mb-2">
          <label class="form-label">"Statut"</label>
          <select
            class="form-select"
            prop:value=move || form.with(|f| f.statut.clone())
            on:change=move |ev| form.update(|f| f.statut = event_target_value(&ev))
          >
            {STATUSES.into_iter().map(|status| view! { <option value=status>{status}</option> }).collect_view()}
          </select>
        </div>
        <div class="mb-2">
          <label class="form-label">"Description"</label>
          <textarea
            class="form-control"
            rows="4"
            prop:value=move || form.with(|f| f.description.clone())
            on:input=move |ev| form.update(|f| f.description = event_target_value(&ev))
          ></textarea>
        </div>
      </div>
      <div class="modal-footer">
        <button class="btn btn-secondary" on:click=move |_| dashboard.modal.set(None)>"Annuler"</button>
        <button class="btn btn-primary" on:click=move |_| dashboard.save_incident(id, form.get_untracked())>
          "Enregistrer"
        </button>
      </div>
    }
}
