use crate::app::{Dashboard, Tab};
use crate::bridge;
use crate::leaflet::MapView;
use gis_core::map::{LayerCounts, LayerSelection, Summary};
use gis_core::render::EntityRef;
use gis_core::stats::{axis_options, station_kind_options};
use gis_core::styles::axis_legend;
use gis_core::{FeatureId, LayerKind, MapFilters, MapScene, Viewport};
use leptos::*;
use std::rc::Rc;

fn choice(value: String) -> Option<String> {
    (!value.is_empty()).then_some(value)
}

#[component]
pub fn MapPanel() -> impl IntoView {
    let dashboard = expect_context::<Dashboard>();
    let page_size = dashboard
        .config
        .with_value(|config| config.map_incident_page_size);

    let scene = store_value(MapScene::new(page_size));
    let map = store_value(None::<MapView>);
    let layers_rev = create_rw_signal(0u64);
    let info = create_rw_signal(None::<Summary>);
    let pager = create_rw_signal(scene.with_value(|s| s.incident_pager()));
    let counts = create_rw_signal(LayerCounts::default());
    let layer_choice = create_rw_signal("all".to_string());
    let axis_choice = create_rw_signal(String::new());
    let kind_choice = create_rw_signal(String::new());

    let features_changed = move || {
        scene.with_value(|s| {
            counts.set(s.counts());
            pager.set(s.incident_pager());
        });
        layers_rev.update(|rev| *rev += 1);
    };

    create_effect(move |_| {
        let stations = dashboard.stations.with(|store| store.view().items().to_vec());
        scene.update_value(|s| s.set_stations(stations));
        features_changed();
    });
    create_effect(move |_| {
        let segments = dashboard.segments.get();
        scene.update_value(|s| s.set_segments(segments));
        features_changed();
    });
    create_effect(move |_| {
        let incidents = dashboard.incidents.with(|store| store.view().items().to_vec());
        scene.update_value(|s| s.set_incidents(incidents, bridge::now()));
        features_changed();
    });

    let on_click: Rc<dyn Fn(FeatureId)> = Rc::new(move |id| {
        scene.update_value(|s| {
            s.click(id);
        });
        info.set(scene.with_value(|s| s.info().cloned()));
    });
    create_effect(move |_| {
        layers_rev.track();
        map.update_value(|view| {
            let Some(view) = view else {
                return;
            };
            scene.with_value(|s| {
                for kind in LayerKind::ALL {
                    view.draw(kind, s.features(kind), Rc::clone(&on_click));
                    view.show(kind, s.is_visible(kind));
                }
            });
        });
    });

    let container = create_node_ref::<html::Div>();
    container.on_load(move |element| {
        request_animation_frame(move || {
            let view = MapView::mount(&element, scene.with_value(|s| s.view()), move || {
                scene.update_value(|s| s.click_background());
                info.set(None);
            });
            map.set_value(Some(view));
            layers_rev.update(|rev| *rev += 1);
        });
    });

    create_effect(move |_| {
        if dashboard.tab.get() == Tab::Map {
            request_animation_frame(move || {
                map.with_value(|view| {
                    if let Some(view) = view {
                        view.refresh_size();
                    }
                });
            });
        }
    });

    let move_to = move |view: Viewport| {
        scene.update_value(|s| s.set_view(view));
        map.with_value(|map| {
            if let Some(map) = map {
                map.set_view(view);
            }
        });
    };

    create_effect(move |_| {
        if let Some(view) = dashboard.focus.get() {
            move_to(view);
            dashboard.focus.set(None);
        }
    });

    let select_layers = move |raw: String| {
        match raw.parse::<LayerSelection>() {
            Ok(selection) => {
                scene.update_value(|s| s.select(selection));
                map.with_value(|map| {
                    if let Some(map) = map {
                        scene.with_value(|s| {
                            for kind in LayerKind::ALL {
                                map.show(kind, s.is_visible(kind));
                            }
                        });
                    }
                });
            }
            Err(err) => logging::warn!("{err}"),
        }
        layer_choice.set(raw);
    };

    let apply_filters = move || {
        let filters = MapFilters {
            axis: choice(axis_choice.get_untracked()),
            station_kind: choice(kind_choice.get_untracked()),
        };
        scene.update_value(|s| s.set_filters(filters));
        features_changed();
    };

    let reset = move |_| {
        scene.update_value(|s| s.reset());
        layer_choice.set("all".into());
        axis_choice.set(String::new());
        kind_choice.set(String::new());
        info.set(None);
        map.with_value(|map| {
            if let Some(map) = map {
                map.set_view(Viewport::DEFAULT);
            }
        });
        features_changed();
    };

    let page_incidents = move |forward: bool| {
        let moved = scene
            .try_update_value(|s| {
                if forward {
                    s.next_incidents()
                } else {
                    s.previous_incidents()
                }
            })
            .unwrap_or(false);
        if moved {
            features_changed();
        }
    };

    let focus_station = move |_| {
        if let Some(view) = scene.try_update_value(|s| s.focus_selected()).flatten() {
            move_to(view);
        }
    };

    let axes = move || {
        dashboard
            .statistics
            .with(|stats| stats.as_ref().map(axis_options).unwrap_or_default())
    };
    let kinds = move || {
        dashboard
            .statistics
            .with(|stats| stats.as_ref().map(station_kind_options).unwrap_or_default())
    };

    view! {
      <div class="row">
        <div class="col-lg-9">
          <div class="d-flex flex-wrap gap-2 mb-2 map-controls">
            <select
              class="form-select form-select-sm w-auto"
              prop:value=move || layer_choice.get()
              on:change=move |ev| select_layers(event_target_value(&ev))
            >
              <option value="all">"Toutes les couches"</option>
              <option value="gares">"Gares"</option>
              <option value="arcs">"Arcs"</option>
              <option value="incidents">"Incidents"</option>
            </select>
            <select
              class="form-select form-select-sm w-auto"
              prop:value=move || axis_choice.get()
              on:change=move |ev| {
                axis_choice.set(event_target_value(&ev));
                apply_filters();
              }
            >
              <option value="">"Tous les axes"</option>
              {move || axes().into_iter().map(|axis| view! { <option value=axis.clone()>{axis}</option> }).collect_view()}
            </select>
            <select
              class="form-select form-select-sm w-auto"
              prop:value=move || kind_choice.get()
              on:change=move |ev| {
                kind_choice.set(event_target_value(&ev));
                apply_filters();
              }
            >
              <option value="">"Tous les types"</option>
              {move || kinds().into_iter().map(|kind| view! { <option value=kind.clone()>{kind}</option> }).collect_view()}
            </select>
            <button class="btn btn-sm btn-outline-secondary" on:click=reset>"Réinitialiser"</button>
          </div>
          <div node_ref=container id="map" style="height: 600px"></div>
          <div class="d-flex align-items-center gap-2 mt-2">
            <button
              class="btn btn-sm btn-outline-primary"
              prop:disabled=move || !pager.get().has_previous()
              on:click=move |_| page_incidents(false)
            >"Incidents précédents"</button>
            <span class="meta">
              {move || {
                let pager = pager.get();
                let summary = pager.summary();
                format!(
                  "Incidents {}-{} sur {} (page {}/{})",
                  summary.first,
                  summary.last,
                  summary.total,
                  pager.page(),
                  pager.page_count().max(1)
                )
              }}
            </span>
            <button
              class="btn btn-sm btn-outline-primary"
              prop:disabled=move || !pager.get().has_next()
              on:click=move |_| page_incidents(true)
            >"Incidents suivants"</button>
          </div>
        </div>
        <div class="col-lg-3">
          <div class="card mb-2">
            <div class="card-body">
              <h6>"Affichés"</h6>
              <div>{move || format!("{} gares", counts.get().stations)}</div>
              <div>{move || format!("{} arcs", counts.get().segments)}</div>
              <div>{move || format!("{} incidents", counts.get().incidents)}</div>
            </div>
          </div>
          <div class="card mb-2 info-panel">
            <div class="card-body">
              {move || match info.get() {
                None => view! { <p class="meta">"Cliquez sur un élément de la carte"</p> }.into_view(),
                Some(summary) => {
                  let action = summary.action;
                  view! {
                    <h6>{summary.title}</h6>
                    <div class="mb-2">
                      {summary
                        .badges
                        .into_iter()
                        .map(|badge| view! { <span class=format!("{} me-1", badge.tone.badge_class())>{badge.text}</span> })
                        .collect_view()}
                    </div>
                    {summary
                      .fields
                      .into_iter()
                      .map(|field| view! { <div><strong>{field.label}": "</strong>{field.value}</div> })
                      .collect_view()}
                    <div class="mt-2 d-flex gap-1">
                      {action.map(|action| view! {
                        <button class="btn btn-sm btn-primary" on:click=move |_| dashboard.run(action)>"Détails"</button>
                      })}
                      {matches!(action.map(|a| a.target), Some(EntityRef::Station(_))).then(|| view! {
                        <button class="btn btn-sm btn-outline-info" on:click=focus_station>"Centrer sur la gare"</button>
                      })}
                    </div>
                  }
                  .into_view()
                }
              }}
            </div>
          </div>
          <div class="card">
            <div class="card-body legend">
              <h6>"Axes"</h6>
              {axis_legend()
                .map(|(axis, style)| view! {
                  <div>
                    <span class="legend-swatch" style=format!("background:{}", style.color)></span>
                    " "{axis}
                  </div>
                })
                .collect_view()}
            </div>
          </div>
        </div>
      </div>
    }
}
