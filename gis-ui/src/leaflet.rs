//! Thin Leaflet binding. Only the calls the dashboard makes are declared;
//! `L` is expected on the page.

use crate::dto::{self, CircleMarkerOptions, MapOptions, PolylineOptions, TileOptions};
use crate::popup::popup_html;
use gis_core::map::{FeatureId, LayerKind, MapFeature, Shape, Viewport};
use js_sys::Array;
use std::rc::Rc;
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
extern "C" {
    pub type LeafletMap;

    #[wasm_bindgen(js_namespace = L, js_name = map)]
    fn create_map(element: &web_sys::HtmlElement, options: &JsValue) -> LeafletMap;

    #[wasm_bindgen(method, js_name = setView)]
    fn set_view(this: &LeafletMap, center: &JsValue, zoom: u8) -> LeafletMap;

    #[wasm_bindgen(method, js_name = on)]
    fn on_map(this: &LeafletMap, event: &str, handler: &js_sys::Function) -> LeafletMap;

    #[wasm_bindgen(method, js_name = addLayer)]
    fn add_layer(this: &LeafletMap, layer: &Layer) -> LeafletMap;

    #[wasm_bindgen(method, js_name = removeLayer)]
    fn remove_layer(this: &LeafletMap, layer: &Layer) -> LeafletMap;

    #[wasm_bindgen(method, js_name = hasLayer)]
    fn has_layer(this: &LeafletMap, layer: &Layer) -> bool;

    #[wasm_bindgen(method, js_name = invalidateSize)]
    fn invalidate_size(this: &LeafletMap) -> LeafletMap;

    pub type Layer;

    #[wasm_bindgen(js_namespace = L, js_name = tileLayer)]
    fn tile_layer(url: &str, options: &JsValue) -> Layer;

    #[wasm_bindgen(js_namespace = L, js_name = circleMarker)]
    fn circle_marker(at: &JsValue, options: &JsValue) -> Layer;

    #[wasm_bindgen(js_namespace = L, js_name = polyline)]
    fn polyline(path: &JsValue, options: &JsValue) -> Layer;

    #[wasm_bindgen(method, js_name = bindPopup)]
    fn bind_popup(this: &Layer, html: &str) -> Layer;

    #[wasm_bindgen(method, js_name = on)]
    fn on_layer(this: &Layer, event: &str, handler: &js_sys::Function) -> Layer;

    #[wasm_bindgen(extends = Layer)]
    pub type LayerGroup;

    #[wasm_bindgen(js_namespace = L, js_name = layerGroup)]
    fn layer_group() -> LayerGroup;

    #[wasm_bindgen(method, js_name = addLayer)]
    fn add_member(this: &LayerGroup, layer: &Layer) -> LayerGroup;

    #[wasm_bindgen(method, js_name = clearLayers)]
    fn clear_layers(this: &LayerGroup) -> LayerGroup;

    #[wasm_bindgen(js_namespace = ["L", "DomEvent"], js_name = stopPropagation)]
    fn stop_propagation(event: &JsValue);
}

type Handler = Closure<dyn FnMut(JsValue)>;

fn slot(kind: LayerKind) -> usize {
    match kind {
        LayerKind::Stations => 0,
        LayerKind::Segments => 1,
        LayerKind::Incidents => 2,
    }
}

/// One Leaflet map with a layer group per scene layer. Click handlers live
/// as long as the features they were attached to.
pub struct MapView {
    map: LeafletMap,
    groups: [LayerGroup; 3],
    handlers: [Vec<Handler>; 3],
    _background: Handler,
}

impl MapView {
    pub fn mount(
        element: &web_sys::HtmlElement,
        view: Viewport,
        on_background: impl Fn() + 'static,
    ) -> Self {
        let map = create_map(element, &dto::to_js(&MapOptions::from(view)));
        map.add_layer(&tile_layer(dto::TILE_URL, &dto::to_js(&TileOptions::default())));

        let groups = [layer_group(), layer_group(), layer_group()];
        for group in &groups {
            map.add_layer(group);
        }

        let background: Handler = Closure::new(move |_event: JsValue| on_background());
        map.on_map("click", background.as_ref().unchecked_ref());

        Self {
            map,
            groups,
            handlers: Default::default(),
            _background: background,
        }
    }

    /// Replaces everything drawn for `kind`.
    pub fn draw(&mut self, kind: LayerKind, features: &[MapFeature], on_click: Rc<dyn Fn(FeatureId)>) {
        let index = slot(kind);
        self.groups[index].clear_layers();
        self.handlers[index].clear();

        for feature in features {
            let layer = match &feature.shape {
                Shape::Marker { at, style } => circle_marker(
                    &dto::to_js(&dto::lat_lng(*at)),
                    &dto::to_js(&CircleMarkerOptions::from(*style)),
                ),
                Shape::Line { path, style } => {
                    let vertices: Array = path
                        .iter()
                        .map(|at| dto::to_js(&dto::lat_lng(*at)))
                        .collect();
                    polyline(&vertices, &dto::to_js(&PolylineOptions::from(*style)))
                }
            };
            layer.bind_popup(&popup_html(&feature.popup));

            let id = feature.id;
            let on_click = Rc::clone(&on_click);
            let handler: Handler = Closure::new(move |event: JsValue| {
                stop_propagation(&event);
                on_click(id);
            });
            layer.on_layer("click", handler.as_ref().unchecked_ref());
            self.handlers[index].push(handler);
            self.groups[index].add_member(&layer);
        }
    }

    pub fn show(&self, kind: LayerKind, visible: bool) {
        let group = &self.groups[slot(kind)];
        match (visible, self.map.has_layer(group)) {
            (true, false) => {
                self.map.add_layer(group);
            }
            (false, true) => {
                self.map.remove_layer(group);
            }
            _ => {}
        }
    }

    pub fn set_view(&self, view: Viewport) {
        self.map
            .set_view(&dto::to_js(&dto::lat_lng(view.center)), view.zoom);
    }

    /// Needed after the container was hidden, or tiles stay grey.
    pub fn refresh_size(&self) {
        self.map.invalidate_size();
    }
}
