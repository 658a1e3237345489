use gis_core::geometry::LatLng;
use gis_core::map::Viewport;
use gis_core::styles::{LineStyle, MarkerStyle};
use serde::Serialize;
use wasm_bindgen::JsValue;

pub const TILE_URL: &str = "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png";
pub const TILE_ATTRIBUTION: &str = "&copy; OpenStreetMap contributors";

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapOptions {
    pub center: [f64; 2],
    pub zoom: u8,
    pub min_zoom: u8,
    pub max_zoom: u8,
}

impl From<Viewport> for MapOptions {
    fn from(view: Viewport) -> Self {
        Self {
            center: lat_lng(view.center),
            zoom: view.zoom,
            min_zoom: gis_core::map::MIN_ZOOM,
            max_zoom: gis_core::map::MAX_ZOOM,
        }
    }
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TileOptions {
    pub attribution: &'static str,
    pub max_zoom: u8,
}

impl Default for TileOptions {
    fn default() -> Self {
        Self {
            attribution: TILE_ATTRIBUTION,
            max_zoom: gis_core::map::MAX_ZOOM,
        }
    }
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CircleMarkerOptions {
    pub radius: f64,
    pub fill_color: &'static str,
    pub color: &'static str,
    pub weight: u32,
    pub opacity: f64,
    pub fill_opacity: f64,
}

impl From<MarkerStyle> for CircleMarkerOptions {
    fn from(style: MarkerStyle) -> Self {
        Self {
            radius: style.radius(),
            fill_color: style.color,
            color: "#ffffff",
            weight: 2,
            opacity: 1.0,
            fill_opacity: 0.8,
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct PolylineOptions {
    pub color: &'static str,
    pub weight: u32,
    pub opacity: f64,
}

impl From<LineStyle> for PolylineOptions {
    fn from(style: LineStyle) -> Self {
        Self {
            color: style.color,
            weight: style.weight,
            opacity: style.opacity,
        }
    }
}

/// Leaflet takes `[lat, lng]` pairs.
pub fn lat_lng(at: LatLng) -> [f64; 2] {
    [at.lat, at.lng]
}

pub fn to_js<T: Serialize>(value: &T) -> JsValue {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .unwrap_or(JsValue::UNDEFINED)
}
