//! Dashboard engine for the rail network GIS: geometry parsing, the API
//! fetch layer, client-side listing, map scene construction and rendering
//! descriptors. Nothing in here touches the DOM; `gis-ui` and `gis-cli` both
//! drive it.

pub mod api;
pub mod config;
pub mod debounce;
pub mod error;
pub mod export;
pub mod geometry;
pub mod listing;
pub mod map;
pub mod notify;
pub mod render;
pub mod stats;
pub mod status;
pub mod store;
pub mod styles;
pub mod transport;

pub use api::{GisApi, MapData, StationPage};
pub use config::DashboardConfig;
pub use debounce::Debouncer;
pub use error::ApiError;
pub use export::{station_export_name, stations_csv, ExportError};
pub use geometry::{Geometry, LatLng};
pub use listing::{IncidentFilter, ListView, Pager, Period, StationFilter};
pub use map::{FeatureId, LayerKind, LayerSelection, MapFeature, MapFilters, MapScene, Viewport};
pub use notify::{CollectingNotifier, Level, LogNotifier, Notification, Notifier};
pub use render::{ActionId, ActionKind, Command, Dispatcher, EntityRef};
pub use stats::StatsSummary;
pub use status::{IncidentStatus, Tone};
pub use store::{CollectionStore, FetchTicket};
pub use transport::{ApiRequest, HttpTransport, MemoryTransport, Method, Transport};
