use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Runtime knobs for the dashboard. Every field has a default and an
/// environment override.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DashboardConfig {
    pub api_base: String,
    pub station_page_size: usize,
    pub incident_page_size: usize,
    pub map_incident_page_size: usize,
    /// `per_page` sent when the incident list loads everything at once.
    pub incident_fetch_limit: usize,
    pub search_debounce_ms: u64,
    pub incident_refresh_secs: u64,
    pub station_refresh_secs: u64,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            api_base: "/api".into(),
            station_page_size: 25,
            incident_page_size: 50,
            map_incident_page_size: 50,
            incident_fetch_limit: 348,
            search_debounce_ms: 500,
            incident_refresh_secs: 5 * 60,
            station_refresh_secs: 10 * 60,
        }
    }
}

impl DashboardConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from any key lookup; unparseable values keep the default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let parsed = |key: &str| lookup(key).and_then(|v| v.trim().parse::<u64>().ok());
        let size = |key: &str, fallback: usize| {
            lookup(key)
                .and_then(|v| v.trim().parse::<usize>().ok())
                .filter(|v| *v > 0)
                .unwrap_or(fallback)
        };

        Self {
            api_base: lookup("GIS_API_BASE")
                .map(|v| v.trim_end_matches('/').to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or(defaults.api_base),
            station_page_size: size("GIS_STATION_PAGE_SIZE", defaults.station_page_size),
            incident_page_size: size("GIS_INCIDENT_PAGE_SIZE", defaults.incident_page_size),
            map_incident_page_size: size(
                "GIS_MAP_INCIDENT_PAGE_SIZE",
                defaults.map_incident_page_size,
            ),
            incident_fetch_limit: size("GIS_INCIDENT_FETCH_LIMIT", defaults.incident_fetch_limit),
            search_debounce_ms: parsed("GIS_SEARCH_DEBOUNCE_MS")
                .unwrap_or(defaults.search_debounce_ms),
            incident_refresh_secs: parsed("GIS_INCIDENT_REFRESH_SECS")
                .filter(|v| *v > 0)
                .unwrap_or(defaults.incident_refresh_secs),
            station_refresh_secs: parsed("GIS_STATION_REFRESH_SECS")
                .filter(|v| *v > 0)
                .unwrap_or(defaults.station_refresh_secs),
        }
    }

    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }

    pub fn incident_refresh(&self) -> Duration {
        Duration::from_secs(self.incident_refresh_secs)
    }

    pub fn station_refresh(&self) -> Duration {
        Duration::from_secs(self.station_refresh_secs)
    }
}
