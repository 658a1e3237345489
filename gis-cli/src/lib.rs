pub mod demo;
pub mod report;

use clap::Parser;
use gis_core::{DashboardConfig, GisApi, HttpTransport, LogNotifier};
use std::path::PathBuf;

pub use report::{build_report, DashboardReport};

/// Used when `GIS_API_BASE` is unset or relative, which only makes sense
/// behind the web server that hosts the UI.
pub const NATIVE_API_ORIGIN: &str = "http://127.0.0.1:5000";

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Export(#[from] gis_core::ExportError),
    #[error("failed to write export: {0}")]
    Io(#[from] std::io::Error),
}

/// Prints one pass of the network dashboard: statistics, the station and
/// incident lists and what the map would draw.
#[derive(Clone, Debug, PartialEq, Eq, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CliOptions {
    /// Serve seeded records instead of calling `GIS_API_BASE`.
    #[arg(long)]
    pub demo: bool,
    /// Station page to print, starting at 1.
    #[arg(
        long,
        default_value_t = 1,
        value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..)
    )]
    pub page: usize,
    #[arg(long)]
    pub search: Option<String>,
    #[arg(long = "axe")]
    pub axis: Option<String>,
    /// CSV target; a directory gets the dated default file name.
    #[arg(long)]
    pub export: Option<PathBuf>,
}

impl Default for CliOptions {
    fn default() -> Self {
        Self {
            demo: false,
            page: 1,
            search: None,
            axis: None,
            export: None,
        }
    }
}

fn native_base(base: &str) -> String {
    if base.starts_with('/') {
        format!("{NATIVE_API_ORIGIN}{base}")
    } else {
        base.to_string()
    }
}

pub async fn run(options: &CliOptions) -> Result<(), CliError> {
    let config = DashboardConfig::from_env();
    let base = native_base(&config.api_base);
    tracing::info!(%base, "loading dashboard data");
    let api = GisApi::new(HttpTransport::new(base), LogNotifier);
    let report = build_report(&api, options, &config, now()).await?;
    report.print();
    Ok(())
}

pub async fn run_demo(options: &CliOptions) -> Result<(), CliError> {
    let config = DashboardConfig::from_env();
    let api = GisApi::new(demo::seeded_transport(), LogNotifier);
    let report = build_report(&api, options, &config, demo::reference_time()).await?;
    report.print();
    Ok(())
}

fn now() -> chrono::NaiveDateTime {
    chrono::Local::now().naive_local()
}
