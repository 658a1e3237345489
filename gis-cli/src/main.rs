use clap::Parser;
use gis_cli::CliOptions;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let options = CliOptions::parse();

    let result = if options.demo {
        gis_cli::run_demo(&options).await
    } else {
        gis_cli::run(&options).await
    };

    if let Err(err) = result {
        eprintln!("failed to build dashboard report: {err}");
        std::process::exit(1);
    }
}
