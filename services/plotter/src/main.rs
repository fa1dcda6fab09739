//! Batch forecast-chart renderer.
//!
//! One subcommand per chart. Map charts take an optional projection token,
//! the meteogram takes a list of cities; both fall back to documented
//! defaults with a warning when no token is given.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use chart_common::RunConfig;
use forecast_data::RunCatalog;
use plotter::charts;

const DEFAULT_PROJECTION: &str = "de";
const DEFAULT_CITY: &str = "Hamburg";

#[derive(Parser, Debug)]
#[command(name = "plotter")]
#[command(about = "Batch renderer for forecast model charts")]
struct Args {
    /// Configuration file (YAML)
    #[arg(long, env = "PLOTTER_CONFIG")]
    config: Option<PathBuf>,

    /// Root directory containing forecast run directories
    #[arg(long, env = "PLOTTER_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Root directory for output images
    #[arg(long, env = "PLOTTER_OUTPUT_DIR")]
    output_dir: Option<PathBuf>,

    /// Specific run directory name (yyyymmddHH); default: newest available
    #[arg(long)]
    run: Option<String>,

    /// Render only the first two timesteps, sequentially
    #[arg(long)]
    debug: bool,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    chart: Chart,
}

#[derive(Subcommand, Debug)]
enum Chart {
    /// CAPE shading, CIN hatching, 850 hPa winds
    CapeCin {
        /// Projection name; defaults to "de"
        projection: Vec<String>,
    },
    /// 24-hour accumulated precipitation
    PrecipAcc24 {
        /// Projection name; defaults to "de"
        projection: Vec<String>,
    },
    /// 6-hour maximum 2 m temperature
    Tmax {
        /// Projection name; defaults to "de"
        projection: Vec<String>,
    },
    /// Per-city meteograms
    Meteogram {
        /// City names; defaults to "Hamburg"
        cities: Vec<String>,
    },
}

impl Chart {
    fn variable_name(&self) -> &'static str {
        match self {
            Chart::CapeCin { .. } => charts::cape_cin::VARIABLE_NAME,
            Chart::PrecipAcc24 { .. } => charts::precip_acc::VARIABLE_NAME,
            Chart::Tmax { .. } => charts::tmax::VARIABLE_NAME,
            Chart::Meteogram { .. } => "meteogram",
        }
    }
}

/// First positional token as the projection, or the documented default.
fn resolve_projection(tokens: &[String]) -> String {
    match tokens.first() {
        Some(token) => token.clone(),
        None => {
            warn!(
                "Projection not defined, falling back to default ({})",
                DEFAULT_PROJECTION
            );
            DEFAULT_PROJECTION.to_string()
        }
    }
}

/// All positional tokens as cities, or the documented default.
fn resolve_cities(tokens: &[String]) -> Vec<String> {
    if tokens.is_empty() {
        warn!(
            "City not defined, falling back to default ({})",
            DEFAULT_CITY
        );
        vec![DEFAULT_CITY.to_string()]
    } else {
        tokens.to_vec()
    }
}

fn main() -> Result<()> {
    // Load environment from .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Initialize tracing
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting script to plot {}", args.chart.variable_name());
    let start = Instant::now();

    let mut config = match &args.config {
        Some(path) => RunConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => RunConfig::default(),
    };
    if let Some(dir) = args.data_dir {
        config.data_dir = dir;
    }
    if let Some(dir) = args.output_dir {
        config.output_dir = dir;
    }

    let catalog = match &args.run {
        Some(run) => RunCatalog::open(config.data_dir.join(run))?,
        None => RunCatalog::latest(&config.data_dir)?,
    };
    info!(
        run = %catalog.run_dir.display(),
        reference_time = %catalog.manifest.reference_time,
        "using forecast run"
    );

    match &args.chart {
        Chart::CapeCin { projection } => {
            let projection = resolve_projection(projection);
            charts::cape_cin::run(&config, &catalog, &projection, args.debug)?;
        }
        Chart::PrecipAcc24 { projection } => {
            let projection = resolve_projection(projection);
            charts::precip_acc::run(&config, &catalog, &projection, args.debug)?;
        }
        Chart::Tmax { projection } => {
            let projection = resolve_projection(projection);
            charts::tmax::run(&config, &catalog, &projection, args.debug)?;
        }
        Chart::Meteogram { cities } => {
            let cities = resolve_cities(cities);
            charts::meteogram::run(&config, &catalog, &cities, args.debug)?;
        }
    }

    let elapsed = start.elapsed();
    info!(
        "script took {:02}:{:02}:{:02}",
        elapsed.as_secs() / 3600,
        (elapsed.as_secs() % 3600) / 60,
        elapsed.as_secs() % 60
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_projection_fallback() {
        assert_eq!(resolve_projection(&[]), "de");
        assert_eq!(resolve_projection(&["it".to_string()]), "it");
        // Extra tokens are ignored, first wins
        assert_eq!(
            resolve_projection(&["nord".to_string(), "it".to_string()]),
            "nord"
        );
    }

    #[test]
    fn test_resolve_cities_fallback() {
        assert_eq!(resolve_cities(&[]), vec!["Hamburg".to_string()]);
        let cities = vec!["Berlin".to_string(), "Oslo".to_string()];
        assert_eq!(resolve_cities(&cities), cities);
    }
}
