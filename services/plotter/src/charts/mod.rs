//! The chart commands: per-variable configuration and dataset preparation.

pub mod cape_cin;
pub mod meteogram;
pub mod precip_acc;
pub mod tmax;

use std::sync::Arc;

use tracing::info;

use chart_common::{ChartResult, PaletteRegistry, RunConfig};
use forecast_data::Dataset;
use projection::MapView;

use crate::bundle::{MapChartSpec, RenderBundle};
use crate::pipeline::{dispatch, DispatchMode};

/// The palette registry for this run: built-ins plus any configured extras.
fn palette_registry(config: &RunConfig) -> ChartResult<PaletteRegistry> {
    let mut registry = PaletteRegistry::builtin();
    if let Some(path) = &config.palettes_path {
        registry.merge_json_file(path)?;
    }
    Ok(registry)
}

/// Shared tail of every map chart: build the bundle, dispatch, log totals.
fn render_map_chart(
    config: &RunConfig,
    projection: &str,
    debug: bool,
    dataset: Dataset,
    spec: MapChartSpec,
) -> ChartResult<()> {
    let view = MapView::by_name(projection)?;
    let bundle = RenderBundle::build(config, view, &dataset.grid, spec)?;
    info!("pre-processing finished, launching plotting");

    let mode = if debug {
        DispatchMode::Debug
    } else {
        DispatchMode::Parallel
    };
    let stats = dispatch(Arc::new(bundle), Arc::new(dataset), mode)?;

    let frames: usize = stats.iter().map(|s| s.frames).sum();
    info!(frames, "plotting finished");
    Ok(())
}
