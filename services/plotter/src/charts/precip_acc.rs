//! 24-hour accumulated precipitation.

use chart_common::{ChartResult, LevelSchedule, RunConfig};
use forecast_data::RunCatalog;
use renderer::{Extend, Shading};

use crate::bundle::MapChartSpec;

pub const VARIABLE_NAME: &str = "precip_acc_24";

const BUCKET_HOURS: u32 = 24;

pub fn run(
    config: &RunConfig,
    catalog: &RunCatalog,
    projection: &str,
    debug: bool,
) -> ChartResult<()> {
    let dataset = catalog.load_fields(&["tot_prec"], None)?;

    // The model accumulates precipitation from the run start; difference
    // 24 h buckets to get per-day amounts.
    let dataset = dataset.resample_diff("tot_prec", BUCKET_HOURS)?;

    let registry = super::palette_registry(config)?;
    let shading = Shading::new(
        registry.get("rain_acc_wxcharts")?,
        LevelSchedule::segments(&[
            (1.0, 50.0, 0.4),
            (51.0, 100.0, 2.0),
            (101.0, 200.0, 3.0),
            (201.0, 500.0, 6.0),
            (501.0, 1000.0, 50.0),
            (1001.0, 2000.0, 100.0),
        ])?,
        Extend::Max,
    )?;

    let spec = MapChartSpec {
        variable_name: VARIABLE_NAME,
        primary: "tot_prec",
        shading,
        caption: "Accumulated precipitation in the last 24 hours",
        colorbar_label: "Accumulated precipitation [mm]",
        hatch: None,
        vectors: None,
        value_labels: None,
    };

    super::render_map_chart(config, projection, debug, dataset, spec)
}
