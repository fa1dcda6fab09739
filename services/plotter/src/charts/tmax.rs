//! 6-hour maximum 2 m temperature with on-map value labels.

use chart_common::{ChartResult, LevelSchedule, RunConfig};
use forecast_data::{RunCatalog, UnitTransform};
use renderer::{Extend, Shading};

use crate::bundle::{MapChartSpec, ValueLabelSpec};

pub const VARIABLE_NAME: &str = "tmax";

pub fn run(
    config: &RunConfig,
    catalog: &RunCatalog,
    projection: &str,
    debug: bool,
) -> ChartResult<()> {
    let mut dataset = catalog.load_fields(&["tmax_2m"], None)?;
    dataset.convert_units("tmax_2m", UnitTransform::KELVIN_TO_CELSIUS)?;

    let registry = super::palette_registry(config)?;
    let shading = Shading::new(
        registry.get("temp")?,
        LevelSchedule::arange(-25.0, 50.0, 1.0)?,
        Extend::Both,
    )?;

    let spec = MapChartSpec {
        variable_name: VARIABLE_NAME,
        primary: "tmax_2m",
        shading,
        caption: "Maximum 2m Temperature in previous 6 hours",
        colorbar_label: "Temperature [C]",
        hatch: None,
        vectors: None,
        // Label density varies per projection; see MapView::label_density
        value_labels: Some(ValueLabelSpec {
            field: "tmax_2m",
            size: 11.0,
        }),
    };

    super::render_map_chart(config, projection, debug, dataset, spec)
}
