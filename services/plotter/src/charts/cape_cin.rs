//! CAPE shading with CIN hatching and 850 hPa winds.

use chart_common::{ChartResult, LevelSchedule, RunConfig};
use forecast_data::{MaskRule, RunCatalog};
use renderer::{Extend, Shading};

use crate::bundle::{HatchSpec, MapChartSpec, VectorSpec};

pub const VARIABLE_NAME: &str = "cape_cin";

/// CAPE below this is not plotted.
const CAPE_THRESHOLD: f32 = 250.0;
/// CIN is only meaningful strictly inside this band.
const CIN_KEEP_LOW: f32 = -150.0;
const CIN_KEEP_HIGH: f32 = 0.0;
/// Hatched CIN band.
const CIN_HATCH_LOW: f32 = -100.0;
const CIN_HATCH_HIGH: f32 = -50.0;
/// Winds are drawn from this pressure level (Pa).
const WIND_LEVEL_PA: u32 = 85_000;

pub fn run(
    config: &RunConfig,
    catalog: &RunCatalog,
    projection: &str,
    debug: bool,
) -> ChartResult<()> {
    let mut dataset = catalog.load_fields(&["cape_ml", "cin_ml"], None)?;
    dataset.merge(catalog.load_fields(&["u", "v"], Some(WIND_LEVEL_PA))?)?;

    dataset.mask_field("cape_ml", MaskRule::MinThreshold(CAPE_THRESHOLD))?;
    dataset.mask_field(
        "cin_ml",
        MaskRule::OpenBand {
            low: CIN_KEEP_LOW,
            high: CIN_KEEP_HIGH,
        },
    )?;

    let registry = super::palette_registry(config)?;
    let shading = Shading::new(
        registry.get("cape_wxcharts")?,
        LevelSchedule::arange(250.0, 5000.0, 50.0)?,
        Extend::Max,
    )?;

    let spec = MapChartSpec {
        variable_name: VARIABLE_NAME,
        primary: "cape_ml",
        shading,
        caption: "CAPE and winds at 850 hPa, hatches: CIN -100 to -50 J/kg",
        colorbar_label: "CAPE [J/kg]",
        hatch: Some(HatchSpec {
            field: "cin_ml",
            low: CIN_HATCH_LOW,
            high: CIN_HATCH_HIGH,
        }),
        vectors: Some(VectorSpec {
            u: "u",
            v: "v",
            stride: 15,
            scale: 1.5,
        }),
        value_labels: None,
    };

    super::render_map_chart(config, projection, debug, dataset, spec)
}
