//! The render-argument bundle.
//!
//! Everything the per-unit renderer needs that does not change between
//! units: projected coordinate grids, the base map, the resolved shading,
//! the font, captions, and layer parameters. Built once per run before the
//! parallel phase and shared read-only by every worker.

use image::{Rgba, RgbaImage};
use rusttype::Font;

use chart_common::{ChartResult, GridSpec, RunConfig};
use projection::MapView;
use renderer::{annotate, basemap, colorbar, Shading};

/// Hatch layer parameters: stipple `field` where `low <= value < high`.
#[derive(Debug, Clone)]
pub struct HatchSpec {
    pub field: &'static str,
    pub low: f32,
    pub high: f32,
}

/// Wind arrow layer parameters.
#[derive(Debug, Clone)]
pub struct VectorSpec {
    pub u: &'static str,
    pub v: &'static str,
    /// Grid stride between arrows
    pub stride: usize,
    /// Pixels per m/s
    pub scale: f32,
}

/// Gridpoint value-label layer parameters.
#[derive(Debug, Clone)]
pub struct ValueLabelSpec {
    pub field: &'static str,
    pub size: f32,
}

/// Fixed per-chart configuration: which fields, which layers, which texts.
#[derive(Clone)]
pub struct MapChartSpec {
    /// Output filename prefix, e.g. "cape_cin"
    pub variable_name: &'static str,
    /// Field drawn as filled shading
    pub primary: &'static str,
    pub shading: Shading,
    pub caption: &'static str,
    pub colorbar_label: &'static str,
    pub hatch: Option<HatchSpec>,
    pub vectors: Option<VectorSpec>,
    pub value_labels: Option<ValueLabelSpec>,
}

/// The immutable bundle shared across all units of one run.
pub struct RenderBundle {
    pub view: MapView,
    pub nx: usize,
    pub ny: usize,
    /// Projected pixel X coordinate per grid point, row-major
    pub xs: Vec<f32>,
    /// Projected pixel Y coordinate per grid point, row-major
    pub ys: Vec<f32>,
    /// Map area height; the strip below it is reserved for the colorbar
    pub map_height: u32,
    pub base: RgbaImage,
    pub font: Font<'static>,
    pub logo: Option<RgbaImage>,
    pub spec: MapChartSpec,
    pub config: RunConfig,
}

impl RenderBundle {
    /// Build the bundle: load the font and logo, project the grid, draw the
    /// base map. This is the expensive per-run setup the workers reuse.
    pub fn build(
        config: &RunConfig,
        view: MapView,
        grid: &GridSpec,
        spec: MapChartSpec,
    ) -> ChartResult<Self> {
        let font = annotate::load_font(&config.font_path)?;
        let logo = match &config.logo_path {
            Some(path) => Some(annotate::load_logo(path)?),
            None => None,
        };

        let width = config.figure_width;
        let height = config.figure_height;
        let map_height = height.saturating_sub(colorbar::strip_height());

        let (xs, ys) = view.pixel_grids(grid, width, map_height);

        let map = basemap::build(&view, width, map_height, &font);
        let mut base = RgbaImage::from_pixel(width, height, Rgba([255, 255, 255, 255]));
        image::imageops::overlay(&mut base, &map, 0, 0);

        Ok(Self {
            view,
            nx: grid.nx,
            ny: grid.ny,
            xs,
            ys,
            map_height,
            base,
            font,
            logo,
            spec,
            config: config.clone(),
        })
    }
}
