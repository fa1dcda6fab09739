//! Named map projections for chart rendering.
//!
//! A `MapView` is a named geographic extent plus the transform used to place
//! data on the output canvas. The registry is fixed: unknown names surface as
//! `ChartError::UnknownProjection` at lookup, matching the argument
//! resolver's no-validation contract.

pub mod lambert;

use chart_common::{BoundingBox, ChartError, ChartResult, GridSpec};
use lambert::LambertConformal;

/// Transform from geographic coordinates to map plane coordinates.
#[derive(Debug, Clone)]
pub enum MapTransform {
    /// Linear lon/lat mapping
    PlateCarree,
    /// Lambert conformal conic
    Lambert(LambertConformal),
}

impl MapTransform {
    /// Project to plane coordinates (arbitrary units, consistent per view).
    fn project(&self, lon: f64, lat: f64) -> (f64, f64) {
        match self {
            MapTransform::PlateCarree => (lon, lat),
            MapTransform::Lambert(l) => l.project(lon, lat),
        }
    }
}

/// A named map view: extent, transform, and per-view drawing parameters.
#[derive(Debug, Clone)]
pub struct MapView {
    /// Registry name ("de", "it", "nord", "euratl")
    pub name: &'static str,
    /// Geographic extent drawn on the canvas
    pub extent: BoundingBox,
    transform: MapTransform,
    /// Graticule line spacing in degrees
    pub graticule_step: f64,
    /// Grid stride between on-map value labels
    pub label_density: usize,
}

impl MapView {
    /// Look up a view by registry name.
    pub fn by_name(name: &str) -> ChartResult<Self> {
        match name {
            "de" => Ok(Self {
                name: "de",
                extent: BoundingBox::new(5.0, 47.0, 16.0, 56.0),
                transform: MapTransform::PlateCarree,
                graticule_step: 2.0,
                label_density: 15,
            }),
            "it" => Ok(Self {
                name: "it",
                extent: BoundingBox::new(6.0, 36.0, 19.0, 48.0),
                transform: MapTransform::PlateCarree,
                graticule_step: 2.0,
                label_density: 11,
            }),
            "nord" => Ok(Self {
                name: "nord",
                extent: BoundingBox::new(0.0, 54.0, 32.0, 72.0),
                transform: MapTransform::Lambert(LambertConformal::new(16.0, 63.0, 60.0, 66.0)),
                graticule_step: 4.0,
                label_density: 9,
            }),
            "euratl" => Ok(Self {
                name: "euratl",
                extent: BoundingBox::new(-23.5, 29.5, 45.0, 70.5),
                transform: MapTransform::PlateCarree,
                graticule_step: 10.0,
                label_density: 22,
            }),
            other => Err(ChartError::UnknownProjection(other.to_string())),
        }
    }

    /// Map a geographic coordinate to canvas pixels. The extent corners span
    /// the full canvas; points outside the extent land outside it.
    pub fn to_pixels(&self, lon: f64, lat: f64, width: u32, height: u32) -> (f32, f32) {
        let (x, y) = self.transform.project(lon, lat);
        let (px, py) = self.plane_bounds();

        let fx = (x - px.0) / (px.1 - px.0);
        let fy = (y - py.0) / (py.1 - py.0);

        // Canvas y grows downward
        (
            (fx * (width - 1) as f64) as f32,
            ((1.0 - fy) * (height - 1) as f64) as f32,
        )
    }

    /// Projected X/Y pixel grids for every point of a data grid, row-major.
    /// Computed once per run and reused by every timestep.
    pub fn pixel_grids(&self, grid: &GridSpec, width: u32, height: u32) -> (Vec<f32>, Vec<f32>) {
        let mut xs = Vec::with_capacity(grid.len());
        let mut ys = Vec::with_capacity(grid.len());
        for j in 0..grid.ny {
            for i in 0..grid.nx {
                let (x, y) = self.to_pixels(grid.lon(i), grid.lat(j), width, height);
                xs.push(x);
                ys.push(y);
            }
        }
        (xs, ys)
    }

    /// Plane-coordinate bounds of the extent, from its projected corners.
    fn plane_bounds(&self) -> ((f64, f64), (f64, f64)) {
        let corners = [
            (self.extent.min_lon, self.extent.min_lat),
            (self.extent.min_lon, self.extent.max_lat),
            (self.extent.max_lon, self.extent.min_lat),
            (self.extent.max_lon, self.extent.max_lat),
        ];
        let mut x_min = f64::INFINITY;
        let mut x_max = f64::NEG_INFINITY;
        let mut y_min = f64::INFINITY;
        let mut y_max = f64::NEG_INFINITY;
        for (lon, lat) in corners {
            let (x, y) = self.transform.project(lon, lat);
            x_min = x_min.min(x);
            x_max = x_max.max(x);
            y_min = y_min.min(y);
            y_max = y_max.max(y);
        }
        ((x_min, x_max), (y_min, y_max))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_projection() {
        assert!(matches!(
            MapView::by_name("atlantis"),
            Err(ChartError::UnknownProjection(_))
        ));
    }

    #[test]
    fn test_plate_carree_corners() {
        let view = MapView::by_name("de").unwrap();
        let (x, y) = view.to_pixels(5.0, 56.0, 1100, 900);
        assert!((x - 0.0).abs() < 0.5 && (y - 0.0).abs() < 0.5);
        let (x, y) = view.to_pixels(16.0, 47.0, 1100, 900);
        assert!((x - 1099.0).abs() < 0.5 && (y - 899.0).abs() < 0.5);
    }

    #[test]
    fn test_pixel_grids_shape() {
        let view = MapView::by_name("it").unwrap();
        let grid = GridSpec::new(14, 13, 1.0, 1.0, 6.0, 48.0);
        let (xs, ys) = view.pixel_grids(&grid, 550, 450);
        assert_eq!(xs.len(), grid.len());
        assert_eq!(ys.len(), grid.len());
        // North-west grid corner is the canvas origin for this extent
        assert!(xs[0].abs() < 0.5);
        assert!(ys[0].abs() < 0.5);
    }

    #[test]
    fn test_lambert_view_keeps_center_inside() {
        let view = MapView::by_name("nord").unwrap();
        let (lon, lat) = view.extent.center();
        let (x, y) = view.to_pixels(lon, lat, 1100, 900);
        assert!(x > 100.0 && x < 1000.0);
        assert!(y > 100.0 && y < 800.0);
    }
}
