//! Grid specifications for forecast model output.
//!
//! Chart data arrives on regular lat/lon grids scanning west→east,
//! north→south, row-major. That is the only ordering the loaders produce,
//! so no scan-mode flags are carried here.

use crate::BoundingBox;
use serde::{Deserialize, Serialize};

/// Specification of a regular lat/lon grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridSpec {
    /// Number of points in X (longitude) direction
    pub nx: usize,
    /// Number of points in Y (latitude) direction
    pub ny: usize,
    /// Grid resolution in X direction (degrees)
    pub dx: f64,
    /// Grid resolution in Y direction (degrees, positive)
    pub dy: f64,
    /// Longitude of the first (north-west) grid point
    pub first_lon: f64,
    /// Latitude of the first (north-west) grid point
    pub first_lat: f64,
}

impl GridSpec {
    pub fn new(nx: usize, ny: usize, dx: f64, dy: f64, first_lon: f64, first_lat: f64) -> Self {
        Self {
            nx,
            ny,
            dx,
            dy,
            first_lon,
            first_lat,
        }
    }

    /// Longitude of column `i`.
    pub fn lon(&self, i: usize) -> f64 {
        self.first_lon + i as f64 * self.dx
    }

    /// Latitude of row `j` (rows go north to south).
    pub fn lat(&self, j: usize) -> f64 {
        self.first_lat - j as f64 * self.dy
    }

    /// Flat row-major index for column `i`, row `j`.
    pub fn flat_index(&self, i: usize, j: usize) -> usize {
        j * self.nx + i
    }

    /// Nearest grid indices for a geographic coordinate, if inside the grid.
    pub fn nearest_index(&self, lon: f64, lat: f64) -> Option<(usize, usize)> {
        let i = ((lon - self.first_lon) / self.dx).round() as isize;
        let j = ((self.first_lat - lat) / self.dy).round() as isize;

        if i < 0 || j < 0 || i >= self.nx as isize || j >= self.ny as isize {
            return None;
        }

        Some((i as usize, j as usize))
    }

    /// Geographic bounds of the grid.
    pub fn bbox(&self) -> BoundingBox {
        BoundingBox {
            min_lon: self.first_lon,
            min_lat: self.first_lat - (self.ny - 1) as f64 * self.dy,
            max_lon: self.first_lon + (self.nx - 1) as f64 * self.dx,
            max_lat: self.first_lat,
        }
    }

    /// Total number of grid points.
    pub fn len(&self) -> usize {
        self.nx * self.ny
    }

    pub fn is_empty(&self) -> bool {
        self.nx == 0 || self.ny == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn icon_eu_cutout() -> GridSpec {
        // 0.0625 degree cutout starting at 2E, 58N
        GridSpec::new(241, 161, 0.0625, 0.0625, 2.0, 58.0)
    }

    #[test]
    fn test_coordinates() {
        let grid = icon_eu_cutout();
        assert!((grid.lon(0) - 2.0).abs() < 1e-9);
        assert!((grid.lat(0) - 58.0).abs() < 1e-9);
        assert!((grid.lon(16) - 3.0).abs() < 1e-9);
        assert!((grid.lat(16) - 57.0).abs() < 1e-9);
    }

    #[test]
    fn test_nearest_index() {
        let grid = icon_eu_cutout();
        assert_eq!(grid.nearest_index(2.0, 58.0), Some((0, 0)));
        assert_eq!(grid.nearest_index(3.01, 57.0), Some((16, 16)));
        assert_eq!(grid.nearest_index(1.0, 57.0), None);
        assert_eq!(grid.nearest_index(3.0, 40.0), None);
    }

    #[test]
    fn test_bbox() {
        let grid = icon_eu_cutout();
        let bbox = grid.bbox();
        assert!((bbox.max_lat - 58.0).abs() < 1e-9);
        assert!((bbox.min_lat - 48.0).abs() < 1e-9);
        assert!((bbox.min_lon - 2.0).abs() < 1e-9);
        assert!((bbox.max_lon - 17.0).abs() < 1e-9);
    }
}
