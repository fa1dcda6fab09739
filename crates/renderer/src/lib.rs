//! Raster rendering for forecast charts.
//!
//! Implements the graphical layers the chart commands compose:
//! - Filled shading through a palette and boundary levels
//! - Hatch stipple over a threshold band
//! - Wind arrows and barb glyphs
//! - Gridpoint value labels
//! - Corner annotations, logos, and colorbars
//! - Base maps (background, graticule, frame)
//! - PNG encoding (indexed with RGBA fallback)

pub mod annotate;
pub mod basemap;
pub mod colorbar;
pub mod frame;
pub mod hatch;
pub mod numbers;
pub mod png;
pub mod shading;
pub mod vectors;

pub use frame::Frame;
pub use shading::{Extend, Shading};
