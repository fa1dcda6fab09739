//! Forecast run discovery, decoding, and the in-memory dataset model.

pub mod catalog;
pub mod dataset;
pub mod decode;
pub mod derive;
pub mod manifest;
pub mod profile;

pub use catalog::{CatalogEntry, RunCatalog};
pub use dataset::{chunk_ranges, Dataset, Field, TimeSlice};
pub use derive::{MaskRule, UnitTransform};
pub use manifest::RunManifest;
pub use profile::{PointSeries, ProfileSeries};
