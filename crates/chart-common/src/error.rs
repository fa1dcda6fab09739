//! Error types for weather-charts.

use thiserror::Error;

/// Result type alias using ChartError.
pub type ChartResult<T> = Result<T, ChartError>;

/// Primary error type for chart generation.
#[derive(Debug, Error)]
pub enum ChartError {
    // === Input resolution errors ===
    #[error("Unknown projection: {0}")]
    UnknownProjection(String),

    #[error("Unknown city: {0}")]
    UnknownCity(String),

    // === Data errors ===
    #[error("Variable not found in run: {0}")]
    MissingVariable(String),

    #[error("No forecast run found under {0}")]
    NoRunAvailable(String),

    #[error("Invalid run manifest: {0}")]
    ManifestError(String),

    #[error("Failed to read data: {0}")]
    DataReadError(String),

    #[error("Invalid GRIB2 data: {0}")]
    Grib2Error(String),

    #[error("Grid size mismatch for '{parameter}': expected {expected} values, got {actual}")]
    GridSizeMismatch {
        parameter: String,
        expected: usize,
        actual: usize,
    },

    #[error("Time axis mismatch for '{0}': variables do not share the same timesteps")]
    TimeAxisMismatch(String),

    // === Rendering errors ===
    #[error("Rendering failed: {0}")]
    RenderError(String),

    #[error("Degenerate level schedule: {0}")]
    DegenerateLevels(String),

    #[error("Palette not found: {0}")]
    PaletteNotFound(String),

    #[error("Failed to load font from {path}: {message}")]
    FontError { path: String, message: String },

    // === Infrastructure errors ===
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl From<serde_yaml::Error> for ChartError {
    fn from(err: serde_yaml::Error) -> Self {
        ChartError::ConfigError(format!("YAML error: {}", err))
    }
}

impl From<serde_json::Error> for ChartError {
    fn from(err: serde_json::Error) -> Self {
        ChartError::ConfigError(format!("JSON error: {}", err))
    }
}
