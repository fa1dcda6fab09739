//! Per-run manifest.
//!
//! A run directory carries a `manifest.yaml` describing the model grid and
//! the reference time. The grid in the manifest is authoritative: decoded
//! GRIB2 messages must match its point count.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use chart_common::{ChartError, ChartResult, GridSpec};

/// Contents of a run directory's `manifest.yaml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunManifest {
    /// Model run/reference time
    pub reference_time: DateTime<Utc>,

    /// The regular lat/lon grid all fields of the run share
    pub grid: GridSpec,
}

impl RunManifest {
    pub fn from_file(path: impl AsRef<Path>) -> ChartResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            ChartError::ManifestError(format!("{}: {}", path.display(), e))
        })?;
        let manifest: RunManifest = serde_yaml::from_str(&content)
            .map_err(|e| ChartError::ManifestError(format!("{}: {}", path.display(), e)))?;
        if manifest.grid.is_empty() {
            return Err(ChartError::ManifestError(format!(
                "{}: empty grid",
                path.display()
            )));
        }
        Ok(manifest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_manifest() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "reference_time: 2024-01-15T12:00:00Z\n\
             grid:\n  nx: 241\n  ny: 161\n  dx: 0.0625\n  dy: 0.0625\n  first_lon: 2.0\n  first_lat: 58.0"
        )
        .unwrap();
        let manifest = RunManifest::from_file(file.path()).unwrap();
        assert_eq!(manifest.grid.nx, 241);
        assert_eq!(manifest.grid.len(), 241 * 161);
    }

    #[test]
    fn test_missing_manifest() {
        assert!(matches!(
            RunManifest::from_file("/nonexistent/manifest.yaml"),
            Err(ChartError::ManifestError(_))
        ));
    }
}
