//! Run-directory catalog.
//!
//! A forecast run is a directory named `yyyymmddHH` containing a
//! `manifest.yaml` plus one GRIB2 file per (variable, level, forecast hour):
//!
//! ```text
//! data/2024011512/
//!   manifest.yaml
//!   t_2m_000.grib2          surface variable, +000h
//!   cape_ml_012.grib2
//!   t_85000_012.grib2       pressure-level variable at 85000 Pa
//! ```

use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use chart_common::{ChartError, ChartResult, ValidTime};

use crate::dataset::Dataset;
use crate::decode::decode_grib2_values;
use crate::manifest::RunManifest;
use crate::profile::ProfileSeries;

/// One GRIB2 file of a run.
#[derive(Debug, Clone)]
pub struct CatalogEntry {
    /// Variable name, e.g. "cape_ml", "t_2m"
    pub parameter: String,
    /// Pressure level in Pa for level files, None for surface files
    pub level: Option<u32>,
    /// Forecast hour parsed from the filename
    pub forecast_hour: u32,
    pub path: PathBuf,
}

/// A scanned forecast run.
#[derive(Debug)]
pub struct RunCatalog {
    pub run_dir: PathBuf,
    pub manifest: RunManifest,
    entries: Vec<CatalogEntry>,
}

impl RunCatalog {
    /// Open one run directory: read its manifest and scan its GRIB2 files.
    pub fn open(run_dir: impl AsRef<Path>) -> ChartResult<Self> {
        let run_dir = run_dir.as_ref().to_path_buf();
        let manifest = RunManifest::from_file(run_dir.join("manifest.yaml"))?;

        let mut entries = Vec::new();
        for entry in WalkDir::new(&run_dir).max_depth(1) {
            let entry = entry.map_err(|e| ChartError::DataReadError(e.to_string()))?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("grib2") {
                continue;
            }
            let stem = match path.file_stem().and_then(|s| s.to_str()) {
                Some(s) => s,
                None => continue,
            };
            match parse_file_stem(stem) {
                Some((parameter, level, forecast_hour)) => entries.push(CatalogEntry {
                    parameter,
                    level,
                    forecast_hour,
                    path: path.to_path_buf(),
                }),
                None => {
                    debug!(file = %path.display(), "skipping file with unrecognized name");
                }
            }
        }
        entries.sort_by(|a, b| {
            (&a.parameter, a.level, a.forecast_hour).cmp(&(&b.parameter, b.level, b.forecast_hour))
        });

        debug!(run = %run_dir.display(), files = entries.len(), "scanned run directory");
        Ok(Self {
            run_dir,
            manifest,
            entries,
        })
    }

    /// Open the newest run under a data directory.
    pub fn latest(data_dir: impl AsRef<Path>) -> ChartResult<Self> {
        let data_dir = data_dir.as_ref();
        let mut runs: Vec<PathBuf> = std::fs::read_dir(data_dir)
            .map_err(|e| ChartError::DataReadError(format!("{}: {}", data_dir.display(), e)))?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| {
                p.is_dir()
                    && p.file_name()
                        .and_then(|n| n.to_str())
                        .map(|n| ValidTime::parse_run_dir(n).is_ok())
                        .unwrap_or(false)
            })
            .collect();
        runs.sort();
        let newest = runs
            .pop()
            .ok_or_else(|| ChartError::NoRunAvailable(data_dir.display().to_string()))?;
        Self::open(newest)
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    /// Entries for one (variable, level), sorted by forecast hour.
    pub fn entries_for(&self, parameter: &str, level: Option<u32>) -> Vec<&CatalogEntry> {
        self.entries
            .iter()
            .filter(|e| e.parameter == parameter && e.level == level)
            .collect()
    }

    /// Distinct pressure levels available for a variable, descending.
    pub fn levels_for(&self, parameter: &str) -> Vec<u32> {
        let mut levels: Vec<u32> = self
            .entries
            .iter()
            .filter(|e| e.parameter == parameter)
            .filter_map(|e| e.level)
            .collect();
        levels.sort_unstable();
        levels.dedup();
        levels.reverse();
        levels
    }

    /// Load the requested variables into a dataset.
    ///
    /// All variables must exist at the requested level and share the same
    /// forecast-hour set; the shared time axis is an invariant of the
    /// returned dataset.
    pub fn load_fields(&self, variables: &[&str], level: Option<u32>) -> ChartResult<Dataset> {
        let mut dataset: Option<Dataset> = None;

        for &variable in variables {
            let entries = self.entries_for(variable, level);
            if entries.is_empty() {
                return Err(ChartError::MissingVariable(variable.to_string()));
            }

            let times: Vec<ValidTime> = entries
                .iter()
                .map(|e| ValidTime::new(self.manifest.reference_time, e.forecast_hour))
                .collect();

            if let Some(ds) = &dataset {
                let expected: Vec<u32> = ds.times().iter().map(|t| t.forecast_hour).collect();
                let actual: Vec<u32> = times.iter().map(|t| t.forecast_hour).collect();
                if expected != actual {
                    return Err(ChartError::TimeAxisMismatch(variable.to_string()));
                }
            } else {
                dataset = Some(Dataset::new(self.manifest.grid.clone(), times)?);
            }

            let mut steps = Vec::with_capacity(entries.len());
            for entry in &entries {
                steps.push(decode_grib2_values(
                    &entry.path,
                    self.manifest.grid.len(),
                    variable,
                )?);
            }
            dataset.as_mut().unwrap().insert_field(variable, steps)?;
        }

        dataset.ok_or_else(|| ChartError::MissingVariable("<no variables requested>".to_string()))
    }

    /// Load one pressure-level variable at the grid point nearest (lon, lat),
    /// across every available level.
    pub fn load_profile(&self, variable: &str, lon: f64, lat: f64) -> ChartResult<ProfileSeries> {
        let levels = self.levels_for(variable);
        if levels.is_empty() {
            return Err(ChartError::MissingVariable(variable.to_string()));
        }

        let (i, j) = self.manifest.grid.nearest_index(lon, lat).ok_or_else(|| {
            ChartError::DataReadError(format!(
                "point ({:.2}, {:.2}) outside the model grid",
                lon, lat
            ))
        })?;
        let idx = self.manifest.grid.flat_index(i, j);

        let mut times: Option<Vec<ValidTime>> = None;
        // values[level][time], transposed at the end
        let mut per_level: Vec<Vec<f32>> = Vec::with_capacity(levels.len());

        for &level in &levels {
            let entries = self.entries_for(variable, Some(level));
            let hours: Vec<u32> = entries.iter().map(|e| e.forecast_hour).collect();
            if let Some(t) = &times {
                let expected: Vec<u32> = t.iter().map(|t| t.forecast_hour).collect();
                if expected != hours {
                    return Err(ChartError::TimeAxisMismatch(variable.to_string()));
                }
            } else {
                times = Some(
                    hours
                        .iter()
                        .map(|&h| ValidTime::new(self.manifest.reference_time, h))
                        .collect(),
                );
            }

            let mut series = Vec::with_capacity(entries.len());
            for entry in &entries {
                let values =
                    decode_grib2_values(&entry.path, self.manifest.grid.len(), variable)?;
                series.push(values[idx]);
            }
            per_level.push(series);
        }

        let times = times.unwrap();
        let values = (0..times.len())
            .map(|t| per_level.iter().map(|lv| lv[t]).collect())
            .collect();

        Ok(ProfileSeries {
            times,
            levels_hpa: levels.iter().map(|&pa| pa as f32 / 100.0).collect(),
            values,
        })
    }
}

/// Parse `{var}_{fff}` or `{var}_{level_pa}_{fff}` file stems. Variable names
/// may themselves contain underscores ("cape_ml", "t_2m").
fn parse_file_stem(stem: &str) -> Option<(String, Option<u32>, u32)> {
    let tokens: Vec<&str> = stem.split('_').collect();
    if tokens.len() < 2 {
        return None;
    }

    let forecast_hour: u32 = tokens.last().unwrap().parse().ok()?;

    let rest = &tokens[..tokens.len() - 1];
    // A trailing all-digit token of at least 3 digits is a pressure level in
    // Pa; shorter digit-bearing tokens ("2m") belong to the variable name.
    if rest.len() >= 2 {
        let last = rest[rest.len() - 1];
        if last.len() >= 3 {
            if let Ok(level) = last.parse::<u32>() {
                return Some((rest[..rest.len() - 1].join("_"), Some(level), forecast_hour));
            }
        }
    }

    Some((rest.join("_"), None, forecast_hour))
}
