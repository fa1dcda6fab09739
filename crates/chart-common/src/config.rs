//! Run configuration.
//!
//! One `RunConfig` is constructed at process start (defaults, optionally
//! overlaid by a YAML file and CLI flags) and passed by reference into the
//! pipeline. It is read-only for the duration of the run.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ChartResult;

/// PNG save options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveOptions {
    /// Prefer indexed PNG when the frame fits in a 256-color palette.
    #[serde(default = "default_true")]
    pub indexed: bool,

    /// Deflate compression: 0 (fast) to 9 (best).
    #[serde(default = "default_compression")]
    pub compression: u32,
}

fn default_true() -> bool {
    true
}

fn default_compression() -> u32 {
    6
}

impl Default for SaveOptions {
    fn default() -> Self {
        Self {
            indexed: true,
            compression: default_compression(),
        }
    }
}

/// Process-wide configuration for one plotting run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Output figure width in pixels
    pub figure_width: u32,

    /// Output figure height in pixels
    pub figure_height: u32,

    /// Worker threads for the parallel phase
    pub processes: usize,

    /// Target number of timesteps per chunk
    pub chunk_size: usize,

    /// PNG save options
    pub save: SaveOptions,

    /// TrueType font used for annotations and labels
    pub font_path: PathBuf,

    /// Optional branding logo composited into a corner
    pub logo_path: Option<PathBuf>,

    /// Optional JSON file of extra palettes merged over the built-in set
    pub palettes_path: Option<PathBuf>,

    /// Root directory containing run directories (yyyymmddHH)
    pub data_dir: PathBuf,

    /// Root directory for output images
    pub output_dir: PathBuf,

    /// Output subfolder per projection name; defaults to the projection name
    pub subfolders: HashMap<String, String>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            figure_width: 1100,
            figure_height: 900,
            processes: 4,
            chunk_size: 6,
            save: SaveOptions::default(),
            font_path: PathBuf::from("/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf"),
            logo_path: None,
            palettes_path: None,
            data_dir: PathBuf::from("data"),
            output_dir: PathBuf::from("images"),
            subfolders: HashMap::new(),
        }
    }
}

impl RunConfig {
    /// Load from a YAML file; missing keys fall back to defaults.
    pub fn from_file(path: impl AsRef<Path>) -> ChartResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&content)?)
    }

    /// Output subfolder for a projection.
    pub fn subfolder(&self, projection: &str) -> String {
        self.subfolders
            .get(projection)
            .cloned()
            .unwrap_or_else(|| projection.to_string())
    }

    /// Full output path for a map-chart frame.
    pub fn frame_path(&self, projection: &str, variable: &str, cum_hour: &str) -> PathBuf {
        self.output_dir
            .join(self.subfolder(projection))
            .join(format!("{}_{}.png", variable, cum_hour))
    }

    /// Full output path for a meteogram.
    pub fn meteogram_path(&self, city: &str) -> PathBuf {
        self.output_dir.join(format!("meteogram_{}.png", city))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let cfg = RunConfig::default();
        assert_eq!(cfg.processes, 4);
        assert_eq!(cfg.chunk_size, 6);
        assert!(cfg.save.indexed);
    }

    #[test]
    fn test_frame_paths() {
        let cfg = RunConfig::default();
        assert_eq!(
            cfg.frame_path("de", "cape_cin", "012"),
            PathBuf::from("images/de/cape_cin_012.png")
        );
        assert_eq!(
            cfg.meteogram_path("Hamburg"),
            PathBuf::from("images/meteogram_Hamburg.png")
        );
    }

    #[test]
    fn test_subfolder_override() {
        let mut cfg = RunConfig::default();
        cfg.subfolders
            .insert("euratl".to_string(), "europe_atlantic".to_string());
        assert_eq!(cfg.subfolder("euratl"), "europe_atlantic");
        assert_eq!(cfg.subfolder("de"), "de");
    }

    #[test]
    fn test_from_file_partial_yaml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "processes: 8\nchunk_size: 3").unwrap();
        let cfg = RunConfig::from_file(file.path()).unwrap();
        assert_eq!(cfg.processes, 8);
        assert_eq!(cfg.chunk_size, 3);
        assert_eq!(cfg.figure_width, 1100);
    }
}
