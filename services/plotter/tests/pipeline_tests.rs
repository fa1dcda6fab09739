//! Integration tests for the chunk dispatcher and per-unit renderer.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chart_common::{LevelSchedule, PaletteRegistry, RunConfig};
use forecast_data::Dataset;
use projection::MapView;
use renderer::{Extend, Shading};

use plotter::bundle::{MapChartSpec, RenderBundle};
use plotter::pipeline::{dispatch, render_chunk, DispatchMode};

use test_utils::{constant_field, gaussian_field, require_file_or_skip, test_grid, test_times};

const FONT_PATH: &str = "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf";

fn test_config(output_dir: &Path) -> RunConfig {
    RunConfig {
        figure_width: 300,
        figure_height: 260,
        processes: 2,
        chunk_size: 2,
        output_dir: output_dir.to_path_buf(),
        ..RunConfig::default()
    }
}

fn cape_spec() -> MapChartSpec {
    let registry = PaletteRegistry::builtin();
    MapChartSpec {
        variable_name: "cape_cin",
        primary: "cape_ml",
        shading: Shading::new(
            registry.get("cape_wxcharts").unwrap(),
            LevelSchedule::arange(250.0, 5000.0, 50.0).unwrap(),
            Extend::Max,
        )
        .unwrap(),
        caption: "CAPE test chart",
        colorbar_label: "CAPE [J/kg]",
        hatch: None,
        vectors: None,
        value_labels: None,
    }
}

fn cape_dataset(num_times: usize, all_masked: bool) -> Dataset {
    let grid = test_grid();
    let mut dataset = Dataset::new(grid.clone(), test_times(num_times, 6)).unwrap();
    let step = if all_masked {
        constant_field(&grid, f32::NAN)
    } else {
        gaussian_field(&grid, 0.0, 3000.0)
    };
    dataset
        .insert_field("cape_ml", vec![step; num_times])
        .unwrap();
    dataset
}

fn build_bundle(config: &RunConfig, dataset: &Dataset) -> RenderBundle {
    let view = MapView::by_name("de").unwrap();
    RenderBundle::build(config, view, &dataset.grid, cape_spec()).unwrap()
}

fn written_files(dir: &Path) -> BTreeSet<PathBuf> {
    let mut files = BTreeSet::new();
    if let Ok(entries) = std::fs::read_dir(dir.join("de")) {
        for entry in entries.flatten() {
            files.insert(entry.path());
        }
    }
    files
}

#[test]
fn test_colorbar_attached_once_per_chunk() {
    require_file_or_skip!(FONT_PATH);
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());
    let dataset = cape_dataset(4, false);
    let bundle = build_bundle(&config, &dataset);

    let stats = render_chunk(&bundle, &dataset, 0..4).unwrap();
    assert_eq!(stats.frames, 4);
    assert_eq!(stats.colorbar_attached, 1);
}

#[test]
fn test_fully_masked_field_still_writes_frames() {
    require_file_or_skip!(FONT_PATH);
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());
    let dataset = cape_dataset(2, true);
    let bundle = build_bundle(&config, &dataset);

    let stats = render_chunk(&bundle, &dataset, 0..2).unwrap();
    assert_eq!(stats.frames, 2);

    let files = written_files(dir.path());
    assert_eq!(files.len(), 2);
    for file in &files {
        let bytes = std::fs::read(file).unwrap();
        // Valid PNG signature even with nothing shaded
        assert_eq!(&bytes[..8], &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]);
    }
}

#[test]
fn test_parallel_dispatch_names_and_idempotence() {
    require_file_or_skip!(FONT_PATH);
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());
    let dataset = cape_dataset(5, false);
    let bundle = Arc::new(build_bundle(&config, &dataset));
    let dataset = Arc::new(dataset);

    let stats = dispatch(bundle.clone(), dataset.clone(), DispatchMode::Parallel).unwrap();
    // 5 timesteps at chunk size 2 -> 3 chunks
    assert_eq!(stats.len(), 3);
    assert_eq!(stats.iter().map(|s| s.frames).sum::<usize>(), 5);
    // Every chunk attaches its own colorbar, on its first unit
    assert!(stats.iter().all(|s| s.colorbar_attached == 1));

    let first_run = written_files(dir.path());
    assert_eq!(first_run.len(), 5);
    let expected: BTreeSet<String> = ["000", "006", "012", "018", "024"]
        .iter()
        .map(|h| format!("cape_cin_{}.png", h))
        .collect();
    let actual: BTreeSet<String> = first_run
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
        .collect();
    assert_eq!(actual, expected);

    // Rerunning produces the same names and count
    let stats = dispatch(bundle, dataset, DispatchMode::Parallel).unwrap();
    assert_eq!(stats.iter().map(|s| s.frames).sum::<usize>(), 5);
    assert_eq!(written_files(dir.path()), first_run);
}

#[test]
fn test_debug_mode_renders_two_timesteps() {
    require_file_or_skip!(FONT_PATH);
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());
    let dataset = cape_dataset(6, false);
    let bundle = Arc::new(build_bundle(&config, &dataset));

    let stats = dispatch(bundle, Arc::new(dataset), DispatchMode::Debug).unwrap();
    assert_eq!(stats.len(), 1);
    assert_eq!(stats[0].frames, 2);
    assert_eq!(written_files(dir.path()).len(), 2);
}

#[test]
fn test_missing_primary_field_fails_fast() {
    require_file_or_skip!(FONT_PATH);
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());

    let grid = test_grid();
    let mut dataset = Dataset::new(grid.clone(), test_times(3, 6)).unwrap();
    dataset
        .insert_field("wrong_name", vec![constant_field(&grid, 0.0); 3])
        .unwrap();
    let bundle = Arc::new(build_bundle(&config, &dataset));

    let result = dispatch(bundle, Arc::new(dataset), DispatchMode::Parallel);
    assert!(result.is_err());
}
