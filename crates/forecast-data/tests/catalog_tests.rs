//! Catalog scanning tests against a synthetic run directory.
//!
//! These cover discovery only; decoding requires real GRIB2 payloads and is
//! exercised against live data.

use std::fs;
use std::path::Path;

use forecast_data::RunCatalog;

const MANIFEST: &str = "\
reference_time: 2024-01-15T12:00:00Z
grid:
  nx: 241
  ny: 161
  dx: 0.0625
  dy: 0.0625
  first_lon: 2.0
  first_lat: 58.0
";

fn write_run(dir: &Path, files: &[&str]) {
    fs::create_dir_all(dir).unwrap();
    fs::write(dir.join("manifest.yaml"), MANIFEST).unwrap();
    for name in files {
        fs::write(dir.join(name), b"").unwrap();
    }
}

#[test]
fn test_scan_parses_entries() {
    let root = tempfile::tempdir().unwrap();
    let run_dir = root.path().join("2024011512");
    write_run(
        &run_dir,
        &[
            "cape_ml_000.grib2",
            "cape_ml_006.grib2",
            "t_85000_000.grib2",
            "t_50000_000.grib2",
            "notes.txt",
        ],
    );

    let catalog = RunCatalog::open(&run_dir).unwrap();
    assert_eq!(catalog.entries().len(), 4);

    let cape = catalog.entries_for("cape_ml", None);
    assert_eq!(cape.len(), 2);
    assert_eq!(cape[0].forecast_hour, 0);
    assert_eq!(cape[1].forecast_hour, 6);

    // Levels come back in descending pressure order
    assert_eq!(catalog.levels_for("t"), vec![85000, 50000]);
    assert!(catalog.entries_for("tot_prec", None).is_empty());
}

#[test]
fn test_latest_picks_newest_run() {
    let root = tempfile::tempdir().unwrap();
    write_run(&root.path().join("2024011500"), &["t_2m_000.grib2"]);
    write_run(&root.path().join("2024011512"), &["t_2m_000.grib2"]);
    fs::create_dir_all(root.path().join("scratch")).unwrap();

    let catalog = RunCatalog::latest(root.path()).unwrap();
    assert!(catalog.run_dir.ends_with("2024011512"));
}

#[test]
fn test_latest_with_no_runs() {
    let root = tempfile::tempdir().unwrap();
    assert!(RunCatalog::latest(root.path()).is_err());
}

#[test]
fn test_open_without_manifest() {
    let root = tempfile::tempdir().unwrap();
    let run_dir = root.path().join("2024011512");
    fs::create_dir_all(&run_dir).unwrap();
    assert!(RunCatalog::open(&run_dir).is_err());
}
