//! Synthetic grid and time-axis generators.

use chart_common::{GridSpec, ValidTime};
use chrono::{TimeZone, Utc};

/// A small central-European test grid (1 degree spacing over Germany).
pub fn test_grid() -> GridSpec {
    GridSpec::new(12, 10, 1.0, 1.0, 5.0, 56.0)
}

/// A time axis of `n` steps every `step_hours`, run 2024-01-15 12Z.
pub fn test_times(n: usize, step_hours: u32) -> Vec<ValidTime> {
    let run = Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap();
    (0..n)
        .map(|k| ValidTime::new(run, k as u32 * step_hours))
        .collect()
}

/// A constant field over a grid.
pub fn constant_field(grid: &GridSpec, value: f32) -> Vec<f32> {
    vec![value; grid.len()]
}

/// A field with a Gaussian bump centered on the grid, `peak` at the center
/// decaying toward `floor` at the edges. Useful for threshold-mask tests.
pub fn gaussian_field(grid: &GridSpec, floor: f32, peak: f32) -> Vec<f32> {
    let cx = (grid.nx - 1) as f32 / 2.0;
    let cy = (grid.ny - 1) as f32 / 2.0;
    let sigma = (grid.nx.max(grid.ny)) as f32 / 4.0;

    let mut values = Vec::with_capacity(grid.len());
    for j in 0..grid.ny {
        for i in 0..grid.nx {
            let dx = i as f32 - cx;
            let dy = j as f32 - cy;
            let r2 = (dx * dx + dy * dy) / (2.0 * sigma * sigma);
            values.push(floor + (peak - floor) * (-r2).exp());
        }
    }
    values
}

/// A west-to-east linear ramp from `start` to `stop`.
pub fn ramp_field(grid: &GridSpec, start: f32, stop: f32) -> Vec<f32> {
    let mut values = Vec::with_capacity(grid.len());
    for _j in 0..grid.ny {
        for i in 0..grid.nx {
            let t = i as f32 / (grid.nx - 1) as f32;
            values.push(start + (stop - start) * t);
        }
    }
    values
}
