//! The labeled multi-time dataset.

use std::collections::BTreeMap;
use std::ops::Range;

use chart_common::{ChartError, ChartResult, GridSpec, ValidTime};

use crate::profile::PointSeries;

/// One named field: per-timestep row-major grids. Undefined points are NaN.
#[derive(Debug, Clone)]
pub struct Field {
    pub name: String,
    /// One grid of values per timestep
    pub steps: Vec<Vec<f32>>,
}

/// A collection of fields sharing one grid and one monotonic time axis.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub grid: GridSpec,
    times: Vec<ValidTime>,
    fields: BTreeMap<String, Field>,
}

impl Dataset {
    /// Create an empty dataset over a grid and a strictly increasing time axis.
    pub fn new(grid: GridSpec, times: Vec<ValidTime>) -> ChartResult<Self> {
        for pair in times.windows(2) {
            if pair[1] <= pair[0] {
                return Err(ChartError::DataReadError(format!(
                    "time axis not strictly increasing at +{:03}h",
                    pair[1].forecast_hour
                )));
            }
        }
        Ok(Self {
            grid,
            times,
            fields: BTreeMap::new(),
        })
    }

    pub fn times(&self) -> &[ValidTime] {
        &self.times
    }

    pub fn num_times(&self) -> usize {
        self.times.len()
    }

    /// Add a field. Step count and grid sizes must match the dataset.
    pub fn insert_field(&mut self, name: &str, steps: Vec<Vec<f32>>) -> ChartResult<()> {
        if steps.len() != self.times.len() {
            return Err(ChartError::TimeAxisMismatch(name.to_string()));
        }
        for step in &steps {
            if step.len() != self.grid.len() {
                return Err(ChartError::GridSizeMismatch {
                    parameter: name.to_string(),
                    expected: self.grid.len(),
                    actual: step.len(),
                });
            }
        }
        self.fields.insert(
            name.to_string(),
            Field {
                name: name.to_string(),
                steps,
            },
        );
        Ok(())
    }

    pub fn field(&self, name: &str) -> ChartResult<&Field> {
        self.fields
            .get(name)
            .ok_or_else(|| ChartError::MissingVariable(name.to_string()))
    }

    pub fn field_mut(&mut self, name: &str) -> ChartResult<&mut Field> {
        self.fields
            .get_mut(name)
            .ok_or_else(|| ChartError::MissingVariable(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// View of one timestep.
    pub fn slice(&self, index: usize) -> TimeSlice<'_> {
        TimeSlice {
            dataset: self,
            index,
        }
    }

    /// Merge another dataset's fields into this one. Both must share the
    /// grid and the exact time axis.
    pub fn merge(&mut self, other: Dataset) -> ChartResult<()> {
        if other.grid != self.grid || other.times != self.times {
            let name = other
                .fields
                .keys()
                .next()
                .cloned()
                .unwrap_or_else(|| "<empty>".to_string());
            return Err(ChartError::TimeAxisMismatch(name));
        }
        self.fields.extend(other.fields);
        Ok(())
    }

    /// Extract a surface field at the grid point nearest to (lon, lat).
    pub fn point_series(&self, name: &str, lon: f64, lat: f64) -> ChartResult<PointSeries> {
        let field = self.field(name)?;
        let (i, j) = self.grid.nearest_index(lon, lat).ok_or_else(|| {
            ChartError::DataReadError(format!(
                "point ({:.2}, {:.2}) outside the model grid",
                lon, lat
            ))
        })?;
        let idx = self.grid.flat_index(i, j);
        Ok(PointSeries {
            times: self.times.clone(),
            values: field.steps.iter().map(|step| step[idx]).collect(),
        })
    }
}

/// One timestep of a dataset.
#[derive(Debug, Clone, Copy)]
pub struct TimeSlice<'a> {
    dataset: &'a Dataset,
    index: usize,
}

impl<'a> TimeSlice<'a> {
    pub fn time(&self) -> ValidTime {
        self.dataset.times[self.index]
    }

    pub fn values(&self, name: &str) -> ChartResult<&'a [f32]> {
        Ok(&self.dataset.field(name)?.steps[self.index])
    }
}

/// Partition `t` timesteps into contiguous chunks of target size `k`.
///
/// Yields ceil(t/k) ranges; every chunk has length `k` except possibly the
/// last, and together they cover 0..t exactly once.
pub fn chunk_ranges(t: usize, k: usize) -> Vec<Range<usize>> {
    assert!(k > 0, "chunk size must be positive");
    (0..t)
        .step_by(k)
        .map(|start| start..(start + k).min(t))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn times(hours: &[u32]) -> Vec<ValidTime> {
        let run = Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap();
        hours.iter().map(|&h| ValidTime::new(run, h)).collect()
    }

    fn small_grid() -> GridSpec {
        GridSpec::new(3, 2, 1.0, 1.0, 0.0, 50.0)
    }

    #[test]
    fn test_insert_and_slice() {
        let mut ds = Dataset::new(small_grid(), times(&[0, 6, 12])).unwrap();
        ds.insert_field(
            "t_2m",
            vec![vec![1.0; 6], vec![2.0; 6], vec![3.0; 6]],
        )
        .unwrap();
        let slice = ds.slice(1);
        assert_eq!(slice.time().forecast_hour, 6);
        assert_eq!(slice.values("t_2m").unwrap()[0], 2.0);
        assert!(matches!(
            slice.values("missing"),
            Err(ChartError::MissingVariable(_))
        ));
    }

    #[test]
    fn test_rejects_non_monotonic_times() {
        assert!(Dataset::new(small_grid(), times(&[0, 12, 6])).is_err());
        assert!(Dataset::new(small_grid(), times(&[0, 0])).is_err());
    }

    #[test]
    fn test_rejects_mismatched_field() {
        let mut ds = Dataset::new(small_grid(), times(&[0, 6])).unwrap();
        assert!(ds.insert_field("x", vec![vec![0.0; 6]]).is_err());
        assert!(ds
            .insert_field("x", vec![vec![0.0; 5], vec![0.0; 5]])
            .is_err());
    }

    #[test]
    fn test_point_series_nearest() {
        let mut ds = Dataset::new(small_grid(), times(&[0, 6])).unwrap();
        let step0: Vec<f32> = (0..6).map(|v| v as f32).collect();
        let step1: Vec<f32> = (0..6).map(|v| v as f32 + 10.0).collect();
        ds.insert_field("t_2m", vec![step0, step1]).unwrap();
        // (1.2, 48.9) -> nearest grid point (1, 49) = column 1, row 1 -> index 4
        let series = ds.point_series("t_2m", 1.2, 48.9).unwrap();
        assert_eq!(series.values, vec![4.0, 14.0]);
        assert!(ds.point_series("t_2m", 10.0, 48.9).is_err());
    }

    #[test]
    fn test_chunk_ranges_exact_cover() {
        let chunks = chunk_ranges(10, 4);
        assert_eq!(chunks, vec![0..4, 4..8, 8..10]);

        let chunks = chunk_ranges(8, 4);
        assert_eq!(chunks.len(), 2);
        assert!(chunks.iter().all(|c| c.len() == 4));

        let chunks = chunk_ranges(3, 10);
        assert_eq!(chunks, vec![0..3]);

        // union covers every index exactly once
        let mut seen = vec![0u32; 10];
        for chunk in chunk_ranges(10, 3) {
            for i in chunk {
                seen[i] += 1;
            }
        }
        assert!(seen.iter().all(|&c| c == 1));
    }

    #[test]
    fn test_chunk_count_is_ceil() {
        for (t, k) in [(1usize, 1usize), (7, 2), (12, 6), (13, 6), (100, 7)] {
            let expected = (t + k - 1) / k;
            assert_eq!(chunk_ranges(t, k).len(), expected, "t={} k={}", t, k);
        }
    }
}
