//! Contour level schedules.
//!
//! Schedules are fixed per variable and never derived from the data, so a
//! field that masks to all-NaN still renders against a valid schedule.

use crate::error::{ChartError, ChartResult};

/// A strictly increasing list of contour boundaries.
#[derive(Debug, Clone, PartialEq)]
pub struct LevelSchedule {
    levels: Vec<f32>,
}

impl LevelSchedule {
    /// Build from an explicit list, rejecting anything not strictly increasing
    /// or shorter than two boundaries.
    pub fn from_levels(levels: Vec<f32>) -> ChartResult<Self> {
        if levels.len() < 2 {
            return Err(ChartError::DegenerateLevels(format!(
                "need at least 2 boundaries, got {}",
                levels.len()
            )));
        }
        for pair in levels.windows(2) {
            if pair[1] <= pair[0] {
                return Err(ChartError::DegenerateLevels(format!(
                    "levels not strictly increasing at {} -> {}",
                    pair[0], pair[1]
                )));
            }
        }
        Ok(Self { levels })
    }

    /// Half-open uniform schedule: start, start+step, ... up to but excluding stop.
    pub fn arange(start: f32, stop: f32, step: f32) -> ChartResult<Self> {
        if step <= 0.0 || stop <= start {
            return Err(ChartError::DegenerateLevels(format!(
                "arange({}, {}, {})",
                start, stop, step
            )));
        }
        let n = ((stop - start) / step).ceil() as usize;
        let levels = (0..n).map(|k| start + k as f32 * step).collect();
        Self::from_levels(levels)
    }

    /// Concatenate uniform segments into one variable-step schedule.
    ///
    /// Each segment is `(start, stop, step)` with half-open semantics; the
    /// combined list must still be strictly increasing.
    pub fn segments(segments: &[(f32, f32, f32)]) -> ChartResult<Self> {
        let mut levels = Vec::new();
        for &(start, stop, step) in segments {
            levels.extend(Self::arange(start, stop, step)?.levels);
        }
        Self::from_levels(levels)
    }

    pub fn levels(&self) -> &[f32] {
        &self.levels
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn first(&self) -> f32 {
        self.levels[0]
    }

    pub fn last(&self) -> f32 {
        *self.levels.last().unwrap()
    }

    /// Index of the interval containing `value`: `Some(k)` when
    /// `levels[k] <= value < levels[k+1]`. Values outside the schedule and
    /// NaN return None.
    pub fn interval_of(&self, value: f32) -> Option<usize> {
        if value.is_nan() || value < self.first() || value >= self.last() {
            return None;
        }
        // partition_point: first index with level > value
        let upper = self.levels.partition_point(|&l| l <= value);
        Some(upper - 1)
    }

    /// Number of shading intervals (one fewer than boundaries).
    pub fn interval_count(&self) -> usize {
        self.levels.len() - 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arange_cape_schedule() {
        let s = LevelSchedule::arange(250.0, 5000.0, 50.0).unwrap();
        assert_eq!(s.len(), 95);
        assert_eq!(s.first(), 250.0);
        assert_eq!(s.last(), 4950.0);
        for pair in s.levels().windows(2) {
            assert!(pair[1] > pair[0]);
        }
    }

    #[test]
    fn test_arange_excludes_stop() {
        let s = LevelSchedule::arange(-25.0, 50.0, 1.0).unwrap();
        assert_eq!(s.len(), 75);
        assert_eq!(s.first(), -25.0);
        assert_eq!(s.last(), 49.0);
    }

    #[test]
    fn test_arange_rejects_degenerate() {
        assert!(LevelSchedule::arange(0.0, 100.0, 0.0).is_err());
        assert!(LevelSchedule::arange(0.0, 100.0, -1.0).is_err());
        assert!(LevelSchedule::arange(100.0, 0.0, 10.0).is_err());
    }

    #[test]
    fn test_segments_precip_schedule() {
        let s = LevelSchedule::segments(&[
            (1.0, 50.0, 0.4),
            (51.0, 100.0, 2.0),
            (101.0, 200.0, 3.0),
            (201.0, 500.0, 6.0),
            (501.0, 1000.0, 50.0),
            (1001.0, 2000.0, 100.0),
        ])
        .unwrap();
        assert_eq!(s.first(), 1.0);
        for pair in s.levels().windows(2) {
            assert!(pair[1] > pair[0], "{} -> {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn test_segments_reject_overlap() {
        assert!(LevelSchedule::segments(&[(0.0, 10.0, 1.0), (5.0, 20.0, 1.0)]).is_err());
    }

    #[test]
    fn test_interval_of() {
        let s = LevelSchedule::arange(0.0, 40.0, 10.0).unwrap();
        assert_eq!(s.interval_of(0.0), Some(0));
        assert_eq!(s.interval_of(9.9), Some(0));
        assert_eq!(s.interval_of(10.0), Some(1));
        assert_eq!(s.interval_of(29.9), Some(2));
        // last boundary is exclusive
        assert_eq!(s.interval_of(30.0), None);
        assert_eq!(s.interval_of(-0.1), None);
        assert_eq!(s.interval_of(f32::NAN), None);
    }
}
