//! Fixed-point series for meteograms.

use chart_common::ValidTime;

use crate::derive::UnitTransform;

/// A surface variable at a fixed point: one value per timestep.
#[derive(Debug, Clone)]
pub struct PointSeries {
    pub times: Vec<ValidTime>,
    pub values: Vec<f32>,
}

impl PointSeries {
    /// Convert units in place. NaN stays NaN.
    pub fn convert(&mut self, transform: UnitTransform) {
        for value in &mut self.values {
            if !value.is_nan() {
                *value = transform.apply(*value);
            }
        }
    }

    /// Minimum over defined values; None when everything is NaN.
    pub fn min(&self) -> Option<f32> {
        self.values
            .iter()
            .filter(|v| !v.is_nan())
            .copied()
            .reduce(f32::min)
    }

    /// Maximum over defined values; None when everything is NaN.
    pub fn max(&self) -> Option<f32> {
        self.values
            .iter()
            .filter(|v| !v.is_nan())
            .copied()
            .reduce(f32::max)
    }
}

/// A pressure-level variable at a fixed point: `values[time][level]`,
/// levels in descending pressure order (surface first).
#[derive(Debug, Clone)]
pub struct ProfileSeries {
    pub times: Vec<ValidTime>,
    /// Pressure levels in hPa, descending
    pub levels_hpa: Vec<f32>,
    pub values: Vec<Vec<f32>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_min_max_skip_nan() {
        let run = Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap();
        let series = PointSeries {
            times: (0..3).map(|h| ValidTime::new(run, h * 6)).collect(),
            values: vec![f32::NAN, 3.0, -1.5],
        };
        assert_eq!(series.min(), Some(-1.5));
        assert_eq!(series.max(), Some(3.0));

        let empty = PointSeries {
            times: vec![ValidTime::new(run, 0)],
            values: vec![f32::NAN],
        };
        assert_eq!(empty.min(), None);
    }
}
