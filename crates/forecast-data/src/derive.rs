//! Field derivation: masking, unit conversion, accumulation differencing.
//!
//! Transformations are applied exactly once after loading, in a fixed order:
//! mask before render, convert units before differencing.

use chart_common::{ChartError, ChartResult, ValidTime};

use crate::dataset::Dataset;

/// Unit transformation applied in place to a field.
#[derive(Debug, Clone, Copy)]
pub enum UnitTransform {
    /// No transformation
    None,
    /// Subtract a value (e.g., K -> C: subtract 273.15)
    Subtract(f32),
    /// Divide by a value (e.g., Pa -> hPa: divide by 100)
    Divide(f32),
    /// Linear transform: value * scale + offset (e.g., m/s -> km/h: scale 3.6)
    Linear { scale: f32, offset: f32 },
}

impl UnitTransform {
    pub fn apply(&self, value: f32) -> f32 {
        match self {
            Self::None => value,
            Self::Subtract(offset) => value - offset,
            Self::Divide(divisor) => value / divisor,
            Self::Linear { scale, offset } => value * scale + offset,
        }
    }

    pub const KELVIN_TO_CELSIUS: UnitTransform = UnitTransform::Subtract(273.15);
    pub const PA_TO_HPA: UnitTransform = UnitTransform::Divide(100.0);
    pub const MS_TO_KMH: UnitTransform = UnitTransform::Linear {
        scale: 3.6,
        offset: 0.0,
    };
}

/// Keep-rule for threshold masking; values outside become NaN.
#[derive(Debug, Clone, Copy)]
pub enum MaskRule {
    /// Keep values >= threshold
    MinThreshold(f32),
    /// Keep values strictly inside (low, high)
    OpenBand { low: f32, high: f32 },
}

impl MaskRule {
    pub fn keeps(&self, value: f32) -> bool {
        if value.is_nan() {
            return false;
        }
        match self {
            Self::MinThreshold(min) => value >= *min,
            Self::OpenBand { low, high } => value > *low && value < *high,
        }
    }
}

impl Dataset {
    /// Mask a field in place: values the rule rejects become NaN, kept values
    /// are untouched.
    pub fn mask_field(&mut self, name: &str, rule: MaskRule) -> ChartResult<()> {
        let field = self.field_mut(name)?;
        for step in &mut field.steps {
            for value in step.iter_mut() {
                if !rule.keeps(*value) {
                    *value = f32::NAN;
                }
            }
        }
        Ok(())
    }

    /// Convert a field's units in place. NaN stays NaN.
    pub fn convert_units(&mut self, name: &str, transform: UnitTransform) -> ChartResult<()> {
        let field = self.field_mut(name)?;
        for step in &mut field.steps {
            for value in step.iter_mut() {
                if !value.is_nan() {
                    *value = transform.apply(*value);
                }
            }
        }
        Ok(())
    }

    /// Resample an accumulated field onto `bucket_hours` buckets (nearest
    /// timestep, anchored on the first valid time) and difference consecutive
    /// buckets.
    ///
    /// Returns a new dataset holding only the differenced field; its time
    /// axis is the later edge of each bucket pair, so it has one fewer
    /// timestep than there are buckets.
    pub fn resample_diff(&self, name: &str, bucket_hours: u32) -> ChartResult<Dataset> {
        let field = self.field(name)?;
        let times = self.times();
        if times.len() < 2 {
            return Err(ChartError::DataReadError(format!(
                "cannot difference '{}': fewer than two timesteps",
                name
            )));
        }

        // Bucket edges anchored on the first valid time
        let first = times[0];
        let last_hour = times.last().unwrap().forecast_hour;
        let mut picked: Vec<usize> = Vec::new();
        let mut edge = first.forecast_hour;
        while edge <= last_hour {
            picked.push(nearest_time_index(times, edge));
            edge += bucket_hours;
        }
        picked.dedup();
        if picked.len() < 2 {
            return Err(ChartError::DataReadError(format!(
                "cannot difference '{}': run shorter than one {}h bucket",
                name, bucket_hours
            )));
        }

        let diff_times: Vec<ValidTime> = picked[1..].iter().map(|&i| times[i]).collect();
        let mut diff_steps = Vec::with_capacity(picked.len() - 1);
        for pair in picked.windows(2) {
            let prev = &field.steps[pair[0]];
            let next = &field.steps[pair[1]];
            diff_steps.push(next.iter().zip(prev).map(|(n, p)| n - p).collect());
        }

        let mut out = Dataset::new(self.grid.clone(), diff_times)?;
        out.insert_field(name, diff_steps)?;
        Ok(out)
    }
}

fn nearest_time_index(times: &[ValidTime], hour: u32) -> usize {
    let mut best = 0;
    let mut best_dist = u32::MAX;
    for (i, t) in times.iter().enumerate() {
        let dist = t.forecast_hour.abs_diff(hour);
        if dist < best_dist {
            best = i;
            best_dist = dist;
        }
    }
    best
}

/// Differentiate an accumulated series over elapsed hours, producing a rate
/// per hour. The first element has no predecessor and is 0.
pub fn differentiate_hours(times: &[ValidTime], values: &[f32]) -> Vec<f32> {
    let mut rates = Vec::with_capacity(values.len());
    for i in 0..values.len() {
        if i == 0 {
            rates.push(0.0);
            continue;
        }
        let dt = (times[i].forecast_hour - times[i - 1].forecast_hour) as f32;
        if dt <= 0.0 {
            rates.push(0.0);
        } else {
            rates.push((values[i] - values[i - 1]) / dt);
        }
    }
    rates
}

#[cfg(test)]
mod tests {
    use super::*;
    use chart_common::GridSpec;
    use chrono::{TimeZone, Utc};

    fn times(hours: &[u32]) -> Vec<ValidTime> {
        let run = Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap();
        hours.iter().map(|&h| ValidTime::new(run, h)).collect()
    }

    fn one_point_dataset(hours: &[u32], values: &[f32]) -> Dataset {
        let mut ds = Dataset::new(GridSpec::new(1, 1, 1.0, 1.0, 0.0, 0.0), times(hours)).unwrap();
        ds.insert_field("tot_prec", values.iter().map(|&v| vec![v]).collect())
            .unwrap();
        ds
    }

    #[test]
    fn test_cape_mask_boundaries() {
        let rule = MaskRule::MinThreshold(250.0);
        assert!(rule.keeps(250.0));
        assert!(rule.keeps(251.0));
        assert!(!rule.keeps(249.9));
        assert!(!rule.keeps(f32::NAN));
    }

    #[test]
    fn test_cin_open_band_boundaries() {
        let rule = MaskRule::OpenBand {
            low: -150.0,
            high: 0.0,
        };
        assert!(rule.keeps(-149.9));
        assert!(rule.keeps(-0.1));
        assert!(!rule.keeps(-150.0));
        assert!(!rule.keeps(0.0));
        assert!(!rule.keeps(5.0));
    }

    #[test]
    fn test_mask_preserves_kept_values() {
        let mut ds = one_point_dataset(&[0, 6], &[249.9, 620.5]);
        ds.mask_field("tot_prec", MaskRule::MinThreshold(250.0))
            .unwrap();
        let field = ds.field("tot_prec").unwrap();
        assert!(field.steps[0][0].is_nan());
        assert_eq!(field.steps[1][0], 620.5);
    }

    #[test]
    fn test_unit_transforms() {
        assert!((UnitTransform::KELVIN_TO_CELSIUS.apply(273.15) - 0.0).abs() < 1e-4);
        assert!((UnitTransform::PA_TO_HPA.apply(101325.0) - 1013.25).abs() < 1e-3);
        assert!((UnitTransform::MS_TO_KMH.apply(10.0) - 36.0).abs() < 1e-4);
        assert_eq!(UnitTransform::None.apply(5.0), 5.0);
    }

    #[test]
    fn test_convert_units_skips_nan() {
        let mut ds = one_point_dataset(&[0, 6], &[f32::NAN, 283.15]);
        ds.convert_units("tot_prec", UnitTransform::KELVIN_TO_CELSIUS)
            .unwrap();
        let field = ds.field("tot_prec").unwrap();
        assert!(field.steps[0][0].is_nan());
        assert!((field.steps[1][0] - 10.0).abs() < 1e-4);
    }

    #[test]
    fn test_resample_diff_24h() {
        // Hourly-ish accumulation sampled every 6 h over 48 h
        let hours: Vec<u32> = (0..=48).step_by(6).map(|h| h as u32).collect();
        let values: Vec<f32> = hours.iter().map(|&h| h as f32 * 0.5).collect();
        let ds = one_point_dataset(&hours, &values);

        let diffed = ds.resample_diff("tot_prec", 24).unwrap();
        // Buckets at +000, +024, +048 -> two differences
        assert_eq!(diffed.num_times(), 2);
        assert_eq!(diffed.times()[0].forecast_hour, 24);
        assert_eq!(diffed.times()[1].forecast_hour, 48);
        let field = diffed.field("tot_prec").unwrap();
        assert!((field.steps[0][0] - 12.0).abs() < 1e-4);
        assert!((field.steps[1][0] - 12.0).abs() < 1e-4);
    }

    #[test]
    fn test_resample_diff_needs_two_buckets() {
        let ds = one_point_dataset(&[0, 6, 12], &[0.0, 1.0, 2.0]);
        assert!(ds.resample_diff("tot_prec", 24).is_err());
    }

    #[test]
    fn test_differentiate_hours() {
        let t = times(&[0, 1, 3]);
        let rates = differentiate_hours(&t, &[0.0, 2.0, 8.0]);
        assert_eq!(rates[0], 0.0);
        assert!((rates[1] - 2.0).abs() < 1e-6);
        assert!((rates[2] - 3.0).abs() < 1e-6);
    }
}
