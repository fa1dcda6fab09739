//! Valid-time handling for forecast output.

use chrono::{DateTime, Duration, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ChartError, ChartResult};

/// A valid time: model run (reference) time plus a forecast-hour offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ValidTime {
    /// Model run/reference time
    pub reference_time: DateTime<Utc>,
    /// Forecast hour offset from reference time
    pub forecast_hour: u32,
}

impl ValidTime {
    pub fn new(reference_time: DateTime<Utc>, forecast_hour: u32) -> Self {
        Self {
            reference_time,
            forecast_hour,
        }
    }

    /// The actual valid time (reference + forecast offset).
    pub fn valid_datetime(&self) -> DateTime<Utc> {
        self.reference_time + Duration::hours(self.forecast_hour as i64)
    }

    /// Zero-padded cumulated-hour label used in output filenames, e.g. "012".
    pub fn cum_hour_label(&self) -> String {
        format!("{:03}", self.forecast_hour)
    }

    /// Annotation text for the model run, e.g. "Run: 15 Jan 2024 12:00 UTC".
    pub fn run_label(&self) -> String {
        format!("Run: {}", self.reference_time.format("%d %b %Y %H:%M UTC"))
    }

    /// Annotation text for the valid time, e.g.
    /// "Valid: 16 Jan 2024 00:00 UTC (+012h)".
    pub fn forecast_label(&self) -> String {
        format!(
            "Valid: {} (+{}h)",
            self.valid_datetime().format("%d %b %Y %H:%M UTC"),
            self.cum_hour_label()
        )
    }

    /// Parse a run-directory name like "2024011512" (yyyymmddHH).
    pub fn parse_run_dir(name: &str) -> ChartResult<DateTime<Utc>> {
        let ndt = NaiveDateTime::parse_from_str(&format!("{}0000", name), "%Y%m%d%H%M%S")
            .map_err(|_| {
                ChartError::ManifestError(format!("not a run directory name: {}", name))
            })?;
        Ok(Utc.from_utc_datetime(&ndt))
    }
}

impl PartialOrd for ValidTime {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ValidTime {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (self.reference_time, self.forecast_hour).cmp(&(other.reference_time, other.forecast_hour))
    }
}
