//! GRIB2 decoding via the `grib` crate.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use chart_common::{ChartError, ChartResult};

/// Decode the first submessage of a GRIB2 file into grid values.
///
/// The value count must match the run manifest's grid; forecast charts never
/// mix grids within a run.
pub fn decode_grib2_values(path: &Path, expected: usize, parameter: &str) -> ChartResult<Vec<f32>> {
    let f = File::open(path).map_err(|e| {
        ChartError::DataReadError(format!("{}: {}", path.display(), e))
    })?;
    let f = BufReader::new(f);

    let grib2 = grib::from_reader(f)
        .map_err(|e| ChartError::Grib2Error(format!("{}: {:?}", path.display(), e)))?;

    let (_, submessage) = grib2.iter().next().ok_or_else(|| {
        ChartError::Grib2Error(format!("{}: no submessages", path.display()))
    })?;

    let decoder = grib::Grib2SubmessageDecoder::from(submessage)
        .map_err(|e| ChartError::Grib2Error(format!("{}: {}", path.display(), e)))?;
    let values: Vec<f32> = decoder
        .dispatch()
        .map_err(|e| ChartError::Grib2Error(format!("{}: {}", path.display(), e)))?
        .collect();

    if values.len() != expected {
        return Err(ChartError::GridSizeMismatch {
            parameter: parameter.to_string(),
            expected,
            actual: values.len(),
        });
    }

    Ok(values)
}
