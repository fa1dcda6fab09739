//! City gazetteer for meteograms.
//!
//! A fixed table of (lon, lat) for the cities the meteogram command accepts.
//! Unknown cities surface as `ChartError::UnknownCity` at lookup.

use chart_common::{ChartError, ChartResult};

/// Cities with coordinates, (name, lon, lat).
const CITIES: &[(&str, f64, f64)] = &[
    ("Hamburg", 9.993, 53.551),
    ("Berlin", 13.405, 52.520),
    ("Muenchen", 11.582, 48.135),
    ("Koeln", 6.960, 50.938),
    ("Frankfurt", 8.682, 50.110),
    ("Milano", 9.190, 45.464),
    ("Roma", 12.496, 41.903),
    ("Napoli", 14.268, 40.852),
    ("Palermo", 13.361, 38.116),
    ("Oslo", 10.752, 59.914),
    ("Stockholm", 18.068, 59.329),
    ("Helsinki", 24.938, 60.170),
    ("Wien", 16.373, 48.208),
    ("Zuerich", 8.541, 47.376),
];

/// Look up a city's (lon, lat).
pub fn coordinates(city: &str) -> ChartResult<(f64, f64)> {
    CITIES
        .iter()
        .find(|(name, _, _)| name.eq_ignore_ascii_case(city))
        .map(|&(_, lon, lat)| (lon, lat))
        .ok_or_else(|| ChartError::UnknownCity(city.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_is_case_insensitive() {
        let (lon, lat) = coordinates("hamburg").unwrap();
        assert!((lon - 9.993).abs() < 1e-6);
        assert!((lat - 53.551).abs() < 1e-6);
    }

    #[test]
    fn test_unknown_city() {
        assert!(matches!(
            coordinates("Atlantis"),
            Err(ChartError::UnknownCity(_))
        ));
    }
}
