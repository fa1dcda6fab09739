//! Lambert Conformal Conic projection.
//!
//! Used for the high-latitude map views where a plate carrée rendering
//! stretches badly. Maps a cone secant to the Earth's surface onto a plane.

use std::f64::consts::PI;

/// Lambert Conformal Conic projection parameters.
#[derive(Debug, Clone)]
pub struct LambertConformal {
    /// Central meridian in radians
    lon0: f64,
    /// Earth radius (meters)
    earth_radius: f64,
    /// Cone constant (n)
    n: f64,
    /// F constant
    f: f64,
    /// Rho at the reference latitude
    rho0: f64,
}

impl LambertConformal {
    /// Create a projection centered on (`lon0_deg`, `lat0_deg`) with standard
    /// parallels `latin1_deg` and `latin2_deg` (equal for a tangent cone).
    pub fn new(lon0_deg: f64, lat0_deg: f64, latin1_deg: f64, latin2_deg: f64) -> Self {
        let to_rad = PI / 180.0;

        let lon0 = lon0_deg * to_rad;
        let lat0 = lat0_deg * to_rad;
        let latin1 = latin1_deg * to_rad;
        let latin2 = latin2_deg * to_rad;

        // WGS84 mean radius
        let earth_radius = 6371229.0;

        let n = if (latin1 - latin2).abs() < 1e-10 {
            // Tangent cone (single standard parallel)
            latin1.sin()
        } else {
            // Secant cone (two standard parallels)
            let ln_ratio = (latin1.cos() / latin2.cos()).ln();
            let tan_ratio =
                ((PI / 4.0 + latin2 / 2.0).tan() / (PI / 4.0 + latin1 / 2.0).tan()).ln();
            ln_ratio / tan_ratio
        };

        let f = (latin1.cos() * (PI / 4.0 + latin1 / 2.0).tan().powf(n)) / n;
        let rho0 = earth_radius * f / (PI / 4.0 + lat0 / 2.0).tan().powf(n);

        Self {
            lon0,
            earth_radius,
            n,
            f,
            rho0,
        }
    }

    /// Project geographic coordinates (degrees) to plane coordinates in
    /// meters, relative to the projection center.
    pub fn project(&self, lon_deg: f64, lat_deg: f64) -> (f64, f64) {
        let to_rad = PI / 180.0;
        let lat = lat_deg * to_rad;
        let lon = lon_deg * to_rad;

        let mut dlon = lon - self.lon0;
        while dlon > PI {
            dlon -= 2.0 * PI;
        }
        while dlon < -PI {
            dlon += 2.0 * PI;
        }

        let rho = self.earth_radius * self.f / (PI / 4.0 + lat / 2.0).tan().powf(self.n);
        let theta = self.n * dlon;

        (rho * theta.sin(), self.rho0 - rho * theta.cos())
    }
}
