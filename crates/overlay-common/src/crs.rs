//! Coordinate reference systems and Web Mercator projection math.
//!
//! The pipeline computes everything in EPSG:3857; requests may supply
//! geometry and bounding boxes in EPSG:4326, which are reprojected at the
//! boundary with the standard spherical Web Mercator formulas.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;

use crate::error::OverlayError;

/// Spherical earth radius used by EPSG:3857, in meters.
const EARTH_RADIUS: f64 = 6_378_137.0;

/// Extent half-width of the Web Mercator world, in meters.
pub const WEB_MERCATOR_MAX: f64 = 20_037_508.342789244;

/// CRS identifiers supported by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Srid {
    /// WGS84 Geographic (lng/lat in degrees)
    Epsg4326,
    /// Web Mercator (meters)
    Epsg3857,
}

impl Srid {
    /// Parse an `srid` request field. Accepts "4326" and "3857"; anything
    /// else is `UnsupportedCrs`.
    pub fn from_param(s: &str) -> Result<Self, OverlayError> {
        match s.trim() {
            "4326" => Ok(Srid::Epsg4326),
            "3857" => Ok(Srid::Epsg3857),
            other => Err(OverlayError::UnsupportedCrs(other.to_string())),
        }
    }

    pub fn code(&self) -> u32 {
        match self {
            Srid::Epsg4326 => 4326,
            Srid::Epsg3857 => 3857,
        }
    }

    /// Check if this is the geographic (lng/lat) CRS.
    pub fn is_geographic(&self) -> bool {
        matches!(self, Srid::Epsg4326)
    }
}

impl fmt::Display for Srid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EPSG:{}", self.code())
    }
}

/// Forward Web Mercator: (lng, lat) degrees -> (x, y) meters.
pub fn wgs84_to_mercator(lng: f64, lat: f64) -> (f64, f64) {
    let x = EARTH_RADIUS * lng.to_radians();
    let y = EARTH_RADIUS * (PI / 4.0 + lat.to_radians() / 2.0).tan().ln();
    (x, y)
}

/// Inverse Web Mercator: (x, y) meters -> (lng, lat) degrees.
pub fn mercator_to_wgs84(x: f64, y: f64) -> (f64, f64) {
    let lng = (x / EARTH_RADIUS).to_degrees();
    let lat = (2.0 * (y / EARTH_RADIUS).exp().atan() - PI / 2.0).to_degrees();
    (lng, lat)
}

/// Reproject a point from `srid` into EPSG:3857.
///
/// Identity for 3857 input; forward Web Mercator for 4326.
pub fn reproject_point(x: f64, y: f64, srid: Srid) -> (f64, f64) {
    match srid {
        Srid::Epsg3857 => (x, y),
        Srid::Epsg4326 => wgs84_to_mercator(x, y),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::{assert_approx_eq, assert_coords_approx_eq};

    #[test]
    fn test_parse_srid() {
        assert_eq!(Srid::from_param("4326").unwrap(), Srid::Epsg4326);
        assert_eq!(Srid::from_param(" 3857 ").unwrap(), Srid::Epsg3857);
        assert!(Srid::from_param("2193").is_err());
        assert!(Srid::from_param("EPSG:4326").is_err());
    }

    #[test]
    fn test_forward_known_points() {
        let (x, y) = wgs84_to_mercator(0.0, 0.0);
        assert_coords_approx_eq!((x, y), (0.0, 0.0), 1e-6);

        let (x, _) = wgs84_to_mercator(180.0, 0.0);
        assert_approx_eq!(x, WEB_MERCATOR_MAX, 1.0);
    }

    #[test]
    fn test_roundtrip_within_mercator_bounds() {
        // Round trip is identity to within 1e-6 degrees for |lat| <= 85.
        for &(lng, lat) in &[
            (0.0, 0.0),
            (-85.1, 35.05),
            (174.78, -41.29),
            (-179.9, 84.9),
            (13.4, -84.9),
        ] {
            let (x, y) = wgs84_to_mercator(lng, lat);
            let (lng2, lat2) = mercator_to_wgs84(x, y);
            assert_coords_approx_eq!((lng2, lat2), (lng, lat), 1e-6);
        }
    }

    #[test]
    fn test_reproject_point_identity_for_3857() {
        assert_eq!(
            reproject_point(12345.0, -6789.0, Srid::Epsg3857),
            (12345.0, -6789.0)
        );
    }
}
