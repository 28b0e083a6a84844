// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::SegError;
use crate::geometry::Point2;

const WGS84_SEMI_MAJOR_M: f64 = 6_378_137.0;
const WGS84_FLATTENING: f64 = 1.0 / 298.257_223_563;

/// Maps geographic coordinates into a local planar metric frame and back.
pub trait PlanarProjection: Sized {
    /// Builds a projection whose origin is the given reference coordinate.
    fn anchored_at(lat: f64, lon: f64) -> Result<Self, SegError>;

    /// Projects `(lat, lon)` in degrees to `(x, y)` in meters.
    fn project(&self, lat: f64, lon: f64) -> Point2;

    /// Maps a local point back to `(lat, lon)` in degrees.
    fn inverse(&self, point: Point2) -> (f64, f64);
}

/// Equirectangular projection scaled by the WGS84 meters-per-degree at the
/// reference latitude. Accurate for the extent of a single trajectory.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LocalCoordinateReference {
    ref_lat: f64,
    ref_lon: f64,
    meters_per_deg_lat: f64,
    meters_per_deg_lon: f64,
}

impl LocalCoordinateReference {
    pub fn new(ref_lat: f64, ref_lon: f64) -> Result<Self, SegError> {
        if !ref_lat.is_finite() || !ref_lon.is_finite() {
            return Err(SegError::invalid_input(format!(
                "reference coordinate must be finite; got lat={ref_lat}, lon={ref_lon}"
            )));
        }
        if ref_lat.abs() >= 90.0 {
            return Err(SegError::invalid_input(format!(
                "reference latitude must lie strictly inside (-90, 90); got {ref_lat}"
            )));
        }

        let (meters_per_deg_lat, meters_per_deg_lon) = meters_per_degree(ref_lat);
        Ok(Self {
            ref_lat,
            ref_lon,
            meters_per_deg_lat,
            meters_per_deg_lon,
        })
    }

    pub fn reference(&self) -> (f64, f64) {
        (self.ref_lat, self.ref_lon)
    }
}

/// Meters per degree of latitude and longitude on the WGS84 ellipsoid.
fn meters_per_degree(lat_deg: f64) -> (f64, f64) {
    let e2 = WGS84_FLATTENING * (2.0 - WGS84_FLATTENING);
    let phi = lat_deg.to_radians();
    let sin_phi = phi.sin();
    let w = (1.0 - e2 * sin_phi * sin_phi).sqrt();
    let meridional = WGS84_SEMI_MAJOR_M * (1.0 - e2) / (w * w * w);
    let normal = WGS84_SEMI_MAJOR_M / w;
    let per_rad_to_per_deg = std::f64::consts::PI / 180.0;
    (
        meridional * per_rad_to_per_deg,
        normal * phi.cos() * per_rad_to_per_deg,
    )
}

impl PlanarProjection for LocalCoordinateReference {
    fn anchored_at(lat: f64, lon: f64) -> Result<Self, SegError> {
        Self::new(lat, lon)
    }

    fn project(&self, lat: f64, lon: f64) -> Point2 {
        Point2::new(
            (lon - self.ref_lon) * self.meters_per_deg_lon,
            (lat - self.ref_lat) * self.meters_per_deg_lat,
        )
    }

    fn inverse(&self, point: Point2) -> (f64, f64) {
        (
            self.ref_lat + point.y / self.meters_per_deg_lat,
            self.ref_lon + point.x / self.meters_per_deg_lon,
        )
    }
}
