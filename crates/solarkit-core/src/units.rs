//! Coordinate-frame adapters around the canonical meters plane.
//!
//! All layout math runs in one local tangent-plane frame measured in
//! meters. Screen space and geodetic space each get a thin adapter onto
//! that frame: a scalar meters-per-pixel factor for the canvas, and a
//! local equirectangular projection for lon/lat input.

use serde::{Deserialize, Serialize};

use crate::constants::{EARTH_RADIUS_M, GEOM_EPSILON};
use crate::geometry::Point;

/// Scalar screen adapter: meters per canvas pixel at the current view
/// scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PixelScale {
    meters_per_pixel: f64,
}

impl PixelScale {
    /// Creates a scale from a meters-per-pixel factor. Non-positive
    /// factors are clamped to a minimal positive value rather than
    /// rejected.
    pub fn new(meters_per_pixel: f64) -> Self {
        Self {
            meters_per_pixel: meters_per_pixel.max(GEOM_EPSILON),
        }
    }

    pub fn meters_per_pixel(&self) -> f64 {
        self.meters_per_pixel
    }

    /// Converts a screen-space length to meters.
    pub fn to_meters(&self, pixels: f64) -> f64 {
        pixels * self.meters_per_pixel
    }

    /// Converts a plan-space length to screen pixels.
    pub fn to_pixels(&self, meters: f64) -> f64 {
        meters / self.meters_per_pixel
    }
}

impl Default for PixelScale {
    fn default() -> Self {
        Self::new(0.05)
    }
}

/// Local equirectangular projection anchored at a reference coordinate.
///
/// Adequate at roof scale: latitude circles are treated as straight lines
/// and the longitude scale is frozen at the anchor latitude.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoProjection {
    origin_lon_deg: f64,
    origin_lat_deg: f64,
}

impl GeoProjection {
    pub fn new(origin_lon_deg: f64, origin_lat_deg: f64) -> Self {
        Self {
            origin_lon_deg,
            origin_lat_deg,
        }
    }

    /// Maps a lon/lat coordinate to local meters relative to the anchor.
    pub fn to_local(&self, lon_deg: f64, lat_deg: f64) -> Point {
        let lat_scale = self.origin_lat_deg.to_radians().cos();
        Point::new(
            EARTH_RADIUS_M * (lon_deg - self.origin_lon_deg).to_radians() * lat_scale,
            EARTH_RADIUS_M * (lat_deg - self.origin_lat_deg).to_radians(),
        )
    }

    /// Maps local meters back to lon/lat.
    pub fn to_geo(&self, local: Point) -> (f64, f64) {
        let lat_scale = self.origin_lat_deg.to_radians().cos().max(GEOM_EPSILON);
        (
            self.origin_lon_deg + (local.x / (EARTH_RADIUS_M * lat_scale)).to_degrees(),
            self.origin_lat_deg + (local.y / EARTH_RADIUS_M).to_degrees(),
        )
    }
}
