//! # SolarKit Core
//!
//! Core geometry and shared types for SolarKit. Provides the stateless
//! geometry kernel (polygon transforms, margin erosion, tilt-corrected
//! projection), the exclusion-zone containment tests, the screen/geodetic
//! frame adapters, and the error types used by the placement layer.
//!
//! Every function here is a pure computation over its arguments: nothing
//! retains state between calls, and degenerate geometry resolves to a
//! neutral value instead of an error.

pub mod constants;
pub mod error;
pub mod exclusion;
pub mod geometry;
pub mod units;

pub use error::{Error, Result, StoreError};

pub use exclusion::{center_excluded, footprint_excluded, point_in_polygon, polygons_intersect};

pub use geometry::{
    convex_hull, erode, parallel_angle_delta, projected_length, rotate_point, segments_intersect,
    tilt_corrected_length, LocalFrame, Point, Polygon,
};

pub use units::{GeoProjection, PixelScale};
