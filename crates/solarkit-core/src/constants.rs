//! Shared constants for layout and interaction tuning.

/// Pixel radius within which a dragged panel snaps to a guide value.
pub const SNAP_TOLERANCE_PX: f64 = 8.0;

/// Maximum angular difference (degrees, modulo 180) for two panels to be
/// considered parallel when collecting snap guides.
pub const PARALLEL_ANGLE_TOLERANCE_DEG: f64 = 5.0;

/// Maximum divergence (degrees, modulo 180) between the azimuth-derived
/// grid angle and the roof polygon's longest-edge angle before the
/// longest-edge angle takes over.
pub const GRID_ANGLE_FALLBACK_DEG: f64 = 5.0;

/// Tilt angle (degrees) past which the cosine is clamped when converting
/// between plan-view and on-surface lengths.
pub const TILT_CLAMP_DEG: f64 = 80.0;

/// Maximum number of pairwise separation passes during a drag move.
pub const SEPARATION_PASSES: usize = 4;

/// Keyboard nudge step in screen pixels (fine, default).
pub const NUDGE_STEP_PX: f64 = 1.0;

/// Keyboard nudge step in screen pixels (coarse, with modifier key).
pub const NUDGE_STEP_COARSE_PX: f64 = 10.0;

/// Tolerance for degenerate-geometry checks (parallel lines, zero-length
/// edges).
pub const GEOM_EPSILON: f64 = 1e-9;

/// Inset applied to candidate cell corners before containment testing, so
/// cells that exactly touch the eroded boundary are not lost to ray-cast
/// ambiguity.
pub const CONTAINMENT_EPSILON: f64 = 1e-7;

/// Mean Earth radius in meters, for the lon/lat local projection.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;
