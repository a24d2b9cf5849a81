//! Data model for roof surfaces, module specs, grid configuration,
//! exclusion zones, and placed panels.
//!
//! All entities are plain serde-friendly values. Ownership and mutation go
//! through the [`crate::store::PlacementStore`]; everything in this module
//! is inert data.

use serde::{Deserialize, Serialize};
use solarkit_core::geometry::{segments_intersect, Point, Polygon};

/// How a roof outline entered the project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoofProvenance {
    /// Outline imported from suitability data or aerial tracing.
    Imported,
    /// Outline drawn by hand.
    Drawn,
}

/// One plannable rooftop face: a closed boundary polygon plus its
/// orientation and slope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoofSurface {
    pub id: u64,
    /// Ordered boundary vertices in the working plane (meters).
    pub boundary: Polygon,
    /// Orientation reference angle in degrees, canvas-frame convention.
    pub azimuth_deg: f64,
    /// Slope angle in degrees, kept within `[0, 90)`.
    pub tilt_deg: f64,
    pub provenance: RoofProvenance,
}

impl RoofSurface {
    pub fn new(
        id: u64,
        boundary: Polygon,
        azimuth_deg: f64,
        tilt_deg: f64,
        provenance: RoofProvenance,
    ) -> Self {
        Self {
            id,
            boundary,
            azimuth_deg,
            tilt_deg: tilt_deg.clamp(0.0, 90.0 - 1e-9),
            provenance,
        }
    }

    /// True if the boundary is a usable simple polygon: at least three
    /// vertices, nonzero area, and no two non-adjacent edges crossing.
    pub fn is_valid(&self) -> bool {
        let verts = self.boundary.vertices();
        let n = verts.len();
        if n < 3 || self.boundary.area() < 1e-12 {
            return false;
        }
        for i in 0..n {
            let a1 = verts[i];
            let a2 = verts[(i + 1) % n];
            for k in (i + 1)..n {
                // Skip the shared-vertex neighbors; they touch by
                // construction.
                if k == i || (k + 1) % n == i || (i + 1) % n == k {
                    continue;
                }
                let b1 = verts[k];
                let b2 = verts[(k + 1) % n];
                if segments_intersect(a1, a2, b1, b2) {
                    return false;
                }
            }
        }
        true
    }
}

/// Immutable catalog entry describing one physical module type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleSpec {
    /// Catalog key, referenced by placements.
    pub id: String,
    pub name: String,
    /// Physical long side in meters.
    pub long_side_m: f64,
    /// Physical short side in meters.
    pub short_side_m: f64,
    /// Rated power in watts.
    pub rated_watts: f64,
}

impl ModuleSpec {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        long_side_m: f64,
        short_side_m: f64,
        rated_watts: f64,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            long_side_m,
            short_side_m,
            rated_watts,
        }
    }
}

/// Which module side runs across the roof versus up the slope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleOrientation {
    /// Long side up the slope.
    #[default]
    Portrait,
    /// Long side across the slope.
    Landscape,
}

impl ModuleOrientation {
    /// Physical footprint as `(across_slope, along_fall)` in meters,
    /// before any tilt projection.
    pub fn footprint(&self, module: &ModuleSpec) -> (f64, f64) {
        match self {
            ModuleOrientation::Portrait => (module.short_side_m, module.long_side_m),
            ModuleOrientation::Landscape => (module.long_side_m, module.short_side_m),
        }
    }
}

/// Where a grid axis places its first cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GridAnchor {
    #[default]
    Start,
    Center,
    End,
}

/// Fraction of the row-axis extent the grid may fill. Stored as one of
/// three steps; arbitrary input fractions snap to the nearest step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoverageRatio {
    Half,
    ThreeQuarter,
    #[default]
    Full,
}

impl CoverageRatio {
    pub fn fraction(&self) -> f64 {
        match self {
            CoverageRatio::Half => 0.5,
            CoverageRatio::ThreeQuarter => 0.75,
            CoverageRatio::Full => 1.0,
        }
    }

    /// Snaps an arbitrary fraction to the nearest supported step.
    pub fn from_fraction(fraction: f64) -> Self {
        let steps = [
            CoverageRatio::Half,
            CoverageRatio::ThreeQuarter,
            CoverageRatio::Full,
        ];
        let mut best = CoverageRatio::Full;
        let mut best_dist = f64::INFINITY;
        for step in steps {
            let dist = (step.fraction() - fraction).abs();
            if dist < best_dist {
                best_dist = dist;
                best = step;
            }
        }
        best
    }
}

/// Grid generation parameters, scoped globally or per roof.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridConfig {
    /// Distance kept between modules and the roof edge (meters, ≥ 0).
    pub margin_m: f64,
    /// Gap between neighboring modules (meters, ≥ 0).
    pub spacing_m: f64,
    pub orientation: ModuleOrientation,
    /// Extra rotation added to the roof's derived grid angle (degrees).
    pub rotation_offset_deg: f64,
    pub anchor_u: GridAnchor,
    pub anchor_v: GridAnchor,
    /// Fractional sub-cell shift per axis, in `[0, 1)` of one cell.
    pub phase_u: f64,
    pub phase_v: f64,
    pub coverage: CoverageRatio,
    /// Selected module type; `None` makes layout generation a no-op.
    #[serde(default)]
    pub module_id: Option<String>,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            margin_m: 0.3,
            spacing_m: 0.02,
            orientation: ModuleOrientation::default(),
            rotation_offset_deg: 0.0,
            anchor_u: GridAnchor::default(),
            anchor_v: GridAnchor::default(),
            phase_u: 0.0,
            phase_v: 0.0,
            coverage: CoverageRatio::default(),
            module_id: None,
        }
    }
}

impl GridConfig {
    /// Margin and spacing clamped non-negative, phases wrapped into
    /// `[0, 1)`. Applied by consumers before any layout math.
    pub fn normalized(&self) -> Self {
        let mut cfg = self.clone();
        cfg.margin_m = cfg.margin_m.max(0.0);
        cfg.spacing_m = cfg.spacing_m.max(0.0);
        cfg.phase_u = cfg.phase_u.rem_euclid(1.0);
        cfg.phase_v = cfg.phase_v.rem_euclid(1.0);
        cfg
    }
}

/// The single canonical exclusion-zone kind.
///
/// The legacy data model had several interchangeable names for the same
/// concept; they all collapse to this variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZoneKind {
    #[default]
    Excluded,
}

/// A polygon within a roof where no module may be placed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExclusionZone {
    pub id: u64,
    pub roof_id: u64,
    pub polygon: Polygon,
    #[serde(default)]
    pub kind: ZoneKind,
}

/// An oriented rectangle in the working plane: the footprint of one
/// placed (or candidate) module.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PanelRect {
    pub center: Point,
    pub width_m: f64,
    pub height_m: f64,
    pub angle_deg: f64,
}

impl PanelRect {
    pub fn new(center: Point, width_m: f64, height_m: f64, angle_deg: f64) -> Self {
        Self {
            center,
            width_m,
            height_m,
            angle_deg,
        }
    }

    /// Corner polygon, rotated around the center.
    pub fn corners(&self) -> Polygon {
        Polygon::oriented_rect(self.center, self.width_m, self.height_m, self.angle_deg)
    }

    pub fn half_extents(&self) -> (f64, f64) {
        (self.width_m / 2.0, self.height_m / 2.0)
    }
}

/// One committed module placement on a roof.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelInstance {
    pub id: u64,
    pub roof_id: u64,
    /// Center in the working plane (meters).
    pub center: Point,
    /// Plan-view footprint, orientation and tilt already applied.
    pub width_m: f64,
    pub height_m: f64,
    /// Rotation angle; defaults to the roof's grid angle at generation
    /// time, may carry a per-instance override afterwards.
    pub angle_deg: f64,
    /// Catalog key of the module type.
    pub module_id: String,
}

impl PanelInstance {
    pub fn rect(&self) -> PanelRect {
        PanelRect::new(self.center, self.width_m, self.height_m, self.angle_deg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect_poly(w: f64, h: f64) -> Polygon {
        Polygon::new(vec![
            Point::new(0.0, 0.0),
            Point::new(w, 0.0),
            Point::new(w, h),
            Point::new(0.0, h),
        ])
    }

    #[test]
    fn roof_tilt_is_clamped_below_vertical() {
        let roof = RoofSurface::new(1, rect_poly(10.0, 6.0), 0.0, 95.0, RoofProvenance::Drawn);
        assert!(roof.tilt_deg < 90.0);
    }

    #[test]
    fn simple_rectangle_is_valid() {
        let roof = RoofSurface::new(1, rect_poly(10.0, 6.0), 0.0, 30.0, RoofProvenance::Imported);
        assert!(roof.is_valid());
    }

    #[test]
    fn self_intersecting_bowtie_is_invalid() {
        let bowtie = Polygon::new(vec![
            Point::new(0.0, 0.0),
            Point::new(4.0, 4.0),
            Point::new(4.0, 0.0),
            Point::new(0.0, 4.0),
        ]);
        let roof = RoofSurface::new(1, bowtie, 0.0, 0.0, RoofProvenance::Drawn);
        assert!(!roof.is_valid());
    }

    #[test]
    fn orientation_swaps_footprint_axes() {
        let module = ModuleSpec::new("m", "Test", 1.7, 1.1, 400.0);
        assert_eq!(
            ModuleOrientation::Portrait.footprint(&module),
            (1.1, 1.7)
        );
        assert_eq!(
            ModuleOrientation::Landscape.footprint(&module),
            (1.7, 1.1)
        );
    }

    #[test]
    fn coverage_snaps_to_nearest_step() {
        assert_eq!(CoverageRatio::from_fraction(0.45), CoverageRatio::Half);
        assert_eq!(
            CoverageRatio::from_fraction(0.7),
            CoverageRatio::ThreeQuarter
        );
        assert_eq!(CoverageRatio::from_fraction(0.95), CoverageRatio::Full);
        assert_eq!(CoverageRatio::from_fraction(2.0), CoverageRatio::Full);
    }

    #[test]
    fn config_normalization_wraps_phase_and_clamps_distances() {
        let cfg = GridConfig {
            margin_m: -1.0,
            spacing_m: -0.5,
            phase_u: 1.25,
            phase_v: -0.25,
            ..GridConfig::default()
        };
        let norm = cfg.normalized();
        assert_eq!(norm.margin_m, 0.0);
        assert_eq!(norm.spacing_m, 0.0);
        assert!((norm.phase_u - 0.25).abs() < 1e-12);
        assert!((norm.phase_v - 0.75).abs() < 1e-12);
    }

    #[test]
    fn panel_rect_corners_rotate_about_center() {
        let rect = PanelRect::new(Point::new(2.0, 2.0), 2.0, 1.0, 90.0);
        let corners = rect.corners();
        let (min_x, min_y, max_x, max_y) = corners.bounding_box().unwrap();
        assert!((min_x - 1.5).abs() < 1e-9);
        assert!((max_x - 2.5).abs() < 1e-9);
        assert!((min_y - 1.0).abs() < 1e-9);
        assert!((max_y - 3.0).abs() < 1e-9);
    }
}
