//! Grid layout engine.
//!
//! Fills a roof surface with a regular grid of module rectangles:
//! project the roof into the grid-angle frame, erode by the margin, step
//! cells across the eroded region, keep the cells whose corners stay
//! inside, drop the ones an exclusion zone touches, and unproject the
//! survivors back to the working plane.
//!
//! Generation is a pure, deterministic function of its inputs; committing
//! the result to the store is a separate, explicit step.

use tracing::{debug, warn};

use solarkit_core::constants::{CONTAINMENT_EPSILON, GEOM_EPSILON, GRID_ANGLE_FALLBACK_DEG};
use solarkit_core::error::StoreError;
use solarkit_core::exclusion::{footprint_excluded, point_in_polygon};
use solarkit_core::geometry::{
    erode, parallel_angle_delta, projected_length, LocalFrame, Point, Polygon,
};

use crate::catalog::ModuleCatalog;
use crate::model::{ExclusionZone, GridAnchor, GridConfig, ModuleSpec, PanelRect, RoofSurface};
use crate::store::PlacementStore;

pub struct LayoutEngine;

impl LayoutEngine {
    /// Resolves the grid angle for a roof: the azimuth-derived canvas
    /// angle, unless it diverges from the outline's longest edge by more
    /// than [`GRID_ANGLE_FALLBACK_DEG`]. Hand-drawn outlines rarely
    /// match the imported azimuth exactly, and the outline wins. The
    /// config's rotation offset is added afterwards.
    pub fn resolve_grid_angle(roof: &RoofSurface, config: &GridConfig) -> f64 {
        let base = match roof.boundary.longest_edge_angle() {
            Some(edge) if parallel_angle_delta(roof.azimuth_deg, edge) > GRID_ANGLE_FALLBACK_DEG => {
                warn!(
                    roof = roof.id,
                    azimuth = roof.azimuth_deg,
                    longest_edge = edge,
                    "azimuth diverges from outline; using longest-edge angle"
                );
                edge
            }
            _ => roof.azimuth_deg,
        };
        base + config.rotation_offset_deg
    }

    /// Module footprint in plan meters as `(across_slope, along_fall)`:
    /// orientation picks the sides, then the fall axis shrinks by the
    /// tilt projection. The across axis is tilt-invariant.
    fn resolve_footprint(module: &ModuleSpec, config: &GridConfig, tilt_deg: f64) -> (f64, f64) {
        let (across, along) = config.orientation.footprint(module);
        (across, projected_length(along, tilt_deg))
    }

    /// Starting offset for one axis from its anchor rule plus the
    /// fractional phase shift.
    fn axis_start(
        anchor: GridAnchor,
        min: f64,
        max: f64,
        total_extent: f64,
        phase: f64,
        cell: f64,
    ) -> f64 {
        let base = match anchor {
            GridAnchor::Start => min,
            GridAnchor::Center => (min + max) / 2.0 - total_extent / 2.0,
            GridAnchor::End => max - total_extent,
        };
        base + phase * cell
    }

    /// Number of cells that fit in `extent`, with the trailing cell not
    /// needing its spacing gap.
    fn axis_count(extent: f64, footprint: f64, cell: f64) -> usize {
        if footprint > extent + GEOM_EPSILON || cell <= GEOM_EPSILON {
            return 0;
        }
        ((extent - footprint) / cell).floor() as usize + 1
    }

    /// Generates the candidate rectangle set for one roof.
    ///
    /// Identical inputs always yield the identical ordered output. Every
    /// degenerate input (too-large margin, oversized module, collapsed
    /// outline) yields an empty list, never an error.
    pub fn generate(
        roof: &RoofSurface,
        module: &ModuleSpec,
        config: &GridConfig,
        zones: &[ExclusionZone],
    ) -> Vec<PanelRect> {
        let config = config.normalized();
        if roof.boundary.len() < 3 {
            return Vec::new();
        }

        let angle = Self::resolve_grid_angle(roof, &config);
        let frame = LocalFrame::new(angle);
        let projected = frame.project_polygon(&roof.boundary);

        let region = match erode(&projected, config.margin_m) {
            Some(eroded) if eroded.len() >= 3 => eroded,
            Some(_) => {
                // Margin at or past the inradius: nothing fits.
                debug!(roof = roof.id, margin = config.margin_m, "margin consumed the roof");
                return Vec::new();
            }
            None => {
                warn!(roof = roof.id, "margin erosion degenerate; using un-eroded outline");
                projected.clone()
            }
        };

        let Some((umin, vmin, umax, vmax)) = region.bounding_box() else {
            return Vec::new();
        };

        let (fw, fh) = Self::resolve_footprint(module, &config, roof.tilt_deg);
        if fw <= GEOM_EPSILON || fh <= GEOM_EPSILON {
            return Vec::new();
        }
        let cell_u = fw + config.spacing_m;
        let cell_v = fh + config.spacing_m;

        let extent_u = umax - umin;
        let extent_v = vmax - vmin;
        let count_u = Self::axis_count(extent_u, fw, cell_u);
        let count_v = Self::axis_count(extent_v, fh, cell_v);
        if count_u == 0 || count_v == 0 {
            debug!(roof = roof.id, "no cell fits the eroded extent");
            return Vec::new();
        }

        let total_u = count_u as f64 * cell_u - config.spacing_m;
        let total_v = count_v as f64 * cell_v - config.spacing_m;
        let start_u = Self::axis_start(config.anchor_u, umin, umax, total_u, config.phase_u, cell_u);
        let start_v = Self::axis_start(config.anchor_v, vmin, vmax, total_v, config.phase_v, cell_v);

        let v_limit = vmin + config.coverage.fraction() * extent_v;
        let zone_polys: Vec<Polygon> = zones.iter().map(|z| z.polygon.clone()).collect();

        let mut accepted = Vec::new();
        let mut rejected_outline = 0usize;
        let mut rejected_zone = 0usize;

        for row in 0..count_v {
            let v = start_v + row as f64 * cell_v;
            if v + fh > v_limit + GEOM_EPSILON {
                break;
            }
            for col in 0..count_u {
                let u = start_u + col as f64 * cell_u;
                if u + fw > umax + GEOM_EPSILON {
                    break;
                }

                // Corners pulled in by a hair so cells flush with the
                // eroded boundary survive the ray-cast test.
                let e = CONTAINMENT_EPSILON;
                let corners = [
                    Point::new(u + e, v + e),
                    Point::new(u + fw - e, v + e),
                    Point::new(u + fw - e, v + fh - e),
                    Point::new(u + e, v + fh - e),
                ];
                if !corners.iter().all(|&c| point_in_polygon(c, &region)) {
                    rejected_outline += 1;
                    continue;
                }

                let center = frame.unproject(u + fw / 2.0, v + fh / 2.0);
                let footprint = Polygon::oriented_rect(center, fw, fh, angle);
                if footprint_excluded(&footprint, &zone_polys) {
                    rejected_zone += 1;
                    continue;
                }

                accepted.push(PanelRect::new(center, fw, fh, angle));
            }
        }

        debug!(
            roof = roof.id,
            angle,
            accepted = accepted.len(),
            rejected_outline,
            rejected_zone,
            "grid generation finished"
        );
        accepted
    }

    /// Generates a layout for a roof from its effective config and
    /// replaces the roof's committed panel list with the result.
    ///
    /// A config without a selected module is a no-op. Returns the new
    /// panel ids.
    pub fn commit(
        store: &mut PlacementStore,
        catalog: &ModuleCatalog,
        roof_id: u64,
    ) -> Result<Vec<u64>, StoreError> {
        let roof = store
            .roof(roof_id)
            .cloned()
            .ok_or(StoreError::UnknownRoof { id: roof_id })?;
        let config = store.config_for(roof_id).clone();
        let Some(module_id) = config.module_id.clone() else {
            debug!(roof = roof_id, "no module selected; layout commit is a no-op");
            return Ok(Vec::new());
        };
        let module = catalog
            .get(&module_id)
            .cloned()
            .ok_or(StoreError::UnknownModule { id: module_id })?;
        let zones: Vec<ExclusionZone> = store.zones_on_roof(roof_id).cloned().collect();

        let rects = Self::generate(&roof, &module, &config, &zones);
        store.replace_panels(roof_id, &rects, &module.id)
    }
}
