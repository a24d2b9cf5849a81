//! Containment and intersection tests against exclusion zones.
//!
//! Two granularities are kept deliberately distinct: the cheap
//! center-point test runs on every pointer move during a drag, while the
//! exact full-footprint intersection runs once when a generated layout is
//! committed. Callers pick the mode; the tests themselves are pure.

use crate::geometry::{segments_intersect, Point, Polygon};

/// Even-odd ray-casting point-in-polygon test.
///
/// A horizontal ray is cast to the right of `point`; an odd crossing count
/// means inside. Points exactly on the boundary may land on either side.
pub fn point_in_polygon(point: Point, polygon: &Polygon) -> bool {
    let verts = polygon.vertices();
    let n = verts.len();
    if n < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let pi = verts[i];
        let pj = verts[j];
        if (pi.y > point.y) != (pj.y > point.y) {
            let x_cross = pi.x + (point.y - pi.y) * (pj.x - pi.x) / (pj.y - pi.y);
            if point.x < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// True if the two polygons share any area or touch.
///
/// Checks vertex containment in both directions, then every edge pair for
/// intersection (covering the colinear/touching case).
pub fn polygons_intersect(a: &Polygon, b: &Polygon) -> bool {
    if a.len() < 3 || b.len() < 3 {
        return false;
    }
    if a.vertices().iter().any(|&p| point_in_polygon(p, b)) {
        return true;
    }
    if b.vertices().iter().any(|&p| point_in_polygon(p, a)) {
        return true;
    }
    let av = a.vertices();
    let bv = b.vertices();
    for i in 0..av.len() {
        let a1 = av[i];
        let a2 = av[(i + 1) % av.len()];
        for k in 0..bv.len() {
            let b1 = bv[k];
            let b2 = bv[(k + 1) % bv.len()];
            if segments_intersect(a1, a2, b1, b2) {
                return true;
            }
        }
    }
    false
}

/// Cheap preview-mode test: is the candidate center inside any zone?
pub fn center_excluded(center: Point, zones: &[Polygon]) -> bool {
    zones.iter().any(|zone| point_in_polygon(center, zone))
}

/// Exact commit-mode test: does the candidate footprint touch any zone?
pub fn footprint_excluded(footprint: &Polygon, zones: &[Polygon]) -> bool {
    zones.iter().any(|zone| polygons_intersect(footprint, zone))
}
