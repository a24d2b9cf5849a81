//! 2D geometry kernel for roof layout math.
//!
//! Everything here operates on planar coordinates in meters. The kernel is
//! stateless and never returns an error: degenerate inputs resolve to
//! `None` or to the unchanged input, so callers always have a defined
//! fallback.

use serde::{Deserialize, Serialize};

use crate::constants::{GEOM_EPSILON, TILT_CLAMP_DEG};

/// Represents a 2D point with X and Y coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    /// Creates a new point with the given X and Y coordinates.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Calculates the distance to another point.
    pub fn distance_to(&self, other: &Point) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// Rotates a point around a center by the given angle in degrees.
pub fn rotate_point(p: Point, center: Point, angle_deg: f64) -> Point {
    if angle_deg.abs() < GEOM_EPSILON {
        return p;
    }
    let angle_rad = angle_deg.to_radians();
    let cos_a = angle_rad.cos();
    let sin_a = angle_rad.sin();
    let dx = p.x - center.x;
    let dy = p.y - center.y;
    Point {
        x: center.x + dx * cos_a - dy * sin_a,
        y: center.y + dx * sin_a + dy * cos_a,
    }
}

/// A closed polygon given by its ordered boundary vertices.
///
/// The boundary is implicit between the last and first vertex. Vertex
/// order (clockwise or counter-clockwise) is preserved; operations that
/// care about winding read it from the signed area.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Polygon {
    vertices: Vec<Point>,
}

impl Polygon {
    /// Creates a polygon from ordered boundary vertices.
    pub fn new(vertices: Vec<Point>) -> Self {
        Self { vertices }
    }

    /// Builds the corner polygon of an oriented rectangle, rotated around
    /// its center by `angle_deg`.
    pub fn oriented_rect(center: Point, width: f64, height: f64, angle_deg: f64) -> Self {
        let hw = width / 2.0;
        let hh = height / 2.0;
        let corners = [
            Point::new(center.x - hw, center.y - hh),
            Point::new(center.x + hw, center.y - hh),
            Point::new(center.x + hw, center.y + hh),
            Point::new(center.x - hw, center.y + hh),
        ];
        Self {
            vertices: corners
                .iter()
                .map(|&c| rotate_point(c, center, angle_deg))
                .collect(),
        }
    }

    pub fn vertices(&self) -> &[Point] {
        &self.vertices
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Shoelace signed area. Positive for counter-clockwise vertex order
    /// in a y-up frame.
    pub fn signed_area(&self) -> f64 {
        let n = self.vertices.len();
        if n < 3 {
            return 0.0;
        }
        let mut sum = 0.0;
        for i in 0..n {
            let a = self.vertices[i];
            let b = self.vertices[(i + 1) % n];
            sum += a.x * b.y - b.x * a.y;
        }
        sum / 2.0
    }

    /// Absolute enclosed area.
    pub fn area(&self) -> f64 {
        self.signed_area().abs()
    }

    pub fn is_clockwise(&self) -> bool {
        self.signed_area() < 0.0
    }

    /// Area-weighted centroid. Falls back to the vertex mean for
    /// degenerate (near zero area) polygons.
    pub fn centroid(&self) -> Point {
        let n = self.vertices.len();
        if n == 0 {
            return Point::new(0.0, 0.0);
        }
        let a = self.signed_area();
        if a.abs() < GEOM_EPSILON {
            let (sx, sy) = self
                .vertices
                .iter()
                .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
            return Point::new(sx / n as f64, sy / n as f64);
        }
        let mut cx = 0.0;
        let mut cy = 0.0;
        for i in 0..n {
            let p = self.vertices[i];
            let q = self.vertices[(i + 1) % n];
            let w = p.x * q.y - q.x * p.y;
            cx += (p.x + q.x) * w;
            cy += (p.y + q.y) * w;
        }
        Point::new(cx / (6.0 * a), cy / (6.0 * a))
    }

    /// Axis-aligned bounding box as `(min_x, min_y, max_x, max_y)`.
    /// Returns `None` for an empty polygon.
    pub fn bounding_box(&self) -> Option<(f64, f64, f64, f64)> {
        if self.vertices.is_empty() {
            return None;
        }
        let mut min_x = f64::INFINITY;
        let mut min_y = f64::INFINITY;
        let mut max_x = f64::NEG_INFINITY;
        let mut max_y = f64::NEG_INFINITY;
        for p in &self.vertices {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        Some((min_x, min_y, max_x, max_y))
    }

    /// Angle of the longest boundary edge in degrees, normalized to
    /// `[0, 180)`. Returns `None` when the polygon has no usable edge.
    pub fn longest_edge_angle(&self) -> Option<f64> {
        let n = self.vertices.len();
        if n < 2 {
            return None;
        }
        let mut best_len = 0.0;
        let mut best_angle = None;
        for i in 0..n {
            let a = self.vertices[i];
            let b = self.vertices[(i + 1) % n];
            let len = a.distance_to(&b);
            if len > best_len && len > GEOM_EPSILON {
                best_len = len;
                let mut angle = (b.y - a.y).atan2(b.x - a.x).to_degrees();
                angle = angle.rem_euclid(180.0);
                best_angle = Some(angle);
            }
        }
        best_angle
    }

    /// True if all boundary turns have the same sense (collinear runs
    /// allowed).
    pub fn is_convex(&self) -> bool {
        let n = self.vertices.len();
        if n < 3 {
            return false;
        }
        let mut sign = 0.0f64;
        for i in 0..n {
            let a = self.vertices[i];
            let b = self.vertices[(i + 1) % n];
            let c = self.vertices[(i + 2) % n];
            let cross = (b.x - a.x) * (c.y - b.y) - (b.y - a.y) * (c.x - b.x);
            if cross.abs() < GEOM_EPSILON {
                continue;
            }
            if sign == 0.0 {
                sign = cross.signum();
            } else if cross.signum() != sign {
                return false;
            }
        }
        true
    }
}

/// Orthonormal basis for a rotated local frame.
///
/// `project` maps a world point to `(u, v)` coordinates in the frame;
/// `unproject` is its exact inverse (up to floating error) for any angle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocalFrame {
    ex: Point,
    ey: Point,
}

impl LocalFrame {
    /// Builds the frame whose u-axis points along `angle_deg`.
    pub fn new(angle_deg: f64) -> Self {
        let rad = angle_deg.to_radians();
        let (sin_a, cos_a) = rad.sin_cos();
        Self {
            ex: Point::new(cos_a, sin_a),
            ey: Point::new(-sin_a, cos_a),
        }
    }

    /// Frame rotation angle in degrees.
    pub fn angle_deg(&self) -> f64 {
        self.ex.y.atan2(self.ex.x).to_degrees()
    }

    pub fn project(&self, p: Point) -> (f64, f64) {
        (
            p.x * self.ex.x + p.y * self.ex.y,
            p.x * self.ey.x + p.y * self.ey.y,
        )
    }

    pub fn unproject(&self, u: f64, v: f64) -> Point {
        Point::new(
            u * self.ex.x + v * self.ey.x,
            u * self.ex.y + v * self.ey.y,
        )
    }

    /// Projects every vertex; the result lives in `(u, v)` coordinates.
    pub fn project_polygon(&self, polygon: &Polygon) -> Polygon {
        Polygon::new(
            polygon
                .vertices()
                .iter()
                .map(|&p| {
                    let (u, v) = self.project(p);
                    Point::new(u, v)
                })
                .collect(),
        )
    }
}

/// Shrinks a polygon inward by `margin`.
///
/// Each boundary edge is replaced by its inward-offset line (perpendicular
/// distance `margin`, inward per the polygon's winding) and consecutive
/// offset lines are intersected to form the new vertices.
///
/// Returns `None` when the input has fewer than three vertices, contains a
/// zero-length edge, or two consecutive offset directions are
/// near-parallel; callers fall back to the un-eroded polygon. A margin at
/// or past the inradius leaves no usable region and yields an empty
/// polygon.
pub fn erode(polygon: &Polygon, margin: f64) -> Option<Polygon> {
    let verts = polygon.vertices();
    let n = verts.len();
    if n < 3 {
        return None;
    }
    if margin <= 0.0 {
        return Some(polygon.clone());
    }

    // Interior lies left of each edge for counter-clockwise winding.
    let inward = if polygon.signed_area() >= 0.0 { 1.0 } else { -1.0 };

    let mut dirs: Vec<(f64, f64)> = Vec::with_capacity(n);
    let mut normals: Vec<(f64, f64)> = Vec::with_capacity(n);
    let mut bases: Vec<Point> = Vec::with_capacity(n);
    for i in 0..n {
        let a = verts[i];
        let b = verts[(i + 1) % n];
        let dx = b.x - a.x;
        let dy = b.y - a.y;
        let len = (dx * dx + dy * dy).sqrt();
        if len < GEOM_EPSILON {
            return None;
        }
        let d = (dx / len, dy / len);
        let normal = (-d.1 * inward, d.0 * inward);
        bases.push(Point::new(a.x + normal.0 * margin, a.y + normal.1 * margin));
        dirs.push(d);
        normals.push(normal);
    }

    let mut out = Vec::with_capacity(n);
    for i in 0..n {
        let j = (i + n - 1) % n;
        let cross = dirs[j].0 * dirs[i].1 - dirs[j].1 * dirs[i].0;
        if cross.abs() < GEOM_EPSILON {
            return None;
        }
        let wx = bases[i].x - bases[j].x;
        let wy = bases[i].y - bases[j].y;
        let t = (wx * dirs[i].1 - wy * dirs[i].0) / cross;
        out.push(Point::new(
            bases[j].x + t * dirs[j].0,
            bases[j].y + t * dirs[j].1,
        ));
    }

    // For a convex outline the true inset is the intersection of the
    // inward half-planes. When the margin reaches the inradius that
    // intersection is empty and some computed vertex lands outside an
    // offset half-plane. Concave outlines skip the check; their offset
    // polygon is approximate either way and downstream containment tests
    // gate actual placement.
    if polygon.is_convex() {
        for v in &out {
            for i in 0..n {
                let d = (v.x - bases[i].x) * normals[i].0 + (v.y - bases[i].y) * normals[i].1;
                if d < -1e-7 {
                    return Some(Polygon::new(Vec::new()));
                }
            }
        }
    }
    Some(Polygon::new(out))
}

/// Convex hull of a point set (monotone chain), counter-clockwise.
/// Collinear points on the hull boundary are dropped.
pub fn convex_hull(points: &[Point]) -> Vec<Point> {
    let mut pts: Vec<Point> = points.to_vec();
    pts.sort_by(|a, b| {
        a.x.partial_cmp(&b.x)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.y.partial_cmp(&b.y).unwrap_or(std::cmp::Ordering::Equal))
    });
    pts.dedup_by(|a, b| a.distance_to(b) < GEOM_EPSILON);
    let n = pts.len();
    if n < 3 {
        return pts;
    }

    let cross = |o: Point, a: Point, b: Point| -> f64 {
        (a.x - o.x) * (b.y - o.y) - (a.y - o.y) * (b.x - o.x)
    };

    let mut hull: Vec<Point> = Vec::with_capacity(2 * n);
    for &p in &pts {
        while hull.len() >= 2 && cross(hull[hull.len() - 2], hull[hull.len() - 1], p) <= 0.0 {
            hull.pop();
        }
        hull.push(p);
    }
    let lower_len = hull.len() + 1;
    for &p in pts.iter().rev() {
        while hull.len() >= lower_len && cross(hull[hull.len() - 2], hull[hull.len() - 1], p) <= 0.0
        {
            hull.pop();
        }
        hull.push(p);
    }
    hull.pop();
    hull
}

fn clamped_cos(tilt_deg: f64) -> f64 {
    let tilt = tilt_deg.clamp(0.0, 90.0);
    let floor = TILT_CLAMP_DEG.to_radians().cos();
    tilt.to_radians().cos().max(floor)
}

/// Converts a plan-view length to its true on-surface length for a roof
/// tilted by `tilt_deg`. The cosine is clamped past [`TILT_CLAMP_DEG`] so
/// grazing angles never blow the result up.
pub fn tilt_corrected_length(plan_length: f64, tilt_deg: f64) -> f64 {
    plan_length / clamped_cos(tilt_deg)
}

/// Converts an on-surface length to its plan-view length. Exact inverse of
/// [`tilt_corrected_length`] (same clamped cosine).
pub fn projected_length(surface_length: f64, tilt_deg: f64) -> f64 {
    surface_length * clamped_cos(tilt_deg)
}

/// Smallest angular difference between two direction angles in degrees,
/// accounting for 180° symmetry. The result is in `[0, 90]`.
pub fn parallel_angle_delta(a_deg: f64, b_deg: f64) -> f64 {
    let d = (a_deg - b_deg).rem_euclid(180.0);
    d.min(180.0 - d)
}

fn orientation(a: Point, b: Point, c: Point) -> f64 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

fn on_segment(a: Point, b: Point, p: Point) -> bool {
    p.x >= a.x.min(b.x) - GEOM_EPSILON
        && p.x <= a.x.max(b.x) + GEOM_EPSILON
        && p.y >= a.y.min(b.y) - GEOM_EPSILON
        && p.y <= a.y.max(b.y) + GEOM_EPSILON
}

/// True if segment `a1`-`a2` intersects segment `b1`-`b2`, including
/// colinear overlap and endpoint touching.
pub fn segments_intersect(a1: Point, a2: Point, b1: Point, b2: Point) -> bool {
    let d1 = orientation(b1, b2, a1);
    let d2 = orientation(b1, b2, a2);
    let d3 = orientation(a1, a2, b1);
    let d4 = orientation(a1, a2, b2);

    if ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
    {
        return true;
    }

    (d1.abs() < GEOM_EPSILON && on_segment(b1, b2, a1))
        || (d2.abs() < GEOM_EPSILON && on_segment(b1, b2, a2))
        || (d3.abs() < GEOM_EPSILON && on_segment(a1, a2, b1))
        || (d4.abs() < GEOM_EPSILON && on_segment(a1, a2, b2))
}
