//! Interactive drag/snap controller.
//!
//! Pointer-driven repositioning of one or many placed panels. A drag is
//! an explicit session: pointer-down captures the member set, every
//! member's starting center, and a static guide set; pointer moves snap
//! and validate against that session state; pointer release (or leaving
//! the surface) ends the session. Only one session runs at a time, and
//! guides are never refreshed mid-gesture.
//!
//! Validation policy is deliberately asymmetric: a single panel "sticks"
//! at its last valid position when a move is invalid, while a group move
//! is all-or-nothing: if any member would land outside the bound, inside
//! an exclusion zone, or on a non-member panel, no member moves.

use std::collections::HashMap;

use smallvec::SmallVec;
use tracing::{debug, trace};

use solarkit_core::constants::{
    GEOM_EPSILON, NUDGE_STEP_COARSE_PX, NUDGE_STEP_PX, PARALLEL_ANGLE_TOLERANCE_DEG,
    SEPARATION_PASSES, SNAP_TOLERANCE_PX,
};
use solarkit_core::exclusion::{center_excluded, point_in_polygon};
use solarkit_core::geometry::{erode, parallel_angle_delta, LocalFrame, Point, Polygon};
use solarkit_core::units::PixelScale;

use crate::model::PanelInstance;
use crate::selection::PanelSelection;
use crate::store::PlacementStore;

/// Axis of a snap guide in the drag frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuideAxis {
    U,
    V,
}

/// A full-span guide line emitted while an axis is snapped. Rendering
/// feedback only; never persisted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GuideLine {
    pub axis: GuideAxis,
    /// Snapped value in drag-frame coordinates.
    pub value: f64,
    /// World-space endpoints spanning the roof bound.
    pub start: Point,
    pub end: Point,
}

/// A neighboring panel reduced to its axis-aligned box in the drag frame.
/// Exact for parallel panels; a conservative bound for rotated ones.
#[derive(Debug, Clone, Copy)]
struct FrameRect {
    cu: f64,
    cv: f64,
    half_u: f64,
    half_v: f64,
    parallel: bool,
}

fn frame_rect_of(frame: &LocalFrame, panel: &PanelInstance, drag_angle_deg: f64) -> FrameRect {
    let parallel = parallel_angle_delta(panel.angle_deg, drag_angle_deg)
        <= PARALLEL_ANGLE_TOLERANCE_DEG;
    let (mut min_u, mut min_v) = (f64::INFINITY, f64::INFINITY);
    let (mut max_u, mut max_v) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
    for &corner in panel.rect().corners().vertices() {
        let (u, v) = frame.project(corner);
        min_u = min_u.min(u);
        min_v = min_v.min(v);
        max_u = max_u.max(u);
        max_v = max_v.max(v);
    }
    FrameRect {
        cu: (min_u + max_u) / 2.0,
        cv: (min_v + max_v) / 2.0,
        half_u: (max_u - min_u) / 2.0,
        half_v: (max_v - min_v) / 2.0,
        parallel,
    }
}

fn sign_of(x: f64) -> f64 {
    if x < 0.0 {
        -1.0
    } else {
        1.0
    }
}

/// Per-session geometry shared by drag moves and nudges: the drag frame,
/// the margin-eroded bound, the roof's zones, and the non-member panels.
#[derive(Debug, Clone)]
struct DragContext {
    frame: LocalFrame,
    /// Margin-eroded roof outline in frame coordinates. Falls back to the
    /// un-eroded outline when erosion is degenerate.
    region: Polygon,
    bbox: (f64, f64, f64, f64),
    /// Exclusion-zone polygons in world coordinates.
    zones: Vec<Polygon>,
    others: Vec<FrameRect>,
    gap: f64,
}

impl DragContext {
    fn build(
        store: &PlacementStore,
        roof_id: u64,
        members: &[u64],
        drag_angle_deg: f64,
    ) -> Option<Self> {
        let roof = store.roof(roof_id)?;
        let config = store.config_for(roof_id).normalized();
        let frame = LocalFrame::new(drag_angle_deg);
        let projected = frame.project_polygon(&roof.boundary);
        let region = match erode(&projected, config.margin_m) {
            Some(eroded) if eroded.len() >= 3 => eroded,
            // Degenerate or fully consumed: bound against the outline.
            _ => projected,
        };
        let bbox = region.bounding_box()?;
        let zones = store
            .zones_on_roof(roof_id)
            .map(|zone| zone.polygon.clone())
            .collect();
        let others = store
            .panels_on_roof(roof_id)
            .filter(|panel| !members.contains(&panel.id))
            .map(|panel| frame_rect_of(&frame, panel, drag_angle_deg))
            .collect();
        Some(Self {
            frame,
            region,
            bbox,
            zones,
            others,
            gap: config.spacing_m,
        })
    }

    fn contains(&self, u: f64, v: f64) -> bool {
        point_in_polygon(Point::new(u, v), &self.region)
    }

    fn center_clear(&self, world: Point) -> bool {
        !center_excluded(world, &self.zones)
    }

    /// True if a box at `(cu, cv)` with the given half extents keeps at
    /// least the spacing gap to every non-member panel.
    fn clear_of_others(&self, cu: f64, cv: f64, half_u: f64, half_v: f64) -> bool {
        !self.others.iter().any(|o| {
            (cu - o.cu).abs() < half_u + o.half_u + self.gap - GEOM_EPSILON
                && (cv - o.cv).abs() < half_v + o.half_v + self.gap - GEOM_EPSILON
        })
    }
}

/// Static snap targets collected once at session start.
#[derive(Debug, Clone, Default)]
struct GuideSet {
    u: Vec<f64>,
    v: Vec<f64>,
}

impl GuideSet {
    fn build(ctx: &DragContext) -> Self {
        let mut set = GuideSet::default();
        for o in ctx.others.iter().filter(|o| o.parallel) {
            set.u.extend([o.cu, o.cu - o.half_u, o.cu + o.half_u]);
            set.v.extend([o.cv, o.cv - o.half_v, o.cv + o.half_v]);
        }
        let (umin, vmin, umax, vmax) = ctx.bbox;
        set.u.extend([umin, umax]);
        set.v.extend([vmin, vmax]);
        set
    }

    fn nearest(values: &[f64], target: f64, tolerance: f64) -> Option<f64> {
        let mut best = None;
        let mut best_dist = tolerance;
        for &guide in values {
            let dist = (guide - target).abs();
            if dist <= best_dist {
                best_dist = dist;
                best = Some(guide);
            }
        }
        best
    }
}

/// Arrow-key nudge direction in world axes (y up).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NudgeDirection {
    Left,
    Right,
    Up,
    Down,
}

impl NudgeDirection {
    fn unit(&self) -> (f64, f64) {
        match self {
            NudgeDirection::Left => (-1.0, 0.0),
            NudgeDirection::Right => (1.0, 0.0),
            NudgeDirection::Up => (0.0, 1.0),
            NudgeDirection::Down => (0.0, -1.0),
        }
    }
}

/// Live state of one drag gesture.
#[derive(Debug, Clone)]
pub struct DragSession {
    roof_id: u64,
    /// Member panel ids; the first is the anchor.
    members: Vec<u64>,
    origins: HashMap<u64, Point>,
    member_halves: HashMap<u64, (f64, f64)>,
    anchor: u64,
    anchor_half: (f64, f64),
    /// Anchor center minus pointer position at pointer-down.
    grab_offset: (f64, f64),
    guides: GuideSet,
    ctx: DragContext,
    scale: PixelScale,
    active_guides: SmallVec<[GuideLine; 2]>,
}

impl DragSession {
    pub fn roof_id(&self) -> u64 {
        self.roof_id
    }

    pub fn members(&self) -> &[u64] {
        &self.members
    }

    pub fn anchor(&self) -> u64 {
        self.anchor
    }
}

#[derive(Debug, Clone)]
enum DragState {
    Idle,
    Dragging(DragSession),
}

/// Two-state controller for pointer-driven panel moves.
///
/// `begin` → `update`* → `end`. A `begin` while a session is active is
/// ignored; `end` is unconditional. Keyboard nudges are independent of
/// the session state.
#[derive(Debug, Clone, Default)]
pub struct DragController {
    state: DragState,
}

impl Default for DragState {
    fn default() -> Self {
        DragState::Idle
    }
}

impl DragController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging(_))
    }

    pub fn session(&self) -> Option<&DragSession> {
        match &self.state {
            DragState::Dragging(session) => Some(session),
            DragState::Idle => None,
        }
    }

    /// Guide lines for the currently snapped axes. Empty when idle or
    /// unsnapped.
    pub fn active_guides(&self) -> &[GuideLine] {
        match &self.state {
            DragState::Dragging(session) => &session.active_guides,
            DragState::Idle => &[],
        }
    }

    /// Starts a drag session on pointer-down.
    ///
    /// The selection's first panel is the anchor; members are limited to
    /// panels on the anchor's roof. Returns `false` (and stays idle) when
    /// there is nothing to drag, and `false` (leaving the running session
    /// alone) when a session is already active.
    pub fn begin(
        &mut self,
        store: &PlacementStore,
        selection: &PanelSelection,
        pointer: Point,
        scale: PixelScale,
    ) -> bool {
        if self.is_dragging() {
            return false;
        }
        let Some(anchor_id) = selection.anchor() else {
            return false;
        };
        let Some(anchor) = store.panel(anchor_id) else {
            return false;
        };
        let roof_id = anchor.roof_id;
        let members: Vec<u64> = selection
            .ids()
            .iter()
            .copied()
            .filter(|&id| store.panel(id).is_some_and(|p| p.roof_id == roof_id))
            .collect();
        let Some(ctx) = DragContext::build(store, roof_id, &members, anchor.angle_deg) else {
            return false;
        };
        let guides = GuideSet::build(&ctx);

        let mut origins = HashMap::with_capacity(members.len());
        let mut member_halves = HashMap::with_capacity(members.len());
        for &id in &members {
            // Members were filtered against the store above.
            if let Some(panel) = store.panel(id) {
                origins.insert(id, panel.center);
                let rect = frame_rect_of(&ctx.frame, panel, anchor.angle_deg);
                member_halves.insert(id, (rect.half_u, rect.half_v));
            }
        }

        debug!(
            roof = roof_id,
            anchor = anchor_id,
            members = members.len(),
            guides_u = guides.u.len(),
            guides_v = guides.v.len(),
            "drag session started"
        );
        self.state = DragState::Dragging(DragSession {
            roof_id,
            members,
            origins,
            member_halves,
            anchor: anchor_id,
            anchor_half: (anchor.width_m / 2.0, anchor.height_m / 2.0),
            grab_offset: (anchor.center.x - pointer.x, anchor.center.y - pointer.y),
            guides,
            ctx,
            scale,
            active_guides: SmallVec::new(),
        });
        true
    }

    /// Handles one pointer move. Returns `true` when the store was
    /// updated; an invalid candidate leaves the panels where they are.
    pub fn update(&mut self, store: &mut PlacementStore, pointer: Point) -> bool {
        let DragState::Dragging(session) = &mut self.state else {
            return false;
        };

        let candidate = Point::new(
            pointer.x + session.grab_offset.0,
            pointer.y + session.grab_offset.1,
        );
        let (mut cu, mut cv) = session.ctx.frame.project(candidate);
        let tolerance = session.scale.to_meters(SNAP_TOLERANCE_PX);

        session.active_guides.clear();
        if let Some(guide) = GuideSet::nearest(&session.guides.u, cu, tolerance) {
            cu = guide;
            session
                .active_guides
                .push(full_span_guide(GuideAxis::U, guide, &session.ctx));
        }
        if let Some(guide) = GuideSet::nearest(&session.guides.v, cv, tolerance) {
            cv = guide;
            session
                .active_guides
                .push(full_span_guide(GuideAxis::V, guide, &session.ctx));
        }

        if session.members.len() == 1 {
            let (hu, hv) = session.anchor_half;
            for _ in 0..SEPARATION_PASSES {
                let mut pushed = false;
                for o in session.ctx.others.iter().filter(|o| o.parallel) {
                    let du = cu - o.cu;
                    let dv = cv - o.cv;
                    let lim_u = hu + o.half_u + session.ctx.gap;
                    let lim_v = hv + o.half_v + session.ctx.gap;
                    if du.abs() < lim_u - GEOM_EPSILON && dv.abs() < lim_v - GEOM_EPSILON {
                        let pen_u = lim_u - du.abs();
                        let pen_v = lim_v - dv.abs();
                        if pen_u <= pen_v {
                            cu += sign_of(du) * pen_u;
                        } else {
                            cv += sign_of(dv) * pen_v;
                        }
                        pushed = true;
                    }
                }
                if !pushed {
                    break;
                }
            }

            let world = session.ctx.frame.unproject(cu, cv);
            if session.ctx.contains(cu, cv) && session.ctx.center_clear(world) {
                trace!(panel = session.anchor, "drag move committed");
                return store.set_panel_center(session.anchor, world).is_ok();
            }
            // Invalid: the panel sticks at its last valid position.
            trace!(panel = session.anchor, "drag move rejected");
            return false;
        }

        // Group move: the snapped anchor drives a rigid translation of
        // every member from its session-start position.
        let snapped = session.ctx.frame.unproject(cu, cv);
        let Some(&anchor_origin) = session.origins.get(&session.anchor) else {
            return false;
        };
        let delta = (snapped.x - anchor_origin.x, snapped.y - anchor_origin.y);

        let mut moved: SmallVec<[(u64, Point); 8]> = SmallVec::new();
        for &id in &session.members {
            let Some(&origin) = session.origins.get(&id) else {
                return false;
            };
            moved.push((id, Point::new(origin.x + delta.0, origin.y + delta.1)));
        }

        for &(id, center) in &moved {
            let (mu, mv) = session.ctx.frame.project(center);
            let Some(&(hu, hv)) = session.member_halves.get(&id) else {
                return false;
            };
            if !session.ctx.contains(mu, mv)
                || !session.ctx.center_clear(center)
                || !session.ctx.clear_of_others(mu, mv, hu, hv)
            {
                trace!(panel = id, "group move rejected; no member moves");
                return false;
            }
        }
        for &(id, center) in &moved {
            let _ = store.set_panel_center(id, center);
        }
        trace!(members = moved.len(), "group move committed");
        true
    }

    /// Ends the session on pointer release or when the pointer leaves the
    /// interactive surface. Unconditional; there is no cancel-and-restore.
    pub fn end(&mut self) {
        if self.is_dragging() {
            debug!("drag session ended");
        }
        self.state = DragState::Idle;
    }

    /// Translates the selection by a fixed step, converted from screen
    /// pixels exactly like pointer movement. All-or-nothing for a
    /// multi-selection; a single panel simply stays put when the step is
    /// invalid.
    pub fn nudge(
        store: &mut PlacementStore,
        selection: &PanelSelection,
        direction: NudgeDirection,
        coarse: bool,
        scale: PixelScale,
    ) -> bool {
        let Some(anchor_id) = selection.anchor() else {
            return false;
        };
        let Some(anchor) = store.panel(anchor_id) else {
            return false;
        };
        let roof_id = anchor.roof_id;
        let members: Vec<u64> = selection
            .ids()
            .iter()
            .copied()
            .filter(|&id| store.panel(id).is_some_and(|p| p.roof_id == roof_id))
            .collect();
        let Some(ctx) = DragContext::build(store, roof_id, &members, anchor.angle_deg) else {
            return false;
        };

        let step_px = if coarse {
            NUDGE_STEP_COARSE_PX
        } else {
            NUDGE_STEP_PX
        };
        let step = scale.to_meters(step_px);
        let (dx, dy) = direction.unit();
        let delta = (dx * step, dy * step);

        let mut moved: SmallVec<[(u64, Point, (f64, f64)); 8]> = SmallVec::new();
        for &id in &members {
            let Some(panel) = store.panel(id) else {
                return false;
            };
            let rect = frame_rect_of(&ctx.frame, panel, anchor.angle_deg);
            moved.push((
                id,
                Point::new(panel.center.x + delta.0, panel.center.y + delta.1),
                (rect.half_u, rect.half_v),
            ));
        }

        for &(_, center, (hu, hv)) in &moved {
            let (mu, mv) = ctx.frame.project(center);
            if !ctx.contains(mu, mv)
                || !ctx.center_clear(center)
                || !ctx.clear_of_others(mu, mv, hu, hv)
            {
                return false;
            }
        }
        for &(id, center, _) in &moved {
            let _ = store.set_panel_center(id, center);
        }
        trace!(members = moved.len(), ?direction, coarse, "nudge applied");
        true
    }
}

fn full_span_guide(axis: GuideAxis, value: f64, ctx: &DragContext) -> GuideLine {
    let (umin, vmin, umax, vmax) = ctx.bbox;
    let (start, end) = match axis {
        GuideAxis::U => (ctx.frame.unproject(value, vmin), ctx.frame.unproject(value, vmax)),
        GuideAxis::V => (ctx.frame.unproject(umin, value), ctx.frame.unproject(umax, value)),
    };
    GuideLine {
        axis,
        value,
        start,
        end,
    }
}
