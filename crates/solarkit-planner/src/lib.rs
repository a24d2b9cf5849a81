//! # SolarKit Planner
//!
//! Panel layout and interactive placement for rooftop solar planning.
//! Takes a roof outline, a module type, and a grid configuration, fills
//! the roof with a regular grid of module rectangles, and lets the user
//! reposition placed panels with snapping and collision avoidance.
//!
//! ## Core Components
//!
//! - **Model**: roof surfaces, module specs, grid configs, exclusion
//!   zones, and panel instances
//! - **Placement Store**: the single owner and mutation surface for all
//!   committed layout state
//! - **Module Catalog**: registry of available module types
//! - **Layout Engine**: deterministic grid generation over an eroded,
//!   tilt-corrected roof region
//! - **Selection / Drag Controller**: multi-select, guide snapping,
//!   overlap separation, group moves, and keyboard nudges
//! - **Serialization**: versioned JSON project files
//!
//! ## Architecture
//!
//! ```text
//! RoofSurface + ModuleSpec + GridConfig
//!   └── LayoutEngine (generate) ── candidate rectangles
//!         └── exclusion filter (commit mode)
//!               └── PlacementStore (replace_panels)
//!
//! PlacementStore ⇄ DragController (begin/update/end, nudge)
//!   └── GuideLine feedback for the rendering layer
//! ```
//!
//! The engine is a library: pointer and keyboard events, rendering, and
//! any UI chrome live in the surrounding application.

pub mod catalog;
pub mod drag;
pub mod layout;
pub mod model;
pub mod selection;
pub mod serialization;
pub mod store;

pub use catalog::ModuleCatalog;
pub use drag::{DragController, DragSession, GuideAxis, GuideLine, NudgeDirection};
pub use layout::LayoutEngine;
pub use model::{
    CoverageRatio, ExclusionZone, GridAnchor, GridConfig, ModuleOrientation, ModuleSpec,
    PanelInstance, PanelRect, RoofProvenance, RoofSurface, ZoneKind,
};
pub use selection::PanelSelection;
pub use serialization::{ProjectFile, ProjectMetadata, RoofConfigEntry};
pub use store::{PlacementStore, RoofSummary};

// Re-export the geometry primitives callers need at the API boundary.
pub use solarkit_core::geometry::{Point, Polygon};
pub use solarkit_core::units::{GeoProjection, PixelScale};
