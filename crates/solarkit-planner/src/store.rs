//! Placement store: the owner of all committed layout state.
//!
//! The store holds every roof surface, grid configuration, exclusion
//! zone, and panel instance, and is the only component allowed to mutate
//! them. The geometry kernel, the exclusion filter, and the layout engine
//! are pure functions over values handed to them.
//!
//! Changing a roof or a grid config does NOT regenerate that roof's
//! panels. Regeneration is an explicit caller action (run the layout
//! engine and apply the result with [`PlacementStore::replace_panels`]);
//! a stale panel list after a geometry edit is the caller's to resolve.

use std::collections::{BTreeMap, HashMap};

use tracing::debug;

use solarkit_core::error::StoreError;
use solarkit_core::geometry::{Point, Polygon};

use crate::catalog::ModuleCatalog;
use crate::model::{
    ExclusionZone, GridConfig, PanelInstance, PanelRect, RoofProvenance, RoofSurface, ZoneKind,
};

/// Aggregate numbers for one roof's committed layout, for summary and
/// quantity displays.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RoofSummary {
    pub panel_count: usize,
    pub installed_watts: f64,
}

/// Owns all collections of the placement data model.
///
/// Entity ids are `u64` values from a single monotonic generator shared
/// across entity kinds. Iteration over any collection is in ascending id
/// order, which keeps read-out deterministic.
#[derive(Debug, Clone, Default)]
pub struct PlacementStore {
    next_id: u64,
    roofs: BTreeMap<u64, RoofSurface>,
    global_config: GridConfig,
    roof_configs: HashMap<u64, GridConfig>,
    zones: BTreeMap<u64, ExclusionZone>,
    panels: BTreeMap<u64, PanelInstance>,
}

impl PlacementStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Generates the next unique entity id.
    pub fn generate_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    /// Makes sure future generated ids start after `id`. Used when
    /// restoring a saved project.
    pub fn set_next_id(&mut self, id: u64) {
        self.next_id = self.next_id.max(id);
    }

    pub fn next_id(&self) -> u64 {
        self.next_id
    }

    // --- Roof surfaces ---

    /// Adds a roof surface and returns its id.
    pub fn add_roof(
        &mut self,
        boundary: Polygon,
        azimuth_deg: f64,
        tilt_deg: f64,
        provenance: RoofProvenance,
    ) -> u64 {
        let id = self.generate_id();
        self.roofs.insert(
            id,
            RoofSurface::new(id, boundary, azimuth_deg, tilt_deg, provenance),
        );
        id
    }

    pub fn roof(&self, id: u64) -> Option<&RoofSurface> {
        self.roofs.get(&id)
    }

    pub fn roofs(&self) -> impl Iterator<Item = &RoofSurface> {
        self.roofs.values()
    }

    /// Replaces an existing roof surface. The panel list is left alone;
    /// see the module docs about explicit regeneration.
    pub fn update_roof(&mut self, roof: RoofSurface) -> Result<(), StoreError> {
        if !self.roofs.contains_key(&roof.id) {
            return Err(StoreError::UnknownRoof { id: roof.id });
        }
        self.roofs.insert(roof.id, roof);
        Ok(())
    }

    /// Removes a roof and everything scoped to it: its config override,
    /// its exclusion zones, and its panels.
    pub fn remove_roof(&mut self, id: u64) -> Result<(), StoreError> {
        if self.roofs.remove(&id).is_none() {
            return Err(StoreError::UnknownRoof { id });
        }
        self.roof_configs.remove(&id);
        let zones_before = self.zones.len();
        self.zones.retain(|_, zone| zone.roof_id != id);
        let panels_before = self.panels.len();
        self.panels.retain(|_, panel| panel.roof_id != id);
        debug!(
            roof = id,
            zones = zones_before - self.zones.len(),
            panels = panels_before - self.panels.len(),
            "removed roof and scoped entities"
        );
        Ok(())
    }

    /// Restores a roof with its original id (project loading).
    pub fn restore_roof(&mut self, roof: RoofSurface) {
        self.set_next_id(roof.id);
        self.roofs.insert(roof.id, roof);
    }

    // --- Grid configuration ---

    pub fn global_config(&self) -> &GridConfig {
        &self.global_config
    }

    pub fn set_global_config(&mut self, config: GridConfig) {
        self.global_config = config;
    }

    /// Sets a per-roof override of the global grid config.
    pub fn set_roof_config(&mut self, roof_id: u64, config: GridConfig) -> Result<(), StoreError> {
        if !self.roofs.contains_key(&roof_id) {
            return Err(StoreError::UnknownRoof { id: roof_id });
        }
        self.roof_configs.insert(roof_id, config);
        Ok(())
    }

    /// Drops a per-roof override, falling back to the global config.
    pub fn clear_roof_config(&mut self, roof_id: u64) {
        self.roof_configs.remove(&roof_id);
    }

    /// The effective grid config for a roof: its override if present,
    /// otherwise the global one.
    pub fn config_for(&self, roof_id: u64) -> &GridConfig {
        self.roof_configs
            .get(&roof_id)
            .unwrap_or(&self.global_config)
    }

    pub fn roof_configs(&self) -> impl Iterator<Item = (u64, &GridConfig)> {
        self.roof_configs.iter().map(|(&id, cfg)| (id, cfg))
    }

    // --- Exclusion zones ---

    /// Adds an exclusion zone to a roof and returns its id.
    pub fn add_zone(&mut self, roof_id: u64, polygon: Polygon) -> Result<u64, StoreError> {
        if !self.roofs.contains_key(&roof_id) {
            return Err(StoreError::UnknownRoof { id: roof_id });
        }
        let id = self.generate_id();
        self.zones.insert(
            id,
            ExclusionZone {
                id,
                roof_id,
                polygon,
                kind: ZoneKind::Excluded,
            },
        );
        Ok(id)
    }

    pub fn zone(&self, id: u64) -> Option<&ExclusionZone> {
        self.zones.get(&id)
    }

    /// Replaces an existing zone's polygon (zone redrawn by the user).
    pub fn update_zone(&mut self, id: u64, polygon: Polygon) -> Result<(), StoreError> {
        match self.zones.get_mut(&id) {
            Some(zone) => {
                zone.polygon = polygon;
                Ok(())
            }
            None => Err(StoreError::UnknownZone { id }),
        }
    }

    pub fn remove_zone(&mut self, id: u64) -> Result<(), StoreError> {
        self.zones
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::UnknownZone { id })
    }

    pub fn zones(&self) -> impl Iterator<Item = &ExclusionZone> {
        self.zones.values()
    }

    pub fn zones_on_roof(&self, roof_id: u64) -> impl Iterator<Item = &ExclusionZone> {
        self.zones.values().filter(move |z| z.roof_id == roof_id)
    }

    /// Restores a zone with its original id (project loading).
    pub fn restore_zone(&mut self, zone: ExclusionZone) {
        self.set_next_id(zone.id);
        self.zones.insert(zone.id, zone);
    }

    // --- Panels ---

    /// Adds a single panel placement and returns its id.
    pub fn add_panel(
        &mut self,
        roof_id: u64,
        rect: PanelRect,
        module_id: impl Into<String>,
    ) -> Result<u64, StoreError> {
        if !self.roofs.contains_key(&roof_id) {
            return Err(StoreError::UnknownRoof { id: roof_id });
        }
        let id = self.generate_id();
        self.panels.insert(
            id,
            PanelInstance {
                id,
                roof_id,
                center: rect.center,
                width_m: rect.width_m,
                height_m: rect.height_m,
                angle_deg: rect.angle_deg,
                module_id: module_id.into(),
            },
        );
        Ok(id)
    }

    pub fn panel(&self, id: u64) -> Option<&PanelInstance> {
        self.panels.get(&id)
    }

    pub fn remove_panel(&mut self, id: u64) -> Result<(), StoreError> {
        self.panels
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::UnknownPanel { id })
    }

    pub fn panels(&self) -> impl Iterator<Item = &PanelInstance> {
        self.panels.values()
    }

    pub fn panels_on_roof(&self, roof_id: u64) -> impl Iterator<Item = &PanelInstance> {
        self.panels.values().filter(move |p| p.roof_id == roof_id)
    }

    pub fn panel_count(&self, roof_id: u64) -> usize {
        self.panels_on_roof(roof_id).count()
    }

    /// Moves a panel's center. Used by the drag controller to commit a
    /// validated move.
    pub fn set_panel_center(&mut self, id: u64, center: Point) -> Result<(), StoreError> {
        match self.panels.get_mut(&id) {
            Some(panel) => {
                panel.center = center;
                Ok(())
            }
            None => Err(StoreError::UnknownPanel { id }),
        }
    }

    /// Replaces a roof's entire panel list with freshly generated
    /// rectangles (layout commit / regeneration). Returns the new ids.
    pub fn replace_panels(
        &mut self,
        roof_id: u64,
        rects: &[PanelRect],
        module_id: &str,
    ) -> Result<Vec<u64>, StoreError> {
        if !self.roofs.contains_key(&roof_id) {
            return Err(StoreError::UnknownRoof { id: roof_id });
        }
        let removed = self.panels.len();
        self.panels.retain(|_, panel| panel.roof_id != roof_id);
        let removed = removed - self.panels.len();

        let mut ids = Vec::with_capacity(rects.len());
        for rect in rects {
            ids.push(self.add_panel(roof_id, *rect, module_id)?);
        }
        debug!(
            roof = roof_id,
            removed,
            added = ids.len(),
            "replaced panel list"
        );
        Ok(ids)
    }

    /// Duplicates a panel at an offset from the original. The copy keeps
    /// the original's dimensions, angle, and module reference.
    pub fn duplicate_panel(&mut self, id: u64, offset: (f64, f64)) -> Result<u64, StoreError> {
        let source = self
            .panels
            .get(&id)
            .cloned()
            .ok_or(StoreError::UnknownPanel { id })?;
        let new_id = self.generate_id();
        let mut copy = source;
        copy.id = new_id;
        copy.center = Point::new(copy.center.x + offset.0, copy.center.y + offset.1);
        self.panels.insert(new_id, copy);
        Ok(new_id)
    }

    /// Restores a panel with its original id (project loading). Stored
    /// positions are authoritative; nothing is regenerated.
    pub fn restore_panel(&mut self, panel: PanelInstance) {
        self.set_next_id(panel.id);
        self.panels.insert(panel.id, panel);
    }

    /// Panel count and installed power for one roof, resolved through the
    /// catalog. Panels referencing an unknown module count toward the
    /// panel total but contribute no watts.
    pub fn roof_summary(&self, roof_id: u64, catalog: &ModuleCatalog) -> RoofSummary {
        let mut summary = RoofSummary::default();
        for panel in self.panels_on_roof(roof_id) {
            summary.panel_count += 1;
            if let Some(spec) = catalog.get(&panel.module_id) {
                summary.installed_watts += spec.rated_watts;
            }
        }
        summary
    }
}
