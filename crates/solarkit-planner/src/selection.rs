//! Panel selection state.
//!
//! Tracks which panels are selected, in insertion order. The first
//! selected panel is the anchor for group drags and nudges.

use solarkit_core::exclusion::point_in_polygon;
use solarkit_core::geometry::Point;

use crate::store::PlacementStore;

/// Ordered multi-selection of panel ids.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PanelSelection {
    ids: Vec<u64>,
}

impl PanelSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the selection with a single panel.
    pub fn select(&mut self, id: u64) {
        self.ids.clear();
        self.ids.push(id);
    }

    /// Adds a panel to the selection if absent, removes it if present
    /// (multi-select click).
    pub fn toggle(&mut self, id: u64) {
        if let Some(pos) = self.ids.iter().position(|&existing| existing == id) {
            self.ids.remove(pos);
        } else {
            self.ids.push(id);
        }
    }

    /// Adds a panel without clearing the rest of the selection.
    pub fn add(&mut self, id: u64) {
        if !self.is_selected(id) {
            self.ids.push(id);
        }
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn is_selected(&self, id: u64) -> bool {
        self.ids.contains(&id)
    }

    /// Selected ids in insertion order.
    pub fn ids(&self) -> &[u64] {
        &self.ids
    }

    /// The drag anchor: the first selected panel.
    pub fn anchor(&self) -> Option<u64> {
        self.ids.first().copied()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Drops ids that no longer exist in the store (deleted panels).
    pub fn prune(&mut self, store: &PlacementStore) {
        self.ids.retain(|&id| store.panel(id).is_some());
    }

    /// Selects the topmost panel on a roof whose footprint contains
    /// `point`. With `multi` the hit panel is toggled instead; clicking
    /// empty space without `multi` clears the selection.
    ///
    /// Returns the hit panel id, if any. "Topmost" is the most recently
    /// created panel, matching draw order.
    pub fn select_at(
        &mut self,
        store: &PlacementStore,
        roof_id: u64,
        point: Point,
        multi: bool,
    ) -> Option<u64> {
        let hit = store
            .panels_on_roof(roof_id)
            .filter(|panel| point_in_polygon(point, &panel.rect().corners()))
            .last()
            .map(|panel| panel.id);

        match hit {
            Some(id) if multi => self.toggle(id),
            Some(id) => self.select(id),
            None if !multi => self.clear(),
            None => {}
        }
        hit
    }
}
