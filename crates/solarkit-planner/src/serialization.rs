//! Save/load for planner project files.
//!
//! Implements a versioned JSON project format holding the catalog, the
//! roofs, their grid configs and exclusion zones, and every committed
//! panel. Stored panel positions are authoritative: loading a project
//! restores them verbatim and never re-runs the layout engine.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use uuid::Uuid;

use crate::catalog::ModuleCatalog;
use crate::model::{ExclusionZone, GridConfig, ModuleSpec, PanelInstance, RoofSurface};
use crate::store::PlacementStore;

/// Project file format version
const FILE_FORMAT_VERSION: &str = "1.0";

/// Complete project file structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectFile {
    pub version: String,
    pub metadata: ProjectMetadata,
    pub catalog: Vec<ModuleSpec>,
    pub global_config: GridConfig,
    pub roofs: Vec<RoofSurface>,
    #[serde(default)]
    pub roof_configs: Vec<RoofConfigEntry>,
    #[serde(default)]
    pub zones: Vec<ExclusionZone>,
    #[serde(default)]
    pub panels: Vec<PanelInstance>,
}

/// Project metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectMetadata {
    pub id: Uuid,
    pub name: String,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub description: String,
}

/// One per-roof grid config override.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoofConfigEntry {
    pub roof_id: u64,
    pub config: GridConfig,
}

impl ProjectFile {
    /// Creates an empty project file with default values.
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            version: FILE_FORMAT_VERSION.to_string(),
            metadata: ProjectMetadata {
                id: Uuid::new_v4(),
                name: name.into(),
                created: now,
                modified: now,
                author: String::new(),
                description: String::new(),
            },
            catalog: Vec::new(),
            global_config: GridConfig::default(),
            roofs: Vec::new(),
            roof_configs: Vec::new(),
            zones: Vec::new(),
            panels: Vec::new(),
        }
    }

    /// Captures the current store and catalog into a saveable file.
    pub fn from_store(
        name: impl Into<String>,
        store: &PlacementStore,
        catalog: &ModuleCatalog,
    ) -> Self {
        let mut file = Self::new(name);
        file.catalog = catalog.iter().cloned().collect();
        file.global_config = store.global_config().clone();
        file.roofs = store.roofs().cloned().collect();
        file.roof_configs = store
            .roof_configs()
            .map(|(roof_id, config)| RoofConfigEntry {
                roof_id,
                config: config.clone(),
            })
            .collect();
        file.zones = store.zones().cloned().collect();
        file.panels = store.panels().cloned().collect();
        file
    }

    /// Rebuilds the store and catalog from this file. Panel positions are
    /// restored as stored; regeneration stays an explicit caller action.
    pub fn restore(&self) -> (PlacementStore, ModuleCatalog) {
        let mut catalog = ModuleCatalog::new();
        for spec in &self.catalog {
            // Duplicate keys in a hand-edited file: first entry wins.
            let _ = catalog.add(spec.clone());
        }

        let mut store = PlacementStore::new();
        store.set_global_config(self.global_config.clone());
        for roof in &self.roofs {
            store.restore_roof(roof.clone());
        }
        for entry in &self.roof_configs {
            let _ = store.set_roof_config(entry.roof_id, entry.config.clone());
        }
        for zone in &self.zones {
            store.restore_zone(zone.clone());
        }
        for panel in &self.panels {
            store.restore_panel(panel.clone());
        }
        (store, catalog)
    }

    /// Saves the project to a file as pretty-printed JSON.
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("Failed to serialize project")?;
        std::fs::write(path.as_ref(), json).context("Failed to write project file")?;
        Ok(())
    }

    /// Loads a project from a file.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content =
            std::fs::read_to_string(path.as_ref()).context("Failed to read project file")?;
        let mut project: ProjectFile =
            serde_json::from_str(&content).context("Failed to parse project file")?;

        // Update modified timestamp
        project.metadata.modified = Utc::now();
        Ok(project)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{PanelRect, RoofProvenance};
    use solarkit_core::geometry::{Point, Polygon};

    fn sample_project() -> ProjectFile {
        let mut store = PlacementStore::new();
        let catalog = ModuleCatalog::with_defaults();
        let roof = store.add_roof(
            Polygon::new(vec![
                Point::new(0.0, 0.0),
                Point::new(10.0, 0.0),
                Point::new(10.0, 6.0),
                Point::new(0.0, 6.0),
            ]),
            0.0,
            35.0,
            RoofProvenance::Imported,
        );
        store
            .set_roof_config(
                roof,
                GridConfig {
                    margin_m: 0.4,
                    module_id: Some("mono-410".into()),
                    ..GridConfig::default()
                },
            )
            .unwrap();
        store
            .add_zone(
                roof,
                Polygon::new(vec![
                    Point::new(4.0, 2.0),
                    Point::new(5.0, 2.0),
                    Point::new(5.0, 3.0),
                    Point::new(4.0, 3.0),
                ]),
            )
            .unwrap();
        store
            .add_panel(
                roof,
                PanelRect::new(Point::new(1.55, 1.15), 1.1, 1.7, 0.0),
                "mono-410",
            )
            .unwrap();
        ProjectFile::from_store("Test project", &store, &catalog)
    }

    #[test]
    fn capture_and_restore_round_trips() {
        let file = sample_project();
        let (store, catalog) = file.restore();
        assert_eq!(store.roofs().count(), 1);
        assert_eq!(store.zones().count(), 1);
        assert_eq!(store.panels().count(), 1);
        assert!(catalog.get("mono-410").is_some());

        let roof = store.roofs().next().unwrap();
        assert!((store.config_for(roof.id).margin_m - 0.4).abs() < 1e-12);
    }

    #[test]
    fn restored_ids_do_not_collide_with_new_ones() {
        let file = sample_project();
        let (mut store, _) = file.restore();
        let max_id = store
            .roofs()
            .map(|r| r.id)
            .chain(store.zones().map(|z| z.id))
            .chain(store.panels().map(|p| p.id))
            .max()
            .unwrap();
        assert!(store.generate_id() > max_id);
    }

    #[test]
    fn version_is_stamped() {
        let file = ProjectFile::new("Empty");
        assert_eq!(file.version, FILE_FORMAT_VERSION);
    }
}
