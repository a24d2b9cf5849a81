//! Module catalog: the registry of available module types.
//!
//! Placements reference modules by string key; the catalog is the single
//! resolution point for physical dimensions and rated power.

use std::collections::BTreeMap;

use solarkit_core::error::StoreError;

use crate::model::ModuleSpec;

/// String-keyed registry of [`ModuleSpec`] entries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModuleCatalog {
    modules: BTreeMap<String, ModuleSpec>,
}

impl ModuleCatalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a catalog seeded with a few representative residential
    /// module types.
    pub fn with_defaults() -> Self {
        let mut catalog = Self::new();
        for spec in [
            ModuleSpec::new("mono-410", "Mono 410 W", 1.722, 1.134, 410.0),
            ModuleSpec::new("mono-450", "Mono 450 W", 1.909, 1.134, 450.0),
            ModuleSpec::new("compact-370", "Compact 370 W", 1.692, 1.029, 370.0),
        ] {
            // Seeded keys are distinct; insertion cannot clash.
            let _ = catalog.add(spec);
        }
        catalog
    }

    /// Registers a module spec. The key must be unused.
    pub fn add(&mut self, spec: ModuleSpec) -> Result<(), StoreError> {
        if self.modules.contains_key(&spec.id) {
            return Err(StoreError::DuplicateModule { id: spec.id });
        }
        self.modules.insert(spec.id.clone(), spec);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&ModuleSpec> {
        self.modules.get(id)
    }

    pub fn remove(&mut self, id: &str) -> Option<ModuleSpec> {
        self.modules.remove(id)
    }

    /// Iterates entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = &ModuleSpec> {
        self.modules.values()
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}
