//! Mod registry: the ordered mod list that defines load order
//!
//! Insertion order is the load order. The first mod has the lowest
//! precedence and the last mod wins on file conflicts. The registry never
//! reorders on its own; only explicit `move_to`/`remove` calls change it.

mod storage;

pub use storage::{load_order_ids, save_load_order};

use crate::error::{Error, Result};
use crate::types::{Mod, ModId};
use std::path::Path;
use tracing::debug;

/// Result of adding a mod to the registry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddOutcome {
    /// Mod appended at the end of the load order
    Added,
    /// A mod with the same id is already registered
    ///
    /// The caller should re-stage this existing entry instead of adding a
    /// second one.
    Duplicate(Mod),
}

/// Ordered collection of mods
#[derive(Debug, Clone, Default)]
pub struct ModRegistry {
    mods: Vec<Mod>,
}

impl ModRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a mod unless its id is already registered
    pub fn add(&mut self, m: Mod) -> AddOutcome {
        if let Some(existing) = self.get(&m.id) {
            debug!(id = %m.id, "mod already registered");
            return AddOutcome::Duplicate(existing.clone());
        }
        debug!(id = %m.id, position = self.mods.len(), "registered mod");
        self.mods.push(m);
        AddOutcome::Added
    }

    /// Snapshot of the load order (lowest precedence first)
    pub fn list(&self) -> Vec<Mod> {
        self.mods.clone()
    }

    /// Borrow the load order without copying
    pub fn as_slice(&self) -> &[Mod] {
        &self.mods
    }

    /// Ids in load order
    pub fn ids(&self) -> Vec<ModId> {
        self.mods.iter().map(|m| m.id.clone()).collect()
    }

    /// Look up a mod by id
    pub fn get(&self, id: &ModId) -> Option<&Mod> {
        self.mods.iter().find(|m| &m.id == id)
    }

    /// Number of registered mods
    pub fn len(&self) -> usize {
        self.mods.len()
    }

    /// Whether no mods are registered
    pub fn is_empty(&self) -> bool {
        self.mods.is_empty()
    }

    /// Remove a mod from the load order
    ///
    /// Only the registry entry is dropped; the mod's files stay in storage.
    pub fn remove(&mut self, id: &ModId) -> Result<Mod> {
        let index = self.position(id)?;
        Ok(self.mods.remove(index))
    }

    /// Move a mod to `index`, shifting the others
    ///
    /// An index past the end moves the mod to the highest-precedence slot.
    pub fn move_to(&mut self, id: &ModId, index: usize) -> Result<()> {
        let from = self.position(id)?;
        let m = self.mods.remove(from);
        let to = index.min(self.mods.len());
        self.mods.insert(to, m);
        debug!(%id, from, to, "moved mod");
        Ok(())
    }

    fn position(&self, id: &ModId) -> Result<usize> {
        self.mods
            .iter()
            .position(|m| &m.id == id)
            .ok_or_else(|| Error::ModNotFound(id.to_string()))
    }

    /// Write the ordered id list to the load-order file
    pub fn persist(&self, path: &Path) -> Result<()> {
        save_load_order(path, &self.ids())
    }

    /// Rebuild a registry from the load-order file
    ///
    /// Each id resolves to `<mods_dir>/<id>`. Ids whose folder no longer
    /// exists are dropped silently, so externally deleted mods never block
    /// startup. A missing file yields an empty registry.
    pub fn restore(path: &Path, mods_dir: &Path) -> Result<Self> {
        let mut registry = Self::new();
        for id in load_order_ids(path)? {
            let m = Mod::in_storage(mods_dir, id);
            if !m.exists_on_disk() {
                debug!(id = %m.id, folder = %m.source_folder.display(), "dropping missing mod");
                continue;
            }
            // Duplicates in a hand-edited file collapse to the first entry
            registry.add(m);
        }
        Ok(registry)
    }
}
