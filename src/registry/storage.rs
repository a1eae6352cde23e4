//! Persistence for the load-order file.
//!
//! The file is a JSON array of mod id strings, lowest precedence first.

use crate::error::{Error, Result};
use crate::types::ModId;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Load the ordered id list from disk.
///
/// Returns an empty list if the file doesn't exist.
pub fn load_order_ids(path: &Path) -> Result<Vec<ModId>> {
    if !path.exists() {
        debug!(path = %path.display(), "no load-order file, starting empty");
        return Ok(Vec::new());
    }

    let content = fs::read_to_string(path)
        .map_err(|e| Error::Registry(format!("failed to read {}: {e}", path.display())))?;

    let ids: Vec<ModId> = serde_json::from_str(&content)
        .map_err(|e| Error::Registry(format!("failed to parse {}: {e}", path.display())))?;

    Ok(ids)
}

/// Save the ordered id list to disk.
///
/// Creates the parent directory if it doesn't exist. The file is written to
/// a sibling temp path and renamed over the target, so a crash never leaves
/// a truncated load order behind.
pub fn save_load_order(path: &Path, ids: &[ModId]) -> Result<()> {
    if let Some(dir) = path.parent()
        && !dir.as_os_str().is_empty()
        && !dir.exists()
    {
        fs::create_dir_all(dir)
            .map_err(|e| Error::Registry(format!("failed to create {}: {e}", dir.display())))?;
    }

    let content = serde_json::to_string_pretty(ids)
        .map_err(|e| Error::Registry(format!("failed to serialize load order: {e}")))?;

    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, content)
        .map_err(|e| Error::Registry(format!("failed to write {}: {e}", tmp.display())))?;
    fs::rename(&tmp, path)
        .map_err(|e| Error::Registry(format!("failed to replace {}: {e}", path.display())))?;

    debug!(path = %path.display(), count = ids.len(), "saved load order");
    Ok(())
}
