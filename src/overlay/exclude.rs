//! Extensions owned by delegated mergers.
//!
//! Files ending in one of these suffixes are never copied by the overlay.
//! Their contents are merged by the archive, changelog and resource-table
//! tools, and a raw copy would be clobbered or corrupt the later merge.

use std::path::Path;

/// Bumped whenever [`EXCLUDED_EXTENSIONS`] changes
pub const EXCLUSION_SET_VERSION: u32 = 1;

/// Archive/container and structured-table suffixes
pub const EXCLUDED_EXTENSIONS: &[&str] = &[
    ".rsizetable.zs",
    ".byml.zs",
    ".bgyml",
    ".pack.zs",
    ".sarc.zs",
    ".blarc.zs",
];

/// Whether the file name ends with an excluded extension (ASCII case-insensitive)
pub fn is_excluded(path: &Path) -> bool {
    let Some(name) = path.file_name() else {
        return false;
    };
    let name = name.to_string_lossy().to_ascii_lowercase();
    EXCLUDED_EXTENSIONS.iter().any(|ext| name.ends_with(ext))
}
