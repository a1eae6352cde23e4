//! Plain-file overlay merge
//!
//! Builds the plain-file portion of the merged tree. Each mod's content
//! subtree (`romfs/`) and executable-patch subtree (`exefs/`) are walked in
//! load order; for any relative path present in several mods the last mod
//! wins. Files with an excluded extension are left to the delegated mergers.
//!
//! Enumeration first resolves a winner per relative path, then each winner
//! is copied exactly once. Overwrite order therefore never depends on copy
//! scheduling.

mod exclude;

pub use exclude::{EXCLUDED_EXTENSIONS, EXCLUSION_SET_VERSION, is_excluded};

use crate::error::{Error, Result};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::debug;
use walkdir::WalkDir;

/// Content subtree inside every mod and the merged output
pub const CONTENT_DIR: &str = "romfs";

/// Executable-patch subtree inside every mod and the merged output
pub const EXEFS_DIR: &str = "exefs";

const SUBTREES: [&str; 2] = [CONTENT_DIR, EXEFS_DIR];

/// Counts from one overlay run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverlayReport {
    /// Files written to the destination
    pub files_copied: usize,
    /// Files skipped because a delegated merger owns them
    pub files_skipped: usize,
    /// Files shadowed by a later mod at the same relative path
    pub overridden: usize,
}

/// A plain file from one mod, relative to the mod root
#[derive(Debug, Clone)]
struct SourceFile {
    relative: PathBuf,
    absolute: PathBuf,
}

/// Overlay `sources` (mod roots, lowest precedence first) onto `destination`
///
/// `destination` must exist; the pipeline recreates it empty before every
/// run. Both subtrees are always created in the destination, even when no
/// mod provides them.
pub fn overlay_merge(sources: &[PathBuf], destination: &Path) -> Result<OverlayReport> {
    overlay_merge_cancellable(sources, destination, &AtomicBool::new(false))
}

/// [`overlay_merge`] that stops with [`Error::Cancelled`] once `cancel` is set
///
/// The flag is checked before every walked entry and every copy, so a
/// cancelled overlay returns after at most one in-flight file.
pub fn overlay_merge_cancellable(
    sources: &[PathBuf],
    destination: &Path,
    cancel: &AtomicBool,
) -> Result<OverlayReport> {
    if !destination.is_dir() {
        return Err(Error::OverlayIo {
            path: destination.to_path_buf(),
            source: io::Error::new(io::ErrorKind::NotFound, "destination root does not exist"),
        });
    }

    let mut report = OverlayReport::default();
    let mut winners: BTreeMap<PathBuf, PathBuf> = BTreeMap::new();

    for root in sources {
        let (files, skipped) = collect_mod_files(root, cancel)?;
        report.files_skipped += skipped;
        for file in files {
            if winners.insert(file.relative, file.absolute).is_some() {
                report.overridden += 1;
            }
        }
    }

    for subtree in SUBTREES {
        let dir = destination.join(subtree);
        fs::create_dir_all(&dir).map_err(|source| Error::OverlayIo { path: dir, source })?;
    }

    for (relative, source) in &winners {
        check_cancelled(cancel)?;
        copy_file(source, &destination.join(relative))?;
        report.files_copied += 1;
    }

    debug!(
        mods = sources.len(),
        copied = report.files_copied,
        skipped = report.files_skipped,
        overridden = report.overridden,
        "overlay complete"
    );
    Ok(report)
}

/// Enumerate the plain files of one mod, returning them with the excluded count
///
/// Missing subtrees are fine: a mod may ship only `romfs/` or only `exefs/`.
fn collect_mod_files(root: &Path, cancel: &AtomicBool) -> Result<(Vec<SourceFile>, usize)> {
    let mut files = Vec::new();
    let mut skipped = 0;

    for subtree in SUBTREES {
        let dir = root.join(subtree);
        if !dir.is_dir() {
            continue;
        }

        for entry in WalkDir::new(&dir)
            .follow_links(false)
            .sort_by(|a, b| a.file_name().cmp(b.file_name()))
        {
            check_cancelled(cancel)?;
            let entry = entry.map_err(|e| Error::OverlayIo {
                path: e.path().map_or_else(|| dir.clone(), Path::to_path_buf),
                source: e.into(),
            })?;

            if !entry.file_type().is_file() {
                continue;
            }

            let absolute = entry.into_path();
            if is_excluded(&absolute) {
                debug!(path = %absolute.display(), "skipping delegated format");
                skipped += 1;
                continue;
            }

            let relative = absolute
                .strip_prefix(root)
                .map_err(|_| Error::Internal(format!("{} escaped its mod root", absolute.display())))?
                .to_path_buf();
            files.push(SourceFile { relative, absolute });
        }
    }

    Ok((files, skipped))
}

fn check_cancelled(cancel: &AtomicBool) -> Result<()> {
    if cancel.load(Ordering::Relaxed) {
        return Err(Error::Cancelled);
    }
    Ok(())
}

/// Copy one file, overwriting and creating parent directories
fn copy_file(source: &Path, target: &Path) -> Result<()> {
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent).map_err(|e| Error::OverlayIo {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }

    let mut reader = File::open(source).map_err(|e| Error::OverlayIo {
        path: source.to_path_buf(),
        source: e,
    })?;
    let mut writer = File::create(target).map_err(|e| Error::OverlayIo {
        path: target.to_path_buf(),
        source: e,
    })?;
    io::copy(&mut reader, &mut writer).map_err(|e| Error::OverlayIo {
        path: target.to_path_buf(),
        source: e,
    })?;

    Ok(())
}
