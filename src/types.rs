//! Core types for modstack

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Stable identifier of an imported mod
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModId(String);

impl ModId {
    /// Wrap an identifier string
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ModId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ModId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ModId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// One content package: a directory tree of override assets
///
/// The source folder is owned by storage; the merge core only reads it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mod {
    /// Stable identifier, immutable once imported
    pub id: ModId,
    /// On-disk content root of the mod
    pub source_folder: PathBuf,
}

impl Mod {
    /// Create a mod record
    pub fn new(id: impl Into<ModId>, source_folder: impl Into<PathBuf>) -> Self {
        Self {
            id: id.into(),
            source_folder: source_folder.into(),
        }
    }

    /// Mod stored at the conventional location `<mods_dir>/<id>`
    pub fn in_storage(mods_dir: &Path, id: impl Into<ModId>) -> Self {
        let id = id.into();
        let source_folder = mods_dir.join(id.as_str());
        Self { id, source_folder }
    }

    /// Whether the source folder still exists on disk
    pub fn exists_on_disk(&self) -> bool {
        self.source_folder.is_dir()
    }
}

// =============================================================================
// Merge-related types
// =============================================================================

/// Delegated merge stage, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MergeStage {
    /// Archive-format assets, merged from the original mod trees
    Archive,
    /// Per-mod structured-database changelogs applied to the baseline
    Changelog,
    /// Resource size table regenerated over the final merged tree
    ResourceTable,
}

impl MergeStage {
    /// All stages in the order they must run
    pub const ALL: [Self; 3] = [Self::Archive, Self::Changelog, Self::ResourceTable];

    /// 1-based stage number
    pub const fn number(self) -> u8 {
        match self {
            Self::Archive => 1,
            Self::Changelog => 2,
            Self::ResourceTable => 3,
        }
    }
}

impl fmt::Display for MergeStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Archive => write!(f, "archive"),
            Self::Changelog => write!(f, "changelog"),
            Self::ResourceTable => write!(f, "resource table"),
        }
    }
}

/// Part of the pipeline a failure happened in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergePhase {
    /// Persisting the load order
    Staging,
    /// Plain-file overlay
    Overlay,
    /// A delegated stage
    Delegated(MergeStage),
}

impl fmt::Display for MergePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Staging => write!(f, "staging"),
            Self::Overlay => write!(f, "overlay"),
            Self::Delegated(stage) => write!(f, "{stage}"),
        }
    }
}

/// Merge pipeline state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PipelineState {
    /// No merge running
    #[default]
    Idle,
    /// Load order persisted
    Staged,
    /// Destination reset, overlay running
    Overlaying,
    /// Delegated stage running
    Delegating(MergeStage),
    /// All stages finished
    Complete,
    /// Halted; no retry
    Failed(MergePhase),
}

impl PipelineState {
    /// Whether a merge is in flight; callers must not mutate the load order
    pub const fn is_busy(self) -> bool {
        matches!(
            self,
            Self::Staged | Self::Overlaying | Self::Delegating(_)
        )
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Staged => write!(f, "staged"),
            Self::Overlaying => write!(f, "overlaying"),
            Self::Delegating(stage) => write!(f, "delegating ({}/3: {stage})", stage.number()),
            Self::Complete => write!(f, "complete"),
            Self::Failed(phase) => write!(f, "failed ({phase})"),
        }
    }
}

/// Captured result of one delegated merger run
#[derive(Debug, Clone)]
pub struct StageOutput {
    /// Stage that ran
    pub stage: MergeStage,
    /// Exit code, `None` if terminated by a signal
    pub code: Option<i32>,
    /// Captured standard output
    pub stdout: String,
    /// Captured standard error
    pub stderr: String,
}

impl StageOutput {
    /// Zero exit status
    pub const fn is_success(&self) -> bool {
        matches!(self.code, Some(0))
    }
}
