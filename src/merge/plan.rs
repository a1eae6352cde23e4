//! Merge planning - pure functions for creating merge plans
//!
//! This module contains the pure, testable logic for creating merge plans.
//! No I/O happens here - the registry snapshot is passed in, making it easy
//! to unit test.

use crate::delegate::StageInvocation;
use crate::error::{Error, Result};
use crate::types::{MergeStage, Mod, ModId};
use std::path::{Path, PathBuf};

/// Reason reported when the changelog stage has nothing to do
pub const NO_CHANGELOGS: &str = "no changelogs to apply";

/// A single step in the merge plan
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeStep {
    /// Overlay plain files from every mod onto the output
    Overlay {
        /// Mod roots, lowest precedence first
        sources: Vec<PathBuf>,
        /// Destination root
        output: PathBuf,
    },
    /// Run a delegated merger
    Delegate(StageInvocation),
    /// Skip a delegated stage (not an error)
    Skip {
        /// Stage being skipped
        stage: MergeStage,
        /// Why the stage is skipped
        reason: String,
    },
}

impl MergeStep {
    /// Delegated stage this step belongs to, if any
    pub const fn stage(&self) -> Option<MergeStage> {
        match self {
            Self::Overlay { .. } => None,
            Self::Delegate(invocation) => Some(invocation.stage),
            Self::Skip { stage, .. } => Some(*stage),
        }
    }
}

impl std::fmt::Display for MergeStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Overlay { sources, output } => write!(
                f,
                "overlay {} mod(s) onto {}",
                sources.len(),
                output.display()
            ),
            Self::Delegate(invocation) => write!(
                f,
                "{} merge ({}/3) for {} mod(s)",
                invocation.stage,
                invocation.stage.number(),
                invocation.sources.len()
            ),
            Self::Skip { stage, reason } => write!(f, "skip {stage} merge: {reason}"),
        }
    }
}

/// Options for merge planning
#[derive(Debug, Clone)]
pub struct MergePlanOptions {
    /// Merged output root; wiped at the start of every merge
    pub output_dir: PathBuf,
    /// Content/schema version passed to the delegated mergers
    pub version: String,
    /// Mod storage root; never touched by a merge
    pub mods_dir: PathBuf,
}

/// Merge plan - the functional core output
///
/// This is a pure data structure that describes what merge operations
/// should be performed. Created by `create_merge_plan()` (pure)
/// and executed by `MergePipeline::execute()` (effectful).
#[derive(Debug, Clone)]
pub struct MergePlan {
    /// Load order captured when the plan was made
    pub mod_ids: Vec<ModId>,
    /// Merged output root
    pub output_dir: PathBuf,
    /// Mod storage root
    pub mods_dir: PathBuf,
    /// Ordered steps: overlay, then the delegated stages
    pub steps: Vec<MergeStep>,
}

impl MergePlan {
    /// Whether the plan merges zero mods
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.mod_ids.is_empty()
    }

    /// Delegated stages that will actually run, in order
    #[must_use]
    pub fn delegated_stages(&self) -> Vec<MergeStage> {
        self.steps
            .iter()
            .filter_map(|s| match s {
                MergeStep::Delegate(invocation) => Some(invocation.stage),
                _ => None,
            })
            .collect()
    }

    /// Stages skipped by the plan
    #[must_use]
    pub fn skipped_stages(&self) -> Vec<MergeStage> {
        self.steps
            .iter()
            .filter_map(|s| match s {
                MergeStep::Skip { stage, .. } => Some(*stage),
                _ => None,
            })
            .collect()
    }

    /// Mod roots the overlay reads from
    pub fn sources(&self) -> &[PathBuf] {
        self.steps
            .iter()
            .find_map(|s| match s {
                MergeStep::Overlay { sources, .. } => Some(sources.as_slice()),
                _ => None,
            })
            .unwrap_or_default()
    }

    /// Refuse an output root whose reset would destroy state a merge keeps
    ///
    /// The output root is deleted before the overlay. It must not be a
    /// filesystem root, must not contain the load-order file, and must not
    /// equal, contain or sit inside the mod storage root or any mod source.
    /// Paths are compared component-wise without touching the disk.
    pub fn check_output_root(&self, load_order_file: &Path) -> Result<()> {
        let output = self.output_dir.as_path();
        if output.parent().is_none() {
            return Err(Error::Config(format!(
                "refusing to use {} as merge output",
                output.display()
            )));
        }

        if load_order_file.starts_with(output) {
            return Err(Error::Config(format!(
                "merge output {} contains the load-order file {}",
                output.display(),
                load_order_file.display()
            )));
        }

        let protected = std::iter::once(self.mods_dir.as_path())
            .chain(self.sources().iter().map(PathBuf::as_path))
            .filter(|p| !p.as_os_str().is_empty());
        for path in protected {
            if path.starts_with(output) || output.starts_with(path) {
                return Err(Error::Config(format!(
                    "merge output {} overlaps mod storage at {}",
                    output.display(),
                    path.display()
                )));
            }
        }
        Ok(())
    }
}

/// Create a merge plan (PURE - no I/O, easily testable)
///
/// # Arguments
/// * `mods` - Load order snapshot, lowest precedence first
/// * `options` - Output location and content version
///
/// # Returns
/// A `MergePlan` with the overlay step followed by the archive, changelog
/// and resource-table stages. The changelog stage becomes a skip when there
/// are no mods.
#[must_use]
pub fn create_merge_plan(mods: &[Mod], options: &MergePlanOptions) -> MergePlan {
    let sources: Vec<PathBuf> = mods.iter().map(|m| m.source_folder.clone()).collect();
    let mut steps = Vec::with_capacity(1 + MergeStage::ALL.len());

    steps.push(MergeStep::Overlay {
        sources: sources.clone(),
        output: options.output_dir.clone(),
    });

    for stage in MergeStage::ALL {
        if stage == MergeStage::Changelog && mods.is_empty() {
            steps.push(MergeStep::Skip {
                stage,
                reason: NO_CHANGELOGS.to_string(),
            });
            continue;
        }
        steps.push(MergeStep::Delegate(StageInvocation {
            stage,
            sources: sources.clone(),
            output: options.output_dir.clone(),
            version: options.version.clone(),
        }));
    }

    MergePlan {
        mod_ids: mods.iter().map(|m| m.id.clone()).collect(),
        output_dir: options.output_dir.clone(),
        mods_dir: options.mods_dir.clone(),
        steps,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> MergePlanOptions {
        MergePlanOptions {
            output_dir: PathBuf::from("/merged"),
            version: "121".to_string(),
            mods_dir: PathBuf::from("/mods"),
        }
    }

    #[test]
    fn test_plan_orders_overlay_then_stages() {
        let mods = vec![Mod::new("a", "/mods/a"), Mod::new("b", "/mods/b")];
        let plan = create_merge_plan(&mods, &options());

        assert!(matches!(plan.steps[0], MergeStep::Overlay { .. }));
        assert_eq!(
            plan.delegated_stages(),
            vec![
                MergeStage::Archive,
                MergeStage::Changelog,
                MergeStage::ResourceTable
            ]
        );
        assert!(plan.skipped_stages().is_empty());
    }

    #[test]
    fn test_plan_keeps_load_order() {
        let mods = vec![Mod::new("low", "/mods/low"), Mod::new("high", "/mods/high")];
        let plan = create_merge_plan(&mods, &options());

        let MergeStep::Delegate(invocation) = &plan.steps[1] else {
            panic!("Expected delegate step, got: {:?}", plan.steps[1]);
        };
        assert_eq!(
            invocation.sources,
            vec![PathBuf::from("/mods/low"), PathBuf::from("/mods/high")]
        );
        assert_eq!(plan.mod_ids, vec![ModId::from("low"), ModId::from("high")]);
    }

    #[test]
    fn test_empty_plan_skips_changelog_only() {
        let plan = create_merge_plan(&[], &options());

        assert!(plan.is_empty());
        assert_eq!(plan.skipped_stages(), vec![MergeStage::Changelog]);
        assert_eq!(
            plan.delegated_stages(),
            vec![MergeStage::Archive, MergeStage::ResourceTable]
        );
        assert!(plan.steps.iter().any(|s| matches!(
            s,
            MergeStep::Skip { reason, .. } if reason == NO_CHANGELOGS
        )));
    }

    #[test]
    fn test_step_display() {
        let plan = create_merge_plan(&[Mod::new("a", "/mods/a")], &options());
        let lines: Vec<String> = plan.steps.iter().map(ToString::to_string).collect();
        assert_eq!(lines[0], "overlay 1 mod(s) onto /merged");
        assert_eq!(lines[3], "resource table merge (3/3) for 1 mod(s)");
    }

    fn plan_with_output(output: &str, mods: &[Mod]) -> MergePlan {
        let mut opts = options();
        opts.output_dir = PathBuf::from(output);
        create_merge_plan(mods, &opts)
    }

    #[test]
    fn test_output_root_accepts_separate_tree() {
        let plan = plan_with_output("/merged", &[Mod::new("a", "/mods/a")]);
        assert!(plan.check_output_root(Path::new("/state/load_order.json")).is_ok());
    }

    #[test]
    fn test_output_root_refuses_load_order_inside() {
        let plan = plan_with_output("/merged", &[]);
        let err = plan
            .check_output_root(Path::new("/merged/load_order.json"))
            .unwrap_err();
        assert!(matches!(err, Error::Config(msg) if msg.contains("load-order file")));
    }

    #[test]
    fn test_output_root_refuses_mod_storage_overlap() {
        let order = Path::new("/state/load_order.json");
        // Equal to storage, even with nothing registered
        assert!(plan_with_output("/mods", &[]).check_output_root(order).is_err());
        // Containing storage
        assert!(plan_with_output("/", &[]).check_output_root(order).is_err());
        // Inside storage
        assert!(plan_with_output("/mods/out", &[]).check_output_root(order).is_err());
        // Inside a source kept outside storage
        let plan = plan_with_output("/elsewhere/a/out", &[Mod::new("a", "/elsewhere/a")]);
        assert!(plan.check_output_root(order).is_err());
    }

    #[test]
    fn test_sources_follow_overlay_step() {
        let plan = plan_with_output("/merged", &[Mod::new("a", "/mods/a")]);
        assert_eq!(plan.sources(), [PathBuf::from("/mods/a")]);
    }
}
