//! Merge pipeline for the mod load order
//!
//! Three-phase pattern:
//! 1. Gather - snapshot the registry's load order (read-only for the merge)
//! 2. Plan - create `MergePlan` (pure, testable)
//! 3. Execute - persist, overlay, run delegated stages (effectful)

mod execute;
mod plan;

pub use execute::{MergeExecutionResult, MergePipeline};
pub use plan::{MergePlan, MergePlanOptions, MergeStep, NO_CHANGELOGS, create_merge_plan};
