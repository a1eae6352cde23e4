//! Merge execution - effectful operations
//!
//! This module contains the effectful code that actually performs merges.
//! It takes a `MergePlan` (created by the pure planning functions), persists
//! the load order, rebuilds the output tree and drives the delegated stages.

use crate::delegate::{DelegatedMerger, DelegationCoordinator};
use crate::error::{Error, Result};
use crate::merge::plan::{MergePlan, MergePlanOptions, MergeStep, create_merge_plan};
use crate::overlay::{OverlayReport, overlay_merge_cancellable};
use crate::progress::ProgressCallback;
use crate::registry::{ModRegistry, save_load_order};
use crate::types::{MergePhase, MergeStage, PipelineState, StageOutput};
use chrono::{DateTime, Utc};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{info, warn};

/// Result of a completed merge
#[derive(Debug, Clone)]
pub struct MergeExecutionResult {
    /// Number of mods merged
    pub mod_count: usize,
    /// Plain-file overlay counts
    pub overlay: OverlayReport,
    /// Output of each delegated stage that ran, in order
    pub stage_outputs: Vec<StageOutput>,
    /// Stages skipped by the plan
    pub skipped_stages: Vec<MergeStage>,
    /// When the last stage finished
    pub finished_at: DateTime<Utc>,
}

impl MergeExecutionResult {
    /// Stages that ran to completion
    #[must_use]
    pub fn completed_stages(&self) -> Vec<MergeStage> {
        self.stage_outputs.iter().map(|o| o.stage).collect()
    }
}

/// Merge pipeline state machine
///
/// `Idle -> Staged -> Overlaying -> Delegating(1..3) -> Complete`, or
/// `Failed(phase)` from any running state. Running again from `Complete` or
/// `Failed` repeats every step from a clean output directory.
pub struct MergePipeline<'a> {
    merger: &'a dyn DelegatedMerger,
    progress: &'a dyn ProgressCallback,
    load_order_file: PathBuf,
    state: PipelineState,
}

impl<'a> MergePipeline<'a> {
    /// Create an idle pipeline
    pub fn new(
        merger: &'a dyn DelegatedMerger,
        progress: &'a dyn ProgressCallback,
        load_order_file: impl Into<PathBuf>,
    ) -> Self {
        Self {
            merger,
            progress,
            load_order_file: load_order_file.into(),
            state: PipelineState::Idle,
        }
    }

    /// Current state
    pub const fn state(&self) -> PipelineState {
        self.state
    }

    /// Gather, plan and execute a merge of the registry's load order
    ///
    /// The registry is borrowed for the whole merge, so the load order
    /// cannot change while stages are running.
    pub async fn run(
        &mut self,
        registry: &ModRegistry,
        options: &MergePlanOptions,
    ) -> Result<MergeExecutionResult> {
        let plan = create_merge_plan(registry.as_slice(), options);
        self.execute(&plan).await
    }

    /// Execute a merge plan (EFFECTFUL)
    ///
    /// Stops at the first failing phase and leaves the pipeline in
    /// `Failed(phase)`. Partial output may remain on disk; the next run
    /// deletes it before doing anything else.
    pub async fn execute(&mut self, plan: &MergePlan) -> Result<MergeExecutionResult> {
        match self.execute_steps(plan).await {
            Ok(result) => {
                self.transition(PipelineState::Complete).await;
                info!(mods = result.mod_count, "merge complete");
                Ok(result)
            }
            Err(e) => {
                self.fail().await;
                warn!(error = %e, state = %self.state, "merge failed");
                Err(e)
            }
        }
    }

    /// Mark an in-flight merge as failed after its future was dropped
    ///
    /// Dropping the merge future kills any running tool; this records the
    /// phase it was in so the merge is never mistaken for a success.
    pub fn mark_cancelled(&mut self) {
        if let Some(phase) = running_phase(self.state) {
            warn!(%phase, "merge cancelled");
            self.state = PipelineState::Failed(phase);
        }
    }

    async fn execute_steps(&mut self, plan: &MergePlan) -> Result<MergeExecutionResult> {
        // Staged: record the intended order before touching the output
        self.transition(PipelineState::Staged).await;
        plan.check_output_root(&self.load_order_file)?;
        save_load_order(&self.load_order_file, &plan.mod_ids)?;

        let mut overlay = OverlayReport::default();
        let mut stage_outputs = Vec::new();
        let mut skipped_stages = Vec::new();
        let coordinator = DelegationCoordinator::new(self.merger, self.progress);

        for step in &plan.steps {
            match step {
                MergeStep::Overlay { sources, output } => {
                    self.transition(PipelineState::Overlaying).await;
                    self.progress
                        .on_message(&format!("Overlaying {} mod(s)", sources.len()))
                        .await;
                    reset_output_dir(output)?;
                    overlay = run_overlay(sources.clone(), output.clone()).await?;
                }
                MergeStep::Delegate(invocation) => {
                    self.transition(PipelineState::Delegating(invocation.stage))
                        .await;
                    stage_outputs.push(coordinator.run(invocation).await?);
                }
                MergeStep::Skip { stage, reason } => {
                    info!(%stage, reason = %reason, "skipping delegated stage");
                    self.progress
                        .on_message(&format!("Skipping {stage} merge: {reason}"))
                        .await;
                    skipped_stages.push(*stage);
                }
            }
        }

        Ok(MergeExecutionResult {
            mod_count: plan.mod_ids.len(),
            overlay,
            stage_outputs,
            skipped_stages,
            finished_at: Utc::now(),
        })
    }

    async fn transition(&mut self, state: PipelineState) {
        self.state = state;
        self.progress.on_state(state).await;
    }

    async fn fail(&mut self) {
        // Idle means staging never started; blame staging regardless
        let phase = running_phase(self.state).unwrap_or(MergePhase::Staging);
        self.transition(PipelineState::Failed(phase)).await;
    }
}

const fn running_phase(state: PipelineState) -> Option<MergePhase> {
    match state {
        PipelineState::Staged => Some(MergePhase::Staging),
        PipelineState::Overlaying => Some(MergePhase::Overlay),
        PipelineState::Delegating(stage) => Some(MergePhase::Delegated(stage)),
        PipelineState::Idle | PipelineState::Complete | PipelineState::Failed(_) => None,
    }
}

/// Delete and recreate the output root
///
/// Callers check the root with [`MergePlan::check_output_root`] first.
fn reset_output_dir(output: &Path) -> Result<()> {
    if output.exists() {
        fs::remove_dir_all(output).map_err(|source| Error::OverlayIo {
            path: output.to_path_buf(),
            source,
        })?;
    }
    fs::create_dir_all(output).map_err(|source| Error::OverlayIo {
        path: output.to_path_buf(),
        source,
    })?;
    Ok(())
}

/// Raises its flag when dropped
///
/// Held across the blocking overlay task; dropping the merge future stops
/// the copy loop.
struct CancelOnDrop(Arc<AtomicBool>);

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        self.0.store(true, Ordering::Relaxed);
    }
}

async fn run_overlay(sources: Vec<PathBuf>, output: PathBuf) -> Result<OverlayReport> {
    let cancel = Arc::new(AtomicBool::new(false));
    let guard = CancelOnDrop(Arc::clone(&cancel));

    let result =
        tokio::task::spawn_blocking(move || overlay_merge_cancellable(&sources, &output, &cancel))
            .await
            .map_err(|e| Error::Internal(format!("overlay task failed: {e}")))?;
    drop(guard);
    result
}
