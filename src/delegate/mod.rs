//! Delegated format mergers
//!
//! Archive, changelog and resource-table merging are owned by external
//! tools. This module defines the seam they are called through and the
//! coordinator that runs them in their fixed dependency order.

mod process;

pub use process::{ProcessMerger, ToolCommand, ToolSet};

use crate::error::{Error, Result};
use crate::progress::ProgressCallback;
use crate::types::{MergeStage, StageOutput};
use async_trait::async_trait;
use std::path::PathBuf;
use tracing::{debug, info};

/// Separator used to join source paths into a single argument
pub const SOURCE_DELIMITER: char = '|';

/// Everything one delegated stage is invoked with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageInvocation {
    /// Stage being run
    pub stage: MergeStage,
    /// Mod source roots, lowest precedence first
    pub sources: Vec<PathBuf>,
    /// Shared destination root
    pub output: PathBuf,
    /// Target content/schema version
    pub version: String,
}

impl StageInvocation {
    /// Source paths joined with [`SOURCE_DELIMITER`]
    pub fn joined_sources(&self) -> String {
        let mut joined = String::new();
        for (i, source) in self.sources.iter().enumerate() {
            if i > 0 {
                joined.push(SOURCE_DELIMITER);
            }
            joined.push_str(&source.to_string_lossy());
        }
        joined
    }
}

/// Runner for external format-specific mergers
///
/// Implementations must run the stage to completion before returning.
/// A non-zero exit status is reported in [`StageOutput::code`]; the
/// coordinator turns it into a stage-tagged error.
#[async_trait]
pub trait DelegatedMerger: Send + Sync {
    /// Run one delegated stage
    async fn run_stage(&self, invocation: &StageInvocation) -> Result<StageOutput>;
}

/// Runs delegated stages strictly in order, aborting on the first failure
pub struct DelegationCoordinator<'a> {
    merger: &'a dyn DelegatedMerger,
    progress: &'a dyn ProgressCallback,
}

impl<'a> DelegationCoordinator<'a> {
    /// Create a coordinator over a merger
    pub fn new(merger: &'a dyn DelegatedMerger, progress: &'a dyn ProgressCallback) -> Self {
        Self { merger, progress }
    }

    /// Run one stage and check its exit status
    pub async fn run(&self, invocation: &StageInvocation) -> Result<StageOutput> {
        let stage = invocation.stage;
        info!(%stage, sources = invocation.sources.len(), "running delegated stage");
        self.progress
            .on_message(&format!("Running {stage} merge ({}/3)", stage.number()))
            .await;

        let output = self.merger.run_stage(invocation).await?;

        if !output.is_success() {
            return Err(Error::DelegatedStage {
                stage,
                code: output.code,
                stderr: output.stderr,
            });
        }

        debug!(%stage, "delegated stage succeeded");
        Ok(output)
    }

    /// Run several stages in the order given
    ///
    /// Stops at the first failure; later stages are never started.
    pub async fn run_all(&self, invocations: &[StageInvocation]) -> Result<Vec<StageOutput>> {
        let mut outputs = Vec::with_capacity(invocations.len());
        for invocation in invocations {
            outputs.push(self.run(invocation).await?);
        }
        Ok(outputs)
    }
}
