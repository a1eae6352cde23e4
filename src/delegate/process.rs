//! External process runner for delegated stages.
//!
//! Every tool is invoked as
//!
//! ```text
//! <program> <verb> <source|source|...> --output <dest> --version <version>
//! ```
//!
//! and must exit with status 0 on success.

use super::{DelegatedMerger, StageInvocation};
use crate::error::{Error, Result};
use crate::types::{MergeStage, StageOutput};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// How to call one external tool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCommand {
    /// Executable path or name on `PATH`
    pub program: PathBuf,
    /// First argument selecting the tool's operation
    pub verb: String,
}

impl ToolCommand {
    /// Create a tool command
    pub fn new(program: impl Into<PathBuf>, verb: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            verb: verb.into(),
        }
    }

    /// Full argument list for an invocation
    pub fn args(&self, invocation: &StageInvocation) -> Vec<String> {
        vec![
            self.verb.clone(),
            invocation.joined_sources(),
            "--output".to_string(),
            invocation.output.to_string_lossy().into_owned(),
            "--version".to_string(),
            invocation.version.clone(),
        ]
    }
}

/// One tool per delegated stage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolSet {
    /// Archive merger
    pub archive: ToolCommand,
    /// Database changelog merger
    pub changelog: ToolCommand,
    /// Resource size table regenerator
    pub resource_table: ToolCommand,
}

impl Default for ToolSet {
    fn default() -> Self {
        Self {
            archive: ToolCommand::new("archive-merger", "merge"),
            changelog: ToolCommand::new("changelog-merger", "apply"),
            resource_table: ToolCommand::new("rstb-generator", "generate"),
        }
    }
}

impl ToolSet {
    /// Tool configured for a stage
    pub const fn for_stage(&self, stage: MergeStage) -> &ToolCommand {
        match stage {
            MergeStage::Archive => &self.archive,
            MergeStage::Changelog => &self.changelog,
            MergeStage::ResourceTable => &self.resource_table,
        }
    }
}

/// Runs delegated stages as child processes
///
/// The child is killed if the returned future is dropped, so cancelling the
/// merge task never leaves a tool running against the output tree.
#[derive(Debug, Clone, Default)]
pub struct ProcessMerger {
    tools: ToolSet,
}

impl ProcessMerger {
    /// Create a runner for the given tools
    pub const fn new(tools: ToolSet) -> Self {
        Self { tools }
    }

    /// Configured tools
    pub const fn tools(&self) -> &ToolSet {
        &self.tools
    }
}

#[async_trait]
impl DelegatedMerger for ProcessMerger {
    async fn run_stage(&self, invocation: &StageInvocation) -> Result<StageOutput> {
        let stage = invocation.stage;
        let tool = self.tools.for_stage(stage);
        let args = tool.args(invocation);
        debug!(%stage, program = %tool.program.display(), ?args, "spawning delegated merger");

        let output = Command::new(&tool.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| Error::StageSpawn { stage, source })?;

        let result = StageOutput {
            stage,
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };
        debug!(%stage, code = ?result.code, "delegated merger exited");
        Ok(result)
    }
}
