//! Error types for modstack

use crate::types::MergeStage;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while managing or merging mods
#[derive(Debug, Error)]
pub enum Error {
    /// Load-order file could not be read, parsed or written
    #[error("registry error: {0}")]
    Registry(String),

    /// Mod id not present in the registry
    #[error("mod not found: {0}")]
    ModNotFound(String),

    /// Plain-file overlay failed on a specific path
    #[error("overlay failed at {}: {source}", path.display())]
    OverlayIo {
        /// Offending source or destination path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A delegated merger exited with a non-zero status
    #[error("{stage} stage failed ({}){}", exit_display(*code), stderr_display(stderr))]
    DelegatedStage {
        /// Stage that failed
        stage: MergeStage,
        /// Exit code, `None` if terminated by a signal
        code: Option<i32>,
        /// Captured standard error of the tool
        stderr: String,
    },

    /// A delegated merger could not be started
    #[error("{stage} stage could not start: {source}")]
    StageSpawn {
        /// Stage that failed to start
        stage: MergeStage,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Configuration could not be loaded
    #[error("configuration error: {0}")]
    Config(String),

    /// Merge was interrupted before completion
    #[error("merge cancelled")]
    Cancelled,

    /// Internal error
    #[error("internal error: {0}")]
    Internal(String),
}

fn exit_display(code: Option<i32>) -> String {
    code.map_or_else(
        || "terminated by signal".to_string(),
        |c| format!("exit code {c}"),
    )
}

fn stderr_display(stderr: &str) -> String {
    let trimmed = stderr.trim();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!(": {trimmed}")
    }
}

impl Error {
    /// Stage this error is tagged with, if it came from a delegated merger
    pub const fn stage(&self) -> Option<MergeStage> {
        match self {
            Self::DelegatedStage { stage, .. } | Self::StageSpawn { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}

/// Result type alias for modstack operations
pub type Result<T> = std::result::Result<T, Error>;
