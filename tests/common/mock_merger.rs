//! Mock delegated merger for testing
//!
//! These are test utilities - not all may be used in current tests but are
//! available for future test development.

#![allow(dead_code)]

use async_trait::async_trait;
use modstack::delegate::{DelegatedMerger, StageInvocation};
use modstack::error::{Error, Result};
use modstack::types::{MergeStage, StageOutput};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use walkdir::WalkDir;

/// File a stage writes into the output when it runs
#[derive(Debug, Clone)]
struct StageWrite {
    relative: PathBuf,
    contents: Vec<u8>,
}

/// Simple mock delegated merger for testing
///
/// Features:
/// - Call tracking for verification (order and arguments)
/// - Snapshot of the output tree at each call
/// - Per-stage files written into the output, like a real tool would
/// - Error injection per stage (non-zero exit, spawn failure or hang)
#[derive(Default)]
pub struct MockMerger {
    calls: Mutex<Vec<StageInvocation>>,
    output_snapshots: Mutex<Vec<(MergeStage, Vec<PathBuf>)>>,
    writes: Mutex<HashMap<MergeStage, Vec<StageWrite>>>,
    // Error injection
    exit_failures: Mutex<HashMap<MergeStage, (i32, String)>>,
    spawn_failures: Mutex<HashMap<MergeStage, String>>,
    // Stages that never finish, like a hung tool
    hung_stages: Mutex<Vec<MergeStage>>,
}

impl MockMerger {
    /// Create a mock where every stage succeeds
    pub fn new() -> Self {
        Self::default()
    }

    // === Error injection methods ===

    /// Make a stage exit with a non-zero code
    pub fn fail_stage(&self, stage: MergeStage, code: i32, stderr: &str) {
        self.exit_failures
            .lock()
            .unwrap()
            .insert(stage, (code, stderr.to_string()));
    }

    /// Make a stage fail to start
    pub fn fail_spawn(&self, stage: MergeStage, msg: &str) {
        self.spawn_failures
            .lock()
            .unwrap()
            .insert(stage, msg.to_string());
    }

    /// Make a stage hang until its future is dropped
    pub fn hang_on_stage(&self, stage: MergeStage) {
        self.hung_stages.lock().unwrap().push(stage);
    }

    /// Write a file into the output root whenever `stage` runs
    pub fn write_on_stage(&self, stage: MergeStage, relative: &str, contents: &str) {
        self.writes
            .lock()
            .unwrap()
            .entry(stage)
            .or_default()
            .push(StageWrite {
                relative: PathBuf::from(relative),
                contents: contents.as_bytes().to_vec(),
            });
    }

    // === Call verification methods ===

    /// All invocations, in call order
    pub fn get_calls(&self) -> Vec<StageInvocation> {
        self.calls.lock().unwrap().clone()
    }

    /// Stages invoked, in call order
    pub fn get_stage_order(&self) -> Vec<MergeStage> {
        self.get_calls().iter().map(|c| c.stage).collect()
    }

    /// Files present in the output root when `stage` was invoked
    pub fn output_seen_by(&self, stage: MergeStage) -> Option<Vec<PathBuf>> {
        self.output_snapshots
            .lock()
            .unwrap()
            .iter()
            .find(|(s, _)| *s == stage)
            .map(|(_, files)| files.clone())
    }

    /// Assert that a stage was invoked
    pub fn assert_stage_called(&self, stage: MergeStage) {
        let order = self.get_stage_order();
        assert!(
            order.contains(&stage),
            "Expected {stage} stage to run but got: {order:?}"
        );
    }

    /// Assert that a stage was NOT invoked
    pub fn assert_stage_not_called(&self, stage: MergeStage) {
        let order = self.get_stage_order();
        assert!(
            !order.contains(&stage),
            "Expected {stage} stage NOT to run but it did: {order:?}"
        );
    }

    /// Number of stage invocations
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

fn list_files(root: &Path) -> Vec<PathBuf> {
    if !root.exists() {
        return Vec::new();
    }
    WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(std::result::Result::ok)
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| e.path().strip_prefix(root).ok().map(Path::to_path_buf))
        .collect()
}

#[async_trait]
impl DelegatedMerger for MockMerger {
    async fn run_stage(&self, invocation: &StageInvocation) -> Result<StageOutput> {
        let stage = invocation.stage;
        self.calls.lock().unwrap().push(invocation.clone());
        self.output_snapshots
            .lock()
            .unwrap()
            .push((stage, list_files(&invocation.output)));

        let hung = self.hung_stages.lock().unwrap().contains(&stage);
        if hung {
            std::future::pending::<()>().await;
        }

        // Check for injected errors
        if let Some(msg) = self.spawn_failures.lock().unwrap().get(&stage) {
            return Err(Error::StageSpawn {
                stage,
                source: std::io::Error::new(std::io::ErrorKind::NotFound, msg.clone()),
            });
        }
        if let Some((code, stderr)) = self.exit_failures.lock().unwrap().get(&stage) {
            return Ok(StageOutput {
                stage,
                code: Some(*code),
                stdout: String::new(),
                stderr: stderr.clone(),
            });
        }

        let writes = self
            .writes
            .lock()
            .unwrap()
            .get(&stage)
            .cloned()
            .unwrap_or_default();
        for write in writes {
            let path = invocation.output.join(&write.relative);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, &write.contents).unwrap();
        }

        Ok(StageOutput {
            stage,
            code: Some(0),
            stdout: format!("{stage} ok"),
            stderr: String::new(),
        })
    }
}
