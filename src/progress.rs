//! Progress reporting for long-running merges

use crate::types::PipelineState;
use async_trait::async_trait;

/// Receives merge progress events
///
/// The CLI renders these; library callers can ignore them with
/// [`NoopProgress`].
#[async_trait]
pub trait ProgressCallback: Send + Sync {
    /// Human-readable status line
    async fn on_message(&self, message: &str);

    /// Pipeline moved to a new state
    async fn on_state(&self, _state: PipelineState) {}
}

/// Progress sink that discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopProgress;

#[async_trait]
impl ProgressCallback for NoopProgress {
    async fn on_message(&self, _message: &str) {}
}
