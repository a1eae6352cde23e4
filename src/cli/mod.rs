//! CLI command implementations

pub mod context;
pub mod merge;
pub mod order;
pub mod style;

use async_trait::async_trait;
use indicatif::ProgressBar;
use modstack::progress::ProgressCallback;
use modstack::types::PipelineState;
use std::time::Duration;
use style::spinner_style;
use tracing::debug;

/// Spinner-backed progress reporter for the merge command
pub struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    /// Start a spinner on stderr
    pub fn spinner() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(spinner_style());
        spinner.enable_steady_tick(Duration::from_millis(80));
        Self { spinner }
    }

    /// Stop the spinner and replace it with a final line
    pub fn finish(&self, message: String) {
        self.spinner.finish_with_message(message);
    }

    /// Stop the spinner and erase it
    pub fn clear(&self) {
        self.spinner.finish_and_clear();
    }
}

#[async_trait]
impl ProgressCallback for CliProgress {
    async fn on_message(&self, message: &str) {
        self.spinner.set_message(message.to_string());
    }

    async fn on_state(&self, state: PipelineState) {
        debug!(%state, "pipeline state");
    }
}
