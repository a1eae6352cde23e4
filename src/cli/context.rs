//! Shared command context for CLI commands
//!
//! Extracts common setup code shared by the load-order and merge commands.

use modstack::config::Config;
use modstack::error::Result;
use modstack::registry::ModRegistry;
use std::path::Path;

/// Shared context for CLI commands
///
/// This struct encapsulates the common setup:
/// - Loading configuration
/// - Restoring the registry from the load-order file
pub struct CommandContext {
    /// Resolved configuration
    pub config: Config,
    /// Registry restored from the load-order file
    pub registry: ModRegistry,
}

impl CommandContext {
    /// Load config and restore the registry
    ///
    /// Mods whose folders were deleted since the last save are dropped
    /// here without complaint.
    pub fn new(config_path: Option<&Path>) -> Result<Self> {
        let config = Config::load(config_path)?;
        let registry = ModRegistry::restore(&config.load_order_file, &config.mods_dir)?;
        Ok(Self { config, registry })
    }

    /// Persist the current load order
    pub fn save(&self) -> Result<()> {
        self.registry.persist(&self.config.load_order_file)
    }
}
