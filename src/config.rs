//! Configuration file handling
//!
//! Settings live in a TOML file, by default
//! `<config dir>/modstack/config.toml`. Every field is optional; a missing
//! default file means "all defaults". Relative paths inside the file are
//! resolved against the file's directory.

use crate::delegate::{ProcessMerger, ToolSet};
use crate::error::{Error, Result};
use crate::merge::MergePlanOptions;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable overriding the config file location
pub const CONFIG_ENV: &str = "MODSTACK_CONFIG";

const APP_DIR: &str = "modstack";
const CONFIG_FILE: &str = "config.toml";

/// Default content version handed to delegated mergers
pub const DEFAULT_GAME_VERSION: &str = "121";

/// Resolved configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage root; each mod lives at `<mods_dir>/<id>`
    pub mods_dir: PathBuf,
    /// Merged output root (wiped on every merge)
    pub output_dir: PathBuf,
    /// JSON load-order file
    pub load_order_file: PathBuf,
    /// Content/schema version for the delegated mergers
    pub game_version: String,
    /// External tools, one per delegated stage
    pub tools: ToolSet,
}

impl Default for Config {
    fn default() -> Self {
        let data = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR);
        Self {
            mods_dir: data.join("mods"),
            output_dir: data.join("merged"),
            load_order_file: data.join("load_order.json"),
            game_version: DEFAULT_GAME_VERSION.to_string(),
            tools: ToolSet::default(),
        }
    }
}

/// Default config file path, if the platform has a config directory
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
}

impl Config {
    /// Load configuration
    ///
    /// An explicit path (from `--config` or [`CONFIG_ENV`]) must exist.
    /// The default location may be absent, in which case defaults apply.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            if !path.exists() {
                return Err(Error::Config(format!(
                    "config file not found: {}",
                    path.display()
                )));
            }
            return Self::from_file(path);
        }

        match default_config_path() {
            Some(path) if path.exists() => Self::from_file(&path),
            _ => {
                debug!("no config file, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Parse a config file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read {}: {e}", path.display())))?;
        let mut config: Self = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse {}: {e}", path.display())))?;

        if let Some(base) = path.parent() {
            config.resolve_relative_to(base);
        }
        debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    fn resolve_relative_to(&mut self, base: &Path) {
        for path in [
            &mut self.mods_dir,
            &mut self.output_dir,
            &mut self.load_order_file,
        ] {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
    }

    /// Planning options derived from this config
    pub fn plan_options(&self) -> MergePlanOptions {
        MergePlanOptions {
            output_dir: self.output_dir.clone(),
            version: self.game_version.clone(),
            mods_dir: self.mods_dir.clone(),
        }
    }

    /// Process-based merger for the configured tools
    pub fn merger(&self) -> ProcessMerger {
        ProcessMerger::new(self.tools.clone())
    }
}
