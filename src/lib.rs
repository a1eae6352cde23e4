//! modstack - load-order aware mod merging
//!
//! Merges an ordered list of game content mods into one output tree.
//! Plain files are overlaid with last-mod-wins precedence; archive,
//! changelog and resource-table formats are handed to external tools that
//! run in a fixed order after the overlay.

pub mod config;
pub mod delegate;
pub mod error;
pub mod merge;
pub mod overlay;
pub mod progress;
pub mod registry;
pub mod types;

pub use error::{Error, Result};
