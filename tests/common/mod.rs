//! Shared test fixtures

#![allow(dead_code)]

mod mock_merger;

pub use mock_merger::MockMerger;

use modstack::merge::MergePlanOptions;
use modstack::types::Mod;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use walkdir::WalkDir;

/// Temporary mod storage with output and load-order locations
pub struct TempModStore {
    temp: TempDir,
}

impl TempModStore {
    /// Create an empty store
    pub fn new() -> Self {
        let temp = TempDir::new().expect("create temp dir");
        fs::create_dir_all(temp.path().join("mods")).expect("create mods dir");
        Self { temp }
    }

    /// Root of the temp directory
    pub fn root(&self) -> &Path {
        self.temp.path()
    }

    /// Mod storage root
    pub fn mods_dir(&self) -> PathBuf {
        self.temp.path().join("mods")
    }

    /// Merged output root
    pub fn output_dir(&self) -> PathBuf {
        self.temp.path().join("merged")
    }

    /// Load-order file
    pub fn load_order_file(&self) -> PathBuf {
        self.temp.path().join("load_order.json")
    }

    /// Planning options pointing at this store's output
    pub fn plan_options(&self) -> MergePlanOptions {
        MergePlanOptions {
            output_dir: self.output_dir(),
            version: "121".to_string(),
            mods_dir: self.mods_dir(),
        }
    }

    /// Stage a mod with the given files (paths relative to the mod root)
    pub fn add_mod(&self, id: &str, files: &[(&str, &str)]) -> Mod {
        let m = Mod::in_storage(&self.mods_dir(), id);
        fs::create_dir_all(&m.source_folder).expect("create mod dir");
        for (relative, contents) in files {
            write_file(&m.source_folder, relative, contents);
        }
        m
    }

    /// Write a config file pointing at this store, using the given tools
    pub fn write_config(&self, archive: &str, changelog: &str, resource_table: &str) -> PathBuf {
        let path = self.temp.path().join("config.toml");
        let content = format!(
            r#"mods_dir = "mods"
output_dir = "merged"
load_order_file = "load_order.json"
game_version = "121"

[tools.archive]
program = "{archive}"
verb = "merge"

[tools.changelog]
program = "{changelog}"
verb = "apply"

[tools.resource_table]
program = "{resource_table}"
verb = "generate"
"#
        );
        fs::write(&path, content).expect("write config");
        path
    }
}

/// Write a file, creating parent directories
pub fn write_file(root: &Path, relative: &str, contents: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().expect("file has parent")).expect("create parent");
    fs::write(path, contents).expect("write file");
}

/// Every regular file under `root` with its bytes, keyed by relative path
pub fn snapshot_tree(root: &Path) -> BTreeMap<PathBuf, Vec<u8>> {
    WalkDir::new(root)
        .into_iter()
        .map(|e| e.expect("walk output"))
        .filter(|e| e.file_type().is_file())
        .map(|e| {
            let relative = e.path().strip_prefix(root).expect("under root").to_path_buf();
            let bytes = fs::read(e.path()).expect("read file");
            (relative, bytes)
        })
        .collect()
}

/// Directories under `root`, relative
pub fn list_dirs(root: &Path) -> Vec<PathBuf> {
    WalkDir::new(root)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .map(|e| e.expect("walk output"))
        .filter(|e| e.file_type().is_dir())
        .map(|e| e.path().strip_prefix(root).expect("under root").to_path_buf())
        .collect()
}
