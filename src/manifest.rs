//! Action manifest lookup

use std::path::{Path, PathBuf};

/// Manifest file names, in lookup order
pub const MANIFEST_NAMES: [&str; 2] = ["action.yml", "action.yaml"];

/// Path of the action manifest in `dir`, if there is one
pub fn find_manifest(dir: &Path) -> Option<PathBuf> {
    MANIFEST_NAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.is_file())
}
