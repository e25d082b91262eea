//! Discovery of snapshot files from command-line paths

use crate::error::Result;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Expand paths into a list of snapshot files
///
/// Files are kept as given, in order, whatever their extension. Directories
/// are walked for `*.json` files, sorted by path.
pub fn discover_snapshots<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for path in paths {
        let path = path.as_ref();

        if !path.is_dir() {
            files.push(path.to_path_buf());
            continue;
        }

        let mut found = Vec::new();
        for entry in WalkDir::new(path).follow_links(true) {
            let entry = entry?;
            let entry_path = entry.path();
            if entry.file_type().is_file() && is_snapshot(entry_path) {
                found.push(entry_path.to_path_buf());
            }
        }
        found.sort();
        files.extend(found);
    }

    Ok(files)
}

fn is_snapshot(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}
