//! Filesystem fixture helpers
//!
//! Source trees are declared as relative file paths; each file's content is
//! its own relative path, so a copied tree can be verified both by shape and
//! by content.

use std::fs;
use std::path::Path;

/// Create every listed file (and its parent directories) under `root`,
/// writing the relative path as the file's content
pub fn build_tree(root: &Path, files: &[&str]) {
    for rel in files {
        let path = root.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("fixture mkdir");
        }
        fs::write(&path, rel).expect("fixture write");
    }
}

/// Sorted relative paths of every file below `root`
pub fn tree_snapshot(root: &Path) -> Vec<String> {
    let mut paths = Vec::new();
    collect_files(root, root, &mut paths);
    paths.sort();
    paths
}

fn collect_files(root: &Path, dir: &Path, out: &mut Vec<String>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_files(root, &path, out);
        } else if let Ok(rel) = path.strip_prefix(root) {
            out.push(rel.to_string_lossy().replace('\\', "/"));
        }
    }
}
