//! Discovery Module
//!
//! Recursively scans the component source roots for candidate component
//! files. No content is inspected here: whether a file really declares a
//! component is decided later by the introspector.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

use crate::config::CheckConfig;

// ═══════════════════════════════════════════════════════════════════════════════
// COMPONENT DISCOVERY
// ═══════════════════════════════════════════════════════════════════════════════

/// Discover all component source files under the configured roots.
///
/// Roots are visited in configuration order and files within a root in
/// file-name order, so repeated runs over an unchanged tree agree. Missing
/// roots are skipped.
pub fn discover_components(app_root: &Path, config: &CheckConfig) -> Vec<PathBuf> {
    let mut seen = HashSet::new();
    let mut components = Vec::new();

    for dir in &config.component_dirs {
        let dir = app_root.join(dir);
        if !dir.is_dir() {
            debug!(dir = %dir.display(), "component root missing, skipping");
            continue;
        }

        for file in find_files_with_extension(&dir, &config.component_extension) {
            if seen.insert(file.clone()) {
                components.push(file);
            }
        }
    }

    components
}

/// Recursively find all files ending in `.<ext>` below `dir`.
pub fn find_files_with_extension(dir: &Path, ext: &str) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for entry in WalkDir::new(dir)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .flatten()
    {
        let path = entry.path();
        if path.is_file() && path.extension().is_some_and(|e| e == ext) {
            files.push(path.to_path_buf());
        }
    }

    files
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "<?php\n").unwrap();
    }

    #[test]
    fn test_discovers_recursively_in_root_order() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "app/Http/Livewire/Legacy.php");
        touch(dir.path(), "app/Livewire/Counter.php");
        touch(dir.path(), "app/Livewire/Admin/UserTable.php");
        touch(dir.path(), "app/Livewire/notes.txt");

        let found = discover_components(dir.path(), &CheckConfig::default());
        let rel: Vec<_> = found
            .iter()
            .map(|p| p.strip_prefix(dir.path()).unwrap().to_path_buf())
            .collect();

        assert_eq!(
            rel,
            vec![
                PathBuf::from("app/Livewire/Admin/UserTable.php"),
                PathBuf::from("app/Livewire/Counter.php"),
                PathBuf::from("app/Http/Livewire/Legacy.php"),
            ]
        );
    }

    #[test]
    fn test_missing_roots_are_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(discover_components(dir.path(), &CheckConfig::default()).is_empty());
    }

    #[test]
    fn test_overlapping_roots_yield_each_file_once() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "app/Livewire/Counter.php");
        let config = CheckConfig {
            component_dirs: vec![PathBuf::from("app"), PathBuf::from("app/Livewire")],
            ..Default::default()
        };
        assert_eq!(discover_components(dir.path(), &config).len(), 1);
    }
}
