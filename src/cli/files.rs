//! Python source discovery

use anyhow::{bail, Result};
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};

const PYTHON_EXTENSIONS: &[&str] = &["py", "pyi"];

fn is_python(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| PYTHON_EXTENSIONS.contains(&ext))
}

/// Expand files and directories into a sorted, de-duplicated file list.
///
/// Files named explicitly are taken as-is whatever their extension;
/// directories are walked honoring `.gitignore`.
pub fn collect_files(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for path in paths {
        if path.is_file() {
            files.push(path.clone());
            continue;
        }
        if !path.is_dir() {
            bail!("Path does not exist: {}", path.display());
        }

        let walker = WalkBuilder::new(path)
            .hidden(true)
            .git_ignore(true)
            .git_global(false)
            .git_exclude(true)
            .build();

        for entry in walker.filter_map(|e| e.ok()) {
            let entry_path = entry.path();
            if entry_path.is_file() && is_python(entry_path) {
                files.push(entry_path.to_path_buf());
            }
        }
    }

    files.sort();
    files.dedup();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_collects_python_files_only() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::create_dir(dir.path().join("pkg")).expect("mkdir");
        fs::write(dir.path().join("a.py"), "x = 1\n").expect("write");
        fs::write(dir.path().join("pkg/b.pyi"), "x: int\n").expect("write");
        fs::write(dir.path().join("notes.txt"), "hi\n").expect("write");

        let files = collect_files(&[dir.path().to_path_buf()]).expect("collect");
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a.py", "b.pyi"]);
    }

    #[test]
    fn test_missing_path_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        assert!(collect_files(&[dir.path().join("nope")]).is_err());
    }
}
