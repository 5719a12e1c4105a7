//! Reading and writing source files
//!
//! The only place in the crate that touches the filesystem for sources.
//! The healing core works on strings and never sees an I/O error.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
#[error("{action} {}: {source}", .path.display())]
pub struct StorageError {
    pub action: &'static str,
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}

impl StorageError {
    fn new(action: &'static str, path: &Path, source: io::Error) -> Self {
        Self {
            action,
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Where sources come from and go to
pub trait SourceStore {
    fn read_text(&self, path: &Path) -> Result<String, StorageError>;
    fn write_text(&self, path: &Path, text: &str) -> Result<(), StorageError>;
}

/// Plain filesystem store
#[derive(Debug, Clone, Copy, Default)]
pub struct FsStore;

impl SourceStore for FsStore {
    fn read_text(&self, path: &Path) -> Result<String, StorageError> {
        fs::read_to_string(path).map_err(|e| StorageError::new("failed to read", path, e))
    }

    fn write_text(&self, path: &Path, text: &str) -> Result<(), StorageError> {
        fs::write(path, text).map_err(|e| StorageError::new("failed to write", path, e))
    }
}

/// `<file>.bak` next to `path`
pub fn backup_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".bak");
    PathBuf::from(name)
}

/// Copy the current contents to `<file>.bak`, then overwrite `path`.
/// Returns the backup location.
pub fn write_with_backup<S: SourceStore + ?Sized>(
    store: &S,
    path: &Path,
    text: &str,
) -> Result<PathBuf, StorageError> {
    let previous = store.read_text(path)?;
    let backup = backup_path(path);
    store.write_text(&backup, &previous)?;
    store.write_text(path, text)?;
    Ok(backup)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;

    #[derive(Default)]
    struct MemoryStore {
        files: RefCell<HashMap<PathBuf, String>>,
    }

    impl SourceStore for MemoryStore {
        fn read_text(&self, path: &Path) -> Result<String, StorageError> {
            self.files.borrow().get(path).cloned().ok_or_else(|| {
                StorageError::new("failed to read", path, io::ErrorKind::NotFound.into())
            })
        }

        fn write_text(&self, path: &Path, text: &str) -> Result<(), StorageError> {
            self.files
                .borrow_mut()
                .insert(path.to_path_buf(), text.to_string());
            Ok(())
        }
    }

    #[test]
    fn test_backup_written_before_overwrite() {
        let store = MemoryStore::default();
        let path = Path::new("pkg/mod.py");
        store.write_text(path, "old\n").expect("write");
        let backup = write_with_backup(&store, path, "new\n").expect("backup");
        assert_eq!(backup, PathBuf::from("pkg/mod.py.bak"));
        assert_eq!(store.read_text(&backup).expect("read"), "old\n");
        assert_eq!(store.read_text(path).expect("read"), "new\n");
    }

    #[test]
    fn test_missing_file_error_names_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("absent.py");
        let err = FsStore.read_text(&path).unwrap_err();
        assert_eq!(err.path, path);
        assert!(err.to_string().contains("absent.py"));
    }

    #[test]
    fn test_fs_round_trip_with_backup() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("a.py");
        FsStore.write_text(&path, "x = 1 \n").expect("write");
        write_with_backup(&FsStore, &path, "x = 1\n").expect("backup");
        assert_eq!(fs::read_to_string(&path).expect("read"), "x = 1\n");
        assert_eq!(
            fs::read_to_string(dir.path().join("a.py.bak")).expect("read"),
            "x = 1 \n"
        );
    }
}
