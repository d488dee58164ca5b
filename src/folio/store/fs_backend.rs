use super::backend::StorageBackend;
use super::records::{RawRemotePages, RemotePages, WorkspaceSnapshot};
use crate::error::{FolioError, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use uuid::Uuid;

const REMOTE_DIR: &str = "remote";
const REMOTE_FILE: &str = "pages.json";
const CACHE_FILE: &str = "folio-cache.json";

/// Filesystem backend.
///
/// ```text
/// <root>/
/// ├── remote/pages.json   # page records keyed by id, each with `_order`
/// └── folio-cache.json    # full snapshot written when a remote save fails
/// ```
pub struct FsBackend {
    root: PathBuf,
}

impl FsBackend {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn remote_path(&self) -> PathBuf {
        self.root.join(REMOTE_DIR).join(REMOTE_FILE)
    }

    pub fn cache_path(&self) -> PathBuf {
        self.root.join(CACHE_FILE)
    }

    fn ensure_dir(&self, path: &Path) -> Result<()> {
        if !path.exists() {
            fs::create_dir_all(path).map_err(FolioError::Io)?;
        }
        Ok(())
    }

    fn read_json<T: DeserializeOwned>(&self, path: &Path) -> Result<Option<T>> {
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(path).map_err(FolioError::Io)?;
        let value = serde_json::from_str(&content).map_err(FolioError::Serialization)?;
        Ok(Some(value))
    }

    fn write_json<T: Serialize>(&self, path: &Path, value: &T) -> Result<()> {
        let dir = path
            .parent()
            .ok_or_else(|| FolioError::Store(format!("No parent for {}", path.display())))?;
        self.ensure_dir(dir)?;
        let content = serde_json::to_string_pretty(value).map_err(FolioError::Serialization)?;

        // Atomic write
        let tmp_file = dir.join(format!(".folio-{}.tmp", Uuid::new_v4()));
        fs::write(&tmp_file, content).map_err(FolioError::Io)?;
        fs::rename(&tmp_file, path).map_err(FolioError::Io)?;
        Ok(())
    }
}

impl StorageBackend for FsBackend {
    fn load_remote(&self) -> Result<Option<RawRemotePages>> {
        self.read_json(&self.remote_path())
    }

    fn save_remote(&self, pages: &RemotePages) -> Result<()> {
        self.write_json(&self.remote_path(), pages)
    }

    fn read_cache(&self) -> Result<Option<WorkspaceSnapshot>> {
        self.read_json(&self.cache_path())
    }

    fn write_cache(&self, snapshot: &WorkspaceSnapshot) -> Result<()> {
        self.write_json(&self.cache_path(), snapshot)
    }

    fn clear_cache(&self) -> Result<()> {
        match fs::remove_file(self.cache_path()) {
            Err(err) if err.kind() != ErrorKind::NotFound => Err(FolioError::Io(err)),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::Page;
    use crate::store::records::to_records;
    use tempfile::tempdir;

    #[test]
    fn missing_files_read_as_none() {
        let temp = tempdir().unwrap();
        let backend = FsBackend::new(temp.path().to_path_buf());
        assert!(backend.load_remote().unwrap().is_none());
        assert!(backend.read_cache().unwrap().is_none());
    }

    #[test]
    fn remote_and_cache_round_trip_through_disk() {
        let temp = tempdir().unwrap();
        let backend = FsBackend::new(temp.path().join("data"));
        let page = Page::new(None);
        backend.save_remote(&to_records(&[page.clone()])).unwrap();
        assert!(backend.remote_path().exists());

        let loaded = backend.load_remote().unwrap().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[&page.id]["blocks"].as_array().unwrap().len(), 2);

        let snapshot = WorkspaceSnapshot {
            pages: vec![page.clone()],
            active_page_id: Some(page.id.clone()),
        };
        backend.write_cache(&snapshot).unwrap();
        let cached = backend.read_cache().unwrap().unwrap();
        assert_eq!(cached.active_page_id, Some(page.id));

        backend.clear_cache().unwrap();
        assert!(!backend.cache_path().exists());
        // clearing twice is fine
        backend.clear_cache().unwrap();

        // no temp files left behind
        let leftovers = fs::read_dir(temp.path().join("data"))
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .count();
        assert_eq!(leftovers, 0);
    }

    #[test]
    fn corrupt_remote_is_an_error() {
        let temp = tempdir().unwrap();
        let backend = FsBackend::new(temp.path().to_path_buf());
        fs::create_dir_all(temp.path().join(REMOTE_DIR)).unwrap();
        fs::write(backend.remote_path(), "{not json").unwrap();
        assert!(matches!(
            backend.load_remote(),
            Err(FolioError::Serialization(_))
        ));
    }
}
