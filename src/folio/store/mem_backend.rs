use super::backend::StorageBackend;
use super::records::{RawRemotePages, RemotePages, WorkspaceSnapshot};
use crate::error::{FolioError, Result};
use crate::page::PageId;
use std::cell::{Cell, RefCell};

/// In-memory storage backend for testing.
///
/// Uses `RefCell` for interior mutability since folio is single-threaded.
#[derive(Default)]
pub struct MemBackend {
    remote: RefCell<Option<RawRemotePages>>,
    cache: RefCell<Option<WorkspaceSnapshot>>,
    simulate_remote_failure: Cell<bool>,
    simulate_cache_failure: Cell<bool>,
    remote_saves: Cell<usize>,
}

impl MemBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every remote load and save fail, as if the network were down.
    pub fn set_simulate_remote_failure(&self, simulate: bool) {
        self.simulate_remote_failure.set(simulate);
    }

    pub fn set_simulate_cache_failure(&self, simulate: bool) {
        self.simulate_cache_failure.set(simulate);
    }

    /// Number of successful remote saves so far.
    pub fn remote_saves(&self) -> usize {
        self.remote_saves.get()
    }

    pub fn remote_snapshot(&self) -> Option<RawRemotePages> {
        self.remote.borrow().clone()
    }

    /// Overwrite one stored record with arbitrary JSON, as a damaged remote would hold.
    pub fn put_remote_record(&self, id: PageId, record: serde_json::Value) {
        self.remote
            .borrow_mut()
            .get_or_insert_with(Default::default)
            .insert(id, record);
    }

    pub fn cache_snapshot(&self) -> Option<WorkspaceSnapshot> {
        self.cache.borrow().clone()
    }
}

impl StorageBackend for MemBackend {
    fn load_remote(&self) -> Result<Option<RawRemotePages>> {
        if self.simulate_remote_failure.get() {
            return Err(FolioError::Store("Simulated remote failure".to_string()));
        }
        Ok(self.remote.borrow().clone())
    }

    fn save_remote(&self, pages: &RemotePages) -> Result<()> {
        if self.simulate_remote_failure.get() {
            return Err(FolioError::Store("Simulated remote failure".to_string()));
        }
        let raw = pages
            .iter()
            .map(|(id, record)| -> Result<(PageId, serde_json::Value)> {
                Ok((id.clone(), serde_json::to_value(record)?))
            })
            .collect::<Result<RawRemotePages>>()?;
        *self.remote.borrow_mut() = Some(raw);
        self.remote_saves.set(self.remote_saves.get() + 1);
        Ok(())
    }

    fn read_cache(&self) -> Result<Option<WorkspaceSnapshot>> {
        Ok(self.cache.borrow().clone())
    }

    fn write_cache(&self, snapshot: &WorkspaceSnapshot) -> Result<()> {
        if self.simulate_cache_failure.get() {
            return Err(FolioError::Store("Simulated cache failure".to_string()));
        }
        *self.cache.borrow_mut() = Some(snapshot.clone());
        Ok(())
    }

    fn clear_cache(&self) -> Result<()> {
        self.cache.borrow_mut().take();
        Ok(())
    }
}
