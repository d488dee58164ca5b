use super::records::{RawRemotePages, RemotePages, WorkspaceSnapshot};
use crate::error::Result;

/// Raw storage I/O.
/// This trait handles the "how" of storage (filesystem vs memory),
/// while WorkspaceStore handles the "what" (load order, stripping, fallback).
pub trait StorageBackend {
    // --- Remote store ---

    /// Load every page record, undecoded. `Ok(None)` when nothing was ever saved.
    fn load_remote(&self) -> Result<Option<RawRemotePages>>;

    /// Replace the remote copy. Last writer wins.
    fn save_remote(&self, pages: &RemotePages) -> Result<()>;

    // --- Local fallback cache ---

    fn read_cache(&self) -> Result<Option<WorkspaceSnapshot>>;

    /// Write the full snapshot. MUST be atomic (e.g. write to tmp then rename).
    fn write_cache(&self, snapshot: &WorkspaceSnapshot) -> Result<()>;

    /// Drop the cache once the remote copy has caught up. Missing is not an error.
    fn clear_cache(&self) -> Result<()>;
}
