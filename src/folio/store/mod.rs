//! # Storage Layer
//!
//! Persistence sits behind [`backend::StorageBackend`], which only knows how to move
//! bytes for two places:
//!
//! 1. **Remote store**: the primary copy. Pages are kept as records keyed by page id,
//!    each carrying `_order` (see [`records`]).
//! 2. **Local cache**: one snapshot of the whole workspace under a fixed name. It is only
//!    written when a remote save fails, so an edit is never silently lost, and cleared
//!    by the next remote save that succeeds.
//!
//! [`WorkspaceStore`] holds the policy on top:
//!
//! - **Load**: a cache that exists holds edits the remote never received, so it wins
//!   unless the remote has a newer page. Otherwise the remote, then nothing (the caller
//!   seeds a default workspace). Remote records are decoded one by one (see [`records`])
//!   and everything goes through [`Workspace::from_pages`], which repairs malformed
//!   content block by block. A remote that exists but cannot be read, with no cache to
//!   fall back on, is an error: seeding over it would destroy it on the next save.
//! - **Save**: oversized embedded images are replaced by a placeholder before the remote
//!   write (see [`strip`]); a failed remote write falls back to caching the full,
//!   untransformed snapshot. Failures end up in a [`SaveOutcome`], never in an error the
//!   editing code has to handle.
//!
//! Every save serializes the snapshot it is handed, and backends write last-writer-wins,
//! so repeated or overlapping saves are harmless.
//!
//! ## Implementations
//!
//! - [`fs_backend::FsBackend`]: files under the data directory.
//! - [`mem_backend::MemBackend`]: in memory, with failure switches for tests.

use crate::error::{FolioError, Result};
use crate::page::{Page, PageId};
use crate::workspace::Workspace;
use chrono::{DateTime, Utc};
use tracing::{debug, error, info, warn};

pub mod backend;
pub mod fs_backend;
pub mod mem_backend;
pub mod records;
pub mod strip;

use backend::StorageBackend;
use records::WorkspaceSnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// The remote copy is current.
    Saved,
    /// The remote write failed; the full snapshot went to the local cache instead.
    CachedLocally,
    /// Both writes failed.
    Lost,
}

/// Where a loaded workspace came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadSource {
    Remote,
    Cache,
}

pub struct WorkspaceStore<B: StorageBackend> {
    /// Exposed as pub(crate) for testing and internal access only.
    pub(crate) backend: B,
    inline_image_limit: usize,
}

impl<B: StorageBackend> WorkspaceStore<B> {
    pub fn with_backend(backend: B, inline_image_limit: usize) -> Self {
        Self {
            backend,
            inline_image_limit,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Load the stored workspace, or `None` on a cold start.
    pub fn load(&self) -> Result<Option<(Workspace, LoadSource)>> {
        let mut unreadable = None;
        let remote = match self.backend.load_remote() {
            Ok(Some(raw)) if raw.is_empty() => {
                debug!("remote store holds no pages");
                None
            }
            Ok(Some(raw)) => {
                let pages = records::decode_records(raw);
                if pages.is_empty() {
                    unreadable = Some("no page record could be read".to_string());
                    None
                } else {
                    Some(pages)
                }
            }
            Ok(None) => {
                debug!("remote store is empty");
                None
            }
            Err(err) => {
                warn!("remote load failed: {err}");
                unreadable = Some(err.to_string());
                None
            }
        };
        let cache = match self.backend.read_cache() {
            Ok(snapshot) => snapshot.filter(|s| !s.pages.is_empty()),
            Err(err) => {
                warn!("local cache unreadable: {err}");
                None
            }
        };

        match (remote, cache) {
            (Some(pages), Some(snapshot)) if newest(&pages) > newest(&snapshot.pages) => {
                info!("remote store is newer than the local cache");
                Ok(assemble(pages, None, LoadSource::Remote))
            }
            (remote, Some(snapshot)) => {
                if remote.is_some() {
                    info!("local cache holds edits the remote store never received");
                }
                Ok(assemble(
                    snapshot.pages,
                    snapshot.active_page_id,
                    LoadSource::Cache,
                ))
            }
            (Some(pages), None) => Ok(assemble(pages, None, LoadSource::Remote)),
            (None, None) => match unreadable {
                Some(reason) => Err(FolioError::Store(format!(
                    "remote store could not be read ({reason}) and there is no local cache"
                ))),
                None => Ok(None),
            },
        }
    }

    pub fn save(&self, ws: &Workspace) -> SaveOutcome {
        let (pages, stripped) =
            strip::strip_oversized_images(ws.pages(), self.inline_image_limit);
        if stripped > 0 {
            info!(stripped, "replaced oversized images before remote save");
        }
        match self.backend.save_remote(&records::to_records(&pages)) {
            Ok(()) => {
                debug!(pages = pages.len(), "saved workspace to remote store");
                if let Err(err) = self.backend.clear_cache() {
                    warn!("could not clear the superseded local cache: {err}");
                }
                SaveOutcome::Saved
            }
            Err(err) => {
                warn!("remote save failed, writing local cache: {err}");
                match self.backend.write_cache(&WorkspaceSnapshot::of(ws)) {
                    Ok(()) => SaveOutcome::CachedLocally,
                    Err(err) => {
                        error!("local cache write failed, changes not persisted: {err}");
                        SaveOutcome::Lost
                    }
                }
            }
        }
    }
}

fn newest(pages: &[Page]) -> Option<DateTime<Utc>> {
    pages.iter().map(|p| p.updated_at).max()
}

fn assemble(
    pages: Vec<Page>,
    active: Option<PageId>,
    source: LoadSource,
) -> Option<(Workspace, LoadSource)> {
    let ws = Workspace::from_pages(pages, active)?;
    info!(pages = ws.pages().len(), ?source, "loaded workspace");
    Some((ws, source))
}
