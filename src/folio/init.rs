//! # Startup
//!
//! Everything a front end needs before the first command runs: where the data lives,
//! which settings apply and who is editing.
//!
//! ## Data Directory
//!
//! Resolved in this order:
//! 1. An explicit `data_override` (the CLI's `--data` flag).
//! 2. The `FOLIO_HOME` environment variable, mostly used to isolate tests.
//! 3. The OS-appropriate data directory (via the `directories` crate).
//!
//! The directory holds `config.json`, the remote store under `remote/` and the local
//! cache file (see [`crate::store::fs_backend`]).
//!
//! ## Identity
//!
//! The editing identity comes from the caller (the CLI's `--as` flag or `FOLIO_IDENTITY`).
//! With an `admin` configured, only that identity may write; everyone else gets a
//! read-only session over the same workspace.

use crate::api::FolioApi;
use crate::config::FolioConfig;
use crate::error::{FolioError, Result};
use crate::session::{AccessPolicy, Session};
use crate::store::fs_backend::FsBackend;
use crate::store::WorkspaceStore;
use directories::ProjectDirs;
use std::path::PathBuf;
use tracing::{debug, warn};

pub const HOME_ENV: &str = "FOLIO_HOME";

pub struct FolioContext {
    pub api: FolioApi<FsBackend>,
    pub config: FolioConfig,
    pub data_dir: PathBuf,
}

/// The data directory when no override is given.
pub fn data_dir() -> Result<PathBuf> {
    if let Some(home) = std::env::var_os(HOME_ENV).filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(home));
    }
    ProjectDirs::from("com", "folio", "folio")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .ok_or_else(|| FolioError::Store("Could not determine a data directory".to_string()))
}

/// Load config and the workspace, and open a session for `identity`.
pub fn initialize(data_override: Option<PathBuf>, identity: Option<String>) -> Result<FolioContext> {
    let data_dir = match data_override {
        Some(path) => path,
        None => data_dir()?,
    };
    debug!(dir = %data_dir.display(), "using data directory");

    let config = FolioConfig::load(&data_dir).unwrap_or_else(|err| {
        warn!("config unreadable, using defaults: {err}");
        FolioConfig::default()
    });

    let session = identity
        .map(Session::as_identity)
        .unwrap_or_else(Session::anonymous);
    let policy = AccessPolicy::from_config(&config);

    let store = WorkspaceStore::with_backend(FsBackend::new(data_dir.clone()), config.inline_image_limit);
    let api = FolioApi::load_or_seed(store, session, policy, &config)?;

    Ok(FolioContext {
        api,
        config,
        data_dir,
    })
}
