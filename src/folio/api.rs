//! # API Facade
//!
//! The API layer is a **thin facade** over the command layer. It is the single entry
//! point for a folio session, whichever front end drives it.
//!
//! ## Role and Responsibilities
//!
//! The API facade:
//! - **Dispatches** to the appropriate command function
//! - **Gates writes**: every mutating call asks the [`AccessPolicy`] first and fails with
//!   [`FolioError::ReadOnly`] when the session may only read
//! - **Schedules saves**: a call that changed something marks the [`Autosave`] tracker;
//!   [`FolioApi::tick`] fires the save once the workspace has been quiet long enough
//! - **Normalizes inputs** (e.g., resolving page selectors to page ids)
//! - **Returns structured types** (`Result<CmdResult>`)
//!
//! ## What the API Does NOT Do
//!
//! - **Editing logic**: That belongs in `commands/*.rs` and [`crate::palette`]
//! - **Presentation concerns**: Returns data structures, not strings
//!
//! Focus and range selection are session state that is never persisted, so moving them
//! is allowed for read-only sessions and does not schedule a save.
//!
//! ## Page Selectors
//!
//! Front ends that cannot point at a page refer to it by text:
//!
//! - **Position**: `N`, the 1-based row in the page tree listing (e.g., `1`, `3`)
//! - **Id**: the id of an existing page (e.g., `page_3f2a...`)
//! - **Title**: anything else is matched case-insensitively against page titles and must
//!   name exactly one page
//!
//! ## Command Palette
//!
//! While a palette session is open its block shows the trigger and filter text. That
//! text is never saved: saves serialize a copy with the block put back, and any other
//! mutation closes the session first.
//!
//! ## Generic Over StorageBackend
//!
//! `FolioApi<B: StorageBackend>` is generic over the storage backend:
//! - Production: `FolioApi<FsBackend>`
//! - Testing: `FolioApi<MemBackend>`

use crate::autosave::Autosave;
use crate::block::{Block, BlockId, BlockKind, BlockType};
use crate::commands::keys::{self, Key, KeyOutcome};
use crate::commands::config::ConfigAction;
use crate::commands::update::BlockPatch;
use crate::commands::{self, CmdResult};
use crate::config::FolioConfig;
use crate::error::{FolioError, Result};
use crate::page::PageId;
use crate::palette::{PaletteItem, PaletteOutcome, PaletteSession};
use crate::seed;
use crate::session::{AccessPolicy, Session};
use crate::store::backend::StorageBackend;
use crate::store::{LoadSource, SaveOutcome, WorkspaceStore};
use crate::workspace::Workspace;
use std::path::Path;
use std::time::Instant;
use tracing::debug;

/// How a front end names a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageSelector {
    Position(usize),
    Id(PageId),
    Title(String),
}

impl PageSelector {
    /// Read selector text against `ws`: a number is a position, an existing page id is
    /// that page, anything else a title fragment.
    pub fn parse(input: &str, ws: &Workspace) -> Self {
        let input = input.trim();
        if let Ok(position) = input.parse::<usize>() {
            return PageSelector::Position(position);
        }
        let id = PageId::from(input);
        if ws.page(&id).is_some() {
            return PageSelector::Id(id);
        }
        PageSelector::Title(input.to_string())
    }
}

/// The main API facade for a folio session.
pub struct FolioApi<B: StorageBackend> {
    workspace: Workspace,
    store: WorkspaceStore<B>,
    session: Session,
    policy: AccessPolicy,
    autosave: Autosave,
    palette: Option<PaletteSession>,
    loaded_from: Option<LoadSource>,
}

impl<B: StorageBackend> FolioApi<B> {
    /// Load the stored workspace, or seed the default one on a cold start.
    ///
    /// Fails when a remote copy exists but cannot be read and there is no cache to fall
    /// back on; seeding then would overwrite it on the next save.
    pub fn load_or_seed(
        store: WorkspaceStore<B>,
        session: Session,
        policy: AccessPolicy,
        config: &FolioConfig,
    ) -> Result<Self> {
        let (workspace, loaded_from) = match store.load()? {
            Some((ws, source)) => (ws, Some(source)),
            None => {
                debug!("nothing stored, seeding default workspace");
                (seed::default_workspace(), None)
            }
        };
        Ok(Self {
            workspace,
            store,
            session,
            policy,
            autosave: Autosave::new(config.autosave_quiet()),
            palette: None,
            loaded_from,
        })
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn store(&self) -> &WorkspaceStore<B> {
        &self.store
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Where the workspace came from; `None` means it was seeded.
    pub fn loaded_from(&self) -> Option<LoadSource> {
        self.loaded_from
    }

    pub fn can_write(&self) -> bool {
        self.policy.can_write(&self.session)
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.autosave.is_dirty()
    }

    fn ensure_writable(&self) -> Result<()> {
        if self.can_write() {
            Ok(())
        } else {
            Err(FolioError::ReadOnly)
        }
    }

    fn record(&mut self, result: &CmdResult) {
        if !result.is_noop() {
            self.autosave.touch(Instant::now());
        }
    }

    fn mutate(&mut self, op: impl FnOnce(&mut Workspace) -> CmdResult) -> Result<CmdResult> {
        self.ensure_writable()?;
        self.cancel_palette();
        let result = op(&mut self.workspace);
        self.record(&result);
        Ok(result)
    }

    // --- persistence ---

    /// Fire the autosave if it is due at `now`.
    pub fn tick(&mut self, now: Instant) -> Option<SaveOutcome> {
        if !self.autosave.take_due(now) {
            return None;
        }
        let outcome = self.save_snapshot();
        debug!(?outcome, "autosave fired");
        Some(outcome)
    }

    /// Save right away, whether or not anything changed.
    pub fn save_now(&mut self) -> Result<SaveOutcome> {
        self.ensure_writable()?;
        self.autosave.mark_saved();
        Ok(self.save_snapshot())
    }

    /// Save pending edits, if any. Used on shutdown.
    pub fn flush(&mut self) -> Option<SaveOutcome> {
        if !self.autosave.is_dirty() || !self.can_write() {
            return None;
        }
        self.autosave.mark_saved();
        Some(self.save_snapshot())
    }

    fn save_snapshot(&self) -> SaveOutcome {
        match &self.palette {
            Some(session) => {
                let mut snapshot = self.workspace.clone();
                session.restore(&mut snapshot);
                self.store.save(&snapshot)
            }
            None => self.store.save(&self.workspace),
        }
    }

    /// Show or change settings stored in `dir`. Changing them takes write access, since
    /// the settings include who that is.
    pub fn configure(&self, dir: &Path, action: ConfigAction) -> Result<CmdResult> {
        if matches!(action, ConfigAction::Set(..)) {
            self.ensure_writable()?;
        }
        commands::config::run(dir, action)
    }

    // --- page selectors ---

    pub fn resolve_page(&self, selector: &PageSelector) -> Result<PageId> {
        match selector {
            PageSelector::Position(position) => self
                .workspace
                .tree_order()
                .get(position.wrapping_sub(1))
                .map(|(_, page)| page.id.clone())
                .ok_or_else(|| FolioError::Api(format!("No page at position {position}"))),
            PageSelector::Id(id) => self
                .workspace
                .page(id)
                .map(|page| page.id.clone())
                .ok_or_else(|| FolioError::PageNotFound(id.clone())),
            PageSelector::Title(term) => {
                let needle = term.to_lowercase();
                let matches: Vec<&PageId> = self
                    .workspace
                    .pages()
                    .iter()
                    .filter(|page| page.display_title().to_lowercase().contains(&needle))
                    .map(|page| &page.id)
                    .collect();
                match matches.as_slice() {
                    [only] => Ok((*only).clone()),
                    [] => Err(FolioError::PageNotFound(PageId::from(term.as_str()))),
                    many => Err(FolioError::Api(format!(
                        "\"{term}\" matches {} pages, be more specific",
                        many.len()
                    ))),
                }
            }
        }
    }

    /// Resolve selector text, as typed by a user.
    pub fn resolve(&self, input: &str) -> Result<PageId> {
        self.resolve_page(&PageSelector::parse(input, &self.workspace))
    }

    // --- reading ---

    pub fn list_pages(&self) -> CmdResult {
        commands::search::list(&self.workspace)
    }

    pub fn search(&self, query: &str) -> CmdResult {
        commands::search::run(&self.workspace, query)
    }

    pub fn export_page(&self, id: &PageId) -> CmdResult {
        commands::export::run(&self.workspace, id)
    }

    /// Switch the displayed page. Navigation is allowed for every session.
    pub fn open_page(&mut self, id: &PageId) -> Result<CmdResult> {
        self.cancel_palette();
        let result = commands::pages::activate(&mut self.workspace, id);
        if result.is_noop() {
            return Err(FolioError::PageNotFound(id.clone()));
        }
        Ok(result)
    }

    // --- focus and selection ---

    pub fn focus(&mut self, id: &BlockId) -> CmdResult {
        commands::selection::focus(&mut self.workspace, id)
    }

    pub fn select_all(&mut self) -> CmdResult {
        commands::selection::select_all(&mut self.workspace)
    }

    pub fn toggle_selected(&mut self, id: &BlockId) {
        self.workspace.selection.toggle(id.clone());
    }

    pub fn clear_selection(&mut self) {
        self.workspace.selection.clear();
    }

    pub fn delete_selected(&mut self) -> Result<CmdResult> {
        self.mutate(commands::selection::bulk_delete)
    }

    // --- block editing ---

    pub fn add_block(
        &mut self,
        after: &BlockId,
        kind: BlockKind,
        content: impl Into<String>,
    ) -> Result<CmdResult> {
        let content = content.into();
        self.mutate(|ws| commands::add::run(ws, after, kind, content))
    }

    pub fn append_block(&mut self, kind: BlockKind, content: impl Into<String>) -> Result<CmdResult> {
        let content = content.into();
        self.mutate(|ws| commands::add::append(ws, kind, content))
    }

    pub fn insert_block(&mut self, after: &BlockId, block: Block) -> Result<CmdResult> {
        self.mutate(|ws| commands::add::insert(ws, after, block))
    }

    pub fn update_block(&mut self, id: &BlockId, patch: BlockPatch) -> Result<CmdResult> {
        self.mutate(|ws| commands::update::run(ws, id, patch))
    }

    pub fn toggle_checked(&mut self, id: &BlockId) -> Result<CmdResult> {
        self.mutate(|ws| commands::update::toggle_checked(ws, id))
    }

    pub fn toggle_open(&mut self, id: &BlockId) -> Result<CmdResult> {
        self.mutate(|ws| commands::update::toggle_open(ws, id))
    }

    pub fn remove_block(&mut self, id: &BlockId, focus_forward: bool) -> Result<CmdResult> {
        self.mutate(|ws| commands::remove::run(ws, id, focus_forward))
    }

    pub fn duplicate_block(&mut self, id: &BlockId) -> Result<CmdResult> {
        self.mutate(|ws| commands::duplicate::run(ws, id))
    }

    pub fn move_block(&mut self, from: usize, to: usize) -> Result<CmdResult> {
        self.mutate(|ws| commands::move_blocks::run(ws, from, to))
    }

    pub fn move_into_toggle(&mut self, id: &BlockId, toggle_id: &BlockId) -> Result<CmdResult> {
        self.mutate(|ws| commands::move_blocks::into_toggle(ws, id, toggle_id))
    }

    pub fn convert_block(&mut self, id: &BlockId, target: BlockType) -> Result<CmdResult> {
        self.mutate(|ws| commands::convert::run(ws, id, target))
    }

    /// Split pasted text into blocks starting at `id`.
    pub fn paste(&mut self, id: &BlockId, text: &str) -> Result<CmdResult> {
        self.ensure_writable()?;
        self.cancel_palette();
        let Some(block_type) =
            crate::tree::find(&self.workspace.active_page().blocks, id).map(Block::block_type)
        else {
            return Ok(CmdResult::default());
        };
        let lines = commands::paste::split_lines(text);
        let result = commands::paste::multi_line(&mut self.workspace, id, block_type, &lines);
        self.record(&result);
        Ok(result)
    }

    pub fn merge_into_previous(&mut self, id: &BlockId) -> Result<CmdResult> {
        self.mutate(|ws| commands::merge::into_previous(ws, id))
    }

    pub fn merge_next_into(&mut self, id: &BlockId) -> Result<CmdResult> {
        self.mutate(|ws| commands::merge::next_into(ws, id))
    }

    /// Run a keyboard policy. Keys the engine leaves alone come back as
    /// [`KeyOutcome::Passthrough`].
    pub fn key(&mut self, id: &BlockId, key: Key) -> Result<KeyOutcome> {
        self.ensure_writable()?;
        self.cancel_palette();
        let outcome = keys::handle(&mut self.workspace, id, key);
        if let KeyOutcome::Handled(result) = &outcome {
            self.record(result);
        }
        Ok(outcome)
    }

    // --- pages ---

    pub fn create_page(&mut self, parent: Option<&PageId>, title: Option<&str>) -> Result<CmdResult> {
        self.mutate(|ws| commands::pages::create(ws, parent, title))
    }

    pub fn create_sub_page(&mut self, block_id: &BlockId) -> Result<CmdResult> {
        self.mutate(|ws| commands::pages::create_sub_page(ws, block_id))
    }

    pub fn link_page(&mut self, block_id: &BlockId, target: &PageId) -> Result<CmdResult> {
        self.mutate(|ws| commands::pages::link_existing(ws, block_id, target))
    }

    pub fn delete_page(&mut self, id: &PageId) -> Result<CmdResult> {
        self.mutate(|ws| commands::pages::delete(ws, id))
    }

    pub fn set_page_icon(&mut self, id: &PageId, icon: Option<String>) -> Result<CmdResult> {
        self.mutate(|ws| commands::pages::set_icon(ws, id, icon))
    }

    pub fn set_page_cover(&mut self, id: &PageId, cover: Option<String>) -> Result<CmdResult> {
        self.mutate(|ws| commands::pages::set_cover(ws, id, cover))
    }

    // --- command palette ---

    pub fn palette(&self) -> Option<&PaletteSession> {
        self.palette.as_ref()
    }

    pub fn palette_items(&self) -> Vec<PaletteItem> {
        self.palette
            .as_ref()
            .map(|session| session.items(&self.workspace))
            .unwrap_or_default()
    }

    /// Open the palette on a block. Returns false when the block does not take it
    /// (code and math blocks keep `/` as text).
    pub fn open_palette(&mut self, block_id: &BlockId) -> Result<bool> {
        self.open_palette_with(block_id, PaletteSession::open)
    }

    /// Open page-link search directly, as typing `[[` does.
    pub fn open_page_search(&mut self, block_id: &BlockId) -> Result<bool> {
        self.open_palette_with(block_id, PaletteSession::open_page_search)
    }

    fn open_palette_with(
        &mut self,
        block_id: &BlockId,
        open: fn(&mut Workspace, &BlockId) -> Option<PaletteSession>,
    ) -> Result<bool> {
        self.ensure_writable()?;
        self.cancel_palette();
        self.palette = open(&mut self.workspace, block_id);
        Ok(self.palette.is_some())
    }

    pub fn palette_type(&mut self, c: char) {
        if let Some(session) = self.palette.as_mut() {
            session.type_char(&mut self.workspace, c);
        }
    }

    pub fn palette_backspace(&mut self) -> Option<CmdResult> {
        let session = self.palette.take()?;
        let outcome = session.backspace(&mut self.workspace);
        self.settle(outcome)
    }

    pub fn palette_next(&mut self) {
        if let Some(session) = self.palette.as_mut() {
            session.next(&self.workspace);
        }
    }

    pub fn palette_prev(&mut self) {
        if let Some(session) = self.palette.as_mut() {
            session.prev(&self.workspace);
        }
    }

    /// Apply the highlighted palette entry. `None` means the palette stays open.
    pub fn palette_commit(&mut self) -> Option<CmdResult> {
        let session = self.palette.take()?;
        let outcome = session.commit(&mut self.workspace);
        self.settle(outcome)
    }

    /// Close the palette, restoring the block's content from before the trigger.
    pub fn cancel_palette(&mut self) -> Option<CmdResult> {
        let session = self.palette.take()?;
        Some(session.cancel(&mut self.workspace))
    }

    fn settle(&mut self, outcome: PaletteOutcome) -> Option<CmdResult> {
        match outcome {
            PaletteOutcome::Open(session) => {
                self.palette = Some(session);
                None
            }
            PaletteOutcome::Closed(result) => {
                self.record(&result);
                Some(result)
            }
        }
    }
}
