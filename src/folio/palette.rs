//! # Command Palette
//!
//! Typing [`TRIGGER`] in a text block opens a [`PaletteSession`]. While it is open every
//! further character extends a filter query matched against the catalog labels
//! (case-insensitive substring). The block shows what the user typed
//! (`prior + trigger + query`), but nothing of it survives the session: committing or
//! cancelling first puts back the exact pre-trigger content.
//!
//! The "Link to page" entry, or typing [`PAGE_LINK_TRIGGER`] directly, switches the same
//! mechanics over to the other pages of the workspace.
//!
//! Raw-source blocks (code, math, image) never open the palette; the trigger is just a
//! character there.

use crate::block::{BlockId, BlockType};
use crate::commands::{convert, pages, CmdResult};
use crate::page::PageId;
use crate::tree;
use crate::workspace::Workspace;

pub const TRIGGER: &str = "/";
pub const PAGE_LINK_TRIGGER: &str = "[[";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaletteAction {
    Convert(BlockType),
    NewSubPage,
    LinkExistingPage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogEntry {
    pub id: &'static str,
    pub label: &'static str,
    pub description: &'static str,
    pub action: PaletteAction,
}

const fn entry(
    id: &'static str,
    label: &'static str,
    description: &'static str,
    action: PaletteAction,
) -> CatalogEntry {
    CatalogEntry {
        id,
        label,
        description,
        action,
    }
}

pub const CATALOG: &[CatalogEntry] = &[
    entry("p", "Text", "Plain text.", PaletteAction::Convert(BlockType::Paragraph)),
    entry("h1", "Heading 1", "Big section heading.", PaletteAction::Convert(BlockType::Heading1)),
    entry("h2", "Heading 2", "Medium section heading.", PaletteAction::Convert(BlockType::Heading2)),
    entry("h3", "Heading 3", "Small section heading.", PaletteAction::Convert(BlockType::Heading3)),
    entry("bullet", "Bulleted list", "Simple bulleted list.", PaletteAction::Convert(BlockType::Bullet)),
    entry("numbered", "Numbered list", "List with numbering.", PaletteAction::Convert(BlockType::Numbered)),
    entry("todo", "To-do list", "Track tasks with a checkbox.", PaletteAction::Convert(BlockType::Todo)),
    entry("toggle", "Toggle list", "Collapsible block with nested content.", PaletteAction::Convert(BlockType::Toggle)),
    entry("quote", "Quote", "Capture a quote.", PaletteAction::Convert(BlockType::Quote)),
    entry("callout", "Callout", "Make writing stand out.", PaletteAction::Convert(BlockType::Callout)),
    entry("divider", "Divider", "Visually divide blocks.", PaletteAction::Convert(BlockType::Divider)),
    entry("code", "Code", "Syntax highlighted code.", PaletteAction::Convert(BlockType::Code)),
    entry("math", "Math Equation", "Block equation.", PaletteAction::Convert(BlockType::Math)),
    entry("table", "Table", "Simple grid of cells.", PaletteAction::Convert(BlockType::Table)),
    entry("image", "Image", "Upload or embed an image.", PaletteAction::Convert(BlockType::Image)),
    entry("page", "Page", "Embed a sub-page.", PaletteAction::NewSubPage),
    entry("link", "Link to page", "Link an existing page.", PaletteAction::LinkExistingPage),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaletteMode {
    Blocks,
    PageSearch,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PaletteItem {
    Entry(&'static CatalogEntry),
    Page { id: PageId, title: String },
}

impl PaletteItem {
    pub fn label(&self) -> &str {
        match self {
            PaletteItem::Entry(entry) => entry.label,
            PaletteItem::Page { title, .. } => title,
        }
    }
}

/// What a palette step leaves behind: the session, still open, or the final result.
#[derive(Debug, Clone, PartialEq)]
pub enum PaletteOutcome {
    Open(PaletteSession),
    Closed(CmdResult),
}

#[derive(Debug, Clone, PartialEq)]
pub struct PaletteSession {
    page_id: PageId,
    block_id: BlockId,
    mode: PaletteMode,
    trigger: &'static str,
    prior_content: String,
    query: String,
    highlighted: usize,
}

impl PaletteSession {
    /// Open the block-type palette on a block of the active page.
    pub fn open(ws: &mut Workspace, block_id: &BlockId) -> Option<Self> {
        Self::start(ws, block_id, PaletteMode::Blocks, TRIGGER)
    }

    /// Open page-link search directly.
    pub fn open_page_search(ws: &mut Workspace, block_id: &BlockId) -> Option<Self> {
        Self::start(ws, block_id, PaletteMode::PageSearch, PAGE_LINK_TRIGGER)
    }

    fn start(
        ws: &mut Workspace,
        block_id: &BlockId,
        mode: PaletteMode,
        trigger: &'static str,
    ) -> Option<Self> {
        let block = tree::find(&ws.active_page().blocks, block_id)?;
        if block.block_type().is_raw_source() {
            return None;
        }
        let prior_content = block.content.clone();
        ws.selection.clear();
        let session = Self {
            page_id: ws.active_page_id().clone(),
            block_id: block_id.clone(),
            mode,
            trigger,
            prior_content,
            query: String::new(),
            highlighted: 0,
        };
        session.sync(ws);
        Some(session)
    }

    pub fn block_id(&self) -> &BlockId {
        &self.block_id
    }

    /// The page the session's block lives on.
    pub fn page_id(&self) -> &PageId {
        &self.page_id
    }

    pub fn mode(&self) -> PaletteMode {
        self.mode
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn highlighted(&self) -> usize {
        self.highlighted
    }

    /// Entries matching the current query, in display order.
    pub fn items(&self, ws: &Workspace) -> Vec<PaletteItem> {
        let needle = self.query.to_lowercase();
        match self.mode {
            PaletteMode::Blocks => CATALOG
                .iter()
                .filter(|e| e.label.to_lowercase().contains(&needle))
                .map(PaletteItem::Entry)
                .collect(),
            PaletteMode::PageSearch => ws
                .tree_order()
                .into_iter()
                .map(|(_, page)| page)
                .filter(|page| page.id != self.page_id)
                .map(|page| PaletteItem::Page {
                    id: page.id.clone(),
                    title: page.display_title(),
                })
                .filter(|item| item.label().to_lowercase().contains(&needle))
                .collect(),
        }
    }

    pub fn type_char(&mut self, ws: &mut Workspace, c: char) {
        self.query.push(c);
        self.highlighted = 0;
        self.sync(ws);
    }

    /// Delete one query character. Deleting past the trigger closes the palette.
    pub fn backspace(mut self, ws: &mut Workspace) -> PaletteOutcome {
        if self.query.pop().is_none() {
            return PaletteOutcome::Closed(self.cancel(ws));
        }
        self.highlighted = 0;
        self.sync(ws);
        PaletteOutcome::Open(self)
    }

    pub fn next(&mut self, ws: &Workspace) {
        let count = self.items(ws).len();
        if count > 0 {
            self.highlighted = (self.highlighted + 1) % count;
        }
    }

    pub fn prev(&mut self, ws: &Workspace) {
        let count = self.items(ws).len();
        if count > 0 {
            self.highlighted = (self.highlighted + count - 1) % count;
        }
    }

    /// Apply the highlighted item. Choosing "Link to page" keeps the palette open in
    /// page-search mode; an empty match list just closes it.
    pub fn commit(mut self, ws: &mut Workspace) -> PaletteOutcome {
        // every action below edits the active page
        if ws.active_page_id() != &self.page_id {
            return PaletteOutcome::Closed(self.cancel(ws));
        }
        let items = self.items(ws);
        let Some(item) = items.get(self.highlighted).or_else(|| items.first()).cloned() else {
            return PaletteOutcome::Closed(self.cancel(ws));
        };
        match item {
            PaletteItem::Entry(entry) if entry.action == PaletteAction::LinkExistingPage => {
                self.mode = PaletteMode::PageSearch;
                self.query.clear();
                self.highlighted = 0;
                self.sync(ws);
                PaletteOutcome::Open(self)
            }
            PaletteItem::Entry(entry) => {
                self.restore(ws);
                let result = match entry.action {
                    PaletteAction::Convert(block_type) => {
                        convert::run(ws, &self.block_id, block_type)
                    }
                    PaletteAction::NewSubPage => pages::create_sub_page(ws, &self.block_id),
                    PaletteAction::LinkExistingPage => CmdResult::default(),
                };
                PaletteOutcome::Closed(result)
            }
            PaletteItem::Page { id, .. } => {
                self.restore(ws);
                PaletteOutcome::Closed(pages::link_existing(ws, &self.block_id, &id))
            }
        }
    }

    /// Close without applying anything, putting back the pre-trigger content.
    pub fn cancel(self, ws: &mut Workspace) -> CmdResult {
        self.restore(ws);
        CmdResult::default()
    }

    /// Put back the block's pre-trigger content.
    pub(crate) fn restore(&self, ws: &mut Workspace) {
        self.write_content(ws, self.prior_content.clone());
    }

    fn sync(&self, ws: &mut Workspace) {
        let shown = format!("{}{}{}", self.prior_content, self.trigger, self.query);
        self.write_content(ws, shown);
    }

    fn write_content(&self, ws: &mut Workspace, content: String) {
        let Some(page) = ws.page_mut(&self.page_id) else {
            return;
        };
        if let Some(block) = tree::find_mut(&mut page.blocks, &self.block_id) {
            block.content = content;
            page.touch();
        }
    }
}
