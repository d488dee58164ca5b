//! # Workspace (Page Tree)
//!
//! The [`Workspace`] owns every page plus the active-page pointer. Pages form a forest
//! through `parent_id`; the order of `pages` is the display order for siblings.
//!
//! Invariants held by construction:
//! - there is always at least one page, and `active_page_id` names one of them;
//! - page ids are unique;
//! - every `parent_id` names an existing page and no parent chain loops.
//!
//! [`Workspace::from_pages`] enforces these on anything coming from storage and repairs
//! what it can (orphans become roots, empty pages are reseeded, malformed table grids are
//! replaced). Mutations live in [`crate::commands`].

use crate::block::{BlockId, BlockKind, TableGrid};
use crate::focus::Selection;
use crate::page::{Page, PageId, DEFAULT_TITLE};
use crate::tree;
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq)]
pub struct Workspace {
    pages: Vec<Page>,
    active_page_id: PageId,
    /// Range selection over the active page's blocks. Session state, never persisted.
    pub selection: Selection,
}

impl Default for Workspace {
    fn default() -> Self {
        Self::new()
    }
}

impl Workspace {
    /// A workspace holding one fresh root page.
    pub fn new() -> Self {
        let page = Page::new(None);
        Self {
            active_page_id: page.id.clone(),
            pages: vec![page],
            selection: Selection::default(),
        }
    }

    /// Build a workspace from stored pages, repairing what violates the invariants.
    /// Returns `None` when there are no pages at all.
    pub fn from_pages(pages: Vec<Page>, active: Option<PageId>) -> Option<Self> {
        let mut seen = HashSet::new();
        let mut pages: Vec<Page> = pages
            .into_iter()
            .filter(|p| seen.insert(p.id.clone()))
            .collect();
        if pages.is_empty() {
            return None;
        }

        let ids: HashSet<PageId> = pages.iter().map(|p| p.id.clone()).collect();
        for page in &mut pages {
            if page.parent_id.as_ref().is_some_and(|parent| !ids.contains(parent)) {
                tracing::warn!(page = %page.id, "parent page missing, moving page to root");
                page.parent_id = None;
            }
        }
        break_parent_cycles(&mut pages);

        for page in &mut pages {
            repair_blocks(page);
        }

        let active_page_id = active
            .filter(|id| ids.contains(id))
            .or_else(|| {
                pages
                    .iter()
                    .find(|p| p.parent_id.is_none())
                    .map(|p| p.id.clone())
            })
            .unwrap_or_else(|| pages[0].id.clone());

        Some(Self {
            pages,
            active_page_id,
            selection: Selection::default(),
        })
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub(crate) fn pages_mut(&mut self) -> &mut Vec<Page> {
        &mut self.pages
    }

    pub fn page(&self, id: &PageId) -> Option<&Page> {
        self.pages.iter().find(|p| &p.id == id)
    }

    pub fn page_mut(&mut self, id: &PageId) -> Option<&mut Page> {
        self.pages.iter_mut().find(|p| &p.id == id)
    }

    pub fn active_page_id(&self) -> &PageId {
        &self.active_page_id
    }

    pub fn active_page(&self) -> &Page {
        self.page(&self.active_page_id)
            .unwrap_or(&self.pages[0])
    }

    pub fn active_page_mut(&mut self) -> &mut Page {
        let ix = self
            .pages
            .iter()
            .position(|p| p.id == self.active_page_id)
            .unwrap_or(0);
        &mut self.pages[ix]
    }

    /// Switch the displayed page. Unknown ids are ignored. Clears the range selection.
    pub fn set_active(&mut self, id: &PageId) -> bool {
        if self.page(id).is_none() {
            return false;
        }
        self.active_page_id = id.clone();
        self.selection.clear();
        true
    }

    pub fn roots(&self) -> impl Iterator<Item = &Page> {
        self.pages.iter().filter(|p| p.parent_id.is_none())
    }

    pub fn children_of<'a>(&'a self, id: &'a PageId) -> impl Iterator<Item = &'a Page> + 'a {
        self.pages
            .iter()
            .filter(move |p| p.parent_id.as_ref() == Some(id))
    }

    /// `id` and every page reachable from it through `parent_id` chains.
    pub fn subtree_ids(&self, id: &PageId) -> HashSet<PageId> {
        let mut found = HashSet::new();
        if self.page(id).is_none() {
            return found;
        }
        found.insert(id.clone());
        loop {
            let before = found.len();
            for page in &self.pages {
                if page.parent_id.as_ref().is_some_and(|p| found.contains(p)) {
                    found.insert(page.id.clone());
                }
            }
            if found.len() == before {
                return found;
            }
        }
    }

    /// Pages in sidebar order: each root followed depth-first by its descendants.
    pub fn tree_order(&self) -> Vec<(usize, &Page)> {
        let mut out = Vec::with_capacity(self.pages.len());
        for root in self.roots() {
            self.push_subtree(root, 0, &mut out);
        }
        out
    }

    fn push_subtree<'a>(&'a self, page: &'a Page, depth: usize, out: &mut Vec<(usize, &'a Page)>) {
        out.push((depth, page));
        for child in self.children_of(&page.id) {
            self.push_subtree(child, depth + 1, out);
        }
    }

    /// Label shown for a page-link block; dangling links fall back to the default title.
    pub fn link_label(&self, id: &PageId) -> String {
        self.page(id)
            .map(Page::display_title)
            .unwrap_or_else(|| DEFAULT_TITLE.to_string())
    }

    /// Page holding a block, searching nested toggle lists too.
    pub fn page_of_block(&self, id: &BlockId) -> Option<&Page> {
        self.pages.iter().find(|p| tree::contains(&p.blocks, id))
    }

    pub(crate) fn push_page(&mut self, page: Page) {
        self.pages.push(page);
    }

    /// Remove a set of pages. Callers guarantee at least one page survives.
    pub(crate) fn remove_pages(&mut self, ids: &HashSet<PageId>) {
        self.pages.retain(|p| !ids.contains(&p.id));
        if ids.contains(&self.active_page_id) {
            let fallback = self
                .pages
                .iter()
                .find(|p| p.parent_id.is_none())
                .or_else(|| self.pages.first())
                .map(|p| p.id.clone());
            if let Some(fallback) = fallback {
                self.active_page_id = fallback;
                self.selection.clear();
            }
        }
    }
}

fn break_parent_cycles(pages: &mut [Page]) {
    for ix in 0..pages.len() {
        let mut seen = HashSet::new();
        seen.insert(pages[ix].id.clone());
        let mut cursor = pages[ix].parent_id.clone();
        while let Some(parent) = cursor {
            if !seen.insert(parent.clone()) {
                tracing::warn!(page = %pages[ix].id, "parent chain loops, moving page to root");
                pages[ix].parent_id = None;
                break;
            }
            cursor = pages
                .iter()
                .find(|p| p.id == parent)
                .and_then(|p| p.parent_id.clone());
        }
    }
}

/// Fix block-level damage: duplicate ids, multiple focused blocks, bad table grids.
fn repair_blocks(page: &mut Page) {
    let mut ids = HashSet::new();
    let mut focus_seen = false;
    tree::walk_mut(&mut page.blocks, &mut |block| {
        if !ids.insert(block.id.clone()) {
            block.id = BlockId::generate();
            ids.insert(block.id.clone());
        }
        if block.focused {
            block.focused = !focus_seen;
            focus_seen = true;
        }
        if matches!(block.kind, BlockKind::Table) && TableGrid::parse(&block.content).is_none() {
            tracing::warn!(block = %block.id, "malformed table grid, substituting an empty 2x2");
            block.content = TableGrid::empty(2, 2).to_content();
        }
    });
    page.ensure_non_empty();
    page.title = crate::page::derive_title(&page.blocks);
}
