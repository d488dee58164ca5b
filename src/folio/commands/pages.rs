//! Page tree operations.
//!
//! Pages nest through `parent_id`. Deleting a page takes its whole subtree with it, but
//! never the last remaining page. Page-link blocks pointing at deleted pages are left in
//! place; they render with the fallback label from [`Workspace::link_label`].

use super::{convert, CmdMessage, CmdResult};
use crate::block::{BlockId, BlockKind};
use crate::page::{Page, PageId};
use crate::tree;
use crate::workspace::Workspace;
use tracing::{debug, info};

/// Create a page (optionally under `parent`) and make it the active page.
pub fn create(ws: &mut Workspace, parent: Option<&PageId>, title: Option<&str>) -> CmdResult {
    if let Some(parent) = parent {
        if ws.page(parent).is_none() {
            let mut result = CmdResult::default();
            result.add_message(CmdMessage::error(format!("Page {parent} not found")));
            return result;
        }
    }
    let mut page = Page::new(parent.cloned());
    if let Some(title) = title.filter(|t| !t.trim().is_empty()) {
        page.blocks[0].content = title.to_string();
        page.touch();
    }
    let id = page.id.clone();
    let mut result = CmdResult::default().with_affected_pages(vec![id.clone()]);
    result.add_message(CmdMessage::success(format!(
        "Created page: {}",
        page.display_title()
    )));
    ws.push_page(page);
    ws.set_active(&id);
    info!(page = %id, "created page");
    result
}

/// Turn a block of the active page into a link to a brand new child page, then switch to
/// the new page. Both changes happen or neither does.
pub fn create_sub_page(ws: &mut Workspace, block_id: &BlockId) -> CmdResult {
    let parent = ws.active_page_id().clone();
    if !tree::contains(&ws.active_page().blocks, block_id) {
        return CmdResult::default();
    }
    let page = Page::new(Some(parent));
    let new_id = page.id.clone();

    let active = ws.active_page_mut();
    let link = BlockKind::PageLink {
        page_id: new_id.clone(),
    };
    if !convert::apply(&mut active.blocks, block_id, link) {
        return CmdResult::default();
    }
    active.touch();
    ws.push_page(page);
    ws.set_active(&new_id);
    info!(page = %new_id, "created sub-page");
    CmdResult::default()
        .with_affected_blocks(vec![block_id.clone()])
        .with_affected_pages(vec![new_id])
}

/// Point a block of the active page at an existing page. The active page itself is not a
/// valid target.
pub fn link_existing(ws: &mut Workspace, block_id: &BlockId, target: &PageId) -> CmdResult {
    if ws.page(target).is_none() || target == ws.active_page_id() {
        return CmdResult::default();
    }
    ws.selection.clear();
    let page = ws.active_page_mut();
    let link = BlockKind::PageLink {
        page_id: target.clone(),
    };
    if !convert::apply(&mut page.blocks, block_id, link) {
        return CmdResult::default();
    }
    page.touch();
    CmdResult::default().with_affected_blocks(vec![block_id.clone()])
}

/// Delete a page and all its descendants. Refused when nothing would be left.
pub fn delete(ws: &mut Workspace, id: &PageId) -> CmdResult {
    let mut result = CmdResult::default();
    let Some(title) = ws.page(id).map(Page::display_title) else {
        result.add_message(CmdMessage::error(format!("Page {id} not found")));
        return result;
    };
    let doomed = ws.subtree_ids(id);
    if doomed.len() >= ws.pages().len() {
        result.add_message(CmdMessage::warning("Cannot delete the last page"));
        return result;
    }
    debug!(page = %id, cascade = doomed.len(), "deleting page subtree");
    ws.remove_pages(&doomed);

    let mut removed: Vec<PageId> = doomed.into_iter().collect();
    removed.sort();
    let count = removed.len();
    result.affected_pages = removed;
    if count > 1 {
        result.add_message(CmdMessage::success(format!(
            "Deleted page: {title} and {} sub-page(s)",
            count - 1
        )));
    } else {
        result.add_message(CmdMessage::success(format!("Deleted page: {title}")));
    }
    info!(page = %id, count, "deleted pages");
    result
}

pub fn set_icon(ws: &mut Workspace, id: &PageId, icon: Option<String>) -> CmdResult {
    let Some(page) = ws.page_mut(id) else {
        return CmdResult::default();
    };
    page.icon = icon.filter(|i| !i.trim().is_empty());
    page.touch();
    CmdResult::default().with_affected_pages(vec![id.clone()])
}

pub fn set_cover(ws: &mut Workspace, id: &PageId, cover: Option<String>) -> CmdResult {
    let Some(page) = ws.page_mut(id) else {
        return CmdResult::default();
    };
    page.cover = cover.filter(|c| !c.trim().is_empty());
    page.touch();
    CmdResult::default().with_affected_pages(vec![id.clone()])
}

/// Switch the displayed page.
pub fn activate(ws: &mut Workspace, id: &PageId) -> CmdResult {
    if !ws.set_active(id) {
        return CmdResult::default();
    }
    CmdResult::default().with_affected_pages(vec![id.clone()])
}
