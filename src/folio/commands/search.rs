use super::{CmdResult, PageSummary};
use crate::block::BlockType;
use crate::page::Page;
use crate::tree;
use crate::workspace::Workspace;

pub const NO_SNIPPET: &str = "No text content available";

/// Pages whose title or any block (nested ones included) contains `query`, compared
/// case-insensitively on visible text. Results keep tree order.
pub fn run(ws: &Workspace, query: &str) -> CmdResult {
    let needle = query.trim().to_lowercase();
    let hits = ws
        .tree_order()
        .into_iter()
        .filter(|(_, page)| needle.is_empty() || matches(page, &needle))
        .map(|(depth, page)| summary(page, depth))
        .collect();
    CmdResult::default().with_listed_pages(hits)
}

/// All pages in tree order, each with its snippet.
pub fn list(ws: &Workspace) -> CmdResult {
    run(ws, "")
}

pub fn summary(page: &Page, depth: usize) -> PageSummary {
    PageSummary {
        id: page.id.clone(),
        title: page.display_title(),
        icon: page.icon.clone(),
        depth,
        snippet: Some(snippet(page)),
        updated_at: page.updated_at,
    }
}

/// Visible text of the first non-empty paragraph.
pub fn snippet(page: &Page) -> String {
    page.blocks
        .iter()
        .filter(|b| b.block_type() == BlockType::Paragraph)
        .map(|b| b.visible_text().trim().to_string())
        .find(|text| !text.is_empty())
        .unwrap_or_else(|| NO_SNIPPET.to_string())
}

fn matches(page: &Page, needle: &str) -> bool {
    if page.display_title().to_lowercase().contains(needle) {
        return true;
    }
    let mut found = false;
    tree::walk(&page.blocks, &mut |b| {
        if !found && b.visible_text().to_lowercase().contains(needle) {
            found = true;
        }
    });
    found
}
