use crate::block::{Block, BlockKind};
use crate::page::{Page, PageId};
use crate::workspace::Workspace;

pub(crate) fn block(id: &str, kind: BlockKind, content: &str) -> Block {
    let mut b = Block::new(kind, content);
    b.id = id.into();
    b
}

pub(crate) fn para(id: &str, content: &str) -> Block {
    block(id, BlockKind::Paragraph, content)
}

pub(crate) fn toggle(id: &str, content: &str, children: Vec<Block>) -> Block {
    block(
        id,
        BlockKind::Toggle {
            toggled: true,
            children,
        },
        content,
    )
}

pub(crate) fn page_with(id: &str, parent: Option<&str>, blocks: Vec<Block>) -> Page {
    let mut page = Page::new(parent.map(PageId::from));
    page.id = id.into();
    page.blocks = blocks;
    page
}

/// A single-page workspace (page id `p1`) holding `blocks`.
pub(crate) fn workspace(blocks: Vec<Block>) -> Workspace {
    Workspace::from_pages(vec![page_with("p1", None, blocks)], None).unwrap()
}

pub(crate) fn top_ids(ws: &Workspace) -> Vec<String> {
    ws.active_page()
        .blocks
        .iter()
        .map(|b| b.id.to_string())
        .collect()
}
