use super::CmdResult;
use crate::block::{Block, BlockId, BlockKind};
use crate::focus;
use crate::tree;
use crate::workspace::Workspace;

/// Insert a new block right after `after` (in whatever list holds it) and focus it.
pub fn run(
    ws: &mut Workspace,
    after: &BlockId,
    kind: BlockKind,
    content: impl Into<String>,
) -> CmdResult {
    ws.selection.clear();
    let block = Block::new(kind, content);
    let new_id = block.id.clone();
    let page = ws.active_page_mut();
    let Some((list, ix)) = tree::locate_mut(&mut page.blocks, after) else {
        return CmdResult::default();
    };
    list.insert(ix + 1, block);
    focus::set_focus(&mut page.blocks, &new_id);
    page.touch();
    CmdResult::default()
        .with_affected_blocks(vec![new_id.clone()])
        .with_focus(new_id)
}

pub fn paragraph(ws: &mut Workspace, after: &BlockId) -> CmdResult {
    run(ws, after, BlockKind::Paragraph, "")
}

/// Add a block at the end of the active page. A trailing blank paragraph is reused
/// instead of leaving it stranded above the new content.
pub fn append(ws: &mut Workspace, kind: BlockKind, content: impl Into<String>) -> CmdResult {
    let content = content.into();
    let page = ws.active_page();
    let Some(last) = page.blocks.last() else {
        return CmdResult::default();
    };
    let last_id = last.id.clone();
    if matches!(last.kind, BlockKind::Paragraph) && last.is_blank() {
        ws.selection.clear();
        let page = ws.active_page_mut();
        if let Some(block) = tree::find_mut(&mut page.blocks, &last_id) {
            block.kind = kind;
            block.content = content;
        }
        focus::set_focus(&mut page.blocks, &last_id);
        page.touch();
        return CmdResult::default()
            .with_affected_blocks(vec![last_id.clone()])
            .with_focus(last_id);
    }
    run(ws, &last_id, kind, content)
}

/// Insert a fully-formed block after `after` without moving focus. Used for side-channel
/// content such as pasted images. Ids already present on the page are replaced.
pub fn insert(ws: &mut Workspace, after: &BlockId, mut block: Block) -> CmdResult {
    let page = ws.active_page_mut();
    if !tree::contains(&page.blocks, after) {
        return CmdResult::default();
    }
    let existing = tree::all_ids(&page.blocks);
    tree::walk_mut(std::slice::from_mut(&mut block), &mut |b| {
        b.focused = false;
        if existing.contains(&b.id) {
            b.id = BlockId::generate();
        }
    });
    let new_id = block.id.clone();
    if let Some((list, ix)) = tree::locate_mut(&mut page.blocks, after) {
        list.insert(ix + 1, block);
    }
    page.touch();
    CmdResult::default().with_affected_blocks(vec![new_id])
}
