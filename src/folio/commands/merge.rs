use super::CmdResult;
use crate::block::{Block, BlockId};
use crate::focus;
use crate::tree;
use crate::workspace::Workspace;

/// Only text blocks without children can be joined.
fn mergeable(block: &Block) -> bool {
    block.block_type().is_text() && block.children().map_or(true, Vec::is_empty)
}

/// Append a block's content to its previous sibling and remove it. Focus goes to the
/// previous sibling.
pub fn into_previous(ws: &mut Workspace, id: &BlockId) -> CmdResult {
    ws.selection.clear();
    let page = ws.active_page_mut();
    let Some((list, ix)) = tree::locate_mut(&mut page.blocks, id) else {
        return CmdResult::default();
    };
    if ix == 0 || !mergeable(&list[ix]) || !list[ix - 1].block_type().is_text() {
        return CmdResult::default();
    }
    let removed = list.remove(ix);
    let target = &mut list[ix - 1];
    target.content.push_str(&removed.content);
    let target_id = target.id.clone();
    focus::set_focus(&mut page.blocks, &target_id);
    page.touch();
    CmdResult::default()
        .with_affected_blocks(vec![target_id.clone(), id.clone()])
        .with_focus(target_id)
}

/// Pull the next sibling's content into this block and remove the sibling. Focus stays.
pub fn next_into(ws: &mut Workspace, id: &BlockId) -> CmdResult {
    ws.selection.clear();
    let page = ws.active_page_mut();
    let Some((list, ix)) = tree::locate_mut(&mut page.blocks, id) else {
        return CmdResult::default();
    };
    if ix + 1 >= list.len() || !list[ix].block_type().is_text() || !mergeable(&list[ix + 1]) {
        return CmdResult::default();
    }
    let removed = list.remove(ix + 1);
    list[ix].content.push_str(&removed.content);
    focus::set_focus(&mut page.blocks, id);
    page.touch();
    CmdResult::default()
        .with_affected_blocks(vec![id.clone(), removed.id])
        .with_focus(id.clone())
}
