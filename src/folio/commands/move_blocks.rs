use super::{CmdMessage, CmdResult};
use crate::block::{BlockId, BlockType};
use crate::tree;
use crate::workspace::Workspace;

/// Drag reorder of the active page's top-level list: take the block at `from` out, then
/// insert it at `to` in the shortened list.
pub fn run(ws: &mut Workspace, from: usize, to: usize) -> CmdResult {
    ws.selection.clear();
    let page = ws.active_page_mut();
    let len = page.blocks.len();
    if from >= len {
        return CmdResult::default();
    }
    let to = to.min(len - 1);
    if from == to {
        return CmdResult::default();
    }
    let block = page.blocks.remove(from);
    let id = block.id.clone();
    page.blocks.insert(to, block);
    page.touch();
    CmdResult::default().with_affected_blocks(vec![id])
}

/// Drop a block into a toggle: it leaves its current list and becomes the toggle's last
/// child. Refused when the toggle is the block itself or sits inside it.
pub fn into_toggle(ws: &mut Workspace, id: &BlockId, toggle_id: &BlockId) -> CmdResult {
    ws.selection.clear();
    let page = ws.active_page_mut();
    let is_toggle = tree::find(&page.blocks, toggle_id)
        .is_some_and(|b| b.block_type() == BlockType::Toggle);
    if !is_toggle || !tree::contains(&page.blocks, id) {
        return CmdResult::default();
    }
    if id == toggle_id || tree::is_descendant(&page.blocks, id, toggle_id) {
        let mut result = CmdResult::default();
        result.add_message(CmdMessage::warning(
            "A block cannot be moved inside itself",
        ));
        return result;
    }

    // Work on a copy and swap it in, so the block is never detached from both places.
    let mut next = page.blocks.clone();
    let Some((list, ix)) = tree::locate_mut(&mut next, id) else {
        return CmdResult::default();
    };
    let moved = list.remove(ix);
    let Some(children) = tree::find_mut(&mut next, toggle_id).and_then(|t| t.children_mut())
    else {
        return CmdResult::default();
    };
    children.push(moved);
    page.blocks = next;
    page.touch();
    CmdResult::default().with_affected_blocks(vec![id.clone(), toggle_id.clone()])
}
