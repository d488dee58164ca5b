use super::{convert, CmdMessage, CmdResult};
use crate::block::{Block, BlockId, BlockKind};
use crate::focus;
use crate::tree;
use crate::workspace::Workspace;

/// Delete a block and move focus to a neighbour in the same list.
///
/// With `focus_forward` the next sibling wins, otherwise the previous one; either way the
/// other side is the fallback. The last top-level block is cleared back to an empty
/// paragraph instead of being removed, and the last block of a toggle is kept.
pub fn run(ws: &mut Workspace, id: &BlockId, focus_forward: bool) -> CmdResult {
    ws.selection.clear();
    let page = ws.active_page_mut();
    let top_level = tree::is_top_level(&page.blocks, id);
    let Some((list, ix)) = tree::locate_mut(&mut page.blocks, id) else {
        return CmdResult::default();
    };

    if list.len() == 1 {
        if !top_level {
            let mut result = CmdResult::default();
            result.add_message(CmdMessage::info("A toggle keeps at least one block"));
            return result;
        }
        convert::apply(&mut page.blocks, id, BlockKind::Paragraph);
        if let Some(block) = tree::find_mut(&mut page.blocks, id) {
            block.content.clear();
        }
        focus::set_focus(&mut page.blocks, id);
        page.touch();
        return CmdResult::default()
            .with_affected_blocks(vec![id.clone()])
            .with_focus(id.clone());
    }

    let target = focus_target(list, ix, focus_forward);
    list.remove(ix);
    if let Some(target) = &target {
        focus::set_focus(&mut page.blocks, target);
    }
    page.touch();
    let mut result = CmdResult::default().with_affected_blocks(vec![id.clone()]);
    result.focus = target;
    result
}

fn focus_target(list: &[Block], ix: usize, forward: bool) -> Option<BlockId> {
    let next = list.get(ix + 1);
    let prev = ix.checked_sub(1).and_then(|p| list.get(p));
    let pick = if forward { next.or(prev) } else { prev.or(next) };
    pick.map(|b| b.id.clone())
}
