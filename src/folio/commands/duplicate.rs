use super::CmdResult;
use crate::block::BlockId;
use crate::focus;
use crate::tree;
use crate::workspace::Workspace;

/// Deep-copy a block (toggle children included, all with fresh ids) right after the
/// original and focus the copy.
pub fn run(ws: &mut Workspace, id: &BlockId) -> CmdResult {
    ws.selection.clear();
    let page = ws.active_page_mut();
    let Some((list, ix)) = tree::locate_mut(&mut page.blocks, id) else {
        return CmdResult::default();
    };
    let copy = list[ix].duplicate();
    let copy_id = copy.id.clone();
    list.insert(ix + 1, copy);
    focus::set_focus(&mut page.blocks, &copy_id);
    page.touch();
    CmdResult::default()
        .with_affected_blocks(vec![copy_id.clone()])
        .with_focus(copy_id)
}
