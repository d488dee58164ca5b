use super::CmdResult;
use crate::block::{Block, BlockId};
use crate::focus;
use crate::workspace::Workspace;
use std::collections::BTreeSet;

/// Give a block input focus. Clears the range selection.
pub fn focus(ws: &mut Workspace, id: &BlockId) -> CmdResult {
    ws.selection.clear();
    if !focus::set_focus(&mut ws.active_page_mut().blocks, id) {
        return CmdResult::default();
    }
    CmdResult::default()
        .with_affected_blocks(vec![id.clone()])
        .with_focus(id.clone())
}

/// Select every top-level block of the active page.
pub fn select_all(ws: &mut Workspace) -> CmdResult {
    let mut selection = std::mem::take(&mut ws.selection);
    selection.select_all(&ws.active_page().blocks);
    let ids: Vec<BlockId> = selection.ids().cloned().collect();
    ws.selection = selection;
    CmdResult::default().with_affected_blocks(ids)
}

/// Delete every selected block. A page never ends up empty: the last deletion reseeds a
/// focused empty paragraph.
pub fn bulk_delete(ws: &mut Workspace) -> CmdResult {
    let ids = ws.selection.take();
    if ids.is_empty() {
        return CmdResult::default();
    }
    let page = ws.active_page_mut();
    let had_focus = focus::focused_id(&page.blocks);
    retain_unselected(&mut page.blocks, &ids);
    page.ensure_non_empty();

    let focus = match had_focus {
        Some(id) if !ids.contains(&id) => Some(id),
        _ => page.blocks.first().map(|b| b.id.clone()),
    };
    if let Some(id) = &focus {
        focus::set_focus(&mut page.blocks, id);
    }
    page.touch();
    let mut result = CmdResult::default().with_affected_blocks(ids.into_iter().collect());
    result.focus = focus;
    result
}

fn retain_unselected(list: &mut Vec<Block>, ids: &BTreeSet<BlockId>) {
    list.retain(|b| !ids.contains(&b.id));
    for block in list.iter_mut() {
        if let Some(children) = block.children_mut() {
            retain_unselected(children, ids);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::BlockType;
    use crate::commands::test_support::{para, top_ids, workspace};
    use crate::commands::update::{self, BlockPatch};

    #[test]
    fn select_all_then_delete_reseeds_page() {
        let mut ws = workspace(vec![para("a", "1"), para("b", "2"), para("c", "3")]);
        select_all(&mut ws);
        assert_eq!(ws.selection.len(), 3);
        let result = bulk_delete(&mut ws);
        assert_eq!(result.affected_blocks.len(), 3);

        let blocks = &ws.active_page().blocks;
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].block_type(), BlockType::Paragraph);
        assert!(blocks[0].focused);
        assert!(ws.selection.is_empty());
    }

    #[test]
    fn partial_delete_keeps_surviving_focus() {
        let mut ws = workspace(vec![para("a", "1"), para("b", "2"), para("c", "3")]);
        focus(&mut ws, &"c".into());
        ws.selection.insert("a".into());
        bulk_delete(&mut ws);
        assert_eq!(top_ids(&ws), vec!["b", "c"]);
        assert_eq!(
            focus::focused_id(&ws.active_page().blocks),
            Some("c".into())
        );
    }

    #[test]
    fn deleting_focused_block_moves_focus_to_first() {
        let mut ws = workspace(vec![para("a", "1"), para("b", "2")]);
        focus(&mut ws, &"b".into());
        ws.selection.insert("b".into());
        let result = bulk_delete(&mut ws);
        assert_eq!(result.focus, Some("a".into()));
    }

    #[test]
    fn single_block_interactions_clear_selection() {
        let mut ws = workspace(vec![para("a", "1"), para("b", "2")]);
        select_all(&mut ws);
        update::run(&mut ws, &"a".into(), BlockPatch::content("x"));
        assert!(ws.selection.is_empty());

        select_all(&mut ws);
        focus(&mut ws, &"b".into());
        assert!(ws.selection.is_empty());
        // nothing selected, nothing deleted
        assert!(bulk_delete(&mut ws).is_noop());
        assert_eq!(top_ids(&ws), vec!["a", "b"]);
    }
}
