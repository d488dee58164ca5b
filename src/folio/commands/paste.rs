use super::CmdResult;
use crate::block::{Block, BlockId, BlockKind, BlockType};
use crate::focus;
use crate::tree;
use crate::workspace::Workspace;

/// Split pasted text into lines, dropping the ones that are blank.
pub fn split_lines(text: &str) -> Vec<&str> {
    text.lines().filter(|line| !line.trim().is_empty()).collect()
}

/// Spread pasted lines over blocks: the target keeps its type and takes the first line,
/// every further line becomes a new block of `block_type` inserted in order after it.
/// Focus ends on the last block produced.
pub fn multi_line(
    ws: &mut Workspace,
    id: &BlockId,
    block_type: BlockType,
    lines: &[&str],
) -> CmdResult {
    ws.selection.clear();
    let lines: Vec<&str> = lines
        .iter()
        .copied()
        .filter(|line| !line.trim().is_empty())
        .collect();
    let Some((first, rest)) = lines.split_first() else {
        return CmdResult::default();
    };
    let kind = BlockKind::for_type(block_type).unwrap_or(BlockKind::Paragraph);

    let page = ws.active_page_mut();
    let Some((list, ix)) = tree::locate_mut(&mut page.blocks, id) else {
        return CmdResult::default();
    };
    list[ix].content = first.to_string();
    let created: Vec<Block> = rest
        .iter()
        .map(|line| Block::new(kind.clone(), *line))
        .collect();
    let mut affected = vec![id.clone()];
    affected.extend(created.iter().map(|b| b.id.clone()));
    let focus_id = affected.last().cloned().unwrap_or_else(|| id.clone());
    list.splice(ix + 1..ix + 1, created);

    focus::set_focus(&mut page.blocks, &focus_id);
    page.touch();
    CmdResult::default()
        .with_affected_blocks(affected)
        .with_focus(focus_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::{block, para, top_ids, workspace};

    #[test]
    fn spreads_lines_and_focuses_last() {
        let mut ws = workspace(vec![para("x", ""), para("y", "")]);
        let lines = split_lines("a\nb\nc");
        let result = multi_line(&mut ws, &"x".into(), BlockType::Paragraph, &lines);

        let blocks = &ws.active_page().blocks;
        let contents: Vec<&str> = blocks.iter().map(|b| b.content.as_str()).collect();
        assert_eq!(contents, vec!["a", "b", "c", ""]);
        assert_eq!(top_ids(&ws)[0], "x");
        assert_eq!(top_ids(&ws)[3], "y");
        assert_eq!(result.focus, Some(blocks[2].id.clone()));
        assert!(blocks[2].focused);
        assert_eq!(focus::focused_count(blocks), 1);
    }

    #[test]
    fn blank_lines_are_dropped() {
        assert_eq!(split_lines("a\n\n  \r\nb\r\n"), vec!["a", "b"]);
    }

    #[test]
    fn single_line_focuses_target() {
        let mut ws = workspace(vec![para("x", ""), para("y", "")]);
        let result = multi_line(&mut ws, &"x".into(), BlockType::Paragraph, &["only"]);
        assert_eq!(result.focus, Some("x".into()));
        assert_eq!(ws.active_page().blocks.len(), 2);
    }

    #[test]
    fn target_keeps_its_type() {
        let mut ws = workspace(vec![block("x", BlockKind::Heading2, "")]);
        multi_line(&mut ws, &"x".into(), BlockType::Bullet, &["one", "two"]);
        let blocks = &ws.active_page().blocks;
        assert_eq!(blocks[0].block_type(), BlockType::Heading2);
        assert_eq!(blocks[1].block_type(), BlockType::Bullet);
    }

    #[test]
    fn nothing_to_paste_is_noop() {
        let mut ws = workspace(vec![para("x", "keep")]);
        assert!(multi_line(&mut ws, &"x".into(), BlockType::Paragraph, &["", " "]).is_noop());
        assert_eq!(ws.active_page().blocks[0].content, "keep");
    }
}
