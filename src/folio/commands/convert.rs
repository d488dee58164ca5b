use super::{CmdMessage, CmdResult};
use crate::block::{visible_text, Block, BlockId, BlockKind, BlockType, TableGrid};
use crate::tree;
use crate::workspace::Workspace;

/// Change the type of a block in the active page, keeping its id.
///
/// Page links need a target and are created through [`super::pages`] instead.
pub fn run(ws: &mut Workspace, id: &BlockId, target: BlockType) -> CmdResult {
    ws.selection.clear();
    let Some(kind) = BlockKind::for_type(target) else {
        let mut result = CmdResult::default();
        result.add_message(CmdMessage::warning(
            "Page links are created from the command palette",
        ));
        return result;
    };
    let page = ws.active_page_mut();
    if !apply(&mut page.blocks, id, kind) {
        return CmdResult::default();
    }
    page.touch();
    CmdResult::default().with_affected_blocks(vec![id.clone()])
}

/// Convert `id` in place. Returns false (and changes nothing) when the block is missing
/// or already has the requested kind.
pub(crate) fn apply(blocks: &mut Vec<Block>, id: &BlockId, kind: BlockKind) -> bool {
    let Some((list, ix)) = tree::locate_mut(blocks, id) else {
        return false;
    };
    let block = &mut list[ix];
    let from = block.block_type();
    let to = kind.block_type();
    if block.kind == kind {
        return false;
    }
    if from == to && to != BlockType::PageLink {
        return false;
    }

    // Children of a toggle stay in the document, right after their former parent.
    let hoisted = match &mut block.kind {
        BlockKind::Toggle { children, .. } if to != BlockType::Toggle => {
            std::mem::take(children)
        }
        _ => Vec::new(),
    };

    block.content = converted_content(&block.content, from, to);
    block.kind = kind;
    list.splice(ix + 1..ix + 1, hoisted);
    true
}

fn converted_content(content: &str, from: BlockType, to: BlockType) -> String {
    match to {
        BlockType::Divider | BlockType::PageLink | BlockType::Image => String::new(),
        BlockType::Table => match TableGrid::parse(content) {
            Some(grid) if from == BlockType::Table => grid.to_content(),
            _ => {
                let mut grid = TableGrid::empty(2, 2);
                grid.0[0][0] = content.to_string();
                grid.to_content()
            }
        },
        _ => match from {
            BlockType::Table => table_text(content),
            BlockType::Image | BlockType::Divider | BlockType::PageLink => String::new(),
            _ if to.strips_markup() => visible_text(content),
            _ => content.to_string(),
        },
    }
}

fn table_text(content: &str) -> String {
    TableGrid::parse(content)
        .map(|grid| {
            grid.0
                .iter()
                .flatten()
                .filter(|cell| !cell.trim().is_empty())
                .cloned()
                .collect::<Vec<_>>()
                .join(" ")
        })
        .unwrap_or_default()
}
