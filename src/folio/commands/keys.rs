//! Keyboard policies for a focused block.
//!
//! The host forwards a [`Key`] together with the caret facts it knows about. Keys that
//! only insert text come back as [`KeyOutcome::Passthrough`] so the host can apply them
//! natively.

use super::{add, convert, merge, remove, CmdResult};
use crate::block::{visible_text, BlockId, BlockKind, BlockType};
use crate::tree;
use crate::workspace::Workspace;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Enter { shift: bool, modifier: bool },
    Backspace { at_start: bool },
    Delete { at_end: bool },
    Space,
}

#[derive(Debug, Clone, PartialEq)]
pub enum KeyOutcome {
    Passthrough,
    Handled(CmdResult),
}

impl KeyOutcome {
    fn from_result(result: CmdResult) -> Self {
        if result.is_noop() {
            KeyOutcome::Passthrough
        } else {
            KeyOutcome::Handled(result)
        }
    }
}

/// Markdown trigger typed at the start of a paragraph, matched on the trimmed visible text.
pub fn markdown_shortcut(text: &str) -> Option<BlockType> {
    match visible_text(text).trim() {
        "-" => Some(BlockType::Bullet),
        "1." | "1)" => Some(BlockType::Numbered),
        "[]" | "[ ]" => Some(BlockType::Todo),
        ">" => Some(BlockType::Quote),
        _ => None,
    }
}

pub fn handle(ws: &mut Workspace, id: &BlockId, key: Key) -> KeyOutcome {
    let Some(block) = tree::find(&ws.active_page().blocks, id) else {
        return KeyOutcome::Passthrough;
    };
    let block_type = block.block_type();
    let blank = block.is_blank();
    let content = block.content.clone();

    match key {
        Key::Enter { modifier: true, .. } => KeyOutcome::from_result(add::paragraph(ws, id)),
        Key::Enter { shift: true, .. } => KeyOutcome::Passthrough,
        Key::Enter { .. } => enter(ws, id, block_type, blank),
        Key::Backspace { at_start } => {
            if blank {
                KeyOutcome::from_result(clear_or_remove(ws, id, block_type, false))
            } else if at_start {
                KeyOutcome::from_result(merge::into_previous(ws, id))
            } else {
                KeyOutcome::Passthrough
            }
        }
        Key::Delete { at_end } => {
            if blank {
                KeyOutcome::from_result(clear_or_remove(ws, id, block_type, true))
            } else if at_end {
                KeyOutcome::from_result(merge::next_into(ws, id))
            } else {
                KeyOutcome::Passthrough
            }
        }
        Key::Space => {
            if block_type != BlockType::Paragraph {
                return KeyOutcome::Passthrough;
            }
            match markdown_shortcut(&content) {
                Some(target) => KeyOutcome::from_result(convert_cleared(ws, id, target)),
                None => KeyOutcome::Passthrough,
            }
        }
    }
}

fn enter(ws: &mut Workspace, id: &BlockId, block_type: BlockType, blank: bool) -> KeyOutcome {
    if block_type == BlockType::Code {
        return KeyOutcome::Passthrough;
    }
    if blank && block_type.exits_when_empty() {
        return KeyOutcome::from_result(convert_cleared(ws, id, BlockType::Paragraph));
    }
    let result = if block_type.is_list() {
        let kind = BlockKind::for_type(block_type).unwrap_or(BlockKind::Paragraph);
        add::run(ws, id, kind, "")
    } else {
        add::paragraph(ws, id)
    };
    KeyOutcome::from_result(result)
}

/// First keystroke on an empty block downgrades it to a paragraph; on an empty paragraph
/// the block goes away.
fn clear_or_remove(
    ws: &mut Workspace,
    id: &BlockId,
    block_type: BlockType,
    focus_forward: bool,
) -> CmdResult {
    if block_type != BlockType::Paragraph {
        convert_cleared(ws, id, BlockType::Paragraph)
    } else {
        remove::run(ws, id, focus_forward)
    }
}

fn convert_cleared(ws: &mut Workspace, id: &BlockId, target: BlockType) -> CmdResult {
    let result = convert::run(ws, id, target);
    if result.is_noop() {
        return result;
    }
    let page = ws.active_page_mut();
    if let Some(block) = tree::find_mut(&mut page.blocks, id) {
        block.content.clear();
    }
    page.touch();
    result.with_focus(id.clone())
}
