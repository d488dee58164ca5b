use super::{convert, CmdResult};
use crate::block::{Align, BlockId, BlockKind, BlockType};
use crate::page::PageId;
use crate::tree;
use crate::workspace::Workspace;

/// Attributes to merge into a block. `None` leaves a field as it is; attributes that do
/// not apply to the block's kind are ignored.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BlockPatch {
    pub content: Option<String>,
    pub block_type: Option<BlockType>,
    pub checked: Option<bool>,
    pub language: Option<String>,
    pub align: Option<Align>,
    pub icon: Option<String>,
    pub toggled: Option<bool>,
    pub page_id: Option<PageId>,
}

impl BlockPatch {
    pub fn content(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Self::default()
        }
    }

    pub fn checked(checked: bool) -> Self {
        Self {
            checked: Some(checked),
            ..Self::default()
        }
    }

    pub fn toggled(toggled: bool) -> Self {
        Self {
            toggled: Some(toggled),
            ..Self::default()
        }
    }
}

pub fn run(ws: &mut Workspace, id: &BlockId, patch: BlockPatch) -> CmdResult {
    ws.selection.clear();
    let page = ws.active_page_mut();
    if !tree::contains(&page.blocks, id) {
        return CmdResult::default();
    }

    // A type change goes first so the attribute merge below lands on the new kind.
    match (patch.block_type, &patch.page_id) {
        (Some(BlockType::PageLink), Some(target)) | (None, Some(target)) => {
            let is_link = tree::find(&page.blocks, id)
                .is_some_and(|b| b.block_type() == BlockType::PageLink);
            if is_link || patch.block_type.is_some() {
                convert::apply(
                    &mut page.blocks,
                    id,
                    BlockKind::PageLink {
                        page_id: target.clone(),
                    },
                );
            }
        }
        (Some(block_type), _) => {
            if let Some(kind) = BlockKind::for_type(block_type) {
                convert::apply(&mut page.blocks, id, kind);
            }
        }
        (None, None) => {}
    }

    let Some(block) = tree::find_mut(&mut page.blocks, id) else {
        return CmdResult::default();
    };
    if let Some(content) = patch.content {
        block.content = content;
    }
    match &mut block.kind {
        BlockKind::Todo { checked } => {
            if let Some(value) = patch.checked {
                *checked = value;
            }
        }
        BlockKind::Code { language } => {
            if patch.language.is_some() {
                *language = patch.language;
            }
        }
        BlockKind::Math { align } | BlockKind::Image { align } => {
            if let Some(value) = patch.align {
                *align = value;
            }
        }
        BlockKind::Callout { icon } => {
            if let Some(value) = patch.icon {
                *icon = value;
            }
        }
        BlockKind::Toggle { toggled, .. } => {
            if let Some(value) = patch.toggled {
                *toggled = value;
            }
        }
        _ => {}
    }

    page.touch();
    CmdResult::default().with_affected_blocks(vec![id.clone()])
}

/// Flip a todo's checkbox.
pub fn toggle_checked(ws: &mut Workspace, id: &BlockId) -> CmdResult {
    let current = tree::find(&ws.active_page().blocks, id).and_then(|b| match b.kind {
        BlockKind::Todo { checked } => Some(checked),
        _ => None,
    });
    match current {
        Some(checked) => run(ws, id, BlockPatch::checked(!checked)),
        None => CmdResult::default(),
    }
}

/// Open or collapse a toggle.
pub fn toggle_open(ws: &mut Workspace, id: &BlockId) -> CmdResult {
    let current = tree::find(&ws.active_page().blocks, id).and_then(|b| match b.kind {
        BlockKind::Toggle { toggled, .. } => Some(toggled),
        _ => None,
    });
    match current {
        Some(toggled) => run(ws, id, BlockPatch::toggled(!toggled)),
        None => CmdResult::default(),
    }
}
