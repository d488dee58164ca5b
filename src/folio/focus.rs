//! # Focus & Selection
//!
//! Input focus lives in the blocks themselves (`Block::focused`) so it survives structural
//! edits: whatever the command layer does to a list, the flag travels with the block.
//! At most one block of a page, nested lists included, carries it.
//!
//! Range selection is separate: a set of block ids in [`Selection`], independent of
//! focus. Any single-block interaction clears it first so a stale bulk operation can't
//! apply to a context the user already left.

use crate::block::{Block, BlockId};
use crate::tree;
use std::collections::BTreeSet;

/// Focus exactly `id`, clearing the flag everywhere else. Unknown ids leave focus alone.
pub fn set_focus(blocks: &mut [Block], id: &BlockId) -> bool {
    if !tree::contains(blocks, id) {
        return false;
    }
    tree::walk_mut(blocks, &mut |b| b.focused = &b.id == id);
    true
}

pub fn clear_focus(blocks: &mut [Block]) {
    tree::walk_mut(blocks, &mut |b| b.focused = false);
}

pub fn focused_id(blocks: &[Block]) -> Option<BlockId> {
    let mut found = None;
    tree::walk(blocks, &mut |b| {
        if b.focused && found.is_none() {
            found = Some(b.id.clone());
        }
    });
    found
}

pub fn focused_count(blocks: &[Block]) -> usize {
    let mut count = 0;
    tree::walk(blocks, &mut |b| {
        if b.focused {
            count += 1;
        }
    });
    count
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    ids: BTreeSet<BlockId>,
}

impl Selection {
    /// Select every top-level block of a list.
    pub fn select_all(&mut self, blocks: &[Block]) {
        self.ids = blocks.iter().map(|b| b.id.clone()).collect();
    }

    pub fn insert(&mut self, id: BlockId) {
        self.ids.insert(id);
    }

    pub fn toggle(&mut self, id: BlockId) {
        if !self.ids.remove(&id) {
            self.ids.insert(id);
        }
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn contains(&self, id: &BlockId) -> bool {
        self.ids.contains(id)
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn ids(&self) -> impl Iterator<Item = &BlockId> {
        self.ids.iter()
    }

    pub(crate) fn take(&mut self) -> BTreeSet<BlockId> {
        std::mem::take(&mut self.ids)
    }
}
