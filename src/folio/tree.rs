//! Id-addressed traversal over a block list and the toggle lists nested inside it.
//!
//! Every helper searches depth-first: a list's own blocks first, then each toggle's
//! `children`. The same functions serve a page's top-level list and any nested list.

use crate::block::{Block, BlockId};

pub fn find<'a>(blocks: &'a [Block], id: &BlockId) -> Option<&'a Block> {
    for block in blocks {
        if &block.id == id {
            return Some(block);
        }
        if let Some(found) = block.children().and_then(|children| find(children, id)) {
            return Some(found);
        }
    }
    None
}

pub fn find_mut<'a>(blocks: &'a mut [Block], id: &BlockId) -> Option<&'a mut Block> {
    for block in blocks.iter_mut() {
        if &block.id == id {
            return Some(block);
        }
        if let Some(children) = block.children_mut() {
            if let Some(found) = find_mut(children, id) {
                return Some(found);
            }
        }
    }
    None
}

/// The list holding `id` and its position in that list.
pub fn locate<'a>(blocks: &'a [Block], id: &BlockId) -> Option<(&'a [Block], usize)> {
    if let Some(ix) = blocks.iter().position(|b| &b.id == id) {
        return Some((blocks, ix));
    }
    blocks
        .iter()
        .filter_map(|b| b.children())
        .find_map(|children| locate(children, id))
}

pub fn locate_mut<'a>(
    blocks: &'a mut Vec<Block>,
    id: &BlockId,
) -> Option<(&'a mut Vec<Block>, usize)> {
    if let Some(ix) = blocks.iter().position(|b| &b.id == id) {
        return Some((blocks, ix));
    }
    for block in blocks.iter_mut() {
        if let Some(children) = block.children_mut() {
            if let Some(found) = locate_mut(children, id) {
                return Some(found);
            }
        }
    }
    None
}

pub fn contains(blocks: &[Block], id: &BlockId) -> bool {
    find(blocks, id).is_some()
}

pub fn is_top_level(blocks: &[Block], id: &BlockId) -> bool {
    blocks.iter().any(|b| &b.id == id)
}

/// True if `id` sits somewhere below `ancestor` (not counting `ancestor` itself).
pub fn is_descendant(blocks: &[Block], ancestor: &BlockId, id: &BlockId) -> bool {
    find(blocks, ancestor)
        .and_then(|a| a.children())
        .is_some_and(|children| contains(children, id))
}

pub fn walk<F: FnMut(&Block)>(blocks: &[Block], f: &mut F) {
    for block in blocks {
        f(block);
        if let Some(children) = block.children() {
            walk(children, f);
        }
    }
}

pub fn walk_mut<F: FnMut(&mut Block)>(blocks: &mut [Block], f: &mut F) {
    for block in blocks.iter_mut() {
        f(block);
        if let Some(children) = block.children_mut() {
            walk_mut(children, f);
        }
    }
}

pub fn all_ids(blocks: &[Block]) -> Vec<BlockId> {
    let mut ids = Vec::new();
    walk(blocks, &mut |b| ids.push(b.id.clone()));
    ids
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::BlockKind;

    fn block(id: &str) -> Block {
        let mut b = Block::paragraph(id);
        b.id = id.into();
        b
    }

    fn toggle(id: &str, children: Vec<Block>) -> Block {
        let mut b = Block::new(
            BlockKind::Toggle {
                toggled: true,
                children,
            },
            id,
        );
        b.id = id.into();
        b
    }

    fn sample() -> Vec<Block> {
        vec![
            block("a"),
            toggle("t", vec![block("c1"), toggle("t2", vec![block("deep")])]),
            block("z"),
        ]
    }

    #[test]
    fn finds_nested_blocks() {
        let blocks = sample();
        assert_eq!(find(&blocks, &"deep".into()).unwrap().content, "deep");
        assert!(find(&blocks, &"missing".into()).is_none());
    }

    #[test]
    fn locate_returns_containing_list() {
        let mut blocks = sample();
        let (list, ix) = locate_mut(&mut blocks, &"deep".into()).unwrap();
        assert_eq!(ix, 0);
        assert_eq!(list.len(), 1);
        list.push(block("new"));

        let (list, ix) = locate(&blocks, &"t2".into()).unwrap();
        assert_eq!(ix, 1);
        assert_eq!(list[0].id.as_str(), "c1");
        assert!(contains(&blocks, &"new".into()));
    }

    #[test]
    fn descendant_check() {
        let blocks = sample();
        assert!(is_descendant(&blocks, &"t".into(), &"deep".into()));
        assert!(!is_descendant(&blocks, &"t".into(), &"t".into()));
        assert!(!is_descendant(&blocks, &"a".into(), &"c1".into()));
    }

    #[test]
    fn walk_visits_in_document_order() {
        let ids: Vec<String> = all_ids(&sample())
            .into_iter()
            .map(|id| id.to_string())
            .collect();
        assert_eq!(ids, vec!["a", "t", "c1", "t2", "deep", "z"]);
    }
}
