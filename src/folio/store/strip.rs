use crate::block::BlockKind;
use crate::page::Page;
use crate::tree;

pub const IMAGE_PLACEHOLDER: &str = "[image-too-large]";

/// Copy of `pages` where every embedded image payload (`data:` URI) larger than `limit`
/// bytes is replaced by [`IMAGE_PLACEHOLDER`]. Linked images are left alone.
pub fn strip_oversized_images(pages: &[Page], limit: usize) -> (Vec<Page>, usize) {
    let mut stripped = 0;
    let pages = pages
        .iter()
        .map(|page| {
            let mut page = page.clone();
            tree::walk_mut(&mut page.blocks, &mut |block| {
                if matches!(block.kind, BlockKind::Image { .. })
                    && block.content.starts_with("data:")
                    && block.content.len() > limit
                {
                    block.content = IMAGE_PLACEHOLDER.to_string();
                    stripped += 1;
                }
            });
            page
        })
        .collect();
    (pages, stripped)
}
