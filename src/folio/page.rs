//! # Pages
//!
//! A [`Page`] is an ordered list of top-level blocks plus metadata. Nesting below the top
//! level happens only through toggle blocks; pages nest through `parent_id`.
//!
//! ## Derived Title
//!
//! The title is never authored directly. It is the content of the first `heading1` block
//! in the top-level list, or [`DEFAULT_TITLE`] when there is none or it is empty. Every
//! mutation that goes through the command layer calls [`Page::touch`], which recomputes it.
//!
//! ## Non-empty Invariant
//!
//! A page always holds at least one block. [`Page::ensure_non_empty`] reseeds an empty
//! paragraph when something leaves the list empty.

use crate::block::{Block, BlockKind};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use uuid::Uuid;

pub const DEFAULT_TITLE: &str = "Untitled";
pub const DEFAULT_PAGE_ICON: &str = "📄";

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageId(String);

impl PageId {
    pub fn generate() -> Self {
        Self(format!("page_{}", Uuid::new_v4().simple()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PageId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for PageId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub id: PageId,
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub cover: Option<String>,
    #[serde(default)]
    pub parent_id: Option<PageId>,
    #[serde(default, deserialize_with = "lenient_blocks")]
    pub blocks: Vec<Block>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

fn default_title() -> String {
    DEFAULT_TITLE.to_string()
}

impl Page {
    /// A fresh page: an empty heading (focused) followed by an empty paragraph.
    pub fn new(parent_id: Option<PageId>) -> Self {
        let mut heading = Block::new(BlockKind::Heading1, "");
        heading.focused = true;
        let now = Utc::now();
        Self {
            id: PageId::generate(),
            title: DEFAULT_TITLE.to_string(),
            icon: Some(DEFAULT_PAGE_ICON.to_string()),
            cover: None,
            parent_id,
            blocks: vec![heading, Block::paragraph("")],
            created_at: now,
            updated_at: now,
        }
    }

    /// Record a mutation: recompute derived state and bump `updated_at`.
    pub fn touch(&mut self) {
        self.ensure_non_empty();
        self.title = derive_title(&self.blocks);
        self.updated_at = Utc::now();
    }

    /// Reseed with one focused empty paragraph if the block list is empty.
    /// Returns true when it had to.
    pub fn ensure_non_empty(&mut self) -> bool {
        if !self.blocks.is_empty() {
            return false;
        }
        let mut seed = Block::paragraph("");
        seed.focused = true;
        self.blocks.push(seed);
        true
    }

    /// Title with markup removed, for listings and link labels.
    pub fn display_title(&self) -> String {
        let text = crate::block::visible_text(&self.title);
        let text = text.trim();
        if text.is_empty() {
            DEFAULT_TITLE.to_string()
        } else {
            text.to_string()
        }
    }
}

/// Content of the first top-level `heading1`, or the default title.
pub fn derive_title(blocks: &[Block]) -> String {
    blocks
        .iter()
        .find(|b| matches!(b.kind, BlockKind::Heading1))
        .map(|b| b.content.as_str())
        .filter(|content| !content.is_empty())
        .unwrap_or(DEFAULT_TITLE)
        .to_string()
}

/// Deserialize blocks one at a time so a single unreadable block does not sink the page.
/// An unreadable block becomes a paragraph keeping whatever id and content it had.
fn lenient_blocks<'de, D>(deserializer: D) -> std::result::Result<Vec<Block>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Vec<serde_json::Value> = Vec::deserialize(deserializer)?;
    Ok(raw.into_iter().map(recover_block).collect())
}

pub(crate) fn recover_block(value: serde_json::Value) -> Block {
    match serde_json::from_value::<Block>(value.clone()) {
        Ok(block) => block,
        Err(err) => {
            tracing::warn!("replacing unreadable block with a paragraph: {err}");
            let mut block = Block::paragraph(
                value
                    .get("content")
                    .and_then(|c| c.as_str())
                    .unwrap_or_default(),
            );
            if let Some(id) = value.get("id").and_then(|id| id.as_str()) {
                block.id = id.into();
            }
            block
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::BlockType;

    #[test]
    fn new_page_has_heading_and_paragraph() {
        let page = Page::new(None);
        assert_eq!(page.blocks.len(), 2);
        assert_eq!(page.blocks[0].block_type(), BlockType::Heading1);
        assert!(page.blocks[0].focused);
        assert_eq!(page.blocks[1].block_type(), BlockType::Paragraph);
        assert_eq!(page.title, DEFAULT_TITLE);
    }

    #[test]
    fn title_follows_first_heading1() {
        let blocks = vec![
            Block::paragraph("intro"),
            Block::new(BlockKind::Heading2, "Sub"),
            Block::new(BlockKind::Heading1, "Main"),
            Block::new(BlockKind::Heading1, "Second"),
        ];
        assert_eq!(derive_title(&blocks), "Main");
    }

    #[test]
    fn empty_heading_gives_default_title() {
        let blocks = vec![Block::new(BlockKind::Heading1, "")];
        assert_eq!(derive_title(&blocks), DEFAULT_TITLE);
        assert_eq!(derive_title(&[]), DEFAULT_TITLE);
    }

    #[test]
    fn title_derivation_is_idempotent() {
        let mut page = Page::new(None);
        page.blocks[0].content = "Notes".into();
        page.touch();
        let first = page.title.clone();
        page.touch();
        assert_eq!(page.title, first);
        assert_eq!(first, "Notes");
    }

    #[test]
    fn touch_reseeds_empty_page() {
        let mut page = Page::new(None);
        page.blocks.clear();
        page.touch();
        assert_eq!(page.blocks.len(), 1);
        assert!(page.blocks[0].focused);
        assert_eq!(page.blocks[0].block_type(), BlockType::Paragraph);
    }

    #[test]
    fn unreadable_block_is_recovered_in_place() {
        let raw = r#"{
            "id": "page1", "title": "T", "parentId": null,
            "blocks": [
                {"id": "1", "type": "h1", "content": "T"},
                {"id": "2", "type": "hologram", "content": "still here"},
                {"id": "3", "type": "p", "content": "after"}
            ]
        }"#;
        let page: Page = serde_json::from_str(raw).unwrap();
        assert_eq!(page.blocks.len(), 3);
        assert_eq!(page.blocks[1].id.as_str(), "2");
        assert_eq!(page.blocks[1].block_type(), BlockType::Paragraph);
        assert_eq!(page.blocks[1].content, "still here");
        assert_eq!(page.blocks[2].content, "after");
    }

    #[test]
    fn display_title_strips_markup() {
        let mut page = Page::new(None);
        page.title = "Research &amp;&nbsp;<i>Notes</i>".into();
        assert_eq!(page.display_title(), "Research & Notes");
    }
}
