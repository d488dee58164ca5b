//! # Blocks
//!
//! A [`Block`] is the atomic content unit of a page. Every block has a stable [`BlockId`],
//! a `content` payload and a [`BlockKind`] that carries only the attributes meaningful to
//! that kind:
//!
//! | Kind       | `content` holds                         | Extra attributes          |
//! |------------|-----------------------------------------|---------------------------|
//! | text-like  | formatted text fragment (opaque markup) | `checked` (todo), `icon`  |
//! | `code`     | raw source                              | `language` (session only) |
//! | `math`     | raw equation                            | `align`                   |
//! | `table`    | JSON encoded grid of formatted cells    |                           |
//! | `image`    | opaque binary reference (URL/data URI)  | `align`                   |
//! | `pageLink` | nothing                                 | `pageId`                  |
//! | `toggle`   | formatted summary text                  | `toggled`, `children`     |
//!
//! ## Stored Shape
//!
//! Blocks serialize as flat records: `{"id", "type", "content", ...attributes}`. The
//! `type` tag drives the variant. Older documents used `p`, `h1`, `h2`, `h3` and `page`
//! as type names; those are still accepted on load.
//!
//! The `focused` flag is transient UI state and never persisted. The code `language` is
//! session-local as well.

use crate::page::PageId;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

pub const DEFAULT_CALLOUT_ICON: &str = "💡";

static MARKUP_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<[^>]+>").expect("markup tag pattern is valid"));

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockId(String);

impl BlockId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BlockId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for BlockId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// The type of a block without its attributes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BlockType {
    #[default]
    Paragraph,
    Heading1,
    Heading2,
    Heading3,
    Bullet,
    Numbered,
    Todo,
    Quote,
    Callout,
    Divider,
    Code,
    Math,
    Table,
    Image,
    PageLink,
    Toggle,
}

impl BlockType {
    pub const ALL: [BlockType; 16] = [
        BlockType::Paragraph,
        BlockType::Heading1,
        BlockType::Heading2,
        BlockType::Heading3,
        BlockType::Bullet,
        BlockType::Numbered,
        BlockType::Todo,
        BlockType::Quote,
        BlockType::Callout,
        BlockType::Divider,
        BlockType::Code,
        BlockType::Math,
        BlockType::Table,
        BlockType::Image,
        BlockType::PageLink,
        BlockType::Toggle,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            BlockType::Paragraph => "paragraph",
            BlockType::Heading1 => "heading1",
            BlockType::Heading2 => "heading2",
            BlockType::Heading3 => "heading3",
            BlockType::Bullet => "bullet",
            BlockType::Numbered => "numbered",
            BlockType::Todo => "todo",
            BlockType::Quote => "quote",
            BlockType::Callout => "callout",
            BlockType::Divider => "divider",
            BlockType::Code => "code",
            BlockType::Math => "math",
            BlockType::Table => "table",
            BlockType::Image => "image",
            BlockType::PageLink => "pageLink",
            BlockType::Toggle => "toggle",
        }
    }

    /// Parse a type name, accepting the legacy short names.
    pub fn from_name(name: &str) -> Option<Self> {
        let normalized = name.trim().to_lowercase();
        let found = match normalized.as_str() {
            "p" | "text" => BlockType::Paragraph,
            "h1" => BlockType::Heading1,
            "h2" => BlockType::Heading2,
            "h3" => BlockType::Heading3,
            "page" => BlockType::PageLink,
            other => return Self::ALL.into_iter().find(|t| t.name().to_lowercase() == other),
        };
        Some(found)
    }

    /// Raw-source types render their content verbatim; the command trigger is literal there.
    pub fn is_raw_source(&self) -> bool {
        matches!(self, BlockType::Code | BlockType::Math | BlockType::Image)
    }

    /// Types whose content is plain source text, so markup is stripped on conversion.
    pub fn strips_markup(&self) -> bool {
        matches!(self, BlockType::Code | BlockType::Math)
    }

    pub fn is_list(&self) -> bool {
        matches!(self, BlockType::Bullet | BlockType::Numbered | BlockType::Todo)
    }

    /// Pressing Enter on an empty block of these types exits back to a paragraph.
    pub fn exits_when_empty(&self) -> bool {
        self.is_list() || matches!(self, BlockType::Quote | BlockType::Callout)
    }

    /// Types whose content is a formatted text fragment.
    pub fn is_text(&self) -> bool {
        matches!(
            self,
            BlockType::Paragraph
                | BlockType::Heading1
                | BlockType::Heading2
                | BlockType::Heading3
                | BlockType::Bullet
                | BlockType::Numbered
                | BlockType::Todo
                | BlockType::Quote
                | BlockType::Callout
                | BlockType::Toggle
        )
    }
}

impl fmt::Display for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    Left,
    #[default]
    Center,
    Right,
}

fn default_callout_icon() -> String {
    DEFAULT_CALLOUT_ICON.to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum BlockKind {
    #[serde(alias = "p")]
    Paragraph,
    #[serde(alias = "h1")]
    Heading1,
    #[serde(alias = "h2")]
    Heading2,
    #[serde(alias = "h3")]
    Heading3,
    Bullet,
    Numbered,
    Todo {
        #[serde(default)]
        checked: bool,
    },
    Quote,
    Callout {
        #[serde(default = "default_callout_icon")]
        icon: String,
    },
    Divider,
    Code {
        #[serde(skip)]
        language: Option<String>,
    },
    Math {
        #[serde(default)]
        align: Align,
    },
    Table,
    Image {
        #[serde(default)]
        align: Align,
    },
    #[serde(alias = "page")]
    PageLink {
        #[serde(rename = "pageId")]
        page_id: PageId,
    },
    Toggle {
        #[serde(default)]
        toggled: bool,
        #[serde(default)]
        children: Vec<Block>,
    },
}

impl BlockKind {
    /// Fresh attributes for a type. Page links need a target, so they have no default.
    pub fn for_type(block_type: BlockType) -> Option<Self> {
        let kind = match block_type {
            BlockType::Paragraph => BlockKind::Paragraph,
            BlockType::Heading1 => BlockKind::Heading1,
            BlockType::Heading2 => BlockKind::Heading2,
            BlockType::Heading3 => BlockKind::Heading3,
            BlockType::Bullet => BlockKind::Bullet,
            BlockType::Numbered => BlockKind::Numbered,
            BlockType::Todo => BlockKind::Todo { checked: false },
            BlockType::Quote => BlockKind::Quote,
            BlockType::Callout => BlockKind::Callout {
                icon: default_callout_icon(),
            },
            BlockType::Divider => BlockKind::Divider,
            BlockType::Code => BlockKind::Code { language: None },
            BlockType::Math => BlockKind::Math {
                align: Align::default(),
            },
            BlockType::Table => BlockKind::Table,
            BlockType::Image => BlockKind::Image {
                align: Align::default(),
            },
            BlockType::PageLink => return None,
            BlockType::Toggle => BlockKind::Toggle {
                toggled: false,
                children: Vec::new(),
            },
        };
        Some(kind)
    }

    pub fn block_type(&self) -> BlockType {
        match self {
            BlockKind::Paragraph => BlockType::Paragraph,
            BlockKind::Heading1 => BlockType::Heading1,
            BlockKind::Heading2 => BlockType::Heading2,
            BlockKind::Heading3 => BlockType::Heading3,
            BlockKind::Bullet => BlockType::Bullet,
            BlockKind::Numbered => BlockType::Numbered,
            BlockKind::Todo { .. } => BlockType::Todo,
            BlockKind::Quote => BlockType::Quote,
            BlockKind::Callout { .. } => BlockType::Callout,
            BlockKind::Divider => BlockType::Divider,
            BlockKind::Code { .. } => BlockType::Code,
            BlockKind::Math { .. } => BlockType::Math,
            BlockKind::Table => BlockType::Table,
            BlockKind::Image { .. } => BlockType::Image,
            BlockKind::PageLink { .. } => BlockType::PageLink,
            BlockKind::Toggle { .. } => BlockType::Toggle,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub id: BlockId,
    #[serde(flatten)]
    pub kind: BlockKind,
    #[serde(default)]
    pub content: String,
    #[serde(skip)]
    pub focused: bool,
}

impl Block {
    pub fn new(kind: BlockKind, content: impl Into<String>) -> Self {
        Self {
            id: BlockId::generate(),
            kind,
            content: content.into(),
            focused: false,
        }
    }

    pub fn paragraph(content: impl Into<String>) -> Self {
        Self::new(BlockKind::Paragraph, content)
    }

    pub fn block_type(&self) -> BlockType {
        self.kind.block_type()
    }

    pub fn children(&self) -> Option<&Vec<Block>> {
        match &self.kind {
            BlockKind::Toggle { children, .. } => Some(children),
            _ => None,
        }
    }

    pub fn children_mut(&mut self) -> Option<&mut Vec<Block>> {
        match &mut self.kind {
            BlockKind::Toggle { children, .. } => Some(children),
            _ => None,
        }
    }

    /// Content with markup removed and the common entities decoded.
    pub fn visible_text(&self) -> String {
        visible_text(&self.content)
    }

    /// True when there is nothing visible to keep, ignoring markup and whitespace.
    pub fn is_blank(&self) -> bool {
        self.visible_text().trim().is_empty()
    }

    /// Copy with fresh ids for the block and everything nested in it.
    pub fn duplicate(&self) -> Block {
        let mut copy = self.clone();
        copy.id = BlockId::generate();
        copy.focused = false;
        if let Some(children) = copy.children_mut() {
            *children = children.iter().map(Block::duplicate).collect();
        }
        copy
    }

    pub fn table_grid(&self) -> TableGrid {
        TableGrid::parse_or_default(&self.content)
    }
}

pub fn strip_markup(fragment: &str) -> String {
    MARKUP_TAG.replace_all(fragment, "").into_owned()
}

pub fn visible_text(fragment: &str) -> String {
    strip_markup(fragment)
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&amp;", "&")
}

/// Decoded form of a table block's content: rows of formatted cell fragments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TableGrid(pub Vec<Vec<String>>);

impl TableGrid {
    pub fn empty(rows: usize, cols: usize) -> Self {
        Self(vec![vec![String::new(); cols]; rows])
    }

    /// Parse stored content. Ragged rows are padded; an empty or unparseable grid is `None`.
    pub fn parse(content: &str) -> Option<Self> {
        let mut rows: Vec<Vec<String>> = serde_json::from_str(content).ok()?;
        let cols = rows.iter().map(Vec::len).max().unwrap_or(0);
        if rows.is_empty() || cols == 0 {
            return None;
        }
        for row in &mut rows {
            row.resize(cols, String::new());
        }
        Some(Self(rows))
    }

    pub fn parse_or_default(content: &str) -> Self {
        Self::parse(content).unwrap_or_else(|| Self::empty(2, 2))
    }

    pub fn rows(&self) -> usize {
        self.0.len()
    }

    pub fn cols(&self) -> usize {
        self.0.first().map(Vec::len).unwrap_or(0)
    }

    pub fn to_content(&self) -> String {
        serde_json::to_string(&self.0).unwrap_or_else(|_| "[]".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn serializes_as_flat_record() {
        let block = Block {
            id: BlockId::from("b1"),
            kind: BlockKind::Todo { checked: true },
            content: "ship it".into(),
            focused: true,
        };
        let value = serde_json::to_value(&block).unwrap();
        assert_eq!(
            value,
            json!({"id": "b1", "type": "todo", "checked": true, "content": "ship it"})
        );
    }

    #[test]
    fn page_link_uses_camel_case_fields() {
        let block = Block {
            id: BlockId::from("b2"),
            kind: BlockKind::PageLink {
                page_id: PageId::from("page_7"),
            },
            content: String::new(),
            focused: false,
        };
        let value = serde_json::to_value(&block).unwrap();
        assert_eq!(value["type"], "pageLink");
        assert_eq!(value["pageId"], "page_7");
    }

    #[test]
    fn accepts_legacy_type_names() {
        let raw = r#"[
            {"id": "1", "type": "h1", "content": "Title", "focused": true},
            {"id": "2", "type": "p", "content": "Body"},
            {"id": "3", "type": "page", "content": "", "pageId": "page2"}
        ]"#;
        let blocks: Vec<Block> = serde_json::from_str(raw).unwrap();
        assert_eq!(blocks[0].block_type(), BlockType::Heading1);
        assert_eq!(blocks[1].block_type(), BlockType::Paragraph);
        assert_eq!(
            blocks[2].kind,
            BlockKind::PageLink {
                page_id: PageId::from("page2")
            }
        );
        // focus is never restored from storage
        assert!(!blocks[0].focused);
    }

    #[test]
    fn code_language_is_not_persisted() {
        let block = Block::new(
            BlockKind::Code {
                language: Some("python".into()),
            },
            "print(1)",
        );
        let json = serde_json::to_string(&block).unwrap();
        assert!(!json.contains("python"));
        let back: Block = serde_json::from_str(&json).unwrap();
        assert_eq!(back.kind, BlockKind::Code { language: None });
    }

    #[test]
    fn toggle_children_nest() {
        let raw = r#"{"id": "t", "type": "toggle", "content": "More", "toggled": true,
            "children": [{"id": "c1", "type": "bullet", "content": "inside"}]}"#;
        let block: Block = serde_json::from_str(raw).unwrap();
        let children = block.children().unwrap();
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].block_type(), BlockType::Bullet);
    }

    #[test]
    fn visible_text_strips_tags_and_entities() {
        let block = Block::paragraph("<b>Research</b> &amp;&nbsp;Notes");
        assert_eq!(block.visible_text(), "Research & Notes");
        assert!(Block::paragraph("<br>").is_blank());
    }

    #[test]
    fn duplicate_refreshes_nested_ids() {
        let original = Block::new(
            BlockKind::Toggle {
                toggled: false,
                children: vec![Block::paragraph("a")],
            },
            "t",
        );
        let copy = original.duplicate();
        assert_ne!(copy.id, original.id);
        assert_ne!(copy.children().unwrap()[0].id, original.children().unwrap()[0].id);
        assert_eq!(copy.children().unwrap()[0].content, "a");
    }

    #[test]
    fn malformed_table_falls_back_to_two_by_two() {
        let block = Block::new(BlockKind::Table, "{not json");
        let grid = block.table_grid();
        assert_eq!((grid.rows(), grid.cols()), (2, 2));

        assert_eq!(TableGrid::parse("[]"), None);
    }

    #[test]
    fn ragged_table_rows_are_padded() {
        let grid = TableGrid::parse(r#"[["a","b","c"],["d"]]"#).unwrap();
        assert_eq!(grid.cols(), 3);
        assert_eq!(grid.0[1], vec!["d".to_string(), String::new(), String::new()]);
    }

    #[test]
    fn type_names_round_trip_through_from_name() {
        for block_type in BlockType::ALL {
            assert_eq!(BlockType::from_name(block_type.name()), Some(block_type));
        }
        assert_eq!(BlockType::from_name("h2"), Some(BlockType::Heading2));
        assert_eq!(BlockType::from_name("nope"), None);
    }
}
