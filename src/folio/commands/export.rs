//! Markdown export.
//!
//! Blocks are turned into a `pulldown-cmark` event stream and serialized with
//! `pulldown-cmark-to-cmark`, so escaping and list/table layout follow CommonMark rules.
//! Formatting markup inside block content is reduced to its visible text.

use super::{CmdMessage, CmdResult};
use crate::block::{Block, BlockKind, BlockType};
use crate::page::{Page, PageId};
use crate::workspace::Workspace;
use pulldown_cmark::{Alignment, CodeBlockKind, CowStr, Event, HeadingLevel, LinkType, Tag};
use pulldown_cmark_to_cmark::cmark;

pub fn run(ws: &Workspace, id: &PageId) -> CmdResult {
    let Some(page) = ws.page(id) else {
        let mut result = CmdResult::default();
        result.add_message(CmdMessage::error(format!("Page {id} not found")));
        return result;
    };
    CmdResult::default().with_rendered(render_page(ws, page))
}

pub fn render_page(ws: &Workspace, page: &Page) -> String {
    let mut events = Vec::new();
    push_blocks(ws, &page.blocks, &mut events);
    let mut output = String::new();
    if let Err(err) = cmark(events.iter(), &mut output) {
        tracing::warn!(page = %page.id, "markdown serialization failed: {err}");
    }
    output
}

fn text(value: String) -> Event<'static> {
    Event::Text(CowStr::from(value))
}

fn wrap(events: &mut Vec<Event<'static>>, tag: Tag<'static>, inner: Vec<Event<'static>>) {
    let end = tag.to_end();
    events.push(Event::Start(tag));
    events.extend(inner);
    events.push(Event::End(end));
}

fn ordered(block_type: BlockType) -> bool {
    block_type == BlockType::Numbered
}

fn push_blocks(ws: &Workspace, blocks: &[Block], events: &mut Vec<Event<'static>>) {
    let mut ix = 0;
    while ix < blocks.len() {
        let first = blocks[ix].block_type();
        if !first.is_list() {
            push_block(ws, &blocks[ix], events);
            ix += 1;
            continue;
        }
        // consecutive list items of the same flavour form one list
        let mut items = Vec::new();
        while ix < blocks.len()
            && blocks[ix].block_type().is_list()
            && ordered(blocks[ix].block_type()) == ordered(first)
        {
            let mut item = Vec::new();
            if let BlockKind::Todo { checked } = blocks[ix].kind {
                item.push(Event::TaskListMarker(checked));
            }
            item.push(text(blocks[ix].visible_text()));
            wrap(&mut items, Tag::Item, item);
            ix += 1;
        }
        wrap(events, Tag::List(ordered(first).then_some(1)), items);
    }
}

fn push_block(ws: &Workspace, block: &Block, events: &mut Vec<Event<'static>>) {
    let visible = block.visible_text();
    match &block.kind {
        BlockKind::Heading1 | BlockKind::Heading2 | BlockKind::Heading3 => {
            let level = match block.kind {
                BlockKind::Heading1 => HeadingLevel::H1,
                BlockKind::Heading2 => HeadingLevel::H2,
                _ => HeadingLevel::H3,
            };
            if visible.trim().is_empty() {
                return;
            }
            let tag = Tag::Heading {
                level,
                id: None,
                classes: Vec::new(),
                attrs: Vec::new(),
            };
            wrap(events, tag, vec![text(visible)]);
        }
        BlockKind::Paragraph => {
            if !visible.trim().is_empty() {
                wrap(events, Tag::Paragraph, vec![text(visible)]);
            }
        }
        BlockKind::Quote => {
            let mut inner = Vec::new();
            wrap(&mut inner, Tag::Paragraph, vec![text(visible)]);
            wrap(events, Tag::BlockQuote(None), inner);
        }
        BlockKind::Callout { icon } => {
            let mut inner = Vec::new();
            wrap(&mut inner, Tag::Paragraph, vec![text(format!("{icon} {visible}"))]);
            wrap(events, Tag::BlockQuote(None), inner);
        }
        BlockKind::Divider => events.push(Event::Rule),
        BlockKind::Code { language } => {
            let fence = CodeBlockKind::Fenced(CowStr::from(language.clone().unwrap_or_default()));
            wrap(
                events,
                Tag::CodeBlock(fence),
                vec![text(format!("{}\n", block.content))],
            );
        }
        BlockKind::Math { .. } => {
            let fence = CodeBlockKind::Fenced(CowStr::from("math"));
            wrap(
                events,
                Tag::CodeBlock(fence),
                vec![text(format!("{}\n", block.content))],
            );
        }
        BlockKind::Table => push_table(block, events),
        BlockKind::Image { .. } => {
            if block.content.is_empty() {
                return;
            }
            let image = Tag::Image {
                link_type: LinkType::Inline,
                dest_url: CowStr::from(block.content.clone()),
                title: CowStr::from(""),
                id: CowStr::from(""),
            };
            let mut inner = Vec::new();
            wrap(&mut inner, image, vec![text("image".to_string())]);
            wrap(events, Tag::Paragraph, inner);
        }
        BlockKind::PageLink { page_id } => {
            let link = Tag::Link {
                link_type: LinkType::Inline,
                dest_url: CowStr::from(format!("#{page_id}")),
                title: CowStr::from(""),
                id: CowStr::from(""),
            };
            let mut inner = Vec::new();
            wrap(&mut inner, link, vec![text(ws.link_label(page_id))]);
            wrap(events, Tag::Paragraph, inner);
        }
        BlockKind::Toggle { children, .. } => {
            let mut item = vec![text(visible)];
            push_blocks(ws, children, &mut item);
            let mut list = Vec::new();
            wrap(&mut list, Tag::Item, item);
            wrap(events, Tag::List(None), list);
        }
        BlockKind::Bullet | BlockKind::Numbered | BlockKind::Todo { .. } => {
            push_blocks(ws, std::slice::from_ref(block), events)
        }
    }
}

fn push_table(block: &Block, events: &mut Vec<Event<'static>>) {
    let grid = block.table_grid();
    let mut rows = grid.0.iter();
    let Some(header) = rows.next() else {
        return;
    };
    let cells = |row: &Vec<String>| {
        let mut out = Vec::new();
        for cell in row {
            wrap(
                &mut out,
                Tag::TableCell,
                vec![text(crate::block::visible_text(cell))],
            );
        }
        out
    };
    let mut inner = Vec::new();
    wrap(&mut inner, Tag::TableHead, cells(header));
    for row in rows {
        wrap(&mut inner, Tag::TableRow, cells(row));
    }
    wrap(events, Tag::Table(vec![Alignment::None; grid.cols()]), inner);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::{block, page_with, para, toggle};

    fn ws() -> Workspace {
        Workspace::from_pages(
            vec![
                page_with(
                    "a",
                    None,
                    vec![
                        block("h", BlockKind::Heading1, "Plan"),
                        para("p", "Some <b>bold</b> words"),
                        block("b1", BlockKind::Bullet, "one"),
                        block("b2", BlockKind::Todo { checked: true }, "done"),
                        block("n1", BlockKind::Numbered, "first"),
                        block(
                            "c",
                            BlockKind::Code {
                                language: Some("rust".into()),
                            },
                            "fn main() {}",
                        ),
                        block("t", BlockKind::Table, r#"[["k","v"],["x","1"]]"#),
                        block(
                            "l",
                            BlockKind::PageLink {
                                page_id: "b".into(),
                            },
                            "",
                        ),
                        toggle("tg", "More", vec![para("inner", "hidden detail")]),
                    ],
                ),
                page_with("b", None, vec![block("hb", BlockKind::Heading1, "Other")]),
            ],
            None,
        )
        .unwrap()
    }

    #[test]
    fn renders_blocks_as_markdown() {
        let ws = ws();
        let markdown = run(&ws, &"a".into()).rendered.unwrap();
        assert!(markdown.contains("# Plan"));
        assert!(markdown.contains("Some bold words"));
        assert!(markdown.contains("one"));
        assert!(markdown.contains("[x]"));
        assert!(markdown.contains("1. first"));
        assert!(markdown.contains("```rust"));
        assert!(markdown.contains("fn main() {}"));
        assert!(markdown.contains('|'));
        assert!(markdown.contains("[Other](#b)"));
        assert!(markdown.contains("hidden detail"));
    }

    #[test]
    fn unknown_page_reports_error() {
        let result = run(&ws(), &"zzz".into());
        assert!(result.rendered.is_none());
        assert_eq!(result.messages.len(), 1);
    }
}
