//! The workspace shown on a cold start, when neither the remote store nor the local cache
//! has anything.

use crate::block::{Block, BlockKind};
use crate::page::Page;
use crate::workspace::Workspace;

fn page(id: &str, icon: &str, blocks: Vec<Block>) -> Page {
    let mut page = Page::new(None);
    page.id = id.into();
    page.icon = Some(icon.to_string());
    page.blocks = blocks;
    page
}

pub fn default_workspace() -> Workspace {
    let intro = "This is my internal knowledge base where I drop quick notes and technical \
                 breakdowns of things I build.";
    let mut last = Block::paragraph("Try typing / to see the command menu!");
    last.focused = true;

    let research = page(
        "page1",
        "📘",
        vec![
            Block::new(BlockKind::Heading1, "Technical Research &amp; Post-Mortems"),
            Block::paragraph(intro),
            Block::new(
                BlockKind::Code { language: None },
                "function helloWorld() {\n  console.log('Syntax Highlighting built right in!');\n}",
            ),
            Block::paragraph("Try out the Math Blocks too:"),
            Block::new(
                BlockKind::Math {
                    align: Default::default(),
                },
                "f(a) = \\frac{1}{2\\pi i} \\oint\\frac{f(z)}{z-a}dz",
            ),
            last,
        ],
    );
    let notes = page(
        "page2",
        "🛡️",
        vec![
            Block::new(BlockKind::Heading1, "Anti-Money Laundering Algorithms"),
            Block::paragraph("Notes regarding network graph optimization."),
        ],
    );

    Workspace::from_pages(vec![research, notes], None).unwrap_or_default()
}
