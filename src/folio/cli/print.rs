use chrono::{DateTime, Utc};
use colored::Colorize;
use folio::block::{Block, BlockKind};
use folio::commands::{CmdMessage, MessageLevel, PageSummary};
use folio::config::FolioConfig;
use folio::page::Page;
use folio::workspace::Workspace;
use timeago::Formatter;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const LINE_WIDTH: usize = 100;
const TIME_WIDTH: usize = 16;
const INDENT: &str = "  ";

pub(super) fn print_messages(messages: &[CmdMessage]) {
    for message in messages {
        match message.level {
            MessageLevel::Info => println!("{}", message.content.dimmed()),
            MessageLevel::Success => println!("{}", message.content.green()),
            MessageLevel::Warning => println!("{}", message.content.yellow()),
            MessageLevel::Error => println!("{}", message.content.red()),
        }
    }
}

/// Page rows, numbered by tree position so the numbers work as selectors.
pub(super) fn print_pages(pages: &[PageSummary], ws: &Workspace) {
    if pages.is_empty() {
        println!("No pages found.");
        return;
    }

    let positions: Vec<_> = ws.tree_order().into_iter().map(|(_, p)| &p.id).collect();
    for summary in pages {
        let position = positions
            .iter()
            .position(|id| *id == &summary.id)
            .map(|ix| ix + 1)
            .unwrap_or(0);
        let idx_str = format!("{position:>3}. ");
        let indent = INDENT.repeat(summary.depth);
        let icon = summary.icon.as_deref().map(|i| format!("{i} ")).unwrap_or_default();
        let marker = if &summary.id == ws.active_page_id() {
            "*"
        } else {
            " "
        };

        let head = format!("{indent}{icon}{}", summary.title);
        let fixed_width = idx_str.width() + marker.width() + TIME_WIDTH + 1;
        let available = LINE_WIDTH.saturating_sub(fixed_width);
        let head_display = truncate_to_width(&head, available);
        let snippet_room = available.saturating_sub(head_display.width() + 1);
        let snippet = summary
            .snippet
            .as_deref()
            .filter(|_| snippet_room > 3)
            .map(|s| truncate_to_width(s, snippet_room))
            .unwrap_or_default();
        let used = head_display.width() + if snippet.is_empty() { 0 } else { snippet.width() + 1 };
        let padding = available.saturating_sub(used);

        println!(
            "{}{}{}{}{} {}",
            marker.yellow(),
            idx_str,
            head_display.bold(),
            if snippet.is_empty() {
                String::new()
            } else {
                format!(" {}", snippet.dimmed())
            },
            " ".repeat(padding),
            format_time_ago(summary.updated_at).dimmed()
        );
    }
}

pub(super) fn print_page(page: &Page, ws: &Workspace) {
    let icon = page.icon.as_deref().map(|i| format!("{i} ")).unwrap_or_default();
    println!("{}{}", icon, page.display_title().bold());
    println!("{}", "-".repeat(32).dimmed());
    print_blocks(&page.blocks, ws, 0);
}

fn print_blocks(blocks: &[Block], ws: &Workspace, depth: usize) {
    let indent = INDENT.repeat(depth);
    let title_block = (depth == 0)
        .then(|| blocks.iter().find(|b| matches!(b.kind, BlockKind::Heading1)))
        .flatten()
        .map(|b| &b.id);
    let mut number = 0;
    for block in blocks {
        number = match block.kind {
            BlockKind::Numbered => number + 1,
            _ => 0,
        };
        let text = block.visible_text();
        match &block.kind {
            // the page title is already printed above the rule
            BlockKind::Heading1 if Some(&block.id) == title_block => {}
            BlockKind::Paragraph => println!("{indent}{text}"),
            BlockKind::Heading1 => println!("{indent}{}", text.bold().underline()),
            BlockKind::Heading2 | BlockKind::Heading3 => println!("{indent}{}", text.bold()),
            BlockKind::Bullet => println!("{indent}• {text}"),
            BlockKind::Numbered => println!("{indent}{number}. {text}"),
            BlockKind::Todo { checked } => {
                if *checked {
                    println!("{indent}[x] {}", text.strikethrough().dimmed());
                } else {
                    println!("{indent}[ ] {text}");
                }
            }
            BlockKind::Quote => println!("{indent}{} {}", "│".dimmed(), text.italic()),
            BlockKind::Callout { icon } => println!("{indent}{icon} {text}"),
            BlockKind::Divider => println!("{indent}{}", "─".repeat(32).dimmed()),
            BlockKind::Code { .. } | BlockKind::Math { .. } => {
                for line in block.content.lines() {
                    println!("{indent}    {}", line.cyan());
                }
            }
            BlockKind::Table => {
                for row in block.table_grid().0 {
                    let cells: Vec<String> =
                        row.iter().map(|c| folio::block::visible_text(c)).collect();
                    println!("{indent}| {} |", cells.join(" | "));
                }
            }
            BlockKind::Image { .. } => println!("{indent}{}", "[image]".dimmed()),
            BlockKind::PageLink { page_id } => {
                println!("{indent}{} {}", "↗".blue(), ws.link_label(page_id).underline())
            }
            BlockKind::Toggle { toggled, children } => {
                let arrow = if *toggled { "▾" } else { "▸" };
                println!("{indent}{arrow} {text}");
                if *toggled {
                    print_blocks(children, ws, depth + 1);
                }
            }
        }
    }
}

pub(super) fn print_config(config: &FolioConfig) {
    for key in folio::config::KEYS {
        if let Some(value) = config.get(key) {
            println!("{} = {}", key.replace('_', "-"), value);
        }
    }
}

fn truncate_to_width(s: &str, max_width: usize) -> String {
    let mut result = String::new();
    let mut current_width = 0;

    for c in s.chars() {
        let char_width = c.width().unwrap_or(0);
        if current_width + char_width > max_width.saturating_sub(1) {
            result.push('…');
            return result;
        }
        result.push(c);
        current_width += char_width;
    }

    result
}

fn format_time_ago(timestamp: DateTime<Utc>) -> String {
    let duration = Utc::now().signed_duration_since(timestamp);
    let formatter = Formatter::new();
    let time_str = formatter.convert(duration.to_std().unwrap_or_default());
    format!("{time_str:>width$}", width = TIME_WIDTH)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncates_wide_text() {
        assert_eq!(truncate_to_width("hello", 10), "hello");
        assert_eq!(truncate_to_width("hello world", 6), "hello…");
        // emoji take two columns
        assert_eq!(truncate_to_width("📘📘📘", 4), "📘…");
    }
}
