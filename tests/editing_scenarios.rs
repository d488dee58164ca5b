//! End-to-end editing sessions through the public API, over an in-memory store.

use folio::api::FolioApi;
use folio::block::{Block, BlockId, BlockKind, BlockType};
use folio::commands::keys::{Key, KeyOutcome};
use folio::commands::update::BlockPatch;
use folio::config::FolioConfig;
use folio::focus;
use folio::page::{derive_title, Page, PageId};
use folio::session::{AccessPolicy, Session};
use folio::store::mem_backend::MemBackend;
use folio::store::{SaveOutcome, WorkspaceStore};
use folio::tree;
use folio::workspace::Workspace;
use std::collections::HashSet;

fn block(id: &str, kind: BlockKind, content: &str) -> Block {
    let mut block = Block::new(kind, content);
    block.id = BlockId::from(id);
    block
}

fn para(id: &str, content: &str) -> Block {
    block(id, BlockKind::Paragraph, content)
}

fn toggle(id: &str, children: Vec<Block>) -> Block {
    block(
        id,
        BlockKind::Toggle {
            toggled: true,
            children,
        },
        "section",
    )
}

/// A session whose active page holds exactly `blocks`.
fn api_over(blocks: Vec<Block>) -> FolioApi<MemBackend> {
    let mut page = Page::new(None);
    page.id = PageId::from("p1");
    page.blocks = blocks;
    let ws = Workspace::from_pages(vec![page], None).unwrap();

    let config = FolioConfig::default();
    let store = WorkspaceStore::with_backend(MemBackend::new(), config.inline_image_limit);
    assert_eq!(store.save(&ws), SaveOutcome::Saved);
    FolioApi::load_or_seed(store, Session::anonymous(), AccessPolicy::Open, &config).unwrap()
}

fn blocks(api: &FolioApi<MemBackend>) -> &[Block] {
    &api.workspace().active_page().blocks
}

fn contents(api: &FolioApi<MemBackend>) -> Vec<String> {
    blocks(api).iter().map(|b| b.content.clone()).collect()
}

fn assert_invariants(ws: &Workspace) {
    let page_ids: HashSet<_> = ws.pages().iter().map(|p| p.id.clone()).collect();
    assert_eq!(page_ids.len(), ws.pages().len(), "page ids must be unique");
    for page in ws.pages() {
        assert!(!page.blocks.is_empty(), "page {} has no blocks", page.id);
        assert!(focus::focused_count(&page.blocks) <= 1);
        let ids = tree::all_ids(&page.blocks);
        let unique: HashSet<_> = ids.iter().collect();
        assert_eq!(unique.len(), ids.len(), "block ids must be unique");
        if let Some(parent) = &page.parent_id {
            assert!(page_ids.contains(parent), "dangling parent on {}", page.id);
        }
    }
}

#[test]
fn backspace_downgrades_then_deletes() {
    let mut api = api_over(vec![
        para("prev", "before"),
        block("b", BlockKind::Bullet, ""),
    ]);
    let id = BlockId::from("b");

    let outcome = api.key(&id, Key::Backspace { at_start: true }).unwrap();
    assert!(matches!(outcome, KeyOutcome::Handled(_)));
    let downgraded = tree::find(blocks(&api), &id).unwrap();
    assert_eq!(downgraded.block_type(), BlockType::Paragraph);
    assert_eq!(downgraded.content, "");

    api.key(&id, Key::Backspace { at_start: true }).unwrap();
    assert!(tree::find(blocks(&api), &id).is_none());
    assert_eq!(
        focus::focused_id(blocks(&api)),
        Some(BlockId::from("prev"))
    );
    assert_invariants(api.workspace());
}

#[test]
fn dash_space_becomes_bullet() {
    let mut api = api_over(vec![para("a", "-")]);
    let id = BlockId::from("a");
    api.key(&id, Key::Space).unwrap();
    let converted = &blocks(&api)[0];
    assert_eq!(converted.block_type(), BlockType::Bullet);
    assert_eq!(converted.content, "");
    assert_eq!(converted.id, id);
}

#[test]
fn palette_filter_then_cancel_restores_content() {
    let mut api = api_over(vec![para("a", "hello")]);
    let id = BlockId::from("a");

    assert!(api.open_palette(&id).unwrap());
    for c in "tab".chars() {
        api.palette_type(c);
    }
    assert_eq!(blocks(&api)[0].content, "hello/tab");
    assert!(api.palette_items().iter().any(|item| item.label() == "Table"));

    api.cancel_palette();
    assert!(api.palette().is_none());
    assert_eq!(blocks(&api)[0].content, "hello");
    assert_eq!(blocks(&api)[0].block_type(), BlockType::Paragraph);
}

#[test]
fn palette_links_an_existing_page() {
    let mut api = api_over(vec![para("a", "see also")]);
    api.create_page(None, Some("Glossary")).unwrap();
    let glossary = api.resolve("Glossary").unwrap();
    api.open_page(&"p1".into()).unwrap();

    let id = BlockId::from("a");
    assert!(api.open_palette(&id).unwrap());
    for c in "link".chars() {
        api.palette_type(c);
    }
    // "Link to page" switches to page search instead of closing
    assert!(api.palette_commit().is_none());
    for c in "gloss".chars() {
        api.palette_type(c);
    }
    let result = api.palette_commit().unwrap();
    assert_eq!(result.affected_blocks, vec![id.clone()]);

    let link = tree::find(blocks(&api), &id).unwrap();
    assert_eq!(
        link.kind,
        BlockKind::PageLink {
            page_id: glossary.clone()
        }
    );
    assert_eq!(api.workspace().link_label(&glossary), "Glossary");
}

#[test]
fn multi_line_paste_spreads_in_order() {
    let mut api = api_over(vec![para("x", "X"), para("t", ""), para("y", "Y")]);
    api.paste(&"t".into(), "a\nb\nc").unwrap();

    assert_eq!(contents(&api), vec!["X", "a", "b", "c", "Y"]);
    assert_eq!(focus::focused_count(blocks(&api)), 1);
    assert!(blocks(&api)[3].focused);
    assert_eq!(blocks(&api)[1].id, BlockId::from("t"));
}

#[test]
fn moving_into_toggle_leaves_one_copy() {
    let mut api = api_over(vec![
        para("b", "mover"),
        toggle("t", vec![para("c", "child")]),
    ]);
    let moved = BlockId::from("b");
    api.move_into_toggle(&moved, &"t".into()).unwrap();

    let all = tree::all_ids(blocks(&api));
    assert_eq!(all.iter().filter(|id| **id == moved).count(), 1);
    assert!(tree::is_top_level(blocks(&api), &"t".into()));
    assert!(!tree::is_top_level(blocks(&api), &moved));
    let children = blocks(&api)[0].children().unwrap();
    assert_eq!(children.last().unwrap().id, moved);
    assert_invariants(api.workspace());
}

#[test]
fn toggle_cannot_move_into_its_own_child() {
    let mut api = api_over(vec![toggle(
        "outer",
        vec![toggle("inner", vec![para("c", "")])],
    )]);
    let before = blocks(&api).to_vec();
    let result = api
        .move_into_toggle(&"outer".into(), &"inner".into())
        .unwrap();
    assert!(result.is_noop());
    assert_eq!(blocks(&api), before.as_slice());
}

#[test]
fn bulk_delete_keeps_page_non_empty() {
    let mut api = api_over(vec![para("a", "1"), para("b", "2"), para("c", "3")]);
    api.select_all();
    api.delete_selected().unwrap();

    assert_eq!(blocks(&api).len(), 1);
    assert!(blocks(&api)[0].focused);
    assert_eq!(blocks(&api)[0].block_type(), BlockType::Paragraph);
    assert_invariants(api.workspace());
}

#[test]
fn deleting_a_page_takes_its_subtree() {
    let mut api = api_over(vec![para("a", "root page")]);
    api.create_page(None, Some("Parent")).unwrap();
    let parent = api.resolve("Parent").unwrap();
    api.create_page(Some(&parent), Some("Child")).unwrap();
    let child = api.resolve("Child").unwrap();
    api.create_page(Some(&child), Some("Grandchild")).unwrap();
    assert_eq!(api.workspace().pages().len(), 4);

    let result = api.delete_page(&parent).unwrap();
    assert_eq!(result.affected_pages.len(), 3);
    assert_eq!(api.workspace().pages().len(), 1);
    assert_eq!(api.workspace().active_page_id().as_str(), "p1");
    assert_invariants(api.workspace());
}

#[test]
fn last_page_survives_delete() {
    let mut api = api_over(vec![para("a", "only")]);
    let result = api.delete_page(&"p1".into()).unwrap();
    assert!(result.is_noop());
    assert_eq!(api.workspace().pages().len(), 1);
}

#[test]
fn sub_page_from_block_switches_to_it() {
    let mut api = api_over(vec![para("a", "")]);
    let result = api.create_sub_page(&"a".into()).unwrap();
    let new_page = result.affected_pages[0].clone();

    assert_eq!(api.workspace().active_page_id(), &new_page);
    let home = api.workspace().page(&"p1".into()).unwrap();
    assert_eq!(
        home.blocks[0].kind,
        BlockKind::PageLink {
            page_id: new_page.clone()
        }
    );
    assert_eq!(
        api.workspace().page(&new_page).unwrap().parent_id,
        Some(PageId::from("p1"))
    );
}

#[test]
fn title_follows_first_heading() {
    let mut api = api_over(vec![block("h", BlockKind::Heading1, "Draft"), para("a", "")]);
    api.update_block(&"h".into(), BlockPatch::content("Final"))
        .unwrap();
    let page = api.workspace().active_page();
    assert_eq!(page.title, "Final");
    assert_eq!(derive_title(&page.blocks), page.title);
}

#[test]
fn long_editing_session_holds_invariants() {
    let mut api = api_over(vec![para("a", "alpha"), toggle("t", vec![para("c", "x")])]);
    let a = BlockId::from("a");

    let dup = api.duplicate_block(&a).unwrap().focus.unwrap();
    api.duplicate_block(&"t".into()).unwrap();
    api.key(&dup, Key::Enter {
        shift: false,
        modifier: false,
    })
    .unwrap();
    api.convert_block(&a, BlockType::Toggle).unwrap();
    api.move_into_toggle(&dup, &a).unwrap();
    api.convert_block(&a, BlockType::Quote).unwrap();
    api.merge_next_into(&a).unwrap();
    api.move_block(0, 3).unwrap();
    api.focus(&"c".into());
    api.remove_block(&"c".into(), true).unwrap();

    assert_invariants(api.workspace());
}

#[test]
fn failed_remote_save_keeps_editing_alive() {
    let mut api = api_over(vec![para("a", "")]);
    api.store().backend().set_simulate_remote_failure(true);

    api.update_block(&"a".into(), BlockPatch::content("typed offline"))
        .unwrap();
    assert_eq!(api.flush(), Some(SaveOutcome::CachedLocally));
    let cached = api.store().backend().cache_snapshot().unwrap();
    assert_eq!(cached.pages[0].blocks[0].content, "typed offline");

    // editing carries on
    let result = api
        .update_block(&"a".into(), BlockPatch::content("still typing"))
        .unwrap();
    assert!(!result.is_noop());
}

#[test]
fn stale_ids_are_silent_noops() {
    let mut api = api_over(vec![para("a", "kept")]);
    let gone = BlockId::from("gone");
    assert!(api.remove_block(&gone, true).unwrap().is_noop());
    assert!(api.duplicate_block(&gone).unwrap().is_noop());
    assert!(api
        .update_block(&gone, BlockPatch::content("x"))
        .unwrap()
        .is_noop());
    assert_eq!(
        api.key(&gone, Key::Backspace { at_start: true }).unwrap(),
        KeyOutcome::Passthrough
    );
    assert_eq!(contents(&api), vec!["kept"]);
}
