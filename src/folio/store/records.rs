//! On-disk shapes.
//!
//! The remote store keeps pages as an object keyed by page id; each record carries an
//! `_order` field so the page sequence survives the unordered map. The local cache is a
//! plain snapshot of the whole workspace, active page included.
//!
//! Remote records are read as raw JSON and decoded one by one, so a damaged record costs
//! at most that page's unreadable fields, never the rest of the workspace.

use crate::block::{Block, BlockKind};
use crate::page::{derive_title, recover_block, Page, PageId, DEFAULT_TITLE};
use crate::workspace::Workspace;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageRecord {
    #[serde(flatten)]
    pub page: Page,
    #[serde(rename = "_order", default)]
    pub order: usize,
}

pub type RemotePages = BTreeMap<PageId, PageRecord>;

/// Remote records as stored, not yet decoded.
pub type RawRemotePages = BTreeMap<PageId, Value>;

pub fn to_records(pages: &[Page]) -> RemotePages {
    pages
        .iter()
        .enumerate()
        .map(|(order, page)| {
            (
                page.id.clone(),
                PageRecord {
                    page: page.clone(),
                    order,
                },
            )
        })
        .collect()
}

/// Pages in stored order. Ties (older data without `_order`) fall back to id order.
///
/// A record that does not decode is salvaged field by field when it is still an object,
/// and dropped when it is not.
pub fn decode_records(raw: RawRemotePages) -> Vec<Page> {
    let mut records: Vec<PageRecord> = raw
        .into_iter()
        .filter_map(|(id, value)| decode_record(id, value))
        .collect();
    records.sort_by(|a, b| a.order.cmp(&b.order).then_with(|| a.page.id.cmp(&b.page.id)));
    records.into_iter().map(|r| r.page).collect()
}

fn decode_record(id: PageId, value: Value) -> Option<PageRecord> {
    let err = match PageRecord::deserialize(&value) {
        Ok(mut record) => {
            record.page.id = id;
            return Some(record);
        }
        Err(err) => err,
    };
    let salvaged = salvage(id.clone(), &value);
    if salvaged.is_some() {
        warn!(page = %id, "page record partly unreadable, keeping what decodes: {err}");
    } else {
        warn!(page = %id, "page record unreadable, skipping it: {err}");
    }
    salvaged
}

fn salvage(id: PageId, value: &Value) -> Option<PageRecord> {
    let fields = value.as_object()?;
    let text = |key: &str| fields.get(key).and_then(Value::as_str).map(str::to_string);
    let time = |key: &str| {
        fields
            .get(key)
            .and_then(|v| DateTime::<Utc>::deserialize(v).ok())
    };

    let mut page = Page::new(None);
    page.id = id;
    page.blocks = fields
        .get("blocks")
        .and_then(Value::as_array)
        .map(|blocks| blocks.iter().cloned().map(recover_block).collect())
        .unwrap_or_default();
    // the title lives in the first heading, so a page that lost its blocks gets it back
    if page.blocks.is_empty() {
        if let Some(title) = text("title").filter(|t| t != DEFAULT_TITLE) {
            page.blocks.push(Block::new(BlockKind::Heading1, title));
        }
    }
    page.ensure_non_empty();
    page.title = derive_title(&page.blocks);
    page.parent_id = text("parentId").map(PageId::from);
    if let Some(icon) = text("icon") {
        page.icon = Some(icon);
    }
    page.cover = text("cover");
    if let Some(created) = time("createdAt") {
        page.created_at = created;
    }
    if let Some(updated) = time("updatedAt") {
        page.updated_at = updated;
    }
    let order = fields
        .get("_order")
        .and_then(Value::as_u64)
        .unwrap_or_default() as usize;
    Some(PageRecord { page, order })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceSnapshot {
    pub pages: Vec<Page>,
    #[serde(default)]
    pub active_page_id: Option<PageId>,
}

impl WorkspaceSnapshot {
    pub fn of(ws: &Workspace) -> Self {
        Self {
            pages: ws.pages().to_vec(),
            active_page_id: Some(ws.active_page_id().clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::BlockType;
    use serde_json::json;

    #[test]
    fn records_keep_page_order() {
        let mut a = Page::new(None);
        a.id = "zzz".into();
        let mut b = Page::new(None);
        b.id = "aaa".into();
        let records = to_records(&[a, b]);

        let json = serde_json::to_value(&records).unwrap();
        assert_eq!(json["zzz"]["_order"], 0);
        assert_eq!(json["aaa"]["_order"], 1);

        let back: RawRemotePages = serde_json::from_value(json).unwrap();
        let ids: Vec<String> = decode_records(back)
            .iter()
            .map(|p| p.id.to_string())
            .collect();
        assert_eq!(ids, vec!["zzz", "aaa"]);
    }

    #[test]
    fn reads_legacy_records() {
        let raw = r#"{
            "page2": {"id": "page2", "title": "Two", "_order": 1,
                      "blocks": [{"id": "b", "type": "p", "content": "x"}]},
            "page1": {"id": "page1", "title": "One", "_order": 0, "parentId": null,
                      "blocks": [{"id": "a", "type": "h1", "content": "One"}]}
        }"#;
        let records: RawRemotePages = serde_json::from_str(raw).unwrap();
        let pages = decode_records(records);
        assert_eq!(pages[0].id.as_str(), "page1");
        assert_eq!(pages[1].blocks[0].content, "x");
    }

    #[test]
    fn damaged_record_is_salvaged_without_sinking_the_rest() {
        let raw: RawRemotePages = serde_json::from_value(json!({
            "alpha": {"id": "alpha", "title": "Alpha", "_order": 0,
                      "blocks": [{"id": "a", "type": "heading1", "content": "Alpha"}]},
            "beta": {"id": "beta", "title": "Beta", "_order": 1, "blocks": null,
                     "icon": "🧪", "updatedAt": "2024-03-01T10:00:00Z"},
            "gamma": {"id": "gamma", "title": "Gamma", "_order": 2,
                      "blocks": [{"id": "g", "type": "paragraph", "content": "kept"}]}
        }))
        .unwrap();

        let pages = decode_records(raw);
        let ids: Vec<&str> = pages.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["alpha", "beta", "gamma"]);

        let beta = &pages[1];
        assert_eq!(beta.title, "Beta");
        assert_eq!(beta.icon.as_deref(), Some("🧪"));
        assert_eq!(beta.updated_at.to_rfc3339(), "2024-03-01T10:00:00+00:00");
        assert_eq!(beta.blocks.len(), 1);
        assert_eq!(beta.blocks[0].block_type(), BlockType::Heading1);
        assert_eq!(beta.blocks[0].content, "Beta");
        assert_eq!(pages[2].blocks[0].content, "kept");
    }

    #[test]
    fn record_that_is_not_an_object_is_skipped() {
        let raw: RawRemotePages = serde_json::from_value(json!({
            "alpha": {"id": "alpha", "blocks": []},
            "broken": 42
        }))
        .unwrap();
        let pages = decode_records(raw);
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].id.as_str(), "alpha");
    }
}
