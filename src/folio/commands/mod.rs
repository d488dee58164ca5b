//! # Command Layer
//!
//! This module is the **Block Editing Engine** plus the page-tree operations. Each
//! operation lives in its own submodule as plain functions over a [`Workspace`].
//!
//! ## Contract
//!
//! - Block operations work on the active page's block list and on any toggle `children`
//!   list inside it. Targets are addressed by id, never by position (the one exception is
//!   the drag reorder in [`move_blocks`], which mirrors the drag source/target indexes).
//! - An operation either fully applies or changes nothing. A target id that no longer
//!   exists is a silent no-op: stale UI callbacks must not take the session down. The
//!   returned [`CmdResult`] tells the caller which of the two happened.
//! - Focus is computed before the list changes, then committed with the mutation.
//! - Every mutation of a page ends with [`crate::page::Page::touch`], which keeps the title
//!   derived and the page non-empty.
//!
//! Nothing in here does I/O, and nothing checks who is editing: gating writes is the
//! caller's job (see [`crate::api`]).
//!
//! ## Command Modules
//!
//! - [`add`]: insert a block after another (focused or not)
//! - [`update`]: merge attributes into a block
//! - [`remove`]: delete a block, choosing the next focus target
//! - [`duplicate`]: copy a block in place
//! - [`move_blocks`]: drag reorder and drag-into-toggle
//! - [`paste`]: split multi-line paste into blocks
//! - [`convert`]: change a block's type
//! - [`merge`]: join neighbouring text blocks
//! - [`keys`]: Enter / Backspace / Delete / Space policies and markdown shortcuts
//! - [`selection`]: focus, select-all and bulk delete
//! - [`pages`]: create, link, delete and decorate pages
//! - [`search`]: title and content search across pages
//! - [`export`]: markdown rendering of a page
//! - [`config`]: show and change settings

use crate::block::BlockId;
use crate::config::FolioConfig;
use crate::page::PageId;
use chrono::{DateTime, Utc};
use serde::Serialize;

pub mod add;
pub mod config;
pub mod convert;
pub mod duplicate;
pub mod export;
pub mod keys;
pub mod merge;
pub mod move_blocks;
pub mod pages;
pub mod paste;
pub mod remove;
pub mod search;
pub mod selection;
pub mod update;

#[cfg(test)]
pub(crate) mod test_support;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CmdMessage {
    pub level: MessageLevel,
    pub content: String,
}

impl CmdMessage {
    pub fn info(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Info,
            content: content.into(),
        }
    }

    pub fn success(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Success,
            content: content.into(),
        }
    }

    pub fn warning(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Warning,
            content: content.into(),
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Error,
            content: content.into(),
        }
    }
}

/// One row of a page listing or search result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageSummary {
    pub id: PageId,
    pub title: String,
    pub icon: Option<String>,
    pub depth: usize,
    pub snippet: Option<String>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CmdResult {
    /// Blocks created or changed. Empty means the command was a no-op.
    pub affected_blocks: Vec<BlockId>,
    pub affected_pages: Vec<PageId>,
    /// Block holding focus after the command, when the command moved it.
    pub focus: Option<BlockId>,
    pub listed_pages: Vec<PageSummary>,
    pub rendered: Option<String>,
    pub config: Option<FolioConfig>,
    pub messages: Vec<CmdMessage>,
}

impl CmdResult {
    pub fn add_message(&mut self, message: CmdMessage) {
        self.messages.push(message);
    }

    pub fn is_noop(&self) -> bool {
        self.affected_blocks.is_empty() && self.affected_pages.is_empty()
    }

    pub fn with_affected_blocks(mut self, blocks: Vec<BlockId>) -> Self {
        self.affected_blocks = blocks;
        self
    }

    pub fn with_affected_pages(mut self, pages: Vec<PageId>) -> Self {
        self.affected_pages = pages;
        self
    }

    pub fn with_focus(mut self, id: BlockId) -> Self {
        self.focus = Some(id);
        self
    }

    pub fn with_listed_pages(mut self, pages: Vec<PageSummary>) -> Self {
        self.listed_pages = pages;
        self
    }

    pub fn with_rendered(mut self, rendered: String) -> Self {
        self.rendered = Some(rendered);
        self
    }

    pub fn with_config(mut self, config: FolioConfig) -> Self {
        self.config = Some(config);
        self
    }
}
