//! # Folio Architecture
//!
//! Folio is a **UI-agnostic block editing library**: a workspace of nested pages, each
//! page an ordered list of typed blocks. The command-line client is one front end; an
//! in-browser editor or a TUI would drive the same API.
//!
//! ## The Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (cli/, wired by main.rs)                         │
//! │  - Parses arguments, formats output, handles terminal I/O   │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs)                                         │
//! │  - Thin facade over commands and the palette                │
//! │  - Gates writes by identity, schedules autosaves            │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Command Layer (commands/*.rs, palette.rs)                  │
//! │  - Block editing engine and page tree operations            │
//! │  - Plain functions over a Workspace, no I/O                 │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Storage Layer (store/)                                     │
//! │  - StorageBackend trait: remote store plus local cache      │
//! │  - FsBackend (production), MemBackend (testing)             │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Key Principle: No I/O Assumptions in Core
//!
//! From `api.rs` inward, code takes Rust arguments and returns Rust types. It never
//! writes to stdout/stderr and never exits the process. Diagnostics go through `tracing`;
//! the binary decides where they end up.
//!
//! ## Module Overview
//!
//! - [`api`]: The API facade, entry point for all operations
//! - [`commands`]: Block and page operations
//! - [`palette`]: The slash command palette and page-link search
//! - [`block`], [`page`], [`workspace`]: The data model
//! - [`tree`]: Lookups through nested toggle lists
//! - [`focus`]: Single-block focus and range selection
//! - [`store`]: Persistence with cache fallback
//! - [`autosave`]: Debounced save scheduling
//! - [`session`]: Editing identity and write access
//! - [`seed`]: The cold-start workspace
//! - [`config`], [`init`]: Settings and startup
//! - [`error`]: Error types

pub mod api;
pub mod autosave;
pub mod block;
pub mod commands;
pub mod config;
pub mod error;
pub mod focus;
pub mod init;
pub mod page;
pub mod palette;
pub mod seed;
pub mod session;
pub mod store;
pub mod tree;
pub mod workspace;
