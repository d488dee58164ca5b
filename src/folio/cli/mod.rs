//! # CLI Layer
//!
//! This module is **one possible front end** for folio, not the application itself. It
//! edits a workspace one command at a time: load, apply, save, exit.
//!
//! The CLI layer is the **only** place in the codebase that:
//! - Knows about terminal I/O (stdout, stderr)
//! - Installs the tracing subscriber
//! - Handles argument parsing
//! - Formats output for human consumption
//!
//! ## Structure
//!
//! - `args`: clap definitions
//! - `commands`: `run()` plus one `handle_*()` per subcommand, each calling the API
//! - `print`: turns `CmdResult`s and pages into terminal output

mod args;
mod commands;
mod print;

pub use commands::run;
