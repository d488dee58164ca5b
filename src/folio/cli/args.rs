use clap::{Parser, Subcommand};
use folio::block::BlockType;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "folio", version)]
#[command(about = "Nested pages of typed blocks, from the command line", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Data directory (defaults to $FOLIO_HOME, then the OS data directory)
    #[arg(long, global = true, value_name = "DIR")]
    pub data: Option<PathBuf>,

    /// Edit as this identity (defaults to $FOLIO_IDENTITY)
    #[arg(long = "as", global = true, value_name = "IDENTITY")]
    pub identity: Option<String>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List pages as a tree
    #[command(alias = "ls")]
    List,

    /// Show a page's blocks
    #[command(alias = "v")]
    Show {
        /// Page position, id or title
        page: String,
    },

    /// Create a page
    #[command(alias = "n")]
    New {
        /// Title of the page
        title: Vec<String>,

        /// Create it under this page
        #[arg(short, long, value_name = "PAGE")]
        parent: Option<String>,
    },

    /// Delete a page and everything under it
    #[command(alias = "rm")]
    Delete {
        /// Page position, id or title
        page: String,
    },

    /// Add a block at the end of a page
    #[command(alias = "a")]
    Add {
        /// Page position, id or title
        page: String,

        /// Block text
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,

        /// Block type (paragraph, h1, bullet, todo, quote, code, ...)
        #[arg(short, long, default_value = "paragraph", value_parser = parse_block_type)]
        kind: BlockType,
    },

    /// Search page titles and content
    Search {
        #[arg(required = true, num_args = 1..)]
        term: Vec<String>,
    },

    /// Print a page as markdown
    Export {
        /// Page position, id or title
        page: String,
    },

    /// Set or clear a page's icon
    Icon {
        /// Page position, id or title
        page: String,

        /// New icon; omit to clear
        icon: Option<String>,
    },

    /// Get or set configuration
    Config {
        /// Configuration key (e.g., autosave-quiet-ms)
        key: Option<String>,

        /// Value to set (if omitted, prints current value)
        value: Option<String>,
    },
}

fn parse_block_type(name: &str) -> Result<BlockType, String> {
    match BlockType::from_name(name) {
        Some(BlockType::PageLink) => Err("page links are made with `folio new --parent`".into()),
        Some(block_type) => Ok(block_type),
        None => Err(format!("unknown block type: {name}")),
    }
}
