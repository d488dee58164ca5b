use super::args::{Cli, Commands};
use super::print::{print_config, print_messages, print_page, print_pages};
use clap::Parser;
use colored::Colorize;
use folio::api::FolioApi;
use folio::block::{BlockKind, BlockType};
use folio::commands::config::ConfigAction;
use folio::error::{FolioError, Result};
use folio::init::{initialize, FolioContext};
use folio::store::fs_backend::FsBackend;
use folio::store::SaveOutcome;
use std::path::PathBuf;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const LOG_ENV: &str = "FOLIO_LOG";
const IDENTITY_ENV: &str = "FOLIO_IDENTITY";

struct AppContext {
    api: FolioApi<FsBackend>,
    data_dir: PathBuf,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut ctx = init_context(&cli)?;

    match cli.command {
        Some(Commands::List) | None => handle_list(&ctx),
        Some(Commands::Show { page }) => handle_show(&ctx, &page),
        Some(Commands::New { title, parent }) => handle_new(&mut ctx, title, parent),
        Some(Commands::Delete { page }) => handle_delete(&mut ctx, &page),
        Some(Commands::Add { page, text, kind }) => handle_add(&mut ctx, &page, text, kind),
        Some(Commands::Search { term }) => handle_search(&ctx, term),
        Some(Commands::Export { page }) => handle_export(&ctx, &page),
        Some(Commands::Icon { page, icon }) => handle_icon(&mut ctx, &page, icon),
        Some(Commands::Config { key, value }) => handle_config(&ctx, key, value),
    }
}

/// Diagnostics go to stderr so they never mix with command output.
fn init_logging(verbose: bool) {
    let default = if verbose { "folio=debug" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .try_init();
}

fn init_context(cli: &Cli) -> Result<AppContext> {
    let identity = cli
        .identity
        .clone()
        .or_else(|| std::env::var(IDENTITY_ENV).ok());
    let FolioContext { api, data_dir, .. } = initialize(cli.data.clone(), identity)?;
    Ok(AppContext { api, data_dir })
}

/// Persist the edits made by this invocation before the process exits.
fn save(ctx: &mut AppContext) {
    match ctx.api.flush() {
        None | Some(SaveOutcome::Saved) => {}
        Some(SaveOutcome::CachedLocally) => eprintln!(
            "{}",
            "Remote store unavailable; changes kept in the local cache.".yellow()
        ),
        Some(SaveOutcome::Lost) => {
            eprintln!("{}", "Changes could not be saved.".red());
        }
    }
}

fn handle_list(ctx: &AppContext) -> Result<()> {
    let result = ctx.api.list_pages();
    print_pages(&result.listed_pages, ctx.api.workspace());
    print_messages(&result.messages);
    Ok(())
}

fn handle_show(ctx: &AppContext, selector: &str) -> Result<()> {
    let id = ctx.api.resolve(selector)?;
    let page = ctx
        .api
        .workspace()
        .page(&id)
        .ok_or_else(|| FolioError::PageNotFound(id.clone()))?;
    print_page(page, ctx.api.workspace());
    Ok(())
}

fn handle_new(ctx: &mut AppContext, title: Vec<String>, parent: Option<String>) -> Result<()> {
    let parent = parent.map(|p| ctx.api.resolve(&p)).transpose()?;
    let title = (!title.is_empty()).then(|| title.join(" "));
    let result = ctx.api.create_page(parent.as_ref(), title.as_deref())?;
    print_messages(&result.messages);
    save(ctx);
    Ok(())
}

fn handle_delete(ctx: &mut AppContext, selector: &str) -> Result<()> {
    let id = ctx.api.resolve(selector)?;
    let result = ctx.api.delete_page(&id)?;
    print_messages(&result.messages);
    save(ctx);
    Ok(())
}

fn handle_add(ctx: &mut AppContext, selector: &str, text: Vec<String>, kind: BlockType) -> Result<()> {
    let id = ctx.api.resolve(selector)?;
    ctx.api.open_page(&id)?;
    let result = ctx.api.append_block(BlockKind::Paragraph, text.join(" "))?;
    // the engine decides what the text becomes under the target type
    if let Some(block) = result.focus.filter(|_| kind != BlockType::Paragraph) {
        ctx.api.convert_block(&block, kind)?;
    }
    println!("{}", format!("Added {kind} block").green());
    save(ctx);
    Ok(())
}

fn handle_search(ctx: &AppContext, term: Vec<String>) -> Result<()> {
    let result = ctx.api.search(&term.join(" "));
    print_pages(&result.listed_pages, ctx.api.workspace());
    Ok(())
}

fn handle_export(ctx: &AppContext, selector: &str) -> Result<()> {
    let id = ctx.api.resolve(selector)?;
    let result = ctx.api.export_page(&id);
    match result.rendered {
        Some(markdown) => {
            println!("{}", markdown);
            Ok(())
        }
        None => Err(FolioError::PageNotFound(id)),
    }
}

fn handle_icon(ctx: &mut AppContext, selector: &str, icon: Option<String>) -> Result<()> {
    let id = ctx.api.resolve(selector)?;
    let cleared = icon.is_none();
    ctx.api.set_page_icon(&id, icon)?;
    let title = ctx
        .api
        .workspace()
        .page(&id)
        .map(|p| p.display_title())
        .unwrap_or_default();
    if cleared {
        println!("{}", format!("Cleared icon of {title}").green());
    } else {
        println!("{}", format!("Updated icon of {title}").green());
    }
    save(ctx);
    Ok(())
}

fn handle_config(ctx: &AppContext, key: Option<String>, value: Option<String>) -> Result<()> {
    let action = match (key, value) {
        (None, _) => ConfigAction::ShowAll,
        (Some(key), None) => ConfigAction::ShowKey(key),
        (Some(key), Some(value)) => ConfigAction::Set(key, value),
    };
    let result = ctx.api.configure(&ctx.data_dir, action)?;
    if let (Some(config), true) = (&result.config, result.messages.is_empty()) {
        print_config(config);
    }
    print_messages(&result.messages);
    Ok(())
}
