//! Quill CLI - blog post indexer.
//!
//! Provides commands for:
//! - `list`: Newest-first listing, page by page
//! - `show`: A single post with links to its neighbours
//! - `tags`: Tag counts
//! - `filter` / `archive`: Posts matching header fields or dates
//! - `new`, `rename`, `rm`: Create, rename and delete post files

mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{
    ArchiveArgs, Context, FilterArgs, GlobalArgs, ListArgs, NewArgs, RenameArgs, RmArgs,
    ShowArgs,
};
use error::CliError;
use output::Output;

/// Quill - index and query dated blog posts.
#[derive(Parser)]
#[command(name = "quill", version, about)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List recent posts, newest first.
    List(ListArgs),
    /// Show a single post.
    Show(ShowArgs),
    /// Show tag counts.
    Tags,
    /// List posts matching `key=value` predicates.
    Filter(FilterArgs),
    /// List posts from a year or month.
    Archive(ArchiveArgs),
    /// Create a new post file.
    New(NewArgs),
    /// Change the slug of a post and rename its file.
    Rename(RenameArgs),
    /// Delete a post file.
    Rm(RmArgs),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if cli.global.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run(cli) {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let ctx = Context::open(&cli.global)?;

    match cli.command {
        Commands::List(args) => args.execute(&ctx),
        Commands::Show(args) => args.execute(&ctx),
        Commands::Tags => commands::tags::execute(&ctx),
        Commands::Filter(args) => args.execute(&ctx),
        Commands::Archive(args) => args.execute(&ctx),
        Commands::New(args) => args.execute(&ctx),
        Commands::Rename(args) => args.execute(&ctx),
        Commands::Rm(args) => args.execute(&ctx),
    }
}
