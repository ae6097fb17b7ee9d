//! CLI command implementations.

pub(crate) mod archive;
pub(crate) mod filter;
pub(crate) mod list;
pub(crate) mod new;
pub(crate) mod rename;
pub(crate) mod rm;
pub(crate) mod show;
pub(crate) mod tags;

use std::path::{Path, PathBuf};

use clap::Args;
use quill_config::{CliSettings, Config};
use quill_posts::{ManagerConfig, MarkdownFilter, Post, PostManager, PostMetadata};

use crate::error::CliError;
use crate::output::Output;

pub(crate) use archive::ArchiveArgs;
pub(crate) use filter::FilterArgs;
pub(crate) use list::ListArgs;
pub(crate) use new::NewArgs;
pub(crate) use rename::RenameArgs;
pub(crate) use rm::RmArgs;
pub(crate) use show::ShowArgs;

/// Options shared by all commands.
#[derive(Args)]
pub(crate) struct GlobalArgs {
    /// Path to configuration file (default: auto-discover quill.toml).
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Post source directory, may be repeated (overrides config).
    #[arg(short, long = "source-dir", global = true)]
    source_dirs: Vec<PathBuf>,

    /// Enable verbose output (index build and cache logs).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable the on-disk index cache.
    #[arg(long, global = true)]
    no_cache: bool,
}

impl GlobalArgs {
    fn cli_settings(&self) -> CliSettings {
        CliSettings {
            source_dirs: (!self.source_dirs.is_empty()).then(|| self.source_dirs.clone()),
            cache_enabled: self.no_cache.then_some(false),
        }
    }
}

/// Loaded configuration and post manager shared by commands.
pub(crate) struct Context {
    pub config: Config,
    pub manager: PostManager,
    pub output: Output,
}

impl Context {
    /// Load configuration and open the post manager.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or a source directory
    /// does not exist.
    pub(crate) fn open(global: &GlobalArgs) -> Result<Self, CliError> {
        let config = Config::load(global.config.as_deref(), Some(&global.cli_settings()))?;
        let manager = open_manager(&config)?;
        Ok(Self {
            config,
            manager,
            output: Output::new(),
        })
    }
}

/// Create a post manager for the resolved configuration.
pub(crate) fn open_manager(config: &Config) -> Result<PostManager, CliError> {
    let posts = &config.posts_resolved;
    let cache_dir = posts.effective_cache_dir();
    if cache_dir.is_some() {
        ensure_project_dir(&posts.project_dir)?;
    }

    tracing::debug!(
        config = ?config.config_path,
        sources = posts.source_dirs.len(),
        cache = cache_dir.is_some(),
        "Opening post manager"
    );

    let manager = PostManager::new(ManagerConfig {
        source_dirs: posts.source_dirs.clone(),
        extension: posts.extension.clone(),
        list_fields: posts.list_fields.clone(),
        list_separator: posts.list_separator,
        cache_dir,
    })?;
    Ok(manager.with_content_filter(MarkdownFilter::default()))
}

/// Ensure the `.quill/` project directory exists with a `.gitignore`.
fn ensure_project_dir(project_dir: &Path) -> Result<(), CliError> {
    std::fs::create_dir_all(project_dir)?;

    let gitignore_path = project_dir.join(".gitignore");
    if !gitignore_path.exists() {
        if let Err(e) = std::fs::write(&gitignore_path, "# Automatically created by quill\n*\n") {
            tracing::debug!(path = %gitignore_path.display(), error = %e, "Failed to write .gitignore");
        }
    }

    Ok(())
}

/// Context over `dir/posts` with the on-disk cache disabled.
#[cfg(test)]
pub(crate) fn test_context(dir: &Path) -> Context {
    let config_path = dir.join("quill.toml");
    std::fs::create_dir_all(dir.join("posts")).unwrap();
    std::fs::write(&config_path, "[posts]\ncache_enabled = false\n").unwrap();
    let global = GlobalArgs {
        config: Some(config_path),
        source_dirs: Vec::new(),
        verbose: false,
        no_cache: false,
    };
    Context::open(&global).unwrap()
}

/// Post date as `YYYY-MM-DD`.
pub(crate) fn date(meta: &PostMetadata) -> String {
    format!("{:04}-{:02}-{:02}", meta.year, meta.month, meta.day)
}

/// One-line listing entry: date, permalink, title and tags.
pub(crate) fn summary_line(meta: &PostMetadata) -> String {
    let mut line = format!("{}  {}", date(meta), meta.permalink);
    if let Some(title) = meta.title() {
        line.push_str("  ");
        line.push_str(title);
    }
    if !meta.tags().is_empty() {
        line.push_str(&format!("  [{}]", meta.tags().join(", ")));
    }
    line
}

/// Print posts as summary lines, or a note when there are none.
pub(crate) fn print_posts(output: &Output, posts: &[Post]) {
    if posts.is_empty() {
        output.info("No matching posts");
        return;
    }
    for post in posts {
        output.line(&summary_line(post.meta()));
    }
}
