//! CLI error types.

use quill_config::ConfigError;
use quill_posts::PostError;
use quill_store::PermalinkError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Posts(#[from] PostError),

    #[error("{0}")]
    Permalink(#[from] PermalinkError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("Post not found: {0}")]
    NotFound(String),

    #[error("{0}")]
    Validation(String),
}
