//! `quill show` command implementation.

use clap::Args;

use super::{Context, date};
use crate::error::CliError;

/// Arguments for the show command.
#[derive(Args)]
pub(crate) struct ShowArgs {
    /// Post permalink (`YYYY/MM/slug`).
    permalink: String,

    /// Print the raw body instead of rendered HTML.
    #[arg(long)]
    raw: bool,
}

impl ShowArgs {
    /// Execute the show command.
    pub(crate) fn execute(self, ctx: &Context) -> Result<(), CliError> {
        let post = ctx
            .manager
            .get_post(&self.permalink)?
            .ok_or_else(|| CliError::NotFound(self.permalink.clone()))?;

        ctx.output.highlight(post.title().unwrap_or(post.permalink()));
        ctx.output.detail(&date(post.meta()));
        if !post.tags().is_empty() {
            ctx.output
                .detail(&format!("Tags: {}", post.tags().join(", ")));
        }
        if let Some(path) = post.filename() {
            ctx.output.detail(&format!("File: {}", path.display()));
        }
        ctx.output.line("");

        let body = if self.raw {
            post.raw_content()
        } else {
            post.content()
        };
        ctx.output.line(body.trim_end());

        ctx.output.line("");
        if let Some(prev) = post.prev() {
            ctx.output.detail(&format!("Previous: {}", prev.permalink));
        }
        if let Some(next) = post.next() {
            ctx.output.detail(&format!("Next: {}", next.permalink));
        }
        Ok(())
    }
}
