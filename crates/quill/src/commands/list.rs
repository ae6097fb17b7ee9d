//! `quill list` command implementation.

use clap::Args;
use quill_posts::PostEntry;

use super::{Context, date, summary_line};
use crate::error::CliError;

/// Arguments for the list command.
#[derive(Args)]
pub(crate) struct ListArgs {
    /// Page number, 1 is the newest posts.
    #[arg(short, long, default_value_t = 1)]
    page: usize,

    /// Posts per page (default: `listing.page_size` from config).
    #[arg(short, long)]
    limit: Option<usize>,

    /// Print each post's rendered content.
    #[arg(long)]
    full: bool,
}

impl ListArgs {
    /// Execute the list command.
    pub(crate) fn execute(self, ctx: &Context) -> Result<(), CliError> {
        let limit = self.limit.unwrap_or(ctx.config.listing.page_size);
        let entries = ctx.manager.recent_posts(limit, self.page, self.full)?;
        let pages = ctx.manager.page_count(limit)?;

        if entries.is_empty() {
            ctx.output.info("No posts");
            return Ok(());
        }

        for entry in &entries {
            match entry {
                PostEntry::Summary(meta) => ctx.output.line(&summary_line(meta)),
                PostEntry::Full(post) => {
                    ctx.output.separator();
                    ctx.output
                        .highlight(post.title().unwrap_or(post.permalink()));
                    ctx.output
                        .detail(&format!("{}  {}", date(post.meta()), post.permalink()));
                    ctx.output.line("");
                    ctx.output.line(post.content().trim_end());
                }
            }
        }

        // Pages past the end list everything
        ctx.output.info(&format!(
            "Page {} of {pages}",
            self.page.min(pages.max(1))
        ));
        Ok(())
    }
}
