//! `quill archive` command implementation.

use clap::Args;

use super::{Context, print_posts};
use crate::error::CliError;

/// Arguments for the archive command.
#[derive(Args)]
pub(crate) struct ArchiveArgs {
    /// Year to list.
    year: i32,

    /// Month to list (1-12).
    #[arg(value_parser = clap::value_parser!(u32).range(1..=12))]
    month: Option<u32>,
}

impl ArchiveArgs {
    /// Execute the archive command.
    pub(crate) fn execute(self, ctx: &Context) -> Result<(), CliError> {
        let posts = match self.month {
            Some(month) => ctx.manager.posts_by_month(self.year, month)?,
            None => ctx.manager.posts_by_year(self.year)?,
        };
        print_posts(&ctx.output, &posts);
        Ok(())
    }
}
