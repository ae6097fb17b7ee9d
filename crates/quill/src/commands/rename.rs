//! `quill rename` command implementation.

use clap::Args;

use super::Context;
use crate::error::CliError;

/// Arguments for the rename command.
#[derive(Args)]
pub(crate) struct RenameArgs {
    /// Permalink of the post to rename.
    permalink: String,

    /// New slug.
    slug: String,
}

impl RenameArgs {
    /// Execute the rename command.
    pub(crate) fn execute(self, ctx: &Context) -> Result<(), CliError> {
        let mut post = ctx
            .manager
            .get_post(&self.permalink)?
            .ok_or_else(|| CliError::NotFound(self.permalink.clone()))?;

        post.set_slug(&self.slug)?;
        if !post.is_renamed() {
            ctx.output.warning("Slug unchanged, nothing to do");
            return Ok(());
        }

        if !ctx.manager.rename_post_file(&post)? {
            return Err(CliError::Validation(format!(
                "Cannot rename {} to {}: target exists or source is missing",
                self.permalink,
                post.permalink()
            )));
        }

        ctx.output
            .success(&format!("Renamed {} to {}", self.permalink, post.permalink()));
        Ok(())
    }
}
