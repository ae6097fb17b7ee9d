//! `quill rm` command implementation.

use clap::Args;

use super::Context;
use crate::error::CliError;

/// Arguments for the rm command.
#[derive(Args)]
pub(crate) struct RmArgs {
    /// Permalink of the post to delete.
    permalink: String,
}

impl RmArgs {
    /// Execute the rm command.
    pub(crate) fn execute(self, ctx: &Context) -> Result<(), CliError> {
        let post = ctx
            .manager
            .get_post(&self.permalink)?
            .ok_or_else(|| CliError::NotFound(self.permalink.clone()))?;

        if ctx.manager.delete_post(&post)? {
            ctx.output.success(&format!("Deleted {}", self.permalink));
        } else {
            ctx.output
                .warning(&format!("{} was already deleted", self.permalink));
        }
        Ok(())
    }
}
