//! `quill filter` command implementation.

use clap::Args;

use super::{Context, print_posts};
use crate::error::CliError;

/// Arguments for the filter command.
#[derive(Args)]
pub(crate) struct FilterArgs {
    /// Predicates as `field=value`; all must match (e.g. `tags=rust year=2024`).
    #[arg(required = true, value_parser = parse_predicate)]
    predicates: Vec<(String, String)>,
}

impl FilterArgs {
    /// Execute the filter command.
    pub(crate) fn execute(self, ctx: &Context) -> Result<(), CliError> {
        let posts = ctx.manager.filter(&self.predicates)?;
        print_posts(&ctx.output, &posts);
        Ok(())
    }
}

/// Parse a `field=value` predicate.
fn parse_predicate(arg: &str) -> Result<(String, String), String> {
    let (field, value) = arg
        .split_once('=')
        .ok_or_else(|| format!("expected field=value, got {arg:?}"))?;
    let field = field.trim();
    if field.is_empty() {
        return Err(format!("missing field name in {arg:?}"));
    }
    Ok((field.to_owned(), value.to_owned()))
}
