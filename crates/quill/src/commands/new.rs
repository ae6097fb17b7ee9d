//! `quill new` command implementation.

use chrono::{Datelike, Local, NaiveDate};
use clap::Args;
use quill_posts::Post;
use quill_store::{FieldValue, Header, PostIdentity};

use super::Context;
use crate::error::CliError;

/// Arguments for the new command.
#[derive(Args)]
pub(crate) struct NewArgs {
    /// Slug of the post, used in its file name and permalink.
    slug: String,

    /// Post title.
    #[arg(short, long)]
    title: Option<String>,

    /// Comma-separated tags.
    #[arg(long, value_delimiter = ',')]
    tags: Vec<String>,

    /// Post date as YYYY-MM-DD (default: today).
    #[arg(short, long, value_parser = parse_date)]
    date: Option<NaiveDate>,

    /// Initial body text.
    #[arg(short, long, default_value = "")]
    body: String,
}

impl NewArgs {
    /// Execute the new command.
    pub(crate) fn execute(self, ctx: &Context) -> Result<(), CliError> {
        let date = self.date.unwrap_or_else(|| Local::now().date_naive());
        let identity = PostIdentity::new(date.year(), date.month(), date.day(), &self.slug)?;

        if ctx.manager.index()?.get(&identity.permalink).is_some() {
            return Err(CliError::Validation(format!(
                "Post {} already exists",
                identity.permalink
            )));
        }

        let header = build_header(self.title, self.tags);
        let content = ctx.manager.parser().compose(&header, &self.body);
        let post = ctx
            .manager
            .save_post(&Post::draft(identity, header), &content)?;

        let path = post
            .filename()
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        ctx.output
            .success(&format!("Created {} ({path})", post.permalink()));
        Ok(())
    }
}

/// Header for a new post.
fn build_header(title: Option<String>, tags: Vec<String>) -> Header {
    let mut header = Header::new();
    if let Some(title) = title {
        header.insert("title".to_owned(), FieldValue::Text(title));
    }
    let tags: Vec<String> = tags
        .into_iter()
        .map(|t| t.trim().to_owned())
        .filter(|t| !t.is_empty())
        .collect();
    if !tags.is_empty() {
        header.insert("tags".to_owned(), FieldValue::List(tags));
    }
    header
}

/// Parse a `YYYY-MM-DD` date argument.
fn parse_date(arg: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(arg, "%Y-%m-%d").map_err(|e| format!("invalid date {arg:?}: {e}"))
}
