//! Post metadata records.
//!
//! A [`PostMetadata`] merges the fields declared in a post's header with the
//! fields derived from its file name. Derived fields win when both define the
//! same key.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use quill_store::{FieldValue, Header, PermalinkError, PostIdentity};

/// Metadata for one indexed post.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostMetadata {
    /// Year from the file name.
    pub year: i32,
    /// Month from the file name.
    pub month: u32,
    /// Day from the file name.
    pub day: u32,
    /// Slug from the file name.
    pub slug: String,
    /// Midnight UTC of the post date, in seconds since the Unix epoch.
    pub timestamp: i64,
    /// Unique key: `YYYY/MM/<slug>`.
    pub permalink: String,
    /// Absolute path of the backing file. `None` for posts not yet saved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<PathBuf>,
    /// Header fields as declared in the file.
    #[serde(default, skip_serializing_if = "Header::is_empty")]
    pub header: Header,
}

/// Borrowed view of a metadata field, used for filtering.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldRef<'a> {
    /// Derived numeric field (`year`, `month`, `day`, `timestamp`).
    Number(i64),
    /// Single-valued field.
    Text(&'a str),
    /// List field (e.g. `tags`).
    List(&'a [String]),
}

impl PostMetadata {
    /// Combine a derived identity with header fields.
    #[must_use]
    pub fn new(identity: PostIdentity, header: Header, filename: Option<PathBuf>) -> Self {
        Self {
            year: identity.year,
            month: identity.month,
            day: identity.day,
            slug: identity.slug,
            timestamp: identity.timestamp,
            permalink: identity.permalink,
            filename,
            header,
        }
    }

    /// Post title from the header.
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.header.get("title").and_then(FieldValue::as_text)
    }

    /// Post tags from the header; empty when the post has none.
    #[must_use]
    pub fn tags(&self) -> &[String] {
        self.header
            .get("tags")
            .and_then(FieldValue::as_list)
            .unwrap_or_default()
    }

    /// File stem for this post (`YYYY-MM-DD-<slug>`).
    #[must_use]
    pub fn file_stem(&self) -> String {
        quill_store::permalink::file_stem(self.year, self.month, self.day, &self.slug)
    }

    /// Look up a field by name. Derived fields shadow header fields.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<FieldRef<'_>> {
        let derived = match name {
            "year" => Some(FieldRef::Number(i64::from(self.year))),
            "month" => Some(FieldRef::Number(i64::from(self.month))),
            "day" => Some(FieldRef::Number(i64::from(self.day))),
            "timestamp" => Some(FieldRef::Number(self.timestamp)),
            "slug" => Some(FieldRef::Text(&self.slug)),
            "permalink" => Some(FieldRef::Text(&self.permalink)),
            "filename" => self
                .filename
                .as_deref()
                .and_then(|p| p.to_str())
                .map(FieldRef::Text),
            _ => None,
        };
        derived.or_else(|| {
            self.header.get(name).map(|value| match value {
                FieldValue::Text(text) => FieldRef::Text(text),
                FieldValue::List(items) => FieldRef::List(items),
            })
        })
    }

    /// Check a single filter predicate.
    ///
    /// Absent fields never match. List fields match when `value` is one of
    /// their items, numeric fields compare numerically (so `"1"` and `"01"`
    /// both match January), everything else compares exactly.
    #[must_use]
    pub fn matches(&self, field: &str, value: &str) -> bool {
        match self.field(field) {
            None => false,
            Some(FieldRef::Number(n)) => value.trim().parse::<i64>() == Ok(n),
            Some(FieldRef::Text(text)) => text == value,
            Some(FieldRef::List(items)) => items.iter().any(|item| item == value),
        }
    }

    /// Replace the slug, recomputing the permalink.
    pub(crate) fn set_slug(&mut self, slug: &str) -> Result<(), PermalinkError> {
        let identity = PostIdentity::new(self.year, self.month, self.day, slug)?;
        self.slug = identity.slug;
        self.permalink = identity.permalink;
        Ok(())
    }
}
