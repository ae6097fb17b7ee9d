//! Fully materialized posts.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use quill_store::{Header, PostIdentity};

use crate::error::PostError;
use crate::metadata::PostMetadata;
use crate::render::ContentFilter;

/// A post with its content and navigation links.
///
/// Rendered content is produced on first access through the content filter
/// the post was loaded with; without one it equals the raw content.
/// `prev` and `next` are copies of the neighbouring posts' metadata.
#[derive(Clone)]
pub struct Post {
    meta: PostMetadata,
    raw_content: String,
    content_filter: Option<Arc<dyn ContentFilter>>,
    rendered: OnceLock<String>,
    prev: Option<PostMetadata>,
    next: Option<PostMetadata>,
    previous_slug: Option<String>,
}

impl Post {
    /// Create an unsaved post for a date and slug.
    ///
    /// The post has no backing file until it is passed to
    /// [`PostManager::save_post`](crate::PostManager::save_post).
    #[must_use]
    pub fn draft(identity: PostIdentity, header: Header) -> Self {
        Self::new(PostMetadata::new(identity, header, None), String::new())
    }

    /// Create a post from metadata and raw body content.
    #[must_use]
    pub fn new(meta: PostMetadata, raw_content: String) -> Self {
        Self {
            meta,
            raw_content,
            content_filter: None,
            rendered: OnceLock::new(),
            prev: None,
            next: None,
            previous_slug: None,
        }
    }

    /// Attach a content filter used for [`content`](Self::content).
    #[must_use]
    pub fn with_content_filter(mut self, filter: Option<Arc<dyn ContentFilter>>) -> Self {
        self.content_filter = filter;
        self.rendered = OnceLock::new();
        self
    }

    /// Attach navigation links.
    #[must_use]
    pub fn with_neighbors(
        mut self,
        prev: Option<PostMetadata>,
        next: Option<PostMetadata>,
    ) -> Self {
        self.prev = prev;
        self.next = next;
        self
    }

    /// Post metadata.
    #[must_use]
    pub fn meta(&self) -> &PostMetadata {
        &self.meta
    }

    /// Canonical permalink.
    #[must_use]
    pub fn permalink(&self) -> &str {
        &self.meta.permalink
    }

    /// Current slug.
    #[must_use]
    pub fn slug(&self) -> &str {
        &self.meta.slug
    }

    /// Title from the header, if any.
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.meta.title()
    }

    /// Tags from the header.
    #[must_use]
    pub fn tags(&self) -> &[String] {
        self.meta.tags()
    }

    /// Backing file, if the post has been saved.
    #[must_use]
    pub fn filename(&self) -> Option<&Path> {
        self.meta.filename.as_deref()
    }

    /// Body as stored in the file, without the header.
    #[must_use]
    pub fn raw_content(&self) -> &str {
        &self.raw_content
    }

    /// Rendered body.
    pub fn content(&self) -> &str {
        self.rendered.get_or_init(|| match &self.content_filter {
            Some(filter) => filter.render(&self.raw_content),
            None => self.raw_content.clone(),
        })
    }

    /// The next older post, `None` for the oldest.
    #[must_use]
    pub fn prev(&self) -> Option<&PostMetadata> {
        self.prev.as_ref()
    }

    /// The next newer post, `None` for the newest.
    #[must_use]
    pub fn next(&self) -> Option<&PostMetadata> {
        self.next.as_ref()
    }

    /// Change the slug, keeping the date.
    ///
    /// For a saved post the backing filename follows the new slug and the old
    /// slug is remembered so that saving renames the file.
    ///
    /// # Errors
    ///
    /// Returns [`PostError::Slug`] if `slug` is empty or contains a path
    /// separator or `..`.
    pub fn set_slug(&mut self, slug: &str) -> Result<(), PostError> {
        if slug == self.meta.slug {
            return Ok(());
        }
        let old_slug = self.meta.slug.clone();
        self.meta.set_slug(slug)?;

        if let Some(filename) = &self.meta.filename {
            self.meta.filename = Some(sibling(filename, &self.meta.file_stem()));
            // The file on disk is still named after the first slug
            let on_disk = self.previous_slug.take().unwrap_or(old_slug);
            if on_disk != self.meta.slug {
                self.previous_slug = Some(on_disk);
            }
        }
        Ok(())
    }

    /// Whether the slug changed since the post was loaded or saved.
    #[must_use]
    pub fn is_renamed(&self) -> bool {
        self.previous_slug.is_some()
    }

    /// Slug the backing file is currently named after, if it changed.
    #[must_use]
    pub fn previous_slug(&self) -> Option<&str> {
        self.previous_slug.as_deref()
    }

    /// Path of the backing file under the previous slug.
    #[must_use]
    pub fn previous_filename(&self) -> Option<PathBuf> {
        let slug = self.previous_slug.as_deref()?;
        let filename = self.meta.filename.as_deref()?;
        let stem =
            quill_store::permalink::file_stem(self.meta.year, self.meta.month, self.meta.day, slug);
        Some(sibling(filename, &stem))
    }

    /// Copy of this post reflecting a successful write.
    pub(crate) fn saved(&self, filename: PathBuf, header: Header, body: &str) -> Self {
        let mut meta = self.meta.clone();
        meta.filename = Some(filename);
        meta.header = header;
        Self {
            meta,
            raw_content: body.to_owned(),
            content_filter: self.content_filter.clone(),
            rendered: OnceLock::new(),
            prev: self.prev.clone(),
            next: self.next.clone(),
            previous_slug: None,
        }
    }
}

impl fmt::Debug for Post {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Post")
            .field("meta", &self.meta)
            .field("raw_content", &self.raw_content)
            .field("has_content_filter", &self.content_filter.is_some())
            .field("prev", &self.prev.as_ref().map(|m| &m.permalink))
            .field("next", &self.next.as_ref().map(|m| &m.permalink))
            .field("previous_slug", &self.previous_slug)
            .finish()
    }
}

/// Path in the same directory as `path` with a new stem and the same extension.
fn sibling(path: &Path, stem: &str) -> PathBuf {
    let name = match path.extension() {
        Some(ext) => format!("{stem}.{}", ext.to_string_lossy()),
        None => stem.to_owned(),
    };
    path.with_file_name(name)
}

/// A listing entry: bare metadata or an expanded post.
#[derive(Debug, Clone)]
pub enum PostEntry {
    /// Metadata only.
    Summary(PostMetadata),
    /// Fully loaded post.
    Full(Box<Post>),
}

impl PostEntry {
    /// Metadata of the entry.
    #[must_use]
    pub fn meta(&self) -> &PostMetadata {
        match self {
            Self::Summary(meta) => meta,
            Self::Full(post) => post.meta(),
        }
    }

    /// The expanded post, if this entry was expanded.
    #[must_use]
    pub fn into_post(self) -> Option<Post> {
        match self {
            Self::Summary(_) => None,
            Self::Full(post) => Some(*post),
        }
    }
}
