//! Post manager: the query and persistence facade over a post index.
//!
//! [`PostManager`] owns the index for its source directories. The index is
//! built on first access and memoized until [`PostManager::invalidate`] or
//! [`PostManager::refresh`] is called, or a persistence operation changes
//! the files on disk.
//!
//! # Thread Safety
//!
//! The manager is `Send + Sync` and can be shared across threads:
//! - Uses `RwLock<Option<Arc<PostIndex>>>` for the current index snapshot
//! - Uses `Mutex<()>` so that only one thread builds the index at a time
//!
//! Readers keep using the `Arc<PostIndex>` they obtained even if the index
//! is invalidated meanwhile.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::Instant;

use quill_store::{
    DEFAULT_LIST_FIELDS, DEFAULT_LIST_SEPARATOR, FileLocator, HeaderParser, SourceFile,
    StoreError, permalink,
};

use crate::error::PostError;
use crate::index::{PostIndex, TagCounts};
use crate::index_cache::{self, FileIndexCache, IndexCache, NullIndexCache};
use crate::metadata::PostMetadata;
use crate::post::{Post, PostEntry};
use crate::render::ContentFilter;

/// Post manager configuration.
#[derive(Debug, Clone)]
pub struct ManagerConfig {
    /// Directories scanned for posts. The first one receives new posts.
    pub source_dirs: Vec<PathBuf>,
    /// Post file extension without the leading dot.
    pub extension: String,
    /// Header keys whose values are split into lists.
    pub list_fields: Vec<String>,
    /// Separator for list-valued header fields.
    pub list_separator: char,
    /// Directory for the on-disk index cache. `None` disables it.
    pub cache_dir: Option<PathBuf>,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            source_dirs: Vec::new(),
            extension: "txt".to_owned(),
            list_fields: DEFAULT_LIST_FIELDS.iter().map(|f| (*f).to_owned()).collect(),
            list_separator: DEFAULT_LIST_SEPARATOR,
            cache_dir: None,
        }
    }
}

impl ManagerConfig {
    /// Default configuration reading posts from `dirs`.
    #[must_use]
    pub fn with_sources<I, P>(dirs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            source_dirs: dirs.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }
}

/// Indexes dated post files and answers queries over them.
pub struct PostManager {
    locator: FileLocator,
    parser: HeaderParser,
    content_filter: Option<Arc<dyn ContentFilter>>,
    index_cache: Box<dyn IndexCache>,
    /// Serializes index builds.
    build_lock: Mutex<()>,
    /// Current index snapshot, `None` until built or after invalidation.
    state: RwLock<Option<Arc<PostIndex>>>,
}

impl PostManager {
    /// Create a manager over the configured source directories.
    ///
    /// No files are read until the first query.
    ///
    /// # Errors
    ///
    /// Returns [`PostError::NoSources`] if no source directory is configured
    /// and [`PostError::Configuration`] if one of them is missing or not a
    /// directory.
    pub fn new(config: ManagerConfig) -> Result<Self, PostError> {
        if config.source_dirs.is_empty() {
            return Err(PostError::NoSources);
        }

        let mut locator = FileLocator::new(&config.extension);
        for dir in &config.source_dirs {
            locator
                .add_source(dir)
                .map_err(|source| PostError::Configuration {
                    path: dir.clone(),
                    source,
                })?;
        }

        let index_cache: Box<dyn IndexCache> = match config.cache_dir {
            Some(dir) => Box::new(FileIndexCache::new(dir)),
            None => Box::new(NullIndexCache),
        };

        Ok(Self {
            locator,
            parser: HeaderParser::new(config.list_fields, config.list_separator),
            content_filter: None,
            index_cache,
            build_lock: Mutex::new(()),
            state: RwLock::new(None),
        })
    }

    /// Render post content through `filter`.
    #[must_use]
    pub fn with_content_filter(mut self, filter: impl ContentFilter + 'static) -> Self {
        self.content_filter = Some(Arc::new(filter));
        self
    }

    /// Use `cache` for built indexes.
    #[cfg(test)]
    #[must_use]
    pub(crate) fn with_index_cache(mut self, cache: impl IndexCache + 'static) -> Self {
        self.index_cache = Box::new(cache);
        self
    }

    /// Replace or remove the content filter.
    pub fn set_content_filter(&mut self, filter: Option<Arc<dyn ContentFilter>>) {
        self.content_filter = filter;
    }

    /// Add another source directory.
    ///
    /// # Errors
    ///
    /// Returns [`PostError::Configuration`] if `dir` is missing or not a
    /// directory.
    pub fn add_source(&mut self, dir: impl AsRef<Path>) -> Result<(), PostError> {
        let dir = dir.as_ref();
        self.locator
            .add_source(dir)
            .map_err(|source| PostError::Configuration {
                path: dir.to_path_buf(),
                source,
            })?;
        self.invalidate();
        Ok(())
    }

    /// Canonical source directories, in configuration order.
    #[must_use]
    pub fn source_dirs(&self) -> &[PathBuf] {
        self.locator.source_dirs()
    }

    /// Post file extension.
    #[must_use]
    pub fn extension(&self) -> &str {
        self.locator.extension()
    }

    /// Header parser used for post files.
    #[must_use]
    pub fn parser(&self) -> &HeaderParser {
        &self.parser
    }

    /// Current index, built on first use.
    ///
    /// Uses double-checked locking: concurrent callers wait for a single
    /// build instead of scanning the directories in parallel.
    ///
    /// # Errors
    ///
    /// Returns [`PostError::Store`] if a post file cannot be read.
    pub fn index(&self) -> Result<Arc<PostIndex>, PostError> {
        if let Some(index) = self.snapshot() {
            return Ok(index);
        }

        let _guard = self
            .build_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if let Some(index) = self.snapshot() {
            return Ok(index);
        }

        let index = Arc::new(self.build_index()?);
        *self.state.write().unwrap_or_else(PoisonError::into_inner) = Some(Arc::clone(&index));
        Ok(index)
    }

    /// Drop the in-memory index and tag counts.
    ///
    /// The next query rebuilds them. The on-disk cache is kept and is reused
    /// only if no post file changed.
    pub fn invalidate(&self) {
        *self.state.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// Discard every cached index and rebuild from the source files.
    ///
    /// # Errors
    ///
    /// Returns [`PostError::Store`] if a post file cannot be read.
    pub fn refresh(&self) -> Result<Arc<PostIndex>, PostError> {
        self.invalidate();
        self.index_cache.invalidate();
        self.index()
    }

    fn snapshot(&self) -> Option<Arc<PostIndex>> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn build_index(&self) -> Result<PostIndex, PostError> {
        let started = Instant::now();
        let files: Vec<SourceFile> = self.locator.locate().collect();
        let etag = index_cache::fingerprint(self.locator.extension(), &self.parser, &files);

        if let Some(entries) = self.index_cache.get(&etag) {
            tracing::debug!(count = entries.len(), "Post index loaded from cache");
            return Ok(PostIndex::from_entries(entries));
        }

        let mut entries = Vec::with_capacity(files.len());
        for file in &files {
            let identity = match permalink::derive(file.stem()) {
                Ok(identity) => identity,
                Err(e) => {
                    tracing::warn!(path = %file.path().display(), error = %e, "Skipping post file");
                    continue;
                }
            };
            let contents = file.read_to_string()?;
            let parsed = self.parser.parse(&contents);
            entries.push(PostMetadata::new(
                identity,
                parsed.header,
                Some(file.path().to_path_buf()),
            ));
        }

        let index = PostIndex::from_entries(entries);
        self.index_cache.set(&etag, index.entries());

        tracing::debug!(
            files = files.len(),
            count = index.len(),
            elapsed_ms = started.elapsed().as_secs_f64() * 1000.0,
            "Post index built"
        );
        Ok(index)
    }

    /// A page of the most recent posts, newest first.
    ///
    /// Page 1 holds the `limit` newest posts. A page reaching past the oldest
    /// post yields the whole index. With `expand`, entries are fully loaded
    /// posts with rendered content and navigation links.
    ///
    /// # Errors
    ///
    /// Returns [`PostError::InvalidArgument`] if `limit` or `page` is zero
    /// and [`PostError::Store`] if a post file cannot be read.
    pub fn recent_posts(
        &self,
        limit: usize,
        page: usize,
        expand: bool,
    ) -> Result<Vec<PostEntry>, PostError> {
        if limit == 0 {
            return Err(PostError::InvalidArgument("limit must be at least 1".to_owned()));
        }
        if page == 0 {
            return Err(PostError::InvalidArgument("page must be at least 1".to_owned()));
        }

        let index = self.index()?;
        index
            .page_window(limit, page)
            .iter()
            .rev()
            .map(|meta| -> Result<PostEntry, PostError> {
                if expand {
                    Ok(PostEntry::Full(Box::new(self.load(&index, meta)?)))
                } else {
                    Ok(PostEntry::Summary(meta.clone()))
                }
            })
            .collect()
    }

    /// Number of pages of `limit` posts.
    ///
    /// # Errors
    ///
    /// Returns [`PostError::InvalidArgument`] if `limit` is zero.
    pub fn page_count(&self, limit: usize) -> Result<usize, PostError> {
        if limit == 0 {
            return Err(PostError::InvalidArgument("limit must be at least 1".to_owned()));
        }
        Ok(self.index()?.page_count(limit))
    }

    /// Load a post by permalink.
    ///
    /// Returns `Ok(None)` for an unknown permalink.
    ///
    /// # Errors
    ///
    /// Returns [`PostError::Store`] if the post file cannot be read.
    pub fn get_post(&self, permalink: &str) -> Result<Option<Post>, PostError> {
        let index = self.index()?;
        index
            .get(permalink)
            .map(|meta| self.load(&index, meta))
            .transpose()
    }

    /// Metadata of the posts immediately older and newer than `permalink`.
    ///
    /// # Errors
    ///
    /// Returns [`PostError::Store`] if the index cannot be built.
    pub fn prev_and_next(
        &self,
        permalink: &str,
    ) -> Result<(Option<PostMetadata>, Option<PostMetadata>), PostError> {
        let index = self.index()?;
        let (prev, next) = index.neighbors(permalink);
        Ok((prev.cloned(), next.cloned()))
    }

    /// Load the full post for an index entry.
    ///
    /// # Errors
    ///
    /// Returns [`PostError::Store`] if the post file cannot be read.
    pub fn expand_post(&self, meta: &PostMetadata) -> Result<Post, PostError> {
        let index = self.index()?;
        self.load(&index, meta)
    }

    fn load(&self, index: &PostIndex, meta: &PostMetadata) -> Result<Post, PostError> {
        let body = match meta.filename.as_deref() {
            Some(path) => {
                let contents = quill_store::read_text(path)?;
                self.parser.parse(&contents).body.to_owned()
            }
            None => String::new(),
        };

        let (prev, next) = index.neighbors(&meta.permalink);
        Ok(Post::new(meta.clone(), body)
            .with_content_filter(self.content_filter.clone())
            .with_neighbors(prev.cloned(), next.cloned()))
    }

    /// Posts matching every `(field, value)` predicate, newest first.
    ///
    /// List fields match on membership, other fields on equality. Both
    /// comparisons are case-sensitive. An empty query matches every post.
    ///
    /// # Errors
    ///
    /// Returns [`PostError::Store`] if a post file cannot be read.
    pub fn filter<K, V>(&self, query: &[(K, V)]) -> Result<Vec<Post>, PostError>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let index = self.index()?;
        index
            .filter(query)
            .rev()
            .map(|meta| self.load(&index, meta))
            .collect()
    }

    /// Posts carrying `tag`, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`PostError::Store`] if a post file cannot be read.
    pub fn tagged(&self, tag: &str) -> Result<Vec<Post>, PostError> {
        self.filter(&[("tags", tag)])
    }

    /// Posts dated in `year`, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`PostError::Store`] if a post file cannot be read.
    pub fn posts_by_year(&self, year: i32) -> Result<Vec<Post>, PostError> {
        self.filter(&[("year", year.to_string())])
    }

    /// Posts dated in `month` of `year`, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`PostError::Store`] if a post file cannot be read.
    pub fn posts_by_month(&self, year: i32, month: u32) -> Result<Vec<Post>, PostError> {
        self.filter(&[("year", year.to_string()), ("month", month.to_string())])
    }

    /// Number of taggings per tag across all posts.
    ///
    /// # Errors
    ///
    /// Returns [`PostError::Store`] if the index cannot be built.
    pub fn tags(&self) -> Result<TagCounts, PostError> {
        Ok(self.index()?.tags().clone())
    }

    /// Write `content` as the full file contents of `post`.
    ///
    /// A post without a backing file is written to the primary source
    /// directory as `YYYY-MM-DD-<slug>.<ext>`. A post whose slug changed is
    /// renamed first. Returns the post as saved, with header and body parsed
    /// from `content`.
    ///
    /// # Errors
    ///
    /// Returns [`PostError::Slug`] if the slug is not a single file name
    /// component, [`PostError::RenameConflict`] without writing anything if a
    /// renamed post's file cannot be moved, and [`PostError::Store`] if the
    /// write fails.
    pub fn save_post(&self, post: &Post, content: &str) -> Result<Post, PostError> {
        permalink::validate_slug(post.slug())?;
        if post.is_renamed() && !self.rename_post_file(post)? {
            return Err(PostError::RenameConflict {
                from: post.previous_filename().unwrap_or_default(),
                to: post.filename().map(Path::to_path_buf).unwrap_or_default(),
            });
        }

        let filename = match post.filename() {
            Some(path) => path.to_path_buf(),
            None => self.new_filename(&post.meta().file_stem())?,
        };

        fs::write(&filename, content).map_err(|e| StoreError::io(e, &filename))?;
        tracing::debug!(path = %filename.display(), bytes = content.len(), "Saved post");
        self.invalidate();

        let parsed = self.parser.parse(content);
        Ok(post.saved(filename, parsed.header, parsed.body))
    }

    /// Move a renamed post's file from its previous name to its current one.
    ///
    /// Returns `Ok(false)` and leaves files untouched unless the post was
    /// renamed, the previous file exists and the new name is free.
    ///
    /// # Errors
    ///
    /// Returns [`PostError::Store`] if the rename itself fails.
    pub fn rename_post_file(&self, post: &Post) -> Result<bool, PostError> {
        let (Some(from), Some(to)) = (post.previous_filename(), post.filename()) else {
            return Ok(false);
        };
        if !from.is_file() || to.exists() {
            tracing::debug!(from = %from.display(), to = %to.display(), "Rename skipped");
            return Ok(false);
        }

        fs::rename(&from, to).map_err(|e| StoreError::io(e, &from))?;
        tracing::debug!(from = %from.display(), to = %to.display(), "Renamed post file");
        self.invalidate();
        Ok(true)
    }

    /// Delete a post's backing file.
    ///
    /// Returns `Ok(false)` if the post has no file or it is already gone.
    ///
    /// # Errors
    ///
    /// Returns [`PostError::Store`] if the file exists but cannot be removed.
    pub fn delete_post(&self, post: &Post) -> Result<bool, PostError> {
        let Some(path) = post.filename() else {
            return Ok(false);
        };

        match fs::remove_file(path) {
            Ok(()) => {
                tracing::debug!(path = %path.display(), "Deleted post");
                self.invalidate();
                Ok(true)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StoreError::io(e, path).into()),
        }
    }

    fn new_filename(&self, stem: &str) -> Result<PathBuf, PostError> {
        let dir = self.locator.primary_dir().ok_or(PostError::NoSources)?;
        Ok(dir.join(format!("{stem}.{}", self.locator.extension())))
    }
}
