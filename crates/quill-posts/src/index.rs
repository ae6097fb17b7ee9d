//! Timestamp-ordered post index.
//!
//! [`PostIndex`] holds every post's metadata sorted ascending by timestamp,
//! keyed by permalink. Positions are recorded once at construction so
//! adjacency lookups are O(1).

use std::collections::{BTreeMap, HashMap};
use std::sync::OnceLock;

use crate::metadata::PostMetadata;

/// Tag name to number of taggings across all posts.
pub type TagCounts = BTreeMap<String, usize>;

/// Ordered, unique-keyed collection of post metadata.
#[derive(Debug, Default)]
pub struct PostIndex {
    entries: Vec<PostMetadata>,
    positions: HashMap<String, usize>,
    tags: OnceLock<TagCounts>,
}

impl PostIndex {
    /// Build an index from unordered entries.
    ///
    /// Entries sharing a permalink collapse to the last one seen. The result
    /// is sorted by timestamp, ties broken by permalink.
    #[must_use]
    pub fn from_entries(entries: impl IntoIterator<Item = PostMetadata>) -> Self {
        let mut unique: Vec<PostMetadata> = Vec::new();
        let mut seen: HashMap<String, usize> = HashMap::new();

        for entry in entries {
            if let Some(&idx) = seen.get(&entry.permalink) {
                tracing::warn!(
                    permalink = %entry.permalink,
                    kept = ?entry.filename,
                    replaced = ?unique[idx].filename,
                    "Duplicate permalink, last file wins"
                );
                unique[idx] = entry;
            } else {
                seen.insert(entry.permalink.clone(), unique.len());
                unique.push(entry);
            }
        }

        unique.sort_by(|a, b| {
            a.timestamp
                .cmp(&b.timestamp)
                .then_with(|| a.permalink.cmp(&b.permalink))
        });

        let positions = unique
            .iter()
            .enumerate()
            .map(|(idx, entry)| (entry.permalink.clone(), idx))
            .collect();

        Self {
            entries: unique,
            positions,
            tags: OnceLock::new(),
        }
    }

    /// Number of indexed posts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the index has no posts.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries, oldest first.
    #[must_use]
    pub fn entries(&self) -> &[PostMetadata] {
        &self.entries
    }

    /// Permalinks, oldest first.
    pub fn permalinks(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.permalink.as_str())
    }

    /// Look up a post by permalink.
    #[must_use]
    pub fn get(&self, permalink: &str) -> Option<&PostMetadata> {
        self.position(permalink).map(|idx| &self.entries[idx])
    }

    /// Position of a permalink in timestamp order.
    #[must_use]
    pub fn position(&self, permalink: &str) -> Option<usize> {
        self.positions.get(permalink).copied()
    }

    /// Immediate timestamp neighbours of a post: `(older, newer)`.
    ///
    /// Both are `None` for an unknown permalink.
    #[must_use]
    pub fn neighbors(&self, permalink: &str) -> (Option<&PostMetadata>, Option<&PostMetadata>) {
        let Some(idx) = self.position(permalink) else {
            return (None, None);
        };
        let prev = idx.checked_sub(1).map(|i| &self.entries[i]);
        let next = self.entries.get(idx + 1);
        (prev, next)
    }

    /// Window of posts for a page of `limit` entries, oldest first.
    ///
    /// Page 1 is the `limit` newest posts, page 2 the `limit` before those,
    /// and so on. When `limit * page` reaches past the oldest post, the whole
    /// index is returned. Callers reverse the window for newest-first output.
    #[must_use]
    pub fn page_window(&self, limit: usize, page: usize) -> &[PostMetadata] {
        let len = self.entries.len();
        let offset = limit.saturating_mul(page);
        if offset >= len {
            return &self.entries;
        }
        let start = len - offset;
        &self.entries[start..start + limit]
    }

    /// Number of pages of `limit` posts needed to list the whole index.
    #[must_use]
    pub fn page_count(&self, limit: usize) -> usize {
        if limit == 0 {
            return 0;
        }
        self.entries.len().div_ceil(limit)
    }

    /// Entries matching every `(field, value)` predicate, oldest first.
    pub fn filter<'a, K, V>(
        &'a self,
        query: &'a [(K, V)],
    ) -> impl DoubleEndedIterator<Item = &'a PostMetadata>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        self.entries.iter().filter(move |entry| {
            query
                .iter()
                .all(|(field, value)| entry.matches(field.as_ref(), value.as_ref()))
        })
    }

    /// Tag occurrence counts, computed on first use.
    ///
    /// Every tagging counts, so a tag listed twice on one post counts twice.
    pub fn tags(&self) -> &TagCounts {
        self.tags.get_or_init(|| {
            let mut counts = TagCounts::new();
            for tag in self.entries.iter().flat_map(PostMetadata::tags) {
                *counts.entry(tag.clone()).or_default() += 1;
            }
            counts
        })
    }
}
