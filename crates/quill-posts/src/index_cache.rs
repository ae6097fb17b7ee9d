//! On-disk caching of the post index.
//!
//! Provides [`IndexCache`] and implementations:
//! - [`FileIndexCache`]: JSON file in the cache directory
//! - [`NullIndexCache`]: No-op cache (always misses)
//!
//! A cached index is only reused when its etag matches the current
//! [`fingerprint`] of the source files and it was written by the same
//! crate version.
//!
//! # Cache Format
//!
//! ```json
//! {
//!     "version": "0.1.0",
//!     "etag": "9f86d08...",
//!     "entries": [
//!         {"year": 2024, "month": 1, "day": 5, "slug": "hello", ...}
//!     ]
//! }
//! ```

use std::fs;
use std::path::PathBuf;
use std::time::UNIX_EPOCH;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use quill_store::{HeaderParser, SourceFile};

use crate::metadata::PostMetadata;

/// Version stamp of the cache format.
const CACHE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Name of the cache file inside the cache directory.
const CACHE_FILENAME: &str = "index.json";

#[derive(Serialize, Deserialize)]
struct CachedIndex {
    version: String,
    etag: String,
    entries: Vec<PostMetadata>,
}

/// Persistent storage for built index entries.
pub(crate) trait IndexCache: Send + Sync {
    /// Retrieve entries stored under `etag`.
    ///
    /// Returns `None` on cache miss, etag or version mismatch, or a corrupt file.
    fn get(&self, etag: &str) -> Option<Vec<PostMetadata>>;

    /// Store entries under `etag`, replacing any previous entry.
    fn set(&self, etag: &str, entries: &[PostMetadata]);

    /// Remove the cached index.
    fn invalidate(&self);
}

/// No-op cache used when no cache directory is configured.
pub(crate) struct NullIndexCache;

impl IndexCache for NullIndexCache {
    fn get(&self, _etag: &str) -> Option<Vec<PostMetadata>> {
        None
    }

    fn set(&self, _etag: &str, _entries: &[PostMetadata]) {}

    fn invalidate(&self) {}
}

/// File-based index cache stored as `{cache_dir}/index.json`.
pub(crate) struct FileIndexCache {
    cache_dir: PathBuf,
}

impl FileIndexCache {
    pub(crate) fn new(cache_dir: PathBuf) -> Self {
        Self { cache_dir }
    }

    fn cache_path(&self) -> PathBuf {
        self.cache_dir.join(CACHE_FILENAME)
    }
}

impl IndexCache for FileIndexCache {
    fn get(&self, etag: &str) -> Option<Vec<PostMetadata>> {
        let content = fs::read_to_string(self.cache_path()).ok()?;
        let cached: CachedIndex = match serde_json::from_str(&content) {
            Ok(cached) => cached,
            Err(e) => {
                tracing::debug!(error = %e, "Ignoring unreadable index cache");
                return None;
            }
        };

        if cached.version != CACHE_VERSION {
            tracing::info!(
                stored = %cached.version,
                current = CACHE_VERSION,
                "Index cache version mismatch, rebuilding"
            );
            return None;
        }
        (cached.etag == etag).then_some(cached.entries)
    }

    fn set(&self, etag: &str, entries: &[PostMetadata]) {
        // Cache is optional: failures are logged and otherwise ignored
        if let Err(e) = fs::create_dir_all(&self.cache_dir) {
            tracing::warn!(error = %e, dir = %self.cache_dir.display(), "Failed to create cache directory");
            return;
        }

        let cached = CachedIndex {
            version: CACHE_VERSION.to_owned(),
            etag: etag.to_owned(),
            entries: entries.to_vec(),
        };
        let content = match serde_json::to_string(&cached) {
            Ok(c) => c,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to serialize post index");
                return;
            }
        };

        if let Err(e) = fs::write(self.cache_path(), content) {
            tracing::warn!(error = %e, "Failed to write index cache");
        }
    }

    fn invalidate(&self) {
        let cache_path = self.cache_path();
        if cache_path.exists()
            && let Err(e) = fs::remove_file(&cache_path)
        {
            tracing::warn!(error = %e, "Failed to remove index cache");
        }
    }
}

/// Etag for a set of discovered files.
///
/// Covers the extension, header parsing settings and every file's path, size
/// and modification time, so any added, removed or edited file changes it.
pub(crate) fn fingerprint(extension: &str, parser: &HeaderParser, files: &[SourceFile]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(extension.as_bytes());
    hasher.update([0]);
    for field in parser.list_fields() {
        hasher.update(field.as_bytes());
        hasher.update([0]);
    }
    hasher.update(parser.separator().to_string().as_bytes());

    for file in files {
        hasher.update([0]);
        hasher.update(file.path().as_os_str().as_encoded_bytes());
        match file.stat() {
            Some(stat) => {
                let mtime = stat
                    .modified
                    .duration_since(UNIX_EPOCH)
                    .map_or(0, |d| d.as_nanos());
                hasher.update(stat.len.to_le_bytes());
                hasher.update(mtime.to_le_bytes());
            }
            None => hasher.update(b"?"),
        }
    }

    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use quill_store::{FileLocator, Header};

    use super::*;

    fn entries() -> Vec<PostMetadata> {
        ["2024-01-01-a", "2024-01-02-b"]
            .iter()
            .map(|stem| {
                let identity = quill_store::permalink::derive(stem).unwrap();
                PostMetadata::new(
                    identity,
                    Header::new(),
                    Some(PathBuf::from(format!("/posts/{stem}.txt"))),
                )
            })
            .collect()
    }

    fn located(dir: &Path) -> Vec<SourceFile> {
        FileLocator::with_sources([dir], "txt")
            .unwrap()
            .locate()
            .collect()
    }

    #[test]
    fn test_null_cache_always_misses() {
        let cache = NullIndexCache;
        cache.set("etag", &entries());
        assert!(cache.get("etag").is_none());
        cache.invalidate();
    }

    #[test]
    fn test_file_cache_get_missing_returns_none() {
        let temp_dir = tempfile::tempdir().unwrap();
        let cache = FileIndexCache::new(temp_dir.path().join("cache"));

        assert!(cache.get("etag").is_none());
    }

    #[test]
    fn test_file_cache_set_and_get() {
        let temp_dir = tempfile::tempdir().unwrap();
        let cache = FileIndexCache::new(temp_dir.path().join("cache"));

        cache.set("etag1", &entries());

        assert_eq!(cache.get("etag1"), Some(entries()));
    }

    #[test]
    fn test_file_cache_etag_mismatch_misses() {
        let temp_dir = tempfile::tempdir().unwrap();
        let cache = FileIndexCache::new(temp_dir.path().join("cache"));

        cache.set("etag1", &entries());

        assert!(cache.get("etag2").is_none());
    }

    #[test]
    fn test_file_cache_version_mismatch_misses() {
        let temp_dir = tempfile::tempdir().unwrap();
        let cache_dir = temp_dir.path().join("cache");
        fs::create_dir_all(&cache_dir).unwrap();
        fs::write(
            cache_dir.join(CACHE_FILENAME),
            r#"{"version":"0.0.0-old","etag":"etag1","entries":[]}"#,
        )
        .unwrap();

        let cache = FileIndexCache::new(cache_dir);
        assert!(cache.get("etag1").is_none());
    }

    #[test]
    fn test_file_cache_invalid_json_misses() {
        let temp_dir = tempfile::tempdir().unwrap();
        let cache_dir = temp_dir.path().join("cache");
        fs::create_dir_all(&cache_dir).unwrap();
        fs::write(cache_dir.join(CACHE_FILENAME), "not json").unwrap();

        let cache = FileIndexCache::new(cache_dir);
        assert!(cache.get("etag").is_none());
    }

    #[test]
    fn test_file_cache_invalidate() {
        let temp_dir = tempfile::tempdir().unwrap();
        let cache = FileIndexCache::new(temp_dir.path().join("cache"));

        cache.set("etag1", &entries());
        cache.invalidate();

        assert!(cache.get("etag1").is_none());
        // Second invalidate on a missing file is fine
        cache.invalidate();
    }

    #[test]
    fn test_fingerprint_stable_for_same_files() {
        let temp_dir = tempfile::tempdir().unwrap();
        fs::write(temp_dir.path().join("2024-01-01-a.txt"), "a").unwrap();
        let parser = HeaderParser::default();

        let first = fingerprint("txt", &parser, &located(temp_dir.path()));
        let second = fingerprint("txt", &parser, &located(temp_dir.path()));

        assert_eq!(first, second);
        assert_eq!(first.len(), 64);
    }

    #[test]
    fn test_fingerprint_changes_when_file_added() {
        let temp_dir = tempfile::tempdir().unwrap();
        fs::write(temp_dir.path().join("2024-01-01-a.txt"), "a").unwrap();
        let parser = HeaderParser::default();
        let before = fingerprint("txt", &parser, &located(temp_dir.path()));

        fs::write(temp_dir.path().join("2024-01-02-b.txt"), "b").unwrap();
        let after = fingerprint("txt", &parser, &located(temp_dir.path()));

        assert_ne!(before, after);
    }

    #[test]
    fn test_fingerprint_changes_when_file_grows() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("2024-01-01-a.txt");
        fs::write(&path, "a").unwrap();
        let parser = HeaderParser::default();
        let before = fingerprint("txt", &parser, &located(temp_dir.path()));

        fs::write(&path, "a longer body").unwrap();
        let after = fingerprint("txt", &parser, &located(temp_dir.path()));

        assert_ne!(before, after);
    }

    #[test]
    fn test_fingerprint_depends_on_parser_settings() {
        let files: Vec<SourceFile> = Vec::new();
        let default = fingerprint("txt", &HeaderParser::default(), &files);
        let custom = fingerprint(
            "txt",
            &HeaderParser::new(vec!["categories".to_owned()], ';'),
            &files,
        );

        assert_ne!(default, custom);
        assert_ne!(default, fingerprint("md", &HeaderParser::default(), &files));
    }
}
