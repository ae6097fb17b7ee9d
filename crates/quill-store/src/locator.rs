//! Post file discovery by filesystem walking.
//!
//! [`FileLocator`] only finds files. Reading and parsing them is left to the
//! consumer, which receives lightweight [`SourceFile`] handles.

use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use ignore::{DirEntry, WalkBuilder};

use crate::error::{StoreError, StoreErrorKind};

/// Size and modification time captured while walking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileStat {
    /// File size in bytes.
    pub len: u64,
    /// Last modification time.
    pub modified: SystemTime,
}

/// A post file discovered under one of the source directories.
#[derive(Debug, Clone)]
pub struct SourceFile {
    path: PathBuf,
    stem: String,
    stat: Option<FileStat>,
}

impl SourceFile {
    /// Absolute path to the file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File name without directory and without the configured extension.
    #[must_use]
    pub fn stem(&self) -> &str {
        &self.stem
    }

    /// Size and mtime, if the walker could stat the file.
    #[must_use]
    pub fn stat(&self) -> Option<FileStat> {
        self.stat
    }

    /// Open the file for buffered reading.
    pub fn open(&self) -> Result<BufReader<File>, StoreError> {
        File::open(&self.path)
            .map(BufReader::new)
            .map_err(|e| StoreError::io(e, &self.path))
    }

    /// Read the whole file into a string.
    ///
    /// See [`read_text`] for how invalid UTF-8 is handled.
    pub fn read_to_string(&self) -> Result<String, StoreError> {
        read_text(&self.path)
    }
}

/// Read a post file as text.
///
/// Bytes that are not valid UTF-8 are replaced with U+FFFD and a warning is
/// logged, so one file in a legacy encoding stays readable.
///
/// # Errors
///
/// Returns a [`StoreError`] if the file cannot be read.
pub fn read_text(path: &Path) -> Result<String, StoreError> {
    let bytes = fs::read(path).map_err(|e| StoreError::io(e, path))?;
    match String::from_utf8(bytes) {
        Ok(text) => Ok(text),
        Err(e) => {
            tracing::warn!(path = %path.display(), "Post file is not valid UTF-8, replacing invalid bytes");
            Ok(String::from_utf8_lossy(e.as_bytes()).into_owned())
        }
    }
}

/// Recursively enumerates files with a given extension across source directories.
///
/// Source directories are validated when they are added, so a locator never
/// holds a path that was missing at configuration time. Hidden files and
/// directories are skipped; symlinks are not followed.
#[derive(Debug, Clone)]
pub struct FileLocator {
    source_dirs: Vec<PathBuf>,
    extension: String,
}

impl FileLocator {
    /// Create a locator with no sources.
    ///
    /// `extension` is given without a leading dot (e.g. `"txt"`).
    #[must_use]
    pub fn new(extension: &str) -> Self {
        Self {
            source_dirs: Vec::new(),
            extension: extension.trim_start_matches('.').to_owned(),
        }
    }

    /// Create a locator over several source directories.
    ///
    /// # Errors
    ///
    /// Fails on the first path that does not exist or is not a directory.
    pub fn with_sources<I, P>(sources: I, extension: &str) -> Result<Self, StoreError>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut locator = Self::new(extension);
        for source in sources {
            locator.add_source(source)?;
        }
        Ok(locator)
    }

    /// Add a directory to the set of sources searched for post files.
    ///
    /// The path is canonicalized, so discovered files carry absolute paths.
    ///
    /// # Errors
    ///
    /// Returns [`StoreErrorKind::NotFound`] if the path does not exist and
    /// [`StoreErrorKind::NotADirectory`] if it is not a directory.
    pub fn add_source(&mut self, dir: impl AsRef<Path>) -> Result<(), StoreError> {
        let dir = dir.as_ref();
        let meta = fs::metadata(dir).map_err(|e| StoreError::io(e, dir))?;
        if !meta.is_dir() {
            return Err(StoreError::new(StoreErrorKind::NotADirectory).with_path(dir));
        }
        let dir = fs::canonicalize(dir).map_err(|e| StoreError::io(e, dir))?;
        self.source_dirs.push(dir);
        Ok(())
    }

    /// Configured source directories, in the order they were added.
    #[must_use]
    pub fn source_dirs(&self) -> &[PathBuf] {
        &self.source_dirs
    }

    /// First configured source directory; new posts are written here.
    #[must_use]
    pub fn primary_dir(&self) -> Option<&Path> {
        self.source_dirs.first().map(PathBuf::as_path)
    }

    /// File extension without leading dot.
    #[must_use]
    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Lazily walk all source directories, yielding matching files.
    ///
    /// Entries within a directory are visited in file name order. Unreadable
    /// entries are logged and skipped; zero matches is not an error.
    pub fn locate(&self) -> impl Iterator<Item = SourceFile> + '_ {
        self.source_dirs.iter().flat_map(move |dir| {
            WalkBuilder::new(dir)
                .standard_filters(false)
                .hidden(true)
                .follow_links(false)
                .sort_by_file_name(Ord::cmp)
                .build()
                .filter_map(move |entry| match entry {
                    Ok(entry) => self.classify(&entry),
                    Err(e) => {
                        tracing::warn!(dir = %dir.display(), error = %e, "Failed to read directory entry, skipping");
                        None
                    }
                })
        })
    }

    /// Turn a walk entry into a [`SourceFile`] if it is a file with our extension.
    fn classify(&self, entry: &DirEntry) -> Option<SourceFile> {
        if !entry.file_type().is_some_and(|t| t.is_file()) {
            return None;
        }
        let Some(name) = entry.file_name().to_str() else {
            let suffix = format!(".{}", self.extension);
            if entry
                .file_name()
                .as_encoded_bytes()
                .ends_with(suffix.as_bytes())
            {
                tracing::warn!(path = %entry.path().display(), "Skipping post file with a non-UTF-8 name");
            }
            return None;
        };
        let stem = name
            .strip_suffix(self.extension.as_str())?
            .strip_suffix('.')
            .filter(|s| !s.is_empty())?;

        let stat = entry.metadata().ok().and_then(|m| {
            Some(FileStat {
                len: m.len(),
                modified: m.modified().ok()?,
            })
        });

        Some(SourceFile {
            path: entry.path().to_path_buf(),
            stem: stem.to_owned(),
            stat,
        })
    }
}
