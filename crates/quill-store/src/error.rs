//! Store error types.
//!
//! Provides [`StoreError`] for unified error handling across file discovery,
//! content loading and persistence.

use std::path::{Path, PathBuf};

/// Semantic error categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum StoreErrorKind {
    /// File or directory does not exist.
    NotFound,
    /// Path exists but is not a directory.
    NotADirectory,
    /// Permission denied.
    PermissionDenied,
    /// Target already exists.
    AlreadyExists,
    /// Invalid path or file name.
    InvalidPath,
    /// Other/unknown error category.
    Other,
}

impl StoreErrorKind {
    fn as_str(self) -> &'static str {
        match self {
            Self::NotFound => "Not found",
            Self::NotADirectory => "Not a directory",
            Self::PermissionDenied => "Permission denied",
            Self::AlreadyExists => "Already exists",
            Self::InvalidPath => "Invalid path",
            Self::Other => "Error",
        }
    }
}

/// Store error with semantic kind and an optional underlying source.
#[derive(Debug)]
pub struct StoreError {
    kind: StoreErrorKind,
    path: Option<PathBuf>,
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl StoreError {
    /// Create a new store error.
    #[must_use]
    pub fn new(kind: StoreErrorKind) -> Self {
        Self {
            kind,
            path: None,
            source: None,
        }
    }

    /// Attach path context.
    #[must_use]
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Attach the underlying error source.
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Semantic error category.
    #[must_use]
    pub fn kind(&self) -> StoreErrorKind {
        self.kind
    }

    /// Path the error refers to, if known.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Create a not found error with path.
    #[must_use]
    pub fn not_found(path: impl Into<PathBuf>) -> Self {
        Self::new(StoreErrorKind::NotFound).with_path(path)
    }

    /// Create a store error from an I/O error.
    #[must_use]
    pub fn io(err: std::io::Error, path: impl Into<PathBuf>) -> Self {
        let kind = match err.kind() {
            std::io::ErrorKind::NotFound => StoreErrorKind::NotFound,
            std::io::ErrorKind::PermissionDenied => StoreErrorKind::PermissionDenied,
            std::io::ErrorKind::AlreadyExists => StoreErrorKind::AlreadyExists,
            std::io::ErrorKind::NotADirectory => StoreErrorKind::NotADirectory,
            std::io::ErrorKind::InvalidFilename => StoreErrorKind::InvalidPath,
            _ => StoreErrorKind::Other,
        };
        Self::new(kind).with_path(path).with_source(err)
    }
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Format: "Kind: message (path: /foo/bar)"
        write!(f, "{}", self.kind.as_str())?;

        if let Some(source) = &self.source {
            write!(f, ": {source}")?;
        }

        if let Some(path) = &self.path {
            write!(f, " (path: {})", path.display())?;
        }

        Ok(())
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|s| s.as_ref() as &(dyn std::error::Error + 'static))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_has_no_context() {
        let err = StoreError::new(StoreErrorKind::Other);

        assert_eq!(err.kind(), StoreErrorKind::Other);
        assert!(err.path().is_none());
    }

    #[test]
    fn test_not_found_carries_path() {
        let err = StoreError::not_found("/posts/missing.txt");

        assert_eq!(err.kind(), StoreErrorKind::NotFound);
        assert_eq!(err.path(), Some(Path::new("/posts/missing.txt")));
    }

    #[test]
    fn test_io_maps_kind() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = StoreError::io(io_err, "/posts");

        assert_eq!(err.kind(), StoreErrorKind::PermissionDenied);
    }

    #[test]
    fn test_io_unknown_kind_is_other() {
        let io_err = std::io::Error::other("boom");
        let err = StoreError::io(io_err, "/posts");

        assert_eq!(err.kind(), StoreErrorKind::Other);
    }

    #[test]
    fn test_display_simple() {
        let err = StoreError::new(StoreErrorKind::NotADirectory);

        assert_eq!(err.to_string(), "Not a directory");
    }

    #[test]
    fn test_display_full() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = StoreError::io(io_err, "/posts/a.txt");

        assert_eq!(
            err.to_string(),
            "Not found: file not found (path: /posts/a.txt)"
        );
    }

    #[test]
    fn test_source_is_exposed() {
        use std::error::Error as _;

        let io_err = std::io::Error::other("boom");
        let err = StoreError::io(io_err, "/posts");

        assert!(err.source().is_some());
    }

    #[test]
    fn test_store_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<StoreError>();
    }
}
