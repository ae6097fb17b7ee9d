//! Post manager error types.

use std::path::PathBuf;

use quill_store::{PermalinkError, StoreError};

/// Error returned by [`PostManager`](crate::PostManager) operations.
#[derive(Debug, thiserror::Error)]
pub enum PostError {
    /// A configured source path is missing or not a directory.
    #[error("Source path {} is not a usable directory: {source}", .path.display())]
    Configuration {
        /// The offending source path.
        path: PathBuf,
        /// Why the path was rejected.
        #[source]
        source: StoreError,
    },
    /// The manager has no source directory to write new posts into.
    #[error("No source directories configured")]
    NoSources,
    /// Reading, writing, renaming or deleting a post file failed.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// Invalid query argument (e.g. zero page size).
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    /// A slug could not be turned into a post identity.
    #[error("Invalid slug: {0}")]
    Slug(#[from] PermalinkError),
    /// A renamed post's file could not be moved to its new name.
    #[error("Cannot rename {} to {}", .from.display(), .to.display())]
    RenameConflict {
        /// File named after the previous slug.
        from: PathBuf,
        /// File named after the current slug.
        to: PathBuf,
    },
}

#[cfg(test)]
mod tests {
    use quill_store::StoreErrorKind;

    use super::*;

    #[test]
    fn test_configuration_display() {
        let err = PostError::Configuration {
            path: PathBuf::from("/missing"),
            source: StoreError::not_found("/missing"),
        };

        assert_eq!(
            err.to_string(),
            "Source path /missing is not a usable directory: Not found (path: /missing)"
        );
    }

    #[test]
    fn test_store_error_is_transparent() {
        let err: PostError = StoreError::new(StoreErrorKind::PermissionDenied).into();
        assert_eq!(err.to_string(), "Permission denied");
    }

    #[test]
    fn test_rename_conflict_display() {
        let err = PostError::RenameConflict {
            from: PathBuf::from("/p/2024-01-01-old.txt"),
            to: PathBuf::from("/p/2024-01-01-new.txt"),
        };
        assert_eq!(
            err.to_string(),
            "Cannot rename /p/2024-01-01-old.txt to /p/2024-01-01-new.txt"
        );
    }
}
