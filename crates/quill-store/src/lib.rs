//! Post file storage primitives for Quill.
//!
//! This crate turns a directory tree of dated text files into the raw
//! material of a post index:
//!
//! - [`FileLocator`] recursively finds files with the configured extension
//! - [`HeaderParser`] splits file contents into a `key: value` header and a body
//! - [`permalink::derive`] extracts date, slug, timestamp and permalink from a
//!   `YYYY-MM-DD-<slug>` file name
//!
//! # Example
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use quill_store::{FileLocator, HeaderParser, permalink};
//!
//! let locator = FileLocator::with_sources(["posts"], "txt")?;
//! let parser = HeaderParser::default();
//! for file in locator.locate() {
//!     let Ok(identity) = permalink::derive(file.stem()) else {
//!         continue;
//!     };
//!     let contents = file.read_to_string()?;
//!     let parsed = parser.parse(&contents);
//!     println!("{} ({} header fields)", identity.permalink, parsed.header.len());
//! }
//! # Ok(())
//! # }
//! ```

mod error;
mod header;
mod locator;
pub mod permalink;

pub use error::{StoreError, StoreErrorKind};
pub use header::{
    DEFAULT_LIST_FIELDS, DEFAULT_LIST_SEPARATOR, FieldValue, Header, HeaderParser, ParsedFile,
};
pub use locator::{FileLocator, FileStat, SourceFile, read_text};
pub use permalink::{PermalinkError, PostIdentity};
