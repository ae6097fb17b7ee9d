//! Post index and queries for Quill.
//!
//! [`PostManager`] indexes dated post files found by
//! [`quill_store::FileLocator`] and serves:
//!
//! - newest-first pagination ([`PostManager::recent_posts`])
//! - single posts with links to their neighbours ([`PostManager::get_post`])
//! - conjunctive metadata filters, tag and archive queries
//! - tag counts ([`PostManager::tags`])
//! - saving, renaming and deleting post files
//!
//! Post bodies are rendered on demand through a [`ContentFilter`];
//! [`MarkdownFilter`] renders Markdown to HTML.
//!
//! # Example
//!
//! ```no_run
//! # fn main() -> Result<(), quill_posts::PostError> {
//! use quill_posts::{ManagerConfig, MarkdownFilter, PostManager};
//!
//! let manager = PostManager::new(ManagerConfig::with_sources(["posts"]))?
//!     .with_content_filter(MarkdownFilter::default());
//!
//! for entry in manager.recent_posts(10, 1, false)? {
//!     println!("{}", entry.meta().permalink);
//! }
//! if let Some(post) = manager.get_post("2024/01/hello")? {
//!     println!("{}", post.content());
//! }
//! # Ok(())
//! # }
//! ```

mod error;
mod index;
mod index_cache;
mod manager;
mod metadata;
mod post;
mod render;

pub use error::PostError;
pub use index::{PostIndex, TagCounts};
pub use manager::{ManagerConfig, PostManager};
pub use metadata::{FieldRef, PostMetadata};
pub use post::{Post, PostEntry};
pub use render::{ContentFilter, MarkdownFilter};
