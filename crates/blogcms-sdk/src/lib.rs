//! High-level API for Blog CMS.
//!
//! [`Blog`] wraps any [`BlogStore`] and is the one entry point the server
//! and the CLI use: it validates input, stamps timestamps, maps missing
//! records to [`BlogError::NotFound`] and owns the JSON export format.

pub mod blog;
pub mod error;
pub mod transfer;

pub use blog::Blog;
pub use error::{BlogError, BlogResult};
pub use transfer::{ExportDocument, ExportedPost, ImportReport};

// Re-export key types
pub use blogcms_store::{BlogStore, InMemoryBlogStore, SqliteBlogStore};
pub use blogcms_types::{HexColor, Post, PostDraft, PostId, SettingsUpdate, SiteSettings};
