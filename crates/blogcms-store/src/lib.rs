//! Post and site-settings storage for Blog CMS.
//!
//! # Backends
//!
//! Every backend implements [`PostStore`] and [`SettingsStore`], and so the
//! combined [`BlogStore`]:
//!
//! - [`InMemoryBlogStore`] -- lock-guarded maps for tests and embedding
//! - [`SqliteBlogStore`] -- persistent SQLite database via `sqlx`
//!
//! # Design Rules
//!
//! 1. The store assigns post identifiers and never reuses them.
//! 2. `created_at` is written once, on insert.
//! 3. Posts list newest first; equal timestamps list the later insert first.
//! 4. At most one settings record exists, and reads that find none create it.
//! 5. Missing records are `Ok(None)` / `Ok(false)`, never errors; callers
//!    decide what "not found" means.

pub mod error;
pub mod memory;
pub mod sqlite;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use memory::InMemoryBlogStore;
pub use sqlite::SqliteBlogStore;
pub use traits::{BlogStore, PostStore, SettingsStore};
