use async_trait::async_trait;
use chrono::{DateTime, Utc};

use blogcms_types::{NewPost, Post, PostDraft, PostId, SettingsUpdate, SiteSettings};

use crate::error::StoreResult;

/// Storage for blog posts.
///
/// All implementations must satisfy these invariants:
/// - Identifiers are assigned by the store and never reused.
/// - `created_at` is written once by [`insert_post`](Self::insert_post) and
///   never changed afterwards.
/// - Listing is ordered by `created_at` descending; posts with equal
///   timestamps are listed most recently inserted first.
#[async_trait]
pub trait PostStore: Send + Sync {
    /// All posts, newest first.
    async fn list_posts(&self) -> StoreResult<Vec<Post>>;

    /// Read a post by identifier.
    ///
    /// Returns `Ok(None)` if the post does not exist.
    async fn get_post(&self, id: PostId) -> StoreResult<Option<Post>>;

    /// Insert a post and return it with its assigned identifier.
    async fn insert_post(&self, post: &NewPost) -> StoreResult<Post>;

    /// Overwrite the title, content and image of an existing post.
    ///
    /// Returns `Ok(None)` if the post does not exist.
    async fn update_post(&self, id: PostId, draft: &PostDraft) -> StoreResult<Option<Post>>;

    /// Delete a post. Returns `true` if the post existed.
    async fn delete_post(&self, id: PostId) -> StoreResult<bool>;

    /// Titles of every stored post, in no particular order.
    async fn post_titles(&self) -> StoreResult<Vec<String>>;

    /// Number of stored posts.
    async fn count_posts(&self) -> StoreResult<u64>;
}

/// Storage for the singleton [`SiteSettings`] record.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Read the settings record without creating it.
    async fn load_settings(&self) -> StoreResult<Option<SiteSettings>>;

    /// Return the settings record, first persisting the defaults if none
    /// exists. Concurrent callers never produce a second record.
    async fn ensure_settings(&self, now: DateTime<Utc>) -> StoreResult<SiteSettings>;

    /// Apply a partial update, creating the record first if needed, and
    /// return the stored result.
    async fn update_settings(
        &self,
        update: &SettingsUpdate,
        now: DateTime<Utc>,
    ) -> StoreResult<SiteSettings>;
}

/// A complete blog backend.
pub trait BlogStore: PostStore + SettingsStore {}

impl<T: PostStore + SettingsStore> BlogStore for T {}
