//! In-memory blog store for tests and embedding.
//!
//! [`InMemoryBlogStore`] keeps posts in a `BTreeMap` keyed by identifier and
//! the settings record in an `Option`, each behind a `RwLock`. Data is lost
//! when the store is dropped.

use std::collections::BTreeMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use blogcms_types::{NewPost, Post, PostDraft, PostId, SettingsUpdate, SiteSettings};

use crate::error::{StoreError, StoreResult};
use crate::traits::{PostStore, SettingsStore};

/// An in-memory implementation of [`PostStore`] and [`SettingsStore`].
pub struct InMemoryBlogStore {
    posts: RwLock<Posts>,
    settings: RwLock<Option<SiteSettings>>,
}

struct Posts {
    next_id: i64,
    by_id: BTreeMap<PostId, Post>,
}

impl InMemoryBlogStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self {
            posts: RwLock::new(Posts {
                next_id: 1,
                by_id: BTreeMap::new(),
            }),
            settings: RwLock::new(None),
        }
    }

    /// Number of settings records held (zero or one).
    pub fn settings_rows(&self) -> usize {
        self.settings
            .read()
            .map(|s| usize::from(s.is_some()))
            .unwrap_or_default()
    }
}

impl Default for InMemoryBlogStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for InMemoryBlogStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count = self.posts.read().map(|p| p.by_id.len()).unwrap_or_default();
        f.debug_struct("InMemoryBlogStore")
            .field("post_count", &count)
            .finish()
    }
}

#[async_trait]
impl PostStore for InMemoryBlogStore {
    async fn list_posts(&self) -> StoreResult<Vec<Post>> {
        let posts = self.posts.read().map_err(|_| StoreError::LockPoisoned)?;
        let mut list: Vec<Post> = posts.by_id.values().cloned().collect();
        list.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(list)
    }

    async fn get_post(&self, id: PostId) -> StoreResult<Option<Post>> {
        let posts = self.posts.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(posts.by_id.get(&id).cloned())
    }

    async fn insert_post(&self, post: &NewPost) -> StoreResult<Post> {
        let mut posts = self.posts.write().map_err(|_| StoreError::LockPoisoned)?;
        let id = PostId::new(posts.next_id);
        posts.next_id += 1;
        let stored = Post {
            id,
            title: post.draft.title.clone(),
            content: post.draft.content.clone(),
            featured_image: post.draft.featured_image.clone(),
            created_at: post.created_at,
        };
        posts.by_id.insert(id, stored.clone());
        Ok(stored)
    }

    async fn update_post(&self, id: PostId, draft: &PostDraft) -> StoreResult<Option<Post>> {
        let mut posts = self.posts.write().map_err(|_| StoreError::LockPoisoned)?;
        Ok(posts.by_id.get_mut(&id).map(|post| {
            post.title = draft.title.clone();
            post.content = draft.content.clone();
            post.featured_image = draft.featured_image.clone();
            post.clone()
        }))
    }

    async fn delete_post(&self, id: PostId) -> StoreResult<bool> {
        let mut posts = self.posts.write().map_err(|_| StoreError::LockPoisoned)?;
        Ok(posts.by_id.remove(&id).is_some())
    }

    async fn post_titles(&self) -> StoreResult<Vec<String>> {
        let posts = self.posts.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(posts.by_id.values().map(|p| p.title.clone()).collect())
    }

    async fn count_posts(&self) -> StoreResult<u64> {
        let posts = self.posts.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(posts.by_id.len() as u64)
    }
}

#[async_trait]
impl SettingsStore for InMemoryBlogStore {
    async fn load_settings(&self) -> StoreResult<Option<SiteSettings>> {
        let settings = self.settings.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(settings.clone())
    }

    async fn ensure_settings(&self, now: DateTime<Utc>) -> StoreResult<SiteSettings> {
        let mut settings = self.settings.write().map_err(|_| StoreError::LockPoisoned)?;
        Ok(settings
            .get_or_insert_with(|| SiteSettings::defaults(now))
            .clone())
    }

    async fn update_settings(
        &self,
        update: &SettingsUpdate,
        now: DateTime<Utc>,
    ) -> StoreResult<SiteSettings> {
        let mut settings = self.settings.write().map_err(|_| StoreError::LockPoisoned)?;
        let current = settings.get_or_insert_with(|| SiteSettings::defaults(now));
        current.apply(update, now);
        Ok(current.clone())
    }
}
