use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};

use blogcms_store::BlogStore;
use blogcms_types::{NewPost, Post, PostDraft, PostId, SettingsUpdate, SiteSettings};

use crate::error::{BlogError, BlogResult};
use crate::transfer::{self, ExportDocument, ImportReport};

/// High-level blog API over a shared store.
#[derive(Clone)]
pub struct Blog {
    store: Arc<dyn BlogStore>,
}

impl fmt::Debug for Blog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Blog").finish_non_exhaustive()
    }
}

impl Blog {
    pub fn new(store: Arc<dyn BlogStore>) -> Self {
        Self { store }
    }

    /// Convenience constructor taking ownership of a concrete store.
    pub fn with_store(store: impl BlogStore + 'static) -> Self {
        Self::new(Arc::new(store))
    }

    /// Create the settings record if it does not exist yet.
    ///
    /// Call once at start-up so request handlers never race to create it.
    pub async fn initialize(&self) -> BlogResult<SiteSettings> {
        let settings = self.store.ensure_settings(Utc::now()).await?;
        debug!(title = %settings.blog_title, "settings ready");
        Ok(settings)
    }

    // ---- Posts ----

    /// All posts, newest first.
    pub async fn list_posts(&self) -> BlogResult<Vec<Post>> {
        Ok(self.store.list_posts().await?)
    }

    pub async fn get_post(&self, id: PostId) -> BlogResult<Post> {
        self.store
            .get_post(id)
            .await?
            .ok_or(BlogError::NotFound { id })
    }

    pub async fn create_post(&self, draft: PostDraft) -> BlogResult<Post> {
        let draft = draft.validate()?;
        let post = self
            .store
            .insert_post(&NewPost::new(draft, Utc::now()))
            .await?;
        info!(id = %post.id, title = %post.title, "post created");
        Ok(post)
    }

    /// Replace the editable fields of a post. `id` and `created_at` are kept.
    pub async fn update_post(&self, id: PostId, draft: PostDraft) -> BlogResult<Post> {
        // Existence first, so an unknown id reports NotFound even with a bad draft.
        self.get_post(id).await?;
        let draft = draft.validate()?;
        let post = self
            .store
            .update_post(id, &draft)
            .await?
            .ok_or(BlogError::NotFound { id })?;
        info!(id = %post.id, "post updated");
        Ok(post)
    }

    pub async fn delete_post(&self, id: PostId) -> BlogResult<()> {
        if !self.store.delete_post(id).await? {
            return Err(BlogError::NotFound { id });
        }
        info!(%id, "post deleted");
        Ok(())
    }

    // ---- Settings ----

    /// The settings record, created with defaults if absent.
    pub async fn get_settings(&self) -> BlogResult<SiteSettings> {
        Ok(self.store.ensure_settings(Utc::now()).await?)
    }

    pub async fn update_settings(&self, update: SettingsUpdate) -> BlogResult<SiteSettings> {
        update.validate()?;
        let settings = self.store.update_settings(&update, Utc::now()).await?;
        info!(title = %settings.blog_title, "settings updated");
        Ok(settings)
    }

    // ---- Export / import ----

    pub async fn export_posts(&self) -> BlogResult<ExportDocument> {
        let posts = self.store.list_posts().await?;
        Ok(ExportDocument::new(&posts, Utc::now()))
    }

    /// Import posts from an export document.
    ///
    /// The document shape is checked before anything is written. Entries
    /// that are malformed, or whose title already exists, are skipped.
    pub async fn import_posts(&self, bytes: &[u8]) -> BlogResult<ImportReport> {
        let entries = transfer::parse_entries(bytes)?;
        let mut titles: HashSet<String> = self.store.post_titles().await?.into_iter().collect();
        let mut report = ImportReport::default();

        for entry in &entries {
            let Some(entry) = transfer::read_entry(entry) else {
                report.skipped += 1;
                continue;
            };
            if !titles.insert(entry.draft.title.clone()) {
                debug!(title = %entry.draft.title, "skipping duplicate title");
                report.skipped += 1;
                continue;
            }
            let created_at = entry.created_at.unwrap_or_else(Utc::now);
            self.store
                .insert_post(&NewPost::new(entry.draft, created_at))
                .await?;
            report.imported += 1;
        }

        info!(
            imported = report.imported,
            skipped = report.skipped,
            "import finished"
        );
        Ok(report)
    }
}
