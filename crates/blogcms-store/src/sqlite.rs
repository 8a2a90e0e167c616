//! SQLite-backed blog store.
//!
//! Two tables: `posts`, and `site_settings` whose primary key is pinned to
//! `1` so the singleton invariant is enforced by the schema itself.
//! Timestamps are stored as fixed-width RFC 3339 text with microsecond
//! precision, which keeps `ORDER BY created_at` chronological.

use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Datelike, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::{Executor, Row, Sqlite};

use blogcms_types::{
    HexColor, NewPost, Post, PostDraft, PostId, SettingsUpdate, SiteSettings, ThemeColors,
};

use crate::error::{StoreError, StoreResult};
use crate::traits::{PostStore, SettingsStore};

const SCHEMA: [&str; 3] = [
    "CREATE TABLE IF NOT EXISTS posts (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        title TEXT NOT NULL,
        content TEXT NOT NULL,
        featured_image TEXT,
        created_at TEXT NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS posts_created_at ON posts (created_at)",
    "CREATE TABLE IF NOT EXISTS site_settings (
        id INTEGER PRIMARY KEY CHECK (id = 1),
        blog_title TEXT NOT NULL,
        blog_description TEXT NOT NULL,
        primary_color TEXT NOT NULL,
        secondary_color TEXT NOT NULL,
        background_color TEXT NOT NULL,
        overall_background TEXT NOT NULL,
        card_background TEXT NOT NULL,
        text_color TEXT NOT NULL,
        navbar_color TEXT NOT NULL,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )",
];

const POST_COLUMNS: &str = "id, title, content, featured_image, created_at";

const SETTINGS_COLUMNS: &str = "blog_title, blog_description, primary_color, secondary_color, \
     background_color, overall_background, card_background, text_color, navbar_color, \
     created_at, updated_at";

/// A [`PostStore`] and [`SettingsStore`] over a SQLite connection pool.
#[derive(Clone, Debug)]
pub struct SqliteBlogStore {
    pool: SqlitePool,
}

impl SqliteBlogStore {
    /// Open (creating if missing) the database at `url` and apply the schema.
    ///
    /// `sqlite::memory:` URLs are pinned to a single long-lived connection,
    /// since every new in-memory connection would see an empty database.
    pub async fn connect(url: &str) -> StoreResult<Self> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let mut pool = SqlitePoolOptions::new();
        if url.contains(":memory:") {
            pool = pool
                .max_connections(1)
                .idle_timeout(None::<Duration>)
                .max_lifetime(None::<Duration>);
        }
        let store = Self {
            pool: pool.connect_with(options).await?,
        };
        store.migrate().await?;
        tracing::debug!(url, "sqlite store ready");
        Ok(store)
    }

    /// A private in-memory database.
    pub async fn in_memory() -> StoreResult<Self> {
        Self::connect("sqlite::memory:").await
    }

    /// Create tables and indexes that do not exist yet.
    pub async fn migrate(&self) -> StoreResult<()> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        Ok(())
    }

    /// Number of rows in `site_settings` (zero or one).
    pub async fn settings_rows(&self) -> StoreResult<u64> {
        let row = sqlx::query("SELECT COUNT(*) FROM site_settings")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.try_get::<i64, _>(0)? as u64)
    }

    /// Close every pooled connection.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

fn encode_ts(at: DateTime<Utc>) -> StoreResult<String> {
    if !(0..=9999).contains(&at.year()) {
        return Err(StoreError::TimestampOutOfRange(at));
    }
    Ok(at.format("%Y-%m-%dT%H:%M:%S%.6fZ").to_string())
}

fn decode_ts(table: &'static str, raw: &str) -> StoreResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|at| at.with_timezone(&Utc))
        .map_err(|e| StoreError::Corrupt {
            table,
            reason: format!("bad timestamp {raw:?}: {e}"),
        })
}

fn post_from_row(row: &SqliteRow) -> StoreResult<Post> {
    let created_at: String = row.try_get("created_at")?;
    Ok(Post {
        id: PostId::new(row.try_get("id")?),
        title: row.try_get("title")?,
        content: row.try_get("content")?,
        featured_image: row.try_get("featured_image")?,
        created_at: decode_ts("posts", &created_at)?,
    })
}

fn settings_from_row(row: &SqliteRow) -> StoreResult<SiteSettings> {
    let color = |column: &str| -> StoreResult<HexColor> {
        let raw: String = row.try_get(column)?;
        Ok(HexColor::parse(&raw)?)
    };
    let created_at: String = row.try_get("created_at")?;
    let updated_at: String = row.try_get("updated_at")?;
    Ok(SiteSettings {
        blog_title: row.try_get("blog_title")?,
        blog_description: row.try_get("blog_description")?,
        colors: ThemeColors {
            primary_color: color("primary_color")?,
            secondary_color: color("secondary_color")?,
            background_color: color("background_color")?,
            overall_background: color("overall_background")?,
            card_background: color("card_background")?,
            text_color: color("text_color")?,
            navbar_color: color("navbar_color")?,
        },
        created_at: decode_ts("site_settings", &created_at)?,
        updated_at: decode_ts("site_settings", &updated_at)?,
    })
}

async fn read_settings<'e, E>(executor: E) -> StoreResult<Option<SiteSettings>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let sql = format!("SELECT {SETTINGS_COLUMNS} FROM site_settings WHERE id = 1");
    let row = sqlx::query(&sql).fetch_optional(executor).await?;
    row.as_ref().map(settings_from_row).transpose()
}

async fn write_settings<'e, E>(executor: E, settings: &SiteSettings, replace: bool) -> StoreResult<()>
where
    E: Executor<'e, Database = Sqlite>,
{
    let verb = if replace { "INSERT OR REPLACE" } else { "INSERT OR IGNORE" };
    let sql = format!(
        "{verb} INTO site_settings (id, {SETTINGS_COLUMNS}) \
         VALUES (1, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
    );
    let c = &settings.colors;
    sqlx::query(&sql)
        .bind(&settings.blog_title)
        .bind(&settings.blog_description)
        .bind(c.primary_color.as_str())
        .bind(c.secondary_color.as_str())
        .bind(c.background_color.as_str())
        .bind(c.overall_background.as_str())
        .bind(c.card_background.as_str())
        .bind(c.text_color.as_str())
        .bind(c.navbar_color.as_str())
        .bind(encode_ts(settings.created_at)?)
        .bind(encode_ts(settings.updated_at)?)
        .execute(executor)
        .await?;
    Ok(())
}

#[async_trait]
impl PostStore for SqliteBlogStore {
    async fn list_posts(&self) -> StoreResult<Vec<Post>> {
        let sql = format!("SELECT {POST_COLUMNS} FROM posts ORDER BY created_at DESC, id DESC");
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        rows.iter().map(post_from_row).collect()
    }

    async fn get_post(&self, id: PostId) -> StoreResult<Option<Post>> {
        let sql = format!("SELECT {POST_COLUMNS} FROM posts WHERE id = ?");
        let row = sqlx::query(&sql)
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(post_from_row).transpose()
    }

    async fn insert_post(&self, post: &NewPost) -> StoreResult<Post> {
        let created_at = encode_ts(post.created_at)?;
        let result = sqlx::query(
            "INSERT INTO posts (title, content, featured_image, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(&post.draft.title)
        .bind(&post.draft.content)
        .bind(post.draft.featured_image.as_deref())
        .bind(&created_at)
        .execute(&self.pool)
        .await?;

        Ok(Post {
            id: PostId::new(result.last_insert_rowid()),
            title: post.draft.title.clone(),
            content: post.draft.content.clone(),
            featured_image: post.draft.featured_image.clone(),
            created_at: decode_ts("posts", &created_at)?,
        })
    }

    async fn update_post(&self, id: PostId, draft: &PostDraft) -> StoreResult<Option<Post>> {
        let result =
            sqlx::query("UPDATE posts SET title = ?, content = ?, featured_image = ? WHERE id = ?")
                .bind(&draft.title)
                .bind(&draft.content)
                .bind(draft.featured_image.as_deref())
                .bind(id.get())
                .execute(&self.pool)
                .await?;
        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get_post(id).await
    }

    async fn delete_post(&self, id: PostId) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM posts WHERE id = ?")
            .bind(id.get())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn post_titles(&self) -> StoreResult<Vec<String>> {
        let rows = sqlx::query("SELECT title FROM posts")
            .fetch_all(&self.pool)
            .await?;
        rows.iter()
            .map(|row| row.try_get::<String, _>("title").map_err(StoreError::from))
            .collect()
    }

    async fn count_posts(&self) -> StoreResult<u64> {
        let row = sqlx::query("SELECT COUNT(*) FROM posts")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.try_get::<i64, _>(0)? as u64)
    }
}

#[async_trait]
impl SettingsStore for SqliteBlogStore {
    async fn load_settings(&self) -> StoreResult<Option<SiteSettings>> {
        read_settings(&self.pool).await
    }

    async fn ensure_settings(&self, now: DateTime<Utc>) -> StoreResult<SiteSettings> {
        if let Some(settings) = read_settings(&self.pool).await? {
            return Ok(settings);
        }
        // A racing writer may have inserted first; IGNORE keeps its row.
        write_settings(&self.pool, &SiteSettings::defaults(now), false).await?;
        tracing::info!("created default site settings");
        read_settings(&self.pool)
            .await?
            .ok_or_else(|| StoreError::Corrupt {
                table: "site_settings",
                reason: "row missing after insert".into(),
            })
    }

    async fn update_settings(
        &self,
        update: &SettingsUpdate,
        now: DateTime<Utc>,
    ) -> StoreResult<SiteSettings> {
        let mut tx = self.pool.begin().await?;
        let mut settings = read_settings(&mut *tx)
            .await?
            .unwrap_or_else(|| SiteSettings::defaults(now));
        settings.apply(update, now);
        write_settings(&mut *tx, &settings, true).await?;
        tx.commit().await?;
        // Round-trip through the stored form so callers see what a reload returns.
        settings.created_at = decode_ts("site_settings", &encode_ts(settings.created_at)?)?;
        settings.updated_at = decode_ts("site_settings", &encode_ts(settings.updated_at)?)?;
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    fn new_post(title: &str, at: i64) -> NewPost {
        NewPost::new(PostDraft::new(title, "<p>body</p>", None), t(at))
    }

    #[tokio::test]
    async fn insert_and_read_back() {
        let store = SqliteBlogStore::in_memory().await.unwrap();
        let draft = PostDraft::new("Hello", "<b>hi</b>", Some("/img.png".into()));
        let post = store.insert_post(&NewPost::new(draft, t(100))).await.unwrap();

        let read = store.get_post(post.id).await.unwrap().unwrap();
        assert_eq!(read, post);
        assert_eq!(read.featured_image.as_deref(), Some("/img.png"));
        assert_eq!(store.count_posts().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn list_orders_by_timestamp_then_insertion() {
        let store = SqliteBlogStore::in_memory().await.unwrap();
        store.insert_post(&new_post("oldest", 10)).await.unwrap();
        store.insert_post(&new_post("tie-a", 30)).await.unwrap();
        store.insert_post(&new_post("tie-b", 30)).await.unwrap();
        store.insert_post(&new_post("middle", 20)).await.unwrap();

        let titles: Vec<String> = store
            .list_posts()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.title)
            .collect();
        assert_eq!(titles, ["tie-b", "tie-a", "middle", "oldest"]);
    }

    #[tokio::test]
    async fn sub_second_timestamps_sort_correctly() {
        let store = SqliteBlogStore::in_memory().await.unwrap();
        let base = t(1_000);
        for (title, micros) in [("a", 900_000), ("b", 5), ("c", 120_000)] {
            let at = base + chrono::Duration::microseconds(micros);
            let draft = PostDraft::new(title, "x", None);
            store.insert_post(&NewPost::new(draft, at)).await.unwrap();
        }
        let titles: Vec<String> = store
            .list_posts()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.title)
            .collect();
        assert_eq!(titles, ["a", "c", "b"]);
    }

    #[tokio::test]
    async fn update_and_delete() {
        let store = SqliteBlogStore::in_memory().await.unwrap();
        let post = store.insert_post(&new_post("draft", 5)).await.unwrap();

        let draft = PostDraft::new("final", "text", None);
        let updated = store.update_post(post.id, &draft).await.unwrap().unwrap();
        assert_eq!(updated.id, post.id);
        assert_eq!(updated.created_at, post.created_at);
        assert_eq!(updated.title, "final");

        assert!(store.delete_post(post.id).await.unwrap());
        assert!(store.get_post(post.id).await.unwrap().is_none());
        assert!(!store.delete_post(post.id).await.unwrap());
        assert!(store.update_post(post.id, &draft).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn out_of_range_years_are_refused_before_writing() {
        let store = SqliteBlogStore::in_memory().await.unwrap();
        store.insert_post(&new_post("kept", 1)).await.unwrap();

        let far = Utc.with_ymd_and_hms(10_000, 1, 1, 0, 0, 0).unwrap();
        let before = Utc.with_ymd_and_hms(-1, 1, 1, 0, 0, 0).unwrap();
        for at in [far, before] {
            let draft = PostDraft::new("far", "x", None);
            let err = store.insert_post(&NewPost::new(draft, at)).await.unwrap_err();
            assert!(matches!(err, StoreError::TimestampOutOfRange(_)), "{err}");
        }

        let posts = store.list_posts().await.unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].title, "kept");
    }

    #[tokio::test]
    async fn ids_are_never_reused() {
        let store = SqliteBlogStore::in_memory().await.unwrap();
        let a = store.insert_post(&new_post("a", 1)).await.unwrap();
        store.delete_post(a.id).await.unwrap();
        let b = store.insert_post(&new_post("b", 2)).await.unwrap();
        assert!(b.id > a.id);
    }

    #[tokio::test]
    async fn settings_singleton() {
        let store = SqliteBlogStore::in_memory().await.unwrap();
        assert!(store.load_settings().await.unwrap().is_none());

        let first = store.ensure_settings(t(1)).await.unwrap();
        let second = store.ensure_settings(t(2)).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first.colors.primary_color.as_str(), "#667eea");
        assert_eq!(store.settings_rows().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn settings_update_is_partial() {
        let store = SqliteBlogStore::in_memory().await.unwrap();
        store.ensure_settings(t(1)).await.unwrap();
        let update = SettingsUpdate {
            blog_title: Some("Field Notes".into()),
            navbar_color: Some(HexColor::parse("#123456").unwrap()),
            ..Default::default()
        };
        let saved = store.update_settings(&update, t(50)).await.unwrap();
        assert_eq!(saved.blog_title, "Field Notes");
        assert_eq!(saved.colors.navbar_color.as_str(), "#123456");
        assert_eq!(saved.colors.text_color.as_str(), "#333333");
        assert_eq!(saved.created_at, t(1));
        assert_eq!(saved.updated_at, t(50));
        assert_eq!(store.load_settings().await.unwrap(), Some(saved));
        assert_eq!(store.settings_rows().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn file_database_persists_across_connections() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}", dir.path().join("blog.db").display());

        let store = SqliteBlogStore::connect(&url).await.unwrap();
        store.insert_post(&new_post("kept", 7)).await.unwrap();
        store.ensure_settings(t(7)).await.unwrap();
        store.close().await;

        let reopened = SqliteBlogStore::connect(&url).await.unwrap();
        let posts = reopened.list_posts().await.unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].title, "kept");
        assert_eq!(reopened.settings_rows().await.unwrap(), 1);
    }
}
