//! JSON export and import of posts.
//!
//! The export document carries no identifiers, so importing it into
//! another store assigns fresh ones. Import is lenient per entry and
//! strict about the document shape.

use chrono::{DateTime, Datelike, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use blogcms_types::{Post, PostDraft};

use crate::error::{BlogError, BlogResult};

/// The document written by an export.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportDocument {
    pub export_date: DateTime<Utc>,
    pub total_posts: usize,
    pub posts: Vec<ExportedPost>,
}

/// One exported post.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportedPost {
    pub title: String,
    pub content: String,
    pub featured_image: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<&Post> for ExportedPost {
    fn from(post: &Post) -> Self {
        Self {
            title: post.title.clone(),
            content: post.content.clone(),
            featured_image: post.featured_image.clone(),
            created_at: post.created_at,
        }
    }
}

impl ExportDocument {
    /// Build a document from posts already in listing order.
    pub fn new(posts: &[Post], export_date: DateTime<Utc>) -> Self {
        Self {
            export_date,
            total_posts: posts.len(),
            posts: posts.iter().map(ExportedPost::from).collect(),
        }
    }
}

/// Outcome of an import.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportReport {
    pub imported: usize,
    pub skipped: usize,
}

/// Parse the document and return its `posts` array.
///
/// Fails with [`BlogError::InvalidFormat`] unless the bytes are a JSON
/// object whose `posts` member is an array.
pub(crate) fn parse_entries(bytes: &[u8]) -> BlogResult<Vec<Value>> {
    let doc: Value = serde_json::from_slice(bytes)
        .map_err(|e| BlogError::InvalidFormat(format!("not valid JSON: {e}")))?;
    let Value::Object(mut doc) = doc else {
        return Err(BlogError::InvalidFormat("expected a JSON object".into()));
    };
    match doc.remove("posts") {
        Some(Value::Array(entries)) => Ok(entries),
        Some(_) => Err(BlogError::InvalidFormat("\"posts\" must be an array".into())),
        None => Err(BlogError::InvalidFormat("missing \"posts\" array".into())),
    }
}

/// An import entry that passed shape and field checks.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct ImportEntry {
    pub draft: PostDraft,
    pub created_at: Option<DateTime<Utc>>,
}

/// Extract a valid draft from one entry, or `None` if it must be skipped.
pub(crate) fn read_entry(entry: &Value) -> Option<ImportEntry> {
    let fields = entry.as_object()?;
    let title = non_empty_str(fields, "title")?;
    let content = non_empty_str(fields, "content")?;
    let featured_image = fields
        .get("featured_image")
        .and_then(Value::as_str)
        .map(str::to_string);
    let draft = PostDraft::new(title, content, featured_image).validate().ok()?;
    let created_at = fields
        .get("created_at")
        .and_then(Value::as_str)
        .and_then(parse_timestamp);
    Some(ImportEntry { draft, created_at })
}

fn non_empty_str<'a>(fields: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    fields
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
}

/// Accept RFC 3339, or a naive ISO-8601 timestamp taken as UTC.
/// Years outside `0..=9999` have no four-digit form and are rejected.
pub(crate) fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let parsed = match DateTime::parse_from_rfc3339(raw) {
        Ok(ts) => Some(ts.with_timezone(&Utc)),
        Err(_) => NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
            .ok()
            .map(|naive| naive.and_utc()),
    };
    parsed.filter(|ts| (0..=9999).contains(&ts.year()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn rejects_malformed_documents() {
        for bad in [
            "not json",
            "[1, 2]",
            r#"{"items": []}"#,
            r#"{"posts": {"title": "x"}}"#,
        ] {
            let err = parse_entries(bad.as_bytes()).unwrap_err();
            assert!(matches!(err, BlogError::InvalidFormat(_)), "{err}");
        }
    }

    #[test]
    fn accepts_empty_posts_array() {
        assert!(parse_entries(br#"{"posts": []}"#).unwrap().is_empty());
    }

    #[test]
    fn entries_need_title_and_content() {
        assert!(read_entry(&json!("a string")).is_none());
        assert!(read_entry(&json!({"title": "T"})).is_none());
        assert!(read_entry(&json!({"title": "  ", "content": "c"})).is_none());
        assert!(read_entry(&json!({"title": 5, "content": "c"})).is_none());

        let entry = read_entry(&json!({
            "title": "T",
            "content": "<p>c</p>",
            "featured_image": null,
        }))
        .unwrap();
        assert_eq!(entry.draft.title, "T");
        assert_eq!(entry.draft.featured_image, None);
        assert_eq!(entry.created_at, None);
    }

    #[test]
    fn timestamps_rfc3339_and_naive() {
        let expected = Utc.with_ymd_and_hms(2024, 3, 1, 10, 30, 0).unwrap();
        assert_eq!(parse_timestamp("2024-03-01T10:30:00Z"), Some(expected));
        assert_eq!(parse_timestamp("2024-03-01T12:30:00+02:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-03-01T10:30:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-03-01T10:30:00.000000"), Some(expected));
        assert_eq!(parse_timestamp("yesterday"), None);
    }

    #[test]
    fn timestamps_outside_four_digit_years_are_dropped() {
        assert_eq!(parse_timestamp("+10000-01-01T00:00:00"), None);
        assert_eq!(parse_timestamp("-0001-01-01T00:00:00"), None);
        assert_eq!(parse_timestamp("0000-01-01T00:00:00+01:00"), None);
        assert!(parse_timestamp("9999-12-31T23:59:59").is_some());
        assert!(parse_timestamp("0000-01-01T00:00:00").is_some());

        let entry = read_entry(&json!({
            "title": "Far",
            "content": "c",
            "created_at": "+10000-01-01T00:00:00"
        }))
        .unwrap();
        assert_eq!(entry.created_at, None);
    }

    #[test]
    fn export_document_shape() {
        let post = Post {
            id: blogcms_types::PostId::new(7),
            title: "Hello".into(),
            content: "Body".into(),
            featured_image: None,
            created_at: Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap(),
        };
        let doc = ExportDocument::new(&[post], Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap());
        let value = serde_json::to_value(&doc).unwrap();
        assert_eq!(value["total_posts"], 1);
        assert_eq!(value["posts"][0]["title"], "Hello");
        assert_eq!(value["posts"][0]["created_at"], "2024-01-02T03:04:05Z");
        assert!(value["posts"][0].get("id").is_none());
    }
}
