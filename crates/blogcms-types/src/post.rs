use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Maximum title length in characters.
pub const MAX_TITLE_LEN: usize = 200;
/// Maximum featured-image reference length in characters.
pub const MAX_IMAGE_LEN: usize = 500;

/// Store-assigned post identifier.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostId(i64);

impl PostId {
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Debug for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PostId({})", self.0)
    }
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for PostId {
    fn from(raw: i64) -> Self {
        Self(raw)
    }
}

/// A published blog entry.
///
/// `id` and `created_at` are fixed at insertion; only the fields carried
/// by a [`PostDraft`] ever change afterwards.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    pub title: String,
    /// Author-supplied markup, rendered verbatim.
    pub content: String,
    pub featured_image: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Post {
    /// The editable part of this post.
    pub fn draft(&self) -> PostDraft {
        PostDraft {
            title: self.title.clone(),
            content: self.content.clone(),
            featured_image: self.featured_image.clone(),
        }
    }
}

/// Caller-supplied fields for creating or editing a post.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostDraft {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub featured_image: Option<String>,
}

impl PostDraft {
    pub fn new(
        title: impl Into<String>,
        content: impl Into<String>,
        featured_image: Option<String>,
    ) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            featured_image,
        }
    }

    /// Check required fields and length limits, then normalize the draft.
    ///
    /// A blank image reference becomes `None`. Title and content are kept
    /// exactly as given once they pass.
    pub fn validate(self) -> Result<Self, TypeError> {
        if self.title.trim().is_empty() {
            return Err(TypeError::validation("title", "is required"));
        }
        if self.title.chars().count() > MAX_TITLE_LEN {
            return Err(TypeError::validation(
                "title",
                format!("must be at most {MAX_TITLE_LEN} characters"),
            ));
        }
        if self.content.trim().is_empty() {
            return Err(TypeError::validation("content", "is required"));
        }
        let featured_image = match self.featured_image {
            Some(image) if image.trim().is_empty() => None,
            Some(image) if image.trim().chars().count() > MAX_IMAGE_LEN => {
                return Err(TypeError::validation(
                    "featured_image",
                    format!("must be at most {MAX_IMAGE_LEN} characters"),
                ));
            }
            Some(image) => Some(image.trim().to_string()),
            None => None,
        };
        Ok(Self {
            featured_image,
            ..self
        })
    }
}

/// A validated draft plus the timestamp it should be stored with.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewPost {
    pub draft: PostDraft,
    pub created_at: DateTime<Utc>,
}

impl NewPost {
    pub fn new(draft: PostDraft, created_at: DateTime<Utc>) -> Self {
        Self { draft, created_at }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_accepts_complete_draft() {
        let draft = PostDraft::new("Hello", "<p>World</p>", Some(" /img/a.png ".into()))
            .validate()
            .unwrap();
        assert_eq!(draft.title, "Hello");
        assert_eq!(draft.featured_image.as_deref(), Some("/img/a.png"));
    }

    #[test]
    fn validate_rejects_missing_title() {
        let err = PostDraft::new("   ", "body", None).validate().unwrap_err();
        assert!(matches!(err, TypeError::Validation { field: "title", .. }));
    }

    #[test]
    fn validate_rejects_missing_content() {
        let err = PostDraft::new("Title", "", None).validate().unwrap_err();
        assert!(matches!(err, TypeError::Validation { field: "content", .. }));
    }

    #[test]
    fn validate_enforces_length_limits() {
        let long_title = "x".repeat(MAX_TITLE_LEN + 1);
        assert!(PostDraft::new(long_title, "body", None).validate().is_err());

        let exact_title = "x".repeat(MAX_TITLE_LEN);
        assert!(PostDraft::new(exact_title, "body", None).validate().is_ok());

        let long_image = Some("i".repeat(MAX_IMAGE_LEN + 1));
        let err = PostDraft::new("t", "b", long_image).validate().unwrap_err();
        assert!(matches!(err, TypeError::Validation { field: "featured_image", .. }));
    }

    #[test]
    fn blank_image_becomes_none() {
        let draft = PostDraft::new("t", "b", Some("  ".into())).validate().unwrap();
        assert_eq!(draft.featured_image, None);
    }

    #[test]
    fn post_id_serializes_as_number() {
        assert_eq!(serde_json::to_string(&PostId::new(7)).unwrap(), "7");
        assert_eq!(PostId::from(7).to_string(), "7");
    }
}
