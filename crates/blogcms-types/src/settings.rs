use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::color::HexColor;
use crate::error::TypeError;

/// Maximum blog title length in characters.
pub const MAX_BLOG_TITLE_LEN: usize = 100;

pub const DEFAULT_BLOG_TITLE: &str = "Blog CMS";
pub const DEFAULT_BLOG_DESCRIPTION: &str = "Welcome to Our Blog";

/// The theme colors a site can customize.
///
/// This is the union of every color the layout, stylesheet and certificate
/// read; each has a fixed default.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeColors {
    pub primary_color: HexColor,
    pub secondary_color: HexColor,
    pub background_color: HexColor,
    pub overall_background: HexColor,
    pub card_background: HexColor,
    pub text_color: HexColor,
    pub navbar_color: HexColor,
}

impl Default for ThemeColors {
    fn default() -> Self {
        let color = HexColor::known;
        Self {
            primary_color: color("#667eea"),
            secondary_color: color("#764ba2"),
            background_color: color("#667eea"),
            overall_background: color("#f5f7fa"),
            card_background: color("#ffffff"),
            text_color: color("#333333"),
            navbar_color: color("#000000"),
        }
    }
}

/// Site-wide blog metadata and theme. Exactly one exists per store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteSettings {
    pub blog_title: String,
    pub blog_description: String,
    #[serde(flatten)]
    pub colors: ThemeColors,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SiteSettings {
    /// The record created when a store has no settings yet.
    pub fn defaults(now: DateTime<Utc>) -> Self {
        Self {
            blog_title: DEFAULT_BLOG_TITLE.to_string(),
            blog_description: DEFAULT_BLOG_DESCRIPTION.to_string(),
            colors: ThemeColors::default(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply every supplied field of `update` and stamp `updated_at`.
    pub fn apply(&mut self, update: &SettingsUpdate, now: DateTime<Utc>) {
        if let Some(title) = &update.blog_title {
            self.blog_title = title.clone();
        }
        if let Some(description) = &update.blog_description {
            self.blog_description = description.clone();
        }
        let colors = &mut self.colors;
        let pairs = [
            (&mut colors.primary_color, &update.primary_color),
            (&mut colors.secondary_color, &update.secondary_color),
            (&mut colors.background_color, &update.background_color),
            (&mut colors.overall_background, &update.overall_background),
            (&mut colors.card_background, &update.card_background),
            (&mut colors.text_color, &update.text_color),
            (&mut colors.navbar_color, &update.navbar_color),
        ];
        for (slot, value) in pairs {
            if let Some(value) = value {
                *slot = value.clone();
            }
        }
        self.updated_at = now;
    }
}

/// A partial settings change. `None` leaves a field as it is.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsUpdate {
    pub blog_title: Option<String>,
    pub blog_description: Option<String>,
    pub primary_color: Option<HexColor>,
    pub secondary_color: Option<HexColor>,
    pub background_color: Option<HexColor>,
    pub overall_background: Option<HexColor>,
    pub card_background: Option<HexColor>,
    pub text_color: Option<HexColor>,
    pub navbar_color: Option<HexColor>,
}

impl SettingsUpdate {
    /// Returns `true` if no field is set.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Check the text fields. Colors are already valid by construction.
    pub fn validate(&self) -> Result<(), TypeError> {
        if let Some(title) = &self.blog_title {
            if title.trim().is_empty() {
                return Err(TypeError::validation("blog_title", "is required"));
            }
            if title.chars().count() > MAX_BLOG_TITLE_LEN {
                return Err(TypeError::validation(
                    "blog_title",
                    format!("must be at most {MAX_BLOG_TITLE_LEN} characters"),
                ));
            }
        }
        Ok(())
    }
}
