//! Foundation types for Blog CMS.
//!
//! Every other crate in the workspace depends on `blogcms-types`.
//!
//! # Key Types
//!
//! - [`Post`] / [`PostId`]: a stored blog entry and its identifier
//! - [`PostDraft`]: caller-supplied title, content and image, with validation
//! - [`SiteSettings`]: the singleton blog metadata and theme record
//! - [`SettingsUpdate`]: a partial settings change
//! - [`HexColor`] / [`Rgb`]: validated theme colors

pub mod color;
pub mod error;
pub mod post;
pub mod settings;

pub use color::{hex_to_rgb, HexColor, Rgb};
pub use error::TypeError;
pub use post::{NewPost, Post, PostDraft, PostId, MAX_IMAGE_LEN, MAX_TITLE_LEN};
pub use settings::{
    SettingsUpdate, SiteSettings, ThemeColors, DEFAULT_BLOG_DESCRIPTION, DEFAULT_BLOG_TITLE,
    MAX_BLOG_TITLE_LEN,
};
