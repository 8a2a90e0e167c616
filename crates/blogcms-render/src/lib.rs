//! Presentation layer for Blog CMS.
//!
//! Everything here is a pure function of the data passed in: no store
//! access, no request state. The server loads settings and posts, then
//! asks this crate for markup.
//!
//! - [`pages`]: the HTML pages, all sharing one themed layout
//! - [`render_stylesheet`]: the `/dynamic-styles.css` theme
//! - [`render_certificate`]: a standalone completion certificate
//! - [`web_manifest`] / [`SERVICE_WORKER`]: PWA assets

pub mod certificate;
pub mod manifest;
pub mod pages;
pub mod stylesheet;

pub use certificate::{certificate_date, render_certificate};
pub use manifest::{
    web_manifest, MANIFEST_CONTENT_TYPE, SERVICE_WORKER, SERVICE_WORKER_CONTENT_TYPE,
};
pub use pages::{Notice, NoticeKind, PageContext};
pub use stylesheet::render_stylesheet;

/// Content type of [`render_stylesheet`] output.
pub const STYLESHEET_CONTENT_TYPE: &str = "text/css; charset=utf-8";
