//! One-shot notices carried across a redirect in a cookie.
//!
//! The notice is serialized as JSON and base64url-encoded. It is read by
//! the next page render, which also clears the cookie.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use cookie::{Cookie, SameSite};

use axum::http::HeaderMap;
use blogcms_render::Notice;

use crate::auth::{read_cookie, removal_cookie};

pub const FLASH_COOKIE: &str = "blogcms_flash";

fn encode(notice: &Notice) -> Option<String> {
    let json = serde_json::to_vec(notice).ok()?;
    Some(URL_SAFE_NO_PAD.encode(json))
}

fn decode(raw: &str) -> Option<Notice> {
    let bytes = URL_SAFE_NO_PAD.decode(raw).ok()?;
    serde_json::from_slice(&bytes).ok()
}

/// The pending notice in the request, if any. Garbage is ignored.
pub fn take(headers: &HeaderMap) -> Option<Notice> {
    read_cookie(headers, FLASH_COOKIE).and_then(|raw| decode(&raw))
}

/// `Set-Cookie` value storing `notice`.
pub fn set_cookie(notice: &Notice, secure: bool) -> String {
    let value = encode(notice).unwrap_or_default();
    Cookie::build((FLASH_COOKIE, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .build()
        .to_string()
}

/// `Set-Cookie` value removing the notice once shown.
pub fn clear_cookie(secure: bool) -> String {
    removal_cookie(FLASH_COOKIE, secure)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header, HeaderValue};
    use blogcms_render::NoticeKind;

    fn request_with(cookie: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_str(cookie).unwrap());
        headers
    }

    #[test]
    fn notice_survives_cookie_roundtrip() {
        let notice = Notice::success("Post created successfully!");
        let set = set_cookie(&notice, false);
        let pair = set.split(';').next().unwrap();
        let taken = take(&request_with(pair)).unwrap();
        assert_eq!(taken.kind, NoticeKind::Success);
        assert_eq!(taken.message, "Post created successfully!");
    }

    #[test]
    fn garbage_is_ignored() {
        assert!(take(&request_with("blogcms_flash=%%%")).is_none());
        assert!(take(&request_with("blogcms_flash=bm90IGpzb24")).is_none());
        assert!(take(&HeaderMap::new()).is_none());
    }

    #[test]
    fn clear_cookie_expires_immediately() {
        let clear = clear_cookie(false);
        assert!(clear.starts_with("blogcms_flash="));
        assert!(clear.contains("Max-Age=0"));
    }
}
