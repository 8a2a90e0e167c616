//! Admin authentication: credential checks, signed session tokens, and the
//! route guard.
//!
//! A session token has the form `{expires_unix}.{nonce_hex}.{mac_hex}`
//! where the MAC is HMAC-SHA256 over `{expires_unix}.{nonce_hex}` keyed by
//! the configured session secret. Nothing is stored server-side; a token
//! is valid while its MAC checks out and it has not expired.

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use axum::extract::{Request, State};
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use chrono::{DateTime, Duration, Utc};
use cookie::{Cookie, SameSite};
use hmac::{Hmac, Mac};
use rand::RngCore;
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::config::AdminCredentials;
use crate::error::{ServerError, ServerResult};
use crate::router::AppState;

type HmacSha256 = Hmac<Sha256>;

pub const SESSION_COOKIE: &str = "blogcms_session";
pub const SESSION_TTL_HOURS: i64 = 24;
pub const LOGIN_PATH: &str = "/admin/login";

/// Issues and checks session tokens.
#[derive(Clone)]
pub struct SessionSigner {
    key: Vec<u8>,
    secure: bool,
}

impl std::fmt::Debug for SessionSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionSigner")
            .field("secure", &self.secure)
            .finish_non_exhaustive()
    }
}

impl SessionSigner {
    /// `secure` marks issued cookies `Secure` (HTTPS only).
    pub fn new(secret: &[u8], secure: bool) -> Self {
        Self {
            key: secret.to_vec(),
            secure,
        }
    }

    /// Whether cookies are marked `Secure`.
    pub fn secure(&self) -> bool {
        self.secure
    }

    fn mac(&self) -> ServerResult<HmacSha256> {
        HmacSha256::new_from_slice(&self.key)
            .map_err(|e| ServerError::Internal(format!("session key: {e}")))
    }

    /// A fresh token expiring [`SESSION_TTL_HOURS`] after `now`.
    pub fn issue(&self, now: DateTime<Utc>) -> ServerResult<String> {
        let expires = (now + Duration::hours(SESSION_TTL_HOURS)).timestamp();
        let mut nonce = [0u8; 16];
        rand::thread_rng().fill_bytes(&mut nonce);
        let payload = format!("{expires}.{}", hex::encode(nonce));

        let mut mac = self.mac()?;
        mac.update(payload.as_bytes());
        let tag = hex::encode(mac.finalize().into_bytes());
        Ok(format!("{payload}.{tag}"))
    }

    /// Whether `token` was issued with this key and has not expired.
    pub fn verify(&self, token: &str, now: DateTime<Utc>) -> bool {
        let Some((payload, tag)) = token.rsplit_once('.') else {
            return false;
        };
        let Some((expires, _nonce)) = payload.split_once('.') else {
            return false;
        };
        let Ok(expires) = expires.parse::<i64>() else {
            return false;
        };
        let Ok(tag) = hex::decode(tag) else {
            return false;
        };
        let Ok(mut mac) = self.mac() else {
            return false;
        };
        mac.update(payload.as_bytes());
        // verify_slice compares in constant time.
        mac.verify_slice(&tag).is_ok() && now.timestamp() < expires
    }

    /// Whether the request carries a valid session cookie.
    pub fn is_authenticated(&self, headers: &HeaderMap, now: DateTime<Utc>) -> bool {
        read_cookie(headers, SESSION_COOKIE).is_some_and(|token| self.verify(&token, now))
    }

    /// `Set-Cookie` value carrying `token`.
    pub fn session_cookie(&self, token: String) -> String {
        Cookie::build((SESSION_COOKIE, token))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.secure)
            .max_age(cookie::time::Duration::hours(SESSION_TTL_HOURS))
            .build()
            .to_string()
    }

    /// `Set-Cookie` value that deletes the session cookie.
    pub fn clear_cookie(&self) -> String {
        removal_cookie(SESSION_COOKIE, self.secure)
    }
}

/// A `Set-Cookie` value that makes the browser drop `name`.
pub(crate) fn removal_cookie(name: &'static str, secure: bool) -> String {
    let mut cookie = Cookie::build((name, ""))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .build();
    cookie.make_removal();
    cookie.to_string()
}

/// The value of cookie `name`, if the request sent one.
pub(crate) fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(axum::http::header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| Cookie::split_parse(value))
        .filter_map(Result::ok)
        .find(|cookie| cookie.name() == name)
        .map(|cookie| cookie.value().to_string())
}

enum Secret {
    Plain(String),
    Hash(String),
}

/// Checks submitted credentials against the single admin identity.
pub struct AdminAuth {
    username: String,
    secret: Secret,
}

impl std::fmt::Debug for AdminAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminAuth")
            .field("username", &self.username)
            .field("hashed", &matches!(self.secret, Secret::Hash(_)))
            .finish()
    }
}

impl AdminAuth {
    pub fn from_config(admin: &AdminCredentials) -> Self {
        let secret = match &admin.password_hash {
            Some(hash) => Secret::Hash(hash.clone()),
            None => Secret::Plain(admin.password.clone()),
        };
        Self {
            username: admin.username().to_string(),
            secret,
        }
    }

    /// Both fields are always checked, so timing does not reveal which one
    /// was wrong.
    pub fn check(&self, username: &str, password: &str) -> bool {
        let user_ok: bool = username.as_bytes().ct_eq(self.username.as_bytes()).into();
        let pass_ok: bool = match &self.secret {
            Secret::Plain(expected) => password.as_bytes().ct_eq(expected.as_bytes()).into(),
            Secret::Hash(hash) => verify_password(password, hash),
        };
        user_ok & pass_ok
    }
}

fn verify_password(password: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            tracing::error!(error = %e, "ADMIN_PASSWORD_HASH is not a valid PHC string");
            false
        }
    }
}

/// Hash `password` into an Argon2id PHC string for `ADMIN_PASSWORD_HASH`.
pub fn hash_password(password: &str) -> ServerResult<String> {
    let mut salt_bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut salt_bytes);
    let salt =
        SaltString::encode_b64(&salt_bytes).map_err(|e| ServerError::Internal(e.to_string()))?;
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ServerError::Internal(e.to_string()))
}

/// Guard for admin routes: without a valid session the request is
/// redirected to the login page and the handler never runs.
pub async fn require_auth(State(state): State<AppState>, request: Request, next: Next) -> Response {
    if state.sessions.is_authenticated(request.headers(), Utc::now()) {
        next.run(request).await
    } else {
        tracing::debug!(path = %request.uri().path(), "unauthenticated admin request");
        Redirect::to(LOGIN_PATH).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn signer() -> SessionSigner {
        SessionSigner::new(b"test-secret", false)
    }

    #[test]
    fn issued_token_verifies() {
        let now = Utc::now();
        let token = signer().issue(now).unwrap();
        assert_eq!(token.split('.').count(), 3);
        assert!(signer().verify(&token, now));
    }

    #[test]
    fn token_expires_after_a_day() {
        let now = Utc::now();
        let token = signer().issue(now).unwrap();
        assert!(signer().verify(&token, now + Duration::hours(23)));
        assert!(!signer().verify(&token, now + Duration::hours(24)));
    }

    #[test]
    fn tampered_or_foreign_tokens_fail() {
        let now = Utc::now();
        let token = signer().issue(now).unwrap();
        let other = SessionSigner::new(b"another-secret", false);
        assert!(!other.verify(&token, now));

        let (payload, tag) = token.rsplit_once('.').unwrap();
        let (_, nonce) = payload.split_once('.').unwrap();
        let forged = format!("{}.{nonce}.{tag}", now.timestamp() + 999_999);
        assert!(!signer().verify(&forged, now));

        for junk in ["", "abc", "1.2", "x.y.z", "1.aa.zz"] {
            assert!(!signer().verify(junk, now), "{junk}");
        }
    }

    #[test]
    fn session_cookie_attributes() {
        let cookie = SessionSigner::new(b"k", true).session_cookie("tok".into());
        assert!(cookie.starts_with("blogcms_session=tok"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Lax"));
        assert!(cookie.contains("Secure"));
        assert!(cookie.contains("Max-Age=86400"));

        let plain = signer().session_cookie("tok".into());
        assert!(!plain.contains("Secure"));
    }

    #[test]
    fn reads_cookie_from_header() {
        let mut headers = HeaderMap::new();
        headers.insert(
            axum::http::header::COOKIE,
            HeaderValue::from_static("a=1; blogcms_session=abc.def.123; b=2"),
        );
        assert_eq!(
            read_cookie(&headers, SESSION_COOKIE).as_deref(),
            Some("abc.def.123")
        );
        assert_eq!(read_cookie(&headers, "missing"), None);
    }

    #[test]
    fn plain_credentials() {
        let auth = AdminAuth::from_config(&AdminCredentials::default());
        assert!(auth.check("admin", "admin123"));
        assert!(!auth.check("admin", "wrong"));
        assert!(!auth.check("root", "admin123"));
        assert!(!auth.check("", ""));
    }

    #[test]
    fn hashed_credentials() {
        let hash = hash_password("correct horse").unwrap();
        assert!(hash.starts_with("$argon2"));
        let auth = AdminAuth::from_config(&AdminCredentials {
            username: Some("owner".into()),
            password: "ignored".into(),
            password_hash: Some(hash),
        });
        assert!(auth.check("owner", "correct horse"));
        assert!(!auth.check("owner", "ignored"));
    }

    #[test]
    fn malformed_hash_never_matches() {
        let auth = AdminAuth::from_config(&AdminCredentials {
            username: None,
            password: String::new(),
            password_hash: Some("not-a-hash".into()),
        });
        assert!(!auth.check("admin", ""));
    }
}
