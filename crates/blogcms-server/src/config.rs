use std::fmt;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::error::{ServerError, ServerResult};

pub const DEFAULT_ADMIN_USERNAME: &str = "admin";
pub const DEFAULT_ADMIN_PASSWORD: &str = "admin123";

/// Deployment mode. Production enables secure cookies and strict config.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    pub fn is_production(self) -> bool {
        self == Self::Production
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Development => "development",
            Self::Production => "production",
        })
    }
}

impl FromStr for Environment {
    type Err = ServerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            other => Err(ServerError::Config(format!("unknown environment {other:?}"))),
        }
    }
}

/// The single admin identity.
///
/// When `password_hash` is set it is used instead of `password`.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AdminCredentials {
    /// `None` until configured; falls back to [`DEFAULT_ADMIN_USERNAME`].
    pub username: Option<String>,
    pub password: String,
    /// Argon2 PHC string.
    pub password_hash: Option<String>,
}

impl AdminCredentials {
    pub fn username(&self) -> &str {
        self.username.as_deref().unwrap_or(DEFAULT_ADMIN_USERNAME)
    }
}

impl Default for AdminCredentials {
    fn default() -> Self {
        Self {
            username: None,
            password: DEFAULT_ADMIN_PASSWORD.to_string(),
            password_hash: None,
        }
    }
}

impl fmt::Debug for AdminCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminCredentials")
            .field("username", &self.username())
            .field("password_hash", &self.password_hash.is_some())
            .finish_non_exhaustive()
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub database_url: String,
    pub session_secret: Option<String>,
    pub admin: AdminCredentials,
    pub max_upload_bytes: usize,
    pub static_dir: PathBuf,
    pub environment: Environment,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 5000)),
            database_url: "sqlite://blog.db".into(),
            session_secret: None,
            admin: AdminCredentials::default(),
            max_upload_bytes: 5 * 1024 * 1024,
            static_dir: PathBuf::from("static"),
            environment: Environment::Development,
        }
    }
}

impl ServerConfig {
    /// Defaults, overlaid by the TOML file at `path` (if any), overlaid by
    /// the process environment.
    pub fn load(path: Option<&Path>) -> ServerResult<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> ServerResult<Self> {
        let text = std::fs::read_to_string(path)?;
        toml::from_str(&text)
            .map_err(|e| ServerError::Config(format!("{}: {e}", path.display())))
    }

    /// Overlay values from environment-style variables.
    ///
    /// `lookup` is `std::env::var` in production and a map in tests.
    pub fn apply_env<F>(&mut self, lookup: F) -> ServerResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.is_empty());

        if let Some(bind) = var("BLOGCMS_BIND") {
            self.bind_addr = bind
                .parse()
                .map_err(|e| ServerError::Config(format!("BLOGCMS_BIND={bind:?}: {e}")))?;
        }
        if let Some(url) = var("DATABASE_URL") {
            self.database_url = url;
        }
        if let Some(secret) = var("SESSION_SECRET") {
            self.session_secret = Some(secret);
        }
        if let Some(username) = var("ADMIN_USERNAME") {
            self.admin.username = Some(username);
        }
        if let Some(password) = var("ADMIN_PASSWORD") {
            self.admin.password = password;
        }
        if let Some(hash) = var("ADMIN_PASSWORD_HASH") {
            self.admin.password_hash = Some(hash);
        }
        if let Some(env) = var("BLOGCMS_ENV") {
            self.environment = env.parse()?;
        }
        Ok(())
    }

    /// Check the configuration for the selected environment.
    ///
    /// Production refuses to start without a session secret, a hashed admin
    /// password and an explicit admin username. Development fills in a
    /// random session secret instead.
    pub fn validate(&mut self) -> ServerResult<()> {
        if self.environment.is_production() {
            let missing: Vec<&str> = [
                ("SESSION_SECRET", self.session_secret.is_none()),
                ("ADMIN_PASSWORD_HASH", self.admin.password_hash.is_none()),
                ("ADMIN_USERNAME", self.admin.username.is_none()),
            ]
            .into_iter()
            .filter_map(|(name, absent)| absent.then_some(name))
            .collect();
            if !missing.is_empty() {
                return Err(ServerError::Config(format!(
                    "production requires {}",
                    missing.join(", ")
                )));
            }
            return Ok(());
        }

        if self.session_secret.is_none() {
            tracing::warn!("SESSION_SECRET not set; sessions will not survive a restart");
            let mut key = [0u8; 32];
            rand::thread_rng().fill_bytes(&mut key);
            self.session_secret = Some(hex::encode(key));
        }
        if self.admin.password_hash.is_none() && self.admin.password == DEFAULT_ADMIN_PASSWORD {
            tracing::warn!("using the default admin password");
        }
        Ok(())
    }

    /// The session secret. Empty until [`validate`](Self::validate) has run.
    pub fn secret_bytes(&self) -> &[u8] {
        self.session_secret.as_deref().unwrap_or_default().as_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn default_config() {
        let c = ServerConfig::default();
        assert_eq!(c.bind_addr, "127.0.0.1:5000".parse::<SocketAddr>().unwrap());
        assert_eq!(c.database_url, "sqlite://blog.db");
        assert_eq!(c.admin.username(), "admin");
        assert_eq!(c.admin.password, "admin123");
        assert_eq!(c.max_upload_bytes, 5 * 1024 * 1024);
        assert_eq!(c.environment, Environment::Development);
    }

    #[test]
    fn env_overrides_defaults() {
        let mut c = ServerConfig::default();
        c.apply_env(env(&[
            ("BLOGCMS_BIND", "0.0.0.0:8080"),
            ("DATABASE_URL", "sqlite::memory:"),
            ("ADMIN_USERNAME", "editor"),
            ("BLOGCMS_ENV", "production"),
        ]))
        .unwrap();
        assert_eq!(c.bind_addr.port(), 8080);
        assert_eq!(c.database_url, "sqlite::memory:");
        assert_eq!(c.admin.username(), "editor");
        assert!(c.environment.is_production());
    }

    #[test]
    fn bad_bind_address_is_config_error() {
        let mut c = ServerConfig::default();
        let err = c.apply_env(env(&[("BLOGCMS_BIND", "nope")])).unwrap_err();
        assert!(matches!(err, ServerError::Config(_)));
    }

    #[test]
    fn production_requires_secrets() {
        let mut c = ServerConfig {
            environment: Environment::Production,
            ..Default::default()
        };
        let err = c.validate().unwrap_err().to_string();
        assert!(err.contains("SESSION_SECRET"));
        assert!(err.contains("ADMIN_PASSWORD_HASH"));
        assert!(err.contains("ADMIN_USERNAME"));

        c.apply_env(env(&[
            ("SESSION_SECRET", "s3cret"),
            ("ADMIN_PASSWORD_HASH", "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA"),
            ("ADMIN_USERNAME", "owner"),
        ]))
        .unwrap();
        c.validate().unwrap();
        assert_eq!(c.secret_bytes(), b"s3cret");
    }

    #[test]
    fn development_generates_secret() {
        let mut c = ServerConfig::default();
        assert!(c.secret_bytes().is_empty());
        c.validate().unwrap();
        assert_eq!(c.secret_bytes().len(), 64);
    }

    #[test]
    fn toml_file_layer() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
bind_addr = "127.0.0.1:9000"
static_dir = "/srv/blog/static"

[admin]
username = "writer"
"#
        )
        .unwrap();
        let c = ServerConfig::from_file(file.path()).unwrap();
        assert_eq!(c.bind_addr.port(), 9000);
        assert_eq!(c.static_dir, PathBuf::from("/srv/blog/static"));
        assert_eq!(c.admin.username(), "writer");
        assert_eq!(c.admin.password, "admin123");
        assert_eq!(c.database_url, "sqlite://blog.db");
    }
}
