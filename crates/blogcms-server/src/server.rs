use tokio::net::TcpListener;

use blogcms_sdk::Blog;

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::router::{build_router, AppState};

/// Blog CMS HTTP server.
pub struct BlogServer {
    config: ServerConfig,
    blog: Blog,
}

impl BlogServer {
    /// Validates `config`, filling in development defaults.
    pub fn new(mut config: ServerConfig, blog: Blog) -> ServerResult<Self> {
        config.validate()?;
        Ok(Self { config, blog })
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Build the router (useful for testing).
    pub fn router(&self) -> axum::Router {
        build_router(AppState::new(self.blog.clone(), &self.config), &self.config)
    }

    /// Create the settings record, then start serving requests.
    pub async fn serve(self) -> ServerResult<()> {
        self.blog.initialize().await?;
        let app = self.router();
        let listener = TcpListener::bind(&self.config.bind_addr).await?;
        tracing::info!(
            environment = %self.config.environment,
            "Blog CMS listening on http://{}",
            self.config.bind_addr
        );
        axum::serve(listener, app)
            .await
            .map_err(|e| ServerError::Internal(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Environment;
    use blogcms_sdk::InMemoryBlogStore;

    #[test]
    fn server_construction() {
        let server =
            BlogServer::new(ServerConfig::default(), Blog::with_store(InMemoryBlogStore::new()))
                .unwrap();
        assert_eq!(server.config().bind_addr, "127.0.0.1:5000".parse().unwrap());
        assert!(server.config().session_secret.is_some());
    }

    #[test]
    fn production_config_is_checked() {
        let config = ServerConfig {
            environment: Environment::Production,
            ..Default::default()
        };
        let result = BlogServer::new(config, Blog::with_store(InMemoryBlogStore::new()));
        assert!(matches!(result, Err(ServerError::Config(_))));
    }

    #[test]
    fn router_builds() {
        let server =
            BlogServer::new(ServerConfig::default(), Blog::with_store(InMemoryBlogStore::new()))
                .unwrap();
        let _router = server.router();
    }
}
