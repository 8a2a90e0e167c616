use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::{middleware, Router};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use blogcms_sdk::Blog;

use crate::auth::{self, AdminAuth, SessionSigner};
use crate::config::ServerConfig;
use crate::handler;

/// Shared state handed to every handler.
#[derive(Clone, Debug)]
pub struct AppState {
    pub blog: Blog,
    pub auth: Arc<AdminAuth>,
    pub sessions: SessionSigner,
}

impl AppState {
    /// Expects a config that has already passed [`ServerConfig::validate`].
    pub fn new(blog: Blog, config: &ServerConfig) -> Self {
        Self {
            blog,
            auth: Arc::new(AdminAuth::from_config(&config.admin)),
            sessions: SessionSigner::new(
                config.secret_bytes(),
                config.environment.is_production(),
            ),
        }
    }
}

/// Build the axum router with all Blog CMS endpoints.
pub fn build_router(state: AppState, config: &ServerConfig) -> Router {
    let admin = Router::new()
        .route("/admin/dashboard", get(handler::dashboard))
        .route(
            "/admin/new",
            get(handler::new_post_form).post(handler::create_post),
        )
        .route(
            "/admin/edit/:id",
            get(handler::edit_post_form).post(handler::update_post),
        )
        .route("/admin/delete/:id", post(handler::delete_post))
        .route(
            "/admin/settings",
            get(handler::settings_form).post(handler::update_settings),
        )
        .route("/admin/export", get(handler::export_posts))
        .route(
            "/admin/import",
            get(handler::import_form).post(handler::import_posts),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_auth,
        ));

    Router::new()
        .route("/", get(handler::index))
        .route("/post/:id", get(handler::show_post))
        .route(
            "/admin/login",
            get(handler::login_form).post(handler::login),
        )
        .route("/admin/logout", get(handler::logout))
        .route("/certificate", get(handler::certificate_form))
        .route("/generate_certificate", post(handler::generate_certificate))
        .route(
            "/certificate/:post_id/:student_name",
            get(handler::download_certificate),
        )
        .route("/dynamic-styles.css", get(handler::dynamic_styles))
        .route("/manifest.json", get(handler::manifest))
        .route("/service-worker.js", get(handler::service_worker))
        .merge(admin)
        .nest_service("/static", ServeDir::new(&config.static_dir))
        .fallback(handler::not_found)
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
