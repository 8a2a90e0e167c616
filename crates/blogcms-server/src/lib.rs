//! HTTP server for Blog CMS.
//!
//! Serves the public blog, the session-guarded admin area, completion
//! certificates and the generated theme assets over axum.

pub mod auth;
pub mod config;
pub mod error;
pub mod flash;
pub mod handler;
pub mod router;
pub mod server;

pub use auth::{hash_password, AdminAuth, SessionSigner};
pub use config::{AdminCredentials, Environment, ServerConfig};
pub use error::{ServerError, ServerResult};
pub use router::{build_router, AppState};
pub use server::BlogServer;
