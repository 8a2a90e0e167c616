use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use maud::html;
use thiserror::Error;

use blogcms_sdk::BlogError;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Blog(#[from] BlogError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<blogcms_store::StoreError> for ServerError {
    fn from(err: blogcms_store::StoreError) -> Self {
        Self::Blog(BlogError::Store(err))
    }
}

pub type ServerResult<T> = Result<T, ServerError>;

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Blog(BlogError::NotFound { .. }) => StatusCode::NOT_FOUND,
            Self::Blog(BlogError::Validation(_) | BlogError::InvalidFormat(_)) => {
                StatusCode::BAD_REQUEST
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Fallback rendering for errors a handler did not turn into a page or a
/// redirect itself. Internal details are logged, never sent.
impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
            "Internal server error".to_string()
        } else {
            self.to_string()
        };
        (status, Html(html! { p { (message) } }.into_string())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blogcms_sdk::PostId;

    #[test]
    fn status_mapping() {
        let not_found = ServerError::Blog(BlogError::NotFound { id: PostId::new(1) });
        assert_eq!(not_found.status(), StatusCode::NOT_FOUND);
        let invalid = ServerError::Blog(BlogError::InvalidFormat("x".into()));
        assert_eq!(invalid.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ServerError::Internal("boom".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    async fn body_text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn internal_details_are_hidden() {
        let response = ServerError::Internal("secret detail".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_text(response).await;
        assert!(!body.contains("secret detail"));
    }

    #[tokio::test]
    async fn client_error_messages_are_escaped() {
        let err = ServerError::Blog(BlogError::Validation("<script>alert(1)</script>".into()));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_text(response).await;
        assert!(body.contains("&lt;script&gt;"));
        assert!(!body.contains("<script>"));
    }
}
