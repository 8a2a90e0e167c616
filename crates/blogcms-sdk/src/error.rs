use thiserror::Error;

use blogcms_store::StoreError;
use blogcms_types::{PostId, TypeError};

#[derive(Debug, Error)]
pub enum BlogError {
    #[error("post not found: {id}")]
    NotFound { id: PostId },

    #[error("{0}")]
    Validation(String),

    #[error("invalid import file: {0}")]
    InvalidFormat(String),

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl From<TypeError> for BlogError {
    fn from(err: TypeError) -> Self {
        Self::Validation(err.to_string())
    }
}

pub type BlogResult<T> = Result<T, BlogError>;
