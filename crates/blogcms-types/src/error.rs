use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid color {value:?}: expected six hex digits like #667eea")]
    InvalidColor { value: String },

    #[error("invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },
}

impl TypeError {
    pub(crate) fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field,
            reason: reason.into(),
        }
    }
}
