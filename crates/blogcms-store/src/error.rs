use blogcms_types::TypeError;

/// Errors from store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Failure reported by the database driver.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A stored row could not be decoded into a domain value.
    #[error("corrupt {table} row: {reason}")]
    Corrupt { table: &'static str, reason: String },

    /// A timestamp whose year has no four-digit form.
    #[error("timestamp out of storable range: {0}")]
    TimestampOutOfRange(chrono::DateTime<chrono::Utc>),

    /// A stored value failed domain validation.
    #[error("invalid stored value: {0}")]
    Type(#[from] TypeError),

    /// An in-memory lock was poisoned by a panicking writer.
    #[error("store lock poisoned")]
    LockPoisoned,
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
