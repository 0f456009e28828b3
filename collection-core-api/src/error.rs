use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Malformed record identifier: {0}")]
    MalformedIdentifier(String),

    #[error("Invalid duplicate policy: {0}")]
    InvalidPolicy(String),

    #[error("Actor identity is required for this operation")]
    MissingActor,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bulk confirmation timed out; nothing was committed")]
    BulkTimeout,

    #[error("Storage error: {0}")]
    Storage(String),
}

impl EngineError {
    /// Wrap a storage-layer failure. The full detail goes to the log; the
    /// surfaced error carries only the operation context.
    pub fn storage(context: &str, source: impl std::fmt::Display) -> Self {
        tracing::error!(%source, "storage failure during {context}");
        EngineError::Storage(format!("{context} failed"))
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
