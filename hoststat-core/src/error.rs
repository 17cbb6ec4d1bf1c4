use thiserror::Error;

/// Common result type for collection steps.
pub type Result<T> = std::result::Result<T, CollectError>;

#[derive(Debug, Error)]
pub enum CollectError {
    #[error("GPU query tool not found: {0}")]
    ToolNotFound(String),
    #[error("GPU query tool {program} failed with {status}: {detail}")]
    ToolFailed {
        program: String,
        status: String,
        detail: String,
    },
    #[error("GPU query tool {program} timed out after {timeout_ms}ms")]
    ToolTimedOut { program: String, timeout_ms: u64 },
    #[error("no GPUs reported by the query tool")]
    NoGpus,
    #[error("malformed GPU line {line:?}: {reason}")]
    MalformedLine { line: String, reason: String },
    #[error("no CPU counters available")]
    NoCpus,
    #[error("memory counters unavailable")]
    MemoryUnavailable,
    #[error("collection task aborted: {0}")]
    Aborted(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
