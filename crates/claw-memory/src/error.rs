use thiserror::Error;

/// Errors raised by the memory library.
#[derive(Debug, Error)]
pub enum MemoryError {
    #[error("unknown signal '{0}' (expected negative, positive or interested)")]
    UnknownSignal(String),

    #[error("analyzer failed: {0}")]
    AnalyzerFailed(String),

    #[error("{what} required")]
    MissingArgument { what: &'static str },
}
