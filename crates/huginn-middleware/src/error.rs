//! Error types for middleware effects.

use thiserror::Error;

/// Result type alias for middleware effects.
pub type Result<T> = std::result::Result<T, MiddlewareError>;

/// Errors a middleware effect can complete with.
///
/// Instrumentation never produces these itself; it passes through whatever
/// the wrapped middleware returns.
#[derive(Debug, Error)]
pub enum MiddlewareError {
    /// The effect failed while doing its work.
    #[error("Effect error: {0}")]
    Effect(String),

    /// An action arrived before `receive_context` supplied what it needs.
    #[error("Missing context: {0} was not received before handling")]
    MissingContext(&'static str),

    /// Any other error raised by middleware code.
    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl MiddlewareError {
    /// Wrap an arbitrary error.
    pub fn other(error: impl std::error::Error + Send + Sync + 'static) -> Self {
        MiddlewareError::Other(Box::new(error))
    }
}
