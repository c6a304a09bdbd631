use std::time::Duration;

use crate::dsl::error::{LexError, SyntaxError};
use crate::schema::validate::ValidationError;

/// Result alias used across the crate.
pub type ReelResult<T> = Result<T, ReelError>;

/// Top-level error returned by every public entry point.
///
/// Each pipeline stage has its own error type; this enum only wraps them so callers can match
/// on the stage that rejected the input.
#[derive(thiserror::Error, Debug)]
pub enum ReelError {
    /// Malformed token in the source text.
    #[error(transparent)]
    Lex(#[from] LexError),

    /// Grammar violation.
    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    /// Semantic or resource-bound violation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Failure while driving the timeline and rasterizer.
    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    /// I/O and encoder-side failures.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ReelError {
    /// Return the `(line, column)` of the offending token for front-end errors.
    pub fn position(&self) -> Option<(u32, u32)> {
        match self {
            Self::Lex(e) => Some((e.span.line, e.span.column)),
            Self::Syntax(e) => Some((e.span.line, e.span.column)),
            Self::Validation(e) => e.position(),
            Self::Pipeline(_) | Self::Other(_) => None,
        }
    }
}

/// Errors raised by the pipeline driver after the scene was accepted.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    /// The wall-clock budget ran out. No frames are returned.
    #[error(
        "pipeline timeout: exceeded budget of {budget:?} after {elapsed:?} ({frames_done} frames done)"
    )]
    Timeout {
        /// Configured budget.
        budget: Duration,
        /// Elapsed time when the overrun was observed.
        elapsed: Duration,
        /// Frames completed before the run was abandoned.
        frames_done: u64,
    },

    /// Threading or raster options cannot be honored.
    #[error("invalid pipeline options: {0}")]
    Config(String),

    /// A rasterization precondition did not hold. Validation should make this unreachable.
    #[error("internal error: {0}")]
    Internal(String),
}

impl PipelineError {
    pub(crate) fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub(crate) fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
