//! Error taxonomy for the detection engine

use thiserror::Error;

use crate::scanner::span::Span;

/// Scan-engine errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScanError {
    /// A span argument reaches past the end of the buffer
    #[error("span {}..{} is out of bounds for buffer of length {len}", span.start, span.end())]
    OutOfBounds { span: Span, len: usize },

    /// A span boundary falls inside a multi-byte character
    #[error("position {position} is not on a character boundary")]
    NotCharBoundary { position: usize },

    /// A detector reported a span outside the fragment it was given.
    /// Logged and dropped during rebuild, never returned to callers.
    #[error("detector `{tag}` reported span {}..{} outside fragment of length {fragment_len}", span.start, span.end())]
    DetectorContractViolation {
        tag: String,
        span: Span,
        fragment_len: usize,
    },

    #[error("invalid detector pattern `{pattern}`: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, ScanError>;
