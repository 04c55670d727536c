//! Error types for the sanitizer.

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SanitizeError {
    /// The policy configuration is malformed (not map-shaped, or a key
    /// carries a value of the wrong kind).
    #[error("invalid sanitizer configuration: {0}")]
    Config(String),

    /// The input tree nests deeper than the configured guard allows.
    /// Raised before any mutation is performed.
    #[error("tree depth {depth} exceeds the configured limit of {limit}")]
    ResourceLimit { depth: usize, limit: usize },

    /// An error surfaced unchanged from the external HTML parser. Never
    /// produced by this crate itself.
    #[error("parse error: {0}")]
    Parse(String),
}

/// Result type for sanitizer operations.
pub type SanitizeResult<T> = Result<T, SanitizeError>;
