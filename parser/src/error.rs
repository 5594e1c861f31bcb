//! Parser errors.

use thiserror::Error;

/// Errors raised while parsing an OCCI rendering.
#[derive(Debug, Error)]
pub enum ParserError {
    /// A line with a recognised prefix does not match its grammar.
    #[error("parsing error on line {line:?}: {reason}")]
    Parsing {
        /// The offending line, verbatim.
        line: String,
        /// What is wrong with it.
        reason: String,
    },

    /// A parsed instance is not of the requested kind.
    #[error("type mismatch: expected an instance of {expected}, found {found}")]
    TypeMismatch {
        /// Requested kind or one of its ancestors.
        expected: String,
        /// Kind actually found.
        found: String,
    },

    /// The media type is unknown or cannot carry the requested object.
    #[error("unsupported media type: {0}")]
    UnsupportedMediaType(String),

    /// A JSON body is malformed or has the wrong shape.
    #[error("malformed JSON document: {0}")]
    Json(#[from] serde_json::Error),

    /// Lookup, collision, and definition errors from the model.
    #[error(transparent)]
    Model(#[from] occi_core::Error),
}

impl ParserError {
    pub(crate) fn parsing(line: &str, reason: impl Into<String>) -> Self {
        ParserError::Parsing {
            line: line.to_owned(),
            reason: reason.into(),
        }
    }
}

/// Result alias for parser operations.
pub type Result<T> = std::result::Result<T, ParserError>;
