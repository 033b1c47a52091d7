//! Error types for the DAP2 client core.
//!
//! This module provides a unified error handling approach using `thiserror`.
//! Grammar failures surface as [`ParseError`], binary layout failures as
//! [`UnpackError`]; both are fail-fast and abort the whole call.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for DAP2 operations.
pub type Result<T> = std::result::Result<T, DapError>;

/// A violation of the DDS or DAS text grammar.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The cursor did not match the expected token.
    #[error("Unable to parse stream: expected {expected} near {excerpt:?}")]
    Unexpected {
        /// Description of the token that was expected.
        expected: String,
        /// The first few characters of the unconsumed stream.
        excerpt: String,
    },

    /// An alias attribute pointed at nothing.
    #[error("Unresolved alias: {alias}")]
    UnresolvedAlias {
        /// The alias reference as written.
        alias: String,
    },

    /// A dimension size or numeric attribute literal was malformed.
    #[error("Invalid number {text:?}")]
    InvalidNumber {
        /// The offending text.
        text: String,
    },
}

impl ParseError {
    /// Create an Unexpected error.
    pub fn unexpected(expected: impl Into<String>, excerpt: impl Into<String>) -> Self {
        Self::Unexpected {
            expected: expected.into(),
            excerpt: excerpt.into(),
        }
    }

    /// Create an UnresolvedAlias error.
    pub fn unresolved_alias(alias: impl Into<String>) -> Self {
        Self::UnresolvedAlias {
            alias: alias.into(),
        }
    }

    /// Create an InvalidNumber error.
    pub fn invalid_number(text: impl Into<String>) -> Self {
        Self::InvalidNumber { text: text.into() }
    }
}

/// A violation of the XDR binary layout.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UnpackError {
    /// A read ran past the end of the buffer.
    #[error("Buffer underrun at offset {offset}: needed {needed} bytes, {available} available")]
    Underrun {
        /// Offset of the attempted read.
        offset: usize,
        /// Bytes the read required.
        needed: usize,
        /// Bytes left in the buffer.
        available: usize,
    },

    /// The schema node has a kind that has no wire representation.
    #[error("Unsupported type on the wire: {0}")]
    UnsupportedType(String),
}

/// Errors that can occur in the DAP2 client core.
#[derive(Debug, Error)]
pub enum DapError {
    /// DDS or DAS text could not be parsed.
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// XDR payload could not be decoded.
    #[error("Unpack error: {0}")]
    Unpack(#[from] UnpackError),

    /// A DODS response has no data separator.
    #[error("DODS response has no \"Data:\" separator")]
    MissingDataMarker,

    /// The source collaborator failed to deliver a document.
    #[error("Failed to fetch {location}: {message}")]
    Source {
        /// URL or path that was requested.
        location: String,
        /// Collaborator-supplied failure description.
        message: String,
    },

    /// Failed to open a file.
    #[error("Failed to open file: {path}")]
    FileOpen {
        /// Path that could not be opened.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl DapError {
    /// Create a FileOpen error.
    pub fn file_open(path: PathBuf, source: std::io::Error) -> Self {
        Self::FileOpen { path, source }
    }

    /// Create a Source error.
    pub fn fetch_failed(location: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Source {
            location: location.into(),
            message: message.into(),
        }
    }
}
