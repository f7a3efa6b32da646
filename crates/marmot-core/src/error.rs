//! Error types for marmot-core.
//!
//! Only the parser itself can fail. Plugins report problems through the
//! per-module warnings collection instead of returning errors, so a single
//! unparseable expression never aborts a build.

use thiserror::Error;

use crate::dialect::SourceDialect;

/// Errors that can occur while parsing a module.
#[derive(Error, Debug)]
pub enum ParseError {
    /// The source could not be parsed under the requested dialect.
    #[error("failed to parse {dialect} module: {message}")]
    Syntax {
        dialect: SourceDialect,
        message: String,
    },
}

/// Result type alias for parse operations.
pub type ParseResult<T> = Result<T, ParseError>;
