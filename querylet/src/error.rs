//! Error type shared by parsing, building, resolving and evaluating templates.

use std::path::PathBuf;

use thiserror::Error;

use crate::ast::FilterKind;
use crate::parser::ParseError;

/// Anything that can abort a template compile or evaluation.
///
/// Every variant aborts the whole call: there is no partial output and no
/// recovery inside the evaluator.
#[derive(Debug, Error)]
pub enum Error {
    #[error("expected input for: {parameter} to be {}", .kind.expected())]
    FilterType { parameter: String, kind: FilterKind },

    #[error("unexpected filter name: {0}")]
    UnrecognizedFilter(String),

    #[error("unexpected partial kind: {0}")]
    UnrecognizedPartialKind(String),

    #[error("unexpected block kind: {0}")]
    UnrecognizedBlockKind(String),

    #[error("partial not found: {0}")]
    PartialNotFound(String),

    #[error("partial {path} exceeds the maximum nesting depth of {limit}")]
    RecursionLimitExceeded { path: String, limit: usize },

    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("failed to read template {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("template file {} cannot be addressed by a dot path", .0.display())]
    InvalidTemplatePath(PathBuf),

    #[error("failed to index template directory: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("invalid template data: {0}")]
    InvalidData(String),
}

/// Result type used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;
