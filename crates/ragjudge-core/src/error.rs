use std::path::PathBuf;

use thiserror::Error;

use crate::request::Field;

/// Failure modes of the harness.
///
/// Nothing is retried or swallowed inside the library; callers decide
/// what a `Transient` failure is worth to them.
#[derive(Debug, Error)]
pub enum EvalError {
    /// Bad factory or builder input: an unusable prompt template, an
    /// unknown model identifier, a missing API key.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The request bundle lacks a field the bound prompt requires.
    #[error("evaluator `{key}` requires field `{field}`")]
    MissingField { key: String, field: Field },

    /// The request bundle carries a field the bound prompt does not use.
    #[error("evaluator `{key}` does not accept field `{field}`")]
    UnexpectedField { key: String, field: Field },

    /// A file the harness was pointed at does not exist.
    #[error("file not found: {}", .path.display())]
    NotFound { path: PathBuf },

    /// A file exists but could not be parsed.
    #[error("failed to parse {}: {}", .path.display(), .message)]
    Parse { path: PathBuf, message: String },

    /// Any other I/O failure while reading a file.
    #[error("failed to read {}: {}", .path.display(), .source)]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Network-level judge failure: transport error, timeout, HTTP 429
    /// or 5xx. Retrying is the caller's concern.
    #[error("transient judge failure: {0}")]
    Transient(String),

    /// The judge endpoint rejected the request, or replied with
    /// something that cannot be read as a score.
    #[error("judge failure: {0}")]
    Judge(String),
}
