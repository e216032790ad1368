//! Typed errors for the normalization and indexing pipeline.
//!
//! Per-row and per-document failures ([`NormalizeError`], [`ClassifyError`])
//! are recovered by the caller: the offending row or document is skipped
//! with a warning and the batch continues. [`BackendError`] is fatal and
//! aborts the remaining upload.

use thiserror::Error;

/// Failure turning one tabular row into a normalized document.
#[derive(Debug, Error, PartialEq)]
pub enum NormalizeError {
    /// A required column is absent from the row.
    #[error("missing required field '{0}'")]
    MissingField(String),

    /// The ordinal pushes the synthesized date past the calendar range.
    #[error("row ordinal {0} is out of the representable date range")]
    DateOutOfRange(u32),
}

/// Failure classifying the benchmarks of one document.
#[derive(Debug, Error, PartialEq)]
pub enum ClassifyError {
    /// A benchmark value that must be numeric could not be coerced.
    #[error("document {document}: cannot parse {field}='{value}' of '{kind}' as a number")]
    Parse {
        document: String,
        kind: String,
        field: &'static str,
        value: String,
    },
}

/// Fatal failure talking to the search backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The backend could not be reached or the request could not be built.
    #[error("connection to {url} failed: {message}")]
    Connection { url: String, message: String },

    /// Credentials were rejected (HTTP 401/403).
    #[error("authentication rejected by {url} (HTTP {status})")]
    Auth { url: String, status: u16 },

    /// The backend refused the request (bad mapping, malformed document, ...).
    #[error("request to {url} rejected (HTTP {status}): {body}")]
    Rejected {
        url: String,
        status: u16,
        body: String,
    },

    /// A transient error persisted through every retry.
    #[error("request to {url} failed after {attempts} attempts: {last}")]
    RetriesExhausted {
        url: String,
        attempts: u32,
        last: String,
    },
}
