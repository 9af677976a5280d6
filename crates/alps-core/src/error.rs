//! Error taxonomy for the ALPS parser.
//!
//! [`AlpsError`] covers stage-level failures that abort a parse.
//! [`ExtractionError`] covers a single subsection's enrichment call and is
//! never fatal to the parse as a whole.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for parser operations
pub type Result<T> = std::result::Result<T, AlpsError>;

/// Fatal errors raised by the parsing pipeline
#[derive(Error, Debug)]
pub enum AlpsError {
    /// The source document does not exist
    #[error("File not found: {}", .path.display())]
    NotFound { path: PathBuf },

    /// None of the candidate encodings could decode the source
    #[error("Could not decode {} with any supported encoding (tried {tried})", .path.display())]
    Decode { path: PathBuf, tried: String },

    /// The decoded source is blank
    #[error("Document is empty: {}", .path.display())]
    EmptyDocument { path: PathBuf },

    /// Fewer top-level sections than the target ordinal requires
    #[error("Document contains only {found} sections, Section {required} not found")]
    SectionNotFound { found: usize, required: usize },

    /// The target section is blank after trimming
    #[error("Section {section} content is empty")]
    SectionEmpty { section: usize },

    /// The source exists but could not be read
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The caller cancelled the parse
    #[error("Parse cancelled before {stage}")]
    Cancelled { stage: &'static str },
}

impl AlpsError {
    /// Stable category name, suitable for CLI output and log fields
    pub fn category(&self) -> &'static str {
        match self {
            AlpsError::NotFound { .. } => "not_found",
            AlpsError::Decode { .. } => "decode_error",
            AlpsError::EmptyDocument { .. } => "empty_document",
            AlpsError::SectionNotFound { .. } => "section_not_found",
            AlpsError::SectionEmpty { .. } => "section_empty",
            AlpsError::Io(_) => "io_error",
            AlpsError::Cancelled { .. } => "cancelled",
        }
    }

    /// Pipeline stage the error originated from
    pub fn stage(&self) -> &'static str {
        match self {
            AlpsError::NotFound { .. }
            | AlpsError::Decode { .. }
            | AlpsError::EmptyDocument { .. }
            | AlpsError::Io(_) => "read",
            AlpsError::SectionNotFound { .. } | AlpsError::SectionEmpty { .. } => {
                "section_split"
            }
            AlpsError::Cancelled { stage } => *stage,
        }
    }
}

/// Failure of one structured-extraction call
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExtractionError {
    /// The request could not be delivered or the response not received
    #[error("Transport error: {0}")]
    Transport(String),

    /// The call exceeded its timeout
    #[error("Extraction timed out after {0:?}")]
    Timeout(Duration),

    /// The service answered with a non-success status
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The response could not be mapped onto a subsection record
    #[error("Malformed response: {0}")]
    Malformed(String),

    /// The call was cancelled before it completed
    #[error("Extraction cancelled")]
    Cancelled,
}

impl ExtractionError {
    /// Whether a wrapping policy layer could reasonably retry this call
    pub fn is_transient(&self) -> bool {
        match self {
            ExtractionError::Transport(_) | ExtractionError::Timeout(_) => true,
            ExtractionError::Api { status, .. } => *status == 429 || *status >= 500,
            ExtractionError::Malformed(_) | ExtractionError::Cancelled => false,
        }
    }
}
