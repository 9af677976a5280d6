//! Structured-extraction backends
//!
//! Implementations of [`alps_core::StructuredExtractor`] that call a hosted
//! model. Each backend owns its HTTP client and maps transport, status and
//! payload problems onto [`alps_core::ExtractionError`].

pub mod anthropic;
pub mod error;

pub use anthropic::{AnthropicExtractor, AnthropicExtractorBuilder, RECORD_TOOL_NAME};
pub use error::{AdapterError, Result};
