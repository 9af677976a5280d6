pub mod config;
pub mod error;
pub mod traits;
pub mod types;

pub use config::*;
pub use error::*;
pub use types::*;

pub use traits::{ExtractedRecord, StructuredExtractor, EXTRACTION_SYSTEM_PROMPT};
