//! Capability interfaces consumed by the parsing pipeline.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ExtractionError;

/// Fixed instructions handed to every structured-extraction backend.
pub const EXTRACTION_SYSTEM_PROMPT: &str = "\
You are an expert at analyzing ALPS document subsections. Extract structured information from the provided content.

Rules:
1. Extract the main title from the first line or heading
2. Look for user stories (typically starting with \"As a...\")
3. Extract technical details about implementation
4. Identify complexity level if mentioned
5. If any field is not found, use empty string or null";

/// Structured record returned by an extraction backend for one block
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedRecord {
    /// Subsection number (e.g. "6.1")
    pub subsection_number: String,
    /// Subsection title
    pub subsection_title: String,
    /// Content as echoed by the backend
    #[serde(default)]
    pub content: String,
    /// Extracted user story
    #[serde(default)]
    pub user_story: String,
    /// Technical implementation details
    #[serde(default)]
    pub technical_description: String,
    /// Complexity level (Easy, Medium, Hard)
    #[serde(default)]
    pub complexity: Option<String>,
}

impl ExtractedRecord {
    /// JSON schema describing the record, used for tool-constrained output
    pub fn json_schema() -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "subsection_number": {
                    "type": "string",
                    "description": "Subsection number (e.g., '6.1')"
                },
                "subsection_title": {
                    "type": "string",
                    "description": "Subsection title"
                },
                "content": {
                    "type": "string",
                    "description": "Raw content of the subsection"
                },
                "user_story": {
                    "type": "string",
                    "description": "Extracted user story"
                },
                "technical_description": {
                    "type": "string",
                    "description": "Technical implementation details"
                },
                "complexity": {
                    "type": ["string", "null"],
                    "description": "Complexity level (Easy, Medium, Hard)"
                }
            },
            "required": ["subsection_number", "subsection_title", "content"]
        })
    }
}

/// Derives a structured record from one raw subsection block.
///
/// Implementations must be safe to call concurrently for distinct blocks.
#[async_trait]
pub trait StructuredExtractor: Send + Sync {
    /// Extract structured fields from a raw block
    async fn extract(&self, block: &str) -> Result<ExtractedRecord, ExtractionError>;

    /// Backend name, for logging
    fn name(&self) -> &'static str;
}
