//! Domain model for parsed ALPS documents

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// A subsection of the target section, e.g. "6.1"
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subsection {
    /// Subsection number (e.g. "6.1")
    pub number: String,
    /// Subsection title
    pub title: String,
    /// Raw trimmed block text
    pub content: String,
    /// Extracted user story, empty if none was found
    #[serde(default)]
    pub user_story: String,
    /// Technical implementation details, empty if none were found
    #[serde(default)]
    pub technical_description: String,
    /// Complexity label (Easy, Medium, Hard, ...)
    #[serde(default)]
    pub complexity: Option<String>,
}

impl Subsection {
    /// Create an unenriched subsection from a raw block
    pub fn new(
        number: impl Into<String>,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            number: number.into(),
            title: title.into(),
            content: content.into(),
            user_story: String::new(),
            technical_description: String::new(),
            complexity: None,
        }
    }

    pub fn with_user_story(mut self, user_story: impl Into<String>) -> Self {
        self.user_story = user_story.into();
        self
    }

    pub fn with_technical_description(mut self, description: impl Into<String>) -> Self {
        self.technical_description = description.into();
        self
    }

    pub fn with_complexity(mut self, complexity: impl Into<String>) -> Self {
        self.complexity = Some(complexity.into());
        self
    }
}

/// A top-level section of an ALPS document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    /// Section number (e.g. "6")
    pub number: String,
    /// Section title
    pub title: String,
    /// Raw trimmed section text
    pub content: String,
    /// Subsections in source order
    #[serde(default)]
    pub subsections: Vec<Subsection>,
}

impl Section {
    pub fn new(
        number: impl Into<String>,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            number: number.into(),
            title: title.into(),
            content: content.into(),
            subsections: Vec::new(),
        }
    }

    pub fn with_subsections(mut self, subsections: Vec<Subsection>) -> Self {
        self.subsections = subsections;
        self
    }

    /// Look up a subsection by its number
    pub fn subsection(&self, number: &str) -> Option<&Subsection> {
        self.subsections.iter().find(|s| s.number == number)
    }
}

/// A subsection block that was dropped during enrichment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichmentFailure {
    /// Zero-based index of the raw block
    pub block_index: usize,
    /// First line of the raw block
    pub heading: String,
    /// Why the block was dropped
    pub reason: String,
}

/// Descriptive metadata attached to a parsed document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentMetadata {
    /// Unique identifier of this parse
    pub parse_id: Uuid,
    /// Source path as given by the caller
    pub source: String,
    /// Encoding that decoded the source
    pub encoding: String,
    /// Character count of the decoded document
    pub total_characters: usize,
    /// Character count of the trimmed target section
    pub section_characters: usize,
    /// Blocks produced by the subsection splitter
    pub raw_block_count: usize,
    /// Subsections that survived enrichment
    pub subsections_count: usize,
    /// Blocks dropped during enrichment
    #[serde(default)]
    pub enrichment_failures: Vec<EnrichmentFailure>,
    /// When the document was assembled
    pub parsed_at: DateTime<Utc>,
}

/// A parsed ALPS document
///
/// Built once by the assembler; read-only afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    sections: BTreeMap<String, Section>,
    metadata: DocumentMetadata,
}

impl Document {
    pub fn new(sections: BTreeMap<String, Section>, metadata: DocumentMetadata) -> Self {
        Self { sections, metadata }
    }

    pub fn sections(&self) -> &BTreeMap<String, Section> {
        &self.sections
    }

    pub fn section(&self, number: &str) -> Option<&Section> {
        self.sections.get(number)
    }

    pub fn metadata(&self) -> &DocumentMetadata {
        &self.metadata
    }

    /// Consume the document, yielding its sections
    pub fn into_sections(self) -> BTreeMap<String, Section> {
        self.sections
    }
}

/// Outcome of structural validation
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ValidationReport {
    pub is_valid: bool,
    pub issues: Vec<String>,
}

impl ValidationReport {
    /// Build a report from collected issues
    pub fn from_issues(issues: Vec<String>) -> Self {
        Self {
            is_valid: issues.is_empty(),
            issues,
        }
    }
}
