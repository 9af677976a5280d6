//! Document assembly

use chrono::Utc;
use std::collections::BTreeMap;
use tracing::debug;
use uuid::Uuid;

use alps_core::{Document, DocumentMetadata, EnrichmentFailure, Section, Subsection};

use crate::reader::DecodedDocument;

/// Everything the earlier stages produced for one document
#[derive(Debug, Clone)]
pub struct AssemblyParts {
    pub source: DecodedDocument,
    /// Trimmed body of the target section
    pub section_body: String,
    /// Raw blocks handed to enrichment
    pub raw_block_count: usize,
    pub subsections: Vec<Subsection>,
    pub failures: Vec<EnrichmentFailure>,
}

/// Builds the [`Document`] from the extracted section
#[derive(Debug, Clone)]
pub struct DocumentAssembler {
    section_number: String,
    section_title: String,
}

impl DocumentAssembler {
    pub fn new(section_number: impl Into<String>, section_title: impl Into<String>) -> Self {
        Self {
            section_number: section_number.into(),
            section_title: section_title.into(),
        }
    }

    pub fn assemble(&self, parts: AssemblyParts) -> Document {
        let AssemblyParts {
            source,
            section_body,
            raw_block_count,
            subsections,
            failures,
        } = parts;

        let metadata = DocumentMetadata {
            parse_id: Uuid::new_v4(),
            total_characters: source.char_count(),
            source: source.source,
            encoding: source.encoding.name().to_string(),
            section_characters: section_body.chars().count(),
            raw_block_count,
            subsections_count: subsections.len(),
            enrichment_failures: failures,
            parsed_at: Utc::now(),
        };

        let section = Section::new(
            self.section_number.clone(),
            self.section_title.clone(),
            section_body,
        )
        .with_subsections(subsections);

        debug!(
            parse_id = %metadata.parse_id,
            section = %self.section_number,
            subsections = metadata.subsections_count,
            "Assembled document"
        );

        let mut sections = BTreeMap::new();
        sections.insert(self.section_number.clone(), section);

        Document::new(sections, metadata)
    }
}
