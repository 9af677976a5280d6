//! ALPS Parsing Pipeline
//!
//! Runs the stages in order for a single document:
//! read, split, enrich, assemble. Validation is a separate step so callers
//! can inspect a document before deciding what to do with its report.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use alps_core::{
    AlpsError, Document, LlmConfig, ParserConfig, Result, StructuredExtractor, ValidationReport,
};

use crate::assembler::{AssemblyParts, DocumentAssembler};
use crate::enricher::{EnricherConfig, SubsectionEnricher};
use crate::reader::DocumentReader;
use crate::splitter::{SectionSplitter, SubsectionSplitter};
use crate::validator::Validator;

/// A parsed document together with its validation report
#[derive(Debug, Clone)]
pub struct ParseOutcome {
    pub document: Document,
    pub validation: ValidationReport,
}

/// Parser statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParserStats {
    pub documents_parsed: u64,
    pub documents_failed: u64,
    pub blocks_enriched: u64,
    pub blocks_failed: u64,
}

/// Parses ALPS documents into their feature-level section
pub struct AlpsParser {
    config: ParserConfig,
    reader: DocumentReader,
    sections: SectionSplitter,
    subsections: SubsectionSplitter,
    enricher: SubsectionEnricher,
    validator: Validator,
    assembler: DocumentAssembler,
    stats: Arc<RwLock<ParserStats>>,
}

impl AlpsParser {
    pub fn new(extractor: Arc<dyn StructuredExtractor>, config: ParserConfig) -> Self {
        let enricher_config =
            EnricherConfig::default().with_max_concurrency(config.max_concurrency);
        Self::with_enricher_config(extractor, config, enricher_config)
    }

    /// Create a parser whose per-call timeout follows the LLM read timeout
    pub fn from_configs(
        extractor: Arc<dyn StructuredExtractor>,
        parser: ParserConfig,
        llm: &LlmConfig,
    ) -> Self {
        let enricher_config = EnricherConfig::default()
            .with_max_concurrency(parser.max_concurrency)
            .with_call_timeout(llm.read_timeout());
        Self::with_enricher_config(extractor, parser, enricher_config)
    }

    pub fn with_enricher_config(
        extractor: Arc<dyn StructuredExtractor>,
        config: ParserConfig,
        enricher_config: EnricherConfig,
    ) -> Self {
        let mut validator = Validator::new();
        if config.verify_title {
            validator = validator.with_expected_title(config.section_title.clone());
        }

        Self {
            reader: DocumentReader::new(),
            sections: SectionSplitter::new(config.target_section),
            subsections: SubsectionSplitter::new(),
            enricher: SubsectionEnricher::new(extractor).with_config(enricher_config),
            validator,
            assembler: DocumentAssembler::new(
                config.target_section.to_string(),
                config.section_title.clone(),
            ),
            stats: Arc::new(RwLock::new(ParserStats::default())),
            config,
        }
    }

    /// Replace the document reader, e.g. to restrict candidate encodings
    pub fn with_reader(mut self, reader: DocumentReader) -> Self {
        self.reader = reader;
        self
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Parse the document at `path`
    pub async fn parse_document(&self, path: impl AsRef<Path>) -> Result<Document> {
        self.parse_document_with_cancel(path, CancellationToken::new())
            .await
    }

    /// Parse the document at `path`, stopping early once `cancel` fires
    pub async fn parse_document_with_cancel(
        &self,
        path: impl AsRef<Path>,
        cancel: CancellationToken,
    ) -> Result<Document> {
        let path = path.as_ref();
        let start = std::time::Instant::now();

        match self.run(path, &cancel).await {
            Ok(document) => {
                let failed = document.metadata().enrichment_failures.len() as u64;
                {
                    let mut stats = self.stats.write().await;
                    stats.documents_parsed += 1;
                    stats.blocks_enriched += document.metadata().subsections_count as u64;
                    stats.blocks_failed += failed;
                }

                info!(
                    path = %path.display(),
                    parse_id = %document.metadata().parse_id,
                    subsections = document.metadata().subsections_count,
                    enrichment_failures = failed,
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "Document parsed"
                );

                Ok(document)
            }
            Err(e) => {
                self.stats.write().await.documents_failed += 1;

                warn!(
                    path = %path.display(),
                    stage = e.stage(),
                    category = e.category(),
                    error = %e,
                    "Document parse failed"
                );

                Err(e)
            }
        }
    }

    async fn run(&self, path: &Path, cancel: &CancellationToken) -> Result<Document> {
        ensure_active(cancel, "read")?;
        let source = self.reader.read(path).await?;

        ensure_active(cancel, "section_split")?;
        let section_body = self.sections.extract(&source.text)?;

        ensure_active(cancel, "subsection_split")?;
        let blocks = self.subsections.split(&section_body);

        ensure_active(cancel, "enrichment")?;
        let outcome = self.enricher.enrich_with_cancel(&blocks, cancel).await;

        ensure_active(cancel, "assembly")?;
        Ok(self.assembler.assemble(AssemblyParts {
            source,
            section_body,
            raw_block_count: blocks.len(),
            subsections: outcome.subsections,
            failures: outcome.failures,
        }))
    }

    /// Validate the target section of a parsed document
    pub fn validate(&self, document: &Document) -> ValidationReport {
        let number = self.config.target_section.to_string();
        match document.section(&number) {
            Some(section) => self.validator.validate(section),
            None => ValidationReport::from_issues(vec![format!(
                "Section {number} missing from document"
            )]),
        }
    }

    /// Parse and validate in one step
    pub async fn parse_and_validate(&self, path: impl AsRef<Path>) -> Result<ParseOutcome> {
        let document = self.parse_document(path).await?;
        let validation = self.validate(&document);
        Ok(ParseOutcome {
            document,
            validation,
        })
    }

    /// Current statistics
    pub async fn stats(&self) -> ParserStats {
        self.stats.read().await.clone()
    }

    /// Reset statistics
    pub async fn reset_stats(&self) {
        *self.stats.write().await = ParserStats::default();
    }

    /// Per-call timeout used by enrichment
    pub fn call_timeout(&self) -> Duration {
        self.enricher.config().call_timeout
    }
}

fn ensure_active(cancel: &CancellationToken, stage: &'static str) -> Result<()> {
    if cancel.is_cancelled() {
        return Err(AlpsError::Cancelled { stage });
    }
    Ok(())
}
