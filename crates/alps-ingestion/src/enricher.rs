//! Subsection Enrichment
//!
//! Runs one structured-extraction call per raw block with bounded
//! concurrency. Every call is isolated: a failure, timeout or cancellation
//! drops that block and is recorded, while the other blocks carry on. Results
//! are slotted by block index so output order never depends on completion
//! order.

use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use alps_core::{
    EnrichmentFailure, ExtractedRecord, ExtractionError, StructuredExtractor, Subsection,
};

/// Enrichment configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnricherConfig {
    /// Maximum extraction calls in flight
    pub max_concurrency: usize,
    /// Response timeout applied to each call
    pub call_timeout: Duration,
}

impl Default for EnricherConfig {
    fn default() -> Self {
        Self {
            max_concurrency: 4,
            call_timeout: Duration::from_secs(300),
        }
    }
}

impl EnricherConfig {
    pub fn with_max_concurrency(mut self, max: usize) -> Self {
        self.max_concurrency = max;
        self
    }

    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }
}

/// Result of enriching a batch of blocks
#[derive(Debug, Clone, Default)]
pub struct EnrichmentOutcome {
    /// Enriched subsections, in block order
    pub subsections: Vec<Subsection>,
    /// Blocks that were dropped, in block order
    pub failures: Vec<EnrichmentFailure>,
}

impl EnrichmentOutcome {
    /// Number of blocks that were attempted
    pub fn attempted(&self) -> usize {
        self.subsections.len() + self.failures.len()
    }

    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Enriches raw subsection blocks through a [`StructuredExtractor`]
#[derive(Clone)]
pub struct SubsectionEnricher {
    extractor: Arc<dyn StructuredExtractor>,
    config: EnricherConfig,
}

impl SubsectionEnricher {
    pub fn new(extractor: Arc<dyn StructuredExtractor>) -> Self {
        Self {
            extractor,
            config: EnricherConfig::default(),
        }
    }

    pub fn with_config(mut self, config: EnricherConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &EnricherConfig {
        &self.config
    }

    /// Enrich all blocks
    pub async fn enrich(&self, blocks: &[String]) -> EnrichmentOutcome {
        self.enrich_with_cancel(blocks, &CancellationToken::new())
            .await
    }

    /// Enrich all blocks, abandoning in-flight calls once `cancel` fires
    pub async fn enrich_with_cancel(
        &self,
        blocks: &[String],
        cancel: &CancellationToken,
    ) -> EnrichmentOutcome {
        let mut slots: Vec<Option<Result<Subsection, ExtractionError>>> =
            (0..blocks.len()).map(|_| None).collect();

        let mut calls = stream::iter(blocks.iter().enumerate())
            .map(|(index, block)| async move { (index, self.enrich_block(block, cancel).await) })
            .buffer_unordered(self.config.max_concurrency.max(1));

        while let Some((index, result)) = calls.next().await {
            slots[index] = Some(result);
        }

        let mut outcome = EnrichmentOutcome::default();

        for (index, (block, slot)) in blocks.iter().zip(slots).enumerate() {
            match slot.unwrap_or(Err(ExtractionError::Cancelled)) {
                Ok(subsection) => {
                    debug!(
                        block_index = index,
                        number = %subsection.number,
                        "Subsection enriched"
                    );
                    outcome.subsections.push(subsection);
                }
                Err(e) => {
                    warn!(
                        block_index = index,
                        extractor = self.extractor.name(),
                        error = %e,
                        "Failed to enrich subsection, dropping block"
                    );
                    outcome.failures.push(EnrichmentFailure {
                        block_index: index,
                        heading: first_line(block).to_string(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        info!(
            blocks = blocks.len(),
            enriched = outcome.subsections.len(),
            failed = outcome.failures.len(),
            "Subsection enrichment finished"
        );

        outcome
    }

    async fn enrich_block(
        &self,
        block: &str,
        cancel: &CancellationToken,
    ) -> Result<Subsection, ExtractionError> {
        let timeout = self.config.call_timeout;

        let record = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(ExtractionError::Cancelled),
            outcome = tokio::time::timeout(timeout, self.extractor.extract(block)) => {
                outcome.map_err(|_| ExtractionError::Timeout(timeout))??
            }
        };

        Ok(map_record(block, record))
    }
}

/// Map an extracted record onto a subsection, keeping the raw block as content
pub fn map_record(block: &str, record: ExtractedRecord) -> Subsection {
    let complexity = record
        .complexity
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty());

    Subsection {
        number: record.subsection_number.trim().to_string(),
        title: record.subsection_title.trim().to_string(),
        content: block.to_string(),
        user_story: record.user_story.trim().to_string(),
        technical_description: record.technical_description.trim().to_string(),
        complexity,
    }
}

fn first_line(block: &str) -> &str {
    block.lines().next().unwrap_or_default().trim()
}
