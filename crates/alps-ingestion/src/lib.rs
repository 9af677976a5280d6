//! ALPS Document Ingestion Pipeline
//!
//! Turns an ALPS markdown document into a validated, structured view of its
//! feature-level specification (Section 6).
//!
//! # Stages
//!
//! - [`DocumentReader`]: loads the source, recovering from encoding ambiguity
//! - [`SectionSplitter`]: selects the target section by ordinal position
//! - [`SubsectionSplitter`]: cuts the section into `### ` blocks
//! - [`SubsectionEnricher`]: one extraction call per block, failures isolated
//! - [`DocumentAssembler`]: builds the [`Document`](alps_core::Document)
//! - [`Validator`]: checks structural invariants
//!
//! [`AlpsParser`] composes the stages.

pub mod assembler;
pub mod enricher;
pub mod heuristic;
pub mod pipeline;
pub mod reader;
pub mod splitter;
pub mod validator;

// Re-exports
pub use assembler::{AssemblyParts, DocumentAssembler};
pub use enricher::{EnricherConfig, EnrichmentOutcome, SubsectionEnricher};
pub use heuristic::HeuristicExtractor;
pub use pipeline::{AlpsParser, ParseOutcome, ParserStats};
pub use reader::{DecodedDocument, DocumentReader, TextEncoding};
pub use splitter::{SectionSplitter, SubsectionSplitter, SECTION_DELIMITER, SUBSECTION_DELIMITER};
pub use validator::Validator;

pub use alps_core::{AlpsError, Result};
