//! Section and subsection splitting
//!
//! Both splitters are positional and delimiter based. The section splitter
//! does not look for a heading bearing the expected title; whatever occupies
//! the target ordinal slot is taken as the section.

use tracing::{debug, info};

use alps_core::{AlpsError, Result};

/// Line that separates top-level sections
pub const SECTION_DELIMITER: &str = "\n---\n";

/// Start of a subsection heading line
pub const SUBSECTION_DELIMITER: &str = "\n### ";

/// Selects one top-level section by its 1-indexed ordinal
#[derive(Debug, Clone, Copy)]
pub struct SectionSplitter {
    target: usize,
}

impl SectionSplitter {
    /// Create a splitter for the 1-indexed section `target`.
    ///
    /// A target of 0 names no section, so `extract` always fails for it.
    pub fn new(target: usize) -> Self {
        Self { target }
    }

    pub fn target(&self) -> usize {
        self.target
    }

    /// Split raw text into untrimmed section bodies
    pub fn split_sections<'a>(&self, text: &'a str) -> Vec<&'a str> {
        text.split(SECTION_DELIMITER).collect()
    }

    /// Return the trimmed body of the target section
    pub fn extract(&self, text: &str) -> Result<String> {
        let sections = self.split_sections(text);

        let body = self
            .target
            .checked_sub(1)
            .and_then(|index| sections.get(index))
            .ok_or(AlpsError::SectionNotFound {
                found: sections.len(),
                required: self.target,
            })?
            .trim();

        if body.is_empty() {
            return Err(AlpsError::SectionEmpty {
                section: self.target,
            });
        }

        info!(
            section = self.target,
            sections_found = sections.len(),
            characters = body.chars().count(),
            "Extracted section"
        );

        Ok(body.to_string())
    }
}

impl Default for SectionSplitter {
    fn default() -> Self {
        Self::new(6)
    }
}

/// Cuts a section body into `### ` subsection blocks
#[derive(Debug, Clone, Copy, Default)]
pub struct SubsectionSplitter;

impl SubsectionSplitter {
    pub fn new() -> Self {
        Self
    }

    /// Split a section body into trimmed, non-empty blocks in source order.
    ///
    /// Text before the first heading is preamble and is discarded. Each block
    /// starts right after its `### ` marker.
    pub fn split(&self, section_body: &str) -> Vec<String> {
        // A heading on the first line has no preceding newline
        let normalized = format!("\n{section_body}");

        let blocks: Vec<String> = normalized
            .split(SUBSECTION_DELIMITER)
            .skip(1)
            .map(str::trim)
            .filter(|block| !block.is_empty())
            .map(str::to_string)
            .collect();

        debug!(blocks = blocks.len(), "Split section into subsection blocks");

        blocks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SCENARIO: &str =
        "A\n---\nB\n---\nC\n---\nD\n---\nE\n---\nF\n### one\nfoo\n### two\nbar\n---\nG";

    #[test]
    fn test_extract_sixth_section() {
        let body = SectionSplitter::new(6).extract(SCENARIO).unwrap();
        assert_eq!(body, "F\n### one\nfoo\n### two\nbar");
    }

    #[test]
    fn test_extract_trims_only_outer_whitespace() {
        let text = "1\n---\n2\n---\n3\n---\n4\n---\n5\n---\n\n  body\n\n  inner  \n\n---\n7";
        let body = SectionSplitter::new(6).extract(text).unwrap();
        assert_eq!(body, "body\n\n  inner");
    }

    #[test]
    fn test_extract_reports_found_count() {
        let err = SectionSplitter::new(6).extract("A\n---\nB\n---\nC").unwrap_err();

        match &err {
            AlpsError::SectionNotFound { found, required } => {
                assert_eq!(*found, 3);
                assert_eq!(*required, 6);
            }
            other => panic!("expected SectionNotFound, got {other:?}"),
        }
        assert!(err.to_string().contains('3'));
    }

    #[test]
    fn test_zero_target_is_not_found() {
        let err = SectionSplitter::new(0).extract(SCENARIO).unwrap_err();

        match err {
            AlpsError::SectionNotFound { found, required } => {
                assert_eq!(found, 7);
                assert_eq!(required, 0);
            }
            other => panic!("expected SectionNotFound, got {other:?}"),
        }
    }

    #[test]
    fn test_extract_empty_section() {
        let text = "A\n---\nB\n---\nC\n---\nD\n---\nE\n---\n   \n---\nG";
        let err = SectionSplitter::new(6).extract(text).unwrap_err();
        assert!(matches!(err, AlpsError::SectionEmpty { section: 6 }));
    }

    #[test]
    fn test_extract_last_section_without_trailing_delimiter() {
        let text = "A\n---\nB\n---\nC\n---\nD\n---\nE\n---\nF tail\n";
        let body = SectionSplitter::new(6).extract(text).unwrap();
        assert_eq!(body, "F tail");
    }

    #[test]
    fn test_inline_dashes_are_not_delimiters() {
        let splitter = SectionSplitter::default();
        assert_eq!(splitter.split_sections("a --- b\n----\nc").len(), 1);
    }

    #[test]
    fn test_split_subsections_scenario() {
        let blocks = SubsectionSplitter::new().split("F\n### one\nfoo\n### two\nbar");
        assert_eq!(blocks, vec!["one\nfoo".to_string(), "two\nbar".to_string()]);
    }

    #[test]
    fn test_split_discards_preamble() {
        let blocks = SubsectionSplitter::new().split("## 6. Features\nintro text\n### 6.1 Login\nbody");
        assert_eq!(blocks, vec!["6.1 Login\nbody".to_string()]);
    }

    #[test]
    fn test_split_heading_on_first_line() {
        let blocks = SubsectionSplitter::new().split("### 6.1 Login\nbody\n### 6.2 Export\nmore");
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0], "6.1 Login\nbody");
    }

    #[test]
    fn test_split_drops_blank_blocks() {
        // Three headings, one of them with nothing but whitespace after the marker
        let blocks = SubsectionSplitter::new().split("pre\n### a\nx\n###    \n\n### b\ny");
        assert_eq!(blocks, vec!["a\nx".to_string(), "b\ny".to_string()]);
    }

    #[test]
    fn test_split_ignores_deeper_headings() {
        let blocks = SubsectionSplitter::new().split("pre\n### a\n#### detail\nx");
        assert_eq!(blocks, vec!["a\n#### detail\nx".to_string()]);
    }

    #[test]
    fn test_split_without_headings() {
        assert!(SubsectionSplitter::new().split("just a preamble").is_empty());
    }

    #[test]
    fn test_splitting_is_idempotent() {
        let section = SectionSplitter::new(6).extract(SCENARIO).unwrap();
        let again = SectionSplitter::new(6).extract(SCENARIO).unwrap();
        assert_eq!(section, again);

        let splitter = SubsectionSplitter::new();
        assert_eq!(splitter.split(&section), splitter.split(&again));
    }
}
