//! Offline structured extraction
//!
//! A rule-based [`StructuredExtractor`] for use without a hosted model. It
//! understands the conventional subsection layout:
//!
//! ```text
//! 6.1 Feature Title
//! **User Story:** As a traveller, I want ...
//! **Complexity:** Medium
//! Free-form implementation notes ...
//! ```

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;

use alps_core::{ExtractedRecord, ExtractionError, StructuredExtractor};

static NUMBERED_HEADING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<number>\d+(?:\.\d+)+)\.?(?:\s+(?P<title>.+))?$").expect("valid regex")
});

static USER_STORY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:^|user story\W*)\W*(?P<story>as an?\s.+)$").expect("valid regex")
});

static COMPLEXITY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\W*(?:complexity|difficulty)\W*[:\-]\s*\**\s*(?P<label>[a-z][a-z \-]*)")
        .expect("valid regex")
});

/// Rule-based extractor that never touches the network
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicExtractor;

impl HeuristicExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Split a heading line into (number, title)
    fn parse_heading(line: &str) -> (String, String) {
        let heading = line.trim_start_matches('#').trim().trim_matches('*').trim();

        match NUMBERED_HEADING.captures(heading) {
            Some(caps) => {
                let number = caps["number"].to_string();
                let title = caps
                    .name("title")
                    .map(|t| t.as_str().trim().trim_matches('*').trim().to_string())
                    .unwrap_or_default();
                (number, title)
            }
            None => (String::new(), heading.to_string()),
        }
    }

    fn extract_record(&self, block: &str) -> ExtractedRecord {
        let mut lines = block.lines();
        let (number, title) = Self::parse_heading(lines.next().unwrap_or_default());

        let mut user_story = String::new();
        let mut complexity = None;
        let mut technical = Vec::new();

        for line in lines {
            if complexity.is_none() {
                if let Some(caps) = COMPLEXITY.captures(line.trim()) {
                    complexity = Some(caps["label"].trim().to_string());
                    continue;
                }
            }

            if user_story.is_empty() {
                if let Some(caps) = USER_STORY.captures(line.trim()) {
                    user_story = caps["story"].trim().trim_end_matches('*').trim().to_string();
                    continue;
                }
            }

            technical.push(line);
        }

        ExtractedRecord {
            subsection_number: number,
            subsection_title: title,
            content: block.to_string(),
            user_story,
            technical_description: technical.join("\n").trim().to_string(),
            complexity: complexity.filter(|c| !c.is_empty()),
        }
    }
}

#[async_trait]
impl StructuredExtractor for HeuristicExtractor {
    async fn extract(&self, block: &str) -> Result<ExtractedRecord, ExtractionError> {
        if block.trim().is_empty() {
            return Err(ExtractionError::Malformed("empty subsection block".to_string()));
        }
        Ok(self.extract_record(block))
    }

    fn name(&self) -> &'static str {
        "heuristic"
    }
}
