//! Structural validation of an assembled section

use std::collections::BTreeSet;
use std::panic::{self, AssertUnwindSafe};
use tracing::{info, warn};

use alps_core::{Section, ValidationReport};

/// Checks the structural invariants of an extracted section
#[derive(Debug, Clone, Default)]
pub struct Validator {
    /// Expected title for the optional heading check
    expected_title: Option<String>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Also require the section's first line to mention `title`
    pub fn with_expected_title(mut self, title: impl Into<String>) -> Self {
        self.expected_title = Some(title.into());
        self
    }

    /// Validate a section, collecting every violation.
    ///
    /// Never panics: a failure inside the checks becomes a single issue.
    pub fn validate(&self, section: &Section) -> ValidationReport {
        let report = guarded(|| self.collect_issues(section));

        if report.is_valid {
            info!(section = %section.number, "Section validation passed");
        } else {
            warn!(
                section = %section.number,
                issues = report.issues.len(),
                "Section validation found issues"
            );
        }

        report
    }

    fn collect_issues(&self, section: &Section) -> Vec<String> {
        let mut issues = Vec::new();
        let number = &section.number;

        if section.content.trim().is_empty() {
            issues.push(format!("Section {number} content is empty"));
        }

        if let Some(expected) = &self.expected_title {
            let heading = section.content.lines().next().unwrap_or_default();
            if !heading.to_lowercase().contains(&expected.to_lowercase()) {
                issues.push(format!(
                    "Section {number} heading {:?} does not mention expected title {:?}",
                    heading.trim(),
                    expected
                ));
            }
        }

        if section.subsections.is_empty() {
            issues.push(format!("No subsections found in Section {number}"));
        }

        for subsection in &section.subsections {
            if subsection.number.trim().is_empty() {
                issues.push("Subsection missing number".to_string());
            }

            if subsection.title.trim().is_empty() {
                issues.push(format!("Subsection {} missing title", subsection.number));
            }

            if subsection.content.trim().is_empty() {
                issues.push(format!("Subsection {} has empty content", subsection.number));
            }
        }

        // Blank numbers are already reported above
        let mut seen = BTreeSet::new();
        let mut duplicates = BTreeSet::new();
        for subsection in &section.subsections {
            let n = subsection.number.trim();
            if !n.is_empty() && !seen.insert(n) {
                duplicates.insert(n);
            }
        }
        if !duplicates.is_empty() {
            let list: Vec<&str> = duplicates.into_iter().collect();
            issues.push(format!(
                "Duplicate subsection numbers found: {}",
                list.join(", ")
            ));
        }

        issues
    }
}

/// Run the checks, turning a panic into a single synthetic issue
fn guarded(checks: impl FnOnce() -> Vec<String>) -> ValidationReport {
    match panic::catch_unwind(AssertUnwindSafe(checks)) {
        Ok(issues) => ValidationReport::from_issues(issues),
        Err(payload) => {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown failure".to_string());
            ValidationReport::from_issues(vec![format!("Validation error: {message}")])
        }
    }
}
