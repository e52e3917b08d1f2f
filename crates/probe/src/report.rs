//! Pass/fail reporting for a smoke-check run.

use std::fmt;

/// The result of one named check.
#[derive(Debug, Clone)]
pub struct CheckOutcome {
    pub name: String,
    pub passed: bool,
    pub detail: String,
}

/// An ordered collection of check outcomes.
#[derive(Debug, Clone, Default)]
pub struct Report {
    outcomes: Vec<CheckOutcome>,
}

impl Report {
    pub fn pass(&mut self, name: &str, detail: impl Into<String>) {
        self.outcomes.push(CheckOutcome { name: name.to_string(), passed: true, detail: detail.into() });
    }

    pub fn fail(&mut self, name: &str, detail: impl Into<String>) {
        self.outcomes.push(CheckOutcome { name: name.to_string(), passed: false, detail: detail.into() });
    }

    pub fn outcomes(&self) -> &[CheckOutcome] {
        &self.outcomes
    }

    pub fn passed_count(&self) -> usize {
        self.outcomes.iter().filter(|outcome| outcome.passed).count()
    }

    pub fn failed_count(&self) -> usize {
        self.outcomes.len() - self.passed_count()
    }

    /// `true` if every check passed (an empty report counts as passing).
    pub fn all_passed(&self) -> bool {
        self.failed_count() == 0
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for outcome in &self.outcomes {
            let marker = if outcome.passed { " OK " } else { "FAIL" };
            writeln!(f, "[{marker}] {}: {}", outcome.name, outcome.detail)?;
        }
        write!(f, "{} passed, {} failed", self.passed_count(), self.failed_count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tally_and_display() {
        let mut report = Report::default();
        report.pass("home", "HTTP 200");
        report.fail("manifest", "no canvases");
        assert_eq!(report.passed_count(), 1);
        assert_eq!(report.failed_count(), 1);
        assert!(!report.all_passed());
        let rendered = report.to_string();
        assert!(rendered.contains("[ OK ] home: HTTP 200"));
        assert!(rendered.contains("[FAIL] manifest: no canvases"));
        assert!(rendered.ends_with("1 passed, 1 failed"));
    }

    #[test]
    fn test_empty_report_passes() {
        assert!(Report::default().all_passed());
    }
}
