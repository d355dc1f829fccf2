//! Aggregate layout score.
//!
//! Each issue weighs `confidence * severity multiplier`. The confidence
//! average is `1 - mean(weight)`, or 1.0 with no issues. Under the legacy
//! formula the score is `100 - average * 100`, so a frame without issues
//! scores 0. [`LayoutScoreFormula::Corrected`] reports `average * 100`.

use serde::{Deserialize, Serialize};

use crate::domain::{clamp_score, LayoutIssue, Severity};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutScoreFormula {
    #[default]
    Legacy,
    Corrected,
}

pub fn issue_weight(issue: &LayoutIssue) -> f64 {
    issue.confidence.clamp(0.0, 1.0) * issue.severity.multiplier()
}

pub fn layout_confidence_score(issues: &[LayoutIssue]) -> f64 {
    if issues.is_empty() {
        return 1.0;
    }
    let total: f64 = issues.iter().map(issue_weight).sum();
    1.0 - total / issues.len() as f64
}

pub fn layout_score(issues: &[LayoutIssue], formula: LayoutScoreFormula) -> u8 {
    let confidence = layout_confidence_score(issues);
    match formula {
        LayoutScoreFormula::Legacy => clamp_score(100.0 - confidence * 100.0),
        LayoutScoreFormula::Corrected => clamp_score(confidence * 100.0),
    }
}

/// One-line summary of a frame's issues.
pub fn summarize(issues: &[LayoutIssue]) -> String {
    if issues.is_empty() {
        return "No layout issues found".to_string();
    }
    let count = |s: Severity| issues.iter().filter(|i| i.severity == s).count();
    format!(
        "{} layout issue{} found ({} high, {} medium, {} low)",
        issues.len(),
        if issues.len() == 1 { "" } else { "s" },
        count(Severity::High),
        count(Severity::Medium),
        count(Severity::Low),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issue(severity: Severity, confidence: f64) -> LayoutIssue {
        LayoutIssue {
            id: "x".to_string(),
            severity,
            message: String::new(),
            suggestion: String::new(),
            confidence,
            wcag_reference: None,
            overrideable: true,
            details: None,
        }
    }

    #[test]
    fn test_no_issues_confidence_is_one_and_legacy_score_zero() {
        assert_eq!(layout_confidence_score(&[]), 1.0);
        assert_eq!(layout_score(&[], LayoutScoreFormula::Legacy), 0);
        assert_eq!(layout_score(&[], LayoutScoreFormula::Corrected), 100);
    }

    #[test]
    fn test_single_overlap_issue() {
        let issues = vec![issue(Severity::High, 0.95)];
        let confidence = layout_confidence_score(&issues);
        assert!((confidence - 0.05).abs() < 1e-9);
        assert_eq!(layout_score(&issues, LayoutScoreFormula::Legacy), 95);
        assert_eq!(layout_score(&issues, LayoutScoreFormula::Corrected), 5);
    }

    #[test]
    fn test_mixed_issues_average() {
        // weights: 0.6*0.6 = 0.36, 0.4*0.3 = 0.12 -> mean 0.24
        let issues = vec![issue(Severity::Medium, 0.6), issue(Severity::Low, 0.4)];
        assert!((layout_confidence_score(&issues) - 0.76).abs() < 1e-9);
        assert_eq!(layout_score(&issues, LayoutScoreFormula::Legacy), 24);
    }

    #[test]
    fn test_summary_text() {
        assert_eq!(summarize(&[]), "No layout issues found");
        let issues = vec![issue(Severity::High, 0.95), issue(Severity::Low, 0.4)];
        assert_eq!(summarize(&issues), "2 layout issues found (1 high, 0 medium, 1 low)");
    }
}
