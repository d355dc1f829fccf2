//! Layout issues and the layout check result contract.

use serde::{Deserialize, Serialize};

use crate::domain::scores::Severity;

/// A single layout defect found in a frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutIssue {
    pub id: String,
    pub severity: Severity,
    pub message: String,
    pub suggestion: String,
    /// Confidence in `[0, 1]`.
    pub confidence: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wcag_reference: Option<String>,
    /// Whether a reviewer may dismiss the issue. Overlaps never are.
    pub overrideable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Outcome of checking one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutCheckResult {
    pub score: u8,
    pub issues: Vec<LayoutIssue>,
    pub summary: String,
}

impl LayoutCheckResult {
    pub fn count_by_severity(&self, severity: Severity) -> usize {
        self.issues.iter().filter(|i| i.severity == severity).count()
    }
}
