//! Layout rule registry.
//!
//! Every rule declares its identity, WCAG reference, severity, confidence and
//! whether reviewers may override it. The checker emits issues only for the
//! rules present in a [`RuleSet`], so a defect is reported once per rule.

use serde::{Deserialize, Serialize};

use crate::domain::Severity;

/// What a rule inspects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    Alignment,
    Spacing,
    GridAlignment,
    Margins,
    Hierarchy,
    Overlap,
}

/// Static declaration of a layout rule.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LayoutRule {
    pub id: &'static str,
    pub kind: RuleKind,
    pub severity: Severity,
    pub confidence: f64,
    pub wcag_reference: Option<&'static str>,
    pub overrideable: bool,
}

/// Max spread of text left edges before alignment is flagged.
pub const ALIGNMENT_TOLERANCE_PX: f64 = 16.0;
/// Distance from frame centre under which text counts as centred.
pub const CENTER_TOLERANCE_PX: f64 = 8.0;
/// Max difference between largest and smallest vertical gap.
pub const SPACING_VARIANCE_PX: f64 = 16.0;
/// Base grid unit.
pub const GRID_UNIT_PX: f64 = 8.0;
/// Allowed deviation from the nearest grid line.
pub const GRID_TOLERANCE_PX: f64 = 2.0;
/// Minimum distance between a child and any frame edge.
pub const MIN_MARGIN_PX: f64 = 16.0;

pub const ALIGNMENT: LayoutRule = LayoutRule {
    id: "alignment",
    kind: RuleKind::Alignment,
    severity: Severity::Medium,
    confidence: 0.6,
    wcag_reference: Some("1.4.8"),
    overrideable: true,
};

pub const SPACING: LayoutRule = LayoutRule {
    id: "spacing",
    kind: RuleKind::Spacing,
    severity: Severity::Medium,
    confidence: 0.6,
    wcag_reference: Some("1.4.12"),
    overrideable: true,
};

pub const GRID_ALIGNMENT: LayoutRule = LayoutRule {
    id: "grid-alignment",
    kind: RuleKind::GridAlignment,
    severity: Severity::Medium,
    confidence: 0.5,
    wcag_reference: Some("1.4.8"),
    overrideable: true,
};

pub const MARGINS: LayoutRule = LayoutRule {
    id: "margins",
    kind: RuleKind::Margins,
    severity: Severity::Medium,
    confidence: 0.5,
    wcag_reference: Some("1.4.8"),
    overrideable: true,
};

pub const HIERARCHY: LayoutRule = LayoutRule {
    id: "hierarchy",
    kind: RuleKind::Hierarchy,
    severity: Severity::Low,
    confidence: 0.4,
    wcag_reference: None,
    overrideable: true,
};

pub const OVERLAP: LayoutRule = LayoutRule {
    id: "overlap",
    kind: RuleKind::Overlap,
    severity: Severity::High,
    confidence: 0.95,
    wcag_reference: Some("1.4.12 / 1.4.8"),
    overrideable: false,
};

/// Mirror rules re-checking alignment, spacing and margins under WCAG ids.
///
/// Not part of [`RuleSet::standard`]. Enabling them reports those defects
/// twice, which raises their weight in the aggregate score.
pub const WCAG_MIRROR: [LayoutRule; 3] = [
    LayoutRule {
        id: "wcag-alignment",
        ..ALIGNMENT
    },
    LayoutRule {
        id: "wcag-spacing",
        ..SPACING
    },
    LayoutRule {
        id: "wcag-margins",
        ..MARGINS
    },
];

/// Ordered set of rules to run against a frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleSet {
    rules: Vec<LayoutRule>,
}

impl RuleSet {
    /// The six layout rules, each registered once.
    pub fn standard() -> Self {
        Self {
            rules: vec![ALIGNMENT, SPACING, GRID_ALIGNMENT, MARGINS, HIERARCHY, OVERLAP],
        }
    }

    /// Add the [`WCAG_MIRROR`] rules.
    pub fn with_wcag_mirror(mut self) -> Self {
        for rule in WCAG_MIRROR {
            self = self.with_rule(rule);
        }
        self
    }

    /// Add a rule. A rule whose id is already registered is ignored.
    pub fn with_rule(mut self, rule: LayoutRule) -> Self {
        if !self.rules.iter().any(|r| r.id == rule.id) {
            self.rules.push(rule);
        }
        self
    }

    pub fn rules(&self) -> &[LayoutRule] {
        &self.rules
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_rule_ids_unique() {
        let set = RuleSet::standard();
        let mut ids: Vec<_> = set.rules().iter().map(|r| r.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 6);
    }

    #[test]
    fn test_overlap_is_high_and_not_overrideable() {
        assert_eq!(OVERLAP.severity, Severity::High);
        assert!(!OVERLAP.overrideable);
        assert_eq!(OVERLAP.confidence, 0.95);
    }

    #[test]
    fn test_with_rule_ignores_duplicate_ids() {
        let set = RuleSet::standard().with_rule(ALIGNMENT);
        assert_eq!(set.rules().len(), 6);
    }

    #[test]
    fn test_wcag_mirror_adds_three_rules() {
        let set = RuleSet::standard().with_wcag_mirror();
        assert_eq!(set.rules().len(), 9);
        let mirror = set.rules().iter().find(|r| r.id == "wcag-spacing").unwrap();
        assert_eq!(mirror.kind, RuleKind::Spacing);
        assert_eq!(mirror.wcag_reference, Some("1.4.12"));
    }
}
