//! Layout heuristic checker.
//!
//! Runs every rule of a [`RuleSet`] against one [`FrameRecord`] and folds the
//! resulting [`LayoutIssue`]s into a [`LayoutCheckResult`].
//!
//! # Module layout
//!
//! - [`rules`]: `LayoutRule`, `RuleSet`, thresholds
//! - [`score`]: `layout_confidence_score`, `layout_score`, `LayoutScoreFormula`

pub mod rules;
pub mod score;

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::domain::{BoundingBox, LayoutCheckResult, LayoutIssue};
use crate::metrics::METRICS;
use crate::normalize::FrameRecord;

pub use rules::{LayoutRule, RuleKind, RuleSet};
pub use score::{layout_confidence_score, layout_score, summarize, LayoutScoreFormula};

use rules::{
    ALIGNMENT_TOLERANCE_PX, CENTER_TOLERANCE_PX, GRID_TOLERANCE_PX, GRID_UNIT_PX, MIN_MARGIN_PX,
    SPACING_VARIANCE_PX,
};

/// Per-check switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutOptions {
    /// Skip the alignment rule for deliberately centred designs.
    pub skip_alignment_check: bool,
    /// Also run the [`rules::WCAG_MIRROR`] rules.
    pub wcag_mirror_pass: bool,
    pub score_formula: LayoutScoreFormula,
}

impl LayoutOptions {
    /// Rule set implied by these options.
    pub fn rule_set(&self) -> RuleSet {
        if self.wcag_mirror_pass {
            RuleSet::standard().with_wcag_mirror()
        } else {
            RuleSet::standard()
        }
    }
}

/// Check one frame with the rule set implied by `options`.
pub fn check_frame(frame: &FrameRecord, options: &LayoutOptions) -> LayoutCheckResult {
    check_frame_with_rules(frame, &options.rule_set(), options)
}

/// Check one frame against an explicit rule set.
pub fn check_frame_with_rules(
    frame: &FrameRecord,
    rule_set: &RuleSet,
    options: &LayoutOptions,
) -> LayoutCheckResult {
    let mut issues = Vec::new();

    for rule in rule_set.rules() {
        match rule.kind {
            RuleKind::Alignment => issues.extend(check_alignment(frame, rule, options)),
            RuleKind::Spacing => issues.extend(check_spacing(frame, rule)),
            RuleKind::GridAlignment => issues.extend(check_grid(frame, rule)),
            RuleKind::Margins => issues.extend(check_margins(frame, rule)),
            RuleKind::Hierarchy => issues.extend(check_hierarchy(frame, rule)),
            RuleKind::Overlap => issues.extend(check_overlaps(frame, rule)),
        }
    }

    METRICS.add_layout_issues(issues.len() as u64);

    LayoutCheckResult {
        score: layout_score(&issues, options.score_formula),
        summary: summarize(&issues),
        issues,
    }
}

/// A text or shape leaf, by id and box.
struct Placed<'a> {
    id: &'a str,
    bounds: &'a BoundingBox,
}

fn placed_children(frame: &FrameRecord) -> Vec<Placed<'_>> {
    let texts = frame.texts.iter().map(|t| Placed {
        id: &t.id,
        bounds: &t.bounds,
    });
    let shapes = frame.shapes.iter().map(|s| Placed {
        id: &s.id,
        bounds: &s.bounds,
    });
    texts.chain(shapes).collect()
}

fn issue(
    rule: &LayoutRule,
    id: String,
    message: String,
    suggestion: &str,
    details: serde_json::Value,
) -> LayoutIssue {
    LayoutIssue {
        id,
        severity: rule.severity,
        message,
        suggestion: suggestion.to_string(),
        confidence: rule.confidence,
        wcag_reference: rule.wcag_reference.map(str::to_string),
        overrideable: rule.overrideable,
        details: Some(details),
    }
}

fn check_alignment(
    frame: &FrameRecord,
    rule: &LayoutRule,
    options: &LayoutOptions,
) -> Option<LayoutIssue> {
    if options.skip_alignment_check || frame.texts.len() < 2 {
        return None;
    }

    if let Some(bounds) = frame.bounds {
        let center = bounds.center_x();
        let all_centered = frame
            .texts
            .iter()
            .all(|t| (t.bounds.center_x() - center).abs() <= CENTER_TOLERANCE_PX);
        if all_centered {
            return None;
        }
    }

    let lefts = frame.texts.iter().map(|t| t.bounds.x);
    let min = lefts.clone().fold(f64::INFINITY, f64::min);
    let max = lefts.fold(f64::NEG_INFINITY, f64::max);
    let spread = max - min;
    if spread <= ALIGNMENT_TOLERANCE_PX {
        return None;
    }

    Some(issue(
        rule,
        rule.id.to_string(),
        format!("Text left edges are spread across {spread:.0}px"),
        "Align text blocks to a shared left edge or column.",
        json!({ "spread": spread, "minX": min, "maxX": max }),
    ))
}

fn check_spacing(frame: &FrameRecord, rule: &LayoutRule) -> Option<LayoutIssue> {
    let mut boxes: Vec<&BoundingBox> = frame.texts.iter().map(|t| &t.bounds).collect();
    boxes.sort_by(|a, b| a.y.total_cmp(&b.y));

    let gaps: Vec<f64> = boxes.windows(2).map(|w| w[1].y - w[0].bottom()).collect();
    if gaps.len() < 2 {
        return None;
    }

    let min = gaps.iter().copied().fold(f64::INFINITY, f64::min);
    let max = gaps.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if max - min <= SPACING_VARIANCE_PX {
        return None;
    }

    Some(issue(
        rule,
        rule.id.to_string(),
        format!("Vertical gaps between text blocks vary from {min:.0}px to {max:.0}px"),
        "Use one spacing scale (multiples of 8px) between stacked text.",
        json!({ "minGap": min, "maxGap": max, "gaps": gaps }),
    ))
}

/// Distance from `value` to the nearest grid line.
fn grid_deviation(value: f64) -> f64 {
    (value - (value / GRID_UNIT_PX).round() * GRID_UNIT_PX).abs()
}

fn check_grid(frame: &FrameRecord, rule: &LayoutRule) -> Option<LayoutIssue> {
    let (ox, oy) = frame.origin();
    let offenders: Vec<&str> = placed_children(frame)
        .into_iter()
        .filter(|p| {
            grid_deviation(p.bounds.x - ox) > GRID_TOLERANCE_PX
                || grid_deviation(p.bounds.y - oy) > GRID_TOLERANCE_PX
        })
        .map(|p| p.id)
        .collect();

    if offenders.is_empty() {
        return None;
    }

    Some(issue(
        rule,
        rule.id.to_string(),
        format!("{} element(s) sit off the {GRID_UNIT_PX:.0}px grid", offenders.len()),
        "Snap element positions to the 8px grid.",
        json!({ "grid": GRID_UNIT_PX, "nodes": offenders }),
    ))
}

fn min_edge_distance(frame: &BoundingBox, child: &BoundingBox) -> f64 {
    let left = child.x - frame.x;
    let top = child.y - frame.y;
    let right = frame.right() - child.right();
    let bottom = frame.bottom() - child.bottom();
    left.min(top).min(right).min(bottom)
}

fn check_margins(frame: &FrameRecord, rule: &LayoutRule) -> Option<LayoutIssue> {
    let bounds = frame.bounds?;
    let offenders: Vec<&str> = placed_children(frame)
        .into_iter()
        .filter(|p| min_edge_distance(&bounds, p.bounds) < MIN_MARGIN_PX)
        .map(|p| p.id)
        .collect();

    if offenders.is_empty() {
        return None;
    }

    Some(issue(
        rule,
        rule.id.to_string(),
        format!(
            "{} element(s) are closer than {MIN_MARGIN_PX:.0}px to the frame edge",
            offenders.len()
        ),
        "Keep at least 16px of margin between content and frame edges.",
        json!({ "minMargin": MIN_MARGIN_PX, "nodes": offenders }),
    ))
}

fn check_hierarchy(frame: &FrameRecord, rule: &LayoutRule) -> Option<LayoutIssue> {
    if frame.texts.is_empty() {
        return None;
    }
    let sizes = frame.distinct_font_sizes();
    if sizes.len() >= 2 {
        return None;
    }

    Some(issue(
        rule,
        rule.id.to_string(),
        "All text uses a single font size".to_string(),
        "Introduce distinct sizes for headings and body text.",
        json!({ "distinctFontSizes": sizes }),
    ))
}

fn check_overlaps(frame: &FrameRecord, rule: &LayoutRule) -> Vec<LayoutIssue> {
    let children = placed_children(frame);
    let mut issues = Vec::new();

    for (i, a) in children.iter().enumerate() {
        for b in &children[i + 1..] {
            if !a.bounds.intersects(b.bounds) {
                continue;
            }
            issues.push(issue(
                rule,
                format!("{}-{}-{}", rule.id, a.id, b.id),
                format!("Elements {} and {} overlap", a.id, b.id),
                "Separate overlapping elements so neither obscures the other.",
                json!({ "first": a.id, "second": b.id }),
            ));
        }
    }

    issues
}
