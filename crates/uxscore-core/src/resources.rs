//! Learning resources for low-scoring heuristics.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use serde::{Deserialize, Serialize};

use crate::domain::{HeuristicBreakdownItem, HeuristicCode};
use crate::heuristics;
use crate::obs;

/// Explicit heuristic scores below this are low.
pub const LOW_SCORE_THRESHOLD: f64 = 55.0;
/// Breakdown items scoring at or below this many raw points are low.
pub const LOW_POINTS_THRESHOLD: f64 = 2.0;
/// Most resources returned by [`select_resources`].
pub const MAX_RESOURCES: usize = 10;
/// Low heuristics needed before the general usability primer is added.
pub const PRIMER_MIN_LOW: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Generic,
    Accessibility,
    Principles,
    UxLaw,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    pub title: String,
    pub url: String,
    pub kind: ResourceKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub heuristics: Vec<HeuristicCode>,
}

impl Resource {
    fn curated(title: &str, url: &str, kind: ResourceKind) -> Self {
        Self {
            title: title.to_string(),
            url: url.to_string(),
            kind,
            reason: None,
            heuristics: Vec::new(),
        }
    }

    fn citing(mut self, reason: String, heuristics: Vec<HeuristicCode>) -> Self {
        self.reason = Some(reason);
        self.heuristics = heuristics;
        self
    }
}

const GENERIC: [(&str, &str); 5] = [
    (
        "10 Usability Heuristics for User Interface Design",
        "https://www.nngroup.com/articles/ten-usability-heuristics/",
    ),
    ("Laws of UX", "https://lawsofux.com/"),
    ("Material Design 3", "https://m3.material.io/"),
    (
        "Apple Human Interface Guidelines",
        "https://developer.apple.com/design/human-interface-guidelines/",
    ),
    (
        "Smashing Magazine: UX Design",
        "https://www.smashingmagazine.com/category/ux-design/",
    ),
];

const WCAG_QUICKREF: (&str, &str) = (
    "How to Meet WCAG (Quick Reference)",
    "https://www.w3.org/WAI/WCAG22/quickref/",
);

const USABILITY_PRIMER: (&str, &str) = (
    "Usability 101: Introduction to Usability",
    "https://www.nngroup.com/articles/usability-101-introduction-to-usability/",
);

/// UX law resource per heuristic, in the order they are offered.
const UX_LAWS: [(HeuristicCode, &str, &str); 4] = [
    (HeuristicCode::H7, "Hick's Law", "https://lawsofux.com/hicks-law/"),
    (HeuristicCode::H3, "Jakob's Law", "https://lawsofux.com/jakobs-law/"),
    (
        HeuristicCode::H8,
        "Aesthetic-Usability Effect",
        "https://lawsofux.com/aesthetic-usability-effect/",
    ),
    (HeuristicCode::H5, "Postel's Law", "https://lawsofux.com/postels-law/"),
];

/// Heuristics flagged low by either an explicit score or a breakdown item.
pub fn low_heuristics(
    scores: &BTreeMap<HeuristicCode, f64>,
    breakdown: &[HeuristicBreakdownItem],
) -> BTreeSet<HeuristicCode> {
    let mut low: BTreeSet<HeuristicCode> = scores
        .iter()
        .filter(|(_, score)| **score < LOW_SCORE_THRESHOLD)
        .map(|(code, _)| *code)
        .collect();
    // Raw points, read as a 0-4 scale whatever `max_points` says.
    for item in breakdown {
        if item.normalized().score <= LOW_POINTS_THRESHOLD {
            low.insert(item.code);
        }
    }
    low
}

/// Curated resources for a set of heuristic results.
///
/// The generic resources come first, then accessibility, the usability
/// primer and per-heuristic UX laws as flagged. Deduplicated by URL and
/// capped at [`MAX_RESOURCES`], in insertion order.
pub fn select_resources(
    scores: &BTreeMap<HeuristicCode, f64>,
    breakdown: &[HeuristicBreakdownItem],
) -> Vec<Resource> {
    let low = low_heuristics(scores, breakdown);
    let mut candidates: Vec<Resource> = GENERIC
        .iter()
        .map(|(title, url)| Resource::curated(title, url, ResourceKind::Generic))
        .collect();

    let accessibility: Vec<HeuristicCode> = low
        .iter()
        .copied()
        .filter(|c| matches!(c, HeuristicCode::H1 | HeuristicCode::H9))
        .collect();
    if !accessibility.is_empty() {
        let cited = join_codes(&accessibility);
        candidates.push(
            Resource::curated(WCAG_QUICKREF.0, WCAG_QUICKREF.1, ResourceKind::Accessibility)
                .citing(format!("Low scores on {cited}"), accessibility),
        );
    }

    if low.len() >= PRIMER_MIN_LOW {
        let flagged: Vec<HeuristicCode> = low.iter().copied().collect();
        let names: Vec<&str> = flagged.iter().map(|c| heuristics::title(*c)).collect();
        candidates.push(
            Resource::curated(USABILITY_PRIMER.0, USABILITY_PRIMER.1, ResourceKind::Principles)
                .citing(format!("Low scores on: {}", names.join("; ")), flagged),
        );
    }

    for (code, title, url) in UX_LAWS.iter().filter(|(code, _, _)| low.contains(code)) {
        candidates.push(
            Resource::curated(title, url, ResourceKind::UxLaw).citing(
                format!("Related to {code}: {}", heuristics::title(*code)),
                vec![*code],
            ),
        );
    }

    let mut seen = HashSet::new();
    let selected: Vec<Resource> = candidates
        .into_iter()
        .filter(|r| seen.insert(r.url.clone()))
        .take(MAX_RESOURCES)
        .collect();

    obs::emit_resources_selected(selected.len(), low.len());
    selected
}

fn join_codes(codes: &[HeuristicCode]) -> String {
    codes
        .iter()
        .map(|c| c.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scores(pairs: &[(HeuristicCode, f64)]) -> BTreeMap<HeuristicCode, f64> {
        pairs.iter().copied().collect()
    }

    #[test]
    fn test_no_low_heuristics_gives_generic_only() {
        let out = select_resources(&scores(&[(HeuristicCode::H1, 90.0)]), &[]);
        assert_eq!(out.len(), 5);
        assert!(out.iter().all(|r| r.kind == ResourceKind::Generic));
    }

    #[test]
    fn test_low_threshold_is_strict() {
        let low = low_heuristics(
            &scores(&[(HeuristicCode::H2, 55.0), (HeuristicCode::H3, 54.9)]),
            &[],
        );
        assert_eq!(low.into_iter().collect::<Vec<_>>(), vec![HeuristicCode::H3]);
    }

    #[test]
    fn test_breakdown_points_flag_low() {
        let breakdown = vec![
            HeuristicBreakdownItem::new(HeuristicCode::H4, 2.0),
            HeuristicBreakdownItem::new(HeuristicCode::H5, 3.0),
        ];
        let low = low_heuristics(&BTreeMap::new(), &breakdown);
        assert!(low.contains(&HeuristicCode::H4));
        assert!(!low.contains(&HeuristicCode::H5));
    }

    #[test]
    fn test_accessibility_resource_cites_codes() {
        let out = select_resources(&scores(&[(HeuristicCode::H9, 10.0)]), &[]);
        let wcag = out
            .iter()
            .find(|r| r.kind == ResourceKind::Accessibility)
            .expect("wcag resource");
        assert_eq!(wcag.heuristics, vec![HeuristicCode::H9]);
        assert!(wcag.reason.as_deref().unwrap_or_default().contains("H9"));
    }

    #[test]
    fn test_primer_needs_three_low() {
        let two = select_resources(
            &scores(&[(HeuristicCode::H2, 10.0), (HeuristicCode::H4, 10.0)]),
            &[],
        );
        assert!(!two.iter().any(|r| r.kind == ResourceKind::Principles));

        let three = select_resources(
            &scores(&[
                (HeuristicCode::H2, 10.0),
                (HeuristicCode::H4, 10.0),
                (HeuristicCode::H6, 10.0),
            ]),
            &[],
        );
        let primer = three
            .iter()
            .find(|r| r.kind == ResourceKind::Principles)
            .expect("primer");
        assert!(primer
            .reason
            .as_deref()
            .unwrap_or_default()
            .contains("Consistency and standards"));
    }

    #[test]
    fn test_ux_laws_per_flagged_heuristic() {
        let out = select_resources(
            &scores(&[(HeuristicCode::H7, 0.0), (HeuristicCode::H3, 0.0)]),
            &[],
        );
        let laws: Vec<&str> = out
            .iter()
            .filter(|r| r.kind == ResourceKind::UxLaw)
            .map(|r| r.title.as_str())
            .collect();
        assert_eq!(laws, vec!["Hick's Law", "Jakob's Law"]);
    }

    #[test]
    fn test_cap_drops_last_ux_law() {
        let all: BTreeMap<_, _> = HeuristicCode::ALL.iter().map(|c| (*c, 0.0)).collect();
        let laws: Vec<String> = select_resources(&all, &[])
            .into_iter()
            .filter(|r| r.kind == ResourceKind::UxLaw)
            .map(|r| r.title)
            .collect();
        assert_eq!(
            laws,
            vec!["Hick's Law", "Jakob's Law", "Aesthetic-Usability Effect"]
        );
    }

    #[test]
    fn test_all_low_is_capped_and_unique() {
        let all: BTreeMap<_, _> = HeuristicCode::ALL.iter().map(|c| (*c, 0.0)).collect();
        let out = select_resources(&all, &[]);
        assert_eq!(out.len(), MAX_RESOURCES);
        let urls: HashSet<_> = out.iter().map(|r| r.url.as_str()).collect();
        assert_eq!(urls.len(), out.len());
        assert_eq!(out[0].kind, ResourceKind::Generic);
    }
}
