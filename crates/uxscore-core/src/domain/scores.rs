//! Score types shared by the scorer, the reconciliation engine and the
//! resource selector.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::error::{Result, UxScoreError};

/// The six normalized score dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Accessibility,
    Typography,
    Color,
    Layout,
    Hierarchy,
    Usability,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Accessibility,
        Category::Typography,
        Category::Color,
        Category::Layout,
        Category::Hierarchy,
        Category::Usability,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Accessibility => "accessibility",
            Category::Typography => "typography",
            Category::Color => "color",
            Category::Layout => "layout",
            Category::Hierarchy => "hierarchy",
            Category::Usability => "usability",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Round and clamp a score into `[0, 100]`. Non-finite input maps to 0.
pub fn clamp_score(value: f64) -> u8 {
    if !value.is_finite() {
        return 0;
    }
    value.round().clamp(0.0, 100.0) as u8
}

/// Integer category scores in `[0, 100]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryScores {
    pub accessibility: u8,
    pub typography: u8,
    pub color: u8,
    pub layout: u8,
    pub hierarchy: u8,
    pub usability: u8,
    #[serde(rename = "overall_score")]
    pub overall: u8,
}

impl CategoryScores {
    pub fn get(&self, category: Category) -> u8 {
        match category {
            Category::Accessibility => self.accessibility,
            Category::Typography => self.typography,
            Category::Color => self.color,
            Category::Layout => self.layout,
            Category::Hierarchy => self.hierarchy,
            Category::Usability => self.usability,
        }
    }

    pub fn set(&mut self, category: Category, value: u8) {
        let slot = match category {
            Category::Accessibility => &mut self.accessibility,
            Category::Typography => &mut self.typography,
            Category::Color => &mut self.color,
            Category::Layout => &mut self.layout,
            Category::Hierarchy => &mut self.hierarchy,
            Category::Usability => &mut self.usability,
        };
        *slot = value.min(100);
    }

    /// Build from a (possibly partial) map. Missing categories take `fallback`.
    pub fn from_map(map: &BTreeMap<Category, f64>, overall: u8, fallback: u8) -> Self {
        let mut scores = CategoryScores {
            overall: overall.min(100),
            ..Default::default()
        };
        for category in Category::ALL {
            let value = map.get(&category).map_or(fallback, |v| clamp_score(*v));
            scores.set(category, value);
        }
        scores
    }

    /// The six category values (without `overall`).
    pub fn to_map(&self) -> BTreeMap<Category, f64> {
        Category::ALL
            .into_iter()
            .map(|c| (c, f64::from(self.get(c))))
            .collect()
    }

    /// Plain mean of the six category values.
    pub fn category_mean(&self) -> f64 {
        let sum: f64 = Category::ALL.iter().map(|c| f64::from(self.get(*c))).sum();
        sum / Category::ALL.len() as f64
    }
}

/// One of the ten Nielsen usability heuristics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum HeuristicCode {
    H1,
    H2,
    H3,
    H4,
    H5,
    H6,
    H7,
    H8,
    H9,
    H10,
}

impl HeuristicCode {
    pub const ALL: [HeuristicCode; 10] = [
        HeuristicCode::H1,
        HeuristicCode::H2,
        HeuristicCode::H3,
        HeuristicCode::H4,
        HeuristicCode::H5,
        HeuristicCode::H6,
        HeuristicCode::H7,
        HeuristicCode::H8,
        HeuristicCode::H9,
        HeuristicCode::H10,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            HeuristicCode::H1 => "H1",
            HeuristicCode::H2 => "H2",
            HeuristicCode::H3 => "H3",
            HeuristicCode::H4 => "H4",
            HeuristicCode::H5 => "H5",
            HeuristicCode::H6 => "H6",
            HeuristicCode::H7 => "H7",
            HeuristicCode::H8 => "H8",
            HeuristicCode::H9 => "H9",
            HeuristicCode::H10 => "H10",
        }
    }
}

impl fmt::Display for HeuristicCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HeuristicCode {
    type Err = UxScoreError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_ascii_uppercase();
        HeuristicCode::ALL
            .into_iter()
            .find(|code| code.as_str() == wanted)
            .ok_or_else(|| UxScoreError::InvalidDocument(format!("unknown heuristic code: {s}")))
    }
}

/// Issue and finding severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    /// Weight applied to an issue's confidence when aggregating a layout score.
    pub fn multiplier(self) -> f64 {
        match self {
            Severity::High => 1.0,
            Severity::Medium => 0.6,
            Severity::Low => 0.3,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        })
    }
}

/// Points scale assumed when an item carries no usable `max_points`.
pub const DEFAULT_MAX_POINTS: f64 = 4.0;

/// Per-heuristic score as proposed by an external evaluator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeuristicBreakdownItem {
    pub code: HeuristicCode,
    #[serde(default)]
    pub title: String,
    pub score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_points: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub justification: Option<String>,
}

impl HeuristicBreakdownItem {
    pub fn new(code: HeuristicCode, score: f64) -> Self {
        Self {
            code,
            title: String::new(),
            score,
            max_points: None,
            severity: None,
            justification: None,
        }
    }

    /// `max_points`, or [`DEFAULT_MAX_POINTS`] when absent, non-finite or not positive.
    pub fn effective_max_points(&self) -> f64 {
        match self.max_points {
            Some(max) if max.is_finite() && max > 0.0 => max,
            _ => DEFAULT_MAX_POINTS,
        }
    }

    /// Copy with `max_points` resolved and `score` clamped into `[0, max_points]`.
    pub fn normalized(&self) -> Self {
        let max = self.effective_max_points();
        let score = if self.score.is_finite() {
            self.score.clamp(0.0, max)
        } else {
            0.0
        };
        Self {
            score,
            max_points: Some(max),
            ..self.clone()
        }
    }

    /// Score as a percentage of the item's points scale.
    pub fn percent(&self) -> f64 {
        let item = self.normalized();
        item.score / item.effective_max_points() * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_score_bounds() {
        assert_eq!(clamp_score(-3.0), 0);
        assert_eq!(clamp_score(49.5), 50);
        assert_eq!(clamp_score(130.0), 100);
        assert_eq!(clamp_score(f64::NAN), 0);
    }

    #[test]
    fn test_category_scores_serialize_overall_key() {
        let scores = CategoryScores {
            overall: 77,
            ..Default::default()
        };
        let json = serde_json::to_value(scores).expect("serialize");
        assert_eq!(json["overall_score"], 77);
        assert!(json.get("overall").is_none());
    }

    #[test]
    fn test_category_scores_from_partial_map() {
        let mut map = BTreeMap::new();
        map.insert(Category::Color, 88.4);
        let scores = CategoryScores::from_map(&map, 70, 50);
        assert_eq!(scores.color, 88);
        assert_eq!(scores.layout, 50);
        assert_eq!(scores.overall, 70);
    }

    #[test]
    fn test_category_map_keys_serialize_snake_case() {
        let mut map = BTreeMap::new();
        map.insert(Category::Accessibility, 10.0);
        let json = serde_json::to_string(&map).expect("serialize");
        assert_eq!(json, r#"{"accessibility":10.0}"#);
    }

    #[test]
    fn test_heuristic_code_parse() {
        assert_eq!("h10".parse::<HeuristicCode>().unwrap(), HeuristicCode::H10);
        assert!("H11".parse::<HeuristicCode>().is_err());
    }

    #[test]
    fn test_breakdown_defaults_max_points() {
        let item = HeuristicBreakdownItem {
            max_points: Some(0.0),
            ..HeuristicBreakdownItem::new(HeuristicCode::H1, 9.0)
        };
        let normalized = item.normalized();
        assert_eq!(normalized.max_points, Some(4.0));
        assert_eq!(normalized.score, 4.0);
        assert_eq!(item.percent(), 100.0);
    }

    #[test]
    fn test_breakdown_negative_score_clamped() {
        let item = HeuristicBreakdownItem {
            max_points: Some(10.0),
            ..HeuristicBreakdownItem::new(HeuristicCode::H2, -1.0)
        };
        assert_eq!(item.normalized().score, 0.0);
        assert_eq!(item.percent(), 0.0);
    }

    #[test]
    fn test_severity_multipliers() {
        assert_eq!(Severity::High.multiplier(), 1.0);
        assert_eq!(Severity::Medium.multiplier(), 0.6);
        assert_eq!(Severity::Low.multiplier(), 0.3);
    }
}
