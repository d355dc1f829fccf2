//! Heuristic weight model.
//!
//! Static table of the ten Nielsen heuristics. Each heuristic has a primary
//! category (used when deriving category scores from a breakdown) and a row
//! of category weights summing to 1.0 (used when projecting heuristic scores
//! onto categories).

use std::collections::BTreeMap;

use crate::domain::{Category, HeuristicCode};

use Category::{Accessibility, Color, Hierarchy, Layout, Typography, Usability};

/// Static description of one heuristic.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeuristicDef {
    pub code: HeuristicCode,
    pub title: &'static str,
    pub primary: Category,
    pub weights: &'static [(Category, f64)],
}

pub static HEURISTICS: [HeuristicDef; 10] = [
    HeuristicDef {
        code: HeuristicCode::H1,
        title: "Visibility of system status",
        primary: Accessibility,
        weights: &[(Accessibility, 0.6), (Color, 0.2), (Hierarchy, 0.2)],
    },
    HeuristicDef {
        code: HeuristicCode::H2,
        title: "Match between system and the real world",
        primary: Usability,
        weights: &[(Usability, 0.7), (Typography, 0.3)],
    },
    HeuristicDef {
        code: HeuristicCode::H3,
        title: "User control and freedom",
        primary: Layout,
        weights: &[(Layout, 0.6), (Usability, 0.4)],
    },
    HeuristicDef {
        code: HeuristicCode::H4,
        title: "Consistency and standards",
        primary: Usability,
        weights: &[(Usability, 0.5), (Typography, 0.25), (Color, 0.25)],
    },
    HeuristicDef {
        code: HeuristicCode::H5,
        title: "Error prevention",
        primary: Usability,
        weights: &[(Usability, 0.8), (Accessibility, 0.2)],
    },
    HeuristicDef {
        code: HeuristicCode::H6,
        title: "Recognition rather than recall",
        primary: Layout,
        weights: &[(Layout, 0.6), (Hierarchy, 0.4)],
    },
    HeuristicDef {
        code: HeuristicCode::H7,
        title: "Flexibility and efficiency of use",
        primary: Usability,
        weights: &[(Usability, 1.0)],
    },
    HeuristicDef {
        code: HeuristicCode::H8,
        title: "Aesthetic and minimalist design",
        primary: Usability,
        weights: &[(Usability, 0.4), (Color, 0.3), (Typography, 0.3)],
    },
    HeuristicDef {
        code: HeuristicCode::H9,
        title: "Help users recognize, diagnose, and recover from errors",
        primary: Accessibility,
        weights: &[(Accessibility, 0.7), (Typography, 0.3)],
    },
    HeuristicDef {
        code: HeuristicCode::H10,
        title: "Help and documentation",
        primary: Hierarchy,
        weights: &[(Hierarchy, 0.7), (Usability, 0.3)],
    },
];

pub fn definition(code: HeuristicCode) -> &'static HeuristicDef {
    // HEURISTICS is ordered like HeuristicCode::ALL.
    &HEURISTICS[code as usize]
}

pub fn title(code: HeuristicCode) -> &'static str {
    definition(code).title
}

pub fn primary_category(code: HeuristicCode) -> Category {
    definition(code).primary
}

/// Heuristics whose primary category is `category`, in code order.
pub fn members_of(category: Category) -> Vec<HeuristicCode> {
    HEURISTICS
        .iter()
        .filter(|def| def.primary == category)
        .map(|def| def.code)
        .collect()
}

/// Weighted projection of heuristic scores onto categories.
///
/// For each category, the weighted mean of the supplied heuristic scores
/// that carry a weight for it. Categories no supplied heuristic touches are
/// absent from the result.
pub fn project_to_categories(scores: &BTreeMap<HeuristicCode, f64>) -> BTreeMap<Category, f64> {
    let mut sums: BTreeMap<Category, (f64, f64)> = BTreeMap::new();
    for (code, score) in scores {
        if !score.is_finite() {
            continue;
        }
        for (category, weight) in definition(*code).weights {
            let entry = sums.entry(*category).or_insert((0.0, 0.0));
            entry.0 += weight * score;
            entry.1 += weight;
        }
    }
    sums.into_iter()
        .filter(|(_, (_, w))| *w > 0.0)
        .map(|(c, (sum, w))| (c, sum / w))
        .collect()
}
