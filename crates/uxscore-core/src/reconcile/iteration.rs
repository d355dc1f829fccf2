//! Category-only normalization for one iteration.
//!
//! Raw mode keeps candidate scores but confines them to a band around the
//! iteration target. Progressive mode ignores candidate categories and
//! emits the target plus seeded noise, nudged by heuristic scores when the
//! candidate carries them. Both modes then cap how far a category may fall
//! since the previous iteration.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::ReconcileSettings;
use crate::domain::{clamp_score, Category, CategoryScores};
use crate::heuristics::project_to_categories;
use crate::metrics::METRICS;
use crate::reconcile::{EvaluationSnapshot, ScoreCandidate, ScoringMode};

/// Output of [`normalize_for_iteration`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IterationScores {
    pub scores: CategoryScores,
    pub weaknesses: Vec<String>,
    pub suggestions: Vec<String>,
    pub issues: Vec<serde_json::Value>,
}

/// Normalize the six category scores of `candidate` for `snapshot`'s iteration.
///
/// The overall score is the rounded mean of the six results. At the final
/// iteration raw mode clears weaknesses, suggestions and issues; progressive
/// mode clears weaknesses and issues.
pub fn normalize_for_iteration(
    candidate: &ScoreCandidate,
    snapshot: &EvaluationSnapshot,
    mode: ScoringMode,
    settings: &ReconcileSettings,
) -> IterationScores {
    METRICS.inc_iterations_reconciled();

    let target = snapshot.target();
    let final_iteration = snapshot.is_final();

    let mut scores = CategoryScores::default();
    match mode {
        ScoringMode::Raw => {
            for category in Category::ALL {
                let value = candidate
                    .categories
                    .get(&category)
                    .copied()
                    .filter(|v| v.is_finite())
                    .unwrap_or(target);
                let banded = clamp_to_band(value, target, settings);
                scores.set(category, limit_drop(clamp_score(banded), category, snapshot, settings));
            }
        }
        ScoringMode::Progressive => {
            let amplitude = amplitude_for_iteration(snapshot, settings);
            let signals = heuristic_signals(candidate);
            for category in Category::ALL {
                let noise = snapshot.seed_key(category).noise(amplitude);
                let adjustment = signals.get(&category).map_or(0.0, |h| {
                    ((h - 50.0) / 50.0).clamp(-1.0, 1.0) * 3.0 * amplitude / 2.0
                });
                let mut value = target + noise + adjustment;
                if final_iteration {
                    value = value.max(settings.final_floor);
                }
                scores.set(category, limit_drop(clamp_score(value), category, snapshot, settings));
            }
        }
    }
    scores.overall = clamp_score(scores.category_mean());

    let mut out = IterationScores {
        scores,
        weaknesses: candidate.weaknesses.clone(),
        suggestions: candidate.suggestions.clone(),
        issues: candidate.issues.clone(),
    };
    if final_iteration {
        out.weaknesses.clear();
        out.issues.clear();
        if mode == ScoringMode::Raw {
            out.suggestions.clear();
        }
    }
    out
}

/// Push values outside `target ± band_radius` back inside by `band_inset`.
fn clamp_to_band(value: f64, target: f64, settings: &ReconcileSettings) -> f64 {
    let band_min = (target - settings.band_radius).max(0.0);
    let band_max = (target + settings.band_radius).min(100.0);
    if value < band_min {
        band_min + settings.band_inset
    } else if value > band_max {
        band_max - settings.band_inset
    } else {
        value
    }
}

/// Apply the max-drop rule, or forbid any drop under monotonic enforcement.
fn limit_drop(
    value: u8,
    category: Category,
    snapshot: &EvaluationSnapshot,
    settings: &ReconcileSettings,
) -> u8 {
    let Some(previous) = snapshot.previous.map(|p| p.get(category)) else {
        return value;
    };
    let floor = if snapshot.enforce_monotonic {
        previous
    } else {
        previous.saturating_sub(settings.max_drop)
    };
    value.max(floor)
}

/// Apply [`limit_drop`] to every category and to the overall score.
///
/// Used for scores that came out of [`reconcile_scores`](super::reconcile_scores),
/// which does not look at the previous iteration.
pub(crate) fn floor_against_previous(
    scores: &mut CategoryScores,
    snapshot: &EvaluationSnapshot,
    settings: &ReconcileSettings,
) {
    let Some(previous) = snapshot.previous else {
        return;
    };
    for category in Category::ALL {
        let floored = limit_drop(scores.get(category), category, snapshot, settings);
        scores.set(category, floored);
    }
    let overall_floor = if snapshot.enforce_monotonic {
        previous.overall
    } else {
        previous.overall.saturating_sub(settings.max_drop)
    };
    scores.overall = scores.overall.max(overall_floor);
}

/// Smoothing amplitude, shrinking linearly across iterations.
pub fn amplitude_for_iteration(snapshot: &EvaluationSnapshot, settings: &ReconcileSettings) -> f64 {
    let total = snapshot.total_iterations;
    if total <= 1 {
        return settings.amplitude_end;
    }
    let step = f64::from(snapshot.iteration.clamp(1, total) - 1);
    let progress = step / f64::from(total - 1);
    settings.amplitude_start + (settings.amplitude_end - settings.amplitude_start) * progress
}

/// Heuristic signal per category, projected through the weight table.
///
/// Categories no supplied heuristic touches use the mean of all supplied
/// heuristic scores. Empty when the candidate has none.
fn heuristic_signals(candidate: &ScoreCandidate) -> BTreeMap<Category, f64> {
    let finite: BTreeMap<_, _> = candidate
        .heuristic_scores
        .iter()
        .filter(|(_, v)| v.is_finite())
        .map(|(k, v)| (*k, *v))
        .collect();
    if finite.is_empty() {
        return BTreeMap::new();
    }
    let mean = finite.values().sum::<f64>() / finite.len() as f64;
    let projected = project_to_categories(&finite);
    Category::ALL
        .into_iter()
        .map(|c| (c, projected.get(&c).copied().unwrap_or(mean)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::HeuristicCode;

    fn settings() -> ReconcileSettings {
        ReconcileSettings::default()
    }

    fn uniform(value: f64) -> ScoreCandidate {
        let mut candidate = ScoreCandidate::default();
        for category in Category::ALL {
            candidate.categories.insert(category, value);
        }
        candidate
    }

    #[test]
    fn test_raw_band_pushes_low_values_up() {
        // target 50 -> band [20, 80]; 5 is below -> 35
        let out = normalize_for_iteration(
            &uniform(5.0),
            &EvaluationSnapshot::new("r", "f", 1, 5),
            ScoringMode::Raw,
            &settings(),
        );
        assert_eq!(out.scores.color, 35);
        assert_eq!(out.scores.overall, 35);
    }

    #[test]
    fn test_raw_band_pulls_high_values_down() {
        // target 50 -> band [20, 80]; 95 is above -> 65
        let out = normalize_for_iteration(
            &uniform(95.0),
            &EvaluationSnapshot::new("r", "f", 1, 5),
            ScoringMode::Raw,
            &settings(),
        );
        assert_eq!(out.scores.layout, 65);
    }

    #[test]
    fn test_raw_values_in_band_untouched() {
        let out = normalize_for_iteration(
            &uniform(61.0),
            &EvaluationSnapshot::new("r", "f", 1, 5),
            ScoringMode::Raw,
            &settings(),
        );
        assert_eq!(out.scores.hierarchy, 61);
    }

    #[test]
    fn test_max_drop_without_monotonic() {
        let previous = CategoryScores {
            color: 80,
            ..Default::default()
        };
        let snapshot = EvaluationSnapshot::new("r", "f", 2, 5).with_previous(previous);
        let out = normalize_for_iteration(&uniform(50.0), &snapshot, ScoringMode::Raw, &settings());
        assert_eq!(out.scores.color, 70);
        assert_eq!(out.scores.typography, 50);
    }

    #[test]
    fn test_monotonic_never_drops() {
        let previous = CategoryScores {
            color: 80,
            ..Default::default()
        };
        let snapshot = EvaluationSnapshot::new("r", "f", 2, 5)
            .with_previous(previous)
            .with_monotonic(true);
        let out = normalize_for_iteration(&uniform(50.0), &snapshot, ScoringMode::Raw, &settings());
        assert_eq!(out.scores.color, 80);
    }

    #[test]
    fn test_raw_final_clears_all_lists() {
        let mut candidate = uniform(90.0);
        candidate.weaknesses = vec!["w".into()];
        candidate.suggestions = vec!["s".into()];
        candidate.issues = vec![serde_json::json!({"id": "i"})];
        let out = normalize_for_iteration(
            &candidate,
            &EvaluationSnapshot::new("r", "f", 3, 3),
            ScoringMode::Raw,
            &settings(),
        );
        assert!(out.weaknesses.is_empty());
        assert!(out.suggestions.is_empty());
        assert!(out.issues.is_empty());
    }

    #[test]
    fn test_progressive_final_floor_keeps_suggestions() {
        let mut candidate = ScoreCandidate::default();
        candidate.weaknesses = vec!["w".into()];
        candidate.suggestions = vec!["s".into()];
        let out = normalize_for_iteration(
            &candidate,
            &EvaluationSnapshot::new("r", "f", 4, 4),
            ScoringMode::Progressive,
            &settings(),
        );
        for category in Category::ALL {
            assert!(out.scores.get(category) >= 95, "{category}");
        }
        assert!(out.weaknesses.is_empty());
        assert_eq!(out.suggestions, vec!["s".to_string()]);
    }

    #[test]
    fn test_progressive_stays_near_target() {
        let snapshot = EvaluationSnapshot::new("r", "f", 1, 5).with_image_ref("img");
        let out = normalize_for_iteration(
            &ScoreCandidate::default(),
            &snapshot,
            ScoringMode::Progressive,
            &settings(),
        );
        for category in Category::ALL {
            let v = f64::from(out.scores.get(category));
            assert!((44.0..=56.0).contains(&v), "{category} = {v}");
        }
    }

    #[test]
    fn test_progressive_heuristic_adjustment_direction() {
        let snapshot = EvaluationSnapshot::new("r", "f", 2, 5);
        let high = ScoreCandidate::default().with_heuristic_score(HeuristicCode::H7, 100.0);
        let low = ScoreCandidate::default().with_heuristic_score(HeuristicCode::H7, 0.0);
        let up = normalize_for_iteration(&high, &snapshot, ScoringMode::Progressive, &settings());
        let down = normalize_for_iteration(&low, &snapshot, ScoringMode::Progressive, &settings());
        // amplitude 5 at iteration 2 of 5: adjustment is +/-7.5
        let diff = i32::from(up.scores.usability) - i32::from(down.scores.usability);
        assert!((14..=16).contains(&diff), "diff = {diff}");
    }

    #[test]
    fn test_amplitude_ramp() {
        let s = settings();
        assert_eq!(amplitude_for_iteration(&EvaluationSnapshot::new("r", "f", 1, 5), &s), 6.0);
        assert_eq!(amplitude_for_iteration(&EvaluationSnapshot::new("r", "f", 5, 5), &s), 2.0);
        assert_eq!(amplitude_for_iteration(&EvaluationSnapshot::new("r", "f", 3, 5), &s), 4.0);
        assert_eq!(amplitude_for_iteration(&EvaluationSnapshot::new("r", "f", 1, 1), &s), 2.0);
    }

    #[test]
    fn test_deterministic() {
        let snapshot = EvaluationSnapshot::new("run-7", "1:4", 2, 4).with_image_ref("img-9");
        let candidate = uniform(40.0).with_heuristic_score(HeuristicCode::H2, 70.0);
        for mode in [ScoringMode::Raw, ScoringMode::Progressive] {
            let a = normalize_for_iteration(&candidate, &snapshot, mode, &settings());
            let b = normalize_for_iteration(&candidate, &snapshot, mode, &settings());
            assert_eq!(a, b);
        }
    }
}
