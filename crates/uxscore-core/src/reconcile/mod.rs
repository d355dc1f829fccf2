//! Score reconciliation across evaluation iterations.
//!
//! An evaluation runs for a fixed number of iterations. At each one, scores
//! proposed by an external evaluator (a [`ScoreCandidate`]) are reconciled
//! with heuristic-derived signals and pulled toward a target that ramps from
//! 50 at the first iteration to 100 at the last.
//!
//! - [`reconcile_scores`]: breakdown-driven overall score with hysteresis and blending
//! - [`normalize_for_iteration`]: banded (raw) or seeded (progressive) category scores
//! - [`seed`]: deterministic smoothing noise

pub mod iteration;
pub mod seed;

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::ReconcileSettings;
use crate::domain::{
    clamp_score, Category, CategoryScores, HeuristicBreakdownItem, HeuristicCode, Result,
    UxScoreError,
};
use crate::heuristics;
use crate::metrics::METRICS;

pub use iteration::{normalize_for_iteration, IterationScores};
pub use seed::SeedKey;

/// How strongly scores are steered toward the iteration target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoringMode {
    /// Candidate scores, kept within a band around the target.
    #[default]
    Raw,
    /// Target plus seeded noise, converging on 100.
    Progressive,
}

impl ScoringMode {
    pub fn as_str(self) -> &'static str {
        match self {
            ScoringMode::Raw => "raw",
            ScoringMode::Progressive => "progressive",
        }
    }
}

impl fmt::Display for ScoringMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScoringMode {
    type Err = UxScoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "raw" => Ok(ScoringMode::Raw),
            "progressive" => Ok(ScoringMode::Progressive),
            other => Err(UxScoreError::InvalidConfig(format!(
                "unknown scoring mode: {other}"
            ))),
        }
    }
}

/// Per-iteration context. One per evaluation pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationSnapshot {
    /// 1-based.
    pub iteration: u32,
    pub total_iterations: u32,
    /// Scores of the same frame at the previous iteration.
    #[serde(default)]
    pub previous: Option<CategoryScores>,
    /// Forbid any category from decreasing between iterations.
    #[serde(default)]
    pub enforce_monotonic: bool,
    pub run_id: String,
    pub frame_id: String,
    #[serde(default)]
    pub image_ref: Option<String>,
}

impl EvaluationSnapshot {
    pub fn new(
        run_id: impl Into<String>,
        frame_id: impl Into<String>,
        iteration: u32,
        total_iterations: u32,
    ) -> Self {
        Self {
            iteration,
            total_iterations,
            previous: None,
            enforce_monotonic: false,
            run_id: run_id.into(),
            frame_id: frame_id.into(),
            image_ref: None,
        }
    }

    pub fn with_previous(mut self, previous: CategoryScores) -> Self {
        self.previous = Some(previous);
        self
    }

    pub fn with_monotonic(mut self, enforce: bool) -> Self {
        self.enforce_monotonic = enforce;
        self
    }

    pub fn with_image_ref(mut self, image_ref: impl Into<String>) -> Self {
        self.image_ref = Some(image_ref.into());
        self
    }

    /// True at or after the last iteration, and for single-iteration runs.
    pub fn is_final(&self) -> bool {
        self.total_iterations <= 1 || self.iteration >= self.total_iterations
    }

    pub fn target(&self) -> f64 {
        target_raw_for_iteration(self.iteration, self.total_iterations)
    }

    pub(crate) fn seed_key(&self, category: Category) -> SeedKey<'_> {
        SeedKey {
            frame_id: &self.frame_id,
            iteration: self.iteration,
            image_ref: self.image_ref.as_deref(),
            run_id: &self.run_id,
            category,
        }
    }
}

/// Scores proposed by an external evaluator for one frame and iteration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreCandidate {
    pub categories: BTreeMap<Category, f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overall: Option<f64>,
    pub heuristic_breakdown: Vec<HeuristicBreakdownItem>,
    /// Direct per-heuristic scores on a 0-100 scale.
    pub heuristic_scores: BTreeMap<HeuristicCode, f64>,
    pub weaknesses: Vec<String>,
    pub suggestions: Vec<String>,
    pub issues: Vec<serde_json::Value>,
}

impl ScoreCandidate {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_category(mut self, category: Category, score: f64) -> Self {
        self.categories.insert(category, score);
        self
    }

    pub fn with_breakdown_item(mut self, item: HeuristicBreakdownItem) -> Self {
        self.heuristic_breakdown.push(item);
        self
    }

    pub fn with_heuristic_score(mut self, code: HeuristicCode, score: f64) -> Self {
        self.heuristic_scores.insert(code, score);
        self
    }
}

/// Linear target ramp: 50 at iteration 1, 100 at the last iteration.
///
/// Single-iteration runs and iterations at or beyond the total target 100.
pub fn target_raw_for_iteration(iteration: u32, total_iterations: u32) -> f64 {
    if total_iterations <= 1 || iteration >= total_iterations {
        return 100.0;
    }
    let step = f64::from(iteration.max(1) - 1);
    50.0 + 50.0 * step / f64::from(total_iterations - 1)
}

/// Intermediate values of one [`reconcile_scores`] call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReconcileTrace {
    pub heuristics_avg: f64,
    pub categories_avg: f64,
    pub combined: f64,
    pub target: f64,
    pub alpha: f64,
    pub blended: f64,
    pub extra_pull_applied: bool,
    /// Overall score after clamping to [0, 100].
    #[serde(rename = "final")]
    pub final_score: u8,
    pub final_iteration: bool,
    pub iteration: u32,
    pub total_iterations: u32,
}

/// Output of [`reconcile_scores`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciledScores {
    /// Categories known after reconciliation; may be partial.
    pub categories: BTreeMap<Category, u8>,
    pub overall: u8,
    /// Breakdown with `max_points` resolved and scores clamped.
    pub breakdown: Vec<HeuristicBreakdownItem>,
    /// Present when a breakdown drove the result.
    pub trace: Option<ReconcileTrace>,
}

impl ReconciledScores {
    /// Full score record; categories absent here take `fill`'s value.
    pub fn to_category_scores(&self, fill: &CategoryScores) -> CategoryScores {
        let mut scores = *fill;
        for category in Category::ALL {
            if let Some(value) = self.categories.get(&category) {
                scores.set(category, *value);
            }
        }
        scores.overall = self.overall;
        scores
    }
}

/// Derive per-category percentages from a normalized breakdown.
///
/// Each item counts toward its heuristic's primary category; a category is
/// the mean of its members' percentages.
pub fn derive_category_percentages(
    breakdown: &[HeuristicBreakdownItem],
) -> BTreeMap<Category, f64> {
    let mut sums: BTreeMap<Category, (f64, usize)> = BTreeMap::new();
    for item in breakdown {
        let entry = sums
            .entry(heuristics::primary_category(item.code))
            .or_insert((0.0, 0));
        entry.0 += item.percent();
        entry.1 += 1;
    }
    sums.into_iter()
        .map(|(category, (sum, n))| (category, sum / n as f64))
        .collect()
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, n) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    (n > 0).then(|| sum / n as f64)
}

/// Reconcile a candidate's scores for one iteration.
///
/// With a heuristic breakdown, category percentages derived from it replace
/// supplied categories only when absent or further away than the hysteresis
/// threshold. The overall score averages the heuristic mean with the
/// category mean, then blends toward the iteration target (progressive mode
/// only). Without a breakdown the overall score is the plain category mean.
pub fn reconcile_scores(
    candidate: &ScoreCandidate,
    snapshot: &EvaluationSnapshot,
    mode: ScoringMode,
    settings: &ReconcileSettings,
) -> ReconciledScores {
    METRICS.inc_iterations_reconciled();

    let mut categories: BTreeMap<Category, f64> = candidate
        .categories
        .iter()
        .filter(|(_, v)| v.is_finite())
        .map(|(c, v)| (*c, v.clamp(0.0, 100.0)))
        .collect();

    if candidate.heuristic_breakdown.is_empty() {
        let overall = mean(categories.values().copied())
            .or(candidate.overall)
            .unwrap_or_else(|| snapshot.target());
        return ReconciledScores {
            categories: to_integer_map(&categories),
            overall: clamp_score(overall),
            breakdown: Vec::new(),
            trace: None,
        };
    }

    let breakdown: Vec<HeuristicBreakdownItem> = candidate
        .heuristic_breakdown
        .iter()
        .map(HeuristicBreakdownItem::normalized)
        .collect();

    for (category, derived) in derive_category_percentages(&breakdown) {
        let replace = match categories.get(&category) {
            None => true,
            Some(existing) => (existing - derived).abs() > settings.hysteresis,
        };
        if replace {
            categories.insert(category, derived);
        }
    }

    let heuristics_avg = mean(breakdown.iter().map(HeuristicBreakdownItem::percent)).unwrap_or(0.0);
    let categories_avg = mean(categories.values().copied()).unwrap_or(heuristics_avg);
    let combined = (heuristics_avg + categories_avg) / 2.0;

    let target = snapshot.target();
    let final_iteration = snapshot.is_final();
    let progressive = mode == ScoringMode::Progressive;
    let alpha = if progressive {
        settings.progressive_alpha
    } else {
        0.0
    };

    let mut blended = (1.0 - alpha) * combined + alpha * target;
    if progressive && final_iteration {
        blended = 100.0;
    }
    let extra_pull_applied =
        progressive && !final_iteration && (blended - target).abs() > settings.pull_threshold;
    if extra_pull_applied {
        blended = (blended + target) / 2.0;
    }

    let final_score = clamp_score(blended);
    let trace = ReconcileTrace {
        heuristics_avg,
        categories_avg,
        combined,
        target,
        alpha,
        blended,
        extra_pull_applied,
        final_score,
        final_iteration,
        iteration: snapshot.iteration,
        total_iterations: snapshot.total_iterations,
    };
    debug!(
        frame_id = %snapshot.frame_id,
        heuristics_avg,
        categories_avg,
        combined,
        target,
        alpha,
        blended,
        extra_pull_applied,
        final_score,
        final_iteration,
        iteration = snapshot.iteration,
        total_iterations = snapshot.total_iterations,
        "reconcile trace"
    );

    ReconciledScores {
        categories: to_integer_map(&categories),
        overall: final_score,
        breakdown,
        trace: Some(trace),
    }
}

fn to_integer_map(categories: &BTreeMap<Category, f64>) -> BTreeMap<Category, u8> {
    categories
        .iter()
        .map(|(c, v)| (*c, clamp_score(*v)))
        .collect()
}
