//! End-to-end evaluation of a design document.
//!
//! Normalizer -> frame scorer + layout checker -> reconciliation -> resource
//! selector. [`DesignEvaluator::evaluate`] detects interactive elements
//! inline; [`DesignEvaluator::evaluate_concurrent`] sends each frame's
//! subtree through a [`SubtreeScanner`] first.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::config::EngineConfig;
use crate::domain::{
    Category, CategoryScores, HeuristicBreakdownItem, LayoutCheckResult, Node, Result,
};
use crate::frame_scorer::{FrameScore, FrameScorer};
use crate::layout;
use crate::normalize::{normalize_document, FrameRecord};
use crate::obs::{self, EvaluationSpan};
use crate::reconcile::iteration::floor_against_previous;
use crate::reconcile::{
    normalize_for_iteration, reconcile_scores, EvaluationSnapshot, ReconcileTrace,
    ScoreCandidate, ScoringMode,
};
use crate::resources::{select_resources, Resource};
use crate::scan::{detect_interactive_elements, scan_all, InteractiveElement, SubtreeScanner};

/// Inputs of one evaluation pass besides the document itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationRequest {
    pub run_id: String,
    /// 1-based.
    pub iteration: u32,
    pub total_iterations: u32,
    #[serde(default)]
    pub mode: ScoringMode,
    #[serde(default)]
    pub enforce_monotonic: bool,
    #[serde(default)]
    pub image_ref: Option<String>,
    /// Scores proposed by an external evaluator, applied to every frame.
    #[serde(default)]
    pub candidate: ScoreCandidate,
    /// Scores from the previous iteration, by frame id.
    #[serde(default)]
    pub previous: BTreeMap<String, CategoryScores>,
}

impl EvaluationRequest {
    pub fn new(run_id: impl Into<String>, iteration: u32, total_iterations: u32) -> Self {
        Self {
            run_id: run_id.into(),
            iteration,
            total_iterations,
            mode: ScoringMode::default(),
            enforce_monotonic: false,
            image_ref: None,
            candidate: ScoreCandidate::default(),
            previous: BTreeMap::new(),
        }
    }

    pub fn with_mode(mut self, mode: ScoringMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_candidate(mut self, candidate: ScoreCandidate) -> Self {
        self.candidate = candidate;
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

    pub fn with_previous(mut self, frame_id: impl Into<String>, scores: CategoryScores) -> Self {
        self.previous.insert(frame_id.into(), scores);
        self
    }

    fn snapshot_for(&self, frame_id: &str) -> EvaluationSnapshot {
        EvaluationSnapshot {
            iteration: self.iteration,
            total_iterations: self.total_iterations,
            previous: self.previous.get(frame_id).copied(),
            enforce_monotonic: self.enforce_monotonic,
            run_id: self.run_id.clone(),
            frame_id: frame_id.to_string(),
            image_ref: self.image_ref.clone(),
        }
    }
}

/// Result for one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameEvaluation {
    pub frame_id: String,
    pub frame_name: String,
    /// Reconciled scores for this iteration.
    pub scores: CategoryScores,
    pub frame_score: FrameScore,
    pub layout: LayoutCheckResult,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub heuristic_breakdown: Vec<HeuristicBreakdownItem>,
    pub weaknesses: Vec<String>,
    pub suggestions: Vec<String>,
    pub issues: Vec<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace: Option<ReconcileTrace>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub run_id: String,
    pub iteration: u32,
    pub total_iterations: u32,
    pub mode: ScoringMode,
    pub frames: Vec<FrameEvaluation>,
    pub resources: Vec<Resource>,
}

impl EvaluationReport {
    pub fn frame(&self, frame_id: &str) -> Option<&FrameEvaluation> {
        self.frames.iter().find(|f| f.frame_id == frame_id)
    }

    /// Scores keyed by frame id, shaped for the next iteration's `previous`.
    pub fn scores_by_frame(&self) -> BTreeMap<String, CategoryScores> {
        self.frames
            .iter()
            .map(|f| (f.frame_id.clone(), f.scores))
            .collect()
    }
}

pub struct DesignEvaluator {
    config: EngineConfig,
    scorer: FrameScorer,
}

impl Default for DesignEvaluator {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl DesignEvaluator {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            scorer: FrameScorer::from_config(&config),
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Evaluate every top-level frame of `document`.
    #[instrument(skip_all, fields(run_id = %request.run_id, iteration = request.iteration))]
    pub fn evaluate(&self, document: &Node, request: &EvaluationRequest) -> EvaluationReport {
        let frames = normalize_document(document);
        let evaluations = frames
            .values()
            .map(|frame| {
                let elements = detect_interactive_elements(&frame.raw);
                self.evaluate_frame(frame, elements, request)
            })
            .collect();
        self.report(request, evaluations)
    }

    /// Like [`evaluate`](Self::evaluate), with detection dispatched to `scanner`.
    ///
    /// Any failed scan fails the whole pass.
    #[instrument(skip_all, fields(run_id = %request.run_id, iteration = request.iteration))]
    pub async fn evaluate_concurrent(
        &self,
        document: &Node,
        request: &EvaluationRequest,
        scanner: &dyn SubtreeScanner,
    ) -> Result<EvaluationReport> {
        let frames = normalize_document(document);
        let subtrees = frames.values().map(|f| Arc::clone(&f.raw)).collect();
        let scans = scan_all(scanner, subtrees).await;

        let mut evaluations = Vec::with_capacity(frames.len());
        for (frame, scan) in frames.values().zip(scans) {
            let detected = scan?;
            evaluations.push(self.evaluate_frame(frame, detected.elements, request));
        }
        Ok(self.report(request, evaluations))
    }

    fn report(&self, request: &EvaluationRequest, frames: Vec<FrameEvaluation>) -> EvaluationReport {
        let resources = select_resources(
            &request.candidate.heuristic_scores,
            &request.candidate.heuristic_breakdown,
        );
        EvaluationReport {
            run_id: request.run_id.clone(),
            iteration: request.iteration,
            total_iterations: request.total_iterations,
            mode: request.mode,
            frames,
            resources,
        }
    }

    fn evaluate_frame(
        &self,
        frame: &FrameRecord,
        elements: Vec<InteractiveElement>,
        request: &EvaluationRequest,
    ) -> FrameEvaluation {
        let _span = EvaluationSpan::enter(&request.run_id, &frame.id);

        let frame_score = self.scorer.score_with_elements(frame, elements);
        obs::emit_frame_scored(&frame.id, frame_score.overall, frame.texts.len());

        let layout = layout::check_frame(frame, &self.config.layout);
        obs::emit_layout_checked(&frame.id, layout.score, layout.issues.len());

        let measured = frame_score.category_scores();
        let candidate = with_measured_categories(&request.candidate, &measured);
        let snapshot = request.snapshot_for(&frame.id);
        let settings = &self.config.reconcile;

        let (scores, heuristic_breakdown, weaknesses, suggestions, issues, trace) =
            if candidate.heuristic_breakdown.is_empty() && request.total_iterations > 1 {
                let normalized =
                    normalize_for_iteration(&candidate, &snapshot, request.mode, settings);
                (
                    normalized.scores,
                    Vec::new(),
                    normalized.weaknesses,
                    normalized.suggestions,
                    normalized.issues,
                    None,
                )
            } else {
                let reconciled = reconcile_scores(&candidate, &snapshot, request.mode, settings);
                let mut scores = reconciled.to_category_scores(&measured);
                floor_against_previous(&mut scores, &snapshot, settings);
                (
                    scores,
                    reconciled.breakdown,
                    candidate.weaknesses,
                    candidate.suggestions,
                    candidate.issues,
                    reconciled.trace,
                )
            };

        obs::emit_iteration_reconciled(
            &frame.id,
            request.iteration,
            request.total_iterations,
            request.mode.as_str(),
            scores.overall,
        );

        FrameEvaluation {
            frame_id: frame.id.clone(),
            frame_name: frame.name.clone(),
            scores,
            frame_score,
            layout,
            heuristic_breakdown,
            weaknesses,
            suggestions,
            issues,
            trace,
        }
    }
}

/// Candidate with categories it does not propose taken from measurement.
fn with_measured_categories(candidate: &ScoreCandidate, measured: &CategoryScores) -> ScoreCandidate {
    let mut merged = candidate.clone();
    for category in Category::ALL {
        merged
            .categories
            .entry(category)
            .or_insert_with(|| f64::from(measured.get(category)));
    }
    merged
}
