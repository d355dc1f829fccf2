//! uxscore core library
//!
//! Scores a design node tree for usability and accessibility: document
//! normalization, WCAG contrast, layout heuristics, weighted frame scoring
//! and multi-iteration score reconciliation.

pub mod config;
pub mod contrast;
pub mod domain;
pub mod evaluate;
pub mod frame_scorer;
pub mod heuristics;
pub mod layout;
pub mod metrics;
pub mod normalize;
pub mod obs;
pub mod reconcile;
pub mod resources;
pub mod scan;
pub mod telemetry;

pub use config::{EngineConfig, FrameWeights, ReconcileSettings, ScanSettings};

pub use contrast::{
    contrast_ratio, relative_luminance, wcag_level, ContrastPolicy, WcagCurve, WcagLevel,
};

pub use domain::{
    clamp_score, BoundingBox, Category, CategoryScores, Color, HeuristicBreakdownItem,
    HeuristicCode, LayoutCheckResult, LayoutIssue, Node, NodeKind, Result, Severity, UxScoreError,
};

pub use evaluate::{DesignEvaluator, EvaluationReport, EvaluationRequest, FrameEvaluation};
pub use frame_scorer::{FrameScore, FrameScorer, TextJustification};
pub use layout::{check_frame, LayoutOptions, LayoutRule, LayoutScoreFormula, RuleKind, RuleSet};
pub use normalize::{normalize_document, resolve_color, FrameMap, FrameRecord, ShapeNode, TextNode};

pub use reconcile::{
    normalize_for_iteration, reconcile_scores, target_raw_for_iteration, EvaluationSnapshot,
    IterationScores, ReconcileTrace, ReconciledScores, ScoreCandidate, ScoringMode,
};

pub use resources::{low_heuristics, select_resources, Resource, ResourceKind};
pub use scan::{
    detect_interactive_elements, scan_all, BlockingPoolScanner, DetectedElements,
    InteractiveElement, ScanError, SubtreeScanner,
};
pub use telemetry::{init_tracing, LogFormat};

/// Crate version, embedded in CLI reports.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
