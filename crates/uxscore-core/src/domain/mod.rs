//! Domain models for uxscore.
//!
//! - `Node`: the design tree handed to the engine
//! - `CategoryScores`, `HeuristicBreakdownItem`: score contracts
//! - `LayoutIssue`, `LayoutCheckResult`: layout findings
//! - `UxScoreError`: error taxonomy

pub mod error;
pub mod issue;
pub mod node;
pub mod scores;

pub use error::{Result, UxScoreError};
pub use issue::{LayoutCheckResult, LayoutIssue};
pub use node::{BoundingBox, Color, Node, NodeKind, Paint, PaintKind, TextStyle};
pub use scores::{
    clamp_score, Category, CategoryScores, HeuristicBreakdownItem, HeuristicCode, Severity,
    DEFAULT_MAX_POINTS,
};
