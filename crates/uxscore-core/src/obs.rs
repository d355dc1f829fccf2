//! Structured observability hooks for evaluation passes.
//!
//! - [`EvaluationSpan`]: RAII guard tagging everything inside with run and frame ids
//! - `emit_*`: one `info!` event per pipeline milestone (`warn!` for scan failures)
//!
//! Filter with `RUST_LOG`, e.g. `RUST_LOG=uxscore_core=debug` to also see the
//! reconciliation trace.

use tracing::info;

/// Enters a span scoped to one frame of one evaluation run.
///
/// ```ignore
/// let _span = EvaluationSpan::enter("run-1", "frame-1");
/// // events below carry run_id and frame_id
/// ```
pub struct EvaluationSpan {
    _span: tracing::span::EnteredSpan,
}

impl EvaluationSpan {
    pub fn enter(run_id: &str, frame_id: &str) -> Self {
        let span = tracing::info_span!("uxscore.frame", run_id = %run_id, frame_id = %frame_id);
        Self {
            _span: span.entered(),
        }
    }
}

pub fn emit_frame_scored(frame_id: &str, overall: u8, text_nodes: usize) {
    info!(
        event = "frame.scored",
        frame_id = %frame_id,
        overall = overall,
        text_nodes = text_nodes,
    );
}

pub fn emit_layout_checked(frame_id: &str, score: u8, issue_count: usize) {
    info!(
        event = "layout.checked",
        frame_id = %frame_id,
        score = score,
        issue_count = issue_count,
    );
}

/// Emit event: one frame reconciled for an iteration.
pub fn emit_iteration_reconciled(
    frame_id: &str,
    iteration: u32,
    total_iterations: u32,
    mode: &str,
    overall: u8,
) {
    info!(
        event = "iteration.reconciled",
        frame_id = %frame_id,
        iteration = iteration,
        total_iterations = total_iterations,
        mode = %mode,
        overall = overall,
    );
}

pub fn emit_resources_selected(count: usize, low_heuristics: usize) {
    info!(
        event = "resources.selected",
        count = count,
        low_heuristics = low_heuristics,
    );
}

/// Emit event: a subtree scan failed (warning level).
pub fn emit_scan_failed(subtree_id: &str, error: &dyn std::fmt::Display) {
    tracing::warn!(event = "scan.failed", subtree_id = %subtree_id, error = %error);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evaluation_span_create() {
        let _span = EvaluationSpan::enter("run", "frame");
        emit_frame_scored("frame", 80, 2);
    }
}
