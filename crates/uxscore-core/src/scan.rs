//! Interactive-element detection and its worker boundary.
//!
//! Detection is a pure walk over one subtree. For throughput across many
//! large documents it can be dispatched through a [`SubtreeScanner`]: each
//! submission yields either the detected elements or a [`ScanError`]. There
//! are no retries and no partial results; callers decide what to do with a
//! failure.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::Semaphore;
use tracing::instrument;

use crate::config::ScanSettings;
use crate::domain::{Node, NodeKind};
use crate::metrics::METRICS;
use crate::obs;

/// Minimum comfortable touch target edge, in px.
pub const MIN_TARGET_SIZE: f64 = 44.0;

/// A node shaped like something a user could press.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractiveElement {
    pub node_id: String,
    pub name: String,
    pub kind: NodeKind,
    pub width: f64,
    pub height: f64,
    pub meets_target_size: bool,
}

/// Elements found under one subtree root.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DetectedElements {
    pub subtree_id: String,
    pub elements: Vec<InteractiveElement>,
}

impl DetectedElements {
    pub fn meeting_target_size(&self) -> usize {
        self.elements.iter().filter(|e| e.meets_target_size).count()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScanError {
    #[error("subtree {subtree_id} has {nodes} nodes, limit is {limit}")]
    SubtreeTooLarge {
        subtree_id: String,
        nodes: usize,
        limit: usize,
    },

    #[error("scan worker for subtree {subtree_id} failed: {detail}")]
    WorkerFailed { subtree_id: String, detail: String },
}

/// Visible descendants of `root` with an interactive-shaped kind and a box.
///
/// The root itself is not reported; hidden subtrees are skipped.
pub fn detect_interactive_elements(root: &Node) -> Vec<InteractiveElement> {
    let mut out = Vec::new();
    for child in &root.children {
        collect(child, &mut out);
    }
    out
}

fn collect(node: &Node, out: &mut Vec<InteractiveElement>) {
    if !node.visible {
        return;
    }
    if node.kind.is_interactive_shaped() {
        if let Some(bounds) = node.bounding_box {
            out.push(InteractiveElement {
                node_id: node.id.clone(),
                name: node.name.clone(),
                kind: node.kind,
                width: bounds.width,
                height: bounds.height,
                meets_target_size: bounds.width >= MIN_TARGET_SIZE
                    && bounds.height >= MIN_TARGET_SIZE,
            });
        }
    }
    for child in &node.children {
        collect(child, out);
    }
}

/// Task boundary for interactive-element detection.
#[async_trait]
pub trait SubtreeScanner: Send + Sync {
    async fn submit(&self, subtree: Arc<Node>) -> Result<DetectedElements, ScanError>;
}

/// Runs detection on tokio's blocking pool, at most `max_concurrent` at a time.
pub struct BlockingPoolScanner {
    permits: Arc<Semaphore>,
    max_nodes: usize,
}

impl BlockingPoolScanner {
    pub fn new(settings: ScanSettings) -> Self {
        Self {
            permits: Arc::new(Semaphore::new(settings.max_concurrent.max(1))),
            max_nodes: settings.max_nodes,
        }
    }
}

impl Default for BlockingPoolScanner {
    fn default() -> Self {
        Self::new(ScanSettings::default())
    }
}

#[async_trait]
impl SubtreeScanner for BlockingPoolScanner {
    #[instrument(skip(self, subtree), fields(subtree_id = %subtree.id))]
    async fn submit(&self, subtree: Arc<Node>) -> Result<DetectedElements, ScanError> {
        let subtree_id = subtree.id.clone();
        let nodes = subtree.node_count();
        if nodes > self.max_nodes {
            return Err(ScanError::SubtreeTooLarge {
                subtree_id,
                nodes,
                limit: self.max_nodes,
            });
        }

        let _permit = Arc::clone(&self.permits)
            .acquire_owned()
            .await
            .map_err(|e| ScanError::WorkerFailed {
                subtree_id: subtree_id.clone(),
                detail: e.to_string(),
            })?;

        let elements = tokio::task::spawn_blocking(move || detect_interactive_elements(&subtree))
            .await
            .map_err(|e| ScanError::WorkerFailed {
                subtree_id: subtree_id.clone(),
                detail: e.to_string(),
            })?;

        Ok(DetectedElements {
            subtree_id,
            elements,
        })
    }
}

/// Submit every subtree concurrently and collect results in submission order.
pub async fn scan_all(
    scanner: &dyn SubtreeScanner,
    subtrees: Vec<Arc<Node>>,
) -> Vec<Result<DetectedElements, ScanError>> {
    let submissions = subtrees.into_iter().map(|subtree| {
        METRICS.inc_scans_dispatched();
        let subtree_id = subtree.id.clone();
        async move {
            let result = scanner.submit(subtree).await;
            if let Err(e) = &result {
                METRICS.inc_scans_failed();
                obs::emit_scan_failed(&subtree_id, e);
            }
            result
        }
    });
    futures::future::join_all(submissions).await
}
