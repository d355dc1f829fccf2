//! Document normalization.
//!
//! Flattens a [`Node`] tree into per-frame records of typed text and shape
//! leaves with resolved colours. Top-level frames are the outermost `FRAME`
//! nodes: the root itself when it is a frame, otherwise every frame reached
//! without passing through another frame. Nested frames are flattened into
//! their enclosing top-level frame.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::domain::{BoundingBox, Color, Node, NodeKind, Paint};

/// Resolve the display colour of a node.
///
/// Precedence: first solid entry in `fills`, then `backgroundColor`, then the
/// first solid entry in `background`.
pub fn resolve_color(node: &Node) -> Option<Color> {
    first_solid(node.fills.as_deref())
        .or(node.background_color)
        .or_else(|| first_solid(node.background.as_deref()))
}

fn first_solid(paints: Option<&[Paint]>) -> Option<Color> {
    paints?.iter().find_map(Paint::solid_color)
}

/// A text leaf extracted from a frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextNode {
    pub id: String,
    pub name: String,
    pub characters: String,
    pub color: Option<Color>,
    pub font_size: f64,
    pub font_weight: Option<f64>,
    pub font_family: Option<String>,
    pub bounds: BoundingBox,
}

/// A rectangle or ellipse leaf extracted from a frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeNode {
    pub id: String,
    pub name: String,
    pub kind: NodeKind,
    pub color: Option<Color>,
    pub bounds: BoundingBox,
}

/// A top-level frame with its flattened leaves. The unit of scoring.
#[derive(Debug, Clone)]
pub struct FrameRecord {
    pub id: String,
    pub name: String,
    pub background: Option<Color>,
    pub bounds: Option<BoundingBox>,
    pub texts: Vec<TextNode>,
    pub shapes: Vec<ShapeNode>,
    /// Original subtree, kept for interactive-element scanning.
    pub raw: Arc<Node>,
}

impl FrameRecord {
    /// Distinct text font sizes, ascending. Sizes within 0.01px of each other are merged.
    pub fn distinct_font_sizes(&self) -> Vec<f64> {
        let mut sizes: Vec<f64> = self.texts.iter().map(|t| t.font_size).collect();
        sizes.sort_by(f64::total_cmp);
        sizes.dedup_by(|a, b| (*a - *b).abs() < 0.01);
        sizes
    }

    /// Origin used for grid and bucket computations.
    pub fn origin(&self) -> (f64, f64) {
        self.bounds.map_or((0.0, 0.0), |b| (b.x, b.y))
    }
}

/// Normalized document, keyed by frame id.
pub type FrameMap = BTreeMap<String, FrameRecord>;

/// Normalize a document tree into frame records.
///
/// Hidden nodes are skipped with their whole subtree. Text without
/// characters, style or font size, and any leaf without a bounding box, are
/// left out of the frame rather than failing the pass.
pub fn normalize_document(root: &Node) -> FrameMap {
    let mut frames = FrameMap::new();
    for frame in top_level_frames(root) {
        let record = normalize_frame(frame);
        debug!(
            frame_id = %record.id,
            texts = record.texts.len(),
            shapes = record.shapes.len(),
            "frame normalized"
        );
        if frames.insert(record.id.clone(), record).is_some() {
            warn!(frame_id = %frame.id, "duplicate frame id, keeping the later frame");
        }
    }
    frames
}

/// Outermost visible frames of the tree, in document order.
pub fn top_level_frames(root: &Node) -> Vec<&Node> {
    let mut out = Vec::new();
    collect_frames(root, &mut out);
    out
}

fn collect_frames<'a>(node: &'a Node, out: &mut Vec<&'a Node>) {
    if !node.visible {
        return;
    }
    if node.kind == NodeKind::Frame {
        out.push(node);
        return;
    }
    for child in &node.children {
        collect_frames(child, out);
    }
}

/// Build the record for one frame node.
pub fn normalize_frame(frame: &Node) -> FrameRecord {
    let mut texts = Vec::new();
    let mut shapes = Vec::new();
    for child in &frame.children {
        flatten(child, &mut texts, &mut shapes);
    }

    FrameRecord {
        id: frame.id.clone(),
        name: frame.name.clone(),
        background: resolve_color(frame),
        bounds: frame.bounding_box,
        texts,
        shapes,
        raw: Arc::new(frame.clone()),
    }
}

fn flatten(node: &Node, texts: &mut Vec<TextNode>, shapes: &mut Vec<ShapeNode>) {
    if !node.visible {
        return;
    }

    match node.kind {
        NodeKind::Text => {
            if let Some(text) = text_leaf(node) {
                texts.push(text);
            }
        }
        NodeKind::Rectangle | NodeKind::Ellipse => {
            if let Some(bounds) = node.bounding_box {
                shapes.push(ShapeNode {
                    id: node.id.clone(),
                    name: node.name.clone(),
                    kind: node.kind,
                    color: resolve_color(node),
                    bounds,
                });
            } else {
                debug!(node_id = %node.id, "shape without bounding box excluded");
            }
        }
        NodeKind::Frame
        | NodeKind::Vector
        | NodeKind::Component
        | NodeKind::Instance
        | NodeKind::Group => {}
    }

    for child in &node.children {
        flatten(child, texts, shapes);
    }
}

fn text_leaf(node: &Node) -> Option<TextNode> {
    let characters = node.characters.as_deref().filter(|c| !c.trim().is_empty())?;
    let style = node.style.as_ref()?;
    let Some(bounds) = node.bounding_box else {
        debug!(node_id = %node.id, "text without bounding box excluded");
        return None;
    };
    let font_size = style.font_size.filter(|s| s.is_finite() && *s > 0.0)?;

    Some(TextNode {
        id: node.id.clone(),
        name: node.name.clone(),
        characters: characters.to_string(),
        color: resolve_color(node),
        font_size,
        font_weight: style.font_weight,
        font_family: style.font_family.clone(),
        bounds,
    })
}
