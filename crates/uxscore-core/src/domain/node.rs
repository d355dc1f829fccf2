//! Design document node tree.
//!
//! This is the input contract of the engine: a tree of visual nodes as
//! exported by a design tool, already fetched and decoded by the caller.
//! The tree is immutable for the duration of an evaluation pass.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::error::{Result, UxScoreError};

/// Closed set of node kinds the engine understands.
///
/// Parsing an unknown `type` tag fails with [`UxScoreError::UnknownNodeType`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum NodeKind {
    Frame,
    Text,
    Rectangle,
    Ellipse,
    Vector,
    Component,
    Instance,
    Group,
}

impl NodeKind {
    pub const ALL: [NodeKind; 8] = [
        NodeKind::Frame,
        NodeKind::Text,
        NodeKind::Rectangle,
        NodeKind::Ellipse,
        NodeKind::Vector,
        NodeKind::Component,
        NodeKind::Instance,
        NodeKind::Group,
    ];

    /// Wire tag for this kind.
    pub fn as_str(self) -> &'static str {
        match self {
            NodeKind::Frame => "FRAME",
            NodeKind::Text => "TEXT",
            NodeKind::Rectangle => "RECTANGLE",
            NodeKind::Ellipse => "ELLIPSE",
            NodeKind::Vector => "VECTOR",
            NodeKind::Component => "COMPONENT",
            NodeKind::Instance => "INSTANCE",
            NodeKind::Group => "GROUP",
        }
    }

    /// Kinds extracted as [`ShapeNode`](crate::normalize::ShapeNode) leaves.
    pub fn is_shape(self) -> bool {
        matches!(self, NodeKind::Rectangle | NodeKind::Ellipse)
    }

    /// Kinds that may act as tap/click targets.
    pub fn is_interactive_shaped(self) -> bool {
        matches!(
            self,
            NodeKind::Rectangle
                | NodeKind::Ellipse
                | NodeKind::Frame
                | NodeKind::Component
                | NodeKind::Instance
                | NodeKind::Vector
        )
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NodeKind {
    type Err = UxScoreError;

    fn from_str(s: &str) -> Result<Self> {
        NodeKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UxScoreError::UnknownNodeType(s.to_string()))
    }
}

impl TryFrom<String> for NodeKind {
    type Error = UxScoreError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<NodeKind> for String {
    fn from(kind: NodeKind) -> Self {
        kind.as_str().to_string()
    }
}

fn opaque() -> f64 {
    1.0
}

fn visible_by_default() -> bool {
    true
}

/// RGBA colour with channels in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    #[serde(default = "opaque")]
    pub a: f64,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);

    pub const fn rgb(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self { r, g, b, a }
    }

    /// `#rrggbb`, or `#rrggbbaa` when not fully opaque.
    pub fn to_hex(&self) -> String {
        let byte = |c: f64| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        if byte(self.a) == 255 {
            format!("#{:02x}{:02x}{:02x}", byte(self.r), byte(self.g), byte(self.b))
        } else {
            format!(
                "#{:02x}{:02x}{:02x}{:02x}",
                byte(self.r),
                byte(self.g),
                byte(self.b),
                byte(self.a)
            )
        }
    }
}

impl FromStr for Color {
    type Err = UxScoreError;

    /// Parses `#rgb`, `#rrggbb` or `#rrggbbaa` (leading `#` optional).
    fn from_str(s: &str) -> Result<Self> {
        let hex = s.trim().trim_start_matches('#');
        let invalid = || UxScoreError::InvalidColor(s.to_string());
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }

        let expanded: String = match hex.len() {
            3 => hex.chars().flat_map(|c| [c, c]).collect(),
            6 | 8 => hex.to_string(),
            _ => return Err(invalid()),
        };

        let channel = |i: usize| -> Result<f64> {
            u8::from_str_radix(&expanded[i..i + 2], 16)
                .map(|v| f64::from(v) / 255.0)
                .map_err(|_| invalid())
        };

        let a = if expanded.len() == 8 { channel(6)? } else { 1.0 };
        Ok(Color::rgba(channel(0)?, channel(2)?, channel(4)?, a))
    }
}

/// Paint type tag. Only `SOLID` paints participate in colour resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaintKind {
    Solid,
    GradientLinear,
    GradientRadial,
    GradientAngular,
    GradientDiamond,
    Image,
    Emoji,
    Video,
    #[serde(other)]
    Other,
}

/// A fill, stroke or background paint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paint {
    #[serde(rename = "type")]
    pub kind: PaintKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
    #[serde(default = "visible_by_default")]
    pub visible: bool,
}

impl Paint {
    pub fn solid(color: Color) -> Self {
        Self {
            kind: PaintKind::Solid,
            color: Some(color),
            visible: true,
        }
    }

    /// The colour of a visible solid paint.
    pub fn solid_color(&self) -> Option<Color> {
        match self.kind {
            PaintKind::Solid if self.visible => self.color,
            _ => None,
        }
    }
}

/// Axis-aligned bounding box in document coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn center_x(&self) -> f64 {
        self.x + self.width / 2.0
    }

    /// Strict intersection: boxes that only share an edge do not overlap.
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }
}

/// Typography attributes of a text node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextStyle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_weight: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_height_px: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub letter_spacing: Option<f64>,
}

/// One node of the design tree. Children are owned by their parent.
///
/// On input the box is read from `absoluteBoundingBox` when present, else
/// from `boundingBox`. It is always written back as `boundingBox`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "NodeWire")]
pub struct Node {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    pub name: String,
    pub visible: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bounding_box: Option<BoundingBox>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fills: Option<Vec<Paint>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strokes: Option<Vec<Paint>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<Color>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<Vec<Paint>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<TextStyle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub characters: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Node>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct NodeWire {
    id: String,
    #[serde(rename = "type")]
    kind: NodeKind,
    #[serde(default)]
    name: String,
    #[serde(default = "visible_by_default")]
    visible: bool,
    #[serde(default)]
    bounding_box: Option<BoundingBox>,
    #[serde(default)]
    absolute_bounding_box: Option<BoundingBox>,
    #[serde(default)]
    fills: Option<Vec<Paint>>,
    #[serde(default)]
    strokes: Option<Vec<Paint>>,
    #[serde(default)]
    background_color: Option<Color>,
    #[serde(default)]
    background: Option<Vec<Paint>>,
    #[serde(default)]
    style: Option<TextStyle>,
    #[serde(default)]
    characters: Option<String>,
    #[serde(default)]
    children: Vec<Node>,
}

impl From<NodeWire> for Node {
    fn from(wire: NodeWire) -> Self {
        Self {
            id: wire.id,
            kind: wire.kind,
            name: wire.name,
            visible: wire.visible,
            bounding_box: wire.absolute_bounding_box.or(wire.bounding_box),
            fills: wire.fills,
            strokes: wire.strokes,
            background_color: wire.background_color,
            background: wire.background,
            style: wire.style,
            characters: wire.characters,
            children: wire.children,
        }
    }
}

impl Node {
    /// Create a bare node; fields are filled in with the `with_*` builders.
    pub fn new(id: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            id: id.into(),
            kind,
            name: String::new(),
            visible: true,
            bounding_box: None,
            fills: None,
            strokes: None,
            background_color: None,
            background: None,
            style: None,
            characters: None,
            children: Vec::new(),
        }
    }

    /// Parse a node tree from its JSON wire form.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parse a node tree from an already-decoded JSON value.
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_bounds(mut self, x: f64, y: f64, width: f64, height: f64) -> Self {
        self.bounding_box = Some(BoundingBox::new(x, y, width, height));
        self
    }

    pub fn with_fill(mut self, color: Color) -> Self {
        self.fills.get_or_insert_with(Vec::new).push(Paint::solid(color));
        self
    }

    pub fn with_text(mut self, characters: impl Into<String>, font_size: f64) -> Self {
        self.characters = Some(characters.into());
        let style = self.style.get_or_insert_with(TextStyle::default);
        style.font_size = Some(font_size);
        self
    }

    pub fn with_child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    /// Depth-first pre-order iterator over strict descendants.
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants {
            stack: self.children.iter().rev().collect(),
        }
    }

    /// Number of nodes in this subtree, including `self`.
    pub fn node_count(&self) -> usize {
        1 + self.descendants().count()
    }

    /// Find a node by id in this subtree.
    pub fn find(&self, id: &str) -> Option<&Node> {
        if self.id == id {
            return Some(self);
        }
        self.descendants().find(|n| n.id == id)
    }
}

/// See [`Node::descendants`].
pub struct Descendants<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}
