//! Weighted per-frame scoring.
//!
//! Five signals feed the overall score through [`FrameWeights`]:
//!
//! | signal     | measure                                                    | empty |
//! |------------|------------------------------------------------------------|-------|
//! | color      | mean contrast-policy score of text against the background  | 100   |
//! | typography | share of text at or above 16px                             | 100   |
//! | usability  | share of interactive-shaped nodes at least 44x44           | 100   |
//! | layout     | largest 8px bucket of text left edges / text count         | 100 (<2 texts) |
//! | hierarchy  | max-to-median font size ratio                              | 100   |
//!
//! Accessibility (share of text meeting WCAG AA for its size class) is
//! reported alongside but is not part of the weighted overall.

use serde::{Deserialize, Serialize};

use crate::config::{EngineConfig, FrameWeights};
use crate::contrast::{
    contrast_ratio, is_large_text, wcag_level, ContrastPolicy, WcagCurve, WcagLevel,
};
use crate::domain::{clamp_score, CategoryScores, Color};
use crate::metrics::METRICS;
use crate::normalize::FrameRecord;
use crate::scan::{detect_interactive_elements, InteractiveElement};

pub use crate::scan::MIN_TARGET_SIZE;

/// Body text below this size counts against typography.
pub const MIN_BODY_FONT_SIZE: f64 = 16.0;
/// Width of the left-edge buckets used by the layout signal.
pub const LAYOUT_BUCKET_PX: f64 = 8.0;
/// Max-to-median ratio that earns a full hierarchy score.
pub const HIERARCHY_RATIO_CAP: f64 = 3.0;
/// Hierarchy score for frames whose text uses one size.
pub const SINGLE_SIZE_HIERARCHY: f64 = 40.0;
/// Lowest hierarchy score once two or more sizes exist.
pub const HIERARCHY_FLOOR: f64 = 50.0;

/// Contrast evidence for one text node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextJustification {
    pub node_id: String,
    pub font_size: f64,
    pub foreground: String,
    pub background: String,
    pub contrast_ratio: f64,
    pub contrast_score: f64,
    pub large_text: bool,
    pub wcag_level: WcagLevel,
}

/// Score of one frame, with the evidence behind it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameScore {
    pub frame_id: String,
    pub frame_name: String,
    pub accessibility: u8,
    pub color: u8,
    pub typography: u8,
    pub usability: u8,
    pub layout: u8,
    pub hierarchy: u8,
    pub overall: u8,
    pub text_details: Vec<TextJustification>,
    pub interactive_details: Vec<InteractiveElement>,
}

impl FrameScore {
    pub fn category_scores(&self) -> CategoryScores {
        CategoryScores {
            accessibility: self.accessibility,
            typography: self.typography,
            color: self.color,
            layout: self.layout,
            hierarchy: self.hierarchy,
            usability: self.usability,
            overall: self.overall,
        }
    }
}

pub struct FrameScorer {
    policy: Box<dyn ContrastPolicy>,
    weights: FrameWeights,
}

impl Default for FrameScorer {
    fn default() -> Self {
        Self::new(Box::new(WcagCurve::default()), FrameWeights::default())
    }
}

impl FrameScorer {
    pub fn new(policy: Box<dyn ContrastPolicy>, weights: FrameWeights) -> Self {
        Self { policy, weights }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(Box::new(config.contrast), config.frame_weights)
    }

    pub fn weights(&self) -> &FrameWeights {
        &self.weights
    }

    /// Score a frame, detecting interactive elements from its raw subtree.
    pub fn score(&self, frame: &FrameRecord) -> FrameScore {
        let elements = detect_interactive_elements(&frame.raw);
        self.score_with_elements(frame, elements)
    }

    /// Score a frame with interactive elements detected elsewhere.
    pub fn score_with_elements(
        &self,
        frame: &FrameRecord,
        elements: Vec<InteractiveElement>,
    ) -> FrameScore {
        let background = frame.background.unwrap_or(Color::WHITE);
        let text_details: Vec<TextJustification> = frame
            .texts
            .iter()
            .map(|text| {
                let foreground = text.color.unwrap_or(Color::BLACK);
                let ratio = contrast_ratio(&foreground, &background);
                let large_text = is_large_text(text.font_size, text.font_weight);
                TextJustification {
                    node_id: text.id.clone(),
                    font_size: text.font_size,
                    foreground: foreground.to_hex(),
                    background: background.to_hex(),
                    contrast_ratio: ratio,
                    contrast_score: self.policy.score(ratio),
                    large_text,
                    wcag_level: wcag_level(ratio, large_text),
                }
            })
            .collect();

        let color = mean_or_full(text_details.iter().map(|d| d.contrast_score));
        let accessibility = share_or_full(
            text_details.iter().filter(|d| d.wcag_level >= WcagLevel::AA).count(),
            text_details.len(),
        );
        let typography = share_or_full(
            frame
                .texts
                .iter()
                .filter(|t| t.font_size >= MIN_BODY_FONT_SIZE)
                .count(),
            frame.texts.len(),
        );
        let usability = share_or_full(
            elements.iter().filter(|e| e.meets_target_size).count(),
            elements.len(),
        );
        let layout = layout_signal(frame);
        let hierarchy = hierarchy_signal(&frame.distinct_font_sizes());

        let w = &self.weights;
        let overall = w.color * color
            + w.typography * typography
            + w.usability * usability
            + w.layout * layout
            + w.hierarchy * hierarchy;

        METRICS.inc_frames_scored();

        FrameScore {
            frame_id: frame.id.clone(),
            frame_name: frame.name.clone(),
            accessibility: clamp_score(accessibility),
            color: clamp_score(color),
            typography: clamp_score(typography),
            usability: clamp_score(usability),
            layout: clamp_score(layout),
            hierarchy: clamp_score(hierarchy),
            overall: clamp_score(overall),
            text_details,
            interactive_details: elements,
        }
    }
}

fn mean_or_full(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if count == 0 {
        100.0
    } else {
        sum / count as f64
    }
}

fn share_or_full(hits: usize, total: usize) -> f64 {
    if total == 0 {
        100.0
    } else {
        100.0 * hits as f64 / total as f64
    }
}

/// Share of text whose frame-relative left edge falls in the most common 8px bucket.
fn layout_signal(frame: &FrameRecord) -> f64 {
    if frame.texts.len() < 2 {
        return 100.0;
    }
    let (ox, _) = frame.origin();
    let mut buckets: Vec<i64> = frame
        .texts
        .iter()
        .map(|t| ((t.bounds.x - ox) / LAYOUT_BUCKET_PX).floor() as i64)
        .collect();
    buckets.sort_unstable();

    let mut largest = 0;
    let mut run = 0;
    for (i, bucket) in buckets.iter().enumerate() {
        run = if i > 0 && buckets[i - 1] == *bucket {
            run + 1
        } else {
            1
        };
        largest = largest.max(run);
    }
    share_or_full(largest, buckets.len())
}

/// Hierarchy signal from ascending distinct font sizes.
pub fn hierarchy_signal(sizes: &[f64]) -> f64 {
    match sizes.len() {
        0 => 100.0,
        1 => SINGLE_SIZE_HIERARCHY,
        n => {
            let median = if n % 2 == 1 {
                sizes[n / 2]
            } else {
                (sizes[n / 2 - 1] + sizes[n / 2]) / 2.0
            };
            let max = sizes[n - 1];
            let ratio = (max / median).min(HIERARCHY_RATIO_CAP);
            let scaled = (ratio - 1.0) / (HIERARCHY_RATIO_CAP - 1.0) * 100.0;
            scaled.max(HIERARCHY_FLOOR)
        }
    }
}
