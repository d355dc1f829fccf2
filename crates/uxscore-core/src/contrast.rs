//! WCAG relative luminance and contrast ratio.
//!
//! The ratio itself is fixed by WCAG 2.x. The mapping from ratio to a 0-100
//! score is a [`ContrastPolicy`]; [`WcagCurve`] is the default.

use serde::{Deserialize, Serialize};

use crate::domain::Color;

/// Minimum ratio for AA, normal text.
pub const AA_NORMAL: f64 = 4.5;
/// Minimum ratio for AAA, normal text.
pub const AAA_NORMAL: f64 = 7.0;
/// Minimum ratio for AA, large text.
pub const AA_LARGE: f64 = 3.0;
/// Minimum ratio for AAA, large text.
pub const AAA_LARGE: f64 = 4.5;

/// sRGB transfer function, inverted.
pub fn linearize(channel: f64) -> f64 {
    let c = channel.clamp(0.0, 1.0);
    if c <= 0.03928 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// WCAG relative luminance. Alpha is ignored.
pub fn relative_luminance(color: &Color) -> f64 {
    0.2126 * linearize(color.r) + 0.7152 * linearize(color.g) + 0.0722 * linearize(color.b)
}

/// Contrast ratio between two colours, in `[1, 21]`. Symmetric.
pub fn contrast_ratio(a: &Color, b: &Color) -> f64 {
    let la = relative_luminance(a);
    let lb = relative_luminance(b);
    let (hi, lo) = if la >= lb { (la, lb) } else { (lb, la) };
    (hi + 0.05) / (lo + 0.05)
}

/// WCAG conformance level reached by a ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum WcagLevel {
    Fail,
    AA,
    AAA,
}

/// Large text is at least 24px, or at least 18.66px (14pt) when bold.
pub fn is_large_text(font_size: f64, font_weight: Option<f64>) -> bool {
    font_size >= 24.0 || (font_size >= 18.66 && font_weight.unwrap_or(400.0) >= 700.0)
}

pub fn wcag_level(ratio: f64, large_text: bool) -> WcagLevel {
    let (aa, aaa) = if large_text {
        (AA_LARGE, AAA_LARGE)
    } else {
        (AA_NORMAL, AAA_NORMAL)
    };
    if ratio >= aaa {
        WcagLevel::AAA
    } else if ratio >= aa {
        WcagLevel::AA
    } else {
        WcagLevel::Fail
    }
}

/// Maps a contrast ratio to a 0-100 score.
///
/// Implementations must be monotonic non-decreasing in `ratio` and map a
/// ratio of 1 to 0.
pub trait ContrastPolicy: Send + Sync {
    fn score(&self, ratio: f64) -> f64;
}

/// Piecewise-linear curve anchored at the normal-text WCAG thresholds.
///
/// 1:1 scores 0, 4.5:1 scores `aa_score`, 7:1 and above score `aaa_score`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WcagCurve {
    pub aa_score: f64,
    pub aaa_score: f64,
}

impl Default for WcagCurve {
    fn default() -> Self {
        Self {
            aa_score: 70.0,
            aaa_score: 100.0,
        }
    }
}

impl ContrastPolicy for WcagCurve {
    fn score(&self, ratio: f64) -> f64 {
        // Also rejects NaN.
        if !(ratio > 1.0) {
            return 0.0;
        }
        if ratio < AA_NORMAL {
            self.aa_score * (ratio - 1.0) / (AA_NORMAL - 1.0)
        } else if ratio < AAA_NORMAL {
            self.aa_score
                + (self.aaa_score - self.aa_score) * (ratio - AA_NORMAL) / (AAA_NORMAL - AA_NORMAL)
        } else {
            self.aaa_score
        }
    }
}
