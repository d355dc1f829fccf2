//! Engine configuration.
//!
//! Every section defaults to the reference constants, so an empty TOML file
//! (or `EngineConfig::default()`) reproduces the documented behaviour.
//!
//! ```toml
//! [frame_weights]
//! color = 0.30
//! typography = 0.20
//! usability = 0.20
//! layout = 0.15
//! hierarchy = 0.15
//!
//! [layout]
//! skip_alignment_check = false
//! score_formula = "legacy"
//!
//! [reconcile]
//! hysteresis = 12.0
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::contrast::WcagCurve;
use crate::domain::{Result, UxScoreError};
use crate::layout::LayoutOptions;

/// Weights of the five signals combined into a frame's overall score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameWeights {
    pub color: f64,
    pub typography: f64,
    pub usability: f64,
    pub layout: f64,
    pub hierarchy: f64,
}

impl Default for FrameWeights {
    fn default() -> Self {
        Self {
            color: 0.30,
            typography: 0.20,
            usability: 0.20,
            layout: 0.15,
            hierarchy: 0.15,
        }
    }
}

impl FrameWeights {
    pub fn sum(&self) -> f64 {
        self.color + self.typography + self.usability + self.layout + self.hierarchy
    }

    pub fn validate(&self) -> Result<()> {
        let all = [
            self.color,
            self.typography,
            self.usability,
            self.layout,
            self.hierarchy,
        ];
        if all.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(UxScoreError::InvalidConfig(
                "frame weights must be finite and non-negative".to_string(),
            ));
        }
        let sum = self.sum();
        if (sum - 1.0).abs() > 1e-6 {
            return Err(UxScoreError::InvalidConfig(format!(
                "frame weights must sum to 1.0, got {sum}"
            )));
        }
        Ok(())
    }
}

/// Constants of the reconciliation engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconcileSettings {
    /// Derived category values replace supplied ones only beyond this distance.
    pub hysteresis: f64,
    /// Blend factor toward the iteration target in progressive mode.
    pub progressive_alpha: f64,
    /// Distance from target beyond which progressive mode pulls halfway back.
    pub pull_threshold: f64,
    /// Largest allowed drop of a category between consecutive iterations.
    pub max_drop: u8,
    /// Half-width of the raw-mode band around the target.
    pub band_radius: f64,
    /// Inset applied when a raw-mode value is pushed back into the band.
    pub band_inset: f64,
    /// Lower bound for progressive scores at the final iteration.
    pub final_floor: f64,
    /// Smoothing amplitude at the first iteration.
    pub amplitude_start: f64,
    /// Smoothing amplitude at the final iteration.
    pub amplitude_end: f64,
}

impl Default for ReconcileSettings {
    fn default() -> Self {
        Self {
            hysteresis: 12.0,
            progressive_alpha: 0.35,
            pull_threshold: 15.0,
            max_drop: 10,
            band_radius: 30.0,
            band_inset: 15.0,
            final_floor: 95.0,
            amplitude_start: 6.0,
            amplitude_end: 2.0,
        }
    }
}

impl ReconcileSettings {
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.progressive_alpha) {
            return Err(UxScoreError::InvalidConfig(format!(
                "progressive_alpha must be within [0, 1], got {}",
                self.progressive_alpha
            )));
        }
        let non_negative = [
            ("hysteresis", self.hysteresis),
            ("pull_threshold", self.pull_threshold),
            ("band_radius", self.band_radius),
            ("band_inset", self.band_inset),
            ("final_floor", self.final_floor),
            ("amplitude_start", self.amplitude_start),
            ("amplitude_end", self.amplitude_end),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(UxScoreError::InvalidConfig(format!(
                    "{name} must be finite and non-negative, got {value}"
                )));
            }
        }
        Ok(())
    }
}

/// Limits of the interactive-element scan workers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanSettings {
    /// Concurrent scan tasks.
    pub max_concurrent: usize,
    /// Subtrees above this node count are rejected.
    pub max_nodes: usize,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            max_concurrent: 4,
            max_nodes: 50_000,
        }
    }
}

/// Complete engine configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub frame_weights: FrameWeights,
    pub layout: LayoutOptions,
    pub contrast: WcagCurve,
    pub reconcile: ReconcileSettings,
    pub scan: ScanSettings,
}

impl EngineConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: EngineConfig = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let source = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&source)?;
        tracing::debug!(path = %path.display(), "engine config loaded");
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.frame_weights.validate()?;
        self.reconcile.validate()?;
        if !(self.contrast.aa_score >= 0.0 && self.contrast.aa_score <= self.contrast.aaa_score) {
            return Err(UxScoreError::InvalidConfig(
                "contrast scores must satisfy 0 <= aa_score <= aaa_score".to_string(),
            ));
        }
        if self.scan.max_concurrent == 0 {
            return Err(UxScoreError::InvalidConfig(
                "scan.max_concurrent must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::LayoutScoreFormula;

    #[test]
    fn test_defaults_are_valid() {
        let config = EngineConfig::default();
        config.validate().expect("defaults validate");
        assert!((config.frame_weights.sum() - 1.0).abs() < 1e-9);
        assert_eq!(config.reconcile.hysteresis, 12.0);
        assert_eq!(config.reconcile.max_drop, 10);
        assert_eq!(config.layout.score_formula, LayoutScoreFormula::Legacy);
    }

    #[test]
    fn test_empty_toml_is_default() {
        let config = EngineConfig::from_toml_str("").expect("parse");
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn test_partial_toml_overrides() {
        let config = EngineConfig::from_toml_str(
            r#"
            [layout]
            skip_alignment_check = true
            score_formula = "corrected"

            [reconcile]
            max_drop = 5
            "#,
        )
        .expect("parse");
        assert!(config.layout.skip_alignment_check);
        assert_eq!(config.layout.score_formula, LayoutScoreFormula::Corrected);
        assert_eq!(config.reconcile.max_drop, 5);
        assert_eq!(config.reconcile.hysteresis, 12.0);
    }

    #[test]
    fn test_bad_weights_rejected() {
        let err = EngineConfig::from_toml_str("[frame_weights]\ncolor = 0.9\n").unwrap_err();
        assert!(matches!(err, UxScoreError::InvalidConfig(_)));
    }

    #[test]
    fn test_bad_alpha_rejected() {
        let err = EngineConfig::from_toml_str("[reconcile]\nprogressive_alpha = 1.5\n").unwrap_err();
        assert!(err.to_string().contains("progressive_alpha"));
    }

    #[test]
    fn test_zero_workers_rejected() {
        let err = EngineConfig::from_toml_str("[scan]\nmax_concurrent = 0\n").unwrap_err();
        assert!(err.to_string().contains("max_concurrent"));
    }

    #[test]
    fn test_malformed_toml_is_parse_error() {
        let err = EngineConfig::from_toml_str("[layout\n").unwrap_err();
        assert!(matches!(err, UxScoreError::ConfigParse(_)));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("uxscore.toml");
        std::fs::write(&path, "[contrast]\naa_score = 60.0\n").expect("write");
        let config = EngineConfig::load(&path).expect("load");
        assert_eq!(config.contrast.aa_score, 60.0);
        assert_eq!(config.contrast.aaa_score, 100.0);
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = EngineConfig::load(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, UxScoreError::Io(_)));
    }
}
