//! Error taxonomy for the evaluation engine.
//!
//! Scoring itself is total; only the input boundary (document parsing,
//! colour parsing, config loading) and the scan worker boundary can fail.

use crate::scan::ScanError;

/// uxscore errors.
#[derive(Debug, thiserror::Error)]
pub enum UxScoreError {
    #[error("unknown node type: {0}")]
    UnknownNodeType(String),

    #[error("invalid color: {0}")]
    InvalidColor(String),

    #[error("invalid document: {0}")]
    InvalidDocument(String),

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("scan error: {0}")]
    Scan(#[from] ScanError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for uxscore operations.
pub type Result<T> = std::result::Result<T, UxScoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_node_type_display() {
        let err = UxScoreError::UnknownNodeType("BANANA".to_string());
        assert_eq!(err.to_string(), "unknown node type: BANANA");
    }

    #[test]
    fn test_invalid_config_display() {
        let err = UxScoreError::InvalidConfig("weights sum to 0.9".to_string());
        assert!(err.to_string().contains("invalid config"));
        assert!(err.to_string().contains("0.9"));
    }

    #[test]
    fn test_scan_error_converts() {
        let err: UxScoreError = ScanError::WorkerFailed {
            subtree_id: "1:2".to_string(),
            detail: "panicked".to_string(),
        }
        .into();
        assert!(err.to_string().contains("scan error"));
        assert!(err.to_string().contains("1:2"));
    }
}
