use std::io::Write;

use uxscore_core::{
    DesignEvaluator, EngineConfig, EvaluationRequest, LayoutScoreFormula, Node, NodeKind,
    UxScoreError,
};

#[test]
fn config_file_changes_evaluation() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    writeln!(
        file,
        r#"
[layout]
score_formula = "corrected"

[frame_weights]
color = 0.2
typography = 0.2
usability = 0.2
layout = 0.2
hierarchy = 0.2
"#
    )
    .expect("write");

    let config = EngineConfig::load(file.path()).expect("load");
    assert_eq!(config.layout.score_formula, LayoutScoreFormula::Corrected);

    let document = Node::new("root", NodeKind::Group)
        .with_child(Node::new("f", NodeKind::Frame).with_bounds(0.0, 0.0, 100.0, 100.0));
    let report = DesignEvaluator::new(config).evaluate(&document, &EvaluationRequest::new("r", 1, 1));
    assert_eq!(report.frames[0].layout.score, 100);
    assert_eq!(DesignEvaluator::new(config).config().frame_weights.color, 0.2);
}

#[test]
fn invalid_config_file_is_rejected() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("bad.toml");
    std::fs::write(&path, "[reconcile]\nhysteresis = -1.0\n").expect("write");
    let err = EngineConfig::load(&path).unwrap_err();
    assert!(matches!(err, UxScoreError::InvalidConfig(_)));
}
