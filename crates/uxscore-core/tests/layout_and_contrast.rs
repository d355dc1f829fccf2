use uxscore_core::normalize::normalize_frame;
use uxscore_core::{
    check_frame, contrast_ratio, BoundingBox, Color, FrameScorer, LayoutOptions,
    LayoutScoreFormula, Node, NodeKind, Severity,
};

fn rect(id: &str, x: f64, y: f64, w: f64, h: f64) -> Node {
    Node::new(id, NodeKind::Rectangle).with_bounds(x, y, w, h)
}

fn frame_of(children: Vec<Node>) -> Node {
    children.into_iter().fold(
        Node::new("frame", NodeKind::Frame).with_bounds(0.0, 0.0, 400.0, 400.0),
        Node::with_child,
    )
}

#[test]
fn overlapping_boxes_flagged_high() {
    let a = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
    let b = BoundingBox::new(5.0, 5.0, 10.0, 10.0);
    let c = BoundingBox::new(20.0, 20.0, 10.0, 10.0);
    assert!(a.intersects(&b));
    assert!(!a.intersects(&c));

    let frame = normalize_frame(&frame_of(vec![
        rect("A", 0.0, 0.0, 10.0, 10.0),
        rect("B", 5.0, 5.0, 10.0, 10.0),
        rect("C", 20.0, 20.0, 10.0, 10.0),
    ]));
    let result = check_frame(&frame, &LayoutOptions::default());
    let overlaps: Vec<_> = result
        .issues
        .iter()
        .filter(|i| i.id.starts_with("overlap"))
        .collect();
    assert_eq!(overlaps.len(), 1);
    assert_eq!(overlaps[0].severity, Severity::High);
    assert!(!overlaps[0].overrideable);
    assert_eq!(overlaps[0].wcag_reference.as_deref(), Some("1.4.12 / 1.4.8"));
    assert_eq!(result.count_by_severity(Severity::High), 1);
}

#[test]
fn touching_edges_do_not_overlap() {
    let frame = normalize_frame(&frame_of(vec![
        rect("A", 16.0, 16.0, 16.0, 16.0),
        rect("B", 32.0, 16.0, 16.0, 16.0),
    ]));
    let result = check_frame(&frame, &LayoutOptions::default());
    assert!(!result.issues.iter().any(|i| i.id.starts_with("overlap")));
}

#[test]
fn legacy_formula_pins_zero_for_clean_layout() {
    let frame = normalize_frame(&frame_of(vec![rect("A", 16.0, 16.0, 48.0, 48.0)]));
    let legacy = check_frame(&frame, &LayoutOptions::default());
    assert!(legacy.issues.is_empty());
    assert_eq!(legacy.score, 0);

    let corrected = check_frame(
        &frame,
        &LayoutOptions {
            score_formula: LayoutScoreFormula::Corrected,
            ..Default::default()
        },
    );
    assert_eq!(corrected.score, 100);
}

#[test]
fn contrast_ratio_is_symmetric_and_at_least_one() {
    let colors = [
        Color::BLACK,
        Color::WHITE,
        Color::rgb(0.5, 0.2, 0.9),
        Color::rgb(0.1, 0.6, 0.3),
        "#777".parse::<Color>().expect("hex"),
    ];
    for a in &colors {
        for b in &colors {
            let ab = contrast_ratio(a, b);
            let ba = contrast_ratio(b, a);
            assert!((ab - ba).abs() < 1e-12);
            assert!(ab >= 1.0);
        }
    }
    assert!((contrast_ratio(&Color::BLACK, &Color::WHITE) - 21.0).abs() < 1e-9);
}

#[test]
fn frame_without_text_scores_full_color_and_typography() {
    let frame = normalize_frame(&frame_of(vec![rect("A", 16.0, 16.0, 20.0, 20.0)]));
    let score = FrameScorer::default().score(&frame);
    assert_eq!(score.color, 100);
    assert_eq!(score.typography, 100);
    assert_eq!(score.usability, 0);
}
