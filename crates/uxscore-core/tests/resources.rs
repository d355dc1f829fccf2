use std::collections::{BTreeMap, HashSet};

use uxscore_core::{
    select_resources, HeuristicBreakdownItem, HeuristicCode, ResourceKind,
};

#[test]
fn generic_resources_come_first() {
    let scores: BTreeMap<_, _> = [(HeuristicCode::H7, 20.0)].into_iter().collect();
    let out = select_resources(&scores, &[]);
    assert!(out.len() <= 10);
    assert!(out[..5].iter().all(|r| r.kind == ResourceKind::Generic));
    assert_eq!(out[5].kind, ResourceKind::UxLaw);
    assert!(out[5].url.ends_with("hicks-law/"));
}

#[test]
fn output_is_capped_and_deduplicated() {
    let scores: BTreeMap<_, _> = HeuristicCode::ALL.iter().map(|c| (*c, 1.0)).collect();
    let breakdown: Vec<_> = HeuristicCode::ALL
        .iter()
        .map(|c| HeuristicBreakdownItem::new(*c, 0.0))
        .collect();
    let out = select_resources(&scores, &breakdown);
    assert_eq!(out.len(), 10);
    let urls: HashSet<_> = out.iter().map(|r| r.url.clone()).collect();
    assert_eq!(urls.len(), out.len());
}

#[test]
fn breakdown_low_uses_raw_points() {
    let mut mid = HeuristicBreakdownItem::new(HeuristicCode::H9, 5.0);
    mid.max_points = Some(10.0);
    let out = select_resources(&BTreeMap::new(), &[mid]);
    assert!(!out.iter().any(|r| r.kind == ResourceKind::Accessibility));

    let mut low = HeuristicBreakdownItem::new(HeuristicCode::H9, 2.0);
    low.max_points = Some(10.0);
    let out = select_resources(&BTreeMap::new(), &[low]);
    let wcag = out
        .iter()
        .find(|r| r.kind == ResourceKind::Accessibility)
        .expect("accessibility resource");
    assert_eq!(wcag.heuristics, vec![HeuristicCode::H9]);
}
