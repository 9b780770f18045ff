use std::time::Duration;

use super::*;

#[test]
fn test_time_termination() {
    let scope = SearchScope::new();
    assert!(!TimeTermination::seconds(60).is_terminated(&scope));
    assert!(TimeTermination::new(Duration::ZERO).is_terminated(&scope));
}

#[test]
fn test_node_count_termination() {
    let mut scope = SearchScope::new();
    let term = NodeCountTermination::new(2);
    scope.record_node();
    assert!(!term.is_terminated(&scope));
    scope.record_node();
    assert!(term.is_terminated(&scope));
}

#[test]
fn test_or_termination() {
    let mut scope = SearchScope::new();
    let term = OrTermination::new((TimeTermination::seconds(60), NodeCountTermination::new(1)));
    assert!(!term.is_terminated(&scope));
    scope.record_node();
    assert!(term.is_terminated(&scope));
}

#[test]
fn test_absent_termination_never_fires() {
    let mut scope = SearchScope::new();
    scope.record_node();
    let none: Option<NodeCountTermination> = None;
    assert!(!none.is_terminated(&scope));
    assert!(Some(NodeCountTermination::new(1)).is_terminated(&scope));
}
