use ethernity_core::utils::ether;
use ethernity_detector_threat::trace::{any_call, collect_calls, walk_calls};
use ethernity_detector_threat::{CallGraph, CallRecord, Selector, SignatureRegistry};

const A: &str = "0x00000000000000000000000000000000000000aa";
const B: &str = "0x00000000000000000000000000000000000000bb";
const C: &str = "0x00000000000000000000000000000000000000cc";

fn withdraw() -> String {
    format!("{}{:0>64}", Selector::from_signature("withdraw(uint256)").to_hex(), "1")
}

#[test]
fn forward_edges_keep_index_and_value() {
    let registry = SignatureRegistry::default();
    let calls = vec![CallRecord::new(A, B), CallRecord::new(B, C)];
    let graph = CallGraph::build(&calls, &registry);

    assert_eq!(graph.node_count(), 3);
    assert_eq!(graph.edge_count(), 2);
    let edge = &graph.edges_from(B)[0];
    assert_eq!(edge.to, C);
    assert_eq!(edge.call_index, 1);
    assert!(edge.value.is_zero());
    assert!(!edge.callback);
}

#[test]
fn value_and_withdraw_add_callback_edges() {
    let registry = SignatureRegistry::default();
    let calls = vec![
        CallRecord::new(A, B).with_value(ether(1)),
        CallRecord::new(B, C).with_input(withdraw()),
    ];
    let graph = CallGraph::build(&calls, &registry);

    assert_eq!(graph.edge_count(), 4);
    assert!(graph.edges_from(B).iter().any(|e| e.to == A && e.callback && e.call_index == 0));
    assert!(graph.edges_from(C).iter().any(|e| e.to == B && e.callback && e.call_index == 1));
}

#[test]
fn calls_without_endpoints_are_skipped() {
    let registry = SignatureRegistry::default();
    let mut orphan = CallRecord::new(A, B);
    orphan.to = None;
    let mut empty = CallRecord::new(A, B);
    empty.from = Some("0x".to_string());
    let graph = CallGraph::build(&[orphan, empty], &registry);

    assert_eq!(graph.node_count(), 0);
    assert_eq!(graph.edge_count(), 0);
}

#[test]
fn addresses_are_normalized() {
    let registry = SignatureRegistry::default();
    let upper = "0x00000000000000000000000000000000000000AA";
    let graph = CallGraph::build(&[CallRecord::new(upper, B), CallRecord::new(B, A)], &registry);
    assert_eq!(graph.node_count(), 2);
    assert_eq!(graph.find_cycles(3).len(), 2);
}

#[test]
fn cycle_is_suffix_through_repeat() {
    let registry = SignatureRegistry::default();
    let calls = vec![CallRecord::new(A, B), CallRecord::new(B, C), CallRecord::new(C, B)];
    let graph = CallGraph::build(&calls, &registry);
    let cycles = graph.find_cycles(3);

    let expected_from_a: Vec<String> = vec![B.into(), C.into(), B.into()];
    assert!(cycles.contains(&expected_from_a));
    assert!(cycles.iter().all(|cycle| cycle.first() == cycle.last()));
    assert!(cycles.iter().all(|cycle| !cycle.contains(&A.to_string())));
}

#[test]
fn search_depth_is_capped() {
    let registry = SignatureRegistry::default();
    let calls = vec![CallRecord::new(A, B), CallRecord::new(B, C), CallRecord::new(C, A)];
    let graph = CallGraph::build(&calls, &registry);

    assert!(!graph.find_cycles(3).is_empty());
    assert!(graph.find_cycles(2).is_empty());
}

#[test]
fn cycle_search_is_deterministic() {
    let registry = SignatureRegistry::default();
    let calls = vec![
        CallRecord::new(A, B).with_value(ether(1)),
        CallRecord::new(B, C).with_value(ether(1)),
        CallRecord::new(C, A),
    ];
    let graph = CallGraph::build(&calls, &registry);
    assert_eq!(graph.find_cycles(3), graph.find_cycles(3));
}

#[test]
fn walk_is_preorder_and_depth_limited() {
    let leaf = CallRecord::new(C, A);
    let middle = CallRecord::new(B, C).with_calls(vec![leaf]);
    let calls = vec![CallRecord::new(A, B).with_calls(vec![middle]), CallRecord::new(A, C)];

    let mut visited = Vec::new();
    walk_calls(&calls, 8, |depth, call| visited.push((depth, call.to_address().unwrap())));
    assert_eq!(
        visited,
        vec![(0, B.to_string()), (1, C.to_string()), (2, A.to_string()), (0, C.to_string())]
    );

    assert_eq!(collect_calls(&calls, 1).len(), 3);
    assert_eq!(collect_calls(&calls, 0).len(), 2);
    assert!(any_call(&calls, 2, |c| c.from_address().as_deref() == Some(C)));
    assert!(!any_call(&calls, 1, |c| c.from_address().as_deref() == Some(C)));
}
