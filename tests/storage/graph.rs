//! Integration tests for `GraphState`.

use epochweave_storage::{is_reserved_graph_name, GraphState};
use epochweave_foundation::Value;

fn v(s: &str) -> Value {
    Value::from(s)
}

#[test]
fn new_graph_is_empty() {
    let g = GraphState::new();
    assert!(g.iter_nodes().next().is_none());
    assert!(g.iter_edges().next().is_none());
    assert!(g.iter_graph_val().next().is_none());
}

#[test]
fn node_lifecycle() {
    let g = GraphState::new();
    assert!(!g.has_node(&v("A")));

    let g = g.add_node(v("A"));
    assert!(g.has_node(&v("A")));

    let g = g.del_node(&v("A"));
    assert!(!g.has_node(&v("A")));
}

#[test]
fn node_val_requires_existing_node() {
    let g = GraphState::new().set_node_val(v("A"), v("color"), v("red"));
    // A was never added, so the attribute write is silently dropped.
    assert_eq!(g.node_val(&v("A"), &v("color")), None);
}

#[test]
fn node_val_roundtrip() {
    let g = GraphState::new()
        .add_node(v("A"))
        .set_node_val(v("A"), v("color"), v("red"));
    assert_eq!(g.node_val(&v("A"), &v("color")), Some(&v("red")));
}

#[test]
fn setting_node_val_to_nil_deletes_it() {
    let g = GraphState::new()
        .add_node(v("A"))
        .set_node_val(v("A"), v("color"), v("red"))
        .set_node_val(v("A"), v("color"), Value::Nil);
    assert_eq!(g.node_val(&v("A"), &v("color")), None);
}

#[test]
fn deleting_a_node_drops_its_attributes() {
    let g = GraphState::new()
        .add_node(v("A"))
        .set_node_val(v("A"), v("color"), v("red"))
        .del_node(&v("A"));
    assert_eq!(g.node_val(&v("A"), &v("color")), None);
}

#[test]
fn edge_requires_both_endpoints_to_exist() {
    let g = GraphState::new().add_node(v("A"));
    let g2 = g.add_edge(v("A"), v("B"), 0);
    assert!(!g2.has_edge(&v("A"), &v("B"), 0));

    let g3 = g.add_node(v("B")).add_edge(v("A"), v("B"), 0);
    assert!(g3.has_edge(&v("A"), &v("B"), 0));
}

#[test]
fn deleting_an_edge_drops_its_attributes() {
    let g = GraphState::new()
        .add_node(v("A"))
        .add_node(v("B"))
        .add_edge(v("A"), v("B"), 0)
        .set_edge_val((v("A"), v("B"), 0), v("weight"), Value::Int(5));
    assert_eq!(g.edge_val(&(v("A"), v("B"), 0), &v("weight")), Some(&Value::Int(5)));

    let g2 = g.del_edge(&v("A"), &v("B"), 0);
    assert!(!g2.has_edge(&v("A"), &v("B"), 0));
    assert_eq!(g2.edge_val(&(v("A"), v("B"), 0), &v("weight")), None);
}

#[test]
fn deleting_a_node_cascades_to_incident_edges() {
    let g = GraphState::new()
        .add_node(v("A"))
        .add_node(v("B"))
        .add_node(v("C"))
        .add_edge(v("A"), v("B"), 0)
        .add_edge(v("B"), v("C"), 0);

    let g2 = g.del_node(&v("B"));
    assert!(!g2.has_edge(&v("A"), &v("B"), 0));
    assert!(!g2.has_edge(&v("B"), &v("C"), 0));
    // Unrelated node untouched.
    assert!(g2.has_node(&v("A")));
    assert!(g2.has_node(&v("C")));
}

#[test]
fn graph_val_roundtrip() {
    let g = GraphState::new().set_graph_val(v("name"), v("physical"));
    assert_eq!(g.graph_val(&v("name")), Some(&v("physical")));
}

#[test]
fn functional_update_leaves_original_untouched() {
    let g1 = GraphState::new().add_node(v("A"));
    let g2 = g1.add_node(v("B"));

    assert!(g1.has_node(&v("A")));
    assert!(!g1.has_node(&v("B")));
    assert!(g2.has_node(&v("A")));
    assert!(g2.has_node(&v("B")));
}

#[test]
fn multigraph_edges_distinguished_by_idx() {
    let g = GraphState::new()
        .add_node(v("A"))
        .add_node(v("B"))
        .add_edge(v("A"), v("B"), 0)
        .add_edge(v("A"), v("B"), 1);

    assert!(g.has_edge(&v("A"), &v("B"), 0));
    assert!(g.has_edge(&v("A"), &v("B"), 1));
    assert_eq!(g.iter_edges().count(), 2);
}

#[test]
fn reserved_graph_names() {
    assert!(is_reserved_graph_name("global"));
    assert!(!is_reserved_graph_name("physical"));
}
