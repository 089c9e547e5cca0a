//! Integration tests for Value types
//!
//! Tests Value enum variants, equality, hashing, and display.

use epochweave_foundation::collections::{PMap, PSet, PVec};
use epochweave_foundation::Value;
use std::collections::HashSet;
use std::sync::Arc;

// =============================================================================
// Value Construction
// =============================================================================

#[test]
fn value_nil() {
    let v = Value::Nil;
    assert!(v.is_nil());
}

#[test]
fn value_bool_true() {
    let v = Value::Bool(true);
    assert_eq!(v.as_bool(), Some(true));
}

#[test]
fn value_bool_false() {
    let v = Value::Bool(false);
    assert_eq!(v.as_bool(), Some(false));
}

#[test]
fn value_int() {
    let v = Value::Int(42);
    assert_eq!(v.as_int(), Some(42));
    assert_eq!(v.as_float(), None);
}

#[test]
fn value_float() {
    let v = Value::Float(1.5);
    assert_eq!(v.as_float(), Some(1.5));
    assert_eq!(v.as_int(), None);
}

#[test]
fn value_string() {
    let v = Value::String(Arc::from("hello"));
    assert_eq!(v.as_str(), Some("hello"));
}

#[test]
fn value_empty_string_is_a_distinct_value() {
    let v = Value::String(Arc::from(""));
    assert_ne!(v, Value::Nil);
}

// =============================================================================
// Value Equality
// =============================================================================

#[test]
fn value_equality_nil() {
    assert_eq!(Value::Nil, Value::Nil);
}

#[test]
fn value_equality_bool() {
    assert_eq!(Value::Bool(true), Value::Bool(true));
    assert_eq!(Value::Bool(false), Value::Bool(false));
    assert_ne!(Value::Bool(true), Value::Bool(false));
}

#[test]
fn value_equality_int() {
    assert_eq!(Value::Int(42), Value::Int(42));
    assert_ne!(Value::Int(42), Value::Int(43));
}

#[test]
fn value_equality_float() {
    assert_eq!(Value::Float(1.5), Value::Float(1.5));
    assert_ne!(Value::Float(1.5), Value::Float(2.5));
}

#[test]
fn value_equality_int_float_not_equal() {
    // Int and Float are different types, even with same numeric value.
    // A node-val attribute written as Int(42) never compares equal to Float(42.0).
    assert_ne!(Value::Int(42), Value::Float(42.0));
}

#[test]
fn value_equality_string() {
    assert_eq!(
        Value::String(Arc::from("hello")),
        Value::String(Arc::from("hello"))
    );
    assert_ne!(
        Value::String(Arc::from("hello")),
        Value::String(Arc::from("world"))
    );
}

// =============================================================================
// Value Hashing (Values serve as node/edge keys, so they must be hashable)
// =============================================================================

#[test]
#[allow(clippy::mutable_key_type)]
fn value_hash_consistency() {
    let v1 = Value::Int(42);
    let v2 = Value::Int(42);
    assert_eq!(v1, v2);

    let mut set = HashSet::new();
    set.insert(v1.clone());
    assert!(set.contains(&v2));
}

#[test]
#[allow(clippy::mutable_key_type)]
fn value_hash_string() {
    let mut set = HashSet::new();
    set.insert(Value::String(Arc::from("hello")));
    assert!(set.contains(&Value::String(Arc::from("hello"))));
    assert!(!set.contains(&Value::String(Arc::from("world"))));
}

#[test]
#[allow(clippy::mutable_key_type)]
fn value_hash_mixed_types() {
    let mut set = HashSet::new();
    set.insert(Value::Nil);
    set.insert(Value::Bool(true));
    set.insert(Value::Int(42));
    set.insert(Value::String(Arc::from("hello")));

    assert_eq!(set.len(), 4);
    assert!(set.contains(&Value::Nil));
    assert!(set.contains(&Value::Bool(true)));
    assert!(set.contains(&Value::Int(42)));
    assert!(set.contains(&Value::String(Arc::from("hello"))));
}

#[test]
#[allow(clippy::mutable_key_type)]
fn value_as_node_key_in_set() {
    // This is exactly how a graph's "nodes" set is keyed in storage.
    let mut nodes: HashSet<Value> = HashSet::new();
    nodes.insert(Value::from("A"));
    nodes.insert(Value::from("B"));
    nodes.insert(Value::Int(7));

    assert!(nodes.contains(&Value::from("A")));
    assert!(nodes.contains(&Value::Int(7)));
    assert!(!nodes.contains(&Value::from("C")));
}

// =============================================================================
// Value Display
// =============================================================================

#[test]
fn value_display_nil() {
    assert_eq!(format!("{}", Value::Nil), "nil");
}

#[test]
fn value_display_bool() {
    assert_eq!(format!("{}", Value::Bool(true)), "true");
    assert_eq!(format!("{}", Value::Bool(false)), "false");
}

#[test]
fn value_display_int() {
    assert_eq!(format!("{}", Value::Int(42)), "42");
    assert_eq!(format!("{}", Value::Int(-17)), "-17");
}

#[test]
fn value_display_float() {
    let display = format!("{}", Value::Float(1.5));
    assert!(display.starts_with("1.5"));
}

#[test]
fn value_display_string() {
    assert_eq!(format!("{}", Value::String(Arc::from("hello"))), "hello");
}

// =============================================================================
// Value Collections (nested dict-valued / list-valued attributes)
// =============================================================================

#[test]
fn value_vector() {
    let vec = PVec::new()
        .push_back(Value::Int(1))
        .push_back(Value::Int(2))
        .push_back(Value::Int(3));
    let v = Value::Vec(vec);
    if let Value::Vec(vec) = v {
        assert_eq!(vec.len(), 3);
    } else {
        panic!("Expected Vec");
    }
}

#[test]
fn value_empty_vector() {
    let v = Value::Vec(PVec::new());
    if let Value::Vec(vec) = v {
        assert!(vec.is_empty());
    } else {
        panic!("Expected Vec");
    }
}

#[test]
fn value_set() {
    let set: PSet<Value> = [Value::Int(1), Value::Int(2), Value::Int(1)]
        .into_iter()
        .collect();
    let v = Value::Set(set);
    if let Value::Set(set) = v {
        assert_eq!(set.len(), 2); // duplicates removed
    } else {
        panic!("Expected Set");
    }
}

#[test]
fn value_map() {
    let map = PMap::new()
        .insert(Value::from("a"), Value::Int(1))
        .insert(Value::from("b"), Value::Int(2));
    let v = Value::Map(map);

    if let Value::Map(map) = v {
        assert_eq!(map.len(), 2);
        assert_eq!(map.get(&Value::from("a")), Some(&Value::Int(1)));
    } else {
        panic!("Expected Map");
    }
}
