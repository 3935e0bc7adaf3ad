use alloc::{vec, vec::Vec};

use crate::core::{Value, ValueKey, ValueStream};

#[test]
fn scalar_equality_is_structural() {
  assert_eq!(Value::Int(3), Value::Int(3));
  assert_ne!(Value::Int(3), Value::Int(4));
  assert_eq!(Value::from("two"), Value::Text("two".into()));
  assert_eq!(Value::Null, Value::Null);
  assert_ne!(Value::Int(0), Value::Bool(false));
}

#[test]
fn streams_and_opaque_payloads_never_compare_equal() {
  assert_ne!(Value::Stream(ValueStream::empty()), Value::Stream(ValueStream::empty()));
  assert_ne!(Value::opaque(7_u8), Value::opaque(7_u8));
}

#[test]
fn comparable_shapes_project_to_keys() {
  assert_eq!(Value::Int(5).key(), Some(ValueKey::Int(5)));
  assert_eq!(Value::Bool(true).key(), Some(ValueKey::Bool(true)));
  assert_eq!(Value::from("x").key(), Some(ValueKey::Text("x".into())));
  assert_eq!(Value::Null.key(), None);
  assert_eq!(Value::Stream(ValueStream::empty()).key(), None);
  assert_eq!(Value::opaque(1_u8).key(), None);
}

#[test]
fn try_duplicate_copies_scalars_and_shares_opaque_payloads() {
  assert_eq!(Value::Int(2).try_duplicate(), Some(Value::Int(2)));
  let opaque = Value::opaque(9_u32);
  assert!(opaque.try_duplicate().is_some());
  assert!(Value::Stream(ValueStream::empty()).try_duplicate().is_none());
  let list = Value::List(vec![Value::Int(1), Value::Stream(ValueStream::empty())]);
  assert!(list.try_duplicate().is_none());
}

#[test]
fn fork_duplicates_scalars() {
  let (probe, pass) = Value::Int(4).fork();
  assert_eq!(probe, Value::Int(4));
  assert_eq!(pass, Value::Int(4));
}

#[test]
fn fork_splits_nested_streams_into_independent_cursors() {
  let (probe, pass) = Value::Stream(ValueStream::range(3)).fork();
  let Value::Stream(probe) = probe else {
    panic!("probe half must stay a stream");
  };
  let Value::Stream(pass) = pass else {
    panic!("forwarded half must stay a stream");
  };
  assert_eq!(probe.collect::<Vec<_>>(), vec![Value::Int(0), Value::Int(1), Value::Int(2)]);
  assert_eq!(pass.collect::<Vec<_>>(), vec![Value::Int(0), Value::Int(1), Value::Int(2)]);
}
