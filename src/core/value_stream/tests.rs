use alloc::{vec, vec::Vec};

use crate::core::{PipelineError, Value, ValueStream, testing::int_values, to_stream};

#[test]
fn range_yields_half_open_interval() {
  assert_eq!(ValueStream::range(4).collect::<Vec<_>>(), int_values(&[0, 1, 2, 3]));
  assert!(ValueStream::range(0).next().is_none());
}

#[test]
fn from_values_yields_in_order() {
  let stream = ValueStream::from_values(int_values(&[3, 1, 2]));
  assert_eq!(stream.collect::<Vec<_>>(), int_values(&[3, 1, 2]));
}

#[test]
fn from_fn_pulls_until_none() {
  let mut remaining = 3_i64;
  let stream = ValueStream::from_fn(move || {
    if remaining == 0 {
      return None;
    }
    remaining -= 1;
    Some(Value::Int(remaining))
  });
  assert_eq!(stream.collect::<Vec<_>>(), int_values(&[2, 1, 0]));
}

#[test]
fn into_values_materializes_nested_streams_recursively() {
  let nested = ValueStream::from_values(vec![
    Value::Int(1),
    Value::Stream(ValueStream::from_values(vec![Value::Int(2), Value::Stream(ValueStream::range(2))])),
  ]);
  let values = nested.into_values();
  assert_eq!(values, vec![
    Value::Int(1),
    Value::List(vec![Value::Int(2), Value::List(int_values(&[0, 1]))]),
  ]);
}

#[test]
fn split_yields_the_same_sequence_on_both_branches() {
  let (first, second) = ValueStream::range(5).split();
  assert_eq!(first.collect::<Vec<_>>(), int_values(&[0, 1, 2, 3, 4]));
  assert_eq!(second.collect::<Vec<_>>(), int_values(&[0, 1, 2, 3, 4]));
}

#[test]
fn split_branches_progress_independently() {
  let (mut first, mut second) = ValueStream::range(3).split();
  assert_eq!(first.next(), Some(Value::Int(0)));
  assert_eq!(first.next(), Some(Value::Int(1)));
  assert_eq!(second.next(), Some(Value::Int(0)));
  assert_eq!(first.next(), Some(Value::Int(2)));
  assert_eq!(first.next(), None);
  assert_eq!(second.collect::<Vec<_>>(), int_values(&[1, 2]));
}

#[test]
fn split_recursively_splits_nested_streams() {
  let source = ValueStream::from_values(vec![Value::Stream(ValueStream::range(3)), Value::Int(9)]);
  let (first, second) = source.split();
  assert_eq!(first.into_values(), vec![Value::List(int_values(&[0, 1, 2])), Value::Int(9)]);
  assert_eq!(second.into_values(), vec![Value::List(int_values(&[0, 1, 2])), Value::Int(9)]);
}

#[test]
fn flatten_linearizes_depth_first() {
  let source = ValueStream::from_values(vec![
    Value::Int(0),
    Value::Stream(ValueStream::from_values(vec![
      Value::Int(1),
      Value::Stream(ValueStream::from_values(int_values(&[2, 3]))),
      Value::Int(4),
    ])),
    Value::Int(5),
  ]);
  assert_eq!(source.flatten().collect::<Vec<_>>(), int_values(&[0, 1, 2, 3, 4, 5]));
}

#[test]
fn flatten_expands_materialized_lists() {
  let source = ValueStream::from_values(vec![Value::List(int_values(&[1, 2])), Value::Int(3)]);
  assert_eq!(source.flatten().collect::<Vec<_>>(), int_values(&[1, 2, 3]));
}

#[test]
fn interleave_alternates_starting_with_first() {
  let stream = ValueStream::interleave(ValueStream::range(3), ValueStream::from_values(int_values(&[10, 11, 12])));
  assert_eq!(stream.collect::<Vec<_>>(), int_values(&[0, 10, 1, 11, 2, 12]));
}

#[test]
fn interleave_stops_when_either_input_is_exhausted() {
  let stream = ValueStream::interleave(ValueStream::range(18), ValueStream::range(20));
  assert_eq!(stream.collect::<Vec<_>>().len(), 36);

  let stream = ValueStream::interleave(ValueStream::range(20), ValueStream::range(2));
  assert_eq!(stream.collect::<Vec<_>>(), int_values(&[0, 0, 1, 1]));
}

#[test]
fn to_stream_dispatches_on_value_shape() {
  let stream = to_stream(Value::Int(3)).expect("range source");
  assert_eq!(stream.collect::<Vec<_>>(), int_values(&[0, 1, 2]));

  let stream = to_stream(Value::List(int_values(&[7, 8]))).expect("list source");
  assert_eq!(stream.collect::<Vec<_>>(), int_values(&[7, 8]));

  let stream = to_stream(Value::Stream(ValueStream::range(2))).expect("stream source");
  assert_eq!(stream.collect::<Vec<_>>(), int_values(&[0, 1]));
}

#[test]
fn to_stream_rejects_unsupported_shapes() {
  assert!(matches!(to_stream(Value::Bool(true)), Err(PipelineError::UnsupportedSource { kind: "bool" })));
  assert!(matches!(to_stream(Value::Int(-1)), Err(PipelineError::UnsupportedSource { kind: "int" })));
  assert!(matches!(to_stream(Value::Null), Err(PipelineError::UnsupportedSource { kind: "null" })));
}
