use alloc::{vec, vec::Vec};

use crossbeam_channel::unbounded;

use crate::{
  core::{
    PipelineDslError, PipelineError, Value, ValueStream, chunk, chunk_by, dedupe, drop, drop_while, eduction, escape,
    filter, keep, keep_indexed, map, mapcat, random_sample, remove, replace, take, take_nth, take_while,
    transduce_values,
    testing::{even, flatten_exploder, inc, int_values, range_exploder, sum},
  },
  std::ChannelSender,
};

fn ints(values: &[i64]) -> ValueStream {
  ValueStream::from_values(int_values(values))
}

#[test]
fn map_transforms_each_value() {
  let values = transduce_values(ints(&[1, 2, 3]), &[map(inc)]).expect("map");
  assert_eq!(values, int_values(&[2, 3, 4]));
}

#[test]
fn filter_forwards_matching_values() {
  let values = transduce_values(ints(&[1, 2, 3, 4, 5]), &[filter(even)]).expect("filter");
  assert_eq!(values, int_values(&[2, 4]));
}

#[test]
fn filter_splits_nested_streams_for_inspection() {
  let stack = [
    chunk(2).expect("chunk"),
    filter(|value| matches!(sum(value), Value::Int(total) if total > 2)),
    mapcat(flatten_exploder),
  ];
  let values = transduce_values(ints(&[0, 1, 2, 3, 4]), &stack).expect("filtered chunks");
  assert_eq!(values, int_values(&[2, 3, 4]));
}

#[test]
fn remove_drops_matching_values() {
  let values = transduce_values(ints(&[1, 2, 3, 4, 5]), &[remove(even)]).expect("remove");
  assert_eq!(values, int_values(&[1, 3, 5]));
}

#[test]
fn mapcat_concatenates_exploded_streams() {
  let values = transduce_values(ints(&[1, 2, 3]), &[mapcat(range_exploder)]).expect("mapcat");
  assert_eq!(values, int_values(&[0, 0, 1, 0, 1, 2]));
}

#[test]
fn mapcat_stops_pulling_once_downstream_terminates() {
  let values = transduce_values(ints(&[5]), &[mapcat(range_exploder), take(2)]).expect("mapcat take");
  assert_eq!(values, int_values(&[0, 1]));
}

#[test]
fn dedupe_forwards_first_occurrences_only() {
  let values = transduce_values(ints(&[1, 1, 2, 1, 3, 2]), &[dedupe()]).expect("dedupe");
  assert_eq!(values, int_values(&[1, 2, 3]));
}

#[test]
fn dedupe_fails_predictably_on_incomparable_values() {
  let source = ValueStream::from_values(vec![Value::Stream(ValueStream::empty())]);
  let error = transduce_values(source, &[dedupe()]).expect_err("incomparable");
  assert_eq!(error, PipelineError::Incomparable { stage: "dedupe", kind: "stream" });
}

#[test]
fn chunk_buffers_fixed_size_nested_streams_and_flushes_the_partial_tail() {
  let values = eduction(ints(&[0, 1, 2, 3, 4]), &[chunk(2).expect("chunk")]).into_values();
  assert_eq!(values, vec![
    Value::List(int_values(&[0, 1])),
    Value::List(int_values(&[2, 3])),
    Value::List(int_values(&[4])),
  ]);
}

#[test]
fn chunk_rejects_zero_size() {
  let error = chunk(0).expect_err("zero chunk");
  assert_eq!(error, PipelineDslError::InvalidArgument {
    name:   "size",
    value:  0,
    reason: "must be greater than zero",
  });
}

#[test]
fn chunk_by_groups_runs_while_the_projected_key_is_unchanged() {
  let chunker = |value: Value| match value {
    | Value::Int(value) if value < 4 => Value::from("boo"),
    | Value::Int(value) if value < 7 => Value::Bool(false),
    | _ => Value::from("boo"),
  };
  let values = transduce_values(ValueStream::range(10), &[chunk_by(chunker), map(sum)]).expect("chunk_by");
  assert_eq!(values, int_values(&[6, 15, 24]));
}

#[test]
fn chunk_by_splits_nested_stream_inputs_for_the_keyer() {
  let stack = [
    chunk(3).expect("chunk"),
    chunk_by(|value| Value::Bool(matches!(sum(value), Value::Int(total) if total > 7))),
    mapcat(flatten_exploder),
  ];
  let values = transduce_values(ValueStream::range(18), &stack).expect("chunked runs");
  assert_eq!(values, ValueStream::range(18).collect::<Vec<_>>());
}

#[test]
fn random_sample_with_certainty_forwards_everything() {
  let values = transduce_values(ValueStream::range(12), &[random_sample(1.0).expect("rho")]).expect("sample");
  assert_eq!(values, ValueStream::range(12).collect::<Vec<_>>());
}

#[test]
fn random_sample_with_zero_probability_drops_everything() {
  let values = transduce_values(ValueStream::range(12), &[random_sample(0.0).expect("rho")]).expect("sample");
  assert_eq!(values, Vec::new());
}

#[test]
fn random_sample_rejects_probabilities_outside_the_unit_interval() {
  assert!(matches!(random_sample(1.5), Err(PipelineDslError::InvalidProbability { .. })));
  assert!(matches!(random_sample(-0.1), Err(PipelineDslError::InvalidProbability { .. })));
}

#[test]
fn take_nth_forwards_every_nth_value() {
  let values = transduce_values(ValueStream::range(21), &[take_nth(7).expect("n")]).expect("take_nth");
  assert_eq!(values, int_values(&[6, 13, 20]));
}

#[test]
fn take_nth_rejects_zero() {
  assert!(matches!(take_nth(0), Err(PipelineDslError::InvalidArgument { name: "n", .. })));
}

#[test]
fn take_forwards_exactly_the_requested_count() {
  let values = transduce_values(ValueStream::range(10), &[take(3)]).expect("take");
  assert_eq!(values, int_values(&[0, 1, 2]));
}

#[test]
fn take_zero_terminates_without_forwarding() {
  let values = transduce_values(ValueStream::range(5), &[take(0)]).expect("take zero");
  assert_eq!(values, Vec::new());
}

#[test]
fn take_while_terminates_on_the_first_failing_value_without_forwarding_it() {
  let values =
    transduce_values(ints(&[1, 2, 7, 3]), &[take_while(|value| matches!(value, Value::Int(v) if v < 5))])
      .expect("take_while");
  assert_eq!(values, int_values(&[1, 2]));
}

#[test]
fn drop_skips_the_first_values_then_forwards_unchanged() {
  let values = transduce_values(ValueStream::range(5), &[drop(2)]).expect("drop");
  assert_eq!(values, int_values(&[2, 3, 4]));
}

#[test]
fn drop_while_stops_testing_after_the_first_failing_value() {
  let values =
    transduce_values(ints(&[1, 2, 3, 6, 2, 8]), &[drop_while(|value| matches!(value, Value::Int(v) if v < 5))])
      .expect("drop_while");
  assert_eq!(values, int_values(&[6, 2, 8]));
}

#[test]
fn keep_drops_only_null_results() {
  let source = ValueStream::from_values(vec![
    Value::Int(0),
    Value::Null,
    Value::Int(1),
    Value::Int(2),
    Value::Null,
    Value::Bool(false),
  ]);
  let to_int = map(|value| match value {
    | Value::Bool(_) => Value::Int(15),
    | value => value,
  });
  let values = transduce_values(source, &[keep(|value| value), to_int]).expect("keep");
  assert_eq!(values, int_values(&[0, 1, 2, 15]));
}

#[test]
fn keep_indexed_increments_the_index_on_every_call() {
  let keeper = keep_indexed(|index, value| match value {
    | Value::Int(value) if index % 2 == 0 => Value::Int(index as i64 * value),
    | _ => Value::Null,
  });
  let values = transduce_values(ValueStream::range(7), &[keeper]).expect("keep_indexed");
  assert_eq!(values, int_values(&[0, 4, 16, 36]));
}

#[test]
fn replace_substitutes_mapped_values_and_forwards_the_rest() {
  let table = replace(vec![(Value::Int(2), Value::from("two")), (Value::Int(6), Value::from("six"))]).expect("table");
  let values = transduce_values(ints(&[1, 2, 6, 3]), &[table]).expect("replace");
  assert_eq!(values, vec![Value::Int(1), Value::from("two"), Value::from("six"), Value::Int(3)]);
}

#[test]
fn replace_rejects_incomparable_keys_and_unduplicable_replacements() {
  let incomparable = replace(vec![(Value::Stream(ValueStream::empty()), Value::Int(1))]);
  assert!(matches!(incomparable, Err(PipelineDslError::IncomparableKey { kind: "stream" })));

  let unduplicable = replace(vec![(Value::Int(1), Value::Stream(ValueStream::empty()))]);
  assert!(matches!(unduplicable, Err(PipelineDslError::UnsupportedReplacement { kind: "stream" })));
}

#[test]
fn escape_diverts_matching_values_and_closes_the_queue_on_complete() {
  let (sender, receiver) = unbounded();
  let values =
    transduce_values(ValueStream::range(5), &[escape(even, ChannelSender::new(sender), true)]).expect("escape");
  assert_eq!(values, int_values(&[1, 3]));
  assert_eq!(receiver.iter().collect::<Vec<_>>(), int_values(&[0, 2, 4]));
}

#[test]
fn append_terminal_rejects_the_drop_sentinel() {
  let source = ValueStream::from_values(vec![Value::Null]);
  let error = transduce_values(source, &[]).expect_err("null is not appendable");
  assert_eq!(error, PipelineError::ShapeMismatch { stage: "append", kind: "null" });
}

#[test]
fn append_terminal_flattens_nested_streams() {
  let source = ValueStream::from_values(vec![Value::Int(9), Value::Stream(ValueStream::range(2))]);
  let values = transduce_values(source, &[]).expect("append");
  assert_eq!(values, int_values(&[9, 0, 1]));
}
