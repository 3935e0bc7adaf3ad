//! Worked predicates shared by examples and tests.
//!
//! These are example inputs to the engine, not part of it: an increment
//! mapper, an even-test, range and flatten exploders and a nested-stream
//! summation.

use alloc::vec::Vec;

use super::{Value, ValueStream};

/// Increments an integer value; every other shape passes through unchanged.
#[must_use]
pub fn inc(value: Value) -> Value {
  match value {
    | Value::Int(value) => Value::Int(value + 1),
    | value => value,
  }
}

/// Returns true for even integer values.
#[must_use]
pub fn even(value: Value) -> bool {
  matches!(value, Value::Int(value) if value % 2 == 0)
}

/// Explodes an integer `n` into the range stream `[0, n)`.
///
/// Non-integers explode into the empty stream.
#[must_use]
pub fn range_exploder(value: Value) -> ValueStream {
  match value {
    | Value::Int(end) if end >= 0 => ValueStream::range(end),
    | _ => ValueStream::empty(),
  }
}

/// Explodes any value into the flat stream of its scalar elements.
///
/// Nested streams and lists are linearized depth-first; a scalar becomes a
/// single-element stream.
#[must_use]
pub fn flatten_exploder(value: Value) -> ValueStream {
  match value {
    | Value::Stream(stream) => stream.flatten(),
    | Value::List(items) => ValueStream::from_values(items).flatten(),
    | value => ValueStream::single(value),
  }
}

/// Sums the integer elements reachable from the value.
#[must_use]
pub fn sum(value: Value) -> Value {
  let mut total = 0;
  flatten_exploder(value).each(|item| {
    if let Value::Int(item) = item {
      total += item;
    }
  });
  Value::Int(total)
}

/// Materializes a slice of integers as pipeline values.
#[must_use]
pub fn int_values(values: &[i64]) -> Vec<Value> {
  values.iter().copied().map(Value::Int).collect()
}
