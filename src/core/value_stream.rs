use alloc::{boxed::Box, collections::VecDeque, sync::Arc, vec, vec::Vec};

use spin::Mutex as SpinMutex;

use super::{PipelineError, Value};

#[cfg(test)]
mod tests;

/// One-step pull contract backing every stream shape.
pub(crate) trait StreamLogic: Send {
  fn pull(&mut self) -> Option<Value>;
}

/// Pull-based, forward-only sequence of heterogeneous values.
///
/// A stream is defined solely by its pull contract: each call yields either
/// the next value or the terminal done marker, surfaced here through the
/// [`Iterator`] implementation. Streams are single-pass and single-consumer.
pub struct ValueStream {
  logic: Box<dyn StreamLogic>,
}

impl ValueStream {
  pub(crate) fn from_logic(logic: Box<dyn StreamLogic>) -> Self {
    Self { logic }
  }

  /// Creates a stream that is exhausted from the start.
  #[must_use]
  pub fn empty() -> Self {
    Self::from_values(Vec::new())
  }

  /// Creates a stream over a single value.
  #[must_use]
  pub fn single(value: Value) -> Self {
    Self::from_values(vec![value])
  }

  /// Creates a lazy cursor over a materialized sequence.
  #[must_use]
  pub fn from_values(values: Vec<Value>) -> Self {
    Self::from_logic(Box::new(ValuesLogic { iter: values.into_iter() }))
  }

  /// Creates a stream over the integer range `[0, end)`.
  #[must_use]
  pub fn range(end: i64) -> Self {
    Self::from_logic(Box::new(RangeLogic { next: 0, end }))
  }

  /// Creates a stream from an arbitrary pull closure.
  #[must_use]
  pub fn from_fn<F>(func: F) -> Self
  where
    F: FnMut() -> Option<Value> + Send + 'static, {
    Self::from_logic(Box::new(FnLogic { func: Box::new(func) }))
  }

  /// Drains the stream through a callback.
  pub fn each<F>(self, mut func: F)
  where
    F: FnMut(Value), {
    for value in self {
      func(value);
    }
  }

  /// Drains the stream into a materialized sequence.
  ///
  /// Nested streams are recursively materialized into [`Value::List`]
  /// sub-sequences.
  #[must_use]
  pub fn into_values(self) -> Vec<Value> {
    self.map(materialize).collect()
  }

  /// Splits the stream into two branches yielding the same sequence.
  ///
  /// The branches co-own a shared buffer: the branch that is ahead pulls
  /// from the underlying source and leaves a copy for the other, the branch
  /// that is behind drains its buffer first. A pulled nested stream is
  /// recursively split so each branch owns independent inner cursors. Each
  /// branch is single-consumer.
  #[must_use]
  pub fn split(self) -> (Self, Self) {
    let shared = Arc::new(SpinMutex::new(SplitShared { source: Some(self), buffers: [VecDeque::new(), VecDeque::new()] }));
    let first = Self::from_logic(Box::new(SplitBranch { shared: shared.clone(), branch: 0 }));
    let second = Self::from_logic(Box::new(SplitBranch { shared, branch: 1 }));
    (first, second)
  }

  /// Linearizes nested streams depth-first into one flat stream.
  ///
  /// A stream that transitively contains itself makes this loop forever;
  /// cyclic streams are unsupported.
  #[must_use]
  pub fn flatten(self) -> Self {
    Self::from_logic(Box::new(FlattenLogic { stack: vec![self] }))
  }

  /// Yields values from both streams alternately, starting with `first`.
  ///
  /// The result terminates as soon as either input is exhausted, even if
  /// the other could still yield.
  #[must_use]
  pub fn interleave(first: Self, second: Self) -> Self {
    Self::from_logic(Box::new(InterleaveLogic { first, second, pending: None, done: false }))
  }
}

impl Iterator for ValueStream {
  type Item = Value;

  fn next(&mut self) -> Option<Value> {
    self.logic.pull()
  }
}

/// Dispatches a value to the stream shape it represents.
///
/// A nested stream streams as itself, a materialized sequence becomes a lazy
/// cursor and a non-negative integer `n` becomes the range `[0, n)`.
///
/// # Errors
///
/// Returns [`PipelineError::UnsupportedSource`] for every other shape.
pub fn to_stream(value: Value) -> Result<ValueStream, PipelineError> {
  match value {
    | Value::Stream(stream) => Ok(stream),
    | Value::List(items) => Ok(ValueStream::from_values(items)),
    | Value::Int(end) if end >= 0 => Ok(ValueStream::range(end)),
    | value => Err(PipelineError::UnsupportedSource { kind: value.kind_name() }),
  }
}

fn materialize(value: Value) -> Value {
  match value {
    | Value::Stream(stream) => Value::List(stream.into_values()),
    | Value::List(items) => Value::List(items.into_iter().map(materialize).collect()),
    | value => value,
  }
}

struct ValuesLogic {
  iter: alloc::vec::IntoIter<Value>,
}

impl StreamLogic for ValuesLogic {
  fn pull(&mut self) -> Option<Value> {
    self.iter.next()
  }
}

struct RangeLogic {
  next: i64,
  end:  i64,
}

impl StreamLogic for RangeLogic {
  fn pull(&mut self) -> Option<Value> {
    if self.next >= self.end {
      return None;
    }
    let value = self.next;
    self.next += 1;
    Some(Value::Int(value))
  }
}

struct FnLogic {
  func: Box<dyn FnMut() -> Option<Value> + Send>,
}

impl StreamLogic for FnLogic {
  fn pull(&mut self) -> Option<Value> {
    (self.func)()
  }
}

struct SplitShared {
  source:  Option<ValueStream>,
  buffers: [VecDeque<Value>; 2],
}

struct SplitBranch {
  shared: Arc<SpinMutex<SplitShared>>,
  branch: usize,
}

impl StreamLogic for SplitBranch {
  fn pull(&mut self) -> Option<Value> {
    let mut shared = self.shared.lock();
    if let Some(value) = shared.buffers[self.branch].pop_front() {
      return Some(value);
    }
    let value = shared.source.as_mut()?.next();
    let Some(value) = value else {
      shared.source = None;
      return None;
    };
    let (copy, value) = value.fork();
    shared.buffers[1 - self.branch].push_back(copy);
    Some(value)
  }
}

struct FlattenLogic {
  stack: Vec<ValueStream>,
}

impl StreamLogic for FlattenLogic {
  fn pull(&mut self) -> Option<Value> {
    loop {
      let top = self.stack.last_mut()?;
      match top.next() {
        | Some(Value::Stream(inner)) => self.stack.push(inner),
        | Some(Value::List(items)) => self.stack.push(ValueStream::from_values(items)),
        | Some(value) => return Some(value),
        | None => {
          let _ = self.stack.pop();
        },
      }
    }
  }
}

struct InterleaveLogic {
  first:   ValueStream,
  second:  ValueStream,
  pending: Option<Value>,
  done:    bool,
}

impl StreamLogic for InterleaveLogic {
  fn pull(&mut self) -> Option<Value> {
    if self.done {
      return None;
    }
    if let Some(value) = self.pending.take() {
      return Some(value);
    }
    // Probe both inputs at once so exhaustion of either ends the stream.
    let Some(left) = self.first.next() else {
      self.done = true;
      return None;
    };
    let Some(right) = self.second.next() else {
      self.done = true;
      return None;
    };
    self.pending = Some(right);
    Some(left)
  }
}
