//! Stage implementations: constructors returning [`Transducer`] values and
//! the reducing steps they build.

use alloc::{boxed::Box, sync::Arc, vec, vec::Vec};
use core::mem;

use ahash::RandomState;
use hashbrown::{HashMap, HashSet};
use portable_atomic::{AtomicU64, Ordering};
use rand::{Rng, SeedableRng, rngs::SmallRng};
use spin::Mutex as SpinMutex;

use super::{
  BoxedReducingStep, DynAccum, EscapeSender, PipelineDslError, PipelineError, ReducingStep, StageKind, StepOutcome,
  Transducer, Value, ValueKey, ValueStream, validate_positive_argument, validate_probability,
};

#[cfg(test)]
mod tests;

type SharedMapper = Arc<dyn Fn(Value) -> Value + Send + Sync>;
type SharedPredicate = Arc<dyn Fn(Value) -> bool + Send + Sync>;
type SharedExploder = Arc<dyn Fn(Value) -> ValueStream + Send + Sync>;
type SharedIndexedMapper = Arc<dyn Fn(usize, Value) -> Value + Send + Sync>;

/// Creates a stage that maps each value through `func`.
#[must_use]
pub fn map<F>(func: F) -> Transducer
where
  F: Fn(Value) -> Value + Send + Sync + 'static, {
  let func: SharedMapper = Arc::new(func);
  Transducer::from_build(StageKind::Map, move |next| Box::new(MapStep { func: func.clone(), next }))
}

/// Creates a stage that forwards values for which `predicate` returns true.
///
/// A nested stream is split before inspection: the predicate consumes one
/// half, the other is forwarded untouched.
#[must_use]
pub fn filter<F>(predicate: F) -> Transducer
where
  F: Fn(Value) -> bool + Send + Sync + 'static, {
  let predicate: SharedPredicate = Arc::new(predicate);
  Transducer::from_build(StageKind::Filter, move |next| Box::new(FilterStep { predicate: predicate.clone(), next }))
}

/// Creates a stage that drops values for which `predicate` returns true.
///
/// The inverse of [`filter`].
#[must_use]
pub fn remove<F>(predicate: F) -> Transducer
where
  F: Fn(Value) -> bool + Send + Sync + 'static, {
  let inner: SharedPredicate = Arc::new(predicate);
  let negated: SharedPredicate = Arc::new(move |value| !(inner)(value));
  Transducer::from_build(StageKind::Remove, move |next| Box::new(FilterStep { predicate: negated.clone(), next }))
}

/// Creates a stage that explodes each value into a stream and forwards the
/// stream's elements one by one.
///
/// When a forwarded element signals termination, the remaining elements are
/// not pulled and the signal propagates.
#[must_use]
pub fn mapcat<F>(exploder: F) -> Transducer
where
  F: Fn(Value) -> ValueStream + Send + Sync + 'static, {
  let exploder: SharedExploder = Arc::new(exploder);
  Transducer::from_build(StageKind::Mapcat, move |next| Box::new(MapcatStep { exploder: exploder.clone(), next }))
}

/// Creates a stage that forwards only the first occurrence of each value.
///
/// Comparison uses the natural equality of the comparable scalar shapes;
/// feeding an incomparable value (stream, list, opaque payload or the drop
/// sentinel) fails the run with [`PipelineError::Incomparable`].
#[must_use]
pub fn dedupe() -> Transducer {
  Transducer::from_build(StageKind::Dedupe, |next| {
    Box::new(DedupeStep { seen: HashSet::with_hasher(RandomState::new()), next })
  })
}

/// Creates a stage that buffers `size` consecutive values and forwards each
/// full buffer as a nested stream.
///
/// `complete` flushes a partial chunk unless termination was already
/// signalled.
///
/// # Errors
///
/// Returns [`PipelineDslError`] when `size` is zero.
pub fn chunk(size: usize) -> Result<Transducer, PipelineDslError> {
  let size = validate_positive_argument("size", size)?;
  Ok(Transducer::from_build(StageKind::Chunk, move |next| {
    Box::new(ChunkStep { size, buffer: Vec::with_capacity(size), terminated: false, next })
  }))
}

/// Creates a stage that buffers runs of values whose projected key is
/// unchanged and forwards each finished run as a nested stream.
///
/// A nested stream is split before projection, one half for the keyer and
/// one for the buffer. `complete` flushes the open run unless termination
/// was already signalled.
#[must_use]
pub fn chunk_by<F>(keyer: F) -> Transducer
where
  F: Fn(Value) -> Value + Send + Sync + 'static, {
  let keyer: SharedMapper = Arc::new(keyer);
  Transducer::from_build(StageKind::ChunkBy, move |next| {
    Box::new(ChunkByStep { keyer: keyer.clone(), last: None, buffer: Vec::new(), terminated: false, next })
  })
}

/// Creates a stage that forwards each value independently with the given
/// probability.
///
/// # Errors
///
/// Returns [`PipelineDslError`] when `probability` lies outside `[0, 1]`.
pub fn random_sample(probability: f64) -> Result<Transducer, PipelineDslError> {
  let probability = validate_probability(probability)?;
  Ok(Transducer::from_build(StageKind::RandomSample, move |next| {
    Box::new(SampleStep { probability, rng: SmallRng::seed_from_u64(next_sample_seed()), next })
  }))
}

/// Creates a stage that forwards every `n`-th value and drops the rest.
///
/// # Errors
///
/// Returns [`PipelineDslError`] when `n` is zero.
pub fn take_nth(n: usize) -> Result<Transducer, PipelineDslError> {
  let n = validate_positive_argument("n", n)?;
  Ok(Transducer::from_build(StageKind::TakeNth, move |next| Box::new(TakeNthStep { stride: n, count: 0, next })))
}

/// Creates a stage that forwards the first `count` values and signals
/// termination along with the last one.
///
/// Never forwards more than `count` values; with `count` zero it terminates
/// on the first input without forwarding.
#[must_use]
pub fn take(count: usize) -> Transducer {
  Transducer::from_build(StageKind::Take, move |next| Box::new(TakeStep { remaining: count, next }))
}

/// Creates a stage that forwards values while `predicate` holds and signals
/// termination on the first failing value, without forwarding it.
#[must_use]
pub fn take_while<F>(predicate: F) -> Transducer
where
  F: Fn(Value) -> bool + Send + Sync + 'static, {
  let predicate: SharedPredicate = Arc::new(predicate);
  Transducer::from_build(StageKind::TakeWhile, move |next| {
    Box::new(TakeWhileStep { predicate: predicate.clone(), next })
  })
}

/// Creates a stage that drops the first `count` values and forwards the
/// rest unchanged.
#[must_use]
pub fn drop(count: usize) -> Transducer {
  Transducer::from_build(StageKind::Drop, move |next| Box::new(DropStep { remaining: count, next }))
}

/// Creates a stage that drops values while `predicate` holds; from the
/// first failing value onward everything is forwarded without further
/// testing.
#[must_use]
pub fn drop_while<F>(predicate: F) -> Transducer
where
  F: Fn(Value) -> bool + Send + Sync + 'static, {
  let predicate: SharedPredicate = Arc::new(predicate);
  Transducer::from_build(StageKind::DropWhile, move |next| {
    Box::new(DropWhileStep { predicate: predicate.clone(), dropping: true, next })
  })
}

/// Creates a stage that maps each value and drops null results.
///
/// Only [`Value::Null`] drops; a `false` or zero result is kept.
#[must_use]
pub fn keep<F>(func: F) -> Transducer
where
  F: Fn(Value) -> Value + Send + Sync + 'static, {
  let func: SharedMapper = Arc::new(func);
  Transducer::from_build(StageKind::Keep, move |next| Box::new(KeepStep { func: func.clone(), next }))
}

/// Creates a stage like [`keep`] whose mapper also receives a zero-based
/// call index, incremented whether or not the result is kept.
#[must_use]
pub fn keep_indexed<F>(func: F) -> Transducer
where
  F: Fn(usize, Value) -> Value + Send + Sync + 'static, {
  let func: SharedIndexedMapper = Arc::new(func);
  Transducer::from_build(StageKind::KeepIndexed, move |next| {
    Box::new(KeepIndexedStep { func: func.clone(), index: 0, next })
  })
}

/// Creates a stage that substitutes values found in `pairs` and forwards
/// everything else unchanged.
///
/// Incomparable values are never looked up and pass through untouched.
///
/// # Errors
///
/// Returns [`PipelineDslError`] when a mapping key is incomparable or a
/// replacement value cannot be duplicated per forward.
pub fn replace<I>(pairs: I) -> Result<Transducer, PipelineDslError>
where
  I: IntoIterator<Item = (Value, Value)>, {
  let mut table: HashMap<ValueKey, Value, RandomState> = HashMap::with_hasher(RandomState::new());
  for (key, replacement) in pairs {
    let Some(key) = key.key() else {
      return Err(PipelineDslError::IncomparableKey { kind: key.kind_name() });
    };
    if replacement.try_duplicate().is_none() {
      return Err(PipelineDslError::UnsupportedReplacement { kind: replacement.kind_name() });
    }
    let _ = table.insert(key, replacement);
  }
  // The spin mutex only exists to share the map across pipeline builds;
  // replacement values may hold non-Sync payloads.
  let table = Arc::new(SpinMutex::new(table));
  Ok(Transducer::from_build(StageKind::Replace, move |next| Box::new(ReplaceStep { table: table.clone(), next })))
}

/// Creates a stage that diverts values matching `predicate` into the given
/// external queue instead of forwarding them.
///
/// Side-effecting by design; the external queue is typically the entry point
/// of another pipeline. With `close_on_complete` the queue is closed when
/// this pipeline completes — the caller must ensure no other producer keeps
/// sending afterwards.
#[must_use]
pub fn escape<F, S>(predicate: F, sender: S, close_on_complete: bool) -> Transducer
where
  F: Fn(Value) -> bool + Send + Sync + 'static,
  S: EscapeSender, {
  let predicate: SharedPredicate = Arc::new(predicate);
  Transducer::from_build(StageKind::Escape, move |next| {
    Box::new(EscapeStep { predicate: predicate.clone(), sender: sender.clone(), close_on_complete, next })
  })
}

static SAMPLE_SEED: AtomicU64 = AtomicU64::new(1);

fn next_sample_seed() -> u64 {
  SAMPLE_SEED.fetch_add(1, Ordering::Relaxed)
}

/* Step implementations */

struct MapStep {
  func: SharedMapper,
  next: BoxedReducingStep,
}

impl ReducingStep for MapStep {
  fn init(&mut self) -> DynAccum {
    self.next.init()
  }

  fn step(&mut self, accum: DynAccum, value: Value) -> Result<StepOutcome, PipelineError> {
    let value = (self.func)(value);
    self.next.step(accum, value)
  }

  fn complete(&mut self, accum: DynAccum) -> Result<DynAccum, PipelineError> {
    self.next.complete(accum)
  }
}

struct FilterStep {
  predicate: SharedPredicate,
  next:      BoxedReducingStep,
}

impl ReducingStep for FilterStep {
  fn init(&mut self) -> DynAccum {
    self.next.init()
  }

  fn step(&mut self, accum: DynAccum, value: Value) -> Result<StepOutcome, PipelineError> {
    let (probe, value) = value.fork();
    if (self.predicate)(probe) {
      return self.next.step(accum, value);
    }
    Ok(StepOutcome::Continue(accum))
  }

  fn complete(&mut self, accum: DynAccum) -> Result<DynAccum, PipelineError> {
    self.next.complete(accum)
  }
}

struct MapcatStep {
  exploder: SharedExploder,
  next:     BoxedReducingStep,
}

impl ReducingStep for MapcatStep {
  fn init(&mut self) -> DynAccum {
    self.next.init()
  }

  fn step(&mut self, accum: DynAccum, value: Value) -> Result<StepOutcome, PipelineError> {
    let mut stream = (self.exploder)(value);
    let mut accum = accum;
    // The loop is the concatenation.
    while let Some(item) = stream.next() {
      match self.next.step(accum, item)? {
        | StepOutcome::Continue(next_accum) => accum = next_accum,
        | StepOutcome::Terminated(next_accum) => return Ok(StepOutcome::Terminated(next_accum)),
      }
    }
    Ok(StepOutcome::Continue(accum))
  }

  fn complete(&mut self, accum: DynAccum) -> Result<DynAccum, PipelineError> {
    self.next.complete(accum)
  }
}

struct DedupeStep {
  seen: HashSet<ValueKey, RandomState>,
  next: BoxedReducingStep,
}

impl ReducingStep for DedupeStep {
  fn init(&mut self) -> DynAccum {
    self.next.init()
  }

  fn step(&mut self, accum: DynAccum, value: Value) -> Result<StepOutcome, PipelineError> {
    let Some(key) = value.key() else {
      return Err(PipelineError::Incomparable { stage: "dedupe", kind: value.kind_name() });
    };
    if self.seen.insert(key) {
      return self.next.step(accum, value);
    }
    Ok(StepOutcome::Continue(accum))
  }

  fn complete(&mut self, accum: DynAccum) -> Result<DynAccum, PipelineError> {
    self.next.complete(accum)
  }
}

struct ChunkStep {
  size:       usize,
  buffer:     Vec<Value>,
  terminated: bool,
  next:       BoxedReducingStep,
}

impl ReducingStep for ChunkStep {
  fn init(&mut self) -> DynAccum {
    self.next.init()
  }

  fn step(&mut self, accum: DynAccum, value: Value) -> Result<StepOutcome, PipelineError> {
    self.buffer.push(value);
    if self.buffer.len() < self.size {
      return Ok(StepOutcome::Continue(accum));
    }
    let full = mem::replace(&mut self.buffer, Vec::with_capacity(self.size));
    let outcome = self.next.step(accum, Value::Stream(ValueStream::from_values(full)))?;
    if outcome.is_terminated() {
      self.terminated = true;
    }
    Ok(outcome)
  }

  fn complete(&mut self, accum: DynAccum) -> Result<DynAccum, PipelineError> {
    let mut accum = accum;
    if !self.buffer.is_empty() && !self.terminated {
      let partial = mem::take(&mut self.buffer);
      let outcome = self.next.step(accum, Value::Stream(ValueStream::from_values(partial)))?;
      self.terminated = outcome.is_terminated();
      accum = outcome.into_accum();
    }
    self.next.complete(accum)
  }
}

struct ChunkByStep {
  keyer:      SharedMapper,
  last:       Option<ValueKey>,
  buffer:     Vec<Value>,
  terminated: bool,
  next:       BoxedReducingStep,
}

impl ReducingStep for ChunkByStep {
  fn init(&mut self) -> DynAccum {
    self.next.init()
  }

  fn step(&mut self, accum: DynAccum, value: Value) -> Result<StepOutcome, PipelineError> {
    let (probe, value) = value.fork();
    let key_value = (self.keyer)(probe);
    let Some(key) = key_value.key() else {
      return Err(PipelineError::Incomparable { stage: "chunk_by", kind: key_value.kind_name() });
    };
    match &self.last {
      | None => {
        self.last = Some(key);
        self.buffer.push(value);
        Ok(StepOutcome::Continue(accum))
      },
      | Some(previous) if *previous == key => {
        self.buffer.push(value);
        Ok(StepOutcome::Continue(accum))
      },
      | Some(_) => {
        self.last = Some(key);
        let run = mem::replace(&mut self.buffer, vec![value]);
        let outcome = self.next.step(accum, Value::Stream(ValueStream::from_values(run)))?;
        if outcome.is_terminated() {
          self.terminated = true;
        }
        Ok(outcome)
      },
    }
  }

  fn complete(&mut self, accum: DynAccum) -> Result<DynAccum, PipelineError> {
    let mut accum = accum;
    if !self.buffer.is_empty() && !self.terminated {
      let run = mem::take(&mut self.buffer);
      let outcome = self.next.step(accum, Value::Stream(ValueStream::from_values(run)))?;
      self.terminated = outcome.is_terminated();
      accum = outcome.into_accum();
    }
    self.next.complete(accum)
  }
}

struct SampleStep {
  probability: f64,
  rng:         SmallRng,
  next:        BoxedReducingStep,
}

impl ReducingStep for SampleStep {
  fn init(&mut self) -> DynAccum {
    self.next.init()
  }

  fn step(&mut self, accum: DynAccum, value: Value) -> Result<StepOutcome, PipelineError> {
    if self.rng.random::<f64>() < self.probability {
      return self.next.step(accum, value);
    }
    Ok(StepOutcome::Continue(accum))
  }

  fn complete(&mut self, accum: DynAccum) -> Result<DynAccum, PipelineError> {
    self.next.complete(accum)
  }
}

struct TakeNthStep {
  stride: usize,
  count:  usize,
  next:   BoxedReducingStep,
}

impl ReducingStep for TakeNthStep {
  fn init(&mut self) -> DynAccum {
    self.next.init()
  }

  fn step(&mut self, accum: DynAccum, value: Value) -> Result<StepOutcome, PipelineError> {
    self.count += 1;
    if self.count % self.stride == 0 {
      return self.next.step(accum, value);
    }
    Ok(StepOutcome::Continue(accum))
  }

  fn complete(&mut self, accum: DynAccum) -> Result<DynAccum, PipelineError> {
    self.next.complete(accum)
  }
}

struct TakeStep {
  remaining: usize,
  next:      BoxedReducingStep,
}

impl ReducingStep for TakeStep {
  fn init(&mut self) -> DynAccum {
    self.next.init()
  }

  fn step(&mut self, accum: DynAccum, value: Value) -> Result<StepOutcome, PipelineError> {
    if self.remaining == 0 {
      return Ok(StepOutcome::Terminated(accum));
    }
    self.remaining -= 1;
    if self.remaining == 0 {
      let outcome = self.next.step(accum, value)?;
      return Ok(StepOutcome::Terminated(outcome.into_accum()));
    }
    self.next.step(accum, value)
  }

  fn complete(&mut self, accum: DynAccum) -> Result<DynAccum, PipelineError> {
    self.next.complete(accum)
  }
}

struct TakeWhileStep {
  predicate: SharedPredicate,
  next:      BoxedReducingStep,
}

impl ReducingStep for TakeWhileStep {
  fn init(&mut self) -> DynAccum {
    self.next.init()
  }

  fn step(&mut self, accum: DynAccum, value: Value) -> Result<StepOutcome, PipelineError> {
    let (probe, value) = value.fork();
    if (self.predicate)(probe) {
      return self.next.step(accum, value);
    }
    Ok(StepOutcome::Terminated(accum))
  }

  fn complete(&mut self, accum: DynAccum) -> Result<DynAccum, PipelineError> {
    self.next.complete(accum)
  }
}

struct DropStep {
  remaining: usize,
  next:      BoxedReducingStep,
}

impl ReducingStep for DropStep {
  fn init(&mut self) -> DynAccum {
    self.next.init()
  }

  fn step(&mut self, accum: DynAccum, value: Value) -> Result<StepOutcome, PipelineError> {
    if self.remaining > 0 {
      self.remaining -= 1;
      return Ok(StepOutcome::Continue(accum));
    }
    self.next.step(accum, value)
  }

  fn complete(&mut self, accum: DynAccum) -> Result<DynAccum, PipelineError> {
    self.next.complete(accum)
  }
}

struct DropWhileStep {
  predicate: SharedPredicate,
  dropping:  bool,
  next:      BoxedReducingStep,
}

impl ReducingStep for DropWhileStep {
  fn init(&mut self) -> DynAccum {
    self.next.init()
  }

  fn step(&mut self, accum: DynAccum, value: Value) -> Result<StepOutcome, PipelineError> {
    if self.dropping {
      let (probe, value) = value.fork();
      if (self.predicate)(probe) {
        return Ok(StepOutcome::Continue(accum));
      }
      self.dropping = false;
      return self.next.step(accum, value);
    }
    self.next.step(accum, value)
  }

  fn complete(&mut self, accum: DynAccum) -> Result<DynAccum, PipelineError> {
    self.next.complete(accum)
  }
}

struct KeepStep {
  func: SharedMapper,
  next: BoxedReducingStep,
}

impl ReducingStep for KeepStep {
  fn init(&mut self) -> DynAccum {
    self.next.init()
  }

  fn step(&mut self, accum: DynAccum, value: Value) -> Result<StepOutcome, PipelineError> {
    match (self.func)(value) {
      | Value::Null => Ok(StepOutcome::Continue(accum)),
      | mapped => self.next.step(accum, mapped),
    }
  }

  fn complete(&mut self, accum: DynAccum) -> Result<DynAccum, PipelineError> {
    self.next.complete(accum)
  }
}

struct KeepIndexedStep {
  func:  SharedIndexedMapper,
  index: usize,
  next:  BoxedReducingStep,
}

impl ReducingStep for KeepIndexedStep {
  fn init(&mut self) -> DynAccum {
    self.next.init()
  }

  fn step(&mut self, accum: DynAccum, value: Value) -> Result<StepOutcome, PipelineError> {
    let index = self.index;
    self.index += 1;
    match (self.func)(index, value) {
      | Value::Null => Ok(StepOutcome::Continue(accum)),
      | mapped => self.next.step(accum, mapped),
    }
  }

  fn complete(&mut self, accum: DynAccum) -> Result<DynAccum, PipelineError> {
    self.next.complete(accum)
  }
}

struct ReplaceStep {
  table: Arc<SpinMutex<HashMap<ValueKey, Value, RandomState>>>,
  next:  BoxedReducingStep,
}

impl ReducingStep for ReplaceStep {
  fn init(&mut self) -> DynAccum {
    self.next.init()
  }

  fn step(&mut self, accum: DynAccum, value: Value) -> Result<StepOutcome, PipelineError> {
    let replacement = value.key().and_then(|key| self.table.lock().get(&key).and_then(Value::try_duplicate));
    match replacement {
      | Some(replacement) => self.next.step(accum, replacement),
      | None => self.next.step(accum, value),
    }
  }

  fn complete(&mut self, accum: DynAccum) -> Result<DynAccum, PipelineError> {
    self.next.complete(accum)
  }
}

struct EscapeStep<S> {
  predicate:         SharedPredicate,
  sender:            S,
  close_on_complete: bool,
  next:              BoxedReducingStep,
}

impl<S> ReducingStep for EscapeStep<S>
where
  S: EscapeSender,
{
  fn init(&mut self) -> DynAccum {
    self.next.init()
  }

  fn step(&mut self, accum: DynAccum, value: Value) -> Result<StepOutcome, PipelineError> {
    let (probe, value) = value.fork();
    if (self.predicate)(probe) {
      self.sender.send(value)?;
      return Ok(StepOutcome::Continue(accum));
    }
    self.next.step(accum, value)
  }

  fn complete(&mut self, accum: DynAccum) -> Result<DynAccum, PipelineError> {
    if self.close_on_complete {
      self.sender.close();
    }
    self.next.complete(accum)
  }
}
