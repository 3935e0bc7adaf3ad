use alloc::{boxed::Box, vec::Vec};

use super::{
  BoxedReducingStep, DynAccum, PipelineError, ReducingStep, StepOutcome, Value, ValueStream, downcast_accum,
};

/// Creates the append terminal: `init` yields an empty sequence, `step`
/// appends scalars and flattens nested streams element-wise, `complete` is
/// the identity.
///
/// The accumulator is a `Vec<Value>`; recover it with
/// [`downcast_accum`](super::downcast_accum). The drop sentinel is not
/// appendable and fails the run with [`PipelineError::ShapeMismatch`].
#[must_use]
pub fn append() -> BoxedReducingStep {
  Box::new(AppendStep)
}

struct AppendStep;

impl ReducingStep for AppendStep {
  fn init(&mut self) -> DynAccum {
    Box::new(Vec::<Value>::new())
  }

  fn step(&mut self, accum: DynAccum, value: Value) -> Result<StepOutcome, PipelineError> {
    let mut values = downcast_accum::<Vec<Value>>(accum)?;
    match value {
      | Value::Stream(stream) => values.extend(stream.flatten()),
      | Value::List(items) => values.extend(ValueStream::from_values(items).flatten()),
      | Value::Null => return Err(PipelineError::ShapeMismatch { stage: "append", kind: "null" }),
      | value => values.push(value),
    }
    Ok(StepOutcome::Continue(Box::new(values)))
  }

  fn complete(&mut self, accum: DynAccum) -> Result<DynAccum, PipelineError> {
    Ok(accum)
  }
}
