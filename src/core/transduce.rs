use alloc::vec::Vec;

use super::{
  BoxedReducingStep, DynAccum, PipelineError, StepOutcome, Transducer, Value, ValueStream, append, create_pipeline,
  downcast_accum,
};


/// Eagerly reduces the source stream through the composed pipeline.
///
/// Pulls until the source is exhausted or a step signals termination, then
/// completes the pipeline exactly once and returns the accumulator.
///
/// # Errors
///
/// Returns the first [`PipelineError`] raised by a step or the completion
/// flush. On a step failure the pipeline is still completed (on a fresh
/// accumulator, since the failing step consumed the live one) so terminal
/// resources are released.
pub fn transduce(
  source: ValueStream,
  terminal: BoxedReducingStep,
  transducers: &[Transducer],
) -> Result<DynAccum, PipelineError> {
  let mut pipeline = create_pipeline(terminal, transducers);
  let mut accum = pipeline.init();
  let mut source = source;
  while let Some(value) = source.next() {
    match pipeline.step(accum, value) {
      | Ok(StepOutcome::Continue(next)) => accum = next,
      | Ok(StepOutcome::Terminated(next)) => {
        accum = next;
        break;
      },
      | Err(error) => {
        let teardown = pipeline.init();
        let _ = pipeline.complete(teardown);
        return Err(error);
      },
    }
  }
  pipeline.complete(accum)
}

/// Runs [`transduce`] with the append terminal and returns the materialized
/// output sequence.
///
/// # Errors
///
/// Propagates any [`PipelineError`] raised by the run.
pub fn transduce_values(source: ValueStream, transducers: &[Transducer]) -> Result<Vec<Value>, PipelineError> {
  downcast_accum(transduce(source, append(), transducers)?)
}
