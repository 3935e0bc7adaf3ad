use alloc::{boxed::Box, vec::Vec};

use tracing::debug;

use crate::core::{
  BoxedReducingStep, DynAccum, PipelineError, ReducingStep, StageKind, StepOutcome, Transducer, Value,
};


/// Interleaves observation-only logging taps into the transducer stack.
///
/// A tap ahead of the stack reports raw input; one after each stage reports
/// the values that stage emits, plus termination and completion, all through
/// `tracing` at debug level. Values pass through untouched.
#[must_use]
pub fn attach_loggers(transducers: Vec<Transducer>) -> Vec<Transducer> {
  let mut stack = Vec::with_capacity(transducers.len() * 2 + 1);
  stack.push(logger("source"));
  for transducer in transducers {
    let label = transducer.kind().as_str();
    stack.push(transducer);
    stack.push(logger(label));
  }
  stack
}

fn logger(label: &'static str) -> Transducer {
  Transducer::from_build(StageKind::Logger, move |next| Box::new(LoggerStep { label, next }))
}

struct LoggerStep {
  label: &'static str,
  next:  BoxedReducingStep,
}

impl ReducingStep for LoggerStep {
  fn init(&mut self) -> DynAccum {
    self.next.init()
  }

  fn step(&mut self, accum: DynAccum, value: Value) -> Result<StepOutcome, PipelineError> {
    debug!(stage = self.label, value = ?value, "step");
    let outcome = self.next.step(accum, value)?;
    if outcome.is_terminated() {
      debug!(stage = self.label, "terminate");
    }
    Ok(outcome)
  }

  fn complete(&mut self, accum: DynAccum) -> Result<DynAccum, PipelineError> {
    debug!(stage = self.label, "complete");
    self.next.complete(accum)
  }
}
