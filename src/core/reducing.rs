use alloc::boxed::Box;
use core::any::Any;

use super::{PipelineError, Value};

/// Type-erased accumulator threaded through a pipeline.
///
/// Stages never inspect the accumulator; only the terminal step downcasts it
/// back to its concrete type.
pub type DynAccum = Box<dyn Any + Send + 'static>;

/// Boxed reducing step, the unit of pipeline composition.
pub type BoxedReducingStep = Box<dyn ReducingStep>;

/// Result of one reducing step.
pub enum StepOutcome {
  /// The driver may feed further input.
  Continue(DynAccum),
  /// Early termination: the driver must not call `step` again.
  Terminated(DynAccum),
}

impl StepOutcome {
  /// Unwraps the carried accumulator.
  #[must_use]
  pub fn into_accum(self) -> DynAccum {
    match self {
      | Self::Continue(accum) | Self::Terminated(accum) => accum,
    }
  }

  /// Returns true when early termination was signalled.
  #[must_use]
  pub const fn is_terminated(&self) -> bool {
    matches!(self, Self::Terminated(_))
  }
}

/// The `init` / `step` / `complete` triple consuming values into an
/// accumulator.
///
/// Drivers call `init` once to obtain a fresh accumulator, `step` for each
/// input value and `complete` exactly once after the last `step`, whether the
/// source was exhausted, termination was signalled or the run failed.
pub trait ReducingStep: Send {
  /// Produces a fresh accumulator.
  fn init(&mut self) -> DynAccum;

  /// Folds one value into the accumulator.
  ///
  /// # Errors
  ///
  /// Returns [`PipelineError`] when the value cannot be processed; the driver
  /// must then complete the pipeline and surface the error.
  fn step(&mut self, accum: DynAccum, value: Value) -> Result<StepOutcome, PipelineError>;

  /// Flushes buffered state after the last `step`.
  ///
  /// # Errors
  ///
  /// Returns [`PipelineError`] when a flush cannot be processed downstream.
  fn complete(&mut self, accum: DynAccum) -> Result<DynAccum, PipelineError>;
}

/// Recovers a concrete accumulator from its type-erased form.
///
/// # Errors
///
/// Returns [`PipelineError::AccumulatorMismatch`] when the accumulator holds
/// a different type.
pub fn downcast_accum<A>(accum: DynAccum) -> Result<A, PipelineError>
where
  A: Any, {
  match accum.downcast::<A>() {
    | Ok(accum) => Ok(*accum),
    | Err(_) => Err(PipelineError::AccumulatorMismatch),
  }
}
