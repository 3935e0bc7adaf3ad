use alloc::boxed::Box;

use super::{BoxedReducingStep, StageKind};


/// A reusable stage builder: a function from reducing step to reducing step.
///
/// Each [`Transducer::wrap`] call constructs fresh per-pipeline stage state,
/// so one transducer list can drive any number of pipeline runs without
/// cross-contamination.
pub struct Transducer {
  kind:  StageKind,
  build: Box<dyn Fn(BoxedReducingStep) -> BoxedReducingStep + Send + Sync>,
}

impl core::fmt::Debug for Transducer {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    f.debug_struct("Transducer").field("kind", &self.kind).finish_non_exhaustive()
  }
}

impl Transducer {
  pub(crate) fn from_build<F>(kind: StageKind, build: F) -> Self
  where
    F: Fn(BoxedReducingStep) -> BoxedReducingStep + Send + Sync + 'static, {
    Self { kind, build: Box::new(build) }
  }

  /// Returns the stage kind.
  #[must_use]
  pub const fn kind(&self) -> StageKind {
    self.kind
  }

  /// Decorates a reducing step, binding fresh stage state.
  #[must_use]
  pub fn wrap(&self, next: BoxedReducingStep) -> BoxedReducingStep {
    (self.build)(next)
  }
}

/// Assembles a pipeline by folding the transducer list right-to-left over
/// the terminal reducing step.
///
/// The first list element becomes the outermost stage, the one that sees
/// raw input first.
#[must_use]
pub fn create_pipeline(terminal: BoxedReducingStep, transducers: &[Transducer]) -> BoxedReducingStep {
  let mut step = terminal;
  for transducer in transducers.iter().rev() {
    step = transducer.wrap(step);
  }
  step
}
