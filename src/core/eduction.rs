use alloc::{boxed::Box, collections::VecDeque, sync::Arc};

use spin::Mutex as SpinMutex;

use super::{
  BoxedReducingStep, DynAccum, PipelineError, ReducingStep, StepOutcome, Transducer, Value, ValueStream,
  create_pipeline,
  value_stream::StreamLogic,
};


type SharedQueue = Arc<SpinMutex<VecDeque<Value>>>;

/// Lazily applies the transducer stack to the source, returning a stream
/// that advances the pipeline just far enough to yield one output per pull.
///
/// A single input may produce zero, one or many outputs. Surplus outputs
/// land in a FIFO queue that later pulls drain before more input is fed;
/// when a pull produces nothing, further input is fed until an output
/// emerges or the source is exhausted. `complete` runs exactly once — on
/// exhaustion or early termination — and anything it flushes is observable
/// before the stream reports done.
///
/// A step failure completes the pipeline and ends the stream; drive the
/// pipeline with [`transduce`](super::transduce) instead when the failure
/// itself must be observed.
#[must_use]
pub fn eduction(source: ValueStream, transducers: &[Transducer]) -> ValueStream {
  let queue: SharedQueue = Arc::new(SpinMutex::new(VecDeque::new()));
  let terminal = Box::new(QueueAppendStep { queue: queue.clone() });
  let mut pipeline = create_pipeline(terminal, transducers);
  let accum = pipeline.init();
  ValueStream::from_logic(Box::new(EductionLogic {
    source,
    pipeline,
    queue,
    accum: Some(accum),
    source_exhausted: false,
    terminated: false,
  }))
}

/// Terminal that appends every received value to the shared output queue.
struct QueueAppendStep {
  queue: SharedQueue,
}

impl ReducingStep for QueueAppendStep {
  fn init(&mut self) -> DynAccum {
    Box::new(())
  }

  fn step(&mut self, accum: DynAccum, value: Value) -> Result<StepOutcome, PipelineError> {
    self.queue.lock().push_back(value);
    Ok(StepOutcome::Continue(accum))
  }

  fn complete(&mut self, accum: DynAccum) -> Result<DynAccum, PipelineError> {
    Ok(accum)
  }
}

struct EductionLogic {
  source:           ValueStream,
  pipeline:         BoxedReducingStep,
  queue:            SharedQueue,
  accum:            Option<DynAccum>,
  source_exhausted: bool,
  terminated:       bool,
}

impl EductionLogic {
  fn complete_pipeline(&mut self) {
    if let Some(accum) = self.accum.take() {
      let _ = self.pipeline.complete(accum);
    }
  }

  fn dequeue(&mut self) -> Option<Value> {
    self.queue.lock().pop_front()
  }
}

impl StreamLogic for EductionLogic {
  fn pull(&mut self) -> Option<Value> {
    if let Some(value) = self.dequeue() {
      return Some(value);
    }
    if self.source_exhausted || self.terminated {
      return None;
    }
    loop {
      // Queue is empty: feed the pipeline until it is not, or the source
      // runs dry.
      let Some(value) = self.source.next() else {
        self.source_exhausted = true;
        self.complete_pipeline();
        return self.dequeue();
      };
      let accum = self.accum.take()?;
      match self.pipeline.step(accum, value) {
        | Ok(StepOutcome::Continue(next)) => self.accum = Some(next),
        | Ok(StepOutcome::Terminated(next)) => {
          self.accum = Some(next);
          self.terminated = true;
          self.complete_pipeline();
          return self.dequeue();
        },
        | Err(_) => {
          self.terminated = true;
          self.complete_pipeline();
          return None;
        },
      }
      if let Some(value) = self.dequeue() {
        return Some(value);
      }
    }
  }
}
