extern crate std;

use std::thread;

use crossbeam_channel::{Receiver, bounded};
use tracing::error;

use crate::core::{StepOutcome, Transducer, Value, create_pipeline};

use super::channel::queue_terminal;

#[cfg(test)]
mod tests;

/// Streams the input queue through the transducer stack on a worker thread,
/// returning the output queue.
///
/// The pipeline terminates in a send-to-queue step over a channel of the
/// given capacity; capacity zero is a synchronous hand-off. The worker
/// drains the input, stops on early termination or input disconnect, then
/// completes the pipeline, which closes the output queue. Feed the input and
/// read the output from distinct threads or the hand-off deadlocks.
///
/// A step failure is logged and still closes the output queue so readers
/// unblock.
#[must_use]
pub fn go(input: Receiver<Value>, output_capacity: usize, transducers: &[Transducer]) -> Receiver<Value> {
  let (sender, receiver) = bounded(output_capacity);
  let mut pipeline = create_pipeline(queue_terminal(sender), transducers);
  let _worker = thread::spawn(move || {
    let mut accum = pipeline.init();
    for value in input.iter() {
      match pipeline.step(accum, value) {
        | Ok(StepOutcome::Continue(next)) => accum = next,
        | Ok(StepOutcome::Terminated(next)) => {
          accum = next;
          break;
        },
        | Err(err) => {
          error!(%err, "pipeline step failed; closing output queue");
          let teardown = pipeline.init();
          let _ = pipeline.complete(teardown);
          return;
        },
      }
    }
    if let Err(err) = pipeline.complete(accum) {
      error!(%err, "pipeline completion failed");
    }
  });
  receiver
}
