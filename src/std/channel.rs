use alloc::{boxed::Box, sync::Arc};

use crossbeam_channel::{Receiver, Sender};
use spin::Mutex as SpinMutex;

use crate::core::{
  BoxedReducingStep, DynAccum, EscapeSender, PipelineError, ReducingStep, StepOutcome, StreamLogic, Value,
  ValueStream,
};


/// Closable send handle over a value channel, usable as an escape target.
///
/// Clones share one underlying sender, so closing any clone closes the
/// handle for all of them; the channel itself disconnects once no other
/// sender remains.
#[derive(Clone)]
pub struct ChannelSender {
  inner: Arc<SpinMutex<Option<Sender<Value>>>>,
}

impl ChannelSender {
  /// Wraps a channel sender.
  #[must_use]
  pub fn new(sender: Sender<Value>) -> Self {
    Self { inner: Arc::new(SpinMutex::new(Some(sender))) }
  }
}

impl EscapeSender for ChannelSender {
  fn send(&mut self, value: Value) -> Result<(), PipelineError> {
    let guard = self.inner.lock();
    let Some(sender) = guard.as_ref() else {
      return Err(PipelineError::ChannelClosed);
    };
    sender.send(value).map_err(|_| PipelineError::ChannelClosed)
  }

  fn close(&mut self) {
    let _ = self.inner.lock().take();
  }
}

/// Creates the send-to-queue terminal: `step` sends each value onto the
/// channel, `complete` closes it by dropping the held sender.
#[must_use]
pub fn queue_terminal(sender: Sender<Value>) -> BoxedReducingStep {
  Box::new(QueueStep { sender: Some(sender) })
}

struct QueueStep {
  sender: Option<Sender<Value>>,
}

impl ReducingStep for QueueStep {
  fn init(&mut self) -> DynAccum {
    Box::new(())
  }

  fn step(&mut self, accum: DynAccum, value: Value) -> Result<StepOutcome, PipelineError> {
    let Some(sender) = self.sender.as_ref() else {
      return Err(PipelineError::ChannelClosed);
    };
    sender.send(value).map_err(|_| PipelineError::ChannelClosed)?;
    Ok(StepOutcome::Continue(accum))
  }

  fn complete(&mut self, accum: DynAccum) -> Result<DynAccum, PipelineError> {
    let _ = self.sender.take();
    Ok(accum)
  }
}

impl ValueStream {
  /// Creates a stream backed by a channel: one receive per pull, done once
  /// the channel disconnects.
  #[must_use]
  pub fn from_receiver(receiver: Receiver<Value>) -> Self {
    Self::from_logic(Box::new(ReceiverLogic { receiver }))
  }
}

struct ReceiverLogic {
  receiver: Receiver<Value>,
}

impl StreamLogic for ReceiverLogic {
  fn pull(&mut self) -> Option<Value> {
    self.receiver.recv().ok()
  }
}

/// Drains the stream into the channel, dropping the sender afterwards.
///
/// Stops early when the receiving side disconnects. Typically run on its own
/// thread, since sends block until the receiver catches up.
pub fn feed_channel(stream: ValueStream, sender: Sender<Value>) {
  for value in stream {
    if sender.send(value).is_err() {
      break;
    }
  }
}
