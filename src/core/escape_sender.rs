use super::{PipelineError, Value};

/// Caller-owned send handle targeted by the `escape` stage.
///
/// Handles are cloned into each pipeline built from a transducer list, so
/// `close` must be observable through every clone of the same handle.
pub trait EscapeSender: Clone + Send + Sync + 'static {
  /// Sends a diverted value to the external queue.
  ///
  /// # Errors
  ///
  /// Returns [`PipelineError::ChannelClosed`] when the queue no longer
  /// accepts values.
  fn send(&mut self, value: Value) -> Result<(), PipelineError>;

  /// Closes the external queue.
  fn close(&mut self);
}
