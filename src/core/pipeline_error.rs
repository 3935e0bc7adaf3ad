use core::fmt;

/// Errors raised while a pipeline is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineError {
  /// Indicates a terminal step received a foreign accumulator type.
  AccumulatorMismatch,
  /// Indicates a stage received a value shape it cannot process.
  ShapeMismatch {
    /// Stage that rejected the value.
    stage: &'static str,
    /// Shape of the rejected value.
    kind:  &'static str,
  },
  /// Indicates a stage required comparison on an incomparable value.
  Incomparable {
    /// Stage that required comparison.
    stage: &'static str,
    /// Shape of the incomparable value.
    kind:  &'static str,
  },
  /// Indicates a stream was requested from an unsupported source shape.
  UnsupportedSource {
    /// Shape of the rejected source.
    kind: &'static str,
  },
  /// Indicates a send or receive on a closed channel.
  ChannelClosed,
}

impl fmt::Display for PipelineError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      | Self::AccumulatorMismatch => write!(f, "accumulator type mismatch"),
      | Self::ShapeMismatch { stage, kind } => write!(f, "{stage} cannot process a {kind} value"),
      | Self::Incomparable { stage, kind } => write!(f, "{stage} cannot compare a {kind} value"),
      | Self::UnsupportedSource { kind } => write!(f, "cannot stream from a {kind} value"),
      | Self::ChannelClosed => write!(f, "channel closed"),
    }
  }
}
