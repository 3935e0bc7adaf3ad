use core::fmt;

/// Errors raised while a transducer is constructed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PipelineDslError {
  /// Indicates an invalid numeric argument.
  InvalidArgument {
    /// Invalid argument name.
    name:   &'static str,
    /// Invalid argument value.
    value:  usize,
    /// Human-readable failure reason.
    reason: &'static str,
  },
  /// Indicates a sampling probability outside of `[0, 1]`.
  InvalidProbability {
    /// Rejected probability.
    value: f64,
  },
  /// Indicates a replacement mapping keyed on an incomparable value.
  IncomparableKey {
    /// Shape of the rejected key.
    kind: &'static str,
  },
  /// Indicates a replacement value that cannot be duplicated per forward.
  UnsupportedReplacement {
    /// Shape of the rejected replacement.
    kind: &'static str,
  },
}

impl fmt::Display for PipelineDslError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      | Self::InvalidArgument { name, value, reason } => {
        write!(f, "invalid argument `{name}` ({value}): {reason}")
      },
      | Self::InvalidProbability { value } => {
        write!(f, "invalid probability ({value}): must lie within [0, 1]")
      },
      | Self::IncomparableKey { kind } => write!(f, "replacement key of shape {kind} is incomparable"),
      | Self::UnsupportedReplacement { kind } => {
        write!(f, "replacement value of shape {kind} cannot be duplicated")
      },
    }
  }
}

pub(crate) fn validate_positive_argument(name: &'static str, value: usize) -> Result<usize, PipelineDslError> {
  if value == 0 {
    return Err(PipelineDslError::InvalidArgument { name, value, reason: "must be greater than zero" });
  }
  Ok(value)
}

pub(crate) fn validate_probability(value: f64) -> Result<f64, PipelineDslError> {
  if !(0.0..=1.0).contains(&value) {
    return Err(PipelineDslError::InvalidProbability { value });
  }
  Ok(value)
}
