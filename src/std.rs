//! Channel-backed processors and the observation layer.

/// Channel plumbing for streams, terminals and escape targets.
mod channel;
/// Streaming processor.
mod go;
/// Stage logging interleaver.
mod logging;

pub use channel::{ChannelSender, feed_channel, queue_terminal};
pub use go::go;
pub use logging::attach_loggers;
