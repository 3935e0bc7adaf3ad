#![deny(missing_docs)]
#![deny(unsafe_op_in_unsafe_fn)]
#![deny(rustdoc::broken_intra_doc_links)]
#![cfg_attr(not(test), no_std)]

//! Composable transducer pipelines over dynamically typed value streams.
//!
//! A pipeline is an ordered list of [`Transducer`] stages folded right-to-left
//! over a terminal [`ReducingStep`]. The same stage list can be driven three
//! ways: eagerly with [`transduce`], lazily with [`eduction`], or over
//! concurrent channels with [`go`].

extern crate alloc;

mod core;
mod std;

pub use crate::core::{
  BoxedReducingStep, DynAccum, EscapeSender, PipelineDslError, PipelineError, ReducingStep, StageKind, StepOutcome,
  Transducer, Value, ValueKey, ValueStream, append, chunk, chunk_by, create_pipeline, dedupe, downcast_accum, drop,
  drop_while, eduction, escape, filter, keep, keep_indexed, map, mapcat, random_sample, remove, replace, take,
  take_nth, take_while, testing, to_stream, transduce, transduce_values,
};
pub use crate::std::{ChannelSender, attach_loggers, feed_channel, go, queue_terminal};
