//! Pipeline engine: values, streams, reducing steps, stages and drivers.

/// Construction-time error definitions.
mod dsl_error;
/// Lazy pull processor.
mod eduction;
/// Escape target trait.
mod escape_sender;
/// Runtime error definitions.
mod pipeline_error;
/// Reducing step trait and accumulator plumbing.
mod reducing;
/// Stage implementations.
mod stage;
/// Built-in stage kinds.
mod stage_kind;
/// Terminal reducing steps.
mod terminal;
/// Eager processor.
mod transduce;
/// Transducer builder and pipeline assembly.
mod transducer;
/// Dynamic value model.
mod value;
/// Hashable projection of comparable values.
mod value_key;
/// Pull-based value streams.
mod value_stream;

/// Worked predicates shared by examples and tests.
pub mod testing;

pub use dsl_error::PipelineDslError;
pub(crate) use dsl_error::{validate_positive_argument, validate_probability};
pub use eduction::eduction;
pub use escape_sender::EscapeSender;
pub use pipeline_error::PipelineError;
pub use reducing::{BoxedReducingStep, DynAccum, ReducingStep, StepOutcome, downcast_accum};
pub use stage::{
  chunk, chunk_by, dedupe, drop, drop_while, escape, filter, keep, keep_indexed, map, mapcat, random_sample, remove,
  replace, take, take_nth, take_while,
};
pub use stage_kind::StageKind;
pub use terminal::append;
pub use transduce::{transduce, transduce_values};
pub use transducer::{Transducer, create_pipeline};
pub use value::Value;
pub use value_key::ValueKey;
pub(crate) use value_stream::StreamLogic;
pub use value_stream::{ValueStream, to_stream};
