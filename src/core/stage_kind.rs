/// Built-in stage kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageKind {
  /// Stage that maps each value.
  Map,
  /// Stage that forwards values matching a predicate.
  Filter,
  /// Stage that drops values matching a predicate.
  Remove,
  /// Stage that explodes each value into a stream and forwards its elements.
  Mapcat,
  /// Stage that forwards only first occurrences.
  Dedupe,
  /// Stage that buffers fixed-size chunks.
  Chunk,
  /// Stage that buffers runs sharing a projected key.
  ChunkBy,
  /// Stage that forwards values with a fixed probability.
  RandomSample,
  /// Stage that forwards every n-th value.
  TakeNth,
  /// Stage that forwards the first `n` values, then terminates.
  Take,
  /// Stage that forwards while a predicate holds, then terminates.
  TakeWhile,
  /// Stage that drops the first `n` values.
  Drop,
  /// Stage that drops while a predicate holds.
  DropWhile,
  /// Stage that maps values and drops null results.
  Keep,
  /// Stage that maps indexed values and drops null results.
  KeepIndexed,
  /// Stage that substitutes values through a mapping.
  Replace,
  /// Stage that diverts matching values into an external queue.
  Escape,
  /// Observation-only logging tap.
  Logger,
}

impl StageKind {
  /// Returns the stage name used in logs.
  #[must_use]
  pub const fn as_str(&self) -> &'static str {
    match self {
      | Self::Map => "map",
      | Self::Filter => "filter",
      | Self::Remove => "remove",
      | Self::Mapcat => "mapcat",
      | Self::Dedupe => "dedupe",
      | Self::Chunk => "chunk",
      | Self::ChunkBy => "chunk_by",
      | Self::RandomSample => "random_sample",
      | Self::TakeNth => "take_nth",
      | Self::Take => "take",
      | Self::TakeWhile => "take_while",
      | Self::Drop => "drop",
      | Self::DropWhile => "drop_while",
      | Self::Keep => "keep",
      | Self::KeepIndexed => "keep_indexed",
      | Self::Replace => "replace",
      | Self::Escape => "escape",
      | Self::Logger => "logger",
    }
  }
}
