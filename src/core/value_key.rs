use alloc::string::String;

use super::Value;

/// Hashable projection of a comparable [`Value`].
///
/// Keys back the `dedupe` seen-set, the `replace` mapping table and the
/// `chunk_by` run comparison. Streams, opaque payloads and lists have no
/// projection and are treated as incomparable by those stages.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ValueKey {
  /// Integer key.
  Int(i64),
  /// Boolean key.
  Bool(bool),
  /// Text key.
  Text(String),
}

impl ValueKey {
  /// Projects a comparable value into its key form.
  #[must_use]
  pub fn from_value(value: &Value) -> Option<Self> {
    match value {
      | Value::Int(value) => Some(Self::Int(*value)),
      | Value::Bool(value) => Some(Self::Bool(*value)),
      | Value::Text(text) => Some(Self::Text(text.clone())),
      | Value::Opaque(_) | Value::List(_) | Value::Stream(_) | Value::Null => None,
    }
  }
}
