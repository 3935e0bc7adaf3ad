use alloc::{string::String, sync::Arc, vec::Vec};
use core::{any::Any, fmt};

use super::{ValueKey, ValueStream};

#[cfg(test)]
mod tests;

/// Dynamically typed pipeline element.
///
/// Every stage accepts and forwards any shape. `Int`, `Bool` and `Text` are
/// the comparable scalar shapes, [`Value::Opaque`] carries arbitrary payloads,
/// [`Value::Stream`] marks a nested sequence and [`Value::Null`] is the drop
/// sentinel understood by the `keep` family.
pub enum Value {
  /// Signed integer scalar.
  Int(i64),
  /// Boolean scalar.
  Bool(bool),
  /// Text scalar.
  Text(String),
  /// Type-erased scalar payload.
  Opaque(Arc<dyn Any + Send + Sync>),
  /// Materialized sequence of values.
  List(Vec<Value>),
  /// Nested value stream.
  Stream(ValueStream),
  /// Drop sentinel.
  Null,
}

impl Value {
  /// Wraps an arbitrary payload as an opaque scalar.
  #[must_use]
  pub fn opaque<T>(payload: T) -> Self
  where
    T: Any + Send + Sync, {
    Self::Opaque(Arc::new(payload))
  }

  /// Returns a short name for the value shape.
  #[must_use]
  pub const fn kind_name(&self) -> &'static str {
    match self {
      | Self::Int(_) => "int",
      | Self::Bool(_) => "bool",
      | Self::Text(_) => "text",
      | Self::Opaque(_) => "opaque",
      | Self::List(_) => "list",
      | Self::Stream(_) => "stream",
      | Self::Null => "null",
    }
  }

  /// Returns the hashable projection of a comparable value.
  ///
  /// Streams, opaque payloads, lists and the drop sentinel have no
  /// projection; stages that require comparison treat them as incomparable.
  #[must_use]
  pub fn key(&self) -> Option<ValueKey> {
    ValueKey::from_value(self)
  }

  /// Duplicates the value without consuming it.
  ///
  /// Opaque payloads are shared by reference count. Streams cannot be
  /// duplicated (they are single-pass cursors), so `None` is returned for a
  /// stream and for any list containing one.
  #[must_use]
  pub fn try_duplicate(&self) -> Option<Self> {
    match self {
      | Self::Int(value) => Some(Self::Int(*value)),
      | Self::Bool(value) => Some(Self::Bool(*value)),
      | Self::Text(text) => Some(Self::Text(text.clone())),
      | Self::Opaque(payload) => Some(Self::Opaque(payload.clone())),
      | Self::List(items) => {
        let mut copies = Vec::with_capacity(items.len());
        for item in items {
          copies.push(item.try_duplicate()?);
        }
        Some(Self::List(copies))
      },
      | Self::Stream(_) => None,
      | Self::Null => Some(Self::Null),
    }
  }

  /// Forks the value into an inspection copy and the value to forward.
  ///
  /// Scalars are duplicated. A nested stream is split so the probe and the
  /// forwarded halves own independent cursors; a list that contains a stream
  /// is routed through a stream split for the same reason.
  #[must_use]
  pub fn fork(self) -> (Self, Self) {
    match self {
      | Self::Stream(stream) => {
        let (probe, pass) = stream.split();
        (Self::Stream(probe), Self::Stream(pass))
      },
      | Self::List(items) => match duplicate_items(&items) {
        | Some(copies) => (Self::List(copies), Self::List(items)),
        | None => {
          let (probe, pass) = ValueStream::from_values(items).split();
          (Self::Stream(probe), Self::Stream(pass))
        },
      },
      | Self::Int(value) => (Self::Int(value), Self::Int(value)),
      | Self::Bool(value) => (Self::Bool(value), Self::Bool(value)),
      | Self::Text(text) => (Self::Text(text.clone()), Self::Text(text)),
      | Self::Opaque(payload) => (Self::Opaque(payload.clone()), Self::Opaque(payload)),
      | Self::Null => (Self::Null, Self::Null),
    }
  }
}

fn duplicate_items(items: &[Value]) -> Option<Vec<Value>> {
  let mut copies = Vec::with_capacity(items.len());
  for item in items {
    copies.push(item.try_duplicate()?);
  }
  Some(copies)
}

impl From<i64> for Value {
  fn from(value: i64) -> Self {
    Self::Int(value)
  }
}

impl From<bool> for Value {
  fn from(value: bool) -> Self {
    Self::Bool(value)
  }
}

impl From<&str> for Value {
  fn from(value: &str) -> Self {
    Self::Text(String::from(value))
  }
}

impl From<String> for Value {
  fn from(value: String) -> Self {
    Self::Text(value)
  }
}

impl From<Vec<Value>> for Value {
  fn from(values: Vec<Value>) -> Self {
    Self::List(values)
  }
}

impl PartialEq for Value {
  fn eq(&self, other: &Self) -> bool {
    match (self, other) {
      | (Self::Int(left), Self::Int(right)) => left == right,
      | (Self::Bool(left), Self::Bool(right)) => left == right,
      | (Self::Text(left), Self::Text(right)) => left == right,
      | (Self::List(left), Self::List(right)) => left == right,
      | (Self::Null, Self::Null) => true,
      | _ => false,
    }
  }
}

impl fmt::Debug for Value {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      | Self::Int(value) => write!(f, "Int({value})"),
      | Self::Bool(value) => write!(f, "Bool({value})"),
      | Self::Text(text) => write!(f, "Text({text:?})"),
      | Self::Opaque(_) => f.write_str("Opaque(..)"),
      | Self::List(items) => write!(f, "List({items:?})"),
      | Self::Stream(_) => f.write_str("Stream(..)"),
      | Self::Null => f.write_str("Null"),
    }
  }
}
