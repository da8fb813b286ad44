// accrete/src/state/update.rs

//! Defines the partial update one pipeline step hands to the merge engine:
//! the subset of fields the step has an opinion on.

use crate::schema::definition::FieldKey;
use crate::schema::field::AnyValue;
use std::any::TypeId;
use std::collections::HashMap;
use std::sync::Arc;

/// Per-field update value, made three-valued on purpose:
///
/// - `Unset`: the step has no opinion on this field; the previous value is
///   carried over untouched.
/// - `Clear`: the absence sentinel, actively resetting the field. Distinct
///   from omission, and delivered to a custom merge function as an incoming
///   `None` so the policy decides the outcome.
/// - `Value(v)`: a new value to merge in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldUpdate<T> {
  Unset,
  Clear,
  Value(T),
}

pub(crate) enum EntryValue {
  Clear,
  Value {
    value: AnyValue,
    type_id: TypeId,
    type_name: &'static str,
  },
}

pub(crate) struct UpdateEntry {
  // Schema identity of the key that produced the entry; absent for entries
  // addressed by bare name.
  pub(crate) schema_id: Option<u64>,
  pub(crate) value: EntryValue,
}

/// A partial update: a mapping from a subset of field names to new values or
/// explicit clears. Fields without an entry are left untouched by the merge
/// engine.
///
/// Entries are normally addressed through typed [`FieldKey`]s; the `_named`
/// variants exist for producers that only know field names at run time, and
/// are type-checked against the schema when the update is applied. Inserting
/// two entries for the same field keeps the later one. An `Update` also
/// serves as the seed for state initialization.
#[derive(Default)]
pub struct Update {
  entries: HashMap<String, UpdateEntry>,
}

impl Update {
  pub fn new() -> Self {
    Self::default()
  }

  /// Records a new value for the field addressed by `key`.
  pub fn set<T: Clone + Send + Sync + 'static>(self, key: &FieldKey<T>, value: T) -> Self {
    self.put(key, FieldUpdate::Value(value))
  }

  /// Records an explicit clear for the field addressed by `key`.
  pub fn clear<T: Clone + Send + Sync + 'static>(self, key: &FieldKey<T>) -> Self {
    self.put(key, FieldUpdate::Clear)
  }

  /// Records a three-valued entry for the field addressed by `key`.
  /// `FieldUpdate::Unset` removes any previously recorded entry.
  pub fn put<T: Clone + Send + Sync + 'static>(mut self, key: &FieldKey<T>, update: FieldUpdate<T>) -> Self {
    match update {
      FieldUpdate::Unset => {
        self.entries.remove(key.name());
      }
      FieldUpdate::Clear => {
        self.entries.insert(
          key.name().to_string(),
          UpdateEntry {
            schema_id: Some(key.schema_id),
            value: EntryValue::Clear,
          },
        );
      }
      FieldUpdate::Value(value) => {
        self.entries.insert(
          key.name().to_string(),
          UpdateEntry {
            schema_id: Some(key.schema_id),
            value: EntryValue::Value {
              value: Arc::new(value),
              type_id: TypeId::of::<T>(),
              type_name: std::any::type_name::<T>(),
            },
          },
        );
      }
    }
    self
  }

  /// Records a new value for a field addressed by bare name. The value type
  /// is checked against the schema when the update is applied.
  pub fn set_named<T: Clone + Send + Sync + 'static>(mut self, field_name: &str, value: T) -> Self {
    self.entries.insert(
      field_name.to_string(),
      UpdateEntry {
        schema_id: None,
        value: EntryValue::Value {
          value: Arc::new(value),
          type_id: TypeId::of::<T>(),
          type_name: std::any::type_name::<T>(),
        },
      },
    );
    self
  }

  /// Records an explicit clear for a field addressed by bare name.
  pub fn clear_named(mut self, field_name: &str) -> Self {
    self.entries.insert(
      field_name.to_string(),
      UpdateEntry {
        schema_id: None,
        value: EntryValue::Clear,
      },
    );
    self
  }

  /// Number of fields this update has an opinion on.
  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  /// Whether the update carries an entry (value or clear) for `field_name`.
  pub fn touches(&self, field_name: &str) -> bool {
    self.entries.contains_key(field_name)
  }

  pub(crate) fn entries(&self) -> impl Iterator<Item = (&str, &UpdateEntry)> {
    self.entries.iter().map(|(name, entry)| (name.as_str(), entry))
  }
}

impl std::fmt::Debug for Update {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    let mut map = f.debug_map();
    for (name, entry) in &self.entries {
      match &entry.value {
        EntryValue::Clear => map.entry(name, &"<clear>"),
        EntryValue::Value { type_name, .. } => map.entry(name, type_name),
      };
    }
    map.finish()
  }
}
