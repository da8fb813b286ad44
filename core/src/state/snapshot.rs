// accrete/src/state/snapshot.rs

//! Defines `StateSnapshot`, the accumulated state of one pipeline run, and
//! the initializer that materializes field defaults.

use crate::error::{AccreteError, AccreteResult};
use crate::schema::definition::{FieldKey, Schema};
use crate::schema::field::AnyValue;
use crate::state::update::{EntryValue, Update};
use std::any::TypeId;
use std::sync::Arc;
use tracing::{event, Level};

/// The full current value of all fields for one pipeline run.
///
/// A snapshot is immutable: the merge engine produces a new snapshot for
/// every applied update, and intermediate snapshots stay inspectable. Slots
/// hold `Arc`-shared values, so cloning a snapshot (and carrying untouched
/// fields from one snapshot to the next) never copies field data.
#[derive(Clone)]
pub struct StateSnapshot {
  pub(crate) schema: Arc<Schema>,
  pub(crate) slots: Vec<Option<AnyValue>>,
}

impl StateSnapshot {
  /// Builds the initial state for `schema`: every field with a default
  /// factory gets a freshly constructed value, every other field starts
  /// unset.
  ///
  /// Factories run once per call, so two initializations never share a
  /// container.
  pub fn init(schema: &Arc<Schema>) -> Self {
    let slots = (0..schema.len())
      .map(|slot| schema.field_at(slot).policy.default_value())
      .collect();
    event!(Level::DEBUG, schema = %schema.name(), "State initialized from defaults.");
    Self {
      schema: schema.clone(),
      slots,
    }
  }

  /// Builds the initial state for `schema` with caller-supplied seed values.
  ///
  /// Per field: the seed value if the seed carries one, else the default
  /// factory's value, else unset. A `Clear` seed entry leaves the field
  /// unset without running its default. Seed entries for fields the schema
  /// does not declare are an error.
  pub fn init_with(schema: &Arc<Schema>, seed: &Update) -> AccreteResult<Self> {
    let mut snapshot = Self {
      schema: schema.clone(),
      slots: vec![None; schema.len()],
    };
    for (field_name, entry) in seed.entries() {
      let slot = schema.slot_of(field_name).ok_or_else(|| AccreteError::UnknownField {
        schema: schema.name().to_string(),
        field: field_name.to_string(),
      })?;
      if let Some(id) = entry.schema_id {
        if id != schema.id() {
          return Err(AccreteError::ForeignKey {
            schema: schema.name().to_string(),
            field: field_name.to_string(),
          });
        }
      }
      match &entry.value {
        EntryValue::Clear => snapshot.slots[slot] = None,
        EntryValue::Value {
          value,
          type_id,
          type_name,
        } => {
          let def = schema.field_at(slot);
          if *type_id != def.policy.value_type_id() {
            return Err(AccreteError::TypeMismatch {
              schema: schema.name().to_string(),
              field: field_name.to_string(),
              expected: def.policy.value_type_name(),
              actual: *type_name,
            });
          }
          snapshot.slots[slot] = Some(value.clone());
        }
      }
    }
    // Defaults only for fields the seed says nothing about.
    for slot in 0..schema.len() {
      let def = schema.field_at(slot);
      if !seed.touches(&def.name) && snapshot.slots[slot].is_none() {
        snapshot.slots[slot] = def.policy.default_value();
      }
    }
    event!(
      Level::DEBUG,
      schema = %schema.name(),
      seeded_fields = seed.len(),
      "State initialized with seed."
    );
    Ok(snapshot)
  }

  pub fn schema(&self) -> &Arc<Schema> {
    &self.schema
  }

  /// Reads the field addressed by `key`. `None` means the field is unset
  /// ("not yet available"), which callers must treat as normal, not as an
  /// error.
  ///
  /// # Panics
  /// Panics if `key` was minted by a different schema. That is a programming
  /// error (a key leaked across schemas), not a runtime condition.
  pub fn get<T: Clone + Send + Sync + 'static>(&self, key: &FieldKey<T>) -> Option<&T> {
    if key.schema_id != self.schema.id() {
      panic!(
        "accrete setup error: field key '{}' was minted by a different schema than '{}'",
        key.name(),
        self.schema.name()
      );
    }
    self.slots[key.slot].as_deref().and_then(|value| value.downcast_ref::<T>())
  }

  /// Reads a field by bare name, checking the requested type against the
  /// schema. `Ok(None)` means the field is unset.
  pub fn get_named<T: Clone + Send + Sync + 'static>(&self, field_name: &str) -> AccreteResult<Option<&T>> {
    let slot = self.schema.slot_of(field_name).ok_or_else(|| AccreteError::UnknownField {
      schema: self.schema.name().to_string(),
      field: field_name.to_string(),
    })?;
    let def = self.schema.field_at(slot);
    if def.policy.value_type_id() != TypeId::of::<T>() {
      return Err(AccreteError::TypeMismatch {
        schema: self.schema.name().to_string(),
        field: field_name.to_string(),
        expected: def.policy.value_type_name(),
        actual: std::any::type_name::<T>(),
      });
    }
    Ok(self.slots[slot].as_deref().and_then(|value| value.downcast_ref::<T>()))
  }

  /// Whether the named field currently holds a value. Names the schema does
  /// not declare read as unset.
  pub fn is_set(&self, field_name: &str) -> bool {
    self
      .schema
      .slot_of(field_name)
      .map_or(false, |slot| self.slots[slot].is_some())
  }

  /// The raw shared value of a field, if set. Mainly useful to observe value
  /// sharing between snapshots (`Arc::ptr_eq`); typed access goes through
  /// [`StateSnapshot::get`].
  pub fn raw(&self, field_name: &str) -> Option<&AnyValue> {
    self.schema.slot_of(field_name).and_then(|slot| self.slots[slot].as_ref())
  }

  /// Applies one partial update, producing the next state. Equivalent to
  /// [`crate::merge::engine::apply`].
  pub fn apply(&self, update: &Update) -> AccreteResult<StateSnapshot> {
    crate::merge::engine::apply(self, update)
  }
}

impl std::fmt::Debug for StateSnapshot {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    let mut map = f.debug_map();
    for (slot, name) in self.schema.field_names().enumerate() {
      let status = if self.slots[slot].is_some() { "<set>" } else { "<unset>" };
      map.entry(&name, &status);
    }
    map.finish()
  }
}
