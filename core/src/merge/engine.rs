// accrete/src/merge/engine.rs

//! Contains `apply()`, the merge engine: combines the current accumulated
//! state with one partial update according to each field's declared policy.

use crate::error::{AccreteError, AccreteResult};
use crate::state::snapshot::StateSnapshot;
use crate::state::update::{EntryValue, Update};
use tracing::{event, instrument, Level};

/// Produces the next accumulated state from `current` and `update`.
///
/// Per field carrying an entry in the update:
///  1. If the field declares a custom merge function, that function is
///     invoked (with an incoming `None` when the entry is an explicit clear)
///     and alone decides the next value.
///  2. Otherwise the entry overwrites: a value replaces the slot, a clear
///     unsets it.
///  3. Fields without an entry keep the exact same shared value as in
///     `current` (identity, not just equality).
///
/// `current` is never mutated. Merges are strictly per-field: no field's
/// policy can observe another field, so the entry evaluation order does not
/// matter. Updates whose shape does not fit the schema (unknown field, wrong
/// value type, key minted by another schema) propagate as errors with no
/// recovery semantics.
#[instrument(
    name = "merge::apply",
    skip_all,
    fields(
        schema = %current.schema().name(),
        fields_in_update = update.len(),
    ),
    err(Display)
)]
pub fn apply(current: &StateSnapshot, update: &Update) -> AccreteResult<StateSnapshot> {
  let schema = current.schema();
  let mut next_slots = current.slots.clone();

  for (field_name, entry) in update.entries() {
    if let Some(id) = entry.schema_id {
      if id != schema.id() {
        event!(Level::ERROR, field = %field_name, "Update entry carries a key from a different schema.");
        return Err(AccreteError::ForeignKey {
          schema: schema.name().to_string(),
          field: field_name.to_string(),
        });
      }
    }

    let slot = schema.slot_of(field_name).ok_or_else(|| {
      event!(Level::ERROR, field = %field_name, "Update entry for undeclared field.");
      AccreteError::UnknownField {
        schema: schema.name().to_string(),
        field: field_name.to_string(),
      }
    })?;
    let def = schema.field_at(slot);

    let incoming = match &entry.value {
      EntryValue::Clear => None,
      EntryValue::Value {
        value,
        type_id,
        type_name,
      } => {
        if *type_id != def.policy.value_type_id() {
          event!(
            Level::ERROR,
            field = %field_name,
            expected = def.policy.value_type_name(),
            actual = %type_name,
            "Update entry value type does not match the field's declared type."
          );
          return Err(AccreteError::TypeMismatch {
            schema: schema.name().to_string(),
            field: field_name.to_string(),
            expected: def.policy.value_type_name(),
            actual: *type_name,
          });
        }
        Some(value.clone())
      }
    };

    let next_value = if def.policy.has_merge() {
      // The custom function sees clears too; it alone decides the outcome.
      def.policy.merge_erased(field_name, next_slots[slot].as_ref(), incoming.as_ref())?
    } else {
      incoming
    };

    event!(
      Level::TRACE,
      field = %field_name,
      custom_merge = def.policy.has_merge(),
      set = next_value.is_some(),
      "Field merged."
    );
    next_slots[slot] = next_value;
  }

  event!(Level::DEBUG, "Update applied.");
  Ok(StateSnapshot {
    schema: schema.clone(),
    slots: next_slots,
  })
}
