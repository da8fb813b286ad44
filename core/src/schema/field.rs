// accrete/src/schema/field.rs

//! Defines the per-field merge policy: how two values of one state slot
//! combine, and what the slot's freshly-initialized value is.

use crate::error::{AccreteError, AccreteResult};
use std::any::{Any, TypeId};
use std::sync::Arc;

/// A type-erased field value as stored in an accumulated state.
///
/// Values are shared by reference between successive state snapshots: a field
/// that an update does not touch keeps the exact same `Arc` in the next
/// snapshot.
pub type AnyValue = Arc<dyn Any + Send + Sync>;

/// Type alias for a field's merge function.
///
/// The function combines the previously accumulated value with the incoming
/// value from a partial update. Both sides are `Option`:
///  - a `None` previous value means the field is currently unset;
///  - a `None` incoming value means the update carried an explicit clear
///    (the absence sentinel), as opposed to simply omitting the field.
///
/// The returned `Option` is the next stored value; `None` unsets the field.
/// Merge functions must be total and deterministic, and must not touch
/// anything outside their two arguments.
pub type MergeFn<T> = Arc<dyn Fn(Option<T>, Option<T>) -> Option<T> + Send + Sync>;

/// Type alias for a field's default-value factory.
///
/// Invoked freshly for every initialization, so each run gets its own empty
/// containers rather than a shared constant.
pub type DefaultFn<T> = Arc<dyn Fn() -> T + Send + Sync>;

/// Declares, for exactly one state slot, how two values of that slot combine
/// and what its empty value is. Pure data plus function values; the schema
/// builder turns it into a slot of a [`Schema`](crate::schema::Schema).
///
/// Without a merge function the field has plain overwrite semantics: an
/// incoming value wins whenever present, and an explicit clear unsets the
/// field. Without a default factory the field starts unset, and reads before
/// any producer writes it yield `None` ("not yet available"), never an error.
pub struct FieldSchema<T> {
  pub(crate) merge: Option<MergeFn<T>>,
  pub(crate) default: Option<DefaultFn<T>>,
}

impl<T> FieldSchema<T> {
  /// A field with plain overwrite semantics and no default.
  pub fn overwrite() -> Self {
    Self {
      merge: None,
      default: None,
    }
  }

  /// A field governed by a custom merge function.
  ///
  /// The custom function is invoked for every update entry touching the
  /// field, including explicit clears (incoming `None`), and alone decides
  /// the outcome.
  pub fn with_merge(merge: impl Fn(Option<T>, Option<T>) -> Option<T> + Send + Sync + 'static) -> Self {
    Self {
      merge: Some(Arc::new(merge)),
      default: None,
    }
  }

  /// Attaches a default-value factory, evaluated once per initialization.
  pub fn with_default(mut self, default: impl Fn() -> T + Send + Sync + 'static) -> Self {
    self.default = Some(Arc::new(default));
    self
  }
}

impl<T> Default for FieldSchema<T> {
  fn default() -> Self {
    Self::overwrite()
  }
}

// Manual Clone: function values are shared, T itself need not be Clone here.
impl<T> Clone for FieldSchema<T> {
  fn clone(&self) -> Self {
    Self {
      merge: self.merge.clone(),
      default: self.default.clone(),
    }
  }
}

// Arc<dyn Fn..> doesn't implement Debug; report presence only.
impl<T> std::fmt::Debug for FieldSchema<T> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("FieldSchema")
      .field("value_type", &std::any::type_name::<T>())
      .field("merge_present", &self.merge.is_some())
      .field("default_present", &self.default.is_some())
      .finish()
  }
}

// --- Type-erased field policy ---
//
// A `Schema` stores one `AnyFieldPolicy` per field so that fields of
// different value types can live in one ordered mapping. The typed
// `FieldSchema<T>` sits behind the trait object; the merge engine dispatches
// through it with erased values.

/// Trait for a type-erased per-field policy held by a schema.
pub(crate) trait AnyFieldPolicy: Send + Sync {
  /// `TypeId` of the field's underlying value type `T`.
  fn value_type_id(&self) -> TypeId;

  /// Human-readable name of the field's value type, for diagnostics.
  fn value_type_name(&self) -> &'static str;

  /// Whether a custom merge function is declared for this field.
  fn has_merge(&self) -> bool;

  /// Constructs a fresh default value, if a default factory is declared.
  fn default_value(&self) -> Option<AnyValue>;

  /// Invokes the custom merge function with erased previous/incoming values.
  ///
  /// Callers must have verified the incoming value's type against
  /// `value_type_id` first; a failing downcast here is an internal invariant
  /// violation, not a caller error.
  fn merge_erased(
    &self,
    field_name: &str,
    previous: Option<&AnyValue>,
    incoming: Option<&AnyValue>,
  ) -> AccreteResult<Option<AnyValue>>;
}

/// Concrete policy carrying a typed `FieldSchema<T>`.
pub(crate) struct FieldPolicyImpl<T: Clone + Send + Sync + 'static> {
  schema: FieldSchema<T>,
}

impl<T: Clone + Send + Sync + 'static> FieldPolicyImpl<T> {
  pub(crate) fn new(schema: FieldSchema<T>) -> Self {
    Self { schema }
  }
}

impl<T: Clone + Send + Sync + 'static> AnyFieldPolicy for FieldPolicyImpl<T> {
  fn value_type_id(&self) -> TypeId {
    TypeId::of::<T>()
  }

  fn value_type_name(&self) -> &'static str {
    std::any::type_name::<T>()
  }

  fn has_merge(&self) -> bool {
    self.schema.merge.is_some()
  }

  fn default_value(&self) -> Option<AnyValue> {
    self.schema.default.as_ref().map(|factory| Arc::new(factory()) as AnyValue)
  }

  fn merge_erased(
    &self,
    field_name: &str,
    previous: Option<&AnyValue>,
    incoming: Option<&AnyValue>,
  ) -> AccreteResult<Option<AnyValue>> {
    let merge = self.schema.merge.as_ref().ok_or_else(|| {
      AccreteError::Internal(format!(
        "merge_erased called for field '{}' which declares no merge function",
        field_name
      ))
    })?;

    let previous = previous.map(|v| downcast_value::<T>(v, field_name)).transpose()?;
    let incoming = incoming.map(|v| downcast_value::<T>(v, field_name)).transpose()?;

    Ok(merge(previous, incoming).map(|next| Arc::new(next) as AnyValue))
  }
}

// Stored values only ever enter a slot through the field's own policy, so a
// failed downcast means slot bookkeeping went wrong, not that a caller
// supplied a bad value.
fn downcast_value<T: Clone + Send + Sync + 'static>(value: &AnyValue, field_name: &str) -> AccreteResult<T> {
  value.downcast_ref::<T>().cloned().ok_or_else(|| {
    AccreteError::Internal(format!(
      "Stored value for field '{}' is not a {} despite matching TypeId bookkeeping",
      field_name,
      std::any::type_name::<T>()
    ))
  })
}
