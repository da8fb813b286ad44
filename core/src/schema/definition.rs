// accrete/src/schema/definition.rs

//! Contains the `Schema` type (an ordered mapping from field name to field
//! policy), its builder, and the typed `FieldKey<T>` handles used to address
//! fields in states and updates.

use crate::error::{AccreteError, AccreteResult};
use crate::schema::field::{AnyFieldPolicy, FieldPolicyImpl, FieldSchema};
use std::any::TypeId;
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{event, Level};

// Every schema gets a distinct identity so that a key minted by one schema
// cannot silently address a slot of another.
static SCHEMA_IDS: AtomicU64 = AtomicU64::new(1);

fn next_schema_id() -> u64 {
  SCHEMA_IDS.fetch_add(1, Ordering::Relaxed)
}

/// One declared field: its name plus the type-erased policy.
pub(crate) struct FieldDef {
  pub(crate) name: Arc<str>,
  pub(crate) policy: Arc<dyn AnyFieldPolicy>,
}

/// A typed handle to one field of one schema.
///
/// Keys are minted by [`SchemaBuilder::field`] and [`SchemaBuilder::reuse`];
/// they are cheap to clone and are the type-safe way to read state slots and
/// build updates. Using a key against a state of a different schema is a
/// setup error.
pub struct FieldKey<T> {
  pub(crate) name: Arc<str>,
  pub(crate) slot: usize,
  pub(crate) schema_id: u64,
  _marker: PhantomData<fn() -> T>,
}

impl<T> FieldKey<T> {
  /// The field name this key addresses.
  pub fn name(&self) -> &str {
    &self.name
  }
}

// Manual Clone: the PhantomData makes a derived impl demand T: Clone.
impl<T> Clone for FieldKey<T> {
  fn clone(&self) -> Self {
    Self {
      name: self.name.clone(),
      slot: self.slot,
      schema_id: self.schema_id,
      _marker: PhantomData,
    }
  }
}

impl<T> std::fmt::Debug for FieldKey<T> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("FieldKey")
      .field("name", &self.name)
      .field("value_type", &std::any::type_name::<T>())
      .finish()
  }
}

/// An ordered mapping from field name to field policy: the declaration of
/// one accumulated-state shape.
///
/// Schemas are immutable once built and are shared behind an `Arc` by every
/// snapshot initialized from them. Composition happens at declaration time
/// only: [`SchemaBuilder::reuse`] copies another schema's policy by
/// reference, a one-time intentional share rather than a live link.
pub struct Schema {
  id: u64,
  name: String,
  fields: Vec<FieldDef>,
  index: HashMap<String, usize>,
}

impl Schema {
  /// Starts declaring a new schema with the given name (used in errors and
  /// trace output, not for identity).
  pub fn builder(name: impl Into<String>) -> SchemaBuilder {
    SchemaBuilder {
      id: next_schema_id(),
      name: name.into(),
      fields: Vec::new(),
      index: HashMap::new(),
    }
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub(crate) fn id(&self) -> u64 {
    self.id
  }

  /// Number of declared fields.
  pub fn len(&self) -> usize {
    self.fields.len()
  }

  pub fn is_empty(&self) -> bool {
    self.fields.is_empty()
  }

  pub fn contains(&self, field_name: &str) -> bool {
    self.index.contains_key(field_name)
  }

  /// Field names in declaration order.
  pub fn field_names(&self) -> impl Iterator<Item = &str> {
    self.fields.iter().map(|def| &*def.name)
  }

  /// Mints a typed key for a declared field by name.
  ///
  /// Fails with `UnknownField` if the name is not declared and with
  /// `TypeMismatch` if `T` is not the field's declared value type. Intended
  /// for callers that discover field names dynamically (e.g. an orchestrator
  /// reading a routing field it only knows by configuration).
  pub fn key_of<T: Clone + Send + Sync + 'static>(&self, field_name: &str) -> AccreteResult<FieldKey<T>> {
    let slot = self.slot_of(field_name).ok_or_else(|| AccreteError::UnknownField {
      schema: self.name.clone(),
      field: field_name.to_string(),
    })?;
    let def = &self.fields[slot];
    if def.policy.value_type_id() != TypeId::of::<T>() {
      return Err(AccreteError::TypeMismatch {
        schema: self.name.clone(),
        field: field_name.to_string(),
        expected: def.policy.value_type_name(),
        actual: std::any::type_name::<T>(),
      });
    }
    Ok(FieldKey {
      name: def.name.clone(),
      slot,
      schema_id: self.id,
      _marker: PhantomData,
    })
  }

  pub(crate) fn slot_of(&self, field_name: &str) -> Option<usize> {
    self.index.get(field_name).copied()
  }

  pub(crate) fn field_at(&self, slot: usize) -> &FieldDef {
    &self.fields[slot]
  }
}

impl std::fmt::Debug for Schema {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Schema")
      .field("name", &self.name)
      .field("fields", &self.field_names().collect::<Vec<_>>())
      .finish()
  }
}

/// Builder for [`Schema`]. Declaration order is preserved.
pub struct SchemaBuilder {
  id: u64,
  name: String,
  fields: Vec<FieldDef>,
  index: HashMap<String, usize>,
}

impl SchemaBuilder {
  /// Declares a new field and returns its typed key.
  ///
  /// Fails with `DuplicateField` if the name is already taken.
  pub fn field<T: Clone + Send + Sync + 'static>(
    &mut self,
    field_name: &str,
    field: FieldSchema<T>,
  ) -> AccreteResult<FieldKey<T>> {
    let policy: Arc<dyn AnyFieldPolicy> = Arc::new(FieldPolicyImpl::new(field));
    self.push_field(field_name, policy)
  }

  /// Declares a field as "the same field as `field_name` of `source`",
  /// sharing the source field's merge function and default factory by
  /// reference.
  ///
  /// The share happens once, here; the source schema is not consulted again
  /// afterwards. Fails with `UnknownField` if the source does not declare the
  /// name, and with `TypeMismatch` if `T` differs from the source field's
  /// declared value type.
  pub fn reuse<T: Clone + Send + Sync + 'static>(
    &mut self,
    source: &Schema,
    field_name: &str,
  ) -> AccreteResult<FieldKey<T>> {
    let slot = source.slot_of(field_name).ok_or_else(|| AccreteError::UnknownField {
      schema: source.name().to_string(),
      field: field_name.to_string(),
    })?;
    let def = source.field_at(slot);
    if def.policy.value_type_id() != TypeId::of::<T>() {
      return Err(AccreteError::TypeMismatch {
        schema: source.name().to_string(),
        field: field_name.to_string(),
        expected: def.policy.value_type_name(),
        actual: std::any::type_name::<T>(),
      });
    }
    event!(
      Level::DEBUG,
      schema = %self.name,
      source_schema = %source.name(),
      field = %field_name,
      "Reusing field policy from source schema."
    );
    let policy = def.policy.clone();
    self.push_field(field_name, policy)
  }

  fn push_field<T>(&mut self, field_name: &str, policy: Arc<dyn AnyFieldPolicy>) -> AccreteResult<FieldKey<T>> {
    if self.index.contains_key(field_name) {
      return Err(AccreteError::DuplicateField {
        schema: self.name.clone(),
        field: field_name.to_string(),
      });
    }
    let slot = self.fields.len();
    let name: Arc<str> = Arc::from(field_name);
    self.fields.push(FieldDef {
      name: name.clone(),
      policy,
    });
    self.index.insert(field_name.to_string(), slot);
    Ok(FieldKey {
      name,
      slot,
      schema_id: self.id,
      _marker: PhantomData,
    })
  }

  /// Finishes the declaration.
  pub fn build(self) -> Arc<Schema> {
    event!(
      Level::DEBUG,
      schema = %self.name,
      num_fields = self.fields.len(),
      "Schema built."
    );
    Arc::new(Schema {
      id: self.id,
      name: self.name,
      fields: self.fields,
      index: self.index,
    })
  }
}
