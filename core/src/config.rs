// accrete/src/config.rs

//! The configuration schema: a parallel, smaller state schema holding
//! run-level options rather than step outputs.
//!
//! Mechanically identical to the workflow state schema (same declaration,
//! initialization, and merge semantics), but conventionally resolved once
//! per run, from a seed of explicitly supplied options layered over
//! defaults.

use crate::error::AccreteResult;
use crate::merge::reducers;
use crate::schema::definition::{FieldKey, Schema, SchemaBuilder};
use crate::schema::field::FieldSchema;
use crate::state::snapshot::StateSnapshot;
use crate::state::update::Update;
use std::sync::Arc;

/// Builder for a [`ConfigSchema`].
pub struct ConfigSchemaBuilder {
  inner: SchemaBuilder,
}

impl ConfigSchemaBuilder {
  pub fn new(name: impl Into<String>) -> Self {
    Self {
      inner: Schema::builder(name),
    }
  }

  /// Declares a boolean flag defaulting to `false`, fully replaced whenever
  /// a run supplies an explicit value.
  pub fn flag(&mut self, option_name: &str) -> AccreteResult<FieldKey<bool>> {
    self.inner.field(option_name, reducers::replace::<bool>().with_default(|| false))
  }

  /// Declares an arbitrary run-level option.
  pub fn option<T: Clone + Send + Sync + 'static>(
    &mut self,
    option_name: &str,
    field: FieldSchema<T>,
  ) -> AccreteResult<FieldKey<T>> {
    self.inner.field(option_name, field)
  }

  /// Reuses an option declaration from another schema, sharing its merge
  /// policy and default verbatim.
  pub fn reuse<T: Clone + Send + Sync + 'static>(
    &mut self,
    source: &Schema,
    option_name: &str,
  ) -> AccreteResult<FieldKey<T>> {
    self.inner.reuse(source, option_name)
  }

  pub fn build(self) -> ConfigSchema {
    ConfigSchema {
      schema: self.inner.build(),
    }
  }
}

/// A run-scoped options schema.
#[derive(Debug)]
pub struct ConfigSchema {
  schema: Arc<Schema>,
}

impl ConfigSchema {
  /// The underlying schema, e.g. for reuse into another schema.
  pub fn schema(&self) -> &Arc<Schema> {
    &self.schema
  }

  /// All options at their defaults.
  pub fn defaults(&self) -> StateSnapshot {
    StateSnapshot::init(&self.schema)
  }

  /// Options for one run: explicitly supplied values override defaults.
  /// Conventionally called once per run.
  pub fn resolve(&self, supplied: &Update) -> AccreteResult<StateSnapshot> {
    StateSnapshot::init_with(&self.schema, supplied)
  }
}
