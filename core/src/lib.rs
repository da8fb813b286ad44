// src/lib.rs

//! Accrete: a declarative state-merge engine for step-based workflows.
//!
//! Each step of a multi-stage pipeline emits a *partial update* to a shared
//! accumulating state; accrete combines that update with the previously
//! accumulated state according to a per-field merge policy declared once, up
//! front, independent of which step produced the update. Features:
//!  - Per-field merge functions and default-value factories.
//!  - Ordered schemas with cross-schema field reuse (one-time policy share).
//!  - Typed field keys and a three-valued per-field update representation
//!    (no opinion / explicit clear / new value).
//!  - A pure merge engine: every applied update yields a new snapshot, and
//!    untouched fields keep their exact shared value.
//!  - Named reducer families: append, set-union in first-seen order,
//!    replace-on-signal, replace, counter.
//!  - A parking_lot-backed per-run state cell retaining every intermediate
//!    snapshot for inspection and replay.
//!  - A configuration schema for run-level options, merged with the same
//!    semantics but scoped separately from workflow state.

// Declare modules according to the planned structure
pub mod config;
pub mod error;
pub mod merge;
pub mod routing;
pub mod schema;
pub mod state;

// --- Re-exports for the Public API ---

// Core types that users will interact with frequently
pub use crate::schema::definition::{FieldKey, Schema, SchemaBuilder};
pub use crate::schema::field::{AnyValue, DefaultFn, FieldSchema, MergeFn};

pub use crate::state::cell::StateCell;
pub use crate::state::snapshot::StateSnapshot;
pub use crate::state::update::{FieldUpdate, Update};

// The merge engine entry point and the named reducer families
pub use crate::merge::engine::apply;
pub use crate::merge::reducers;

pub use crate::config::{ConfigSchema, ConfigSchemaBuilder};
pub use crate::routing::Route;

pub use crate::error::{AccreteError, AccreteResult};

/*
    Core Workflow:
    1. Declare a `Schema` with one `FieldSchema` per state slot, keeping the
       typed `FieldKey`s the builder returns.
    2. Initialize a run with `StateSnapshot::init` (or `init_with` a seed),
       optionally wrapping it in a `StateCell`.
    3. Each pipeline step builds an `Update` with the fields it has an
       opinion on and hands it to `apply` (or `StateCell::apply`).
    4. The orchestrator reads the routing field (`Route<S>`) from the merged
       state to decide which step runs next; `Route::Done` ends the run.
    5. Run-level options live in a `ConfigSchema`, resolved once per run.
*/
