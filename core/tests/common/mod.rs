// tests/common/mod.rs
#![allow(dead_code)] // Allow unused code in this common test module

use accrete::{reducers, AccreteResult, FieldKey, FieldSchema, Route, Schema};
use std::sync::{
  atomic::{AtomicUsize, Ordering},
  Arc,
};
use tracing::Level;

// --- Helper for Tracing Setup (call once per test run if needed) ---
use once_cell::sync::Lazy;
static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer() // Important for tests to capture output
    .try_init()
    .ok(); // Allow multiple initializations in tests (ok if fails)
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}

// --- Atomic counter for checking default-factory invocations ---
pub static DEFAULT_FACTORY_CALLS: Lazy<Arc<AtomicUsize>> = Lazy::new(|| Arc::new(AtomicUsize::new(0)));

pub fn reset_counters() {
  DEFAULT_FACTORY_CALLS.store(0, Ordering::SeqCst);
}

/// Append field whose default factory bumps `DEFAULT_FACTORY_CALLS`, so
/// tests can assert one factory invocation per initialization.
pub fn tracked_append_field() -> FieldSchema<Vec<String>> {
  reducers::append::<String>().with_default(|| {
    DEFAULT_FACTORY_CALLS.fetch_add(1, Ordering::SeqCst);
    Vec::new()
  })
}

// --- Common Step Identifier for Routing Fields ---
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Step {
  GeneratePost,
  CondensePost,
  HumanReview,
  SchedulePost,
}

// --- Post-Generation Workflow Fixture ---
//
// A state shape exercising every reducer family at once: appended page
// contents, unioned relevant links, a plain-overwrite post and routing
// field, a fully-recomputed options list, and a bounded condense counter.
pub struct PostState {
  pub schema: Arc<Schema>,
  pub links: FieldKey<Vec<String>>,
  pub report: FieldKey<String>,
  pub page_contents: FieldKey<Vec<String>>,
  pub relevant_links: FieldKey<Vec<String>>,
  pub post: FieldKey<String>,
  pub next: FieldKey<Route<Step>>,
  pub image_options: FieldKey<Vec<String>>,
  pub condense_count: FieldKey<u32>,
}

pub fn post_state() -> AccreteResult<PostState> {
  let mut b = Schema::builder("post_state");
  let links = b.field("links", FieldSchema::<Vec<String>>::overwrite())?;
  let report = b.field("report", FieldSchema::<String>::overwrite())?;
  let page_contents = b.field("page_contents", reducers::append::<String>())?;
  let relevant_links = b.field("relevant_links", reducers::union::<String>())?;
  let post = b.field("post", FieldSchema::<String>::overwrite())?;
  let next = b.field("next", FieldSchema::<Route<Step>>::overwrite())?;
  let image_options = b.field("image_options", reducers::replace::<Vec<String>>().with_default(Vec::new))?;
  let condense_count = b.field("condense_count", reducers::counter::<u32>())?;
  Ok(PostState {
    schema: b.build(),
    links,
    report,
    page_contents,
    relevant_links,
    post,
    next,
    image_options,
    condense_count,
  })
}

// --- Ingest Fixture (source schema for cross-schema reuse) ---
pub fn ingest_state() -> AccreteResult<(Arc<Schema>, FieldKey<String>)> {
  let mut b = Schema::builder("ingest_state");
  let report = b.field("report", FieldSchema::<String>::overwrite())?;
  b.field("page_contents", reducers::append::<String>())?;
  Ok((b.build(), report))
}

pub fn strings(items: &[&str]) -> Vec<String> {
  items.iter().map(|s| s.to_string()).collect()
}
