// accrete/examples/verify_content.rs

use accrete::{reducers, AccreteResult, FieldSchema, Schema, StateSnapshot, Update};
use tracing::info;

// Marker a validation step prefixes to its authoritative page contents. Any
// unambiguous out-of-band signal works; the merge policy only sees the
// predicate.
const VALIDATED_MARKER: &str = "validated-content:";

fn is_validated_replacement(incoming: &[String]) -> bool {
  incoming.first().map_or(false, |first| first.starts_with(VALIDATED_MARKER))
}

fn main() -> AccreteResult<()> {
  tracing_subscriber::fmt().with_max_level(tracing::Level::INFO).init();

  info!("--- Verify-Content Example: cross-schema reuse + replace-on-signal ---");

  // A shared ingest schema owns the "report" field's semantics.
  let mut ingest = Schema::builder("ingest");
  ingest.field("report", FieldSchema::<String>::overwrite())?;
  let ingest_schema = ingest.build();

  // The verification schema reuses that field verbatim and adds its own
  // page-contents policy: append, unless a step announces an authoritative
  // replacement.
  let mut b = Schema::builder("verify_content");
  let report = b.reuse::<String>(&ingest_schema, "report")?;
  let page_contents = b.field("page_contents", reducers::replace_on_signal(is_validated_replacement))?;
  let relevant_links = b.field("relevant_links", reducers::union::<String>())?;
  let schema = b.build();

  let state = StateSnapshot::init(&schema);

  // Two verification steps contribute page contents and links.
  let state = state.apply(
    &Update::new()
      .set(&page_contents, vec!["general page A".to_string(), "general page B".to_string()])
      .set(&relevant_links, vec!["https://example.com/a".to_string()]),
  )?;
  info!(contents = ?state.get(&page_contents).unwrap(), "after general verification");

  // A later validation step decides everything known so far is stale and
  // replaces the contents wholesale.
  let state = state.apply(
    &Update::new()
      .set(
        &page_contents,
        vec![format!("{} the one true content", VALIDATED_MARKER)],
      )
      .set(&relevant_links, vec!["https://example.com/b".to_string()])
      .set(&report, "Verified one authoritative source.".to_string()),
  )?;

  info!(contents = ?state.get(&page_contents).unwrap(), "after validation");
  info!(links = ?state.get(&relevant_links).unwrap(), "links unioned across steps");

  assert_eq!(state.get(&page_contents).unwrap().len(), 1);
  assert_eq!(state.get(&relevant_links).unwrap().len(), 2);
  assert_eq!(state.get(&report).unwrap(), "Verified one authoritative source.");

  Ok(())
}
