// accrete/src/merge/reducers.rs

//! The named merge-strategy families. Each constructor returns a ready
//! `FieldSchema` so callers declare a field's whole policy in one
//! expression; `.with_default(..)` can still override or add a default.

use crate::schema::field::FieldSchema;
use std::collections::HashSet;
use std::hash::Hash;

/// Append: previous (defaulting to the empty sequence) followed by incoming,
/// in order, never deduplicating. An explicit clear unsets the field.
pub fn append<T: Clone + Send + Sync + 'static>() -> FieldSchema<Vec<T>> {
  FieldSchema::with_merge(|previous: Option<Vec<T>>, incoming: Option<Vec<T>>| {
    let incoming = incoming?;
    let mut next = previous.unwrap_or_default();
    next.extend(incoming);
    Some(next)
  })
  .with_default(Vec::new)
}

/// Set union preserving first-seen order: previous elements keep their
/// order, new elements from incoming are appended in their given order,
/// duplicates are dropped. An explicit clear unsets the field.
pub fn union<T: Clone + Eq + Hash + Send + Sync + 'static>() -> FieldSchema<Vec<T>> {
  FieldSchema::with_merge(|previous: Option<Vec<T>>, incoming: Option<Vec<T>>| {
    let incoming = incoming?;
    let mut seen = HashSet::new();
    let mut next = Vec::new();
    for item in previous.unwrap_or_default().into_iter().chain(incoming) {
      if seen.insert(item.clone()) {
        next.push(item);
      }
    }
    Some(next)
  })
  .with_default(Vec::new)
}

/// Append, unless the incoming sequence matches `is_replacement_signal`, in
/// which case it replaces the accumulated value wholesale. This lets a step
/// say "everything you knew is stale, here is the authoritative
/// replacement".
///
/// The predicate is an explicit policy parameter; the merge itself knows
/// nothing about any particular marker text.
pub fn replace_on_signal<T, P>(is_replacement_signal: P) -> FieldSchema<Vec<T>>
where
  T: Clone + Send + Sync + 'static,
  P: Fn(&[T]) -> bool + Send + Sync + 'static,
{
  FieldSchema::with_merge(move |previous: Option<Vec<T>>, incoming: Option<Vec<T>>| {
    let incoming = incoming?;
    if is_replacement_signal(&incoming) {
      return Some(incoming);
    }
    let mut next = previous.unwrap_or_default();
    next.extend(incoming);
    Some(next)
  })
  .with_default(Vec::new)
}

/// Replace ignoring previous: the incoming entry is the next value verbatim,
/// the accumulated value is never consulted. Used for fields a later step
/// fully recomputes, such as an enumerated options list.
pub fn replace<T: Clone + Send + Sync + 'static>() -> FieldSchema<T> {
  FieldSchema::with_merge(|_previous, incoming| incoming)
}

/// Replace with a zero-value default: a counter a step fully recomputes on
/// every write, starting from `T::default()`. Bounds a retry/condense loop;
/// checking the counter against a threshold stays with the orchestrator.
pub fn counter<T: Clone + Default + Send + Sync + 'static>() -> FieldSchema<T> {
  replace::<T>().with_default(T::default)
}
