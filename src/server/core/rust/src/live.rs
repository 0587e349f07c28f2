/* src/server/core/rust/src/live.rs */

//! Live-preview patches. A patch carries fresh field values for one entry id; the store
//! keeps the latest patch per id and `merge_tree` overlays them on a fetched snapshot.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::entry::Entry;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryPatch {
  pub entry_id: String,
  #[serde(default)]
  pub fields: Map<String, Value>,
}

impl EntryPatch {
  pub fn new(entry_id: impl Into<String>) -> Self {
    Self { entry_id: entry_id.into(), fields: Map::new() }
  }

  pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
    self.fields.insert(name.into(), value.into());
    self
  }
}

pub const DEFAULT_MAX_PATCHES: usize = 1024;

/// Latest patch per entry id. Later patches replace earlier ones for the same id;
/// patches for different ids are independent.
///
/// Every applied patch gets an arrival number. A fetch that started after a patch arrived
/// already reflects it, so [`PatchStore::evict_superseded`] drops those patches for the fetched
/// tree. The store holds at most `max` entry ids; the oldest arrival is evicted first.
#[derive(Debug, Clone)]
pub struct PatchStore {
  patches: HashMap<String, (u64, EntryPatch)>,
  arrivals: u64,
  max: usize,
}

impl Default for PatchStore {
  fn default() -> Self {
    Self::bounded(DEFAULT_MAX_PATCHES)
  }
}

impl PatchStore {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn bounded(max: usize) -> Self {
    Self { patches: HashMap::new(), arrivals: 0, max: max.max(1) }
  }

  /// Record `patch`, returning the one it superseded.
  pub fn apply(&mut self, patch: EntryPatch) -> Option<EntryPatch> {
    self.arrivals += 1;
    if !self.patches.contains_key(&patch.entry_id) && self.patches.len() >= self.max {
      self.evict_oldest();
    }
    self
      .patches
      .insert(patch.entry_id.clone(), (self.arrivals, patch))
      .map(|(_, previous)| previous)
  }

  pub fn get(&self, entry_id: &str) -> Option<&EntryPatch> {
    self.patches.get(entry_id).map(|(_, patch)| patch)
  }

  pub fn remove(&mut self, entry_id: &str) -> Option<EntryPatch> {
    self.patches.remove(entry_id).map(|(_, patch)| patch)
  }

  /// Arrival number of the latest patch; take it before fetching a tree.
  pub fn mark(&self) -> u64 {
    self.arrivals
  }

  /// Drop patches that arrived at or before `mark` for entries present in `fresh`.
  /// Returns how many were dropped.
  pub fn evict_superseded(&mut self, fresh: &Entry, mark: u64) -> usize {
    let stale: Vec<String> = self
      .patches
      .iter()
      .filter(|(id, (arrival, _))| *arrival <= mark && find_entry(fresh, id).is_some())
      .map(|(id, _)| id.clone())
      .collect();
    for id in &stale {
      self.remove(id);
    }
    stale.len()
  }

  fn evict_oldest(&mut self) {
    let oldest =
      self.patches.iter().min_by_key(|(_, (arrival, _))| *arrival).map(|(id, _)| id.clone());
    if let Some(id) = oldest {
      tracing::debug!(entry = %id, "patch store full, evicting oldest patch");
      self.remove(&id);
    }
  }

  pub fn len(&self) -> usize {
    self.patches.len()
  }

  pub fn is_empty(&self) -> bool {
    self.patches.is_empty()
  }

  pub fn clear(&mut self) {
    self.patches.clear();
  }
}

/// Overlay the patch for this entry's id onto its own fields (one level only).
/// Patch values win when present; `null` in a patch means "not streamed yet" and keeps the
/// snapshot value.
pub fn merge_entry(snapshot: &Entry, patches: &PatchStore) -> Entry {
  let mut merged = snapshot.clone();
  if let Some(patch) = patches.get(snapshot.id()) {
    overlay(&mut merged.fields, &patch.fields);
  }
  merged
}

/// Overlay patches at every level of the tree: root, nested references, arrays of references.
pub fn merge_tree(snapshot: &Entry, patches: &PatchStore) -> Entry {
  if patches.is_empty() {
    return snapshot.clone();
  }
  let mut merged = merge_entry(snapshot, patches);
  for value in merged.fields.values_mut() {
    merge_value(value, patches);
  }
  merged
}

fn merge_value(value: &mut Value, patches: &PatchStore) {
  match value {
    Value::Array(items) => {
      for item in items {
        merge_value(item, patches);
      }
    }
    Value::Object(obj) if is_entry_node(obj) => {
      let id = obj.get("sys").and_then(|s| s.get("id")).and_then(Value::as_str).map(String::from);
      if let (Some(id), Some(Value::Object(fields))) = (id, obj.get_mut("fields")) {
        if let Some(patch) = patches.get(&id) {
          overlay(fields, &patch.fields);
        }
        for nested in fields.values_mut() {
          merge_value(nested, patches);
        }
      }
    }
    _ => {}
  }
}

fn is_entry_node(obj: &Map<String, Value>) -> bool {
  obj
    .get("sys")
    .and_then(|s| s.get("type"))
    .and_then(Value::as_str)
    .is_some_and(|t| t == "Entry")
}

fn overlay(fields: &mut Map<String, Value>, patch: &Map<String, Value>) {
  for (name, value) in patch {
    if !value.is_null() {
      fields.insert(name.clone(), value.clone());
    }
  }
}

/// Depth-first search for the entry with `id` anywhere under `root` (root included).
pub fn find_entry(root: &Entry, id: &str) -> Option<Entry> {
  if root.id() == id {
    return Some(root.clone());
  }
  root.fields.values().find_map(|v| find_in_value(v, id))
}

fn find_in_value(value: &Value, id: &str) -> Option<Entry> {
  match value {
    Value::Array(items) => items.iter().find_map(|v| find_in_value(v, id)),
    Value::Object(obj) if is_entry_node(obj) => {
      let entry = Entry::from_value(value)?;
      if entry.id() == id {
        return Some(entry);
      }
      entry.fields.values().find_map(|v| find_in_value(v, id))
    }
    _ => None,
  }
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  fn page() -> Entry {
    let callout = Entry::new("c1", "callout").with_field("title", "Old callout");
    let frame = Entry::new("f1", "frame")
      .with_field("layout", "single")
      .with_field("things", json!([callout.to_value()]));
    Entry::new("p1", "landingPage")
      .with_field("title", "A")
      .with_field("frames", json!([frame.to_value()]))
  }

  #[test]
  fn patch_wins_over_snapshot() {
    let mut store = PatchStore::new();
    store.apply(EntryPatch::new("p1").with_field("title", "B"));
    let merged = merge_tree(&page(), &store);
    assert_eq!(merged.str_field("title"), Some("B"));
  }

  #[test]
  fn patch_for_other_id_leaves_entry_alone() {
    let mut store = PatchStore::new();
    store.apply(EntryPatch::new("p2").with_field("title", "B"));
    let merged = merge_tree(&page(), &store);
    assert_eq!(merged.str_field("title"), Some("A"));
  }

  #[test]
  fn missing_and_null_patch_fields_fall_back() {
    let mut store = PatchStore::new();
    store.apply(EntryPatch::new("p1").with_field("title", Value::Null).with_field("slug", "new"));
    let merged = merge_tree(&page(), &store);
    assert_eq!(merged.str_field("title"), Some("A"));
    assert_eq!(merged.str_field("slug"), Some("new"));
    assert!(merged.field("frames").is_some());
  }

  #[test]
  fn merge_reaches_nested_levels() {
    let mut store = PatchStore::new();
    store.apply(EntryPatch::new("f1").with_field("layout", "duplex"));
    store.apply(EntryPatch::new("c1").with_field("title", "New callout"));
    let merged = merge_tree(&page(), &store);

    let frame = &merged.entries_field("frames")[0];
    assert_eq!(frame.str_field("layout"), Some("duplex"));
    let callout = &frame.entries_field("things")[0];
    assert_eq!(callout.str_field("title"), Some("New callout"));
  }

  #[test]
  fn last_patch_wins_per_id() {
    let mut store = PatchStore::new();
    assert!(store.apply(EntryPatch::new("p1").with_field("title", "B")).is_none());
    let previous = store.apply(EntryPatch::new("p1").with_field("title", "C"));
    assert_eq!(previous.unwrap().fields["title"], json!("B"));
    assert_eq!(store.len(), 1);
    assert_eq!(merge_tree(&page(), &store).str_field("title"), Some("C"));
  }

  #[test]
  fn snapshot_is_not_mutated() {
    let snapshot = page();
    let mut store = PatchStore::new();
    store.apply(EntryPatch::new("p1").with_field("title", "B"));
    let _ = merge_tree(&snapshot, &store);
    assert_eq!(snapshot.str_field("title"), Some("A"));
  }

  #[test]
  fn merge_entry_is_shallow() {
    let mut store = PatchStore::new();
    store.apply(EntryPatch::new("c1").with_field("title", "New"));
    let merged = merge_entry(&page(), &store);
    let callout = &merged.entries_field("frames")[0].entries_field("things")[0];
    assert_eq!(callout.str_field("title"), Some("Old callout"));
  }

  #[test]
  fn find_entry_locates_nested_subtree() {
    let found = find_entry(&page(), "c1").unwrap();
    assert_eq!(found.content_type(), Some("callout"));
    assert!(find_entry(&page(), "p1").is_some());
    assert!(find_entry(&page(), "nope").is_none());
  }

  #[test]
  fn fresh_fetch_supersedes_earlier_patches() {
    let mut store = PatchStore::new();
    store.apply(EntryPatch::new("c1").with_field("title", "Draft"));
    store.apply(EntryPatch::new("elsewhere").with_field("title", "Other page"));
    let mark = store.mark();
    // Arrives while the fetch is in flight
    store.apply(EntryPatch::new("f1").with_field("layout", "grid"));

    assert_eq!(store.evict_superseded(&page(), mark), 1);
    assert!(store.get("c1").is_none());
    assert!(store.get("elsewhere").is_some());
    assert!(store.get("f1").is_some());

    let merged = merge_tree(&page(), &store);
    let callout = &merged.entries_field("frames")[0].entries_field("things")[0];
    assert_eq!(callout.str_field("title"), Some("Old callout"));
  }

  #[test]
  fn bounded_store_evicts_oldest_arrival() {
    let mut store = PatchStore::bounded(2);
    store.apply(EntryPatch::new("a").with_field("v", 1));
    store.apply(EntryPatch::new("b").with_field("v", 1));
    // Re-patching an existing id does not count against the bound
    store.apply(EntryPatch::new("a").with_field("v", 2));
    store.apply(EntryPatch::new("c").with_field("v", 1));
    assert_eq!(store.len(), 2);
    assert!(store.get("b").is_none());
    assert_eq!(store.get("a").unwrap().fields["v"], json!(2));
    assert!(store.get("c").is_some());
  }

  #[test]
  fn patch_deserializes_from_wire() {
    let patch: EntryPatch =
      serde_json::from_value(json!({"entryId": "p1", "fields": {"title": "B"}})).unwrap();
    assert_eq!(patch.entry_id, "p1");
    assert_eq!(patch.fields["title"], json!("B"));
  }
}
