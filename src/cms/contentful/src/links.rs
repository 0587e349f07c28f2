/* src/cms/contentful/src/links.rs */

//! Inline `includes` into a collection response.
//!
//! The Delivery API returns referenced entries and assets once, under `includes`, and leaves
//! `{"sys": {"type": "Link", ...}}` stubs in the fields. Resolution replaces each stub with the
//! included node, recursively, up to the requested depth. A link back to an ancestor stays a
//! stub so cyclic content cannot recurse forever.

use std::collections::HashMap;

use serde_json::Value;
use vitrine_server::Entry;

/// Included nodes by id, split by link type.
struct Includes<'a> {
  entries: HashMap<&'a str, &'a Value>,
  assets: HashMap<&'a str, &'a Value>,
}

fn node_id(node: &Value) -> Option<&str> {
  node.get("sys")?.get("id")?.as_str()
}

impl<'a> Includes<'a> {
  fn from_response(response: &'a Value) -> Self {
    let mut entries = HashMap::new();
    let mut assets = HashMap::new();
    let items = response.get("items").and_then(Value::as_array).into_iter().flatten();
    let included = |kind: &str| {
      response
        .get("includes")
        .and_then(|i| i.get(kind))
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
    };
    // Top-level items can reference each other too
    for node in items.chain(included("Entry")) {
      if let Some(id) = node_id(node) {
        entries.entry(id).or_insert(node);
      }
    }
    for node in included("Asset") {
      if let Some(id) = node_id(node) {
        assets.insert(id, node);
      }
    }
    Self { entries, assets }
  }

  fn target(&self, link: &Value) -> Option<&'a Value> {
    let sys = link.get("sys")?;
    let id = sys.get("id")?.as_str()?;
    match sys.get("linkType")?.as_str()? {
      "Entry" => self.entries.get(id).copied(),
      "Asset" => self.assets.get(id).copied(),
      _ => None,
    }
  }
}

fn is_link(value: &Value) -> bool {
  value.get("sys").and_then(|s| s.get("type")).and_then(Value::as_str) == Some("Link")
}

/// Resolve the `items` of a collection response into entry trees, `depth` link levels deep.
pub fn resolve_items(response: &Value, depth: u8) -> Vec<Entry> {
  let includes = Includes::from_response(response);
  let items = response.get("items").and_then(Value::as_array).into_iter().flatten();
  items
    .filter_map(|item| {
      let mut ancestors = Vec::new();
      let resolved = resolve_node(item, &includes, depth, &mut ancestors);
      let entry = Entry::from_value(&resolved);
      if entry.is_none() {
        tracing::warn!("skipping collection item without sys.id");
      }
      entry
    })
    .collect()
}

fn resolve_node<'a>(
  node: &'a Value,
  includes: &Includes<'a>,
  depth: u8,
  ancestors: &mut Vec<&'a str>,
) -> Value {
  let id = node_id(node);
  if let Some(id) = id {
    ancestors.push(id);
  }
  let mut out = node.clone();
  if let (Some(fields), Some(Value::Object(out_fields))) =
    (node.get("fields").and_then(Value::as_object), out.get_mut("fields"))
  {
    for (name, value) in fields {
      out_fields.insert(name.clone(), resolve_value(value, includes, depth, ancestors));
    }
  }
  if id.is_some() {
    ancestors.pop();
  }
  out
}

fn resolve_value<'a>(
  value: &'a Value,
  includes: &Includes<'a>,
  depth: u8,
  ancestors: &mut Vec<&'a str>,
) -> Value {
  match value {
    Value::Array(items) => {
      Value::Array(items.iter().map(|v| resolve_value(v, includes, depth, ancestors)).collect())
    }
    v if is_link(v) => {
      let Some(target) = includes.target(v) else {
        // Unpublished or beyond the included set
        return v.clone();
      };
      let target_id = node_id(target).unwrap_or_default();
      if depth == 0 || ancestors.contains(&target_id) {
        return v.clone();
      }
      resolve_node(target, includes, depth - 1, ancestors)
    }
    // Rich-text documents embed links under `data.target`; plain objects are kept verbatim
    other => other.clone(),
  }
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  fn link(id: &str, link_type: &str) -> Value {
    json!({ "sys": { "type": "Link", "linkType": link_type, "id": id } })
  }

  fn entry(id: &str, content_type: &str, fields: Value) -> Value {
    json!({
      "sys": { "id": id, "type": "Entry", "contentType": { "sys": { "id": content_type } } },
      "fields": fields
    })
  }

  fn response() -> Value {
    json!({
      "total": 1,
      "items": [entry("page", "landingPage", json!({
        "slug": "home",
        "frames": [link("frame", "Entry"), link("gone", "Entry")]
      }))],
      "includes": {
        "Entry": [
          entry("frame", "frame", json!({ "layout": "duplex", "things": [link("callout", "Entry")] })),
          entry("callout", "callout", json!({ "title": "Hi", "media": link("asset", "Asset"), "back": link("page", "Entry") }))
        ],
        "Asset": [{
          "sys": { "id": "asset", "type": "Asset" },
          "fields": { "title": "Beans", "file": { "url": "//images.test/beans.jpg", "contentType": "image/jpeg" } }
        }]
      }
    })
  }

  #[test]
  fn inlines_entries_and_assets() {
    let items = resolve_items(&response(), 6);
    assert_eq!(items.len(), 1);
    let page = &items[0];
    let frames = page.entries_field("frames");
    assert_eq!(frames[0].content_type(), Some("frame"));
    let callout = &frames[0].entries_field("things")[0];
    assert_eq!(callout.str_field("title"), Some("Hi"));
    let media = callout.asset_field("media").unwrap();
    assert_eq!(media.src().as_deref(), Some("https://images.test/beans.jpg"));
  }

  #[test]
  fn missing_targets_stay_links() {
    let items = resolve_items(&response(), 6);
    let frames = items[0].entries_field("frames");
    assert!(frames[1].is_link());
    assert_eq!(frames[1].content_type(), None);
  }

  #[test]
  fn cycles_stay_links() {
    let items = resolve_items(&response(), 6);
    let callout = &items[0].entries_field("frames")[0].entries_field("things")[0];
    assert!(callout.entry_field("back").unwrap().is_link());
  }

  #[test]
  fn depth_limits_resolution() {
    let items = resolve_items(&response(), 1);
    let frame = &items[0].entries_field("frames")[0];
    assert_eq!(frame.content_type(), Some("frame"));
    assert!(frame.entries_field("things")[0].is_link());

    let items = resolve_items(&response(), 0);
    assert!(items[0].entries_field("frames")[0].is_link());
  }

  #[test]
  fn empty_response() {
    assert!(resolve_items(&json!({ "items": [] }), 6).is_empty());
    assert!(resolve_items(&json!({}), 6).is_empty());
  }
}
