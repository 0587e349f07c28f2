/* src/server/core/rust/src/entry.rs */

//! CMS entry model. Entries keep their fields as raw JSON so nested references stay
//! lossless; typed access goes through the accessor helpers.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
  pub sys: Sys,
  #[serde(default)]
  pub fields: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sys {
  pub id: String,
  #[serde(rename = "type", default = "default_sys_type")]
  pub kind: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub content_type: Option<ContentTypeLink>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub locale: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub link_type: Option<String>,
}

fn default_sys_type() -> String {
  "Entry".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentTypeLink {
  pub sys: LinkSys,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkSys {
  pub id: String,
}

impl Entry {
  pub fn new(id: impl Into<String>, content_type: impl Into<String>) -> Self {
    Self {
      sys: Sys {
        id: id.into(),
        kind: default_sys_type(),
        content_type: Some(ContentTypeLink { sys: LinkSys { id: content_type.into() } }),
        locale: None,
        link_type: None,
      },
      fields: Map::new(),
    }
  }

  pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
    self.fields.insert(name.into(), value.into());
    self
  }

  pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
    self.sys.locale = Some(locale.into());
    self
  }

  /// Parse a JSON node into an entry. Returns `None` for anything without `sys.id`.
  pub fn from_value(value: &Value) -> Option<Self> {
    value.get("sys")?.get("id")?.as_str()?;
    serde_json::from_value(value.clone()).ok()
  }

  pub fn to_value(&self) -> Value {
    serde_json::to_value(self).unwrap_or(Value::Null)
  }

  pub fn id(&self) -> &str {
    &self.sys.id
  }

  pub fn content_type(&self) -> Option<&str> {
    self.sys.content_type.as_ref().map(|ct| ct.sys.id.as_str())
  }

  /// An unresolved reference (include depth exhausted or target unpublished).
  pub fn is_link(&self) -> bool {
    self.sys.kind == "Link"
  }

  /// Field value, treating explicit `null` as absent.
  pub fn field(&self, name: &str) -> Option<&Value> {
    self.fields.get(name).filter(|v| !v.is_null())
  }

  /// Non-empty string field.
  pub fn str_field(&self, name: &str) -> Option<&str> {
    self.field(name)?.as_str().filter(|s| !s.trim().is_empty())
  }

  pub fn bool_field(&self, name: &str) -> Option<bool> {
    self.field(name)?.as_bool()
  }

  pub fn entry_field(&self, name: &str) -> Option<Entry> {
    Entry::from_value(self.field(name)?)
  }

  /// Array-of-references field; malformed items are skipped.
  pub fn entries_field(&self, name: &str) -> Vec<Entry> {
    self
      .field(name)
      .and_then(Value::as_array)
      .map(|items| items.iter().filter_map(Entry::from_value).collect())
      .unwrap_or_default()
  }

  pub fn asset_field(&self, name: &str) -> Option<Asset> {
    Asset::from_value(self.field(name)?)
  }

  pub fn assets_field(&self, name: &str) -> Vec<Asset> {
    self
      .field(name)
      .and_then(Value::as_array)
      .map(|items| items.iter().filter_map(Asset::from_value).collect())
      .unwrap_or_default()
  }
}

/// A media asset reference, flattened from the CMS asset shape.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Asset {
  pub id: Option<String>,
  pub title: Option<String>,
  pub description: Option<String>,
  pub url: Option<String>,
  pub mime_type: Option<String>,
  pub width: Option<u64>,
  pub height: Option<u64>,
}

impl Asset {
  /// Accepts a CMS asset object or a bare URL string.
  pub fn from_value(value: &Value) -> Option<Self> {
    if let Some(url) = value.as_str() {
      return Some(Self { url: Some(url.to_string()), ..Self::default() });
    }
    let obj = value.as_object()?;
    let id = obj.get("sys").and_then(|s| s.get("id")).and_then(Value::as_str).map(String::from);
    let fields = obj.get("fields");
    let file = fields.and_then(|f| f.get("file"));
    let image = file.and_then(|f| f.get("details")).and_then(|d| d.get("image"));
    let text = |v: Option<&Value>| v.and_then(Value::as_str).map(String::from);

    let asset = Self {
      id,
      title: text(fields.and_then(|f| f.get("title"))),
      description: text(fields.and_then(|f| f.get("description"))),
      url: text(file.and_then(|f| f.get("url"))),
      mime_type: text(file.and_then(|f| f.get("contentType"))),
      width: image.and_then(|i| i.get("width")).and_then(Value::as_u64),
      height: image.and_then(|i| i.get("height")).and_then(Value::as_u64),
    };
    if asset.id.is_none() && asset.url.is_none() {
      return None;
    }
    Some(asset)
  }

  /// Absolute URL; protocol-relative CDN URLs are upgraded to https.
  pub fn src(&self) -> Option<String> {
    let url = self.url.as_deref().filter(|u| !u.is_empty())?;
    Some(absolute_url(url))
  }

  pub fn is_video(&self) -> bool {
    self.mime_type.as_deref().is_some_and(|m| m.starts_with("video/"))
  }
}

pub fn absolute_url(url: &str) -> String {
  if url.starts_with("//") { format!("https:{url}") } else { url.to_string() }
}
