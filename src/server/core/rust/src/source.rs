/* src/server/core/rust/src/source.rs */

//! The CMS boundary. Implementations report failures as errors; page loading swallows them
//! via [`fetch_entries_or_empty`] so an upstream outage surfaces as not-found, never a crash.

use std::future::Future;
use std::path::Path;
use std::pin::Pin;
use std::sync::Arc;

use futures_core::Stream;
use serde::Deserialize;
use serde_json::Value;

use crate::entry::Entry;
use crate::errors::VitrineError;
use crate::live::EntryPatch;
use crate::locale::LocaleRegistry;

pub type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send>>;

pub type BoxStream<T> = Pin<Box<dyn Stream<Item = T> + Send>>;

/// Live-update subscription: `(entry id, partial fields)` events in arrival order.
pub type PatchStream = BoxStream<EntryPatch>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryQuery {
  pub content_type: String,
  pub slug: Option<String>,
  pub locale: Option<String>,
  pub include: u8,
  pub preview: bool,
}

impl EntryQuery {
  pub fn new(content_type: impl Into<String>) -> Self {
    Self {
      content_type: content_type.into(),
      slug: None,
      locale: None,
      include: crate::config::DEFAULT_INCLUDE_DEPTH,
      preview: false,
    }
  }

  pub fn slug(mut self, slug: impl Into<String>) -> Self {
    self.slug = Some(slug.into());
    self
  }

  pub fn locale(mut self, locale: impl Into<String>) -> Self {
    self.locale = Some(locale.into());
    self
  }

  pub fn include(mut self, depth: u8) -> Self {
    self.include = depth;
    self
  }

  pub fn preview(mut self, preview: bool) -> Self {
    self.preview = preview;
    self
  }
}

pub trait ContentSource: Send + Sync {
  /// Entries matching `query`, in CMS order, with references resolved to `query.include` levels.
  fn fetch_entries(&self, query: EntryQuery) -> BoxFuture<Result<Vec<Entry>, VitrineError>>;

  /// Every slug of `content_type`; implementations paginate internally.
  fn fetch_all_slugs(
    &self,
    content_type: String,
    include: u8,
  ) -> BoxFuture<Result<Vec<String>, VitrineError>>;

  fn fetch_locales(&self) -> BoxFuture<Result<LocaleRegistry, VitrineError>>;
}

/// Fetch boundary: errors are logged and collapse to an empty result.
pub async fn fetch_entries_or_empty(source: &dyn ContentSource, query: EntryQuery) -> Vec<Entry> {
  let content_type = query.content_type.clone();
  match source.fetch_entries(query).await {
    Ok(entries) => entries,
    Err(e) => {
      tracing::error!(content_type = %content_type, error = %e, "fetching entries failed");
      Vec::new()
    }
  }
}

/// In-memory content source, backing offline fixture serving and tests.
#[derive(Debug, Clone)]
pub struct MemorySource {
  entries: Arc<Vec<Entry>>,
  registry: Option<LocaleRegistry>,
}

#[derive(Deserialize)]
struct FixtureFile {
  #[serde(default)]
  locales: Vec<FixtureLocale>,
  #[serde(default)]
  entries: Vec<Value>,
}

#[derive(Deserialize)]
struct FixtureLocale {
  code: String,
  #[serde(default)]
  default: bool,
}

impl MemorySource {
  pub fn new(entries: Vec<Entry>) -> Self {
    Self { entries: Arc::new(entries), registry: None }
  }

  pub fn with_registry(mut self, registry: LocaleRegistry) -> Self {
    self.registry = Some(registry);
    self
  }

  /// Parse a fixture document: `{ "locales": [{ "code", "default" }], "entries": [...] }`
  /// or a bare array of entries.
  pub fn from_json(json: &str) -> Result<Self, VitrineError> {
    let value: Value = serde_json::from_str(json)
      .map_err(|e| VitrineError::config(format!("invalid fixtures JSON: {e}")))?;
    let file = if value.is_array() {
      FixtureFile { locales: Vec::new(), entries: value.as_array().cloned().unwrap_or_default() }
    } else {
      serde_json::from_value::<FixtureFile>(value)
        .map_err(|e| VitrineError::config(format!("invalid fixtures file: {e}")))?
    };

    let mut entries = Vec::with_capacity(file.entries.len());
    for raw in &file.entries {
      match Entry::from_value(raw) {
        Some(entry) => entries.push(entry),
        None => tracing::warn!("skipping fixture item without sys.id"),
      }
    }

    let registry = if file.locales.is_empty() {
      None
    } else {
      Some(LocaleRegistry::from_flagged(file.locales.into_iter().map(|l| (l.code, l.default)))?)
    };
    Ok(Self { entries: Arc::new(entries), registry })
  }

  pub fn load(path: &Path) -> Result<Self, VitrineError> {
    let content = std::fs::read_to_string(path)
      .map_err(|e| VitrineError::config(format!("failed to read {}: {e}", path.display())))?;
    Self::from_json(&content)
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }
}

fn matches(entry: &Entry, query: &EntryQuery) -> bool {
  if entry.content_type() != Some(query.content_type.as_str()) {
    return false;
  }
  if let Some(ref slug) = query.slug {
    if entry.str_field("slug") != Some(slug.as_str()) {
      return false;
    }
  }
  // Entries without a locale are shared across locales
  match (&query.locale, &entry.sys.locale) {
    (Some(wanted), Some(actual)) => wanted == actual,
    _ => true,
  }
}

impl ContentSource for MemorySource {
  fn fetch_entries(&self, query: EntryQuery) -> BoxFuture<Result<Vec<Entry>, VitrineError>> {
    let entries = self.entries.clone();
    Box::pin(async move { Ok(entries.iter().filter(|e| matches(e, &query)).cloned().collect()) })
  }

  fn fetch_all_slugs(
    &self,
    content_type: String,
    _include: u8,
  ) -> BoxFuture<Result<Vec<String>, VitrineError>> {
    let entries = self.entries.clone();
    Box::pin(async move {
      let mut slugs: Vec<String> = Vec::new();
      for entry in entries.iter().filter(|e| e.content_type() == Some(content_type.as_str())) {
        if let Some(slug) = entry.str_field("slug") {
          if !slugs.iter().any(|s| s == slug) {
            slugs.push(slug.to_string());
          }
        }
      }
      Ok(slugs)
    })
  }

  fn fetch_locales(&self) -> BoxFuture<Result<LocaleRegistry, VitrineError>> {
    let registry = self.registry.clone();
    Box::pin(async move {
      registry.ok_or_else(|| VitrineError::registry_unavailable("fixtures define no locales"))
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  const FIXTURES: &str = r#"{
    "locales": [{ "code": "en-US", "default": true }, { "code": "de" }],
    "entries": [
      { "sys": { "id": "home-en", "locale": "en-US", "contentType": { "sys": { "id": "landingPage" } } },
        "fields": { "slug": "home", "title": "Home" } },
      { "sys": { "id": "home-de", "locale": "de", "contentType": { "sys": { "id": "landingPage" } } },
        "fields": { "slug": "home", "title": "Startseite" } },
      { "sys": { "id": "about", "contentType": { "sys": { "id": "landingPage" } } },
        "fields": { "slug": "about" } },
      { "sys": { "id": "post", "contentType": { "sys": { "id": "blogPost" } } },
        "fields": { "slug": "hello" } },
      { "fields": { "slug": "orphan" } }
    ]
  }"#;

  struct Failing;

  impl ContentSource for Failing {
    fn fetch_entries(&self, _query: EntryQuery) -> BoxFuture<Result<Vec<Entry>, VitrineError>> {
      Box::pin(async { Err(VitrineError::upstream("boom")) })
    }

    fn fetch_all_slugs(&self, _: String, _: u8) -> BoxFuture<Result<Vec<String>, VitrineError>> {
      Box::pin(async { Err(VitrineError::upstream("boom")) })
    }

    fn fetch_locales(&self) -> BoxFuture<Result<LocaleRegistry, VitrineError>> {
      Box::pin(async { Err(VitrineError::upstream("boom")) })
    }
  }

  #[tokio::test]
  async fn filters_by_type_slug_and_locale() {
    let source = MemorySource::from_json(FIXTURES).unwrap();
    assert_eq!(source.len(), 4);

    let de = source
      .fetch_entries(EntryQuery::new("landingPage").slug("home").locale("de"))
      .await
      .unwrap();
    assert_eq!(de.len(), 1);
    assert_eq!(de[0].str_field("title"), Some("Startseite"));

    let shared = source
      .fetch_entries(EntryQuery::new("landingPage").slug("about").locale("de"))
      .await
      .unwrap();
    assert_eq!(shared.len(), 1);
  }

  #[tokio::test]
  async fn slugs_are_distinct_and_ordered() {
    let source = MemorySource::from_json(FIXTURES).unwrap();
    let slugs = source.fetch_all_slugs("landingPage".into(), 1).await.unwrap();
    assert_eq!(slugs, vec!["home".to_string(), "about".to_string()]);
  }

  #[tokio::test]
  async fn locales_from_fixtures() {
    let source = MemorySource::from_json(FIXTURES).unwrap();
    let registry = source.fetch_locales().await.unwrap();
    assert_eq!(registry.default_locale(), "en-US");
    assert!(registry.contains("de"));
  }

  #[tokio::test]
  async fn bare_array_has_no_registry() {
    let source = MemorySource::from_json("[]").unwrap();
    assert!(source.is_empty());
    let err = source.fetch_locales().await.unwrap_err();
    assert_eq!(err.code(), "REGISTRY_UNAVAILABLE");
  }

  #[tokio::test]
  async fn fetch_failure_collapses_to_empty() {
    let entries = fetch_entries_or_empty(&Failing, EntryQuery::new("landingPage")).await;
    assert!(entries.is_empty());
  }

  #[test]
  fn invalid_json_is_a_config_error() {
    let err = MemorySource::from_json("{nope").unwrap_err();
    assert_eq!(err.code(), "CONFIG_ERROR");
  }
}
