/* src/cms/contentful/src/client.rs */

use reqwest::Url;
use serde::Deserialize;
use serde_json::Value;
use vitrine_server::config::ContentfulSection;
use vitrine_server::{BoxFuture, ContentSource, Entry, EntryQuery, LocaleRegistry, VitrineError};

use crate::links::resolve_items;

/// Content source backed by the Contentful Content Delivery and Content Preview APIs.
#[derive(Debug, Clone)]
pub struct ContentfulSource {
  http: reqwest::Client,
  config: ContentfulSection,
}

#[derive(Deserialize)]
struct LocaleItem {
  code: String,
  #[serde(default)]
  default: bool,
}

#[derive(Deserialize)]
struct Collection<T> {
  #[serde(default)]
  total: u64,
  #[serde(default = "Vec::new")]
  items: Vec<T>,
}

impl ContentfulSource {
  pub fn new(config: ContentfulSection) -> Result<Self, VitrineError> {
    config.validate()?;
    let http = reqwest::Client::builder()
      .user_agent(concat!("vitrine/", env!("CARGO_PKG_VERSION")))
      .build()
      .map_err(|e| VitrineError::config(format!("failed to build HTTP client: {e}")))?;
    Ok(Self { http, config })
  }

  fn credentials(&self, preview: bool) -> Result<(&str, &str), VitrineError> {
    if !preview {
      return Ok((&self.config.host, &self.config.delivery_token));
    }
    match self.config.preview_token.as_deref().filter(|t| !t.is_empty()) {
      Some(token) => Ok((&self.config.preview_host, token)),
      None => Err(VitrineError::config("preview requested but contentful.preview_token is not set")),
    }
  }

  fn url(&self, host: &str, resource: &str, params: &[(&str, String)]) -> Result<Url, VitrineError> {
    let base = format!(
      "https://{host}/spaces/{}/environments/{}/{resource}",
      self.config.space_id, self.config.environment
    );
    Url::parse_with_params(&base, params)
      .map_err(|e| VitrineError::config(format!("invalid Contentful URL {base}: {e}")))
  }

  async fn get(&self, url: Url, token: &str) -> Result<Value, VitrineError> {
    tracing::debug!(url = %url, "contentful request");
    let resp = self
      .http
      .get(url)
      .bearer_auth(token)
      .send()
      .await
      .map_err(|e| VitrineError::upstream(format!("Contentful request failed: {e}")))?;

    let status = resp.status();
    if !status.is_success() {
      let body = resp.text().await.unwrap_or_default();
      return Err(VitrineError::upstream(format!("Contentful returned {status}: {}", error_message(&body))));
    }
    resp
      .json()
      .await
      .map_err(|e| VitrineError::upstream(format!("failed to parse Contentful response: {e}")))
  }

  async fn entries(&self, query: EntryQuery) -> Result<Vec<Entry>, VitrineError> {
    let (host, token) = self.credentials(query.preview)?;
    let url = self.url(host, "entries", &entry_params(&query))?;
    let response = self.get(url, token).await?;
    Ok(resolve_items(&response, query.include))
  }

  async fn slugs(&self, content_type: String, include: u8) -> Result<Vec<String>, VitrineError> {
    let (host, token) = self.credentials(false)?;
    let limit = u64::from(self.config.page_size);
    let mut slugs = Vec::new();
    let mut skip = 0u64;
    loop {
      let params = slug_params(&content_type, include, skip, limit);
      let page: Collection<Value> =
        serde_json::from_value(self.get(self.url(host, "entries", &params)?, token).await?)
          .map_err(|e| VitrineError::upstream(format!("unexpected Contentful collection: {e}")))?;
      let count = page.items.len() as u64;
      slugs.extend(page.items.iter().filter_map(slug_of));
      skip += limit;
      if count == 0 || skip >= page.total {
        break;
      }
    }
    Ok(slugs)
  }

  async fn locales(&self) -> Result<LocaleRegistry, VitrineError> {
    let (host, token) = self.credentials(false)?;
    let body = self.get(self.url(host, "locales", &[])?, token).await?;
    let listing: Collection<LocaleItem> = serde_json::from_value(body)
      .map_err(|e| VitrineError::upstream(format!("unexpected Contentful locales: {e}")))?;
    LocaleRegistry::from_flagged(listing.items.into_iter().map(|l| (l.code, l.default)))
      .map_err(|e| VitrineError::registry_unavailable(e.message()))
  }
}

impl ContentSource for ContentfulSource {
  fn fetch_entries(&self, query: EntryQuery) -> BoxFuture<Result<Vec<Entry>, VitrineError>> {
    let this = self.clone();
    Box::pin(async move { this.entries(query).await })
  }

  fn fetch_all_slugs(
    &self,
    content_type: String,
    include: u8,
  ) -> BoxFuture<Result<Vec<String>, VitrineError>> {
    let this = self.clone();
    Box::pin(async move { this.slugs(content_type, include).await })
  }

  fn fetch_locales(&self) -> BoxFuture<Result<LocaleRegistry, VitrineError>> {
    let this = self.clone();
    Box::pin(async move { this.locales().await })
  }
}

fn entry_params(query: &EntryQuery) -> Vec<(&'static str, String)> {
  let mut params = vec![
    ("content_type", query.content_type.clone()),
    ("include", query.include.min(10).to_string()),
  ];
  if let Some(ref slug) = query.slug {
    params.push(("fields.slug", slug.clone()));
  }
  if let Some(ref locale) = query.locale {
    params.push(("locale", locale.clone()));
  }
  params
}

fn slug_params(content_type: &str, include: u8, skip: u64, limit: u64) -> Vec<(&'static str, String)> {
  vec![
    ("content_type", content_type.to_string()),
    ("include", include.min(10).to_string()),
    ("select", "fields.slug".to_string()),
    ("skip", skip.to_string()),
    ("limit", limit.to_string()),
  ]
}

fn slug_of(item: &Value) -> Option<String> {
  item.get("fields")?.get("slug")?.as_str().map(String::from)
}

/// The `message` of a Contentful error body, or the raw body.
fn error_message(body: &str) -> String {
  serde_json::from_str::<Value>(body)
    .ok()
    .and_then(|v| v.get("message").and_then(Value::as_str).map(String::from))
    .unwrap_or_else(|| body.chars().take(200).collect())
}
