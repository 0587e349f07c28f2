/* src/server/core/rust/src/config.rs */

//! Site configuration, built once at startup and handed down explicitly.
//! Nothing below reads the process environment; the CLI folds env overrides in before
//! constructing the value.

use serde::Deserialize;

use crate::errors::VitrineError;

pub const DEFAULT_INCLUDE_DEPTH: u8 = 6;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SiteConfig {
  #[serde(default)]
  pub site: SiteSection,
  #[serde(default)]
  pub server: ServerSection,
  #[serde(default)]
  pub i18n: I18nSection,
  #[serde(default)]
  pub contentful: Option<ContentfulSection>,
  #[serde(default)]
  pub fixtures: Option<FixturesSection>,
}

impl SiteConfig {
  pub fn validate(&self) -> Result<(), VitrineError> {
    self.i18n.validate()?;
    if let Some(ref ctf) = self.contentful {
      ctf.validate()?;
    }
    if self.site.include_depth > 10 {
      return Err(VitrineError::config(format!(
        "site.include_depth must be at most 10, got {}",
        self.site.include_depth
      )));
    }
    Ok(())
  }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SiteSection {
  #[serde(default = "default_site_name")]
  pub name: String,
  #[serde(default = "default_homepage_slug")]
  pub homepage_slug: String,
  #[serde(default = "default_blog_slug")]
  pub blog_slug: String,
  #[serde(default = "default_include_depth")]
  pub include_depth: u8,
  pub base_url: Option<String>,
}

impl Default for SiteSection {
  fn default() -> Self {
    Self {
      name: default_site_name(),
      homepage_slug: default_homepage_slug(),
      blog_slug: default_blog_slug(),
      include_depth: default_include_depth(),
      base_url: None,
    }
  }
}

fn default_site_name() -> String {
  "Vitrine".to_string()
}

fn default_homepage_slug() -> String {
  "home".to_string()
}

fn default_blog_slug() -> String {
  "blog".to_string()
}

fn default_include_depth() -> u8 {
  DEFAULT_INCLUDE_DEPTH
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSection {
  #[serde(default = "default_host")]
  pub host: String,
  #[serde(default = "default_port")]
  pub port: u16,
}

impl Default for ServerSection {
  fn default() -> Self {
    Self { host: default_host(), port: default_port() }
  }
}

impl ServerSection {
  pub fn addr(&self) -> String {
    format!("{}:{}", self.host, self.port)
  }
}

fn default_host() -> String {
  "0.0.0.0".to_string()
}

fn default_port() -> u16 {
  3000
}

/// Locale handling. A non-empty `locales` list (with optional `default`, else the first entry)
/// forms a static registry that takes precedence over the locales the content source lists.
/// Leave it empty to use the source's locales.
#[derive(Debug, Clone, Deserialize)]
pub struct I18nSection {
  #[serde(default)]
  pub locales: Vec<String>,
  pub default: Option<String>,
  #[serde(default = "default_registry_ttl")]
  pub registry_ttl_secs: u64,
  #[serde(default = "default_cookie")]
  pub cookie: String,
  #[serde(default = "default_bypass")]
  pub bypass: Vec<String>,
}

impl Default for I18nSection {
  fn default() -> Self {
    Self {
      locales: Vec::new(),
      default: None,
      registry_ttl_secs: default_registry_ttl(),
      cookie: default_cookie(),
      bypass: default_bypass(),
    }
  }
}

impl I18nSection {
  pub fn validate(&self) -> Result<(), VitrineError> {
    if let Some(ref default) = self.default {
      if self.locales.is_empty() {
        return Err(VitrineError::config("i18n.default is set but i18n.locales is empty"));
      }
      if !self.locales.contains(default) {
        return Err(VitrineError::config(format!(
          "i18n.default \"{default}\" is not in i18n.locales {:?}",
          self.locales
        )));
      }
    }
    for prefix in &self.bypass {
      if !prefix.starts_with('/') {
        return Err(VitrineError::config(format!(
          "i18n.bypass entry \"{prefix}\" must start with '/'"
        )));
      }
    }
    Ok(())
  }
}

fn default_registry_ttl() -> u64 {
  60
}

fn default_cookie() -> String {
  "vitrine-locale".to_string()
}

pub fn default_bypass() -> Vec<String> {
  ["/api", "/_vitrine", "/static", "/favicon.ico", "/setup", "/sitemap.xml"]
    .iter()
    .map(|s| (*s).to_string())
    .collect()
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContentfulSection {
  #[serde(default)]
  pub space_id: String,
  #[serde(default = "default_environment")]
  pub environment: String,
  #[serde(default)]
  pub delivery_token: String,
  pub preview_token: Option<String>,
  #[serde(default = "default_host_cdn")]
  pub host: String,
  #[serde(default = "default_host_preview")]
  pub preview_host: String,
  #[serde(default = "default_page_size")]
  pub page_size: u32,
}

impl Default for ContentfulSection {
  fn default() -> Self {
    Self {
      space_id: String::new(),
      environment: default_environment(),
      delivery_token: String::new(),
      preview_token: None,
      host: default_host_cdn(),
      preview_host: default_host_preview(),
      page_size: default_page_size(),
    }
  }
}

impl ContentfulSection {
  pub fn validate(&self) -> Result<(), VitrineError> {
    if self.space_id.is_empty() {
      return Err(VitrineError::config("contentful.space_id must not be empty"));
    }
    if self.delivery_token.is_empty() {
      return Err(VitrineError::config("contentful.delivery_token must not be empty"));
    }
    if self.page_size == 0 || self.page_size > 1000 {
      return Err(VitrineError::config("contentful.page_size must be within 1..=1000"));
    }
    Ok(())
  }
}

fn default_environment() -> String {
  "master".to_string()
}

fn default_host_cdn() -> String {
  "cdn.contentful.com".to_string()
}

fn default_host_preview() -> String {
  "preview.contentful.com".to_string()
}

fn default_page_size() -> u32 {
  100
}

#[derive(Debug, Clone, Deserialize)]
pub struct FixturesSection {
  pub path: String,
}
