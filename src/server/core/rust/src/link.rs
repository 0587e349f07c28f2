/* src/server/core/rust/src/link.rs */

//! Link targets: where a button or card points, given the entry it references.

use crate::config::SiteSection;
use crate::entry::Entry;
use crate::locale::LocaleRegistry;

/// Builds in-site URLs for one render pass (one locale).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Links {
  /// `/{locale}` for non-default locales, empty for the default one.
  prefix: String,
  homepage_slug: String,
  blog_slug: String,
}

impl Default for Links {
  fn default() -> Self {
    Self { prefix: String::new(), homepage_slug: "home".into(), blog_slug: "blog".into() }
  }
}

impl Links {
  pub fn new(site: &SiteSection) -> Self {
    Self {
      prefix: String::new(),
      homepage_slug: site.homepage_slug.clone(),
      blog_slug: site.blog_slug.clone(),
    }
  }

  /// Prefix generated paths with `locale` unless it is the registry default.
  pub fn for_locale(mut self, locale: &str, registry: &LocaleRegistry) -> Self {
    self.prefix = if registry.is_default(locale) { String::new() } else { format!("/{locale}") };
    self
  }

  pub fn blog_slug(&self) -> &str {
    &self.blog_slug
  }

  pub fn landing_page(&self, slug: &str) -> String {
    let slug = slug.trim_matches('/');
    if slug.is_empty() || slug == "home" || slug == "homepage" || slug == self.homepage_slug {
      return if self.prefix.is_empty() { "/".to_string() } else { self.prefix.clone() };
    }
    format!("{}/{slug}", self.prefix)
  }

  pub fn blog_index(&self) -> String {
    format!("{}/{}", self.prefix, self.blog_slug)
  }

  pub fn blog_post(&self, slug: &str) -> String {
    format!("{}/{}/{}", self.prefix, self.blog_slug, slug.trim_matches('/'))
  }

  /// URL for a referenced entry; `None` when the target type is not linkable or lacks a slug/url.
  pub fn href(&self, target: &Entry) -> Option<String> {
    match target.content_type()? {
      "landingPage" => target.str_field("slug").map(|s| self.landing_page(s)),
      "blogPost" => target.str_field("slug").map(|s| self.blog_post(s)),
      "externalLink" | "externalUrl" => target.str_field("url").map(String::from),
      other => {
        tracing::debug!(entry = target.id(), content_type = other, "link target is not linkable");
        None
      }
    }
  }
}
