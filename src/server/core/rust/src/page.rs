/* src/server/core/rust/src/page.rs */

use crate::blocks::{Media, Text, person_name};
use crate::config::SiteSection;
use crate::entry::Entry;
use crate::errors::VitrineError;
use crate::link::Links;
use crate::source::{ContentSource, EntryQuery, fetch_entries_or_empty};

pub const LANDING_PAGE: &str = "landingPage";
pub const BLOG_POST: &str = "blogPost";

/// Which page a locale-relative path addresses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageKind {
  Home,
  Landing(String),
  BlogIndex,
  BlogPost(String),
}

impl PageKind {
  /// Map the path below the locale segment (`""`, `/about`, `/blog/hello`) to a page.
  /// Deeper paths address nothing.
  pub fn from_path(rest: &str, site: &SiteSection) -> Option<Self> {
    let segments: Vec<&str> = rest.split('/').filter(|s| !s.is_empty()).collect();
    match segments.as_slice() {
      [] => Some(Self::Home),
      [slug] if *slug == site.blog_slug => Some(Self::BlogIndex),
      [slug] => Some(Self::Landing((*slug).to_string())),
      [blog, slug] if *blog == site.blog_slug => Some(Self::BlogPost((*slug).to_string())),
      _ => None,
    }
  }

  pub fn content_type(&self) -> &'static str {
    match self {
      Self::BlogPost(_) => BLOG_POST,
      Self::Home | Self::Landing(_) | Self::BlogIndex => LANDING_PAGE,
    }
  }

  pub fn slug<'a>(&'a self, site: &'a SiteSection) -> &'a str {
    match self {
      Self::Home => &site.homepage_slug,
      Self::BlogIndex => &site.blog_slug,
      Self::Landing(slug) | Self::BlogPost(slug) => slug,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
  pub kind: PageKind,
  pub locale: String,
  /// Selects the preview (draft) API.
  pub preview: bool,
}

/// Fetch the root entry for a page. An empty result, including a swallowed upstream failure,
/// is not-found.
pub async fn load_page(
  source: &dyn ContentSource,
  site: &SiteSection,
  request: &PageRequest,
) -> Result<Entry, VitrineError> {
  let slug = request.kind.slug(site);
  let query = EntryQuery::new(request.kind.content_type())
    .slug(slug)
    .locale(request.locale.as_str())
    .include(site.include_depth)
    .preview(request.preview);
  let entries = fetch_entries_or_empty(source, query).await;
  entries.into_iter().next().ok_or_else(|| {
    VitrineError::not_found(format!(
      "no {} with slug \"{slug}\" for locale {}",
      request.kind.content_type(),
      request.locale
    ))
  })
}

/// Full blog post view (the card form lives in the block tree).
#[derive(Debug, Clone, PartialEq)]
pub struct Article {
  pub entry_id: String,
  pub title: Option<String>,
  pub published: Option<String>,
  pub summary: Option<Text>,
  pub body: Option<Text>,
  pub image: Option<Media>,
  pub author: Option<String>,
  pub back_href: String,
}

impl Article {
  pub fn from_entry(entry: &Entry, links: &Links) -> Self {
    Self {
      entry_id: entry.id().to_string(),
      title: entry.str_field("title").map(String::from),
      published: entry.str_field("publishedDate").map(String::from),
      summary: Text::from_field(entry, "summary"),
      body: Text::from_field(entry, "body"),
      image: entry.asset_field("featuredImage").map(|a| Media::from_asset(&a)),
      author: entry.entry_field("author").as_ref().and_then(person_name),
      back_href: links.blog_index(),
    }
  }
}
