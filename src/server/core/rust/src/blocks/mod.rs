/* src/server/core/rust/src/blocks/mod.rs */

//! Resolved block tree: what a page renders, independent of markup.

mod kind;
mod resolver;
mod sections;
mod things;


use serde_json::Value;

use crate::entry::{Asset, Entry, absolute_url};
use crate::layout::ComposedFrame;
use crate::link::Links;

pub use kind::BlockKind;
pub use resolver::{ResolvedPage, Resolver};

/// Display mode passed down by the parent container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Display {
  #[default]
  Default,
  /// First child of a hero frame.
  Hero,
}

/// Text that may be authored as a plain string or as a rich-text document.
#[derive(Debug, Clone, PartialEq)]
pub enum Text {
  Plain(String),
  Rich(Value),
}

impl Text {
  pub fn from_value(value: &Value) -> Option<Self> {
    match value {
      Value::String(s) if !s.trim().is_empty() => Some(Self::Plain(s.clone())),
      Value::Object(obj) if obj.get("nodeType").and_then(Value::as_str) == Some("document") => {
        let text = Self::Rich(value.clone());
        // An empty document renders nothing; treat it as absent
        (!text.plain().trim().is_empty()).then_some(text)
      }
      _ => None,
    }
  }

  pub fn from_field(entry: &Entry, name: &str) -> Option<Self> {
    Self::from_value(entry.field(name)?)
  }

  /// Flattened text content, used for alt text and summaries.
  pub fn plain(&self) -> String {
    match self {
      Self::Plain(s) => s.clone(),
      Self::Rich(doc) => {
        let mut out = String::new();
        collect_text(doc, &mut out);
        out
      }
    }
  }
}

fn collect_text(node: &Value, out: &mut String) {
  if let Some(value) = node.get("value").and_then(Value::as_str) {
    out.push_str(value);
  }
  if let Some(content) = node.get("content").and_then(Value::as_array) {
    for child in content {
      collect_text(child, out);
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Media {
  Image { src: String, alt: String },
  Video { src: String, mime: String },
  /// Referenced but without a usable URL (unresolved or unpublished asset).
  Unavailable,
}

impl Media {
  pub fn from_asset(asset: &Asset) -> Self {
    let Some(src) = asset.src() else {
      return Self::Unavailable;
    };
    if asset.is_video() {
      let mime = asset.mime_type.clone().unwrap_or_default();
      return Self::Video { src, mime };
    }
    Self::Image { src, alt: asset.title.clone().unwrap_or_default() }
  }

  pub fn from_url(url: &str) -> Self {
    if url.trim().is_empty() {
      return Self::Unavailable;
    }
    Self::Image { src: absolute_url(url), alt: String::new() }
  }
}

/// "First Last" from a person entry; `None` without a first name.
pub fn person_name(person: &Entry) -> Option<String> {
  let first = person.str_field("firstName")?;
  Some(match person.str_field("lastName") {
    Some(last) => format!("{first} {last}"),
    None => first.to_string(),
  })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
  pub label: String,
  pub href: Option<String>,
  pub new_tab: bool,
  pub color: Option<String>,
  pub size: Option<String>,
  pub variant: Option<String>,
}

impl Button {
  /// A button without a label is malformed and dropped.
  pub fn from_entry(entry: &Entry, links: &Links) -> Option<Self> {
    let Some(label) = entry.str_field("label") else {
      tracing::warn!(entry = entry.id(), "button without label, skipping");
      return None;
    };
    Some(Self {
      label: label.to_string(),
      href: entry.entry_field("target").and_then(|t| links.href(&t)),
      new_tab: entry.bool_field("openInNewTab").unwrap_or(false),
      color: entry.str_field("color").map(String::from),
      size: entry.str_field("size").map(String::from),
      variant: entry.str_field("variant").map(String::from),
    })
  }

  pub fn list(entry: &Entry, field: &str, links: &Links) -> Vec<Self> {
    entry.entries_field(field).iter().filter_map(|b| Self::from_entry(b, links)).collect()
  }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FrameHeader {
  pub entry_id: String,
  pub eyebrow: Option<String>,
  pub title: Option<Text>,
  pub subtitle: Option<Text>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FrameBlock {
  pub entry_id: String,
  pub composed: ComposedFrame,
  pub header: Option<FrameHeader>,
  /// Resolved children, aligned with the indices used by `composed.slots`.
  pub children: Vec<Block>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Callout {
  pub entry_id: String,
  pub display: Display,
  pub title: Option<Text>,
  pub subtitle: Option<Text>,
  pub media: Option<Media>,
  pub button: Option<Button>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImageBlock {
  pub entry_id: String,
  pub display: Display,
  pub media: Media,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BlogPostCard {
  pub entry_id: String,
  pub title: Option<String>,
  pub href: Option<String>,
  pub summary: Option<Text>,
  pub published: Option<String>,
  pub image: Option<Media>,
  pub author: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HeroBanner {
  pub entry_id: String,
  pub headline: Option<String>,
  pub body: Option<String>,
  pub image: Option<Media>,
  pub variant: String,
  pub buttons: Vec<Button>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Cta {
  pub entry_id: String,
  pub title: Option<String>,
  pub body: Option<String>,
  pub images: Vec<Media>,
  pub buttons: Vec<Button>,
  pub background: String,
  pub variant: String,
}

/// Visible placeholder for a content type without a renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingComponent {
  pub entry_id: Option<String>,
  pub content_type: String,
}

/// Output chosen by the personalizer, tagged with the experiences it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Personalized {
  pub entry_id: String,
  pub experience_ids: Vec<String>,
  pub content: Box<Block>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Block {
  Frame(FrameBlock),
  HeroBanner(HeroBanner),
  Cta(Cta),
  Callout(Callout),
  Image(ImageBlock),
  BlogPost(BlogPostCard),
  Personalized(Personalized),
  Missing(MissingComponent),
  /// Renders nothing (unresolved reference).
  Empty,
}

impl Block {
  pub fn entry_id(&self) -> Option<&str> {
    match self {
      Self::Frame(b) => Some(&b.entry_id),
      Self::HeroBanner(b) => Some(&b.entry_id),
      Self::Cta(b) => Some(&b.entry_id),
      Self::Callout(b) => Some(&b.entry_id),
      Self::Image(b) => Some(&b.entry_id),
      Self::BlogPost(b) => Some(&b.entry_id),
      Self::Personalized(b) => Some(&b.entry_id),
      Self::Missing(b) => b.entry_id.as_deref(),
      Self::Empty => None,
    }
  }

  pub fn is_empty(&self) -> bool {
    matches!(self, Self::Empty)
  }

  /// Depth-first search for the block rendered for `entry_id`.
  pub fn find(&self, entry_id: &str) -> Option<&Block> {
    if self.entry_id() == Some(entry_id) {
      return Some(self);
    }
    match self {
      Self::Frame(frame) => frame.children.iter().find_map(|c| c.find(entry_id)),
      Self::Personalized(p) => p.content.find(entry_id),
      _ => None,
    }
  }
}
