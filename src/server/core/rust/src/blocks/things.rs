/* src/server/core/rust/src/blocks/things.rs */

use serde_json::Value;

use super::{
  BlogPostCard, Button, Callout, Display, FrameHeader, ImageBlock, Media, Text, person_name,
};
use crate::entry::Entry;
use crate::link::Links;

pub(super) fn frame_header(entry: &Entry) -> FrameHeader {
  FrameHeader {
    entry_id: entry.id().to_string(),
    eyebrow: entry.str_field("eyebrow").map(String::from),
    title: Text::from_field(entry, "title"),
    subtitle: Text::from_field(entry, "subtitle").or_else(|| Text::from_field(entry, "description")),
  }
}

pub(super) fn callout(entry: &Entry, display: Display, links: &Links) -> Callout {
  Callout {
    entry_id: entry.id().to_string(),
    display,
    title: Text::from_field(entry, "title"),
    subtitle: Text::from_field(entry, "subtitle"),
    media: entry.asset_field("media").map(|a| Media::from_asset(&a)),
    button: entry.entry_field("button").and_then(|b| Button::from_entry(&b, links)),
  }
}

/// Image source precedence: CMS asset (`asset`, then `image`), Pexels payload, legacy `url`/`src`.
pub(super) fn image(entry: &Entry, display: Display) -> ImageBlock {
  let media = if let Some(asset) = entry.asset_field("asset").or_else(|| entry.asset_field("image")) {
    Media::from_asset(&asset)
  } else if let Some(url) = pexels_url(entry, display) {
    Media::Image { src: url, alt: pexels_alt(entry) }
  } else if let Some(url) = entry.str_field("url").or_else(|| entry.str_field("src")) {
    Media::from_url(url)
  } else {
    Media::Unavailable
  };
  ImageBlock { entry_id: entry.id().to_string(), display, media }
}

fn pexels_url(entry: &Entry, display: Display) -> Option<String> {
  let src = entry.field("pexelsImage")?.get("src")?;
  // Hero prefers wide renditions, inline prefers moderate sizes
  let order: &[&str] = match display {
    Display::Hero => &["landscape", "large2x", "large", "original"],
    Display::Default => &["medium", "large", "small", "original"],
  };
  order
    .iter()
    .find_map(|key| src.get(*key).and_then(Value::as_str).filter(|u| !u.is_empty()))
    .map(String::from)
}

fn pexels_alt(entry: &Entry) -> String {
  entry
    .field("pexelsImage")
    .and_then(|p| p.get("alt"))
    .and_then(Value::as_str)
    .unwrap_or_default()
    .to_string()
}

pub(super) fn blog_post(entry: &Entry, links: &Links) -> BlogPostCard {
  BlogPostCard {
    entry_id: entry.id().to_string(),
    title: entry.str_field("title").map(String::from),
    href: entry.str_field("slug").map(|s| links.blog_post(s)),
    summary: Text::from_field(entry, "summary"),
    published: entry.str_field("publishedDate").map(String::from),
    image: entry.asset_field("featuredImage").map(|a| Media::from_asset(&a)),
    author: entry.entry_field("author").as_ref().and_then(person_name),
  }
}
