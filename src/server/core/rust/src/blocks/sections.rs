/* src/server/core/rust/src/blocks/sections.rs */

// Legacy page sections, rendered after frames.

use super::{Button, Cta, HeroBanner, Media};
use crate::entry::Entry;
use crate::link::Links;

pub(super) fn hero_banner(entry: &Entry, links: &Links) -> HeroBanner {
  HeroBanner {
    entry_id: entry.id().to_string(),
    headline: entry.str_field("headline").map(String::from),
    body: entry.str_field("body").map(String::from),
    image: entry.asset_field("heroImage").map(|a| Media::from_asset(&a)),
    variant: entry.str_field("variant").unwrap_or("Primary").to_string(),
    buttons: Button::list(entry, "actionButtons", links),
  }
}

pub(super) fn cta(entry: &Entry, links: &Links) -> Cta {
  Cta {
    entry_id: entry.id().to_string(),
    title: entry.str_field("title").map(String::from),
    body: entry.str_field("body").map(String::from),
    images: entry.assets_field("images").iter().map(Media::from_asset).collect(),
    buttons: Button::list(entry, "actionButtons", links),
    background: entry.str_field("backgroundColor").unwrap_or("Default").to_string(),
    variant: entry.str_field("variant").unwrap_or("Simple").to_string(),
  }
}
