/* src/server/core/rust/src/blocks/resolver.rs */

use super::{Block, BlockKind, Display, FrameBlock, MissingComponent, Personalized, sections, things};
use crate::entry::Entry;
use crate::layout::{self, LayoutKind};
use crate::link::Links;
use crate::live::{PatchStore, find_entry, merge_tree};
use crate::personalize::{Personalizer, experiences_of};

/// A page root resolved into its frames (container model) and legacy sections, frames first.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedPage {
  pub entry_id: String,
  pub title: Option<String>,
  pub frames: Vec<Block>,
  pub sections: Vec<Block>,
}

impl ResolvedPage {
  /// All top-level blocks in render order.
  pub fn blocks(&self) -> impl Iterator<Item = &Block> {
    self.frames.iter().chain(self.sections.iter())
  }

  pub fn find(&self, entry_id: &str) -> Option<&Block> {
    self.blocks().find_map(|b| b.find(entry_id))
  }
}

/// Walks an entry tree and produces blocks. Holds no state between calls; one resolver can serve
/// any number of render passes for the same locale.
pub struct Resolver<'a> {
  patches: &'a PatchStore,
  personalizer: &'a dyn Personalizer,
  links: &'a Links,
}

impl<'a> Resolver<'a> {
  pub fn new(patches: &'a PatchStore, personalizer: &'a dyn Personalizer, links: &'a Links) -> Self {
    Self { patches, personalizer, links }
  }

  /// Merge pending patches over the snapshot once, then walk the merged tree.
  pub fn resolve(&self, root: &Entry) -> ResolvedPage {
    let root = merge_tree(root, self.patches);
    let walk = |name: &str| -> Vec<Block> {
      root.entries_field(name).iter().map(|e| self.block(e, Display::Default)).collect()
    };
    ResolvedPage {
      entry_id: root.id().to_string(),
      title: root.str_field("title").map(String::from),
      frames: walk("frames"),
      sections: walk("sections"),
    }
  }

  /// Re-resolve only the block affected by a change to `entry_id` somewhere below `root`:
  /// the entry's own block, or the nearest block containing it (buttons, headers, assets).
  /// `None` when the id is the root itself or not part of the tree.
  pub fn resolve_subtree(&self, root: &Entry, entry_id: &str) -> Option<Block> {
    let merged = merge_tree(root, self.patches);
    let (entry, display) = locate(&merged, entry_id)?;
    Some(self.block(&entry, display))
  }

  /// Resolve one entry, deferring to the personalizer when it carries valid experiences.
  pub fn block(&self, entry: &Entry, display: Display) -> Block {
    let experiences = experiences_of(entry);
    if experiences.is_empty() {
      return self.render(entry, display);
    }
    let render = |e: &Entry| self.render(e, display);
    let content = self.personalizer.personalize(entry, &experiences, &render);
    Block::Personalized(Personalized {
      entry_id: entry.id().to_string(),
      experience_ids: experiences.into_iter().map(|e| e.id).collect(),
      content: Box::new(content),
    })
  }

  fn render(&self, entry: &Entry, display: Display) -> Block {
    let Some(tag) = entry.content_type() else {
      tracing::debug!(entry = entry.id(), "unresolved reference, rendering nothing");
      return Block::Empty;
    };
    match BlockKind::from_tag(tag) {
      BlockKind::Frame => Block::Frame(self.frame(entry)),
      BlockKind::HeroBanner => Block::HeroBanner(sections::hero_banner(entry, self.links)),
      BlockKind::Cta => Block::Cta(sections::cta(entry, self.links)),
      BlockKind::Callout => Block::Callout(things::callout(entry, display, self.links)),
      BlockKind::ImageWrapper | BlockKind::PexelsImageWrapper => {
        Block::Image(things::image(entry, display))
      }
      BlockKind::BlogPost => Block::BlogPost(things::blog_post(entry, self.links)),
      BlockKind::Unknown(tag) => {
        tracing::warn!(entry = entry.id(), content_type = %tag, "no component for content type");
        Block::Missing(MissingComponent { entry_id: Some(entry.id().to_string()), content_type: tag })
      }
    }
  }

  fn frame(&self, entry: &Entry) -> FrameBlock {
    let composed = layout::compose_entry(entry);
    let header = entry.entry_field("frameHeader").map(|h| things::frame_header(&h));
    let children = entry.entries_field("things");
    let children = if composed.config.layout == LayoutKind::Hero {
      children.iter().take(1).map(|c| self.block(c, Display::Hero)).collect()
    } else {
      children.iter().map(|c| self.block(c, Display::Default)).collect()
    };
    FrameBlock { entry_id: entry.id().to_string(), composed, header, children }
  }
}

/// Find the block that renders `id`: the entry itself when it sits in a block position
/// (page frames/sections, frame things), otherwise the nearest block containing it.
fn locate(root: &Entry, id: &str) -> Option<(Entry, Display)> {
  ["frames", "sections"]
    .iter()
    .flat_map(|name| root.entries_field(name))
    .find_map(|child| locate_in(child, Display::Default, id))
}

fn locate_in(block: Entry, display: Display, id: &str) -> Option<(Entry, Display)> {
  if block.id() == id {
    return Some((block, display));
  }
  if block.content_type() == Some("frame") {
    let hero = LayoutKind::parse(block.str_field("layout")) == LayoutKind::Hero;
    // Hero frames render only their first child
    let (limit, display) = if hero { (1, Display::Hero) } else { (usize::MAX, Display::Default) };
    let found = block
      .entries_field("things")
      .into_iter()
      .take(limit)
      .find_map(|child| locate_in(child, display, id));
    if found.is_some() {
      return found;
    }
  }
  find_entry(&block, id).map(|_| (block, display))
}
