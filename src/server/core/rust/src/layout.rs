/* src/server/core/rust/src/layout.rs */

//! Frame layout composition: slot assignment plus background/spacing style tokens.
//! Every input is an enumerated string with a stated default, so composition never fails.

use crate::blocks::BlockKind;
use crate::entry::{Asset, Entry};

macro_rules! frame_option {
  ($(#[$meta:meta])* $name:ident, default = $default:ident, { $($variant:ident => $tag:literal),+ $(,)? }) => {
    $(#[$meta])*
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub enum $name {
      $($variant),+
    }

    impl $name {
      /// Parse a CMS value; absent or unrecognized values yield the default.
      pub fn parse(raw: Option<&str>) -> Self {
        let raw = raw.map(|s| s.trim().to_ascii_lowercase());
        match raw.as_deref() {
          $(Some($tag) => Self::$variant,)+
          _ => Self::$default,
        }
      }

      pub fn as_str(self) -> &'static str {
        match self {
          $(Self::$variant => $tag),+
        }
      }
    }

    impl Default for $name {
      fn default() -> Self {
        Self::$default
      }
    }
  };
}

frame_option!(LayoutKind, default = Single, {
  Single => "single",
  Duplex => "duplex",
  Hero => "hero",
  Grid => "grid",
  Carousel => "carousel",
  List => "list",
});

frame_option!(Theme, default = Light, {
  Light => "light",
  Dark => "dark",
  Brand => "brand",
});

frame_option!(BackgroundColor, default = Neutral, {
  Primary => "primary",
  Secondary => "secondary",
  Accent => "accent",
  Neutral => "neutral",
  Transparent => "transparent",
});

frame_option!(Alignment, default = Left, {
  Left => "left",
  Center => "center",
  Right => "right",
});

frame_option!(Gap, default = Md, {
  Sm => "sm",
  Md => "md",
  Lg => "lg",
  Xl => "xl",
});

frame_option!(Padding, default = Md, {
  None => "none",
  Sm => "sm",
  Md => "md",
  Lg => "lg",
  Xl => "xl",
  Xxl => "xxl",
});

frame_option!(
  /// Background dim percentage.
  Dim, default = D30, {
  D10 => "10",
  D20 => "20",
  D30 => "30",
  D40 => "40",
  D50 => "50",
});

frame_option!(Tint, default = None, {
  None => "none",
  Black => "black",
  Primary => "primary",
  Secondary => "secondary",
  Accent => "accent",
});

/// Frame configuration read from a frame entry's fields.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FrameConfig {
  pub layout: LayoutKind,
  pub theme: Theme,
  pub background: BackgroundColor,
  pub alignment: Alignment,
  pub gap: Gap,
  pub padding: Padding,
  pub background_media: Option<Asset>,
  pub dim: Dim,
  pub tint: Tint,
}

impl FrameConfig {
  pub fn from_entry(frame: &Entry) -> Self {
    let raw_layout = frame.str_field("layout");
    let layout = LayoutKind::parse(raw_layout);
    if let Some(raw) = raw_layout {
      if layout.as_str() != raw.trim().to_ascii_lowercase() {
        tracing::warn!(frame = frame.id(), layout = raw, "unknown frame layout, using single");
      }
    }

    // dimBackground arrives as "30" or 30 depending on the content model version
    let dim = match frame.field("dimBackground") {
      Some(v) if v.is_number() => Dim::parse(Some(&v.to_string())),
      Some(v) => Dim::parse(v.as_str()),
      None => Dim::default(),
    };

    Self {
      layout,
      theme: Theme::parse(frame.str_field("theme")),
      background: BackgroundColor::parse(frame.str_field("backgroundColor")),
      alignment: Alignment::parse(frame.str_field("alignment")),
      gap: Gap::parse(frame.str_field("gap")),
      padding: Padding::parse(frame.str_field("padding")),
      background_media: frame.asset_field("backgroundMedia"),
      dim,
      tint: Tint::parse(frame.str_field("tintColor")),
    }
  }

  pub fn has_media(&self) -> bool {
    self.background_media.as_ref().is_some_and(|a| a.src().is_some())
  }
}

/// Solid background paired with its readable foreground.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Surface {
  pub background: &'static str,
  pub foreground: &'static str,
}

/// Where the resolved text color came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextSource {
  Surface,
  MediaOverride,
}

/// Tint-and-dim layer drawn over background media.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Overlay {
  pub color: &'static str,
  pub opacity: u8,
  pub multiply: bool,
}

impl Overlay {
  pub fn class(&self) -> String {
    let base = format!("bg-{}/{}", self.color, self.opacity);
    if self.multiply { format!("{base} mix-blend-multiply") } else { base }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleTokens {
  /// `None` when background media replaces the solid surface.
  pub surface: Option<Surface>,
  pub text: &'static str,
  pub text_source: TextSource,
  pub overlay: Option<Overlay>,
  pub alignment: &'static str,
  pub padding: &'static str,
  pub gap: &'static str,
  pub items: &'static str,
}

pub fn surface_for(theme: Theme, color: BackgroundColor) -> Surface {
  let (background, foreground) = match color {
    BackgroundColor::Primary => ("bg-primary", "text-primary-foreground"),
    BackgroundColor::Secondary => ("bg-secondary", "text-secondary-foreground"),
    BackgroundColor::Accent => ("bg-accent", "text-accent-foreground"),
    BackgroundColor::Neutral => ("bg-background", "text-foreground"),
    BackgroundColor::Transparent => (
      "bg-transparent",
      match theme {
        Theme::Dark => "text-white",
        Theme::Light => "text-black",
        Theme::Brand => "text-primary-foreground",
      },
    ),
  };
  Surface { background, foreground }
}

/// Text color over background media: the chosen background color still decides contrast.
pub fn text_on_media(theme: Theme, color: BackgroundColor) -> &'static str {
  match color {
    BackgroundColor::Primary => "text-primary-foreground",
    BackgroundColor::Secondary => "text-secondary-foreground",
    BackgroundColor::Accent => "text-accent-foreground",
    BackgroundColor::Neutral => "text-foreground",
    BackgroundColor::Transparent => match theme {
      Theme::Dark => "text-white",
      Theme::Light => "text-black",
      Theme::Brand => "text-foreground",
    },
  }
}

pub fn overlay_for(dim: Dim, tint: Tint) -> Overlay {
  let opacity = match dim {
    Dim::D10 => 10,
    Dim::D20 => 20,
    Dim::D30 => 30,
    Dim::D40 => 40,
    Dim::D50 => 50,
  };
  match tint {
    Tint::Primary => Overlay { color: "primary", opacity, multiply: true },
    Tint::Secondary => Overlay { color: "secondary", opacity, multiply: true },
    Tint::Accent => Overlay { color: "accent", opacity, multiply: true },
    Tint::Black | Tint::None => Overlay { color: "black", opacity, multiply: false },
  }
}

fn gap_token(gap: Gap) -> &'static str {
  match gap {
    Gap::Sm => "gap-4",
    Gap::Md => "gap-6",
    Gap::Lg => "gap-8",
    Gap::Xl => "gap-12",
  }
}

fn padding_token(padding: Padding) -> &'static str {
  match padding {
    Padding::None => "px-4 sm:px-6 md:px-8 py-0",
    Padding::Sm => "px-4 sm:px-6 md:px-8 py-8",
    Padding::Md => "px-4 sm:px-6 md:px-8 py-12",
    Padding::Lg => "px-4 sm:px-6 md:px-8 py-16",
    Padding::Xl => "px-4 sm:px-6 md:px-8 py-24",
    Padding::Xxl => "px-4 sm:px-6 md:px-8 py-32",
  }
}

fn items_token(layout: LayoutKind) -> &'static str {
  match layout {
    LayoutKind::Single | LayoutKind::Hero => "grid grid-cols-1",
    LayoutKind::Duplex => "grid grid-cols-1 md:grid-cols-2",
    LayoutKind::Grid => "grid grid-cols-1 sm:grid-cols-2 lg:grid-cols-3",
    LayoutKind::Carousel => "flex overflow-x-auto snap-x snap-mandatory",
    LayoutKind::List => "flex flex-col",
  }
}

fn alignment_token(alignment: Alignment) -> &'static str {
  match alignment {
    Alignment::Left => "text-left",
    Alignment::Center => "text-center",
    Alignment::Right => "text-right",
  }
}

pub fn style_tokens(config: &FrameConfig) -> StyleTokens {
  let (surface, text, text_source, overlay) = if config.has_media() {
    (
      None,
      text_on_media(config.theme, config.background),
      TextSource::MediaOverride,
      Some(overlay_for(config.dim, config.tint)),
    )
  } else {
    let surface = surface_for(config.theme, config.background);
    (Some(surface), surface.foreground, TextSource::Surface, None)
  };

  StyleTokens {
    surface,
    text,
    text_source,
    overlay,
    alignment: alignment_token(config.alignment),
    padding: padding_token(config.padding),
    gap: gap_token(config.gap),
    items: items_token(config.layout),
  }
}

/// What occupies a duplex column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
  Header,
  /// Index into the frame's children.
  Child(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Slots {
  Hero { header: bool, child: Option<usize>, full_bleed: bool, missing_background: bool },
  Duplex { left: Option<Slot>, right: Option<Slot> },
  Flow { header: bool, children: Vec<usize> },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ComposedFrame {
  pub config: FrameConfig,
  pub tokens: StyleTokens,
  pub slots: Slots,
}

/// Compose a frame given whether it has a header and the content types of its children.
pub fn compose(config: FrameConfig, has_header: bool, children: &[Option<&str>]) -> ComposedFrame {
  let slots = match config.layout {
    LayoutKind::Hero => {
      let full_bleed = config.has_media();
      Slots::Hero {
        header: has_header,
        child: if children.is_empty() { None } else { Some(0) },
        full_bleed,
        missing_background: !full_bleed,
      }
    }
    LayoutKind::Duplex => duplex_slots(has_header, config.alignment, children),
    LayoutKind::Single | LayoutKind::Grid | LayoutKind::Carousel | LayoutKind::List => {
      Slots::Flow { header: has_header, children: (0..children.len()).collect() }
    }
  };
  let tokens = style_tokens(&config);
  ComposedFrame { config, tokens, slots }
}

/// Compose straight from a frame entry (`frameHeader` + `things`).
pub fn compose_entry(frame: &Entry) -> ComposedFrame {
  let config = FrameConfig::from_entry(frame);
  let has_header = frame.field("frameHeader").is_some();
  let children = frame.entries_field("things");
  let types: Vec<Option<&str>> = children.iter().map(Entry::content_type).collect();
  let composed = compose(config, has_header, &types);
  if let Slots::Hero { missing_background: true, .. } = composed.slots {
    tracing::warn!(frame = frame.id(), "hero frame has no background media");
  }
  composed
}

fn duplex_slots(has_header: bool, alignment: Alignment, children: &[Option<&str>]) -> Slots {
  let child = |idx: usize| (idx < children.len()).then_some(Slot::Child(idx));
  let swap = alignment == Alignment::Right;

  if has_header {
    // Header placement is explicit; the image preference never overrides it
    let (left, right) = if swap { (child(0), Some(Slot::Header)) } else { (Some(Slot::Header), child(0)) };
    return Slots::Duplex { left, right };
  }

  let (mut left, mut right) = if swap { (child(1), child(0)) } else { (child(0), child(1)) };

  let is_image = |slot: Option<Slot>| match slot {
    Some(Slot::Child(idx)) => BlockKind::from_tag(children[idx].unwrap_or_default()).is_image(),
    _ => false,
  };
  // Exactly one image: it goes right. Zero or two images keep the alignment placement.
  if is_image(left) && !is_image(right) {
    std::mem::swap(&mut left, &mut right);
  }
  Slots::Duplex { left, right }
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  fn config(layout: LayoutKind, alignment: Alignment) -> FrameConfig {
    FrameConfig { layout, alignment, ..FrameConfig::default() }
  }

  fn media() -> Asset {
    Asset { url: Some("//images.example/bg.jpg".into()), ..Asset::default() }
  }

  fn duplex(has_header: bool, alignment: Alignment, children: &[&str]) -> Slots {
    let types: Vec<Option<&str>> = children.iter().map(|c| Some(*c)).collect();
    compose(config(LayoutKind::Duplex, alignment), has_header, &types).slots
  }

  fn lr(left: Option<Slot>, right: Option<Slot>) -> Slots {
    Slots::Duplex { left, right }
  }

  const C0: Option<Slot> = Some(Slot::Child(0));
  const C1: Option<Slot> = Some(Slot::Child(1));
  const H: Option<Slot> = Some(Slot::Header);

  #[test]
  fn unknown_values_fall_back_to_defaults() {
    assert_eq!(LayoutKind::parse(Some("masonry")), LayoutKind::Single);
    assert_eq!(LayoutKind::parse(None), LayoutKind::Single);
    assert_eq!(Gap::parse(Some("huge")), Gap::Md);
    assert_eq!(Padding::parse(None), Padding::Md);
    assert_eq!(BackgroundColor::parse(None), BackgroundColor::Neutral);
    assert_eq!(Theme::parse(Some("DARK")), Theme::Dark);
    assert_eq!(Dim::parse(Some("35")), Dim::D30);
  }

  #[test]
  fn config_from_entry() {
    let frame = Entry::new("f", "frame")
      .with_field("layout", "grid")
      .with_field("theme", "dark")
      .with_field("backgroundColor", "accent")
      .with_field("gap", "xl")
      .with_field("dimBackground", 50)
      .with_field("tintColor", "primary");
    let cfg = FrameConfig::from_entry(&frame);
    assert_eq!(cfg.layout, LayoutKind::Grid);
    assert_eq!(cfg.theme, Theme::Dark);
    assert_eq!(cfg.background, BackgroundColor::Accent);
    assert_eq!(cfg.gap, Gap::Xl);
    assert_eq!(cfg.padding, Padding::Md);
    assert_eq!(cfg.dim, Dim::D50);
    assert_eq!(cfg.tint, Tint::Primary);
    assert!(!cfg.has_media());
  }

  #[test]
  fn duplex_without_header_prefers_image_right() {
    assert_eq!(duplex(false, Alignment::Left, &["callout", "imageWrapper"]), lr(C0, C1));
    assert_eq!(duplex(false, Alignment::Left, &["imageWrapper", "callout"]), lr(C1, C0));
  }

  #[test]
  fn duplex_right_alignment_swaps_then_image_wins() {
    // callout + image, right-aligned: swap puts image left, heuristic moves it back right
    assert_eq!(duplex(false, Alignment::Right, &["callout", "imageWrapper"]), lr(C0, C1));
    // two non-images: plain swap
    assert_eq!(duplex(false, Alignment::Right, &["callout", "blogPost"]), lr(C1, C0));
  }

  #[test]
  fn duplex_two_images_keep_alignment_placement() {
    assert_eq!(duplex(false, Alignment::Left, &["imageWrapper", "pexelsImageWrapper"]), lr(C0, C1));
    assert_eq!(
      duplex(false, Alignment::Right, &["imageWrapper", "pexelsImageWrapper"]),
      lr(C1, C0)
    );
  }

  #[test]
  fn duplex_header_placement_wins() {
    assert_eq!(duplex(true, Alignment::Left, &["imageWrapper"]), lr(H, C0));
    assert_eq!(duplex(true, Alignment::Right, &["imageWrapper", "callout"]), lr(C0, H));
    assert_eq!(duplex(true, Alignment::Center, &["callout"]), lr(H, C0));
  }

  #[test]
  fn duplex_with_missing_children() {
    assert_eq!(duplex(false, Alignment::Left, &[]), lr(None, None));
    assert_eq!(duplex(false, Alignment::Left, &["imageWrapper"]), lr(None, C0));
    assert_eq!(duplex(true, Alignment::Left, &[]), lr(H, None));
  }

  #[test]
  fn hero_takes_first_child_only() {
    let mut cfg = config(LayoutKind::Hero, Alignment::Left);
    cfg.background_media = Some(media());
    let composed = compose(cfg, true, &[Some("callout"), Some("imageWrapper")]);
    assert_eq!(
      composed.slots,
      Slots::Hero { header: true, child: Some(0), full_bleed: true, missing_background: false }
    );
  }

  #[test]
  fn hero_without_media_flags_warning() {
    let frame = Entry::new("h", "frame").with_field("layout", "hero");
    let composed = compose_entry(&frame);
    assert_eq!(
      composed.slots,
      Slots::Hero { header: false, child: None, full_bleed: false, missing_background: true }
    );
  }

  #[test]
  fn flow_layouts_keep_document_order() {
    for layout in [LayoutKind::Single, LayoutKind::Grid, LayoutKind::List, LayoutKind::Carousel] {
      let composed = compose(config(layout, Alignment::Left), false, &[Some("a"), None, Some("b")]);
      assert_eq!(composed.slots, Slots::Flow { header: false, children: vec![0, 1, 2] });
    }
  }

  #[test]
  fn compose_entry_reads_header_and_things() {
    let frame = Entry::new("f", "frame")
      .with_field("layout", "duplex")
      .with_field("frameHeader", Entry::new("hdr", "frameHeader").with_field("title", "Hi").to_value())
      .with_field("things", json!([Entry::new("i", "imageWrapper").to_value()]));
    assert_eq!(compose_entry(&frame).slots, lr(H, C0));
  }

  #[test]
  fn transparent_dark_with_media_uses_override() {
    let mut cfg = FrameConfig {
      theme: Theme::Dark,
      background: BackgroundColor::Transparent,
      ..FrameConfig::default()
    };
    let plain = style_tokens(&cfg);
    assert_eq!(plain.text_source, TextSource::Surface);
    assert_eq!(plain.surface.map(|s| s.background), Some("bg-transparent"));

    cfg.background_media = Some(media());
    let tokens = style_tokens(&cfg);
    assert_eq!(tokens.text_source, TextSource::MediaOverride);
    assert!(tokens.surface.is_none());
    assert_eq!(tokens.text, "text-white");
  }

  #[test]
  fn brand_theme_differs_between_surface_and_media() {
    let mut cfg = FrameConfig {
      theme: Theme::Brand,
      background: BackgroundColor::Transparent,
      ..FrameConfig::default()
    };
    assert_eq!(style_tokens(&cfg).text, "text-primary-foreground");
    cfg.background_media = Some(media());
    assert_eq!(style_tokens(&cfg).text, "text-foreground");
  }

  #[test]
  fn background_pairs() {
    assert_eq!(
      surface_for(Theme::Light, BackgroundColor::Primary),
      Surface { background: "bg-primary", foreground: "text-primary-foreground" }
    );
    assert_eq!(surface_for(Theme::Dark, BackgroundColor::Neutral).background, "bg-background");
    assert_eq!(surface_for(Theme::Light, BackgroundColor::Transparent).foreground, "text-black");
  }

  #[test]
  fn overlay_defaults_to_thirty_percent_black() {
    let cfg = FrameConfig { background_media: Some(media()), ..FrameConfig::default() };
    let overlay = style_tokens(&cfg).overlay.unwrap();
    assert_eq!(overlay.class(), "bg-black/30");
  }

  #[test]
  fn brand_tint_multiplies() {
    assert_eq!(overlay_for(Dim::D20, Tint::Accent).class(), "bg-accent/20 mix-blend-multiply");
    assert_eq!(overlay_for(Dim::D50, Tint::Black).class(), "bg-black/50");
  }

  #[test]
  fn spacing_tokens() {
    let cfg = FrameConfig { gap: Gap::Sm, padding: Padding::Xxl, ..FrameConfig::default() };
    let tokens = style_tokens(&cfg);
    assert_eq!(tokens.gap, "gap-4");
    assert!(tokens.padding.ends_with("py-32"));
    assert_eq!(tokens.alignment, "text-left");
    assert_eq!(tokens.items, "grid grid-cols-1");
  }
}
