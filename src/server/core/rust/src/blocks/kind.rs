/* src/server/core/rust/src/blocks/kind.rs */

/// Closed set of content types the resolver knows how to render.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BlockKind {
  Frame,
  HeroBanner,
  Cta,
  Callout,
  ImageWrapper,
  PexelsImageWrapper,
  BlogPost,
  Unknown(String),
}

impl BlockKind {
  pub fn from_tag(tag: &str) -> Self {
    match tag {
      "frame" => Self::Frame,
      "heroBanner" => Self::HeroBanner,
      "cta" => Self::Cta,
      "callout" => Self::Callout,
      "imageWrapper" => Self::ImageWrapper,
      "pexelsImageWrapper" => Self::PexelsImageWrapper,
      "blogPost" => Self::BlogPost,
      other => Self::Unknown(other.to_string()),
    }
  }

  pub fn tag(&self) -> &str {
    match self {
      Self::Frame => "frame",
      Self::HeroBanner => "heroBanner",
      Self::Cta => "cta",
      Self::Callout => "callout",
      Self::ImageWrapper => "imageWrapper",
      Self::PexelsImageWrapper => "pexelsImageWrapper",
      Self::BlogPost => "blogPost",
      Self::Unknown(tag) => tag,
    }
  }

  /// Image-type blocks are preferred in the right column of a duplex frame.
  pub fn is_image(&self) -> bool {
    matches!(self, Self::ImageWrapper | Self::PexelsImageWrapper)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn known_tags_round_trip() {
    for tag in ["frame", "heroBanner", "cta", "callout", "imageWrapper", "pexelsImageWrapper", "blogPost"]
    {
      let kind = BlockKind::from_tag(tag);
      assert!(!matches!(kind, BlockKind::Unknown(_)), "{tag}");
      assert_eq!(kind.tag(), tag);
    }
  }

  #[test]
  fn unknown_tag_keeps_its_name() {
    assert_eq!(BlockKind::from_tag("unknownType"), BlockKind::Unknown("unknownType".into()));
    assert_eq!(BlockKind::from_tag("unknownType").tag(), "unknownType");
  }

  #[test]
  fn image_classification() {
    assert!(BlockKind::from_tag("imageWrapper").is_image());
    assert!(BlockKind::from_tag("pexelsImageWrapper").is_image());
    assert!(!BlockKind::from_tag("callout").is_image());
    assert!(!BlockKind::from_tag("").is_image());
  }
}
