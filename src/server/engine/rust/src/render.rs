/* src/server/engine/rust/src/render.rs */

//! Block markup. Every renderer is a pure function of its block; class names come from the
//! composed style tokens.

use vitrine_server::blocks::{
  Block, BlogPostCard, Button, Callout, Cta, Display, FrameBlock, FrameHeader, HeroBanner,
  ImageBlock, Media, MissingComponent, Personalized,
};
use vitrine_server::layout::{Slot, Slots};

use crate::escape::escape_html;
use crate::richtext::render_text;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderOptions {
  /// Show authoring badges (hero without background media, ...). On for preview requests.
  pub dev_badges: bool,
}

pub fn render_blocks<'a>(blocks: impl IntoIterator<Item = &'a Block>, opts: RenderOptions) -> String {
  blocks.into_iter().map(|b| render_block(b, opts)).collect()
}

pub fn render_block(block: &Block, opts: RenderOptions) -> String {
  match block {
    Block::Frame(frame) => render_frame(frame, opts),
    Block::HeroBanner(banner) => render_hero_banner(banner),
    Block::Cta(cta) => render_cta(cta),
    Block::Callout(callout) => render_callout(callout),
    Block::Image(image) => render_image(image),
    Block::BlogPost(card) => render_blog_card(card),
    Block::Personalized(p) => render_personalized(p, opts),
    Block::Missing(missing) => render_missing(missing),
    Block::Empty => String::new(),
  }
}

pub fn render_missing(missing: &MissingComponent) -> String {
  format!(
    "<div class=\"p-10 text-lg text-red-500\"{}><p>&#9888;&#65039; <strong>Missing component</strong> for content type: <strong>{}</strong>.</p></div>",
    entry_attr(missing.entry_id.as_deref()),
    escape_html(&missing.content_type)
  )
}

fn entry_attr(entry_id: Option<&str>) -> String {
  entry_id.map(|id| format!(" data-entry-id=\"{}\"", escape_html(id))).unwrap_or_default()
}

fn render_personalized(p: &Personalized, opts: RenderOptions) -> String {
  format!(
    "<div data-entry-id=\"{}\" data-experiences=\"{}\">{}</div>",
    escape_html(&p.entry_id),
    escape_html(&p.experience_ids.join(" ")),
    render_block(&p.content, opts)
  )
}

pub fn render_media(media: &Media, class: &str) -> String {
  match media {
    Media::Image { src, alt } => format!(
      "<img src=\"{}\" alt=\"{}\" class=\"{class}\" loading=\"lazy\">",
      escape_html(src),
      escape_html(alt)
    ),
    Media::Video { src, mime } => format!(
      "<video class=\"{class}\" autoplay muted loop playsinline><source src=\"{}\" type=\"{}\"></video>",
      escape_html(src),
      escape_html(mime)
    ),
    Media::Unavailable => "<div class=\"aspect-video w-full rounded-md border border-dashed text-sm grid place-items-center text-muted-foreground/70\">Image unavailable</div>".to_string(),
  }
}

pub fn render_button(button: &Button) -> String {
  let variant = button.variant.as_deref().unwrap_or("Primary").to_ascii_lowercase();
  let size = button.size.as_deref().unwrap_or("Medium").to_ascii_lowercase();
  let class = format!("btn btn-{variant} btn-{size}");
  let label = escape_html(&button.label);
  match button.href {
    Some(ref href) => {
      let target =
        if button.new_tab { " target=\"_blank\" rel=\"noopener noreferrer\"" } else { "" };
      format!("<a href=\"{}\" class=\"{class}\"{target}>{label}</a>", escape_html(href))
    }
    None => format!("<span class=\"{class}\" aria-disabled=\"true\">{label}</span>"),
  }
}

fn render_header(header: &FrameHeader) -> String {
  let mut out = format!("<header data-entry-id=\"{}\" class=\"mb-8\">", escape_html(&header.entry_id));
  if let Some(ref eyebrow) = header.eyebrow {
    out.push_str(&format!("<p class=\"text-sm uppercase tracking-wide\">{}</p>", escape_html(eyebrow)));
  }
  if let Some(ref title) = header.title {
    out.push_str(&format!("<div class=\"text-3xl font-bold\">{}</div>", render_text(title)));
  }
  if let Some(ref subtitle) = header.subtitle {
    out.push_str(&format!("<div class=\"mt-2 opacity-80\">{}</div>", render_text(subtitle)));
  }
  out.push_str("</header>");
  out
}

fn render_frame(frame: &FrameBlock, opts: RenderOptions) -> String {
  let composed = &frame.composed;
  let tokens = &composed.tokens;
  let mut classes = vec!["relative overflow-hidden", tokens.text, tokens.padding];
  if let Some(surface) = tokens.surface {
    classes.push(surface.background);
  }

  let mut out = format!(
    "<section data-entry-id=\"{}\" data-layout=\"{}\" class=\"{}\">",
    escape_html(&frame.entry_id),
    composed.config.layout.as_str(),
    classes.join(" ")
  );

  if let (Some(media), Some(overlay)) = (&composed.config.background_media, tokens.overlay) {
    out.push_str("<div class=\"absolute inset-0 -z-10\">");
    out.push_str(&render_media(&Media::from_asset(media), "h-full w-full object-cover"));
    out.push_str(&format!("<div class=\"absolute inset-0 {}\"></div></div>", overlay.class()));
  }

  let child = |idx: usize| frame.children.get(idx).map(|b| render_block(b, opts)).unwrap_or_default();
  let header = || frame.header.as_ref().map(render_header).unwrap_or_default();

  out.push_str(&format!("<div class=\"mx-auto max-w-7xl {}\">", tokens.alignment));
  match composed.slots {
    Slots::Hero { header: has_header, child: first, missing_background, .. } => {
      if missing_background && opts.dev_badges {
        out.push_str(
          "<span class=\"dev-badge\" role=\"status\">Hero frame is missing background media</span>",
        );
      }
      out.push_str("<div class=\"mx-auto max-w-3xl text-center\">");
      if has_header {
        out.push_str(&header());
      }
      if let Some(idx) = first {
        out.push_str(&child(idx));
      }
      out.push_str("</div>");
    }
    Slots::Duplex { left, right } => {
      out.push_str(&format!("<div class=\"{} {} items-center\">", tokens.items, tokens.gap));
      for (side, slot) in [("left", left), ("right", right)] {
        let inner = match slot {
          Some(Slot::Header) => header(),
          Some(Slot::Child(idx)) => child(idx),
          None => String::new(),
        };
        out.push_str(&format!("<div data-slot=\"{side}\">{inner}</div>"));
      }
      out.push_str("</div>");
    }
    Slots::Flow { header: has_header, ref children } => {
      if has_header {
        out.push_str(&header());
      }
      out.push_str(&format!("<div class=\"{} {}\">", tokens.items, tokens.gap));
      for idx in children {
        out.push_str(&child(*idx));
      }
      out.push_str("</div>");
    }
  }
  out.push_str("</div></section>");
  out
}

fn render_callout(callout: &Callout) -> String {
  let id = escape_html(&callout.entry_id);
  let title = callout.title.as_ref().map(render_text);
  let subtitle = callout.subtitle.as_ref().map(render_text);
  let button = callout.button.as_ref().map(render_button);

  if callout.display == Display::Hero {
    let mut out = format!("<div data-entry-id=\"{id}\" class=\"mx-auto max-w-3xl text-inherit\"><div class=\"text-center\">");
    if let Some(title) = title {
      out.push_str(&format!("<div class=\"text-current\">{title}</div>"));
    }
    if let Some(subtitle) = subtitle {
      out.push_str(&format!("<div class=\"text-current/80 mt-2\">{subtitle}</div>"));
    }
    out.push_str("</div>");
    if let Some(button) = button {
      out.push_str(&format!("<div class=\"mt-6 flex justify-center\">{button}</div>"));
    }
    out.push_str("</div>");
    return out;
  }

  let mut out = format!("<div data-entry-id=\"{id}\" class=\"card rounded-2xl shadow-sm\"><div class=\"card-header\">");
  if let Some(title) = title {
    out.push_str(&format!("<div class=\"card-title\">{title}</div>"));
  }
  if let Some(subtitle) = subtitle {
    out.push_str(&format!("<div class=\"card-description\">{subtitle}</div>"));
  }
  out.push_str("</div>");
  if let Some(ref media) = callout.media {
    out.push_str(&format!(
      "<div class=\"card-content\"><div class=\"rounded-lg overflow-hidden\">{}</div></div>",
      render_media(media, "w-full h-auto object-cover")
    ));
  }
  if let Some(button) = button {
    out.push_str(&format!("<div class=\"card-footer\">{button}</div>"));
  }
  out.push_str("</div>");
  out
}

fn render_image(image: &ImageBlock) -> String {
  let class = match image.display {
    Display::Hero => "",
    Display::Default => "rounded-xl overflow-hidden aspect-video",
  };
  format!(
    "<div data-entry-id=\"{}\" class=\"{class}\">{}</div>",
    escape_html(&image.entry_id),
    render_media(&image.media, "w-full h-auto object-cover")
  )
}

fn render_blog_card(card: &BlogPostCard) -> String {
  let mut out = format!("<article data-entry-id=\"{}\" class=\"card\">", escape_html(&card.entry_id));
  if let Some(ref image) = card.image {
    out.push_str(&render_media(image, "w-full aspect-video object-cover"));
  }
  if let Some(ref title) = card.title {
    let title = escape_html(title);
    match card.href {
      Some(ref href) => {
        out.push_str(&format!("<h3><a href=\"{}\">{title}</a></h3>", escape_html(href)));
      }
      None => out.push_str(&format!("<h3>{title}</h3>")),
    }
  }
  let meta: Vec<String> =
    [card.author.as_deref(), card.published.as_deref()].into_iter().flatten().map(escape_html).collect();
  if !meta.is_empty() {
    out.push_str(&format!("<p class=\"text-sm opacity-70\">{}</p>", meta.join(" &middot; ")));
  }
  if let Some(ref summary) = card.summary {
    out.push_str(&format!("<div class=\"summary\">{}</div>", render_text(summary)));
  }
  out.push_str("</article>");
  out
}

fn render_buttons(buttons: &[Button]) -> String {
  if buttons.is_empty() {
    return String::new();
  }
  let inner: String = buttons.iter().map(render_button).collect();
  format!("<div class=\"mt-6 flex flex-wrap gap-4\">{inner}</div>")
}

fn render_hero_banner(banner: &HeroBanner) -> String {
  let variant = banner.variant.to_ascii_lowercase().replace(' ', "-");
  let mut out = format!(
    "<section data-entry-id=\"{}\" class=\"hero-banner hero-banner-{}\">",
    escape_html(&banner.entry_id),
    escape_html(&variant)
  );
  if let Some(ref image) = banner.image {
    out.push_str(&render_media(image, "hero-banner-image w-full object-cover"));
  }
  out.push_str("<div class=\"hero-banner-content\">");
  if let Some(ref headline) = banner.headline {
    out.push_str(&format!("<h1>{}</h1>", escape_html(headline)));
  }
  if let Some(ref body) = banner.body {
    out.push_str(&format!("<p>{}</p>", escape_html(body)));
  }
  out.push_str(&render_buttons(&banner.buttons));
  out.push_str("</div></section>");
  out
}

fn render_cta(cta: &Cta) -> String {
  let mut out = format!(
    "<section data-entry-id=\"{}\" class=\"cta cta-{} cta-bg-{}\">",
    escape_html(&cta.entry_id),
    escape_html(&cta.variant.to_ascii_lowercase()),
    escape_html(&cta.background.to_ascii_lowercase())
  );
  if let Some(ref title) = cta.title {
    out.push_str(&format!("<h2>{}</h2>", escape_html(title)));
  }
  if let Some(ref body) = cta.body {
    out.push_str(&format!("<p>{}</p>", escape_html(body)));
  }
  out.push_str(&render_buttons(&cta.buttons));
  if !cta.images.is_empty() {
    out.push_str("<div class=\"cta-images\">");
    for image in &cta.images {
      out.push_str(&render_media(image, "rounded-lg"));
    }
    out.push_str("</div>");
  }
  out.push_str("</section>");
  out
}
