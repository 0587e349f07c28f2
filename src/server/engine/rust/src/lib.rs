/* src/server/engine/rust/src/lib.rs */

pub mod escape;
pub mod page;
pub mod render;
pub mod richtext;
pub mod sitemap;

// Public API re-exports
pub use escape::{escape_html, script_safe_json};
pub use page::{
  DATA_ID, Document, LocaleLink, PageData, inject_data_script, inject_html_lang, render_article,
  render_document, render_landing, render_not_found,
};
pub use render::{RenderOptions, render_block, render_blocks, render_button, render_media, render_missing};
pub use richtext::{render_document as render_rich_text, render_text};
pub use sitemap::render_sitemap;
