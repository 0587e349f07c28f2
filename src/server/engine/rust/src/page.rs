/* src/server/engine/rust/src/page.rs */

use serde::Serialize;
use vitrine_server::blocks::ResolvedPage;
use vitrine_server::page::Article;

use crate::escape::{escape_html, script_safe_json};
use crate::render::{RenderOptions, render_blocks, render_media};
use crate::richtext::render_text;

/// Script element id for the page bootstrap JSON.
pub const DATA_ID: &str = "__vitrine";

/// One entry of the locale switcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocaleLink {
  pub code: String,
  pub href: String,
  pub current: bool,
}

/// Bootstrap data read by the preview client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageData {
  pub entry_id: String,
  pub locale: String,
  pub preview: bool,
}

#[derive(Debug, Clone)]
pub struct Document {
  pub locale: String,
  pub title: String,
  pub site_name: String,
  pub body: String,
  pub locale_links: Vec<LocaleLink>,
  pub data: Option<PageData>,
}

const SHELL: &str = "<!doctype html><html><head><meta charset=\"utf-8\"><meta name=\"viewport\" content=\"width=device-width, initial-scale=1\"></head><body></body></html>";

/// Re-fetches patched subtrees over SSE and swaps them in place.
const PREVIEW_CLIENT: &str = r#"<script>(function(){var d=JSON.parse(document.getElementById("__vitrine").textContent);if(!d.preview)return;var p=new URLSearchParams(location.search).get("pin");var es=new EventSource("/_vitrine/preview/events?entry="+encodeURIComponent(d.entryId)+"&locale="+encodeURIComponent(d.locale)+(p?"&pin="+encodeURIComponent(p):""));es.addEventListener("block",function(e){var m=JSON.parse(e.data);var el=document.querySelector('[data-entry-id="'+m.entryId+'"]');if(el){el.outerHTML=m.html;}});es.addEventListener("reload",function(){location.reload();});})();</script>"#;

pub fn inject_html_lang(html: &str, locale: &str) -> String {
  html.replacen("<html", &format!("<html lang=\"{}\"", escape_html(locale)), 1)
}

pub fn inject_head(html: &str, head: &str) -> String {
  match html.find("</head>") {
    Some(pos) => format!("{}{head}{}", &html[..pos], &html[pos..]),
    None => format!("{head}{html}"),
  }
}

pub fn inject_body(html: &str, body: &str) -> String {
  match html.rfind("</body>") {
    Some(pos) => format!("{}{body}{}", &html[..pos], &html[pos..]),
    None => format!("{html}{body}"),
  }
}

pub fn inject_data_script(html: &str, data_id: &str, json: &str) -> String {
  let script = format!(r#"<script id="{data_id}" type="application/json">{json}</script>"#);
  inject_body(html, &script)
}

fn render_locale_switcher(links: &[LocaleLink]) -> String {
  if links.len() < 2 {
    return String::new();
  }
  let items: String = links
    .iter()
    .map(|l| {
      let current = if l.current { " aria-current=\"true\"" } else { "" };
      format!(
        "<li><a href=\"{}\" hreflang=\"{code}\"{current}>{code}</a></li>",
        escape_html(&l.href),
        code = escape_html(&l.code)
      )
    })
    .collect();
  format!("<nav class=\"locale-switcher\" aria-label=\"Language\"><ul>{items}</ul></nav>")
}

/// Assemble the full HTML document: `<html lang>`, title, switcher, body, bootstrap data.
pub fn render_document(doc: &Document) -> String {
  let title = if doc.title.is_empty() || doc.title == doc.site_name {
    escape_html(&doc.site_name)
  } else {
    format!("{} | {}", escape_html(&doc.title), escape_html(&doc.site_name))
  };

  let mut html = inject_html_lang(SHELL, &doc.locale);
  html = inject_head(&html, &format!("<title>{title}</title>"));
  let body = format!("{}{}", render_locale_switcher(&doc.locale_links), doc.body);
  html = inject_body(&html, &body);

  if let Some(ref data) = doc.data {
    match serde_json::to_string(data) {
      Ok(json) => {
        html = inject_data_script(&html, DATA_ID, &script_safe_json(&json));
        if data.preview {
          html = inject_body(&html, PREVIEW_CLIENT);
        }
      }
      Err(e) => tracing::error!(error = %e, "page data serialization failed"),
    }
  }
  html
}

pub fn render_landing(page: &ResolvedPage, opts: RenderOptions) -> String {
  format!(
    "<main data-entry-id=\"{}\" class=\"w-full overflow-hidden\">{}</main>",
    escape_html(&page.entry_id),
    render_blocks(page.blocks(), opts)
  )
}

pub fn render_article(article: &Article) -> String {
  let mut out = format!(
    "<main><article data-entry-id=\"{}\" class=\"mx-auto max-w-3xl py-12\">",
    escape_html(&article.entry_id)
  );
  out.push_str(&format!(
    "<p><a href=\"{}\" class=\"text-sm\">&larr; Blog</a></p>",
    escape_html(&article.back_href)
  ));
  if let Some(ref title) = article.title {
    out.push_str(&format!("<h1>{}</h1>", escape_html(title)));
  }
  let meta: Vec<String> = [article.author.as_deref(), article.published.as_deref()]
    .into_iter()
    .flatten()
    .map(escape_html)
    .collect();
  if !meta.is_empty() {
    out.push_str(&format!("<p class=\"text-sm opacity-70\">{}</p>", meta.join(" &middot; ")));
  }
  if let Some(ref image) = article.image {
    out.push_str(&render_media(image, "w-full rounded-xl"));
  }
  if let Some(ref summary) = article.summary {
    out.push_str(&format!("<div class=\"lead\">{}</div>", render_text(summary)));
  }
  if let Some(ref body) = article.body {
    out.push_str(&format!("<div class=\"prose\">{}</div>", render_text(body)));
  }
  out.push_str("</article></main>");
  out
}

pub fn render_not_found(home_href: &str) -> String {
  format!(
    "<main class=\"mx-auto max-w-3xl py-24 text-center\"><h1>Page not found</h1><p><a href=\"{}\">Back home</a></p></main>",
    escape_html(home_href)
  )
}
