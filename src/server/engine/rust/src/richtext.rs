/* src/server/engine/rust/src/richtext.rs */

//! Rich-text document rendering (CMS `nodeType` tree to HTML).

use serde_json::Value;
use vitrine_server::blocks::Text;

use crate::escape::escape_html;

pub fn render_text(text: &Text) -> String {
  match text {
    Text::Plain(s) => escape_html(s),
    Text::Rich(doc) => render_document(doc),
  }
}

/// Render a rich-text document. Unknown node types render their children only.
pub fn render_document(doc: &Value) -> String {
  let mut out = String::new();
  render_node(doc, &mut out);
  out
}

fn render_children(node: &Value, out: &mut String) {
  if let Some(content) = node.get("content").and_then(Value::as_array) {
    for child in content {
      render_node(child, out);
    }
  }
}

fn wrap(tag: &str, node: &Value, out: &mut String) {
  out.push('<');
  out.push_str(tag);
  out.push('>');
  render_children(node, out);
  out.push_str("</");
  out.push_str(tag);
  out.push('>');
}

fn render_node(node: &Value, out: &mut String) {
  let node_type = node.get("nodeType").and_then(Value::as_str).unwrap_or_default();
  match node_type {
    "text" => render_text_node(node, out),
    "paragraph" => wrap("p", node, out),
    "heading-1" => wrap("h1", node, out),
    "heading-2" => wrap("h2", node, out),
    "heading-3" => wrap("h3", node, out),
    "heading-4" => wrap("h4", node, out),
    "heading-5" => wrap("h5", node, out),
    "heading-6" => wrap("h6", node, out),
    "unordered-list" => wrap("ul", node, out),
    "ordered-list" => wrap("ol", node, out),
    "list-item" => wrap("li", node, out),
    "blockquote" => wrap("blockquote", node, out),
    "hr" => out.push_str("<hr>"),
    "hyperlink" => {
      let uri = node.get("data").and_then(|d| d.get("uri")).and_then(Value::as_str);
      match uri {
        Some(uri) if is_safe_uri(uri) => {
          out.push_str(&format!("<a href=\"{}\">", escape_html(uri)));
          render_children(node, out);
          out.push_str("</a>");
        }
        _ => render_children(node, out),
      }
    }
    "embedded-entry-block" | "embedded-entry-inline" | "embedded-asset-block" => {
      tracing::debug!(node_type, "embedded rich-text node skipped");
    }
    _ => render_children(node, out),
  }
}

fn render_text_node(node: &Value, out: &mut String) {
  let value = node.get("value").and_then(Value::as_str).unwrap_or_default();
  let mut html = escape_html(value).replace('\n', "<br>");
  let marks = node.get("marks").and_then(Value::as_array);
  for mark in marks.into_iter().flatten() {
    let tag = match mark.get("type").and_then(Value::as_str) {
      Some("bold") => "strong",
      Some("italic") => "em",
      Some("underline") => "u",
      Some("code") => "code",
      Some("superscript") => "sup",
      Some("subscript") => "sub",
      _ => continue,
    };
    html = format!("<{tag}>{html}</{tag}>");
  }
  out.push_str(&html);
}

fn is_safe_uri(uri: &str) -> bool {
  let lower = uri.trim().to_ascii_lowercase();
  !(lower.starts_with("javascript:") || lower.starts_with("data:") || lower.starts_with("vbscript:"))
}
