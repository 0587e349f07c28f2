/* src/server/engine/rust/src/sitemap.rs */

use crate::escape::escape_html;

/// `<urlset>` document listing `urls` in order.
pub fn render_sitemap<S: AsRef<str>>(urls: &[S]) -> String {
  let mut out = String::from(
    "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n",
  );
  for url in urls {
    out.push_str("  <url><loc>");
    out.push_str(&escape_html(url.as_ref()));
    out.push_str("</loc></url>\n");
  }
  out.push_str("</urlset>\n");
  out
}
