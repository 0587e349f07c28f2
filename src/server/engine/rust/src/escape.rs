/* src/server/engine/rust/src/escape.rs */

/// Escape text for HTML element content and double-quoted attribute values.
pub fn escape_html(s: &str) -> String {
  let mut out = String::with_capacity(s.len());
  for ch in s.chars() {
    match ch {
      '&' => out.push_str("&amp;"),
      '<' => out.push_str("&lt;"),
      '>' => out.push_str("&gt;"),
      '"' => out.push_str("&quot;"),
      '\'' => out.push_str("&#x27;"),
      c => out.push(c),
    }
  }
  out
}

/// Make serialized JSON safe to embed in a `<script>` element.
///
/// Non-ASCII characters inside JSON strings become `\uXXXX` sequences (surrogate pairs outside
/// the BMP), and `<` becomes `\u003c` so CMS text can never close the script tag early.
pub fn script_safe_json(json: &str) -> String {
  let mut out = String::with_capacity(json.len());
  let mut in_string = false;
  let mut chars = json.chars();

  while let Some(ch) = chars.next() {
    if !in_string {
      if ch == '"' {
        in_string = true;
      }
      out.push(ch);
      continue;
    }
    match ch {
      '\\' => {
        // Escaped character inside string: push both and skip next
        out.push(ch);
        if let Some(next) = chars.next() {
          out.push(next);
        }
      }
      '"' => {
        in_string = false;
        out.push(ch);
      }
      '<' => out.push_str("\\u003c"),
      c if (c as u32) > 0x7F => {
        let code = c as u32;
        if code > 0xFFFF {
          let adjusted = code - 0x1_0000;
          let hi = (adjusted >> 10) + 0xD800;
          let lo = (adjusted & 0x3FF) + 0xDC00;
          out.push_str(&format!("\\u{hi:04x}\\u{lo:04x}"));
        } else {
          out.push_str(&format!("\\u{code:04x}"));
        }
      }
      c => out.push(c),
    }
  }
  out
}
