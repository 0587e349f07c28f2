/* src/server/core/rust/src/negotiate.rs */

use crate::locale::LocaleRegistry;

/// Request-side inputs to locale negotiation, borrowed from the incoming headers.
pub struct NegotiationInput<'a> {
  pub cookie_header: Option<&'a str>,
  pub cookie_name: &'a str,
  pub accept_language: Option<&'a str>,
}

/// Negotiation chain: locale cookie -> Accept-Language -> registry default.
pub fn negotiate_request(input: &NegotiationInput<'_>, registry: &LocaleRegistry) -> String {
  if let Some(header) = input.cookie_header {
    if let Some(loc) = parse_cookie_locale(header, input.cookie_name, registry) {
      return loc;
    }
  }

  let preferences = input.accept_language.map(parse_accept_language).unwrap_or_default();
  negotiate(&preferences, registry.locales(), registry.default_locale())
}

/// Best-fit match of ordered client preferences against the available locales.
///
/// Each preference is tried in client order; within one preference the candidates are an
/// exact (case-insensitive) match, then progressively truncated ranges (`zh-Hant-TW` ->
/// `zh-Hant` -> `zh`), then any available locale sharing the primary language subtag.
/// Falls back to `fallback` when nothing matches.
pub fn negotiate(preferences: &[String], available: &[String], fallback: &str) -> String {
  for pref in preferences {
    if let Some(found) = match_one(pref, available) {
      return found.to_string();
    }
  }
  fallback.to_string()
}

fn match_one<'a>(pref: &str, available: &'a [String]) -> Option<&'a str> {
  let pref = pref.trim();
  if pref.is_empty() || pref == "*" {
    return None;
  }

  let mut range = pref;
  loop {
    if let Some(found) = available.iter().find(|a| a.eq_ignore_ascii_case(range)) {
      return Some(found);
    }
    match range.rfind('-') {
      Some(idx) => range = &range[..idx],
      None => break,
    }
  }

  let primary = primary_subtag(pref);
  available.iter().find(|a| primary_subtag(a).eq_ignore_ascii_case(primary)).map(String::as_str)
}

fn primary_subtag(tag: &str) -> &str {
  tag.split('-').next().unwrap_or(tag)
}

/// Parse an `Accept-Language` header into preference order: descending q-value, header order
/// among equal q-values. Entries with `q=0` are refused by the client and dropped.
pub fn parse_accept_language(header: &str) -> Vec<String> {
  let mut entries: Vec<(usize, &str, f64)> = Vec::new();
  for (idx, part) in header.split(',').enumerate() {
    let part = part.trim();
    if part.is_empty() {
      continue;
    }
    let mut segments = part.split(';');
    let lang = segments.next().unwrap_or("").trim();
    if lang.is_empty() {
      continue;
    }
    let mut q = 1.0_f64;
    for s in segments {
      if let Some(val) = s.trim().strip_prefix("q=") {
        if let Ok(v) = val.trim().parse::<f64>() {
          q = v;
        }
      }
    }
    if q <= 0.0 {
      continue;
    }
    entries.push((idx, lang, q));
  }

  // sort_by is stable, so equal q-values keep header order
  entries.sort_by(|a, b| b.2.partial_cmp(&a.2).unwrap_or(std::cmp::Ordering::Equal));
  entries.into_iter().map(|(_, lang, _)| lang.to_string()).collect()
}

fn parse_cookie_locale(header: &str, name: &str, registry: &LocaleRegistry) -> Option<String> {
  for pair in header.split(';') {
    if let Some((k, v)) = pair.trim().split_once('=') {
      if k.trim() == name {
        let v = v.trim();
        if registry.contains(v) {
          return Some(v.to_string());
        }
      }
    }
  }
  None
}
