/* src/server/core/rust/src/routing.rs */

//! Per-request locale routing decision.
//!
//! ```text
//!   bypassed prefix ─────────────────────────────────> PassThrough
//!   HasLocalePrefix(default) ────────────────────────> Redirect(stripped)
//!   HasLocalePrefix(other) ──────────────────────────> PassThrough
//!   NoLocalePrefix ── negotiate ── best == default ──> Rewrite(/{default}{path})
//!                                └ best != default ──> Redirect(/{best}{path})
//! ```
//!
//! The decision is a pure function of its inputs; negotiation is passed in as a closure so it
//! only runs for unprefixed paths.

use regex::Regex;

use crate::errors::VitrineError;
use crate::locale::LocaleRegistry;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteOutcome {
  PassThrough,
  /// Serve `target` internally; the visible URL stays unchanged.
  Rewrite(String),
  /// Send the client to `target`.
  Redirect(String),
}

impl RouteOutcome {
  pub fn is_redirect(&self) -> bool {
    matches!(self, Self::Redirect(_))
  }

  /// Append the original query string (without `?`) to rewrite/redirect targets.
  pub fn with_query(self, query: Option<&str>) -> Self {
    let Some(q) = query.filter(|q| !q.is_empty()) else {
      return self;
    };
    match self {
      Self::PassThrough => Self::PassThrough,
      Self::Rewrite(path) => Self::Rewrite(format!("{path}?{q}")),
      Self::Redirect(path) => Self::Redirect(format!("{path}?{q}")),
    }
  }
}

/// Which form the incoming path is in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathState<'a> {
  HasLocalePrefix { locale: &'a str, rest: &'a str },
  NoLocalePrefix,
}

/// Classify `path` against the registry. `rest` always starts with `/` or is empty.
pub fn classify<'a>(path: &'a str, registry: &LocaleRegistry) -> PathState<'a> {
  let Some(trimmed) = path.strip_prefix('/') else {
    return PathState::NoLocalePrefix;
  };
  let (first, rest) = match trimmed.find('/') {
    Some(idx) => (&trimmed[..idx], &trimmed[idx..]),
    None => (trimmed, ""),
  };
  if registry.contains(first) {
    PathState::HasLocalePrefix { locale: first, rest }
  } else {
    PathState::NoLocalePrefix
  }
}

/// Path prefixes excluded from locale handling (API routes, assets, setup).
/// A prefix matches the path itself or anything below it at a segment boundary.
#[derive(Debug, Clone)]
pub struct BypassMatcher {
  pattern: Option<Regex>,
}

impl BypassMatcher {
  pub fn new(prefixes: &[String]) -> Result<Self, VitrineError> {
    let alternatives: Vec<String> = prefixes
      .iter()
      .map(|p| p.trim_end_matches('/'))
      .filter(|p| !p.is_empty())
      .map(regex::escape)
      .collect();
    if alternatives.is_empty() {
      return Ok(Self { pattern: None });
    }
    let source = format!("^(?:{})(?:/|$)", alternatives.join("|"));
    let pattern = Regex::new(&source)
      .map_err(|e| VitrineError::config(format!("invalid bypass prefixes: {e}")))?;
    Ok(Self { pattern: Some(pattern) })
  }

  pub fn is_bypassed(&self, path: &str) -> bool {
    self.pattern.as_ref().is_some_and(|re| re.is_match(path))
  }
}

/// Decide the routing outcome for `path`.
/// `negotiate` yields the best locale for the request and is only invoked for unprefixed paths.
pub fn decide<F>(
  path: &str,
  registry: &LocaleRegistry,
  bypass: &BypassMatcher,
  negotiate: F,
) -> RouteOutcome
where
  F: FnOnce() -> String,
{
  if bypass.is_bypassed(path) {
    return RouteOutcome::PassThrough;
  }

  match classify(path, registry) {
    PathState::HasLocalePrefix { locale, rest } => {
      if registry.is_default(locale) {
        // A single leading slash keeps the target on this host (`//host` is protocol-relative)
        RouteOutcome::Redirect(format!("/{}", rest.trim_start_matches('/')))
      } else {
        RouteOutcome::PassThrough
      }
    }
    PathState::NoLocalePrefix => {
      let best = negotiate();
      // A negotiator returning something outside the registry is treated as the default
      let best = if registry.contains(&best) { best } else { registry.default_locale().to_string() };
      let target = prefix_path(&best, path);
      if registry.is_default(&best) {
        RouteOutcome::Rewrite(target)
      } else {
        RouteOutcome::Redirect(target)
      }
    }
  }
}

/// Registry lookup failed: never block the request.
pub fn decide_without_registry(err: &VitrineError) -> RouteOutcome {
  tracing::warn!(error = %err, "locale registry unavailable, passing request through");
  RouteOutcome::PassThrough
}

fn prefix_path(locale: &str, path: &str) -> String {
  match path {
    "" | "/" => format!("/{locale}"),
    p if p.starts_with('/') => format!("/{locale}{p}"),
    p => format!("/{locale}/{p}"),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn registry() -> LocaleRegistry {
    LocaleRegistry::new(vec!["en-US".into(), "de".into(), "fr".into()], "en-US").unwrap()
  }

  fn bypass() -> BypassMatcher {
    BypassMatcher::new(&crate::config::default_bypass()).unwrap()
  }

  fn run(path: &str, best: &str) -> RouteOutcome {
    decide(path, &registry(), &bypass(), || best.to_string())
  }

  #[test]
  fn non_default_prefix_passes_through() {
    assert_eq!(run("/de/about", "en-US"), RouteOutcome::PassThrough);
    assert_eq!(run("/fr", "de"), RouteOutcome::PassThrough);
  }

  #[test]
  fn default_prefix_redirects_to_clean_path() {
    assert_eq!(run("/en-US/about/team", "de"), RouteOutcome::Redirect("/about/team".into()));
    assert_eq!(run("/en-US", "de"), RouteOutcome::Redirect("/".into()));
    assert_eq!(run("/en-US/", "de"), RouteOutcome::Redirect("/".into()));
  }

  #[test]
  fn default_prefix_redirect_stays_on_host() {
    assert_eq!(
      run("/en-US//evil.example/phish", "de"),
      RouteOutcome::Redirect("/evil.example/phish".into())
    );
    assert_eq!(run("/en-US///x", "de"), RouteOutcome::Redirect("/x".into()));
    assert_eq!(run("/en-US//", "de"), RouteOutcome::Redirect("/".into()));
  }

  #[test]
  fn unprefixed_default_rewrites() {
    assert_eq!(run("/about", "en-US"), RouteOutcome::Rewrite("/en-US/about".into()));
    assert_eq!(run("/", "en-US"), RouteOutcome::Rewrite("/en-US".into()));
  }

  #[test]
  fn unprefixed_other_locale_redirects() {
    assert_eq!(run("/about", "de"), RouteOutcome::Redirect("/de/about".into()));
    assert_eq!(run("/", "fr"), RouteOutcome::Redirect("/fr".into()));
  }

  #[test]
  fn redirect_target_does_not_redirect_again() {
    let first = run("/en-US/pricing", "en-US");
    let RouteOutcome::Redirect(target) = first else { panic!("expected redirect") };
    let second = run(&target, "en-US");
    assert!(!second.is_redirect());
    assert_eq!(second, RouteOutcome::Rewrite("/en-US/pricing".into()));

    let first = run("/pricing", "de");
    let RouteOutcome::Redirect(target) = first else { panic!("expected redirect") };
    assert_eq!(run(&target, "de"), RouteOutcome::PassThrough);
  }

  #[test]
  fn prefix_must_be_a_whole_segment() {
    // "/de-facto" is not the "de" locale
    assert_eq!(run("/de-facto", "en-US"), RouteOutcome::Rewrite("/en-US/de-facto".into()));
    assert_eq!(run("/french", "fr"), RouteOutcome::Redirect("/fr/french".into()));
  }

  #[test]
  fn bypassed_paths_skip_negotiation() {
    for path in ["/api/health", "/api", "/_vitrine/preview/patch", "/favicon.ico", "/setup"] {
      let outcome =
        decide(path, &registry(), &bypass(), || panic!("negotiation must not run for {path}"));
      assert_eq!(outcome, RouteOutcome::PassThrough, "{path}");
    }
  }

  #[test]
  fn bypass_respects_segment_boundary() {
    assert!(!bypass().is_bypassed("/apiary"));
    assert!(bypass().is_bypassed("/static/app.css"));
  }

  #[test]
  fn prefixed_paths_skip_negotiation() {
    let outcome = decide("/de/x", &registry(), &bypass(), || panic!("lazy"));
    assert_eq!(outcome, RouteOutcome::PassThrough);
  }

  #[test]
  fn empty_bypass_matches_nothing() {
    let matcher = BypassMatcher::new(&[]).unwrap();
    assert!(!matcher.is_bypassed("/api"));
  }

  #[test]
  fn foreign_negotiation_result_treated_as_default() {
    assert_eq!(run("/about", "ja"), RouteOutcome::Rewrite("/en-US/about".into()));
  }

  #[test]
  fn query_is_preserved() {
    let out = RouteOutcome::Redirect("/de/a".into()).with_query(Some("preview=true"));
    assert_eq!(out, RouteOutcome::Redirect("/de/a?preview=true".into()));
    let out = RouteOutcome::Rewrite("/en-US/a".into()).with_query(Some(""));
    assert_eq!(out, RouteOutcome::Rewrite("/en-US/a".into()));
    assert_eq!(RouteOutcome::PassThrough.with_query(Some("x=1")), RouteOutcome::PassThrough);
  }

  #[test]
  fn registry_failure_passes_through() {
    let outcome = decide_without_registry(&VitrineError::upstream("down"));
    assert_eq!(outcome, RouteOutcome::PassThrough);
  }

  #[test]
  fn classify_reports_rest() {
    assert_eq!(
      classify("/de/a/b", &registry()),
      PathState::HasLocalePrefix { locale: "de", rest: "/a/b" }
    );
    assert_eq!(classify("/a/b", &registry()), PathState::NoLocalePrefix);
  }
}
