/* src/cli/core/src/run.rs */

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use vitrine_contentful::ContentfulSource;
use vitrine_server::routing::{PathState, classify};
use vitrine_server::{
  ContentSource, MemorySource, NegotiationInput, RouteOutcome, SiteConfig, SiteParts, SiteServer,
  decide, negotiate_request,
};
use vitrine_server_axum::IntoAxumRouter;

use crate::ui::{self, DIM, RESET};

/// Fixtures win over the CMS so a site can be served offline.
pub fn build_source(config: &SiteConfig) -> Result<Arc<dyn ContentSource>> {
  if let Some(ref fixtures) = config.fixtures {
    let source = MemorySource::load(Path::new(&fixtures.path))
      .with_context(|| format!("failed to load fixtures from {}", fixtures.path))?;
    tracing::info!(path = %fixtures.path, entries = source.len(), "serving fixtures");
    return Ok(Arc::new(source));
  }
  if let Some(ref ctf) = config.contentful {
    let source = ContentfulSource::new(ctf.clone()).context("invalid [contentful] section")?;
    tracing::info!(space = %ctf.space_id, environment = %ctf.environment, "serving from Contentful");
    return Ok(Arc::new(source));
  }
  bail!("no content source: add [contentful] or [fixtures] to vitrine.toml, or set CTF_SPACE_ID");
}

fn parts(config: SiteConfig) -> Result<SiteParts> {
  let source = build_source(&config)?;
  Ok(SiteServer::new(config).source(source).into_parts()?)
}

pub async fn serve(config: SiteConfig) -> Result<()> {
  let addr = config.server.addr();
  let parts = parts(config)?;
  match parts.registry().await {
    Ok(registry) => ui::ok(&format!(
      "locales {} (default {})",
      registry.locales().join(", "),
      registry.default_locale()
    )),
    Err(e) => ui::warn(&format!("locale registry unavailable, routing passes through: {e}")),
  }
  parts.serve(&addr).await.map_err(|e| anyhow::anyhow!("server error: {e}"))
}

pub async fn locales(config: SiteConfig) -> Result<()> {
  let registry = parts(config)?.registry().await.context("failed to load the locale registry")?;
  for code in registry.locales() {
    if registry.is_default(code) {
      ui::ok(&format!("{code} {DIM}(default){RESET}"));
    } else {
      ui::detail(code);
    }
  }
  Ok(())
}

pub async fn slugs(config: &SiteConfig, content_type: &str) -> Result<()> {
  let include = config.site.include_depth;
  let source = build_source(config)?;
  let slugs = source
    .fetch_all_slugs(content_type.to_string(), include)
    .await
    .with_context(|| format!("failed to enumerate {content_type} slugs"))?;
  for slug in &slugs {
    println!("{slug}");
  }
  ui::ok(&format!("{} {content_type} slugs", slugs.len()));
  Ok(())
}

pub async fn route(
  config: SiteConfig,
  path: &str,
  accept_language: Option<&str>,
  cookie: Option<&str>,
) -> Result<()> {
  let parts = parts(config)?;
  let registry = parts.registry().await.context("failed to load the locale registry")?;
  let input = NegotiationInput {
    cookie_header: cookie,
    cookie_name: &parts.config.i18n.cookie,
    accept_language,
  };
  let (path_only, query) = match path.split_once('?') {
    Some((p, q)) => (p, Some(q)),
    None => (path, None),
  };

  let outcome = decide(path_only, &registry, &parts.bypass, || negotiate_request(&input, &registry))
    .with_query(query);
  if parts.bypass.is_bypassed(path_only) {
    ui::detail(&format!("{DIM}bypassed prefix{RESET}"));
  } else if matches!(classify(path_only, &registry), PathState::NoLocalePrefix) {
    ui::detail(&format!("negotiated {}", negotiate_request(&input, &registry)));
  }
  match outcome {
    RouteOutcome::PassThrough => ui::ok(&format!("pass through {path}")),
    RouteOutcome::Rewrite(target) => ui::ok(&format!("rewrite {path} -> {target}")),
    RouteOutcome::Redirect(target) => ui::arrow(&format!("redirect {path} -> {target}")),
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn requires_a_content_source() {
    let err = build_source(&SiteConfig::default()).err().unwrap();
    assert!(err.to_string().contains("no content source"));
  }

  #[test]
  fn fixtures_take_precedence() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("content.json");
    std::fs::write(&path, r#"[{ "sys": { "id": "a" }, "fields": {} }]"#).unwrap();
    let config: SiteConfig = toml::from_str(&format!(
      "[fixtures]\npath = {:?}\n\n[contentful]\nspace_id = \"s\"\ndelivery_token = \"t\"\n",
      path.to_string_lossy()
    ))
    .unwrap();
    assert!(build_source(&config).is_ok());
  }

  #[test]
  fn broken_fixtures_report_the_path() {
    let config: SiteConfig = toml::from_str("[fixtures]\npath = \"/nonexistent/content.json\"\n").unwrap();
    let err = build_source(&config).err().unwrap();
    assert!(format!("{err:#}").contains("/nonexistent/content.json"));
  }
}
