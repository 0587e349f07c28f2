/* src/server/adapter/axum/src/handler/sitemap.rs */

use std::sync::Arc;

use axum::extract::State;
use axum::http::header::CONTENT_TYPE;
use axum::response::{IntoResponse, Response};
use vitrine_engine::render_sitemap;
use vitrine_server::page::{BLOG_POST, LANDING_PAGE};
use vitrine_server::{ContentSource, Links};

use super::AppState;
use crate::error::AxumError;

async fn slugs_or_empty(source: &dyn ContentSource, content_type: &str) -> Vec<String> {
  match source.fetch_all_slugs(content_type.to_string(), 0).await {
    Ok(slugs) => slugs,
    Err(e) => {
      tracing::error!(content_type, error = %e, "enumerating slugs failed");
      Vec::new()
    }
  }
}

/// Every landing page and blog post for every locale; the default locale uses clean paths.
pub(super) async fn handle_sitemap(State(state): State<Arc<AppState>>) -> Result<Response, AxumError> {
  let parts = &state.parts;
  let registry = parts.registry().await.map_err(AxumError::api)?;
  let site = &parts.config.site;
  let base = site.base_url.as_deref().unwrap_or_default().trim_end_matches('/');

  let landing = slugs_or_empty(parts.source.as_ref(), LANDING_PAGE).await;
  let posts = slugs_or_empty(parts.source.as_ref(), BLOG_POST).await;

  let mut urls = Vec::with_capacity(registry.locales().len() * (landing.len() + posts.len()));
  for locale in registry.locales() {
    let links = Links::new(site).for_locale(locale, &registry);
    urls.extend(landing.iter().map(|slug| format!("{base}{}", links.landing_page(slug))));
    urls.extend(posts.iter().map(|slug| format!("{base}{}", links.blog_post(slug))));
  }
  Ok(([(CONTENT_TYPE, "application/xml; charset=utf-8")], render_sitemap(&urls)).into_response())
}
