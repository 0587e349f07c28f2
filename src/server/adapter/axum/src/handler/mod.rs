/* src/server/adapter/axum/src/handler/mod.rs */

mod page;
mod preview;
mod sitemap;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;
use vitrine_server::{PinnedVariants, SiteParts};

pub(crate) use preview::PreviewHub;

pub(crate) struct AppState {
  pub parts: SiteParts,
  pub preview: PreviewHub,
}

pub(crate) fn build_router(parts: SiteParts) -> Router {
  let state = Arc::new(AppState { parts, preview: PreviewHub::new() });

  // Pages claim every path not matched by a static route; the locale middleware rewrites
  // unprefixed paths to `/{default}/...` before the handler reads the URI.
  Router::new()
    .route("/_vitrine/preview/patch", post(preview::handle_patch).delete(preview::handle_discard))
    .route("/_vitrine/preview/events", get(preview::handle_events))
    .route("/sitemap.xml", get(sitemap::handle_sitemap))
    .route("/", get(page::handle_page))
    .route("/{*path}", get(page::handle_page))
    .layer(axum::middleware::from_fn_with_state(state.clone(), crate::middleware::route_locale))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

/// Parse authoring pins, `experienceId:variant` pairs separated by commas.
/// Malformed pairs are skipped.
pub(super) fn parse_pins(raw: Option<&str>) -> PinnedVariants {
  let Some(raw) = raw else {
    return PinnedVariants::new();
  };
  raw.split(',').filter_map(|pair| pair.split_once(':')).fold(
    PinnedVariants::new(),
    |pins, (id, variant)| match variant.trim().parse::<usize>() {
      Ok(variant) => pins.pin(id.trim(), variant),
      Err(_) => {
        tracing::debug!(experience = id, variant, "ignoring malformed pin");
        pins
      }
    },
  )
}
